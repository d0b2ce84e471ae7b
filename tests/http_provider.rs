use std::{path::Path, sync::Arc, time::Duration};

use actix_web::{App, test};
use ownershelf::{
    OwnersError, OwnersSource, OwnersSourceFactory, PullRef,
    conf::ServerConfig,
    plugins::PluginConfigSource,
    providers::http::{HttpOwnersProviderFactory, OwnersRouting},
    routes::setup_service_config,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn owners_body() -> serde_json::Value {
    json!({
        "data": {
            "needsLGTM": 2,
            "committers": ["a"],
            "reviewers": ["b", "c"]
        },
        "message": "OK"
    })
}

/// Writes a plugin configuration routing `acme` to `org_endpoint` and
/// `acme/widgets` to `repo_endpoint`, in that order.
fn write_plugins_config(dir: &Path, org_endpoint: &str, repo_endpoint: &str) -> std::path::PathBuf {
    let path = dir.join("external_plugins_config.yaml");
    let text = format!(
        r#"
ti-community-lgtm:
  - repos:
      - acme
    pull_owners_endpoint: {org_endpoint}
  - repos:
      - acme/widgets
    pull_owners_endpoint: {repo_endpoint}
"#
    );
    std::fs::write(&path, text).unwrap();
    path
}

fn plugins_factory(path: &Path) -> HttpOwnersProviderFactory {
    HttpOwnersProviderFactory::new(
        OwnersRouting::Plugins(Arc::new(PluginConfigSource::new(path.to_path_buf(), false))),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn fetch_through_plugins_config() {
    let org_server = MockServer::start().await;
    let repo_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/pulls/7/owners"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owners_body()))
        .expect(1)
        .mount(&repo_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/gadgets/pulls/3/owners"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owners_body()))
        .expect(1)
        .mount(&org_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = write_plugins_config(dir.path(), &org_server.uri(), &repo_server.uri());
    let provider = plugins_factory(&config).build();

    // The later, repository specific entry wins for acme/widgets.
    let owners = provider
        .owners_of(&PullRef::new("acme", "widgets", 7))
        .await
        .unwrap();
    assert_eq!(owners.needs_lgtm, 2);
    assert_eq!(owners.committers, vec!["a"]);
    assert_eq!(owners.reviewers, vec!["b", "c"]);

    // Every other acme repository goes to the org entry.
    let owners = provider
        .owners_of(&PullRef::new("acme", "gadgets", 3))
        .await
        .unwrap();
    assert_eq!(owners.needs_lgtm, 2);
}

#[tokio::test]
async fn unresolved_repository() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_plugins_config(dir.path(), "http://127.0.0.1:9", "http://127.0.0.1:9");
    let provider = plugins_factory(&config).build();

    match provider.owners_of(&PullRef::new("other", "x", 1)).await {
        Err(e @ OwnersError::EndpointNotFound { .. }) => {
            assert_eq!(e.to_string(), "can not find the owners endpoint of other/x");
        }
        r => panic!("Expected EndpointNotFound, got {:?}", r),
    }
}

#[tokio::test]
async fn unreadable_plugins_config() {
    let dir = tempfile::tempdir().unwrap();
    let provider = plugins_factory(&dir.path().join("missing.yaml")).build();
    assert!(matches!(
        provider.owners_of(&PullRef::new("acme", "widgets", 1)).await,
        Err(OwnersError::ConfigUnreadable { .. })
    ));

    let malformed = dir.path().join("malformed.yaml");
    std::fs::write(&malformed, "ti-community-lgtm: [\n").unwrap();
    let provider = plugins_factory(&malformed).build();
    assert!(matches!(
        provider.owners_of(&PullRef::new("acme", "widgets", 1)).await,
        Err(OwnersError::ConfigMalformed { .. })
    ));
}

#[tokio::test]
async fn upstream_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/widgets/pulls/1/owners"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/acme/widgets/pulls/2/owners"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let factory = HttpOwnersProviderFactory::new(
        OwnersRouting::Static(url::Url::parse(&server.uri()).unwrap()),
        Duration::from_secs(5),
    )
    .unwrap();
    let provider = factory.build();

    match provider.owners_of(&PullRef::new("acme", "widgets", 1)).await {
        Err(OwnersError::UpstreamStatus { status, .. }) => assert_eq!(status, 500),
        r => panic!("Expected UpstreamStatus, got {:?}", r),
    }
    assert!(matches!(
        provider.owners_of(&PullRef::new("acme", "widgets", 2)).await,
        Err(OwnersError::UpstreamFetchFailed { .. })
    ));
}

/// Ensure the whole page works against a real owners service
#[tokio::test]
async fn owners_page_over_http() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/pulls/7/owners"))
        .respond_with(ResponseTemplate::new(200).set_body_json(owners_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/pulls/8/owners"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let plugins = write_plugins_config(dir.path(), "http://127.0.0.1:9", &server.uri());

    let mut config = ServerConfig::default();
    config.upstream.plugins_config = Some(plugins);
    let factory = HttpOwnersProviderFactory::from_config(&config).unwrap();

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, &config, factory, None);
    }))
    .await;

    let req = test::TestRequest::get()
        .uri("/repos/acme/widgets/pulls/7/owners")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body = String::from_utf8(test::read_body(resp).await.to_vec())
        .unwrap()
        .replace("&#x2f;", "/");
    assert!(body.contains(">2<"));
    for handle in ["a", "b", "c"] {
        assert!(body.contains(&format!("href=\"https://github.com/{handle}\"")));
    }

    let req = test::TestRequest::get()
        .uri("/repos/acme/widgets/pulls/8/owners")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 502);

    let req = test::TestRequest::get()
        .uri("/repos/nobody/widgets/pulls/7/owners")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("can not find the owners endpoint of nobody"));
}

/// Serves a test app whose owners come from a static `base_url`.
async fn static_page_status(base_url: &str, timeout_secs: u64, uri: &str) -> u16 {
    let mut config = ServerConfig::default();
    config.upstream.base_url = Some(url::Url::parse(base_url).unwrap());
    config.upstream.timeout_secs = timeout_secs;
    let factory = HttpOwnersProviderFactory::from_config(&config).unwrap();

    let app = test::init_service(App::new().configure(move |f| {
        setup_service_config(f, &config, factory, None);
    }))
    .await;

    let req = test::TestRequest::get().uri(uri).to_request();
    test::call_service(&app, req).await.status().as_u16()
}

/// Ensure a slow owners service is cut off by the request timeout
#[tokio::test]
async fn upstream_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/widgets/pulls/1/owners"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(owners_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let provider = HttpOwnersProviderFactory::new(
        OwnersRouting::Static(url::Url::parse(&server.uri()).unwrap()),
        Duration::from_secs(1),
    )
    .unwrap()
    .build();

    match provider.owners_of(&PullRef::new("acme", "widgets", 1)).await {
        Err(OwnersError::UpstreamFetchFailed { source, .. }) => assert!(source.is_timeout()),
        r => panic!("Expected UpstreamFetchFailed, got {:?}", r),
    }

    let status = static_page_status(&server.uri(), 1, "/acme/widgets/pulls/1/owners").await;
    assert_eq!(status, 502);
}

/// Ensure an owners service that isn't listening fails the page
#[tokio::test]
async fn upstream_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base = format!("http://127.0.0.1:{port}");

    let provider = HttpOwnersProviderFactory::new(
        OwnersRouting::Static(url::Url::parse(&base).unwrap()),
        Duration::from_secs(5),
    )
    .unwrap()
    .build();

    assert!(matches!(
        provider.owners_of(&PullRef::new("acme", "widgets", 1)).await,
        Err(OwnersError::UpstreamFetchFailed { .. })
    ));

    let status = static_page_status(&base, 5, "/acme/widgets/pulls/1/owners").await;
    assert_eq!(status, 502);
}

/// Actix routes showing the owners of a pull request.
use actix_web::{HttpResponse, http::StatusCode, web};
use log::{error, info, warn};
use minijinja::context;

use crate::{
    owners::{OwnersSource, PullRef},
    routes::RouteSharedData,
    templates::{TEMPLATE_OWNERS, TemplateOwnersContext, TemplatePullContext},
};

/// Owners page of `{org}/{repo}#{num}`.
/// Serves both `/repos/{org}/{repo}/pulls/{num}/owners` and `/{org}/{repo}/pulls/{num}/owners`.
pub async fn get_owners<OS: OwnersSource>(
    data: web::Data<RouteSharedData<OS>>,
    path: web::Path<(String, String, String)>,
) -> HttpResponse {
    let (org, repo, num) = path.into_inner();

    let number = match num.parse::<u64>() {
        Ok(v) => v,
        Err(_) => {
            warn!("Rejecting owners request for {}/{} with number \"{}\"", org, repo, num);
            return data.render_error(
                StatusCode::BAD_REQUEST,
                format!("\"{}\" is not a pull request number", num),
            );
        }
    };
    let pull = PullRef::new(org, repo, number);

    info!("Accessing owners of {}...", pull);

    let owners = match data.provider.owners_of(&pull).await {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to load owners of {}: {}", pull, e);
            return data.render_error(e.status_code(), e.to_string());
        }
    };

    info!(
        "Loaded owners of {} ({} committers, {} reviewers, {} LGTM needed)",
        pull,
        owners.committers.len(),
        owners.reviewers.len(),
        owners.needs_lgtm
    );

    let github = &data.config.general.github_url;
    data.render(
        StatusCode::OK,
        TEMPLATE_OWNERS,
        context! {
            server => data.config.template_server_context(),
            pull => TemplatePullContext::new(&pull, github),
            owners => TemplateOwnersContext::new(&owners, github),
        },
    )
}

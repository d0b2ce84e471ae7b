use actix_web::{
    HttpResponse,
    http::StatusCode,
    web::{self, ServiceConfig},
};
use log::error;
use minijinja::{Environment, Value, context};

use crate::{
    conf::ServerConfig,
    owners::{OwnersSource, OwnersSourceFactory},
    templates::{TEMPLATE_ERROR, TemplateErrorContext},
};

pub mod owners;
pub mod server;

/// This serves as state for the Actix server.
pub struct RouteSharedData<OS: OwnersSource> {
    pub provider: OS,
    pub config: ServerConfig,
    pub jinja: Environment<'static>,
}

impl<OS: OwnersSource> RouteSharedData<OS> {
    /// Renders a template, falling back to a bare 500 if rendering fails.
    pub(crate) fn render(&self, status: StatusCode, template: &str, ctx: Value) -> HttpResponse {
        let rendered = self
            .jinja
            .get_template(template)
            .and_then(|tp| tp.render(ctx));

        match rendered {
            Ok(body) => HttpResponse::build(status)
                .content_type("text/html; charset=utf-8")
                .body(body),
            Err(e) => {
                error!("Failed to render template {}: {}", template, e);
                HttpResponse::InternalServerError().body("Failed to render page")
            }
        }
    }

    /// Renders the error page.
    pub(crate) fn render_error(&self, status: StatusCode, message: String) -> HttpResponse {
        self.render(
            status,
            TEMPLATE_ERROR,
            context! {
                server => self.config.template_server_context(),
                error => TemplateErrorContext {
                    code: status.as_u16(),
                    message,
                }
            },
        )
    }
}

/* -------------------------------------------------------------------------- */
/*                                Registration                                */
/* -------------------------------------------------------------------------- */

/// Register default routes for the server to an Actix configuration.
fn register_routes_to_config<OS: OwnersSource + 'static>(
    config: &mut ServiceConfig,
) -> &mut ServiceConfig {
    config
        .route("/", web::get().to(server::get_index::<OS>))
        .route("/index", web::get().to(server::get_index::<OS>))
        .service(server::get_styles)
        .route(
            "/repos/{org}/{repo}/pulls/{num}/owners",
            web::get().to(owners::get_owners::<OS>),
        )
        .route(
            "/{org}/{repo}/pulls/{num}/owners",
            web::get().to(owners::get_owners::<OS>),
        )
        .route("/{tail:.*}", web::get().to(server::get_not_found::<OS>))
}

pub fn setup_service_config<'a, OF>(
    web_config: &'a mut ServiceConfig,
    server_config: &ServerConfig,
    owners_factory: OF,
    templates: Option<Environment<'static>>,
) -> &'a mut ServiceConfig
where
    OF: OwnersSourceFactory,
    OF::Source: 'static,
{
    web_config.app_data(web::Data::new(RouteSharedData {
        provider: owners_factory.build(),
        jinja: match templates {
            Some(v) => v,
            None => crate::templates::templates_from_builtin(),
        },
        config: server_config.clone(),
    }));
    web_config.configure(|f| {
        register_routes_to_config::<OF::Source>(f);
    });

    web_config
}

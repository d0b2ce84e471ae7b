use actix_web::{HttpRequest, HttpResponse, Responder, get, http::StatusCode, web};
use log::debug;
use minijinja::context;

use crate::{owners::OwnersSource, routes::RouteSharedData, templates::TEMPLATE_INDEX};

pub async fn get_index<OS: OwnersSource>(data: web::Data<RouteSharedData<OS>>) -> HttpResponse {
    debug!("Index requested");
    data.render(
        StatusCode::OK,
        TEMPLATE_INDEX,
        context! {
            server => data.config.template_server_context()
        },
    )
}

pub async fn get_not_found<OS: OwnersSource>(
    data: web::Data<RouteSharedData<OS>>,
    req: HttpRequest,
) -> HttpResponse {
    debug!("Nothing at {}", req.uri());
    data.render_error(
        StatusCode::NOT_FOUND,
        format!("Nothing here at {}", req.uri().path()),
    )
}

#[get("/styles.css")]
pub async fn get_styles() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/css; charset=utf-8")
        .body(include_str!("../templates/styles.css"))
}

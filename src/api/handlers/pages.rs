// src/api/handlers/pages.rs
use actix_web::http::header::{self, ContentType};
use actix_web::{web, HttpResponse, Result};

use crate::api::AppState;
use crate::views::html;

pub async fn index() -> Result<HttpResponse> {
    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, html::EVALUATION_ROUTE))
        .finish())
}

pub async fn evaluation_page(state: web::Data<AppState>) -> Result<HttpResponse> {
    let view = state.evaluation_screen();
    let screen = view.load().await;
    log::debug!("Rendering evaluation screen ({})", screen.name());

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html::evaluation_page(&screen)))
}

pub async fn labeling_page(state: web::Data<AppState>) -> Result<HttpResponse> {
    let view = state.labeling_screen();
    let screen = view.load().await;
    log::debug!("Rendering labeling screen ({})", screen.name());

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(html::labeling_page(&screen, view.keys())))
}

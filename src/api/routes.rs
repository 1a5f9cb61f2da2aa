// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/events", web::get().to(handlers::ws_handler))
        .route("/static/{path:.*}", web::get().to(handlers::static_asset))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(handlers::health_check))
        )
        .service(
            web::scope("/classification")
                .route("/evaluation", web::get().to(handlers::evaluation_page))
                .route("/evaluation/refresh", web::post().to(handlers::refresh_evaluation))
                .route("/labeling", web::get().to(handlers::labeling_page))
                .route("/labeling/label/{label}", web::post().to(handlers::submit_label))
                .route("/labeling/skip", web::post().to(handlers::skip_message))
                .route("/labeling/keys", web::post().to(handlers::key_press))
        );
}

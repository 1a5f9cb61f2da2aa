// src/api/handlers/actions.rs
use actix_web::http::header;
use actix_web::{error, web, HttpResponse, Result};
use serde::Deserialize;
use serde_json::json;

use crate::api::AppState;
use crate::models::Label;
use crate::views::{html, ActionOutcome};

#[derive(Debug, Deserialize)]
pub struct KeyPress {
    pub key: String,
}

fn back_to(route: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, route))
        .finish()
}

pub async fn refresh_evaluation(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.evaluation_screen().refresh().await;
    Ok(back_to(html::EVALUATION_ROUTE))
}

/// "Yes"/"No" buttons. Answers once the label has been stored (or refused).
pub async fn submit_label(
    state: web::Data<AppState>,
    path: web::Path<u8>,
) -> Result<HttpResponse> {
    let label = Label::try_from(path.into_inner()).map_err(error::ErrorBadRequest)?;
    let view = state.labeling_screen();

    match view.label(label) {
        ActionOutcome::Submitted(_) => {
            view.settled().await;
        }
        other => log::info!("Label button ignored: {:?}", other),
    }
    Ok(back_to(html::LABELING_ROUTE))
}

pub async fn skip_message(state: web::Data<AppState>) -> Result<HttpResponse> {
    state.labeling_screen().skip().await;
    Ok(back_to(html::LABELING_ROUTE))
}

/// Keyboard shortcut relay from the browser: `{ "key": "y" }`.
pub async fn key_press(
    state: web::Data<AppState>,
    req: web::Json<KeyPress>,
) -> Result<HttpResponse> {
    let mut chars = req.key.chars();
    let key = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "key must be a single character"
            })));
        }
    };

    match state.keyboard.dispatch(key) {
        Some(outcome) => {
            if let ActionOutcome::Submitted(_) = outcome {
                if let Some(view) = state.open_labeling_screen() {
                    view.settled().await;
                }
            }
            Ok(HttpResponse::Ok().json(outcome))
        }
        None => Ok(HttpResponse::Ok().json(json!({ "outcome": "unhandled" }))),
    }
}

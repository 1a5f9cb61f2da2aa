// src/transport/http.rs

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::errors::{LabelerError, Result};
use crate::models::{EvaluationResult, LabeledDataIn, LabeledDataOut, MessageForLabeling};
use crate::transport::{ClassificationApi, EVALUATION_PATH, LABELING_PATH};

/// `ClassificationApi` over HTTP with a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpClassificationApi {
    client: Client,
    api_base: String,
}

impl HttpClassificationApi {
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    /// GET that maps 404 to `None`.
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.url(path);
        log::debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();

        if status == StatusCode::NOT_FOUND {
            log::debug!("GET {} -> 404, nothing available", url);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(api_error(resp).await);
        }

        Ok(Some(resp.json().await?))
    }
}

async fn api_error(resp: reqwest::Response) -> LabelerError {
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error body".to_string());
    log::warn!("Classification service answered {}: {}", status, body);
    LabelerError::ApiError { status, body }
}

fn acknowledgment(body: &[u8]) -> LabeledDataOut {
    if body.iter().all(u8::is_ascii_whitespace) {
        return LabeledDataOut(serde_json::Value::Null);
    }
    match serde_json::from_slice(body) {
        Ok(value) => LabeledDataOut(value),
        Err(e) => {
            log::debug!("Label acknowledgment is not JSON ({}), keeping it as text", e);
            LabeledDataOut(serde_json::Value::String(
                String::from_utf8_lossy(body).into_owned(),
            ))
        }
    }
}

impl ClassificationApi for HttpClassificationApi {
    async fn get_evaluation(&self) -> Result<Option<EvaluationResult>> {
        self.get_optional(EVALUATION_PATH).await
    }

    async fn get_labeling_message(&self) -> Result<Option<MessageForLabeling>> {
        self.get_optional(LABELING_PATH).await
    }

    async fn submit_label(&self, data: LabeledDataIn) -> Result<LabeledDataOut> {
        let url = self.url(LABELING_PATH);
        log::debug!(
            "POST {} message_id={} label={}",
            url,
            data.message_id,
            u8::from(data.label_manual)
        );

        let resp = self.client.post(&url).json(&data).send().await?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }

        // Any 2xx is the acknowledgment, with or without a body.
        let body = resp.bytes().await?;
        Ok(acknowledgment(&body))
    }
}

// src/transport/mod.rs

use crate::errors::Result;
use crate::models::{EvaluationResult, LabeledDataIn, LabeledDataOut, MessageForLabeling};

pub mod http;
#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpClassificationApi;

pub const EVALUATION_PATH: &str = "/evaluation";
pub const LABELING_PATH: &str = "/labeling";

/// Typed calls against the classification service.
///
/// Each call is a single request: no retry, no timeout beyond what the HTTP
/// client does by itself. The two reads report the service's "nothing yet"
/// answer (404) as `Ok(None)` rather than as an error.
pub trait ClassificationApi: Send + Sync {
    /// `GET /evaluation`. `None` while no labeled data exists.
    fn get_evaluation(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<EvaluationResult>>> + Send;

    /// `GET /labeling`. `None` once every message has been labeled.
    fn get_labeling_message(
        &self,
    ) -> impl std::future::Future<Output = Result<Option<MessageForLabeling>>> + Send;

    /// `POST /labeling` with the label as the JSON body.
    fn submit_label(
        &self,
        data: LabeledDataIn,
    ) -> impl std::future::Future<Output = Result<LabeledDataOut>> + Send;
}

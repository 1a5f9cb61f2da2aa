// src/query/classification.rs
//! Cache wiring for the classification endpoints.

use crate::models::{EvaluationResult, LabeledDataIn, LabeledDataOut, MessageForLabeling};
use crate::query::{Mutation, QueryClient, QueryKey, QueryObserver};
use crate::transport::ClassificationApi;

pub fn evaluation_query<A>(client: &QueryClient, api: &A) -> QueryObserver<EvaluationResult>
where
    A: ClassificationApi + Clone + 'static,
{
    let api = api.clone();
    client.observe(QueryKey::Evaluation, move || {
        let api = api.clone();
        async move { api.get_evaluation().await }
    })
}

pub fn labeling_message_query<A>(client: &QueryClient, api: &A) -> QueryObserver<MessageForLabeling>
where
    A: ClassificationApi + Clone + 'static,
{
    let api = api.clone();
    client.observe(QueryKey::LabelingMessage, move || {
        let api = api.clone();
        async move { api.get_labeling_message().await }
    })
}

/// Label submission. Once the service has stored the label, the evaluation
/// and the current message are both invalidated so observers re-fetch them.
pub fn submit_label_mutation<A>(
    client: &QueryClient,
    api: &A,
) -> Mutation<LabeledDataIn, LabeledDataOut>
where
    A: ClassificationApi + Clone + 'static,
{
    let api = api.clone();
    let client = client.clone();
    Mutation::new(move |data: LabeledDataIn| {
        let api = api.clone();
        async move { api.submit_label(data).await }
    })
    .on_success(move |_| {
        client.invalidate(QueryKey::Evaluation);
        client.invalidate(QueryKey::LabelingMessage);
    })
}

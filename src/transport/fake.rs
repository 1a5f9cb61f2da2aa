// src/transport/fake.rs
//! In-memory classification service for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tokio::sync::Semaphore;

use crate::errors::{LabelerError, Result};
use crate::models::{
    EvaluationResult, LabeledDataIn, LabeledDataOut, MessageForLabeling, Metrics,
};
use crate::transport::ClassificationApi;

#[derive(Clone, Default)]
pub(crate) struct FakeApi {
    inner: Arc<FakeState>,
}

struct FakeState {
    evaluation: Mutex<Option<EvaluationResult>>,
    evaluation_status: Mutex<Option<u16>>,
    messages: Mutex<VecDeque<MessageForLabeling>>,
    submit_status: Mutex<Option<u16>>,
    posted: Mutex<Vec<LabeledDataIn>>,
    evaluation_gets: AtomicUsize,
    message_gets: AtomicUsize,
    hold_submissions: AtomicBool,
    gate: Semaphore,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            evaluation: Mutex::new(None),
            evaluation_status: Mutex::new(None),
            messages: Mutex::new(VecDeque::new()),
            submit_status: Mutex::new(None),
            posted: Mutex::new(Vec::new()),
            evaluation_gets: AtomicUsize::new(0),
            message_gets: AtomicUsize::new(0),
            hold_submissions: AtomicBool::new(false),
            gate: Semaphore::new(0),
        }
    }
}

pub(crate) fn sample_evaluation() -> EvaluationResult {
    EvaluationResult {
        num_labeled_data: 120,
        metrics: Metrics {
            accuracy: 0.9,
            precision: 0.85,
            recall: 0.88,
            f1_score: 0.86,
            true_positives: 80,
            true_negatives: 40,
            false_positives: 5,
            false_negatives: 3,
        },
        recommendation: None,
    }
}

pub(crate) fn message(id: &str, text: &str) -> MessageForLabeling {
    MessageForLabeling {
        id: id.into(),
        text: text.to_string(),
    }
}

impl FakeApi {
    pub(crate) fn with_messages(messages: Vec<MessageForLabeling>) -> Self {
        let api = FakeApi::default();
        *api.inner.messages.lock().unwrap() = messages.into();
        api
    }

    pub(crate) fn set_evaluation(&self, eval: Option<EvaluationResult>) {
        *self.inner.evaluation.lock().unwrap() = eval;
    }

    pub(crate) fn fail_evaluation(&self, status: Option<u16>) {
        *self.inner.evaluation_status.lock().unwrap() = status;
    }

    pub(crate) fn fail_submissions(&self, status: Option<u16>) {
        *self.inner.submit_status.lock().unwrap() = status;
    }

    /// Submissions block until [`FakeApi::release_submission`] is called.
    pub(crate) fn hold_submissions(&self) {
        self.inner.hold_submissions.store(true, Ordering::SeqCst);
    }

    pub(crate) fn release_submission(&self) {
        self.inner.gate.add_permits(1);
    }

    pub(crate) fn posted(&self) -> Vec<LabeledDataIn> {
        self.inner.posted.lock().unwrap().clone()
    }

    pub(crate) fn evaluation_gets(&self) -> usize {
        self.inner.evaluation_gets.load(Ordering::SeqCst)
    }

    pub(crate) fn message_gets(&self) -> usize {
        self.inner.message_gets.load(Ordering::SeqCst)
    }
}

impl ClassificationApi for FakeApi {
    async fn get_evaluation(&self) -> Result<Option<EvaluationResult>> {
        self.inner.evaluation_gets.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.inner.evaluation_status.lock().unwrap() {
            return Err(LabelerError::ApiError {
                status,
                body: "evaluation failed".to_string(),
            });
        }
        Ok(self.inner.evaluation.lock().unwrap().clone())
    }

    async fn get_labeling_message(&self) -> Result<Option<MessageForLabeling>> {
        self.inner.message_gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.messages.lock().unwrap().front().cloned())
    }

    async fn submit_label(&self, data: LabeledDataIn) -> Result<LabeledDataOut> {
        self.inner.posted.lock().unwrap().push(data.clone());

        if self.inner.hold_submissions.load(Ordering::SeqCst) {
            let permit = self.inner.gate.acquire().await.unwrap();
            permit.forget();
        }

        if let Some(status) = *self.inner.submit_status.lock().unwrap() {
            return Err(LabelerError::ApiError {
                status,
                body: "label rejected".to_string(),
            });
        }

        let mut messages = self.inner.messages.lock().unwrap();
        messages.retain(|m| m.id != data.message_id);
        Ok(LabeledDataOut(json!({
            "message_id": data.message_id,
            "label_manual": u8::from(data.label_manual),
        })))
    }
}

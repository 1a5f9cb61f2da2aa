// src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate classifier performance computed server-side from the labeled pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub num_labeled_data: u64,
    pub metrics: Metrics,
    #[serde(default)]
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub sample_assessment: String,
    pub metrics_interpretation: String,
}

/// Opaque message identifier. Echoed back to the server in the JSON form it arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{}", n),
            MessageId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        MessageId::Text(value.to_string())
    }
}

impl From<i64> for MessageId {
    fn from(value: i64) -> Self {
        MessageId::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageForLabeling {
    pub id: MessageId,
    pub text: String,
}

/// Binary manual label. Travels as the bare integer `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    NoMatch,
    Match,
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        match label {
            Label::NoMatch => 0,
            Label::Match => 1,
        }
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Label::NoMatch),
            1 => Ok(Label::Match),
            other => Err(format!("label_manual must be 0 or 1, got {}", other)),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::NoMatch => write!(f, "No"),
            Label::Match => write!(f, "Yes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledDataIn {
    pub message_id: MessageId,
    pub label_manual: Label,
}

/// Server acknowledgment of a stored label. Its shape belongs to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabeledDataOut(pub serde_json::Value);

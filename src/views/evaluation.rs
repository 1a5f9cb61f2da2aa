// src/views/evaluation.rs
use chrono::{DateTime, Utc};

use crate::models::{EvaluationResult, Recommendation};
use crate::query::{evaluation_query, QueryClient, QueryObserver};
use crate::transport::ClassificationApi;
use crate::views::ViewState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Neutral,
    Highlight,
    Negative,
}

impl Tone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Positive => "tone-positive",
            Tone::Neutral => "tone-neutral",
            Tone::Highlight => "tone-highlight",
            Tone::Negative => "tone-negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub label: &'static str,
    pub value: String,
    pub tone: Tone,
}

/// Everything the dashboard shows once evaluation data exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationPanel {
    pub labeled_count: String,
    pub metrics: [Tile; 4],
    pub confusion: [Tile; 4],
    pub recommendation: Option<Recommendation>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl EvaluationPanel {
    pub fn new(eval: EvaluationResult, updated_at: Option<DateTime<Utc>>) -> Self {
        let m = &eval.metrics;
        let tile = |label, value: String, tone| Tile { label, value, tone };
        Self {
            labeled_count: group_thousands(eval.num_labeled_data),
            metrics: [
                tile("Accuracy", m.accuracy.to_string(), Tone::Positive),
                tile("Precision", m.precision.to_string(), Tone::Neutral),
                tile("Recall", m.recall.to_string(), Tone::Neutral),
                tile("F1 Score", m.f1_score.to_string(), Tone::Highlight),
            ],
            confusion: [
                tile("True Positives", m.true_positives.to_string(), Tone::Positive),
                tile("True Negatives", m.true_negatives.to_string(), Tone::Positive),
                tile("False Positives", m.false_positives.to_string(), Tone::Negative),
                tile("False Negatives", m.false_negatives.to_string(), Tone::Negative),
            ],
            recommendation: eval.recommendation,
            updated_at,
        }
    }
}

/// `1234567` -> `"1,234,567"`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Model evaluation dashboard.
pub struct EvaluationView {
    evaluation: QueryObserver<EvaluationResult>,
}

impl EvaluationView {
    pub fn open<A>(client: &QueryClient, api: &A) -> Self
    where
        A: ClassificationApi + Clone + 'static,
    {
        Self {
            evaluation: evaluation_query(client, api),
        }
    }

    pub fn screen(&self) -> ViewState<EvaluationPanel> {
        let result = self.evaluation.result();
        let updated_at = result.data_updated_at;
        ViewState::from_query(result).map(|eval| EvaluationPanel::new(eval, updated_at))
    }

    /// Fetch if nothing usable is cached, then render.
    pub async fn load(&self) -> ViewState<EvaluationPanel> {
        self.evaluation.ensure_fresh().await;
        self.screen()
    }

    /// Manual "Refresh Metrics".
    pub async fn refresh(&self) -> ViewState<EvaluationPanel> {
        log::info!("Refreshing evaluation metrics");
        self.evaluation.refetch().await;
        self.screen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::{sample_evaluation, FakeApi};

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[tokio::test]
    async fn renders_metrics_without_recommendation() {
        let api = FakeApi::default();
        api.set_evaluation(Some(sample_evaluation()));
        let view = EvaluationView::open(&QueryClient::new(), &api);

        let ViewState::Ready(panel) = view.load().await else {
            panic!("expected data");
        };
        let values: Vec<&str> = panel.metrics.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, ["0.9", "0.85", "0.88", "0.86"]);
        let counts: Vec<&str> = panel.confusion.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(counts, ["80", "40", "5", "3"]);
        assert_eq!(panel.labeled_count, "120");
        assert!(panel.recommendation.is_none());
        assert!(panel.updated_at.is_some());
    }

    #[tokio::test]
    async fn missing_evaluation_is_empty_and_not_retried() {
        let api = FakeApi::default();
        let view = EvaluationView::open(&QueryClient::new(), &api);

        assert_eq!(view.load().await, ViewState::Empty);
        tokio::task::yield_now().await;
        assert_eq!(view.load().await, ViewState::Empty);
        assert_eq!(api.evaluation_gets(), 1);
    }

    #[tokio::test]
    async fn error_shows_until_manual_refresh() {
        let api = FakeApi::default();
        api.fail_evaluation(Some(503));
        let view = EvaluationView::open(&QueryClient::new(), &api);

        assert!(matches!(view.load().await, ViewState::Error(msg) if msg.contains("503")));

        api.fail_evaluation(None);
        api.set_evaluation(Some(sample_evaluation()));
        assert!(matches!(view.refresh().await, ViewState::Ready(_)));
        assert_eq!(api.evaluation_gets(), 2);
    }
}

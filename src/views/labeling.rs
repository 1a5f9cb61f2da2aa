// src/views/labeling.rs
use serde::Serialize;
use std::sync::Arc;

use crate::models::{Label, LabeledDataIn, LabeledDataOut, MessageForLabeling};
use crate::query::{
    labeling_message_query, submit_label_mutation, Mutation, MutationState, QueryClient,
    QueryObserver,
};
use crate::transport::ClassificationApi;
use crate::views::{KeyListener, KeyMap, KeyboardHub, ViewState};

/// Result of a user action on the labeling screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ActionOutcome {
    Submitted(Label),
    Skipped,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// A label for the current message is still on its way.
    SubmissionPending,
    /// The shown message was just labeled and its replacement is loading.
    MessageRefreshing,
    NoMessage,
    UnboundKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelingPanel {
    pub message: MessageForLabeling,
    /// Buttons and shortcuts are inert while true.
    pub submitting: bool,
    pub last_error: Option<String>,
}

struct LabelingInner {
    message: QueryObserver<MessageForLabeling>,
    submit: Mutation<LabeledDataIn, LabeledDataOut>,
    keys: KeyMap,
}

impl LabelingInner {
    fn label(&self, label: Label) -> ActionOutcome {
        if self.submit.is_pending() {
            return ActionOutcome::Ignored(IgnoreReason::SubmissionPending);
        }

        let result = self.message.result();
        if result.is_stale {
            return ActionOutcome::Ignored(IgnoreReason::MessageRefreshing);
        }
        let ViewState::Ready(message) = ViewState::from_query(result) else {
            return ActionOutcome::Ignored(IgnoreReason::NoMessage);
        };

        let data = LabeledDataIn {
            message_id: message.id,
            label_manual: label,
        };
        match self.submit.mutate(data) {
            Some(_) => {
                log::info!("Submitting label {} for current message", label);
                ActionOutcome::Submitted(label)
            }
            None => ActionOutcome::Ignored(IgnoreReason::SubmissionPending),
        }
    }

    fn handle_key(&self, key: char) -> ActionOutcome {
        match self.keys.label_for(key) {
            Some(label) => self.label(label),
            None => ActionOutcome::Ignored(IgnoreReason::UnboundKey),
        }
    }
}

/// Manual labeling screen. Holds the keyboard for as long as it is open.
pub struct LabelingView {
    inner: Arc<LabelingInner>,
    _keys: KeyListener,
}

impl LabelingView {
    pub fn open<A>(client: &QueryClient, api: &A, keyboard: &KeyboardHub, keys: KeyMap) -> Self
    where
        A: ClassificationApi + Clone + 'static,
    {
        let inner = Arc::new(LabelingInner {
            message: labeling_message_query(client, api),
            submit: submit_label_mutation(client, api),
            keys,
        });

        let weak = Arc::downgrade(&inner);
        let listener = keyboard.listen(move |key| match weak.upgrade() {
            Some(inner) => inner.handle_key(key),
            None => ActionOutcome::Ignored(IgnoreReason::NoMessage),
        });

        Self {
            inner,
            _keys: listener,
        }
    }

    pub fn keys(&self) -> KeyMap {
        self.inner.keys
    }

    pub fn screen(&self) -> ViewState<LabelingPanel> {
        let result = self.inner.message.result();
        let submitting = self.inner.submit.is_pending() || result.is_stale;
        let last_error = match self.inner.submit.state() {
            MutationState::Error(err) => Some(err.message),
            _ => None,
        };
        ViewState::from_query(result).map(|message| LabelingPanel {
            message,
            submitting,
            last_error,
        })
    }

    pub async fn load(&self) -> ViewState<LabelingPanel> {
        self.inner.message.ensure_fresh().await;
        self.screen()
    }

    /// "Yes"/"No" buttons.
    pub fn label(&self, label: Label) -> ActionOutcome {
        self.inner.label(label)
    }

    pub fn handle_key(&self, key: char) -> ActionOutcome {
        self.inner.handle_key(key)
    }

    /// Ask for a message again without labeling the current one.
    pub async fn skip(&self) -> ActionOutcome {
        log::info!("Skipping current message");
        self.inner.message.refetch().await;
        ActionOutcome::Skipped
    }

    /// Wait until the submission in flight (if any) has resolved and the
    /// message it invalidated has been fetched again.
    pub async fn settled(&self) -> ViewState<LabelingPanel> {
        self.inner.submit.settled().await;
        self.inner.message.settle().await;
        self.screen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageId;
    use crate::transport::fake::{message, FakeApi};

    fn open(api: &FakeApi) -> (LabelingView, KeyboardHub) {
        let hub = KeyboardHub::new();
        let view = LabelingView::open(&QueryClient::new(), api, &hub, KeyMap::default());
        (view, hub)
    }

    fn shown_id(view: &LabelingView) -> Option<MessageId> {
        match view.screen() {
            ViewState::Ready(panel) => Some(panel.message.id),
            _ => None,
        }
    }

    #[tokio::test]
    async fn yes_key_posts_current_message_once() {
        let api = FakeApi::with_messages(vec![message("m1", "hello"), message("m2", "next")]);
        api.hold_submissions();
        let (view, hub) = open(&api);
        view.load().await;

        assert_eq!(hub.dispatch('Y'), Some(ActionOutcome::Submitted(Label::Match)));
        assert_eq!(
            view.handle_key('N'),
            ActionOutcome::Ignored(IgnoreReason::SubmissionPending)
        );
        assert_eq!(
            view.label(Label::Match),
            ActionOutcome::Ignored(IgnoreReason::SubmissionPending)
        );
        assert!(matches!(view.screen(), ViewState::Ready(p) if p.submitting));

        api.release_submission();
        view.settled().await;

        let posted = api.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].message_id, MessageId::from("m1"));
        assert_eq!(posted[0].label_manual, Label::Match);
        assert_eq!(shown_id(&view), Some(MessageId::from("m2")));
    }

    #[tokio::test]
    async fn no_key_labels_zero() {
        let api = FakeApi::with_messages(vec![message("m1", "hello")]);
        let (view, _hub) = open(&api);
        view.load().await;

        assert_eq!(view.handle_key('n'), ActionOutcome::Submitted(Label::NoMatch));
        assert_eq!(view.settled().await, ViewState::Empty);
        assert_eq!(api.posted()[0].label_manual, Label::NoMatch);
    }

    #[tokio::test]
    async fn failed_submission_keeps_message_and_reports_error() {
        let api = FakeApi::with_messages(vec![message("m1", "hello")]);
        api.fail_submissions(Some(422));
        let (view, _hub) = open(&api);
        view.load().await;

        assert_eq!(view.label(Label::Match), ActionOutcome::Submitted(Label::Match));
        let ViewState::Ready(panel) = view.settled().await else {
            panic!("message should still be shown");
        };
        assert_eq!(panel.message.id, MessageId::from("m1"));
        assert!(!panel.submitting);
        assert!(panel.last_error.unwrap().contains("422"));
        assert_eq!(api.message_gets(), 1);

        // the same action can be retried
        api.fail_submissions(None);
        assert_eq!(view.label(Label::Match), ActionOutcome::Submitted(Label::Match));
        view.settled().await;
        assert_eq!(api.posted().len(), 2);
    }

    #[tokio::test]
    async fn keys_without_message_do_nothing() {
        let api = FakeApi::with_messages(vec![]);
        let (view, _hub) = open(&api);

        assert_eq!(view.load().await, ViewState::Empty);
        assert_eq!(
            view.handle_key('y'),
            ActionOutcome::Ignored(IgnoreReason::NoMessage)
        );
        assert_eq!(
            view.handle_key('x'),
            ActionOutcome::Ignored(IgnoreReason::UnboundKey)
        );
        assert!(api.posted().is_empty());
    }

    #[tokio::test]
    async fn skip_refetches_without_posting() {
        let api = FakeApi::with_messages(vec![message("m1", "hello")]);
        let (view, _hub) = open(&api);
        view.load().await;

        assert_eq!(view.skip().await, ActionOutcome::Skipped);
        assert_eq!(api.message_gets(), 2);
        assert!(api.posted().is_empty());
        // the service decides what comes next; here it is the same message
        assert_eq!(shown_id(&view), Some(MessageId::from("m1")));
    }

    #[tokio::test]
    async fn closing_view_releases_keyboard() {
        let api = FakeApi::with_messages(vec![message("m1", "hello")]);
        let (view, hub) = open(&api);
        assert_eq!(hub.listener_count(), 1);

        drop(view);
        assert_eq!(hub.listener_count(), 0);
        assert!(hub.dispatch('y').is_none());
    }
}

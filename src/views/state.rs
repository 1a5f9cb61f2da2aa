// src/views/state.rs
use crate::query::QueryResult;

/// What a screen shows for one query. Exactly one branch at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    /// The service answered but has nothing yet.
    Empty,
    Ready(T),
}

impl<T> ViewState<T> {
    /// Precedence: loading, then error, then absence, then presence.
    pub fn from_query(result: QueryResult<T>) -> Self {
        if result.is_loading() {
            return ViewState::Loading;
        }
        if let Some(err) = result.error {
            return ViewState::Error(err.message);
        }
        match result.data {
            None => ViewState::Empty,
            Some(data) => ViewState::Ready(data),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Error(msg) => ViewState::Error(msg),
            ViewState::Empty => ViewState::Empty,
            ViewState::Ready(data) => ViewState::Ready(f(data)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Loading => "loading",
            ViewState::Error(_) => "error",
            ViewState::Empty => "empty",
            ViewState::Ready(_) => "ready",
        }
    }
}

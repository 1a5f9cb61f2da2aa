// src/query/mutation.rs
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::errors::Result;
use crate::query::QueryError;

type MutationFn<I, O> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<O>> + Send + Sync>;
type SuccessHook<O> = Arc<dyn Fn(&O) + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<O> {
    Idle,
    Pending,
    Success(O),
    Error(QueryError),
}

/// A tracked write. At most one call runs at a time; success hooks run after
/// the server acknowledged the write and before the call stops being pending.
pub struct Mutation<I, O> {
    run: MutationFn<I, O>,
    on_success: Vec<SuccessHook<O>>,
    pending: Arc<AtomicBool>,
    state: Arc<Mutex<MutationState<O>>>,
    settled: Arc<Notify>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Self {
            run: self.run.clone(),
            on_success: self.on_success.clone(),
            pending: self.pending.clone(),
            state: self.state.clone(),
            settled: self.settled.clone(),
        }
    }
}

impl<I, O> Mutation<I, O>
where
    I: Send + 'static,
    O: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        Self {
            run: Arc::new(move |input| run(input).boxed()),
            on_success: Vec::new(),
            pending: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(MutationState::Idle)),
            settled: Arc::new(Notify::new()),
        }
    }

    pub fn on_success<H>(mut self, hook: H) -> Self
    where
        H: Fn(&O) + Send + Sync + 'static,
    {
        self.on_success.push(Arc::new(hook));
        self
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> MutationState<O> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Start the write in the background. `None` if a previous call is still pending.
    pub fn mutate(&self, input: I) -> Option<JoinHandle<std::result::Result<O, QueryError>>> {
        if !self.begin() {
            return None;
        }
        Some(tokio::spawn(self.clone().execute(input)))
    }

    /// Run the write to completion. `None` if a previous call is still pending.
    pub async fn mutate_async(&self, input: I) -> Option<std::result::Result<O, QueryError>> {
        if !self.begin() {
            return None;
        }
        Some(self.clone().execute(input).await)
    }

    /// Resolves once no call is pending.
    pub async fn settled(&self) {
        loop {
            let notified = self.settled.notified();
            if !self.is_pending() {
                return;
            }
            notified.await;
        }
    }

    fn begin(&self) -> bool {
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::debug!("Mutation already pending, ignoring new call");
            return false;
        }
        self.set_state(MutationState::Pending);
        true
    }

    async fn execute(self, input: I) -> std::result::Result<O, QueryError> {
        let result = match (self.run)(input).await {
            Ok(output) => {
                for hook in &self.on_success {
                    hook(&output);
                }
                self.set_state(MutationState::Success(output.clone()));
                Ok(output)
            }
            Err(e) => {
                let err = QueryError::from(e);
                log::warn!("Mutation failed: {}", err);
                self.set_state(MutationState::Error(err.clone()));
                Err(err)
            }
        };

        self.pending.store(false, Ordering::SeqCst);
        self.settled.notify_waiters();
        result
    }

    fn set_state(&self, state: MutationState<O>) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

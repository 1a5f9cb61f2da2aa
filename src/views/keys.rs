// src/views/keys.rs
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::models::Label;
use crate::views::labeling::ActionOutcome;

/// Which keys label a message. Matching ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyMap {
    pub yes: char,
    pub no: char,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self { yes: 'y', no: 'n' }
    }
}

impl KeyMap {
    pub fn label_for(&self, key: char) -> Option<Label> {
        if key.eq_ignore_ascii_case(&self.yes) {
            Some(Label::Match)
        } else if key.eq_ignore_ascii_case(&self.no) {
            Some(Label::NoMatch)
        } else {
            None
        }
    }
}

type KeyHandler = Arc<dyn Fn(char) -> ActionOutcome + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    handlers: Vec<(u64, KeyHandler)>,
}

/// Routes key presses to whichever screen currently listens for them.
#[derive(Clone, Default)]
pub struct KeyboardHub {
    listeners: Arc<Mutex<Listeners>>,
}

impl KeyboardHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `handler`. It stays registered exactly as long as the returned listener lives.
    pub fn listen<H>(&self, handler: H) -> KeyListener
    where
        H: Fn(char) -> ActionOutcome + Send + Sync + 'static,
    {
        let mut listeners = self.lock();
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.handlers.push((id, Arc::new(handler)));
        log::debug!("Key listener #{} registered", id);

        KeyListener {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Deliver `key` to the most recently registered listener. `None` if nobody listens.
    pub fn dispatch(&self, key: char) -> Option<ActionOutcome> {
        let handler = self.lock().handlers.last().map(|(_, h)| h.clone())?;
        Some(handler(key))
    }

    pub fn listener_count(&self) -> usize {
        self.lock().handlers.len()
    }
}

/// Registration handle; dropping it unregisters the handler.
pub struct KeyListener {
    listeners: Weak<Mutex<Listeners>>,
    id: u64,
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut listeners = listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners.handlers.retain(|(id, _)| *id != self.id);
            log::debug!("Key listener #{} released", self.id);
        }
    }
}

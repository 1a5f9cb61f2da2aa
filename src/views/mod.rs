// src/views/mod.rs
pub mod evaluation;
pub mod html;
pub mod keys;
pub mod labeling;
pub mod state;

pub use evaluation::{EvaluationPanel, EvaluationView, Tile, Tone};
pub use keys::{KeyListener, KeyMap, KeyboardHub};
pub use labeling::{ActionOutcome, IgnoreReason, LabelingPanel, LabelingView};
pub use state::ViewState;

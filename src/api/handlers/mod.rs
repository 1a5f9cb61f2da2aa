// src/api/handlers/mod.rs
mod actions;
mod assets;
mod health;
mod pages;
pub mod ws;

pub use actions::{key_press, refresh_evaluation, skip_message, submit_label, KeyPress};
pub use assets::static_asset;
pub use health::health_check;
pub use pages::{evaluation_page, index, labeling_page};
pub use ws::{ws_handler, CacheNotice, WsBroker};

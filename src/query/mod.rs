// src/query/mod.rs
pub mod classification;
pub mod client;
pub mod mutation;

pub use classification::{evaluation_query, labeling_message_query, submit_label_mutation};
pub use client::{CacheEvent, QueryClient, QueryError, QueryKey, QueryObserver, QueryResult, QueryStatus};
pub use mutation::{Mutation, MutationState};

pub mod json_array_store;

pub use json_array_store::{JsonArrayStore, RecoveryPolicy};

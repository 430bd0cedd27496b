pub mod behavior;
pub mod context;
pub mod engine;
pub mod error;
pub mod host;
pub mod types;

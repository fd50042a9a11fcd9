// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod advisor;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod navigation;
pub mod pacer;
pub mod progress;
pub mod quiz;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod tokenizer;
pub mod tracker;

pub use session::{DisplayState, ReadingSession, SessionEvent};

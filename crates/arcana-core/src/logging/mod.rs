//! Logging abstractions for runtime-agnostic logging
//!
//! Components take an `Arc<dyn Logger>` so the host decides where messages go.
//! `TracingLogger` is the default and forwards to the `tracing` ecosystem.

mod traits;
mod noop;
mod memory;
mod tracing_logger;

pub use traits::{Logger, SharedLogger, LogLevel};
pub use noop::NoOpLogger;
pub use memory::MemoryLogger;
pub use tracing_logger::{TracingLogger, init_tracing};

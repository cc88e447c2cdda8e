//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and startup code call:
//!     → logger.rs (leveled application log calls)
//!         → entry.rs (LogEntry construction + rendering, color.rs for ANSI)
//!         → console.rs (stdout/stderr or in-memory sink)
//!         → collector.rs (breadcrumbs, captures)
//!             → http_collector.rs (JSON events over HTTP)
//!             → memory_collector.rs (recorded calls)
//!
//! Framework internals:
//!     → logging.rs (tracing subscriber)
//! ```
//!
//! # Design Decisions
//! - Logger and collector are injected, never global
//! - Collector delivery is fire-and-forget
//! - Identifiers correlate console lines with collector events

pub mod collector;
pub mod color;
pub mod console;
pub mod entry;
pub mod http_collector;
pub mod identifier;
pub mod logger;
pub mod logging;
pub mod memory_collector;

pub use collector::{build_collector, Breadcrumb, CaptureScope, Collector, CollectorUser, NoopCollector, Severity};
pub use console::{BufferConsole, ConsoleSink, StdConsole};
pub use entry::{LogContext, LogEntry, LogLevel};
pub use identifier::{IdGenerator, RandomIds};
pub use logger::{CollectorHandle, LoggedError, Logger, LoggerSettings};
pub use memory_collector::{MemoryCollector, RecordedCall};

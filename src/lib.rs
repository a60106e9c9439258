//! # dirmirror - One-way Live Directory Mirror
//!
//! dirmirror keeps destination directories in step with source directories.
//! Each configured watch pair is first synced in full, then every change the
//! filesystem reports below the source root is copied to the corresponding
//! path below the destination root. Deletions are never propagated.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dirmirror::{Config, Mirror, TracingReporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::resolve(None, Default::default())?;
//!     let _guard = dirmirror::logging::init(&config.log_settings())?;
//!     Mirror::new(config, TracingReporter::shared())?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod copier;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod exclusion;
pub mod initial_sync;
pub mod logging;
pub mod mapper;
pub mod mirror;
pub mod pair;
pub mod reporter;
pub mod shutdown;
pub mod validation;
pub mod watcher;

// Re-export commonly used types
pub use config::{Config, WatcherBackend};
pub use error::MirrorError;
pub use mirror::{Mirror, MirrorSummary};
pub use pair::WatchPair;
pub use reporter::{MirrorReporter, SkipReason, TracingReporter};

// vim: ts=4

//! RAD Lab notifier dispatcher and flavor handlers.
//!
//! This crate provides the [`Dispatcher`] that turns one build notification
//! into at most one handler invocation, and the five flavor handlers it
//! routes to.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The dispatcher sequences calls between domain
//! logic in the [`notifier`] crate and the port traits (document store, blob
//! store, notebook service). It contains no transport details of its own.
//!
//! ## Flow
//!
//! ```text
//! Received → Routed → LoggingHandler (alpha-fold, genomics ×2, silicon design)
//!                   → DataScienceHandler ─ SUCCESS → look up notebook instances
//!                                        └ other   → no-op
//! ```

pub mod dispatcher;
pub mod flavors;

pub use dispatcher::{Dispatcher, Outcome};
pub use flavors::{DataScienceHandler, FlavorHandler, HandlerContext, HandlerSet, LoggingHandler};

//! RAD Lab notifier event source.
//!
//! Receives build notifications pushed by a Pub/Sub subscription (directly or
//! through Eventarc) and hands each one to [`handlers::Dispatcher`].
//!
//! ## Routes
//!
//! | Method | Path | Behaviour |
//! |--------|------|-----------|
//! | `POST` | `/` | Decode the CloudEvent and dispatch it |
//! | `GET` | `/healthz` | Liveness probe |
//!
//! ## Status codes
//!
//! `204` for handled and ignored events, `400` for a body that is not a
//! CloudEvent, and `500` for any relay error. Non-2xx answers make the
//! delivery layer retry according to its own policy; nothing is retried here.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP framing and CloudEvent content modes live here.
//! The dispatcher sees only [`notifier::CloudEvent`].

pub mod cloudevent;
pub mod server;

pub use server::{router, serve, ListenerError};

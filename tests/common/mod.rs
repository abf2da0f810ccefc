//! Common test utilities and helpers
//!
//! Every integration test drives the full router in-process with
//! `tower::ServiceExt::oneshot` against an in-memory store.

#![allow(dead_code)]

pub mod app;
pub mod users;

pub use app::*;
pub use users::*;

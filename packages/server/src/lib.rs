//! Huddle chat server library.
//!
//! The core is the connection [`hub`]: a registry of live connections grouped
//! by room and a serialized event loop that fans messages out to them. Each
//! connection is driven by the read and write tasks in [`lifecycle`], and the
//! bus bridge in [`infrastructure::bus`] links hubs running in different
//! processes.

// layers
pub mod domain;
pub mod hub;
pub mod infrastructure;
pub mod lifecycle;
pub mod ui;
pub mod usecase;

// assembly
pub mod app;

//! Utilities shared by the Huddle server binary and its tests.

pub mod logger;
pub mod time;

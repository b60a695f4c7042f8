//! Data transfer objects for the bus wire format and the HTTP API.

pub mod bus;
mod conversion;
pub mod http;

pub use conversion::DecodeError;

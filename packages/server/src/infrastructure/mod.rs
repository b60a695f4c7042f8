//! Infrastructure layer: concrete collaborators behind the domain interfaces.

pub mod bus;
pub mod dto;
pub mod repository;
pub mod transport;

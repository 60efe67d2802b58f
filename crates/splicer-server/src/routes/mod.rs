//! Route handlers for the HTTP API.

pub mod admin;
pub mod lookup;
pub mod splice;
pub mod tags;

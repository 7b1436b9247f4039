//! Stonebridge Listings library.
//!
//! The listing proxy as a library, so the router can be mounted in-process
//! by tests and the binary stays a thin wrapper.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod hubspot;
pub mod routes;
pub mod state;
pub mod transform;

//! Stonebridge Core - Shared types library.
//!
//! This crate provides common types used across all Stonebridge gateway
//! components:
//! - `gate` - Authentication gate and CRM synchronization library
//! - `listings` - Listing search/detail proxy service
//! - `cli` - Command-line driver for the gate
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Emails, listing records and statuses, interest events,
//!   and type-safe ID newtypes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

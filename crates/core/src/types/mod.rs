//! Core types for the Stonebridge listings gateway.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod interest;
pub mod listing;

pub use email::{Email, EmailError};
pub use id::*;
pub use interest::{InterestEvent, InterestKind};
pub use listing::{ListingRecord, ListingStatus};

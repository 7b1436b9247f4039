//! Stonebridge listings gate library.
//!
//! Everything that sits between the public listings website and the CRM:
//!
//! - [`auth`] - email-based signup/login state machine gating listing access
//! - [`classifier`] - listing title to canonical project name mapping
//! - [`recorder`] - favorite/compare/inquiry interest tracking
//! - [`sync`] - CRM contact synchronization with transport fallback
//! - [`contacts`] - client for the contact verification backend
//! - [`store`] - durable visitor profile and session state
//!
//! The embedding application supplies the UI seams declared in [`app`]
//! (notifications, confirm dialogs, loading-state probes) and registers the
//! recorder as its interaction observer.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod auth;
pub mod classifier;
pub mod config;
pub mod contacts;
pub mod models;
pub mod recorder;
pub mod store;
pub mod sync;

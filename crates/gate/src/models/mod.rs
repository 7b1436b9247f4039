//! Domain models for the gate.

pub mod profile;

pub use profile::Profile;

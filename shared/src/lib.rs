//! Shared types and models for the Restaurant POS Management Platform
//!
//! This crate contains domain models, enums, and pure domain computation
//! (attendance/overtime math, stock arithmetic, state transitions) shared
//! between the backend and other components of the system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

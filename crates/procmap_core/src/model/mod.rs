//! Domain model for the area/process map.
//!
//! # Responsibility
//! - Define the canonical records shared by persistence and services.
//! - Own field-level validation and text normalization.
//!
//! # Invariants
//! - Ids are generated once and never reused.
//! - `created_at` never changes; `updated_at` strictly increases per mutation.
//! - Deletion is a hard delete: a record either exists or it does not.

pub mod area;
pub mod clock;
pub mod process;
pub mod validation;

//! Core use-case services.
//!
//! # Responsibility
//! - Enforce area/process business rules on top of a `Store`.
//! - Translate persistence failures into the service error taxonomy.

pub mod area_service;
pub mod error;
pub mod hierarchy;
pub mod process_service;

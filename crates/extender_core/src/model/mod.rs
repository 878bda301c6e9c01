//! Extender domain model.
//!
//! # Responsibility
//! - Define raw attribute values and value-type detection.
//! - Define the ordered attribute bag and its cursor/keyed views.
//! - Define the annotation/metadata extender built on that bag.
//!
//! # Invariants
//! - Stored payloads are kept raw; typed conversion happens on read.
//! - Attribute keys are never removed from a bag.

pub mod bag;
pub mod extender;
pub mod value;

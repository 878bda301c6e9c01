//! Inbound record import.
//!
//! # Responsibility
//! - Define the host entity contracts the import path mutates.
//! - Reconcile records onto entities in memory and drive import units.
//!
//! # Invariants
//! - Reconciliation is in-memory only; persistence happens once per unit.
//! - A failed unit leaves the entity store untouched.

pub mod entity;
pub mod memory;
pub mod reconcile;

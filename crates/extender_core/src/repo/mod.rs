//! Repository layer for extender persistence.
//!
//! # Responsibility
//! - Define the `save`/`delete` contract both extender variants rely on.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `MissingId`) in
//!   addition to DB transport errors.

pub mod extender_repo;

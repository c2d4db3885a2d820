//! Reference bonded-interaction types for the chorus synchronization
//! layer.
//!
//! Exercises the full stack the way a simulation front end would: bond
//! handles carry physical parameters, an [`Interactions`] map mirrors
//! them into the plain-data [`BondTable`], and everything replicates
//! through whatever context constructed it.
//!
//! # Surface
//!
//! - [`HarmonicBond`], [`CoulombPair`], [`TabulatedBond`] — the
//!   synchronized types, each answering a read-only `energy` method
//! - [`BondParams`] — the core-side plain data, with the energy math
//! - [`BondTable`] — keyed storage a force loop could read directly
//! - [`register_interaction_types`] — one call to register the whole
//!   surface under stable names

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bonds;
pub mod table;

pub use bonds::{BondParams, CoulombPair, HarmonicBond, TabulatedBond};
pub use table::{register_interaction_types, BondTable, Interactions};

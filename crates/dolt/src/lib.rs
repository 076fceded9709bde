//! Versioned data store: Git-like clone/open semantics over SQL tables.
//!
//! # Invariants
//! - A repository handle always points at an existing local clone.
//! - Every failure of the underlying tool surfaces as a `StoreError`.

mod cli;
mod store;

pub use cli::{DoltCli, DoltRepo, parse_rows};
pub use store::{Repository, Row, StoreError, VersionedStore};

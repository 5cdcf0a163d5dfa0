//! CEUR-WS single point of truth.
//!
//! Joins the on-disk proceedings mirror with the volume, paper, proceedings
//! and author-index snapshots, and renders the merged view as biblatex,
//! linked-data statements and wiki markup.

pub mod error;
pub mod render;
pub mod spt;

pub use error::{SptError, SptResult};
pub use spt::catalog::{Catalog, Entity};
pub use spt::config::SptConfig;

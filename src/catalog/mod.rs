//! Static catalogs: canonical questions and persona archetypes
//!
//! Both catalogs are immutable, process-wide tables built once at startup and
//! shared behind `Arc`. Nothing in the engine creates questions or archetypes
//! at runtime.

pub mod archetypes;
pub mod questions;

pub use archetypes::{Archetype, ArchetypeCatalog, MatchRule};
pub use questions::{Answer, Question, QuestionCatalog};

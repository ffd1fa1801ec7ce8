//! Utility modules shared by the pipeline phases.

pub mod exec;
pub mod hash;
pub mod path;
mod plural;

pub use plural::plural_count;

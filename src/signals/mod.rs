//! Signal derivation.
//!
//! Pure functions that turn normalized readings into labeled signal cards.
//! Every entry point (one-shot run, HTTP server) goes through this module, so
//! thresholds and label tables exist in exactly one place.

pub mod category;
pub mod derive;
pub mod format;

pub use category::Category;
pub use derive::*;

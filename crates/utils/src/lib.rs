//! Shared CLI utilities: output rendering and value formatting.

pub mod format;
pub mod output;

//! Built-in vendor dialects.

pub mod idrac8;
pub mod ilo;

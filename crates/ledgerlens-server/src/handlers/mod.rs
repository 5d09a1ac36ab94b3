//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analysis;
pub mod audit;
pub mod auth;
pub mod datasets;
pub mod records;
pub mod reports;

// Re-export all handlers for use in router
pub use analysis::*;
pub use audit::*;
pub use auth::*;
pub use datasets::*;
pub use records::*;
pub use reports::*;

//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Narrative analysis and analysis history
//! - `core` - Init and shared utilities (open_db, date windows, dataset lookup)
//! - `datasets` - Dataset management commands (list, create, delete)
//! - `import` - CSV import
//! - `records` - Record listing
//! - `reports` - Summary, revenue, expense and profit reports
//! - `serve` - Web server command

pub mod analyze;
pub mod core;
pub mod datasets;
pub mod import;
pub mod records;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use datasets::*;
pub use import::*;
pub use records::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount with thousands separators
pub fn money(amount: f64) -> String {
    ledgerlens_core::prompts::format_money(amount)
}

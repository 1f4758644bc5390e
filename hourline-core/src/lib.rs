//! # hourline-core
//!
//! Core library for hourline - a personal productivity tracker where every
//! hour of the day gets a 1-5 star rating.
//!
//! This library provides:
//! - Domain types for hour records and daily summaries
//! - Database storage layer with SQLite
//! - Achievement scoring and rule-based insight generation
//! - The rating write path with synchronous summary recomputation
//!
//! ## Architecture
//!
//! Data flows through two layers:
//! - **Canonical:** one [`HourRecord`] per (date, hour) pair, written only via
//!   the tracker's rating write path
//! - **Derived (regenerable):** one [`DailySummary`] per date, recomputed from
//!   the canonical records after every rating write
//!
//! UI consumers read records and summaries back and subscribe to change
//! notifications; they never write summaries themselves.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hourline_core::{Config, Database, Tracker};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! // The tracker owns all writes
//! let tracker = Tracker::new(db);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use tracker::Tracker;
pub use types::*;

// Public modules
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod insight;
pub mod logging;
pub mod scoring;
pub mod tracker;
pub mod types;

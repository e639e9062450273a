//! Crime-complaint report pipeline.
//!
//! Loads a complaint CSV, cleans it into typed records, computes grouped
//! counts and rankings, and renders them as SVG charts.

pub mod aggregator;
pub mod cleaner;
pub mod cleaning_steps;
pub mod config;
pub mod error;
pub mod event;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod report;
pub mod step;
pub mod table;
pub mod types;

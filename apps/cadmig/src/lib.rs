//! Cadmig core library.
//!
//! This crate exposes programmatic APIs for detecting and rewriting legacy
//! contract syntax in contract sources, in template literals embedded in
//! JS/TS host documents, and in JSON template records.
//!
//! High-level modules:
//! - `catalog`: Ordered rule catalog with detection patterns and fixes.
//! - `scanner`: Detector seam and the regex-backed scan.
//! - `context`: Marker and comment exclusion.
//! - `fragments`: Template-literal extraction from host documents.
//! - `report`: Offset to line/column rendering.
//! - `engine`: Detector + filter bundle producing diagnostics.
//! - `rewrite`: Non-overlapping fix application and multi-pass rewriting.
//! - `validate`: Legacy gate and confidence scoring.
//! - `migrate`: Template migration orchestrator with injected logging.
//! - `cli`, `config`, `lint`, `fix`, `templates`, `output`: CLI surface.
//! - `models`, `error`, `logging`, `utils`: Supporting types and helpers.
pub mod catalog;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod fix;
pub mod fragments;
pub mod lint;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod output;
pub mod report;
pub mod rewrite;
pub mod scanner;
pub mod templates;
pub mod utils;
pub mod validate;

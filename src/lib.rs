//! # repotrace: repository indexer and call-graph tracer
//!
//! Cuts a source tree into symbol-level chunks, persists them as a JSON
//! index, answers keyword and symbol queries over the chunks and traces
//! caller/callee relations between named definitions.
//!
//! ## Architecture
//!
//! - **[`config`]** - JSON configuration loading, defaults and validation
//! - **[`indexer`]** - Repository walking, block segmentation, windowing and index persistence
//! - **[`graph`]** - Tree-sitter call extraction, graph aggregation and symbol tracing
//! - **[`search`]** - Additive ranking, symbol lookup and keyword grep
//! - **[`docgen`]** - Per-module Markdown reference pages
//! - **[`cli`]** - Argument definitions, interactive command parsing and output formatting

pub mod cli;
pub mod config;
pub mod docgen;
pub mod graph;
pub mod indexer;
pub mod search;

//! # assetql
//!
//! Client side toolbox for an asset management service. Assets (name, category,
//! value, purchase date and an optional description) are stored by a backend
//! offering a small REST interface under `/api/assets`; this library loads the
//! complete list, keeps it as local cache and derives everything else from it.
//!
//! Building blocks are the data handlers (REST and in-memory), a filter, sort and
//! paginate pipeline for the asset table, a statistics engine for the dashboard
//! (totals, category shares, value distribution, purchase timeline and status
//! cohorts), CSV export and a controller that validates every change before it
//! is sent and reloads the full list afterwards.
//! The `assetql` binary offers all of this on the command line.

// module exports
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod datatypes;
pub mod debounce;
pub mod export;
pub mod format;
pub mod memory_handler;
pub mod render;
pub mod rest_handler;
pub mod sample_data;
pub mod stats;
pub mod table;

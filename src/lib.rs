pub mod analysis;
pub mod binning;
pub mod config;
pub mod error;
pub mod filter;
pub mod frame;
pub mod ingest;
pub mod output;
pub mod plot;
pub mod stats;

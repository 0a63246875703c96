//! Service layer for jobscrape.
//!
//! Domain logic separated from UI concerns, shared by the CLI and the web server.

pub mod ingest;

pub use ingest::IngestionService;

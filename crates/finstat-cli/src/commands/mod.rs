pub mod analyze;
pub mod ingest;

// Adapters layer: concrete implementations for external systems (CSV files, HTTP).

pub mod csv_source;
pub mod http;

pub mod account;
pub mod batch;
pub mod config;
pub mod credentials;
pub mod csv;
pub mod enrich;
pub mod output;
pub mod overrides;
pub mod scoring;

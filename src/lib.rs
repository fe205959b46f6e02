pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod figures;
pub mod output;
pub mod pipeline;
pub mod pollutant;
pub mod ranking;

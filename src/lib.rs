pub mod components;
pub mod config;
pub mod error;
pub mod import;
pub mod ocr;
pub mod ports;
pub mod schedule;
pub mod shutdown;
pub mod startup;
pub mod utils;

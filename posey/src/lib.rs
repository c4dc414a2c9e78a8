pub mod error;
pub mod name;
pub mod mirror;
#[allow(clippy::needless_range_loop)]
pub mod matrix;
pub mod pose;
pub mod host;
pub mod transfer;
pub mod library;
pub mod config;
pub mod clipboard;

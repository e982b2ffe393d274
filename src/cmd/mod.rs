pub mod config;
pub mod shell;

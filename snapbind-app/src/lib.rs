pub mod cli;
pub mod commands;
pub mod config;
pub mod progress;
pub mod provision;
pub mod status;

pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod manifest;
pub mod merge;
pub mod registry;

pub use anyhow::Result;

//! quick-apply library: recruiter resolution, application generation and delivery

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod input;
pub mod llm;
pub mod mail;
pub mod models;
pub mod output;
pub mod processing;
pub mod resolver;

pub use config::Config;
pub use error::{QuickApplyError, Result};

//! Core types shared across logfacade crates
//!
//! This crate provides the vocabulary used by both the error facility
//! and the logging facade:
//!
//! - **Levels**: the five facade severities and their ordering
//! - **Schema constants**: canonical encoder keys, level labels and ANSI escapes

pub mod level;
pub mod schema;

pub use level::Level;

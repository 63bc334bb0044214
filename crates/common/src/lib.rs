//! Common types shared across the roster reconciliation crates.

#![warn(clippy::pedantic)]

/// Module for identifier newtypes
pub mod types;

/// Module for shared configuration
pub mod config;

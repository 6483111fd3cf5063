//! # Configuration Module
//!
//! This module provides the startup configuration for DPI negotiation.

pub mod config;

pub use config::DpiConfig;

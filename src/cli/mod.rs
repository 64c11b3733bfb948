//! Command-line interface module
//!
//! Implements all CLI commands using clap:
//! - offer: Build and save an offer for one platform call
//! - config init: Initialize configuration file
//! - state reset: Clear persisted state
//! - show latest: Display the most recent offer

pub mod config;
pub mod offer;
pub mod show;
pub mod state;

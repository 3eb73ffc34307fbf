//! Core components, types, and utilities for the poll-translate-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The flag emoji to language table.
//! - Common types and result handling.

pub mod config;
pub mod languages;
pub mod types;

//! # WaveSight Common Library
//!
//! Shared code for the WaveSight services including:
//! - Database schema, migrations and row models
//! - Event types (WaveEvent enum) and EventBus
//! - Category mapping and performance tiers
//! - Typed rewards configuration (multipliers, base rates, XP levels)
//! - Earnings and XP calculators
//! - Configuration loading and authentication helpers

pub mod auth;
pub mod category;
pub mod config;
pub mod db;
pub mod earnings;
pub mod error;
pub mod events;
pub mod rewards;
pub mod sse;
pub mod tier;
pub mod xp;

pub use category::Category;
pub use error::{Error, Result};
pub use tier::PerformanceTier;

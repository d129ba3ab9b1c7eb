//! HTTP API handlers

pub mod auth;
pub mod earnings;
pub mod health;
pub mod middleware;
pub mod profile;
pub mod sse;
pub mod submissions;
pub mod votes;
pub mod xp;

//! Database operations for the API service

pub mod ledger;
pub mod profiles;
pub mod submissions;
pub mod votes;
pub mod xp_events;

//! Database module - schema, migrations, models and settings access

pub mod init;
pub mod migrations;
pub mod models;
pub mod settings;

pub use init::init_database;

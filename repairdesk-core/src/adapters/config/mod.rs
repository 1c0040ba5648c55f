//! Configuration types for database adapters.
//!
//! - `ConnectionConfig`: pool and timeout settings parsed from a URL
//! - `DatabaseSettings`: the user/password/host/name quadruple the operator
//!   supplies, turned into a connection URL
//!
//! # Security
//! `ConnectionConfig` never stores a password. `DatabaseSettings` keeps it in
//! a zeroizing buffer and never prints it.

mod connection;
mod settings;

pub use connection::ConnectionConfig;
pub use settings::DatabaseSettings;

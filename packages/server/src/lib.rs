//! Parlor chat relay server library.
//!
//! Accepts TCP connections, authenticates each client by user name and
//! relays text messages between the connected users.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

//! Code shared by the Parlor chat server and client.
//!
//! - `protocol`: wire envelope, payload schemas and the framed codec
//! - `logger`: tracing subscriber setup for the binaries
//! - `time`: timestamp helpers used for display

pub mod logger;
pub mod protocol;
pub mod time;

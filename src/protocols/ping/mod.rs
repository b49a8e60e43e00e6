//! Ping protocol implementation.
//!
//! Raw TCP bytes, no framing:
//! - Client sends: `ping` (trailing NUL bytes ignored)
//! - Server responds: `pong` (4 bytes, no delimiter)
//!
//! Anything else is silently ignored and the connection stays open.
//!
//! ```text
//! Request:  ping
//! Response: pong
//!
//! Request:  PING
//! Response: (nothing)
//! ```

pub mod handler;
pub mod parser;

pub use handler::handle_connection;

//! Protocol implementations.
//!
//! - `ping`: fixed ping/pong exchange over a raw byte stream

pub mod ping;

//! Ping protocol parser.

/// The only command that triggers a reply.
pub const PING: &[u8] = b"ping";

/// Reply sent for [`PING`]; no delimiter, no length prefix.
pub const PONG: &[u8] = b"pong";

/// Parsed read buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Exactly `ping` once trailing NUL bytes are removed.
    Ping,
    /// Anything else. Ignored without a reply.
    Unrecognized,
}

/// Parse one read buffer.
///
/// The whole buffer is inspected, zero padding included, so a short read
/// into a zeroed buffer and an explicitly NUL-padded payload are treated
/// the same. Matching is exact and case-sensitive.
pub fn parse(buffer: &[u8]) -> Command {
    if trim_trailing_nul(buffer) == PING {
        Command::Ping
    } else {
        Command::Unrecognized
    }
}

/// Strip trailing zero bytes.
fn trim_trailing_nul(buffer: &[u8]) -> &[u8] {
    let end = buffer
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |pos| pos + 1);
    &buffer[..end]
}

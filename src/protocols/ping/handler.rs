//! Ping protocol handler.

use bytes::BytesMut;
use std::convert::Infallible;
use std::io::{self, Write};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{trace, warn};

use super::parser::{self, Command, PONG};
use crate::server::ServerError;

/// Line printed to stdout for every matched ping.
pub const PING_RECEIVED: &str = "ping received, replying pong";

/// Print the ping diagnostic. A closed stdout is logged, never fatal.
fn report_ping<W: Write>(out: &mut W) {
    if let Err(e) = writeln!(out, "{PING_RECEIVED}") {
        warn!(error = %e, "Failed to print ping diagnostic");
    }
}

/// Serve a connection until it fails.
///
/// Each iteration reads once into a freshly zeroed buffer of
/// `buffer_size` bytes and compares the NUL-trimmed buffer against
/// `ping`. There is no reassembly across reads. The loop never ends
/// normally: a read error or end-of-stream is returned as
/// [`ServerError::Read`].
pub async fn handle_connection<S>(
    stream: &mut S,
    buffer_size: usize,
) -> Result<Infallible, ServerError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let mut buffer = BytesMut::zeroed(buffer_size);

        let n = stream.read(&mut buffer[..]).await.map_err(ServerError::Read)?;
        if n == 0 {
            return Err(ServerError::Read(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by peer",
            )));
        }
        trace!(bytes = n, "Read from connection");

        match parser::parse(&buffer) {
            Command::Ping => {
                report_ping(&mut io::stdout());
                // A broken peer shows up on the next read.
                if let Err(e) = stream.write_all(PONG).await {
                    warn!(error = %e, "Failed to write pong");
                }
            }
            Command::Unrecognized => {}
        }
    }
}

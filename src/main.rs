//! ping-listener: a single-connection ping/pong server
//!
//! Binds `localhost:9001`, accepts one client and answers every read
//! that is exactly `ping` (ignoring trailing NUL bytes) with `pong`.
//! Any bind, accept or read failure, including the client hanging up,
//! ends the process with exit code 1.

mod config;
mod protocols;
mod server;

use config::Config;
use server::ServerError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging; stdout is reserved for the ping diagnostic
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!(
        host = %config.host,
        port = config.port,
        buffer_size = config.buffer_size,
        "Starting ping-listener"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match runtime.block_on(server::run(&config)) {
        Ok(never) => match never {},
        Err(e) => std::process::exit(fatal_exit_code(&e)),
    }
}

/// Log a fatal server error and return the process exit code.
fn fatal_exit_code(err: &ServerError) -> i32 {
    error!(error = %err, "Fatal server error");
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_every_server_error_exits_with_one() {
        let errors = [
            ServerError::Bind {
                addr: "localhost:9001".to_string(),
                source: io::Error::new(io::ErrorKind::AddrInUse, "in use"),
            },
            ServerError::Accept(io::Error::new(io::ErrorKind::Other, "accept")),
            ServerError::Read(io::Error::new(io::ErrorKind::UnexpectedEof, "eof")),
        ];

        for err in &errors {
            assert_eq!(fatal_exit_code(err), 1);
        }
    }

    #[tokio::test]
    async fn test_peer_hangup_maps_to_exit_one() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Config::default()
        };
        let listening = server::Listening::bind(&config).unwrap();
        let addr = listening.local_addr();

        let client = tokio::net::TcpStream::connect(addr).await.unwrap();
        let connected = listening.accept_once().await.unwrap();
        drop(client);

        match connected.serve().await {
            Ok(never) => match never {},
            Err(e) => {
                assert!(matches!(e, ServerError::Read(_)));
                assert_eq!(fatal_exit_code(&e), 1);
            }
        }
    }
}

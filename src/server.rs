//! TCP listener for the ping protocol.
//!
//! The server is a two-state machine: [`Listening`] owns the bound socket,
//! and [`Listening::accept_once`] consumes it to produce [`Connected`].
//! Nothing turns a `Connected` back into a `Listening`, so at most one
//! peer is ever served. The listener stays bound inside `Connected`
//! until the process exits, so later peers sit in the backlog and are
//! never accepted.

use crate::config::Config;
use crate::protocols::ping;
use std::convert::Infallible;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info};

/// Backlog passed to `listen(2)`.
const LISTEN_BACKLOG: i32 = 128;

/// Listener errors. Every variant is fatal to the process.
#[derive(Debug)]
pub enum ServerError {
    Bind { addr: String, source: io::Error },
    Accept(io::Error),
    Read(io::Error),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Bind { addr, source } => {
                write!(f, "Failed to bind '{}': {}", addr, source)
            }
            ServerError::Accept(e) => write!(f, "Failed to accept connection: {}", e),
            ServerError::Read(e) => write!(f, "Failed to read from connection: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source),
            ServerError::Accept(e) | ServerError::Read(e) => Some(e),
        }
    }
}

/// Bound listener waiting for its single peer.
pub struct Listening {
    listener: TcpListener,
    local_addr: SocketAddr,
    buffer_size: usize,
}

/// Listener that has accepted its peer. Terminal.
pub struct Connected {
    stream: TcpStream,
    peer: SocketAddr,
    buffer_size: usize,
    // Held so the port stays bound; never accepted from again.
    _listener: TcpListener,
}

impl Listening {
    /// Bind the configured address.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        let addr = config.listen_addr();
        let listener = create_listener(&addr).map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        info!(address = %local_addr, "Server listening");

        Ok(Self {
            listener,
            local_addr,
            buffer_size: config.buffer_size,
        })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for exactly one peer.
    pub async fn accept_once(self) -> Result<Connected, ServerError> {
        let (stream, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
        debug!(peer = %peer, local = %self.local_addr(), "New connection");

        Ok(Connected {
            stream,
            peer,
            buffer_size: self.buffer_size,
            _listener: self.listener,
        })
    }
}

impl Connected {
    /// Address of the accepted peer.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Serve the peer until the connection fails.
    pub async fn serve(mut self) -> Result<Infallible, ServerError> {
        info!(peer = %self.peer_addr(), "Serving client");
        ping::handle_connection(&mut self.stream, self.buffer_size).await
    }
}

/// Bind, accept one peer and serve it. Only returns on error.
pub async fn run(config: &Config) -> Result<Infallible, ServerError> {
    let listening = Listening::bind(config)?;
    let connected = listening.accept_once().await?;
    connected.serve().await
}

/// Pick the address to bind from a resolved list.
///
/// IPv4 wins when present, so `localhost` binds `127.0.0.1` even where
/// the resolver lists `::1` first.
fn pick_listen_addr(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut first = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        first.get_or_insert(addr);
    }
    first
}

fn create_listener(addr: &str) -> io::Result<TcpListener> {
    let addr = pick_listen_addr(addr.to_socket_addrs()?).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("no address resolved for '{addr}'"),
        )
    })?;

    let socket = socket2::Socket::new(
        match addr {
            SocketAddr::V4(_) => socket2::Domain::IPV4,
            SocketAddr::V6(_) => socket2::Domain::IPV6,
        },
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    TcpListener::from_std(socket.into())
}

//! Client side request/response exchange
//!
//! One UDP socket per exchange. Each attempt sends the request and waits for
//! a single datagram, both bounded by the same timeout.

use radius_proto::{DecodeError, EncodeError, Packet};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::time::timeout as with_timeout;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("retries must be at least 1")]
    NoAttempts,
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("response identifier {got} does not match request {expected}")]
    IdentifierMismatch { expected: u8, got: u8 },
    #[error("response authenticator does not verify")]
    InvalidResponseAuthenticator,
}

/// Send `packet` to `server` and return the first datagram that comes back.
///
/// Up to `retries` attempts are made; the error of the last one is returned
/// when none succeeds.
pub async fn exchange(
    packet: &[u8],
    server: SocketAddr,
    retries: usize,
    timeout: Duration,
) -> Result<Vec<u8>, ClientError> {
    let local: SocketAddr = if server.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    let socket = UdpSocket::bind(local).await?;
    socket.connect(server).await?;

    let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE];
    let mut last_error = ClientError::NoAttempts;

    for attempt in 1..=retries {
        match attempt_once(&socket, packet, &mut buf, timeout).await {
            Ok(len) => return Ok(buf[..len].to_vec()),
            Err(e) => {
                debug!(server = %server, attempt, error = %e, "RADIUS exchange attempt failed");
                last_error = e;
            }
        }
    }

    if retries > 0 {
        warn!(server = %server, retries, "RADIUS server did not answer");
    }
    Err(last_error)
}

async fn attempt_once(
    socket: &UdpSocket,
    packet: &[u8],
    buf: &mut [u8],
    timeout: Duration,
) -> Result<usize, ClientError> {
    with_timeout(timeout, socket.send(packet))
        .await
        .map_err(|_| ClientError::Timeout(timeout))??;
    let len = with_timeout(timeout, socket.recv(buf))
        .await
        .map_err(|_| ClientError::Timeout(timeout))??;
    Ok(len)
}

/// Encode `request`, exchange it and decode the reply.
///
/// The reply must carry the request's identifier and a Response
/// Authenticator that verifies with the request's secret.
pub async fn send(
    request: &mut Packet,
    server: SocketAddr,
    retries: usize,
    timeout: Duration,
) -> Result<Packet, ClientError> {
    let wire = request.encode()?;
    let reply = exchange(&wire, server, retries, timeout).await?;
    let response = Packet::decode(&reply)?;

    if response.identifier != request.identifier {
        return Err(ClientError::IdentifierMismatch {
            expected: request.identifier,
            got: response.identifier,
        });
    }
    if !response.verify_response(&request.authenticator, &request.secret)? {
        return Err(ClientError::InvalidResponseAuthenticator);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exchange_echo() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 64];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&buf[..len], peer).await.unwrap();
        });

        let reply = exchange(b"ping", addr, 3, Duration::from_secs(2)).await.unwrap();
        assert_eq!(reply, b"ping");
    }

    #[tokio::test]
    async fn test_exchange_times_out() {
        // bound but never answers
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();

        let result = exchange(b"ping", addr, 2, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(ClientError::Timeout(_))));
        drop(silent);
    }

    #[tokio::test]
    async fn test_exchange_zero_retries() {
        let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
        let result = exchange(b"ping", addr, 0, Duration::from_millis(10)).await;
        assert!(matches!(result, Err(ClientError::NoAttempts)));
    }
}

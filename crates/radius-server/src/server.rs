use crate::config::Config;
use radius_proto::attributes::{Attribute, AttributeType};
use radius_proto::auth::{decrypt_user_password, secrets_match};
use radius_proto::{AcctStatusType, Code, EncodeError, Packet};
use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// A decoded datagram handed to a [`Handler`]
#[derive(Debug, Clone)]
pub struct Request {
    /// When the datagram was read off the socket
    pub received_at: Instant,
    pub remote_addr: SocketAddr,
    /// Shared secret configured for `remote_addr`
    pub secret: Vec<u8>,
    /// Decoded packet, with `secret` already set
    pub packet: Packet,
}

/// Request handler
///
/// Called on its own task for every packet that decodes. Returning a packet
/// sends it back to the peer; returning `None` drops the request silently.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> Option<Packet>;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Option<Packet> + Send + Sync,
{
    fn handle(&self, request: &Request) -> Option<Packet> {
        self(request)
    }
}

/// Built-in handler: accounting, PAP against a local user table and Status-Server
#[derive(Debug, Default, Clone)]
pub struct DefaultHandler {
    users: HashMap<String, String>,
}

impl DefaultHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        let mut handler = Self::new();
        for user in &config.users {
            handler.add_user(&user.username, &user.password);
        }
        handler
    }

    pub fn add_user(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.users.insert(username.into(), password.into());
    }

    fn authenticate(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|p| secrets_match(p.as_bytes(), password.as_bytes()))
            .unwrap_or(false)
    }

    fn handle_accounting_request(&self, request: &Request) -> Option<Packet> {
        let packet = &request.packet;
        match packet.check_accounting_request_authenticator(&request.secret) {
            Ok(true) => {}
            Ok(false) => {
                // RFC 2866 Section 3: silently discard on a bad authenticator
                warn!(
                    client_addr = %request.remote_addr,
                    request_id = packet.identifier,
                    "Accounting-Request authenticator mismatch"
                );
                return None;
            }
            Err(e) => {
                warn!(
                    client_addr = %request.remote_addr,
                    request_id = packet.identifier,
                    error = %e,
                    "Accounting-Request could not be verified"
                );
                return None;
            }
        }

        let session_id = packet
            .find_attribute(AttributeType::AcctSessionId)
            .and_then(|attr| attr.as_text().ok())
            .unwrap_or("");
        let status = AcctStatusType::from_packet(packet)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        info!(
            client_addr = %request.remote_addr,
            request_id = packet.identifier,
            session_id = %session_id,
            status = %status,
            "Accounting request accepted"
        );

        let mut response = Packet::response_to(packet, Code::AccountingResponse);
        copy_proxy_state(packet, &mut response);
        Some(response)
    }

    fn handle_access_request(&self, request: &Request) -> Option<Packet> {
        let packet = &request.packet;
        let username = packet
            .find_attribute(AttributeType::UserName)
            .and_then(|attr| attr.as_text().ok())
            .unwrap_or("");

        let password = packet
            .find_attribute(AttributeType::UserPassword)
            .and_then(|attr| attr.as_bytes().ok())
            .and_then(|hidden| {
                decrypt_user_password(hidden, &request.secret, &packet.authenticator)
                    .map_err(|e| {
                        debug!(username = %username, error = %e, "Could not recover User-Password");
                    })
                    .ok()
            });

        let accepted = match password {
            Some(password) => self.authenticate(username, &password),
            None => false,
        };

        let mut response = if accepted {
            info!(
                username = %username,
                client_addr = %request.remote_addr,
                request_id = packet.identifier,
                "Authentication successful"
            );
            Packet::response_to(packet, Code::AccessAccept)
        } else {
            warn!(
                username = %username,
                client_addr = %request.remote_addr,
                request_id = packet.identifier,
                "Authentication failed"
            );
            let mut reject = Packet::response_to(packet, Code::AccessReject);
            reject.add_attribute(Attribute::string(
                AttributeType::ReplyMessage,
                "Authentication failed",
            ));
            reject
        };
        copy_proxy_state(packet, &mut response);
        Some(response)
    }
}

/// Echo Proxy-State attributes in order (RFC 2865 Section 5.33)
fn copy_proxy_state(request: &Packet, response: &mut Packet) {
    for attr in request.find_all_attributes(AttributeType::ProxyState) {
        response.add_attribute(attr.clone());
    }
}

impl Handler for DefaultHandler {
    fn handle(&self, request: &Request) -> Option<Packet> {
        match request.packet.code {
            Code::AccountingRequest => self.handle_accounting_request(request),
            Code::AccessRequest => self.handle_access_request(request),
            // RFC 5997: answer Status-Server to show the server is alive
            Code::StatusServer => Some(Packet::response_to(&request.packet, Code::AccessAccept)),
            code => {
                debug!(
                    packet_type = %code,
                    client_addr = %request.remote_addr,
                    "Unsupported packet type"
                );
                None
            }
        }
    }
}

/// Listener settings
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Shared secret used when no `config` is given
    pub secret: Vec<u8>,
    pub handler: Arc<dyn Handler>,
    /// Optional full configuration with per-client secrets
    pub config: Option<Arc<Config>>,
}

impl ServerConfig {
    pub fn new(
        bind_addr: SocketAddr,
        secret: impl Into<Vec<u8>>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        ServerConfig {
            bind_addr,
            secret: secret.into(),
            handler,
            config: None,
        }
    }

    pub fn from_config(config: Config, handler: Arc<dyn Handler>) -> Result<Self, ServerError> {
        let bind_addr = config.socket_addr()?;
        let secret = config.secret.clone().into_bytes();
        Ok(ServerConfig {
            bind_addr,
            secret,
            handler,
            config: Some(Arc::new(config)),
        })
    }

    fn secret_for(&self, source_ip: IpAddr) -> &[u8] {
        match self.config {
            Some(ref config) => config.secret_for(source_ip),
            None => &self.secret,
        }
    }

    /// An empty client list accepts every peer
    fn is_client_authorized(&self, source_ip: IpAddr) -> bool {
        match self.config {
            Some(ref config) if !config.clients.is_empty() => {
                config.find_client(source_ip).is_some()
            }
            _ => true,
        }
    }
}

/// Receive errors that leave the socket usable, such as an ICMP
/// port-unreachable from an earlier reply surfacing as `ConnectionReset`
fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
    )
}

/// UDP listener dispatching each decoded packet to the handler on its own task
pub struct RadiusServer {
    config: Arc<ServerConfig>,
    socket: Arc<UdpSocket>,
}

impl RadiusServer {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let socket = UdpSocket::bind(config.bind_addr).await?;
        info!("RADIUS server listening on {}", socket.local_addr()?);

        Ok(RadiusServer {
            config: Arc::new(config),
            socket: Arc::new(socket),
        })
    }

    /// Local address, useful when bound to port 0
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.socket.local_addr().map_err(ServerError::from)
    }

    /// Receive loop; only returns on a socket error
    pub async fn run(&self) -> Result<(), ServerError> {
        let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE];

        loop {
            let (len, addr) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "Transient receive error, continuing");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if len == 0 {
                continue;
            }
            let received_at = Instant::now();
            let data = &buf[..len];

            if !self.config.is_client_authorized(addr.ip()) {
                warn!(
                    client_addr = %addr,
                    request_id = data.get(1).copied().unwrap_or(0),
                    "Rejected request from unauthorized client"
                );
                continue;
            }

            let mut packet = match Packet::decode(data) {
                Ok(packet) => packet,
                Err(e) => {
                    error!(client_addr = %addr, error = %e, len, "Packet decode failed");
                    continue;
                }
            };
            let secret = self.config.secret_for(addr.ip()).to_vec();
            packet.secret = secret.clone();

            debug!(
                packet_type = %packet.code,
                client_addr = %addr,
                request_id = packet.identifier,
                "Received RADIUS packet"
            );

            let request = Request {
                received_at,
                remote_addr: addr,
                secret,
                packet,
            };
            let config = Arc::clone(&self.config);
            let socket = Arc::clone(&self.socket);

            tokio::spawn(async move {
                if let Err(e) = Self::handle_request(request, config, socket).await {
                    debug!("Error handling request from {}: {}", addr, e);
                }
            });
        }
    }

    async fn handle_request(
        request: Request,
        config: Arc<ServerConfig>,
        socket: Arc<UdpSocket>,
    ) -> Result<(), ServerError> {
        let Some(mut response) = config.handler.handle(&request) else {
            return Ok(());
        };

        let response_data = response.encode()?;
        socket.send_to(&response_data, request.remote_addr).await?;

        debug!(
            response_type = %response.code,
            client_addr = %request.remote_addr,
            request_id = response.identifier,
            elapsed_us = request.received_at.elapsed().as_micros() as u64,
            "Sent RADIUS response"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_for(packet: Packet, secret: &[u8]) -> Request {
        let wire = {
            let mut packet = packet;
            packet.encode().unwrap()
        };
        let mut decoded = Packet::decode(&wire).unwrap();
        decoded.secret = secret.to_vec();
        Request {
            received_at: Instant::now(),
            remote_addr: "127.0.0.1:4000".parse().unwrap(),
            secret: secret.to_vec(),
            packet: decoded,
        }
    }

    fn access_request(username: &str, password: &str, secret: &[u8]) -> Packet {
        let mut packet = Packet::with_identifier(Code::AccessRequest, 9, secret);
        packet.add_attribute(Attribute::string(AttributeType::UserName, username));
        packet.add_attribute(Attribute::string(AttributeType::ProxyState, "proxy-1"));
        packet.add_user_password(password.as_bytes()).unwrap();
        packet
    }

    #[test]
    fn test_default_handler_accounting() {
        let mut packet = Packet::with_identifier(Code::AccountingRequest, 4, "acct");
        packet.add_attribute(AcctStatusType::Start.to_attribute());
        let request = request_for(packet, b"acct");

        let response = DefaultHandler::new().handle(&request).unwrap();
        assert_eq!(response.code, Code::AccountingResponse);
        assert_eq!(response.identifier, 4);
        assert_eq!(response.request_authenticator, request.packet.authenticator);
    }

    #[test]
    fn test_default_handler_accounting_bad_secret() {
        let mut packet = Packet::with_identifier(Code::AccountingRequest, 4, "acct");
        packet.add_attribute(AcctStatusType::Stop.to_attribute());
        let request = request_for(packet, b"other");
        assert!(DefaultHandler::new().handle(&request).is_none());
    }

    #[test]
    fn test_default_handler_pap() {
        let mut handler = DefaultHandler::new();
        handler.add_user("alice", "wonderland");

        let request = request_for(access_request("alice", "wonderland", b"s3cr3t"), b"s3cr3t");
        let response = handler.handle(&request).unwrap();
        assert_eq!(response.code, Code::AccessAccept);
        assert_eq!(
            response
                .find_attribute(AttributeType::ProxyState)
                .unwrap()
                .as_text()
                .unwrap(),
            "proxy-1"
        );

        let request = request_for(access_request("alice", "wrong", b"s3cr3t"), b"s3cr3t");
        assert_eq!(handler.handle(&request).unwrap().code, Code::AccessReject);
    }

    #[test]
    fn test_default_handler_rejects_unknown_user() {
        let handler = DefaultHandler::new();
        let request = request_for(access_request("mallory", "x", b"s"), b"s");
        let response = handler.handle(&request).unwrap();
        assert_eq!(response.code, Code::AccessReject);
        assert!(response.find_attribute(AttributeType::ReplyMessage).is_some());
    }

    #[test]
    fn test_default_handler_status_server() {
        let packet = Packet::with_identifier(Code::StatusServer, 77, "s");
        let request = request_for(packet, b"s");
        let response = DefaultHandler::new().handle(&request).unwrap();
        assert_eq!(response.code, Code::AccessAccept);
        assert_eq!(response.identifier, 77);
    }

    #[test]
    fn test_default_handler_ignores_replies() {
        let mut request = request_for(Packet::with_identifier(Code::AccessAccept, 1, "s"), b"s");
        request.packet.code = Code::AccessReject;
        assert!(DefaultHandler::new().handle(&request).is_none());
    }

    #[test]
    fn test_closure_handler() {
        let handler = |request: &Request| Some(Packet::response_to(&request.packet, Code::CoaAck));
        let request = request_for(Packet::with_identifier(Code::CoaRequest, 3, "s"), b"s");
        assert_eq!(handler.handle(&request).unwrap().code, Code::CoaAck);
    }

    #[test]
    fn test_default_handler_password_prefix_rejected() {
        let mut handler = DefaultHandler::new();
        handler.add_user("alice", "wonderland");

        for attempt in ["wonder", "wonderland!", "Wonderland", ""] {
            let request = request_for(access_request("alice", attempt, b"s"), b"s");
            assert_eq!(
                handler.handle(&request).unwrap().code,
                Code::AccessReject,
                "password {:?} should be rejected",
                attempt
            );
        }
    }

    #[test]
    fn test_transient_receive_errors() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(is_transient(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!is_transient(&io::Error::from(io::ErrorKind::AddrNotAvailable)));
    }

    #[test]
    fn test_server_config_secret_lookup() {
        let mut config = Config::default();
        config.secret = "default".to_string();
        config.clients = vec![crate::config::Client {
            address: "10.0.0.0/8".to_string(),
            secret: "nas".to_string(),
            name: None,
            enabled: true,
        }];
        let server_config =
            ServerConfig::from_config(config, Arc::new(DefaultHandler::new())).unwrap();

        assert_eq!(server_config.secret_for("10.1.1.1".parse().unwrap()), b"nas");
        assert_eq!(server_config.secret_for("192.0.2.1".parse().unwrap()), b"default");
        assert!(server_config.is_client_authorized("10.1.1.1".parse().unwrap()));
        assert!(!server_config.is_client_authorized("192.0.2.1".parse().unwrap()));
    }
}

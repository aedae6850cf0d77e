use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Local user checked by PAP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
}

/// A NAS allowed to talk to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    /// Client IP address or network (supports CIDR notation)
    pub address: String,
    /// Shared secret for this client
    pub secret: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Client {
    /// Parse the client address as an IP network; a bare address becomes /32 or /128
    pub fn parse_network(&self) -> Result<IpNetwork, ConfigError> {
        if let Ok(network) = self.address.parse::<IpNetwork>() {
            return Ok(network);
        }
        if let Ok(ip) = self.address.parse::<IpAddr>() {
            return Ok(IpNetwork::from(ip));
        }
        Err(ConfigError::Invalid(format!(
            "Invalid client address: {}",
            self.address
        )))
    }

    pub fn matches(&self, source_ip: IpAddr) -> Result<bool, ConfigError> {
        Ok(self.parse_network()?.contains(source_ip))
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

/// Server configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,

    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Shared secret for peers not matched by `clients`
    #[serde(default = "default_secret")]
    pub secret: String,

    #[serde(default)]
    pub clients: Vec<Client>,

    #[serde(default)]
    pub users: Vec<User>,

    /// Log level: "trace", "debug", "info", "warn", "error" (default: "info")
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_listen_address() -> String {
    "0.0.0.0".to_string()
}

fn default_listen_port() -> u16 {
    1813 // RADIUS accounting port
}

fn default_secret() -> String {
    "testing123".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_address: default_listen_address(),
            listen_port: default_listen_port(),
            secret: default_secret(),
            clients: vec![],
            users: vec![],
            log_level: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr: IpAddr = self.listen_address.parse().map_err(|_| {
            ConfigError::Invalid(format!("Invalid IP address: {}", self.listen_address))
        })?;
        Ok(SocketAddr::new(addr, self.listen_port))
    }

    /// First enabled client whose network contains `source_ip`
    pub fn find_client(&self, source_ip: IpAddr) -> Option<&Client> {
        self.clients
            .iter()
            .filter(|client| client.enabled)
            .find(|client| matches!(client.matches(source_ip), Ok(true)))
    }

    /// Client-specific secret, or the default secret when no client matches
    pub fn secret_for(&self, source_ip: IpAddr) -> &[u8] {
        self.find_client(source_ip)
            .map(Client::secret)
            .unwrap_or_else(|| self.secret.as_bytes())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.secret.is_empty() {
            return Err(ConfigError::Invalid("Secret cannot be empty".to_string()));
        }

        for client in &self.clients {
            if client.secret.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "Client {} has empty secret",
                    client.address
                )));
            }
            client.parse_network()?;
        }

        if self.users.iter().any(|user| user.username.is_empty()) {
            return Err(ConfigError::Invalid("User has empty username".to_string()));
        }

        Ok(())
    }

    /// Configuration written out when no config file exists yet
    pub fn example() -> Self {
        Config {
            listen_address: "0.0.0.0".to_string(),
            listen_port: 1813,
            secret: "testing123".to_string(),
            clients: vec![
                Client {
                    address: "192.168.1.0/24".to_string(),
                    secret: "client_secret_1".to_string(),
                    name: Some("Internal Network".to_string()),
                    enabled: true,
                },
                Client {
                    address: "10.0.0.1".to_string(),
                    secret: "client_secret_2".to_string(),
                    name: Some("BRAS".to_string()),
                    enabled: true,
                },
            ],
            users: vec![User {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            }],
            log_level: Some("info".to_string()),
        }
    }
}

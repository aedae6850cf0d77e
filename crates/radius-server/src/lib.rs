//! UDP transport around `radius-proto`
//!
//! A Tokio listener that decodes every datagram and hands it to a
//! [`Handler`] on its own task, plus a client-side [`client::exchange`]
//! helper with retries and timeouts.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_server::{DefaultHandler, RadiusServer, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut handler = DefaultHandler::new();
//!     handler.add_user("alice", "password");
//!
//!     let config = ServerConfig::new("0.0.0.0:1813".parse()?, b"secret", Arc::new(handler));
//!     let server = RadiusServer::new(config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod server;

pub use client::{exchange, ClientError};
pub use config::{Client, Config, ConfigError, User};
pub use server::{DefaultHandler, Handler, RadiusServer, Request, ServerConfig, ServerError};

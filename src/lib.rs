//! # tinyhttpd
//!
//! A tiny async HTTP/1.x server that answers every connection with one
//! canned response: `GET` gets a fixed body, `HEAD` gets the same headers
//! without it, and every other method gets `501 Not Implemented`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tinyhttpd::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         body: "Hello, World!".to_owned(),
//!         ..ServerConfig::default()
//!     };
//!     let server = Server::bind(config).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatch;
pub mod http;
pub mod server;

pub use config::{ConfigError, ServerConfig};
pub use dispatch::Dispatcher;
pub use http::{Headers, Method, Request, RequestError, Response, StatusCode};
pub use server::{Server, ServerError};

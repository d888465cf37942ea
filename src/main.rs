use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinyhttpd::{Server, ServerConfig};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Dummy HTTP server: GET gets a fixed body, HEAD its headers, anything else 501.
#[derive(Debug, Parser)]
#[command(name = "tinyhttpd", version, about)]
struct Args {
    /// Port to listen on [default: 8080]
    port: Option<u16>,

    /// Host or IP address to bind [default: 127.0.0.1]
    #[arg(long)]
    host: Option<String>,

    /// Body served to GET requests (overrides the config file)
    #[arg(long)]
    body: Option<String>,

    /// JSON config file; PORT and `--host` override its `addr`
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<ServerConfig, tinyhttpd::ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_json_file(path)?,
            None => ServerConfig::default(),
        };

        if self.port.is_some() || self.host.is_some() || self.config.is_none() {
            let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
            let port = self.port.unwrap_or(DEFAULT_PORT);
            config.addr = if host.contains(':') {
                format!("[{host}]:{port}")
            } else {
                format!("{host}:{port}")
            };
        }
        if let Some(body) = self.body {
            config.body = body;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Args::parse().into_config()?;
    let server = Server::bind(config).await?;
    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> ServerConfig {
        Args::try_parse_from(std::iter::once("tinyhttpd").chain(args.iter().copied()))
            .unwrap()
            .into_config()
            .unwrap()
    }

    #[test]
    fn no_arguments() {
        assert_eq!(config(&[]), ServerConfig::default());
    }

    #[test]
    fn positional_port() {
        assert_eq!(config(&["9090"]).addr, "127.0.0.1:9090");
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        assert_eq!(config(&["--host", "::1", "8000"]).addr, "[::1]:8000");
    }

    #[test]
    fn body_override() {
        assert_eq!(config(&["--body", "Hello, World!"]).body, "Hello, World!");
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Args::try_parse_from(["tinyhttpd", "http"]).is_err());
    }
}

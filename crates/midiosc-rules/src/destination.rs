//! Where outbound OSC datagrams go.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3819;

/// A UDP host and port.
///
/// Parsed from either `host:port` or a bare port number, in which case the
/// host is `localhost`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub host: String,
    pub port: u16,
}

impl Destination {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// OSC URL form, e.g. `osc.udp://localhost:3819/`.
    pub fn url(&self) -> String {
        format!("osc.udp://{}:{}/", self.host, self.port)
    }
}

impl Default for Destination {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

fn parse_port(s: &str) -> Option<u16> {
    s.parse::<u16>().ok().filter(|port| *port > 0)
}

impl FromStr for Destination {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidDestination(s.to_string());

        match s.rsplit_once(':') {
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(invalid());
                }
                let port = parse_port(port).ok_or_else(invalid)?;
                Ok(Self::new(host, port))
            }
            None => {
                let port = parse_port(s).ok_or_else(invalid)?;
                Ok(Self::new(DEFAULT_HOST, port))
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

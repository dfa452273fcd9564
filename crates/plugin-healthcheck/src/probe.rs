//! Startup dependency probes.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// A dependency check evaluated during the launch gate.
///
/// Every failing probe contributes to a no-go vote carrying the probe's
/// name and failure reason, so operators can tell from the log which
/// dependency blocked startup.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Short name used in votes and logs.
    fn name(&self) -> &str;

    /// Check the dependency, returning a human-readable reason on failure.
    async fn check(&self) -> Result<(), String>;
}

/// Probe that opens a TCP connection to an address.
///
/// Covers the common cases (databases, caches, upstream services) without
/// speaking any application protocol.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    name: String,
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(name: impl Into<String>, addr: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addr: addr.into(),
            timeout: Duration::from_secs(2),
        }
    }

    /// Override the connect timeout (2 seconds by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Probe for TcpProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), String> {
        tracing::debug!(probe = %self.name, addr = %self.addr, "Probing TCP endpoint");
        match timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(format!("connect to {} failed: {}", self.addr, e)),
            Err(_) => Err(format!("connect to {} timed out", self.addr)),
        }
    }
}

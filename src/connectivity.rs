//! Network reachability checks.

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

/// Reports whether the network is currently reachable.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
  async fn is_online(&self) -> bool;
}

/// Probe that opens a TCP connection to the API host.
#[derive(Debug, Clone)]
pub struct TcpProbe {
  host: String,
  port: u16,
  timeout: Duration,
}

impl TcpProbe {
  pub fn new(host: impl Into<String>, port: u16) -> Self {
    Self {
      host: host.into(),
      port,
      timeout: Duration::from_secs(3),
    }
  }

  /// Probe the host serving `base_url`, falling back to the TMDB API host.
  pub fn for_base_url(base_url: &str) -> Self {
    Url::parse(base_url)
      .ok()
      .and_then(|url| {
        let host = url.host_str()?.to_string();
        let port = url.port_or_known_default()?;
        Some(Self::new(host, port))
      })
      .unwrap_or_else(|| Self::new("api.themoviedb.org", 443))
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
  async fn is_online(&self) -> bool {
    let addr = (self.host.as_str(), self.port);
    let online = matches!(
      tokio::time::timeout(self.timeout, TcpStream::connect(addr)).await,
      Ok(Ok(_))
    );
    debug!(host = %self.host, port = self.port, online, "Connectivity check");
    online
  }
}

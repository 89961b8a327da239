//! Network availability checks

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tracing::debug;

/// Current network link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkState {
    Offline,
    /// Connected over a metered link
    Cellular,
    Wifi,
}

impl NetworkState {
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Offline)
    }
}

/// "Is a network currently available"
#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn network_state(&self) -> NetworkState;

    async fn is_available(&self) -> bool {
        self.network_state().await.is_connected()
    }
}

/// Fixed answer, for offline operation and tests
#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub NetworkState);

#[async_trait]
impl Connectivity for StaticConnectivity {
    async fn network_state(&self) -> NetworkState {
        self.0
    }
}

/// Reachability probe against a known `host:port`
///
/// A successful TCP connect within the timeout counts as connected. Whether
/// the link is metered cannot be observed this way and is configured.
#[derive(Debug, Clone)]
pub struct ProbeConnectivity {
    host: String,
    timeout: Duration,
    metered: bool,
}

impl ProbeConnectivity {
    pub fn new(host: impl Into<String>, timeout: Duration, metered: bool) -> Self {
        Self {
            host: host.into(),
            timeout,
            metered,
        }
    }
}

#[async_trait]
impl Connectivity for ProbeConnectivity {
    async fn network_state(&self) -> NetworkState {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.host)).await {
            Ok(Ok(_)) if self.metered => NetworkState::Cellular,
            Ok(Ok(_)) => NetworkState::Wifi,
            Ok(Err(e)) => {
                debug!("Connectivity probe to {} failed: {}", self.host, e);
                NetworkState::Offline
            }
            Err(_) => {
                debug!("Connectivity probe to {} timed out", self.host);
                NetworkState::Offline
            }
        }
    }
}

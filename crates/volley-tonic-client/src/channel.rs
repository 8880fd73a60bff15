//! Builds the shared client channel from immutable configuration.

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};
use volley_tonic_core::{CertificateMaterial, CredentialError, TrustMode, client_tls_config};

/// HTTP/2 keepalive parameters for the client side of the channel.
///
/// When enabled, the client probes the connection on `interval` even without
/// active calls (`permit_without_stream`) and tears it down if no response
/// arrives within `timeout`.
#[derive(Clone, Copy, Debug)]
pub struct KeepaliveConfig {
    pub interval: Duration,
    pub timeout: Duration,
    pub permit_without_stream: bool,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(5),
            permit_without_stream: true,
        }
    }
}

/// Everything needed to dial the server. Immutable once constructed and
/// shared read-only across all invoker workers.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    pub target_addr: String,
    pub trust: TrustMode,
    pub material: CertificateMaterial,
    /// Expected server name on the presented certificate, when it differs
    /// from the dialed host.
    pub domain_override: Option<String>,
    pub keepalive: Option<KeepaliveConfig>,
}

impl ChannelConfig {
    /// The dial URI; the scheme follows the trust mode.
    fn uri(&self) -> String {
        match self.trust {
            TrustMode::None => format!("http://{}", self.target_addr),
            TrustMode::ServerAuth | TrustMode::MutualAuth => {
                format!("https://{}", self.target_addr)
            }
        }
    }
}

/// Errors raised while building or connecting the channel. All are fatal
/// before any call is issued.
#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("invalid target address {target:?}")]
    InvalidTarget {
        target: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to apply TLS configuration")]
    Tls {
        #[source]
        source: tonic::transport::Error,
    },

    #[error("failed to connect to {target}")]
    Connect {
        target: String,
        #[source]
        source: tonic::transport::Error,
    },
}

/// Dials the configured target and returns the shared channel.
///
/// The returned [`Channel`] is cheap to clone and safe for concurrent use by
/// any number of workers; the underlying multiplexed HTTP/2 session carries
/// all in-flight calls.
pub async fn connect(config: &ChannelConfig) -> Result<Channel, ChannelError> {
    let tls = client_tls_config(
        config.trust,
        &config.material,
        config.domain_override.as_deref(),
    )?;

    let mut endpoint =
        Endpoint::from_shared(config.uri()).map_err(|source| ChannelError::InvalidTarget {
            target: config.target_addr.clone(),
            source,
        })?;

    // Keepalive composes independently of the trust mode.
    if let Some(ka) = config.keepalive {
        endpoint = endpoint
            .http2_keep_alive_interval(ka.interval)
            .keep_alive_timeout(ka.timeout)
            .keep_alive_while_idle(ka.permit_without_stream);
    }

    if let Some(tls) = tls {
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|source| ChannelError::Tls { source })?;
    }

    endpoint
        .connect()
        .await
        .map_err(|source| ChannelError::Connect {
            target: config.target_addr.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_follows_trust_mode() {
        let mut config = ChannelConfig {
            target_addr: "localhost:50051".into(),
            trust: TrustMode::None,
            material: CertificateMaterial::default(),
            domain_override: None,
            keepalive: None,
        };
        assert_eq!(config.uri(), "http://localhost:50051");

        config.trust = TrustMode::ServerAuth;
        assert_eq!(config.uri(), "https://localhost:50051");

        config.trust = TrustMode::MutualAuth;
        assert_eq!(config.uri(), "https://localhost:50051");
    }

    #[tokio::test]
    async fn invalid_target_is_rejected_before_dialing() {
        let config = ChannelConfig {
            target_addr: "not a host".into(),
            trust: TrustMode::None,
            material: CertificateMaterial::default(),
            domain_override: None,
            keepalive: None,
        };
        assert!(matches!(
            connect(&config).await,
            Err(ChannelError::InvalidTarget { .. })
        ));
    }

    #[tokio::test]
    async fn credential_failure_precedes_any_dial() {
        let config = ChannelConfig {
            target_addr: "localhost:50051".into(),
            trust: TrustMode::MutualAuth,
            material: CertificateMaterial::default(),
            domain_override: None,
            keepalive: None,
        };
        assert!(matches!(
            connect(&config).await,
            Err(ChannelError::Credential(
                CredentialError::MissingMaterial { .. }
            ))
        ));
    }
}

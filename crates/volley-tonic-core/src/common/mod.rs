mod duration;
mod error;
mod trust;

pub use duration::{InvalidDuration, parse_duration};
pub use error::Error;
pub use trust::{
    CertificateMaterial, CredentialError, TrustMode, client_tls_config, server_tls_config,
};

//! Error types for the echo service.
//!
//! The central `Error` enum captures the reportable failure cases of the
//! procedure handlers. It implements `From<Error>` for `tonic::Status` so
//! handlers can propagate typed errors and clients still receive proper gRPC
//! status codes.

use tonic::Status;

/// Unified error type for the echo service handlers.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The client request was invalid or exceeded constraints.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidRequest { reason } => Status::invalid_argument(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn invalid_request_maps_to_invalid_argument() {
        let status: Status = Error::InvalidRequest {
            reason: "duration_ms must be non-negative".into(),
        }
        .into();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert!(status.message().contains("duration_ms"));
    }
}

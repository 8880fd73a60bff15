//! Shared contract for the volley echo harness: generated gRPC bindings, the
//! service error type, the transport-trust layer and small config helpers used
//! by both the client and server binaries.

mod common;
pub use common::*;

/// Generated gRPC bindings for the `volley` protobuf package.
pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/volley.rs"));

    /// Encoded file descriptor set, served via gRPC reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        include_bytes!(concat!(env!("OUT_DIR"), "/volley_descriptor.bin"));
}

//! Client side of the volley echo harness: channel construction from
//! immutable configuration and a fixed worker-pool invocation harness that
//! drives many simultaneous calls under per-call deadlines.

pub mod channel;
pub mod config;
pub mod invoker;
pub mod procedures;

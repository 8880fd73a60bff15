//! Echo procedure handlers.
//!
//! [`EchoService`] is the concrete implementation of the `Echo` gRPC service.
//! The handlers are stateless; the transport runtime dispatches one handler
//! invocation per inbound call, with arbitrarily many in flight per
//! connection.

use tokio::time::{Duration, sleep};
use tonic::{Request, Response, Status};
use volley_tonic_core::Error;
use volley_tonic_core::proto::echo_server::Echo;
use volley_tonic_core::proto::{
    DelayReply, DelayRequest, GreetReply, GreetRequest, IngestReply, IngestRequest,
};

/// Stateless implementation of the echo service.
#[derive(Clone, Default)]
pub struct EchoService;

#[tonic::async_trait]
impl Echo for EchoService {
    async fn greet(&self, req: Request<GreetRequest>) -> Result<Response<GreetReply>, Status> {
        let name = req.into_inner().name;
        tracing::info!(%name, "greet");
        Ok(Response::new(GreetReply {
            greeting: format!("Hello {name}"),
        }))
    }

    /// Sleeps for the requested duration before confirming. The sleep is
    /// dropped when the client's per-call deadline cancels the request.
    async fn delay(&self, req: Request<DelayRequest>) -> Result<Response<DelayReply>, Status> {
        let duration_ms = req.into_inner().duration_ms;
        if duration_ms < 0 {
            return Err(Error::InvalidRequest {
                reason: format!("duration_ms must be non-negative, got {duration_ms}"),
            }
            .into());
        }
        tracing::debug!(duration_ms, "sleeping");
        sleep(Duration::from_millis(duration_ms as u64)).await;
        Ok(Response::new(DelayReply {
            confirmation: format!("Slept {duration_ms} ms"),
        }))
    }

    async fn ingest(&self, req: Request<IngestRequest>) -> Result<Response<IngestReply>, Status> {
        let received = req.into_inner().payload.len();
        tracing::debug!(received, "ingest");
        Ok(Response::new(IngestReply {
            byte_count: received.to_string(),
        }))
    }
}

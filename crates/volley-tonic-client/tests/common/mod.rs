//! In-process echo service shared by the end-to-end test binaries.

use std::time::Duration;

use tonic::{Request, Response, Status};
use volley_tonic_core::proto::echo_server::Echo;
use volley_tonic_core::proto::{
    DelayReply, DelayRequest, GreetReply, GreetRequest, IngestReply, IngestRequest,
};

#[derive(Clone, Default)]
pub struct TestEcho;

#[tonic::async_trait]
impl Echo for TestEcho {
    async fn greet(&self, req: Request<GreetRequest>) -> Result<Response<GreetReply>, Status> {
        let name = req.into_inner().name;
        Ok(Response::new(GreetReply {
            greeting: format!("Hello {name}"),
        }))
    }

    async fn delay(&self, req: Request<DelayRequest>) -> Result<Response<DelayReply>, Status> {
        let duration_ms = req.into_inner().duration_ms;
        if duration_ms < 0 {
            return Err(Status::invalid_argument("duration_ms must be non-negative"));
        }
        tokio::time::sleep(Duration::from_millis(duration_ms as u64)).await;
        Ok(Response::new(DelayReply {
            confirmation: format!("Slept {duration_ms} ms"),
        }))
    }

    async fn ingest(&self, req: Request<IngestRequest>) -> Result<Response<IngestReply>, Status> {
        let received = req.into_inner().payload.len();
        Ok(Response::new(IngestReply {
            byte_count: received.to_string(),
        }))
    }
}

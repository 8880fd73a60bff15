//! Adapters binding the echo procedures to the invoker's call shape.

use std::time::Duration;

use bytes::Bytes;
use tonic::Status;
use tonic::transport::Channel;
use volley_tonic_core::proto::{DelayRequest, GreetRequest, IngestRequest, echo_client::EchoClient};

/// One-shot greeting, used as a connectivity smoke check before a run.
pub async fn greet_once(channel: Channel, name: &str) -> Result<String, Status> {
    let mut client = EchoClient::new(channel);
    let reply = client
        .greet(GreetRequest {
            name: name.to_string(),
        })
        .await?;
    Ok(reply.into_inner().greeting)
}

/// Deadline-bounded [`greet_once`]; an expired deadline surfaces as
/// `DeadlineExceeded` instead of hanging the caller.
pub async fn greet_within(
    channel: Channel,
    name: &str,
    deadline: Duration,
) -> Result<String, Status> {
    match tokio::time::timeout(deadline, greet_once(channel, name)).await {
        Ok(result) => result,
        Err(_) => Err(Status::deadline_exceeded(format!(
            "greeting did not complete within {deadline:?}"
        ))),
    }
}

/// Greet call that checks the greeting actually carries the name.
pub async fn greet(channel: Channel, name: String) -> Result<(), Status> {
    let greeting = greet_once(channel, &name).await?;
    if greeting.contains(&name) {
        Ok(())
    } else {
        Err(Status::data_loss(format!(
            "greeting {greeting:?} does not contain {name:?}"
        )))
    }
}

/// Asks the server to sleep for `duration_ms` before replying.
pub async fn delay(channel: Channel, duration_ms: i64) -> Result<(), Status> {
    let mut client = EchoClient::new(channel);
    client.delay(DelayRequest { duration_ms }).await?;
    Ok(())
}

/// Sends the payload and checks the echoed byte count matches what was sent.
pub async fn ingest(channel: Channel, payload: Bytes) -> Result<(), Status> {
    let sent = payload.len();
    let mut client = EchoClient::new(channel);
    let reply = client.ingest(IngestRequest { payload }).await?.into_inner();
    if reply.byte_count == sent.to_string() {
        Ok(())
    } else {
        Err(Status::data_loss(format!(
            "server counted {} bytes, sent {sent}",
            reply.byte_count
        )))
    }
}

/// Builds an ingest payload of exactly `size` bytes of arbitrary content.
pub fn make_payload(size: usize) -> Bytes {
    // Cycle through byte values so the payload is not all zeroes.
    Bytes::from_iter((0..size).map(|i| (i % 251) as u8))
}

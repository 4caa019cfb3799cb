//! JSON client for a remote overlap service
//!
//! Transport mechanics (HTTP, sockets, retries) belong to whoever implements
//! [`OverlapTransport`]; the client only encodes requests and decodes replies.

use std::future::Future;

use log::trace;

use super::{OverlapRequest, OverlapResponse, OverlapService, OverlapServiceError};

/// Error type returned by transports
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Delivers one JSON request body and returns the JSON reply body
pub trait OverlapTransport {
    /// Send `body`, wait for the reply
    fn send(&self, body: String) -> impl Future<Output = Result<String, TransportError>>;
}

/// Overlap service backed by a JSON round trip over some transport
#[derive(Debug, Clone)]
pub struct JsonOverlapClient<T> {
    transport: T,
}

impl<T: OverlapTransport> JsonOverlapClient<T> {
    /// Create a client over a transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: OverlapTransport> OverlapService for JsonOverlapClient<T> {
    async fn check_overlap(&self, request: &OverlapRequest) -> Result<OverlapResponse, OverlapServiceError> {
        let body = request.to_json()?;
        trace!("Overlap request: {}", body);

        let reply = self
            .transport
            .send(body)
            .await
            .map_err(|e| OverlapServiceError::Transport(e.to_string()))?;
        trace!("Overlap reply: {}", reply);

        OverlapResponse::from_json(&reply)
    }
}

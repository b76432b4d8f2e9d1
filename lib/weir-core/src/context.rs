//! Per-request context shared by every pipeline stage.

use std::net::SocketAddr;

use crate::{Features, Request, Response};

/// Transport details of the connection a request arrived on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Host-assigned connection identifier.
    pub id: u64,
    /// Local socket address, if known.
    pub local_addr: Option<SocketAddr>,
    /// Peer socket address, if known.
    pub remote_addr: Option<SocketAddr>,
}

/// Mutable state of one request: request, response, connection and features.
///
/// A context is owned by its request and handed to each stage by exclusive
/// borrow, so stages never observe each other concurrently.
#[derive(Debug, Default)]
pub struct RequestContext {
    request: Request,
    response: Response,
    connection: ConnectionInfo,
    features: Features,
}

impl RequestContext {
    /// Creates a context for `request` with an empty `200 OK` response.
    #[must_use]
    pub fn new(request: Request) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    /// Sets the connection information.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.connection = connection;
        self
    }

    /// The incoming request.
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the incoming request.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// The response being built.
    #[must_use]
    pub const fn response(&self) -> &Response {
        &self.response
    }

    /// Mutable access to the response being built.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Connection information.
    #[must_use]
    pub const fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    /// Request features.
    #[must_use]
    pub const fn features(&self) -> &Features {
        &self.features
    }

    /// Mutable access to request features.
    pub fn features_mut(&mut self) -> &mut Features {
        &mut self.features
    }

    /// Consume into the response.
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }
}

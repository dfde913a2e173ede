//! The event source seam and the session principal.

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;

use crate::errors::TransportError;

/// A stream of raw message payloads, one per server frame.
///
/// The stream yields an error when the connection fails and ends when the
/// server closes it.
pub type FrameStream = BoxStream<'static, Result<String, TransportError>>;

/// The authenticated user a connection is opened for.
#[derive(Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: String,
    access_token: Option<String>,
}

impl Principal {
    /// Creates a principal without credentials.
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_token: None,
        }
    }

    /// Sets the bearer token sent when opening the stream.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Returns the user id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Returns the bearer token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Principal")
            .field("user_id", &self.user_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Opens server-push streams.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Opens a stream for the principal, credentials included.
    async fn open(&self, principal: &Principal) -> Result<FrameStream, TransportError>;
}

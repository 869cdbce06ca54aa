//! Error types for the identity layer.

/// Errors that can occur while resolving a connection's identity.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The token was invalid, expired, or rejected by the account store.
    #[error("authentication failed: {0}")]
    Failed(String),
}

//! Demo server binary with an in-memory account scheme.
//!
//! Token format: `user:<id>:<name>` authenticates as a registered
//! account; anything else plays as a guest under that display name. A
//! real deployment replaces [`DevAuth`] with its session/account store
//! and [`MemoryMatchLog`] with a persistent match table.

use std::sync::Arc;

use supergrid::prelude::*;
use tracing_subscriber::EnvFilter;

struct DevAuth;

impl Authenticator for DevAuth {
    async fn authenticate(&self, token: &str) -> Result<Party, AuthError> {
        if let Some(rest) = token.strip_prefix("user:") {
            let (id, name) = rest
                .split_once(':')
                .ok_or_else(|| AuthError::Failed("expected user:<id>:<name>".into()))?;
            if id.is_empty() || name.is_empty() {
                return Err(AuthError::Failed("empty user id or name".into()));
            }
            return Ok(Party {
                account: AccountId(format!("user-{id}")),
                name: name.to_string(),
                guest: false,
            });
        }
        let name = if token.is_empty() { "guest" } else { token };
        Ok(issue_guest(name))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let server = ServerBuilder::new()
        .bind("0.0.0.0:8080")
        .build(DevAuth, Arc::new(MemoryMatchLog::new()))
        .await?;
    server.run().await?;
    Ok(())
}

//! Server builder and accept loop.
//!
//! Ties the layers together: TCP accept → websocket upgrade → handshake →
//! coordinator. One spawned task per connection; one coordinator task for
//! the whole process.

use std::sync::Arc;

use supergrid_room::{CoordinatorHandle, spawn_coordinator};
use supergrid_session::{Authenticator, MatchWriter};
use tokio::net::TcpListener;

use crate::ServerError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a supergrid server.
pub struct ServerBuilder {
    bind_addr: String,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to listen on.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener, spawns the coordinator, and returns the server
    /// ready to [`run`](Server::run).
    pub async fn build<A: Authenticator>(
        self,
        auth: A,
        matches: Arc<dyn MatchWriter>,
    ) -> Result<Server<A>, ServerError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "listening");
        let coordinator = spawn_coordinator(matches);
        Ok(Server {
            listener,
            auth: Arc::new(auth),
            coordinator,
        })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running supergrid server.
pub struct Server<A: Authenticator> {
    listener: TcpListener,
    auth: Arc<A>,
    coordinator: CoordinatorHandle,
}

impl<A: Authenticator> Server<A> {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// The bound address; useful with a `:0` bind in tests.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the process is terminated.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("supergrid server running");
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let auth = Arc::clone(&self.auth);
                    let coordinator = self.coordinator.clone();
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(stream, addr, auth, coordinator).await
                        {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

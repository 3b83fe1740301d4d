//! TCP listener with a connection limit and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::flow::Service;
use crate::server::response::{HttpResponse, StatusCode};

/// Handle for stopping a running [`Server`] from another task.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: mpsc::Sender<()>,
}

impl ShutdownHandle {
    pub async fn shutdown(&self) {
        // A closed channel means the server already stopped.
        let _ = self.tx.send(()).await;
    }
}

/// A bound listener serving one [`Service`].
pub struct Server {
    listener: TcpListener,
    service: Service,
    config: Arc<ServerConfig>,
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl Server {
    pub async fn bind(service: Service, config: ServerConfig) -> Result<Self, Error> {
        let listener = TcpListener::bind(config.addr).await?;
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Ok(Self {
            listener,
            service,
            config: Arc::new(config),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    fn display_server_info(&self, addr: SocketAddr) {
        info!("Server listening on http://{addr}");
        info!("Registered endpoints:");
        for (method, path) in self.service.routes().routes() {
            info!("  {method} {path}");
        }
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => error!("Error setting up Ctrl+C handler: {e}"),
            }
        })
    }

    fn handle_new_connection(
        &self,
        socket: TcpStream,
        addr: SocketAddr,
        semaphore: &Arc<Semaphore>,
        tasks: &mut JoinSet<()>,
    ) {
        let service = self.service.clone();
        let config = Arc::clone(&self.config);

        let permit = match Arc::clone(semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                tasks.spawn(async move {
                    let mut socket = socket;
                    let response = HttpResponse::new(StatusCode::ServiceUnavailable)
                        .with_content_type("text/plain")
                        .with_body_string("Server is at capacity, please try again later");
                    let _ = socket.write_all(&response.to_bytes()).await;
                });
                return;
            }
        };

        tasks.spawn(async move {
            let _permit = permit;
            let mut socket = socket;

            match service.serve_connection(&mut socket, Some(addr), &config).await {
                Ok(()) => {}
                Err(e @ (Error::ParseError(_) | Error::PayloadTooLarge(_))) => {
                    warn!("Rejected request from {addr}: {e}");
                }
                Err(e) => error!("Error handling connection from {addr}: {e}"),
            }
            let _ = socket.shutdown().await;
        });
    }

    /// Wait for in-flight connections, aborting whatever outlives the timeout.
    async fn perform_shutdown(tasks: &mut JoinSet<()>, config: &ServerConfig) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let drained = tokio::time::timeout(config.shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        })
        .await;

        if drained.is_err() {
            warn!("Shutdown timed out, aborting {len} connections", len = tasks.len());
            tasks.abort_all();
        }
        info!("Server shutdown complete");
    }

    /// Accept connections until shutdown is requested.
    pub async fn run(mut self) -> Result<(), Error> {
        let addr = self.local_addr()?;
        self.display_server_info(addr);

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let mut tasks = JoinSet::new();
        let ctrl_c = Self::setup_ctrl_c_handler(self.shutdown_tx.clone());

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                Some(res) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = res {
                        error!("Connection task failed: {e}");
                    }
                }

                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((socket, peer)) => {
                            debug!("Accepted connection from {peer}");
                            self.handle_new_connection(socket, peer, &semaphore, &mut tasks);
                        }
                        Err(e) => {
                            error!("Error accepting connection: {e}");
                            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
                        }
                    }
                }
            }
        }

        ctrl_c.abort();
        drop(self.listener);
        Self::perform_shutdown(&mut tasks, &self.config).await;
        Ok(())
    }
}

//! TCP Server
//!
//! Accepts connections and dispatches to worker threads.
//!
//! ## Flow
//! ```text
//!  acceptor ──try_send──► bounded channel ──recv──► worker 1..N ──► Connection
//!      │                  (max_connections)
//!      └── channel full: reply ERROR and close
//! ```
//!
//! The acceptor polls a non-blocking listener so it notices shutdown
//! promptly. Workers exit once the channel is closed and drained.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{KvError, Result};
use crate::protocol::{write_response, Response};
use crate::service::Service;

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Cloneable handle that stops a running server
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for SortKV
pub struct Server {
    config: Config,
    service: Service,
    listener: Option<TcpListener>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Create a new server with the given config and engine
    pub fn new(config: Config, engine: Arc<Engine>) -> Self {
        Self {
            config,
            service: Service::new(engine),
            listener: None,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Bind the listen address, returning the bound address
    ///
    /// Called by [`Server::run`] if not called before; binding first lets
    /// callers learn an ephemeral port.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }

        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            KvError::Network(format!("failed to bind {}: {}", self.config.listen_addr, e))
        })?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address the server is bound to, once bound
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        let addr = self.bind()?;
        let listener = match self.listener.as_ref() {
            Some(listener) => listener,
            None => return Err(KvError::Network("listener not bound".to_string())),
        };

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections);
        let workers = (0..self.config.worker_threads)
            .map(|id| self.spawn_worker(id, receiver.clone()))
            .collect::<Result<Vec<_>>>()?;
        drop(receiver);

        tracing::info!(
            "Listening on {} ({} workers, {} max connections)",
            addr,
            self.config.worker_threads,
            self.config.max_connections
        );

        while !self.shutdown.is_shutdown() {
            match listener.accept() {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", peer, e);
                        continue;
                    }
                    match sender.try_send(stream) {
                        Ok(()) => tracing::trace!("Queued connection from {}", peer),
                        Err(TrySendError::Full(mut stream)) => {
                            tracing::warn!("Refusing connection from {}: server busy", peer);
                            let _ = write_response(&mut stream, &Response::error("server busy"));
                        }
                        Err(TrySendError::Disconnected(_)) => {
                            return Err(KvError::Network("worker pool stopped".to_string()));
                        }
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutting down, waiting for {} workers", workers.len());
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    fn spawn_worker(&self, id: usize, receiver: Receiver<TcpStream>) -> Result<JoinHandle<()>> {
        let service = self.service.clone();
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let handle = thread::Builder::new()
            .name(format!("sortkv-worker-{}", id))
            .spawn(move || {
                for stream in receiver.iter() {
                    let mut connection = match Connection::new(stream, service.clone()) {
                        Ok(connection) => connection,
                        Err(e) => {
                            tracing::warn!("Failed to set up connection: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
                        tracing::warn!(
                            "Failed to set timeouts for {}: {}",
                            connection.peer_addr(),
                            e
                        );
                        continue;
                    }
                    if let Err(e) = connection.handle() {
                        tracing::debug!(
                            "Connection {} closed with error: {}",
                            connection.peer_addr(),
                            e
                        );
                    }
                }
                tracing::trace!("Worker {} exiting", id);
            })?;

        Ok(handle)
    }
}

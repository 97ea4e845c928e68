//! Running the preview router on a socket.

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::routes::{PreviewState, router};
use crate::{PreviewError, PreviewLog, PreviewResult};

/// Handle to a preview server running on a background task.
///
/// Dropping the handle asks the server to stop.
pub struct PreviewServer {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    addr: SocketAddr,
    used_fallback: bool,
    log: PreviewLog,
}

impl PreviewServer {
    /// Binds `addr` and starts serving. If the address is in use the server
    /// falls back to an OS-assigned port on the same interface.
    pub async fn start(state: PreviewState, addr: SocketAddr) -> PreviewResult<Self> {
        if !state.root().is_dir() {
            return Err(PreviewError::NotADirectory(state.root().to_path_buf()));
        }

        let mut used_fallback = false;
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                warn!("preview address {} is in use; falling back to an auto port", addr);
                used_fallback = true;
                let fallback = SocketAddr::new(addr.ip(), 0);
                TcpListener::bind(fallback)
                    .await
                    .map_err(|source| PreviewError::Bind {
                        addr: fallback,
                        source,
                    })?
            }
            Err(source) => return Err(PreviewError::Bind { addr, source }),
        };

        let bound = listener.local_addr()?;
        info!(root = %state.root().display(), "preview listening on http://{}", bound);

        let log = state.log().clone();
        let app = router(state);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                warn!("preview server error: {}", err);
            }
        });

        Ok(Self {
            shutdown: Some(shutdown_tx),
            task: Some(task),
            addr: bound,
            used_fallback,
            log,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Whether the requested port was taken and an auto port was used.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    /// Failures recorded while serving.
    pub fn log(&self) -> &PreviewLog {
        &self.log
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!("preview server task failed: {}", err);
            }
        }
        info!("preview server stopped");
    }
}

impl Drop for PreviewServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Extension, Router, routing::get};
use tokio::{sync::oneshot, task::JoinHandle};

use crate::{Error, Res, api, session::AuthorizationSession, warning};

/// How long shutdown waits for in-flight responses before dropping them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Handle to the running callback listener.
pub struct CallbackServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl CallbackServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stops accepting connections and lets the last response finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        let abort = self.handle.abort_handle();
        if tokio::time::timeout(SHUTDOWN_GRACE, self.handle).await.is_err() {
            abort.abort();
        }
    }
}

pub fn router(session: Arc<AuthorizationSession>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(session)))
}

/// Binds the configured address and serves the callback routes in a
/// background task.
///
/// # Errors
///
/// Returns [`Error::Server`] if the address cannot be bound, for example
/// because another process already listens on the port.
pub async fn start_api_server(session: Arc<AuthorizationSession>) -> Res<CallbackServer> {
    let addr = session.config().server_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| Error::Server {
            addr: addr.clone(),
            source,
        })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| Error::Server { addr, source })?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let app = router(session);

    let handle = tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await;
        if let Err(e) = result {
            warning!("Callback server stopped: {}", e);
        }
    });

    Ok(CallbackServer {
        addr: local_addr,
        shutdown: shutdown_tx,
        handle,
    })
}

//! Process lifecycle.
//!
//! The relay runs four actors: the public ingress server, the internal
//! health/metrics server, the command poller and a signal watcher. Whichever
//! finishes first cancels the shared token; the others then wind down and
//! [`run`] returns the first error seen.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use flux_credentials::CredentialManager;
use flux_store::DiskStore;
use flux_telegram::{ChatTransport, Poller, TelegramClient, UpdateSource};
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::commands::CommandService;
use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::ingress::{self, IngressState};
use crate::internal;
use crate::metrics::RelayMetrics;

/// Starts the relay and runs it until a shutdown signal or a fatal error.
///
/// # Errors
///
/// Returns an error if the store cannot be opened, the bot token is
/// rejected, a listener cannot be bound, or a server fails while running.
pub async fn run(config: RelayConfig) -> Result<()> {
    let store = Arc::new(DiskStore::open(&config.database, &config.tmp)?);
    info!(path = %store.base_dir().display(), "opened credential store");
    let credentials = CredentialManager::new(store);

    let client = TelegramClient::new(&config.telegram_api_url, config.token.clone())?;
    let me = client
        .get_me()
        .await
        .map_err(|e| RelayError::Config(format!("telegram rejected the bot token: {e}")))?;
    info!(bot_id = me.id, username = ?me.username, "authorized with telegram");

    let mut poller = Poller::new(client.clone()).with_timeout(config.poll_timeout);
    if let Some(username) = me.username {
        poller = poller.with_bot_username(username);
    }

    let transport: Arc<dyn ChatTransport> = Arc::new(client);
    let metrics = Arc::new(RelayMetrics::new());

    let ingress_router = ingress::router(IngressState::new(
        credentials.clone(),
        transport.clone(),
        metrics.clone(),
    ));
    let internal_router = internal::router(metrics.clone());
    let commands = CommandService::new(credentials, transport, config.url.clone(), metrics);

    let ingress_listener = bind(config.listen).await?;
    let internal_listener = bind(config.listen_internal).await?;

    let shutdown = CancellationToken::new();
    let watcher = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            () = watcher.cancelled() => {}
            () = shutdown_signal() => {
                info!("shutdown signal received");
                watcher.cancel();
            }
        }
    });

    supervise(
        Listeners {
            ingress: (ingress_listener, ingress_router),
            internal: (internal_listener, internal_router),
        },
        poller,
        commands,
        shutdown,
    )
    .await
}

/// Bound listeners paired with the routers they serve.
#[derive(Debug)]
pub struct Listeners {
    /// Public webhook listener.
    pub ingress: (TcpListener, Router),
    /// Health and metrics listener.
    pub internal: (TcpListener, Router),
}

/// Binds a listener, failing startup if the address is unavailable.
///
/// # Errors
///
/// Returns `RelayError::BindFailed` if the address cannot be bound.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| RelayError::BindFailed(addr, e))
}

/// Runs both servers and the poller until one of them stops or `shutdown`
/// is cancelled.
///
/// # Errors
///
/// Returns the first error reported by a server.
pub async fn supervise<S>(
    listeners: Listeners,
    poller: Poller<S>,
    commands: CommandService,
    shutdown: CancellationToken,
) -> Result<()>
where
    S: UpdateSource + 'static,
{
    let mut tasks = JoinSet::new();

    let (listener, router) = listeners.ingress;
    tasks.spawn(serve("ingress", listener, router, shutdown.clone()));
    let (listener, router) = listeners.internal;
    tasks.spawn(serve("internal", listener, router, shutdown.clone()));

    let cancel = shutdown.clone();
    tasks.spawn(async move {
        poller.run(&commands, cancel).await;
        Ok(())
    });

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        shutdown.cancel();
        let result = joined
            .map_err(|e| RelayError::Server(format!("task failed: {e}")))
            .and_then(|result| result);
        if let Err(e) = result {
            error!(error = %e, "actor stopped with an error");
            first_error.get_or_insert(e);
        }
    }

    info!("relay stopped");
    first_error.map_or(Ok(()), Err)
}

async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr().ok();
    info!(server = name, addr = ?addr, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| RelayError::Server(format!("{name} server: {e}")))?;

    info!(server = name, "server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

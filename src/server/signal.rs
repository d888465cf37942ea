//! Process shutdown signals.

use std::future::Future;

use tracing::{error, info};

/// Installs the SIGINT (Ctrl-C) and, on Unix, SIGTERM handlers right away and
/// returns a future that resolves on the first of them.
///
/// Handlers are registered before the returned future is first polled. If a
/// handler cannot be installed the error is logged and that signal is never
/// observed. Must be called from within a Tokio runtime.
pub fn shutdown_signal() -> impl Future<Output = ()> + Send + 'static {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let interrupt = signal(SignalKind::interrupt())
            .inspect_err(|e| error!(error = %e, "failed to install SIGINT handler"))
            .ok();
        let terminate = signal(SignalKind::terminate())
            .inspect_err(|e| error!(error = %e, "failed to install SIGTERM handler"))
            .ok();

        async move {
            tokio::select! {
                _ = recv(interrupt) => info!("received SIGINT"),
                _ = recv(terminate) => info!("received SIGTERM"),
            }
        }
    }

    #[cfg(not(unix))]
    {
        async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("received Ctrl-C"),
                Err(e) => {
                    error!(error = %e, "failed to install Ctrl-C handler");
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}

#[cfg(unix)]
async fn recv(signal: Option<tokio::signal::unix::Signal>) {
    match signal {
        Some(mut signal) => {
            signal.recv().await;
        }
        None => std::future::pending().await,
    }
}

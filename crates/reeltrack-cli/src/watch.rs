//! Long-running mode: background growth plus live analytics.

use reeltrack_tracker::Tracker;

use crate::report::print_analytics;

/// Run the growth scheduler and print analytics after every store change
/// until Ctrl-C or SIGTERM.
///
/// # Errors
///
/// Returns an error if the scheduler cannot be started or stopped.
pub(crate) async fn run_watch(tracker: &Tracker) -> anyhow::Result<()> {
    let scheduler = tracker.start_growth().await?;
    let mut changes = tracker.subscribe();
    changes.borrow_and_update();

    println!("watching {} posts; press Ctrl-C to stop", tracker.posts().len());
    print_analytics(&tracker.compute_analytics());

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                changes.borrow_and_update();
                println!();
                print_analytics(&tracker.compute_analytics());
            }
        }
    }

    tracker.shutdown();
    scheduler.stop().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping growth simulator");
}

//! Periodic growth ticks on a [`JobScheduler`].

use std::sync::Arc;
use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::simulator::{GrowthSimulator, TickOutcome};

/// Running growth schedule. Keep it alive for as long as ticks should run;
/// call [`GrowthScheduler::stop`] to end them cleanly.
pub struct GrowthScheduler {
    scheduler: JobScheduler,
    job_id: Uuid,
}

impl GrowthScheduler {
    /// Start ticking `simulator` every `period`.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
    /// the job cannot be registered, or the scheduler fails to start.
    pub async fn start(
        simulator: Arc<GrowthSimulator>,
        period: Duration,
    ) -> Result<Self, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_repeated_async(period, move |_uuid, _lock| {
            let simulator = Arc::clone(&simulator);
            Box::pin(async move {
                match simulator.tick().await {
                    Ok(TickOutcome::Applied { mutated }) => {
                        tracing::debug!(mutated, "scheduler: growth tick complete");
                    }
                    Ok(TickOutcome::Skipped) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "scheduler: growth tick failed");
                    }
                }
            })
        })?;
        let job_id = scheduler.add(job).await?;

        scheduler.start().await?;
        tracing::info!(period_secs = period.as_secs(), "growth simulator started");
        Ok(Self { scheduler, job_id })
    }

    /// Remove the tick job and shut the scheduler down. A tick already in
    /// progress finishes its store write before the scheduler exits.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the job cannot be removed or the
    /// scheduler fails to shut down.
    pub async fn stop(mut self) -> Result<(), JobSchedulerError> {
        self.scheduler.remove(&self.job_id).await?;
        self.scheduler.shutdown().await?;
        tracing::info!("growth simulator stopped");
        Ok(())
    }
}

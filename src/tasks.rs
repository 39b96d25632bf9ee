// src/tasks.rs

//! Background sweeps for expired tokens and orphaned attachments.
//!
//! Each sweep is one task that awaits its body before waiting for the next
//! tick, so runs of the same sweep never overlap. Both stop when the
//! cancellation token fires.

use std::{future::Future, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::AppError,
    services::{file, token},
    state::AppState,
    utils::clock::now_millis,
};

/// Spawns the token and attachment sweeps. The caller owns the handles and
/// should cancel `shutdown` and await them on exit.
pub fn spawn_sweeps(state: &AppState, shutdown: CancellationToken) -> Vec<JoinHandle<()>> {
    let token_pool = state.pool.clone();
    let token_sweep = spawn_sweep(
        "token cleanup",
        state.config.token_sweep_interval,
        shutdown.clone(),
        move || {
            let pool = token_pool.clone();
            async move { token::remove_expired_tokens(&pool, now_millis()).await }
        },
    );

    let attachment_pool = state.pool.clone();
    let attachment_config = state.config.clone();
    let attachment_sweep = spawn_sweep(
        "attachment cleanup",
        state.config.attachment_sweep_interval,
        shutdown,
        move || {
            let pool = attachment_pool.clone();
            let config = attachment_config.clone();
            async move { file::remove_unused_attachments(&pool, &config, now_millis()).await }
        },
    );

    vec![token_sweep, attachment_sweep]
}

/// Runs `sweep` every `period` until cancelled. Failures are logged and the
/// loop carries on.
pub fn spawn_sweep<F, Fut>(
    name: &'static str,
    period: Duration,
    shutdown: CancellationToken,
    mut sweep: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<u64, AppError>> + Send + 'static,
{
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; the first sweep runs one period after start.
        interval.tick().await;

        tracing::info!("Scheduled {} every {:?}", name, period);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            match sweep().await {
                Ok(0) => tracing::debug!("{}: nothing to remove", name),
                Ok(removed) => tracing::info!("{}: removed {} record(s)", name, removed),
                Err(e) => tracing::error!("{} failed: {}", name, e),
            }
        }

        tracing::info!("Stopped {}", name);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[tokio::test(start_paused = true)]
    async fn keeps_running_after_failures_and_stops_on_cancel() {
        let runs = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();

        let counter = runs.clone();
        let handle = spawn_sweep("test sweep", Duration::from_secs(60), shutdown.clone(), move || {
            let counter = counter.clone();
            async move {
                let run = counter.fetch_add(1, Ordering::SeqCst);
                if run % 2 == 0 {
                    Err(AppError::InternalServerError("boom".to_string()))
                } else {
                    Ok(1)
                }
            }
        });

        time::sleep(Duration::from_secs(60 * 4 + 1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 4);

        shutdown.cancel();
        handle.await.unwrap();

        time::sleep(Duration::from_secs(600)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sweeps_do_not_overlap() {
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));
        let shutdown = CancellationToken::new();

        let (a, m) = (active.clone(), max_active.clone());
        let handle = spawn_sweep("slow sweep", Duration::from_secs(10), shutdown.clone(), move || {
            let (a, m) = (a.clone(), m.clone());
            async move {
                let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                m.fetch_max(now, Ordering::SeqCst);
                time::sleep(Duration::from_secs(35)).await;
                a.fetch_sub(1, Ordering::SeqCst);
                Ok(0)
            }
        });

        time::sleep(Duration::from_secs(200)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }
}

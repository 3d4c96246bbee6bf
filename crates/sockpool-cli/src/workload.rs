//! Concurrent checkout/return cycles against a pool

use futures::future::join_all;
use serde::Serialize;
use sockpool_core::PoolError;
use sockpool_pool::{Pool, PoolStats};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Outcome counts for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Cycles that checked out, probed and returned a connection
    pub completed: usize,
    /// Probes that failed; the connection was destroyed
    pub destroyed: usize,
    /// Acquisitions that timed out
    pub timed_out: usize,
    /// Acquisitions that failed for any other reason
    pub failed: usize,
}

impl RunReport {
    fn merge(mut self, other: Self) -> Self {
        self.completed += other.completed;
        self.destroyed += other.destroyed;
        self.timed_out += other.timed_out;
        self.failed += other.failed;
        self
    }
}

/// Summary printed at the end of a run
#[derive(Debug, Serialize)]
pub struct Summary {
    pub addr: String,
    pub workers: usize,
    pub rounds: usize,
    pub elapsed_ms: u128,
    pub report: RunReport,
    pub stats: PoolStats,
}

/// Run `workers` tasks of `rounds` cycles each and collect their outcomes
#[tracing::instrument(skip(pool))]
pub async fn run(pool: &Pool<TcpStream>, workers: usize, rounds: usize) -> RunReport {
    let handles = (0..workers).map(|worker| {
        let pool = pool.clone();
        tokio::spawn(async move { run_worker(pool, worker, rounds).await })
    });

    join_all(handles)
        .await
        .into_iter()
        .fold(RunReport::default(), |acc, joined| match joined {
            Ok(report) => acc.merge(report),
            Err(e) => {
                tracing::error!(error = %e, "worker task failed");
                acc
            }
        })
}

async fn run_worker(pool: Pool<TcpStream>, worker: usize, rounds: usize) -> RunReport {
    let mut report = RunReport::default();

    for round in 0..rounds {
        let mut conn = match pool.get_with_default_timeout().await {
            Ok(conn) => conn,
            Err(PoolError::Timeout(timeout)) => {
                tracing::warn!(worker, round, ?timeout, "acquire timed out");
                report.timed_out += 1;
                continue;
            }
            Err(PoolError::Closed) => {
                report.failed += 1;
                break;
            }
            Err(e) => {
                tracing::warn!(worker, round, error = %e, "acquire failed");
                report.failed += 1;
                continue;
            }
        };

        let probe = async {
            conn.write_all(&[]).await?;
            conn.flush().await
        };
        match probe.await {
            Ok(()) => {
                if let Err(e) = conn.close().await {
                    tracing::warn!(worker, round, error = %e, "failed to return connection");
                }
                report.completed += 1;
            }
            Err(e) => {
                tracing::debug!(worker, round, error = %e, "probe failed, destroying connection");
                if let Err(e) = conn.destroy().await {
                    tracing::warn!(worker, round, error = %e, "failed to evict connection");
                }
                report.destroyed += 1;
            }
        }

        tokio::task::yield_now().await;
    }

    tracing::debug!(worker, ?report, "worker finished");
    report
}

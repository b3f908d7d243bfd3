//! Bounded-concurrency job runner.
//!
//! One control loop owns the queue and the active set. While the queue is non-empty
//! it dispatches whenever fewer than `concurrency` jobs are running and otherwise
//! sleeps for the poll interval. Jobs leave the queue when dispatched, never when
//! they finish. A run ends when the queue is empty and every dispatched job has
//! completed, or when the cancellation token fires.
mod config;
pub use config::RunnerConfig;

mod summary;
pub use summary::RunSummary;

use shkit_model::InFlightPolicy;
use shkit_observe::SeverityLogger;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{
    ExecError, JobOutcome, JobQueue,
    job::{JobContext, run_job},
};

pub struct JobRunner {
    cfg: RunnerConfig,
    logger: SeverityLogger,
}

impl JobRunner {
    /// Validate `cfg` and bind the runner to `logger`.
    pub fn new(cfg: RunnerConfig, logger: SeverityLogger) -> Result<Self, ExecError> {
        cfg.validate()?;
        cfg.trace_state();
        Ok(Self { cfg, logger })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.cfg
    }

    /// Empty queue carrying this runner's command template.
    pub fn queue(&self) -> JobQueue {
        JobQueue::new(self.cfg.template.clone())
    }

    /// Execute every queued invocation with at most `concurrency` running at once.
    ///
    /// Job failures never abort the run. Returns [`ExecError::Cancelled`] if `cancel`
    /// fires first; running jobs are then handled per [`InFlightPolicy`].
    pub async fn run(&self, mut queue: JobQueue, cancel: CancellationToken) -> Result<RunSummary, ExecError> {
        let limit = self.cfg.concurrency.get();
        let mut summary = RunSummary::new(queue.len());
        let mut active: JoinSet<JobOutcome> = JoinSet::new();
        self.logger.info(format!("{} jobs queued", summary.queued));

        while !queue.is_empty() {
            if cancel.is_cancelled() {
                return Err(self.abandon(active, summary).await);
            }
            while let Some(res) = active.try_join_next() {
                self.record_completion(&mut summary, res);
            }
            if active.len() < limit {
                if let Some(invocation) = queue.pop() {
                    let ctx = self.job_context(summary.dispatched + 1, &cancel);
                    active.spawn(run_job(ctx, invocation));
                    summary.record_dispatch(active.len());
                    trace!(job = summary.dispatched, active = active.len(), pending = queue.len(), "job dispatched");
                }
                continue;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.cfg.poll_interval) => {}
                _ = cancel.cancelled() => return Err(self.abandon(active, summary).await),
            }
        }

        loop {
            tokio::select! {
                next = active.join_next() => match next {
                    Some(res) => self.record_completion(&mut summary, res),
                    None => break,
                },
                _ = cancel.cancelled() => return Err(self.abandon(active, summary).await),
            }
        }

        self.logger.info(format!("Finished: {} jobs", summary.completed));
        debug!(%summary, "run finished");
        Ok(summary)
    }

    fn job_context(&self, seq: usize, cancel: &CancellationToken) -> JobContext {
        JobContext {
            seq,
            shell: self.cfg.shell.clone(),
            logger: self.logger.with_operation(format!("job-{seq}")),
            kill_on: match self.cfg.in_flight {
                InFlightPolicy::Kill => Some(cancel.child_token()),
                InFlightPolicy::Detach => None,
            },
        }
    }

    fn record_completion(&self, summary: &mut RunSummary, res: Result<JobOutcome, JoinError>) {
        summary.completed += 1;
        match res {
            Ok(outcome) => trace!(?outcome, completed = summary.completed, "job completed"),
            Err(e) => debug!(error = %e, "job task ended abnormally"),
        }
    }

    /// Stop dispatching and deal with the jobs still running.
    ///
    /// `Kill`: the jobs' tokens are children of the run token, so they are already
    /// terminating; wait for them. `Detach`: let them run on unobserved.
    async fn abandon(&self, mut active: JoinSet<JobOutcome>, mut summary: RunSummary) -> ExecError {
        match self.cfg.in_flight {
            InFlightPolicy::Kill => {
                while let Some(res) = active.join_next().await {
                    self.record_completion(&mut summary, res);
                }
            }
            InFlightPolicy::Detach => {
                while let Some(res) = active.try_join_next() {
                    self.record_completion(&mut summary, res);
                }
                debug!(running = active.len(), "detaching running jobs");
                active.detach_all();
            }
        }
        self.logger.info(format!(
            "Stopped: {} of {} jobs dispatched",
            summary.dispatched, summary.queued
        ));
        ExecError::Cancelled {
            queued: summary.queued,
            dispatched: summary.dispatched,
            completed: summary.completed,
        }
    }
}

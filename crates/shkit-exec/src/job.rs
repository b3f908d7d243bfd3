use std::{fmt, process::Stdio, time::Duration};

use shkit_model::JobInvocation;
use shkit_observe::SeverityLogger;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::kill;

/// How long output of a killed job is still read before it is abandoned.
const OUTPUT_DRAIN: Duration = Duration::from_millis(200);

/// Lifecycle of one job: QUEUED -> DISPATCHED -> RUNNING -> COMPLETED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Dispatched,
    Running,
    Completed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JobState::Queued => "queued",
            JobState::Dispatched => "dispatched",
            JobState::Running => "running",
            JobState::Completed => "completed",
        })
    }
}

/// How a job ended. Every variant counts as completed; none of them stops the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    /// Non-zero exit status.
    Failed { code: i32 },
    /// Terminated by a signal.
    Signalled,
    /// The shell could not be started or waited on.
    SpawnFailed,
    /// Terminated by the runner after cancellation.
    Killed,
}

/// Everything a dispatched job needs, owned so it can move into a task.
#[derive(Debug, Clone)]
pub(crate) struct JobContext {
    pub seq: usize,
    pub shell: String,
    pub logger: SeverityLogger,
    /// Set only when in-flight jobs must be killed on cancellation.
    pub kill_on: Option<CancellationToken>,
}

/// Run one invocation to completion.
///
/// stdout and stderr are merged into the log at DEBUG, one record per non-blank line,
/// tagged with the job's operation. Failures are logged at DEBUG and absorbed.
pub(crate) async fn run_job(ctx: JobContext, invocation: JobInvocation) -> JobOutcome {
    let argv = invocation.to_argv(&ctx.shell);
    let log = &ctx.logger;
    trace!(job = ctx.seq, state = %JobState::Dispatched, argv = ?argv, "spawning job");

    let mut cmd = Command::new(&argv[0]);
    cmd.args(&argv[1..]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    if ctx.kill_on.is_some() {
        kill::isolate(&mut cmd);
        cmd.kill_on_drop(true);
    }

    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            log.debug(format!("failed to start `{invocation}`: {e}"));
            return JobOutcome::SpawnFailed;
        }
    };
    log.debug(format!("started `{invocation}`"));
    trace!(job = ctx.seq, state = %JobState::Running, pid = ?child.id());

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let killed = CancellationToken::new();
    let pump = async {
        let forward = async {
            tokio::join!(forward_lines(stdout, log), forward_lines(stderr, log));
        };
        tokio::pin!(forward);
        tokio::select! {
            () = &mut forward => {}
            _ = killed.cancelled() => {
                // Output of a killed job is read only until OUTPUT_DRAIN elapses.
                if tokio::time::timeout(OUTPUT_DRAIN, &mut forward).await.is_err() {
                    trace!(job = ctx.seq, "output still open after kill; dropping it");
                }
            }
        }
    };
    let wait = async {
        match &ctx.kill_on {
            Some(token) => tokio::select! {
                res = child.wait() => Some(res),
                _ = token.cancelled() => {
                    kill::terminate(&mut child).await;
                    killed.cancel();
                    None
                }
            },
            None => Some(child.wait().await),
        }
    };
    let (status, ()) = tokio::join!(wait, pump);

    let outcome = match status {
        None => {
            log.debug("killed on cancellation");
            JobOutcome::Killed
        }
        Some(Err(e)) => {
            log.debug(format!("wait failed: {e}"));
            JobOutcome::SpawnFailed
        }
        Some(Ok(status)) if status.success() => JobOutcome::Succeeded,
        Some(Ok(status)) => match status.code() {
            Some(code) => {
                log.debug(format!("exited with status {code}"));
                JobOutcome::Failed { code }
            }
            None => {
                log.debug("terminated by signal");
                JobOutcome::Signalled
            }
        },
    };
    trace!(job = ctx.seq, state = %JobState::Completed, outcome = ?outcome);
    outcome
}

async fn forward_lines<R>(reader: Option<R>, log: &SeverityLogger)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if !line.trim().is_empty() {
                    log.debug(line);
                }
            }
            Err(e) => {
                trace!(error = %e, "job output stream closed");
                break;
            }
        }
    }
}

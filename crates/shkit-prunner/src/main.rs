use std::{
    io::IsTerminal,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use shkit_core::{Coordinator, ScriptContext, ScriptError, Termination};
use shkit_exec::{ExecError, JobRunner, RunnerConfig};
use shkit_model::{
    CommandTemplate, Concurrency, DEFAULT_POLL_INTERVAL_MS, DEFAULT_QUIT_CODE, DEFAULT_SHELL,
    InFlightPolicy, LogSeverity,
};
use shkit_observe::{
    LogThreshold, LoggerConfig, LoggerFormat, LoggerLevel, SeverityConfig, SeverityLogger,
    StderrSink, init_logger,
};

const IDENTITY: &str = "prunner";

/// Run shell invocations in parallel with a bounded number of concurrent jobs.
///
/// Invocations come from the positional arguments and, when standard input is not a
/// terminal, from its non-blank lines.
#[derive(Debug, Parser)]
#[command(name = "prunner", version, about)]
struct Cli {
    /// Command template prefixed to each invocation.
    #[arg(short = 'c', long = "command", value_name = "TEMPLATE")]
    command: Option<CommandTemplate>,

    /// Concurrency limit.
    #[arg(short = 't', long = "threads", value_name = "N", default_value_t = Concurrency::default())]
    threads: Concurrency,

    /// Lower the threshold to DEBUG (shows job output).
    #[arg(short, long)]
    verbose: bool,

    /// Append records to PATH.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Also write records to the system log.
    #[arg(long)]
    syslog: bool,

    /// Enforce single-instance execution.
    #[arg(long)]
    lock: bool,

    /// Marker path (implies --lock).
    #[arg(long, value_name = "PATH")]
    lock_file: Option<PathBuf>,

    /// What to do with running jobs on interruption: detach | kill.
    #[arg(long, value_name = "POLICY", default_value_t = InFlightPolicy::default())]
    on_cancel: InFlightPolicy,

    /// Shell used to run invocations.
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_SHELL, value_parser = non_blank)]
    shell: String,

    /// Admission polling interval in milliseconds (1-999).
    #[arg(
        long,
        value_name = "MS",
        default_value_t = DEFAULT_POLL_INTERVAL_MS,
        value_parser = clap::value_parser!(u64).range(1..1000)
    )]
    poll_ms: u64,

    /// Internal diagnostics filter (tracing env-filter syntax).
    #[arg(long, value_name = "FILTER", default_value_t = LoggerLevel::default())]
    trace: LoggerLevel,

    /// Internal diagnostics format: text | json | journald.
    #[arg(long, value_name = "FMT", default_value_t = LoggerFormat::Text)]
    trace_format: LoggerFormat,

    /// Invocations (or arguments for --command).
    #[arg(value_name = "INVOCATION")]
    invocations: Vec<String>,
}

impl Cli {
    fn severity_config(&self) -> Result<SeverityConfig, shkit_observe::LoggerError> {
        let mut cfg = SeverityConfig::from_env()?;
        if self.verbose {
            cfg.threshold = LogSeverity::Debug;
        }
        if let Some(path) = &self.log_file {
            cfg.log_file = Some(path.clone());
        }
        cfg.syslog |= self.syslog;
        Ok(cfg)
    }

    fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            concurrency: self.threads,
            template: self.command.clone(),
            shell: self.shell.clone(),
            poll_interval: Duration::from_millis(self.poll_ms),
            in_flight: self.on_cancel,
        }
    }

    fn lock_path(&self) -> Option<Option<PathBuf>> {
        match (&self.lock_file, self.lock) {
            (Some(path), _) => Some(Some(path.clone())),
            (None, true) => Some(None),
            (None, false) => None,
        }
    }
}

fn non_blank(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("must not be empty".into());
    }
    Ok(s.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{IDENTITY}: {e:#}");
            ExitCode::from(DEFAULT_QUIT_CODE)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    // Diagnostics first: local offset detection must happen before any thread exists.
    init_logger(&LoggerConfig::with_filter(cli.trace_format, cli.trace.clone()))?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let code = rt.block_on(execute(cli));
    // Detached jobs and a pending stdin read must not hold the exit.
    rt.shutdown_background();
    Ok(code)
}

async fn execute(cli: Cli) -> u8 {
    let (logger, setup_err) = match cli.severity_config().and_then(|cfg| cfg.build(IDENTITY)) {
        Ok(logger) => (logger, None),
        Err(e) => (fallback_logger(), Some(e)),
    };
    let ctx = ScriptContext::new(logger);
    let coordinator = Coordinator::new(ctx.clone());

    if let Some(e) = setup_err {
        let term = ctx.fail(ScriptError::Configuration(e.to_string()));
        return coordinator.finish(Err(term));
    }
    debug!(?cli, "prunner starting");

    coordinator
        .run(move |cancel| script(ctx, cli, cancel))
        .await
}

/// Standard-error-only logger used when the configured one cannot be built.
fn fallback_logger() -> SeverityLogger {
    SeverityLogger::new(IDENTITY, LogThreshold::default()).with_sink(Arc::new(StderrSink))
}

async fn script(ctx: ScriptContext, cli: Cli, cancel: CancellationToken) -> Result<(), Termination> {
    if let Some(path) = cli.lock_path() {
        let lock = ctx.check_pid(path)?;
        info!(path = %lock.path().display(), "single-instance lock held");
    }

    let runner = JobRunner::new(cli.runner_config(), ctx.logger().clone())
        .map_err(|e| ctx.fail(ScriptError::Configuration(e.to_string())))?;
    let mut queue = runner.queue();
    queue.extend_args(cli.invocations);

    if !std::io::stdin().is_terminal() {
        let stdin = BufReader::new(tokio::io::stdin());
        tokio::select! {
            res = queue.extend_from_reader(stdin) => {
                res.map_err(|e| ctx.fail(ScriptError::Configuration(format!(
                    "cannot read invocations from standard input: {e}"
                ))))?;
            }
            _ = cancel.cancelled() => return Ok(()),
        }
    }

    match runner.run(queue, cancel).await {
        Ok(summary) => {
            debug!(%summary, "all jobs finished");
            Ok(())
        }
        Err(ExecError::Cancelled { .. }) => Ok(()),
        Err(e) => Err(ctx.fail(ScriptError::Configuration(e.to_string()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["prunner", "echo a"]).unwrap();
        let cfg = cli.runner_config();

        assert_eq!(cfg.concurrency.get(), 8);
        assert_eq!(cfg.shell, "sh");
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
        assert_eq!(cfg.in_flight, InFlightPolicy::Detach);
        assert!(cfg.template.is_none());
        assert_eq!(cli.invocations, vec!["echo a"]);
        assert!(cli.lock_path().is_none());
        assert_eq!(cli.trace.as_str(), "warn");
    }

    #[test]
    fn poll_interval_bounds_are_inclusive_of_valid_values() {
        for ms in ["1", "999"] {
            let cli = Cli::try_parse_from(["prunner", "--poll-ms", ms]).unwrap();
            assert!(cli.runner_config().validate().is_ok(), "{ms}");
        }
    }

    #[test]
    fn template_threads_and_policy() {
        let cli = Cli::try_parse_from([
            "prunner", "-c", "gzip -9", "-t", "4", "--on-cancel", "kill", "a.log", "b.log",
        ])
        .unwrap();
        let cfg = cli.runner_config();

        assert_eq!(cfg.template.as_ref().map(|t| t.as_str()), Some("gzip -9"));
        assert_eq!(cfg.concurrency.get(), 4);
        assert_eq!(cfg.in_flight, InFlightPolicy::Kill);
        assert_eq!(cli.invocations, vec!["a.log", "b.log"]);
    }

    #[test]
    fn malformed_values_are_usage_errors() {
        for args in [
            vec!["prunner", "-t", "0"],
            vec!["prunner", "-t", "-2"],
            vec!["prunner", "-t", "many"],
            vec!["prunner", "--on-cancel", "maybe"],
            vec!["prunner", "-c", "  "],
            vec!["prunner", "--poll-ms", "0"],
            vec!["prunner", "--poll-ms", "1000"],
            vec!["prunner", "--trace", "nonsense=xyz"],
            vec!["prunner", "--shell", ""],
        ] {
            let err = Cli::try_parse_from(&args).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{args:?}");
        }
    }

    #[test]
    fn lock_file_implies_lock() {
        let cli = Cli::try_parse_from(["prunner", "--lock-file", "/tmp/x.pid"]).unwrap();
        assert_eq!(cli.lock_path(), Some(Some(PathBuf::from("/tmp/x.pid"))));

        let cli = Cli::try_parse_from(["prunner", "--lock"]).unwrap();
        assert_eq!(cli.lock_path(), Some(None));
    }

    #[test]
    fn verbose_lowers_threshold_to_debug() {
        let cli = Cli::try_parse_from(["prunner", "-v"]).unwrap();
        assert_eq!(cli.severity_config().unwrap().threshold, LogSeverity::Debug);
    }
}

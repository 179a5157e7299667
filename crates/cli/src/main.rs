// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! standby - wait for resources, then run a command

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod args;
mod error;
mod exec;
mod output;

use clap::{ArgAction, Parser};
use error::Diagnostic;
use output::OutputFormat;
use standby_core::{parse_resources, Backoff, SchemeProbe, TracedProbe, WaitConfig, Waiter};
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long runtime shutdown waits for blocking probe threads
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

#[derive(Parser, Debug)]
#[command(
    name = "standby",
    version,
    about = "Wait for resources to become ready, then run a command",
    override_usage = "standby [OPTIONS] [RESOURCE]... [-- COMMAND [ARGS]...]",
    after_help = "Resources: http(s)://, ws(s)://, tcp(4|6)://host:port, postgres://, mysql://, \
                  file://path[#absent|#nonempty], a shell command, or \"\" (always ready).\n\
                  Fragment tags override timing per resource: #timeout=5s&interval=250ms&retries=3"
)]
struct Cli {
    /// Overall deadline for all resources
    #[arg(short, long, env = "STANDBY_TIMEOUT", default_value = "1m", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Deadline for a single probe attempt
    #[arg(long, env = "STANDBY_ATTEMPT_TIMEOUT", default_value = "5s", value_parser = humantime::parse_duration)]
    attempt_timeout: Duration,

    /// Pause between attempts
    #[arg(short, long, env = "STANDBY_INTERVAL", default_value = "1s", value_parser = humantime::parse_duration)]
    interval: Duration,

    /// Double the pause after each attempt, up to this cap
    #[arg(long, env = "STANDBY_MAX_INTERVAL", value_parser = humantime::parse_duration)]
    max_interval: Option<Duration>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// No logs or diagnostics, only the exit code
    #[arg(short, long)]
    quiet: bool,

    /// Report format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Resources to wait for
    resources: Vec<String>,
}

impl Cli {
    fn wait_config(&self) -> WaitConfig {
        let backoff = match self.max_interval {
            Some(max) => Backoff::Exponential { max },
            None => Backoff::Fixed,
        };
        WaitConfig::default()
            .with_timeout(self.timeout)
            .with_attempt_timeout(self.attempt_timeout)
            .with_interval(self.interval)
            .with_backoff(backoff)
    }

    /// Report format, when a report should be printed at all
    fn report_format(&self) -> Option<OutputFormat> {
        match self.output {
            Some(format) => Some(format),
            None if self.verbose > 0 => Some(OutputFormat::Text),
            None => None,
        }
    }
}

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let (head, command) = args::split_args(&argv);
    let cli = Cli::parse_from(head);

    setup_logging(cli.verbose, cli.quiet);

    let result = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => {
            let result = runtime.block_on(run(&cli, command));
            // HTTP attempts still blocked in the pool are abandoned, not awaited
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            result
        }
        Err(e) => Err(Diagnostic::runtime_failed(e)),
    };

    match result {
        Ok(code) => code,
        Err(diagnostic) => {
            if !cli.quiet {
                eprint!("{}", diagnostic);
            }
            diagnostic.exit_code()
        }
    }
}

async fn run(cli: &Cli, command: &[String]) -> Result<ExitCode, Diagnostic> {
    let resources = parse_resources(&cli.resources).map_err(Diagnostic::invalid_resource)?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted");
                cancel.cancel();
            }
        }
    });

    let config = cli.wait_config();
    let waiter =
        Waiter::new(TracedProbe::new(SchemeProbe), config.clone()).with_cancellation(cancel);
    match waiter.wait_all(&resources).await {
        Ok(report) => {
            if let Some(format) = cli.report_format() {
                output::print(&report, format);
            }
        }
        Err(err) => {
            if let (Some(format), Some(report)) = (cli.report_format(), err.report()) {
                output::print(report, format);
            }
            return Err(Diagnostic::not_ready(err, config.timeout));
        }
    }

    exec::run(command)
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match (quiet, verbose) {
        (true, _) => "off",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("STANDBY_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

//! `pultruder` operator console.

mod cli;
mod display;
mod error_fmt;
mod machine;
mod run;
mod shell;

use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use cli::{Cli, Commands, JSON_MODE};
use pultruder_config::Config;

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    let _ = color_eyre::install();

    let code = match real_main(cli) {
        Ok(()) => 0,
        Err(e) => {
            if JSON_MODE.get().copied().unwrap_or(false) {
                eprintln!("{}", error_fmt::format_error_json(&e));
            } else {
                eprintln!("{}", error_fmt::humanize(&e));
            }
            tracing::debug!(error = ?e, "command failed");
            error_fmt::exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    let cfg = match &cli.config {
        Some(path) => pultruder_config::load_file(path)?,
        None => Config::default(),
    };
    // Held until return so the file writer flushes before exit.
    let _file_guard = init_tracing(&cfg, cli.log_level.as_deref(), cli.json)?;
    tracing::debug!(config = ?cli.config, simulated_time = cli.simulated_time, "starting");

    match cli.cmd {
        Commands::Run {
            filament_length,
            line_speed,
            breaking_force,
            max_seconds,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "Ctrl-C handler not installed");
            }
            let args = run::RunArgs {
                filament_length,
                line_speed,
                breaking_force,
                max_seconds,
                simulated_time: cli.simulated_time,
                json: cli.json,
            };
            run::run(&cfg, &args, &shutdown)?;
        }
        Commands::TestDrive {
            speed,
            direction,
            hold_ms,
        } => run::test_drive(
            &cfg,
            &speed,
            direction,
            Duration::from_millis(hold_ms),
            cli.simulated_time,
        )?,
        Commands::Session => {
            let mut machine = machine::assemble(&cfg, machine::make_clock(cli.simulated_time));
            let stdin = io::stdin();
            if stdin.is_terminal() && !cli.json {
                eprintln!("pultruder session: set <field> <value> | start | pause | resume | restart | status | drive cw|ccw | release | wait <secs> | quit");
            }
            let summary = shell::Shell::new(&mut machine, cli.json).run(
                stdin.lock(),
                &mut io::stdout().lock(),
                &mut io::stderr().lock(),
            )?;
            // Leave the drive stopped on exit.
            if machine.session.test_drive_held() {
                machine.session.release_test_drive()?;
            }
            if machine.session.status().state.is_running() {
                machine.session.pause()?;
            }
            tracing::info!(commands = summary.commands, errors = summary.errors, "session closed");
        }
        Commands::SelfCheck => run::self_check(&cfg)?,
    }
    Ok(())
}

fn init_tracing(
    cfg: &Config,
    cli_level: Option<&str>,
    json: bool,
) -> eyre::Result<Option<WorkerGuard>> {
    let level = cli_level
        .or(cfg.logging.level.as_deref())
        .unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    let console: Box<dyn Layer<Registry> + Send + Sync> = if json {
        fmt::layer()
            .json()
            .with_writer(io::stderr)
            .with_target(false)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(io::stderr)
            .with_target(false)
            .boxed()
    };

    let mut guard = None;
    let file_layer = match cfg.logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
            let rotation = cfg.logging.rotation.as_deref().map(str::to_ascii_lowercase);
            let appender = match rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}

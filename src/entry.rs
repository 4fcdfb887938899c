use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{error, info};

use crate::args::{TesterArgs, build_run_config};
use crate::config::{DEFAULT_CONFIG_FILES, apply_config, load_config};
use crate::engine::run_load_test_with_shutdown;
use crate::error::AppResult;
use crate::http::{ClientOptions, HttpIssuer};
use crate::logger::init_logging;
use crate::report::{export_csv, export_json, print_summary, write_charts};
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel};

/// Parses the command line, runs the load test and writes its outputs.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, or when an
/// output file cannot be written. Individual request failures are part of
/// the report, not errors.
pub fn run() -> AppResult<()> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(());
    };

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args))
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

/// A bare invocation prints help unless a default config file is present.
fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

async fn run_async(args: &TesterArgs) -> AppResult<()> {
    let config = build_run_config(args)?;
    let issuer = HttpIssuer::new(ClientOptions::from_run_config(&config, args.keep_alive))?;

    let (shutdown_tx, mut shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);
    let result = run_load_test_with_shutdown(&config, Arc::new(issuer), &mut shutdown_rx).await;
    signal_handle.abort();
    let report = result?;

    print_summary(&report, config.ttfb_only);

    if let Some(path) = args.export_json.as_deref() {
        export_json(Path::new(path), &report).await?;
        info!("Results exported to {}", path);
    }
    if let Some(path) = args.export_csv.as_deref() {
        export_csv(Path::new(path), &report).await?;
        info!("Results exported to {}", path);
    }

    if args.no_charts {
        return Ok(());
    }
    match write_charts(&report, &config, Path::new(&args.charts_path)).await {
        Ok(paths) => {
            for path in paths {
                info!("Chart saved to {}", path.display());
            }
            Ok(())
        }
        Err(err) => {
            error!("Failed to write charts to '{}': {}", args.charts_path, err);
            Err(err)
        }
    }
}

//! drupdate CLI entrypoint.
//!
//! This binary lists Drupal 7 core releases, downloads and verifies them,
//! and merges them into an existing installation.

use clap::Parser;
use drupdate::cli::{Cli, Command, MergeArgs};
use drupdate::config::UpdaterConfig;
use drupdate::dirs::SystemBaseDirs;
use drupdate::error::Result;
use drupdate::merge::fs_ops::StdFileOps;
use drupdate::output::{write_listing, write_stderr_line};
use drupdate::pipeline::{InstallOptions, InstallOutcome, Services, Updater};
use drupdate::prompt::{Prompter, StdioPrompter};
use drupdate::release::catalog::HttpCatalogClient;
use drupdate::release::download::UreqTransport;
use drupdate::staging::extraction::GzipTarExtractor;
use drupdate::staging::scratch::ScratchWorkspace;
use log::{debug, warn};
use std::io::{self, Write};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbosity);
    let mut stderr = io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn init_logging(verbosity: u8) {
    let env = env_logger::Env::default().default_filter_or(log_filter(verbosity));
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

fn log_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let dirs = SystemBaseDirs::new();
    let config = UpdaterConfig::load(cli.config_path(), &dirs)?;
    let scratch = ScratchWorkspace::new(config.resolve_scratch_dir(&dirs)?);
    debug!("scratch workspace at {}", scratch.root());

    let transport = UreqTransport::new(config.download_timeout());
    let catalog = HttpCatalogClient::new(&transport, config.catalog_url.clone());
    let services = Services {
        catalog: &catalog,
        transport: &transport,
        extractor: &GzipTarExtractor,
        file_ops: &StdFileOps,
    };
    let updater = Updater::new(services, scratch);

    let mut sink = io::sink();
    let status: &mut dyn Write = if cli.quiet { &mut sink } else { stderr };
    let mut prompter = StdioPrompter::new(io::stdin().lock(), io::stderr());

    match &cli.command {
        Command::List(args) => {
            let catalog = updater.list_versions(args.limit)?;
            write_listing(&mut io::stdout().lock(), &catalog, args.limit)
        }
        Command::Download(args) => {
            let outcome = updater.download_and_install(
                args.version.as_deref(),
                args.merge.destination.as_deref(),
                args.insecure_policy(),
                install_options(&args.merge, &config),
                &mut prompter,
                status,
            )?;
            if outcome == InstallOutcome::IntegrityMismatch {
                warn!("installation skipped: downloaded archive failed verification");
            }
            Ok(())
        }
        Command::Install(args) => {
            let destination = match &args.merge.destination {
                Some(dir) => dir.clone(),
                None => prompter.destination()?,
            };
            updater.install_archive(
                &args.archive,
                &destination,
                install_options(&args.merge, &config),
                status,
            )?;
            Ok(())
        }
    }
}

fn install_options(merge: &MergeArgs, config: &UpdaterConfig) -> InstallOptions {
    InstallOptions {
        replace_all: merge.replace,
        keep_extract: merge.keep_extract || config.keep_extract,
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) if err.is_operator_abort() => {
            debug!("{err}");
            write_stderr_line(stderr, "Aborting Installation");
            0
        }
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

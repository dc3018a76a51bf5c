use anyhow::Result;
use clap::{CommandFactory, Parser};

use dirview::cli::Cli;
use dirview::commands;
use dirview::config::Config;
use dirview::model::{FsDataSource, SizeWorker, TreeDataSource};
use dirview::tui::{widgets::tree::IconStyle, App};
use dirview::BrowserError;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "dirview", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize logging based on verbosity
    init_logging(cli.verbose, cli.quiet, !cli.list_mode());

    // Load configuration
    let config = Config::load(cli.config.as_deref())?;

    tracing::debug!(?config, "Loaded configuration");

    if cli.list_mode() {
        commands::list::run(&cli)?;
        return Ok(());
    }

    let root = cli.root()?;
    let mut source = FsDataSource::new(&root).with_cache_ttl(config.browser.size_cache_ttl());
    if !source.root_is_valid() {
        return Err(BrowserError::InvalidRoot(root).into());
    }
    source.set_name_filter(&cli.filter);

    let options = cli.view_options(&config);
    tracing::info!(root = %source.root().display(), ?options, "Starting browser");

    let worker = SizeWorker::new(config.browser.worker_threads)?;
    let app = App::with_worker(Box::new(source), worker)
        .with_icons(IconStyle::from_enabled(options.custom_icons))
        .with_indent(config.tui.indent)
        .with_watch(options.watch.then(|| config.tui.refresh_interval()))
        .with_sort(config.tui.sort_column());

    dirview::tui::run(app)?;

    Ok(())
}

fn init_logging(verbosity: u8, quiet: bool, interactive: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // The TUI owns the terminal, so stay silent there unless asked
    let level = if interactive && verbosity == 0 {
        "off"
    } else if quiet {
        "error"
    } else {
        match verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dirview={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

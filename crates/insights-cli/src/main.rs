use clap::Parser;
use insights_core::storage::config::Config;
use insights_core::utils::logging::log_error;
use std::path::Path;

mod cli;

use cli::dispatcher::Dispatcher;
use cli::main_types::Cli;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load Config
    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| Config::file_in(Path::new(dir)));

    let config = match Config::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("Could not load config: {}", err));
            std::process::exit(1);
        }
    };

    if cli.verbose {
        println!("Verbose mode is enabled");

        if let Some(config_dir) = &cli.config_dir {
            println!("Using config directory: {}", config_dir);
        }

        if cli.token.as_ref().is_some_and(|token| !token.is_empty()) {
            println!("Using token provided on the command line");
        }
    }

    let dispatcher = Dispatcher::new(config, config_path, cli.verbose, cli.url, cli.token);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        eprintln!("{} {}", e.severity().emoji(), e.display_friendly());
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("💡 {}", hint);
        }
        std::process::exit(1);
    }
}

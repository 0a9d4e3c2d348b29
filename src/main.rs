//! micrec CLI entry point

use std::process::ExitCode;

use clap::Parser;

use micrec::cli::{
    app::{list_devices, load_merged_config, run_record, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    RecordOptions,
};
use micrec::domain::config::AppConfig;
use micrec::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let presenter = Presenter::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    if cli.list_devices {
        return list_devices(&presenter);
    }

    // Build CLI config from args
    let cli_config = AppConfig {
        output: cli.output.clone(),
        device: cli.device,
    };

    // Merge config
    let config = load_merged_config(cli_config).await;

    let options = RecordOptions {
        device: config.device,
        output: config.output_or_default(),
    };

    run_record(options).await
}

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;
use workshift::cli::{self, Cli, Commands};
use workshift::{AppState, Config, Gateway, Profile};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // --dev keeps config, database and log apart from the real ones
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    let (config, config_path) = match cli.config.as_deref() {
        Some(path) => {
            let path = workshift::utils::expand_path(path);
            (Config::load_from_path(&path, profile)?, path)
        }
        None => {
            let path = Config::get_config_path(profile)?;
            (Config::load_from_path(&path, profile)?, path)
        }
    };

    let log_dir = workshift::utils::get_data_dir(profile).unwrap_or_else(|| PathBuf::from("."));
    workshift::logging::init(&log_dir, &config.log_level)?;

    let gateway = Gateway::from_config(&config)?;
    let loaded = gateway.load()?;
    info!(source = %loaded.source, "state loaded");
    let mut state = AppState::from_snapshot(loaded.snapshot);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = workshift::tui::App::new(config, config_path, gateway, state, loaded.source);
            workshift::tui::run_event_loop(app)?;
        }
        Commands::Employee { action } => cli::handle_employee(action, &mut state, &gateway)?,
        Commands::Shift { action } => cli::handle_shift(action, &mut state, &gateway)?,
        Commands::Task { action } => cli::handle_task(action, &mut state, &gateway)?,
        Commands::Summary { month } => cli::handle_summary(month, &state, &config.currency_symbol)?,
        Commands::Day { date } => cli::handle_day(date, &state)?,
        Commands::Calendar { month, employee } => cli::handle_calendar(month, employee, &state)?,
        Commands::Export { format, output } => cli::handle_export(format, output, &state)?,
        Commands::Import { file } => cli::handle_import(file, &mut state, &gateway)?,
        Commands::Backup { action } => cli::handle_backup(action, &mut state, &gateway)?,
        Commands::Settings { action } => cli::handle_settings(action, &mut state, &gateway)?,
        Commands::Clear { yes } => cli::handle_clear(yes, &mut state, &gateway)?,
    }

    Ok(())
}

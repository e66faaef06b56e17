use std::{error::Error, path::PathBuf};

use clap::Parser;
use ohlcv_source::{
    IexDataSource, OhlcvDataSource,
    cli::{
        SeriesSummary, SettingsEdit,
        commands::{Cli, Commands},
        parse_symbols, save_edited_settings, settings_for_source,
    },
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SETTINGS_PATH: &str = "ohlcv_source.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));

    match cli.command {
        Commands::Fetch { symbols, from, to } => {
            let edit = SettingsEdit {
                from,
                to,
                ..SettingsEdit::default()
            };
            let settings = settings_for_source(&config_path, edit)?;
            let keys = parse_symbols(&symbols)?;
            let source = IexDataSource::new(&settings)?;
            let (start, end) = settings.window()?;

            let series = source.get_symbols_data(&keys, start, end).await;
            for s in &series {
                println!("{}", serde_json::to_string(&SeriesSummary::from(s))?);
            }
            source.disconnect().await;
        }
        Commands::Probe => {
            let settings = settings_for_source(&config_path, SettingsEdit::default())?;
            let source = IexDataSource::new(&settings)?;
            let ready = source.is_ready().await;
            println!("{}", serde_json::json!({ "ready": ready }));
            if !ready {
                std::process::exit(1);
            }
        }
        Commands::Settings {
            from,
            to,
            range,
            path,
        } => {
            let target = path.unwrap_or_else(|| config_path.clone());
            save_edited_settings(&config_path, &target, SettingsEdit { from, to, range })?;
            info!(path = %target.display(), "settings saved");
        }
    }
    Ok(())
}

use std::path::{Path, PathBuf};

use actix_web::{App, HttpServer, middleware};
use clap::{Arg, Command, value_parser};
use config::{Config, File};
use fern::colors::{Color, ColoredLevelConfig};
use log::{LevelFilter, error, info};
use ownershelf::{
    conf::ServerConfig, providers::http::HttpOwnersProviderFactory, routes::setup_service_config,
    templates::templates_from_builtin,
};

fn setup_logger(level: LevelFilter, log_file: Option<&Path>) -> Result<(), fern::InitError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let colors = ColoredLevelConfig::new()
                .info(Color::BrightGreen)
                .error(Color::BrightRed)
                .warn(Color::BrightYellow);
            out.finish(format_args!(
                "[{}] [{}] {}",
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = log_file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

use clap::{crate_authors, crate_description, crate_name, crate_version};

fn load_config(
    file: Option<&String>,
    plugins_config: Option<&PathBuf>,
) -> Result<ServerConfig, config::ConfigError> {
    let mut settings_builder = Config::builder();

    if let Some(v) = file {
        settings_builder = settings_builder.add_source(File::with_name(v));
    }

    // Eg.. `OWNERS_UPSTREAM__TIMEOUT_SECS=5 ./ownershelf` sets `upstream.timeout_secs`
    settings_builder = settings_builder.add_source(
        config::Environment::with_prefix("OWNERS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    if let Some(path) = plugins_config {
        settings_builder = settings_builder
            .set_override("upstream.plugins_config", path.to_string_lossy().to_string())?;
    }

    settings_builder.build()?.try_deserialize::<ServerConfig>()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

fn command() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .author(crate_authors!(","))
        .about(crate_description!())
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a server config file"),
        )
        .arg(
            Arg::new("plugins_config")
                .short('p')
                .long("plugins-config")
                .value_name("FILE")
                .env("EXTERNAL_PLUGINS_CONFIG")
                .value_parser(value_parser!(PathBuf))
                .help("Path to the external plugin configuration used to find owners endpoints"),
        )
        .arg(
            Arg::new("log_level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .default_value("info")
                .value_parser(LOG_LEVELS)
                .ignore_case(true)
                .help("Sets the logging level"),
        )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cmd = command().get_matches();

    let config = load_config(
        cmd.get_one::<String>("config"),
        cmd.get_one::<PathBuf>("plugins_config"),
    )
    .map_err(|e| {
        std::io::Error::other(format!("Failed to load server configuration: {}", e))
    })?;

    let level = cmd
        .get_one::<String>("log_level")
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = setup_logger(level, config.general.log_file.as_deref()) {
        eprintln!("Failed to set up logging: {}", e);
    }

    let factory = HttpOwnersProviderFactory::from_config(&config).map_err(|e| {
        error!("Failed to set up the owners source: {}", e);
        std::io::Error::other(e)
    })?;

    let address = (config.general.address.clone(), config.general.port);
    info!("Starting {} on {}:{}", config.general.name, address.0, address.1);

    HttpServer::new(move || {
        let config = config.clone();
        let factory = factory.clone();
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(middleware::NormalizePath::trim())
            .configure(move |f| {
                setup_service_config(f, &config, factory, Some(templates_from_builtin()));
            })
    })
    .bind(address)?
    .run()
    .await
}

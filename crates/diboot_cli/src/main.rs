//! Command-line entry point.
//!
//! # Responsibility
//! - Open (and migrate) a dictionary database.
//! - Print JSON envelopes for dictionary lookups so output can be piped.

use clap::{Parser, Subcommand};
use diboot_core::db::open_db_from_config;
use diboot_core::logging::init_logging_from_config;
use diboot_core::{
    install_config, CoreConfig, Dictionary, DictionaryService, DictionaryVo, EntityQuery,
    JsonResult, KeyValue, Page, Pagination, PagingJsonResult, ServiceError,
    SqliteDictionaryRepository,
};
use log::info;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "diboot dictionary tool", long_about = None)]
struct Cli {
    /// SQLite database file. Uses a seeded in-memory database when omitted.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints core linkage information.
    Ping,
    /// Inserts the built-in dictionary definitions when missing.
    Seed,
    /// Prints the key-value items of one dictionary type.
    Kv {
        #[arg(value_name = "TYPE")]
        dict_type: String,
    },
    /// Prints one page of rows of one dictionary type.
    Page {
        #[arg(value_name = "TYPE")]
        dict_type: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 0)]
        size: u32,
        /// Order in `<field>:<ASC|DESC>` form, comma separated.
        #[arg(long, default_value = "id:DESC")]
        order_by: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    install_config(config.clone()).map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;

    if let Commands::Ping = cli.command {
        println!("diboot_core ping={}", diboot_core::ping());
        println!("diboot_core version={}", diboot_core::core_version());
        return Ok(());
    }

    let conn = open_db_from_config(&config).map_err(|err| err.to_string())?;
    let repo = SqliteDictionaryRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = DictionaryService::new(repo);
    if config.database_path.is_none() && !matches!(cli.command, Commands::Seed) {
        seed(&service).map_err(|err| err.to_string())?;
    }

    match cli.command {
        Commands::Ping => Ok(()),
        Commands::Seed => print_json(&envelope(seed(&service))),
        Commands::Kv { dict_type } => print_json(&key_values(&service, &dict_type)),
        Commands::Page {
            dict_type,
            page,
            size,
            order_by,
        } => {
            let mut pagination = Pagination::new(page, size);
            pagination.order_by = Some(order_by);
            let query = EntityQuery::new().eq("type", dict_type);
            match service
                .base()
                .get_page(&query, Page::from_pagination(&pagination))
            {
                Ok(page) => print_json(&PagingJsonResult::from(page)),
                Err(err) => print_json(&JsonResult::<()>::from(&err)),
            }
        }
    }
}

fn load_config(cli: &Cli) -> Result<CoreConfig, String> {
    let mut config = match &cli.config {
        Some(path) => CoreConfig::load(path).map_err(|err| err.to_string())?,
        None => CoreConfig::default(),
    };
    if cli.db.is_some() {
        config.database_path.clone_from(&cli.db);
    }
    if cli.log_dir.is_some() {
        config.log_dir.clone_from(&cli.log_dir);
    }
    Ok(config)
}

/// Built-in definitions: `(type, name, [(item name, item value)])`.
const BUILTIN_DICTIONARIES: &[(&str, &str, &[(&str, &str)])] = &[(
    "GENDER",
    "Gender",
    &[("Male", "M"), ("Female", "F")],
)];

fn seed(
    service: &DictionaryService<SqliteDictionaryRepository<'_>>,
) -> Result<Vec<String>, ServiceError> {
    let mut created = Vec::new();
    for (dict_type, name, items) in BUILTIN_DICTIONARIES {
        if service.exists_type(dict_type)? {
            continue;
        }
        let children = items
            .iter()
            .enumerate()
            .map(|(index, (item_name, item_value))| {
                Dictionary::item(*dict_type, *item_name, *item_value).with_sort_id(index as i64)
            })
            .collect();
        let mut vo = DictionaryVo::new(Dictionary::root(*dict_type, *name), children);
        service.create_dict_and_children(&mut vo)?;
        created.push((*dict_type).to_string());
    }
    info!(
        "event=seed module=cli status=ok created={}",
        created.len()
    );
    Ok(created)
}

/// Key-value items of `dict_type`. A type with no definition is `FailNotFound`.
fn key_values(
    service: &DictionaryService<SqliteDictionaryRepository<'_>>,
    dict_type: &str,
) -> JsonResult<Vec<KeyValue>> {
    match service.exists_type(dict_type) {
        Ok(true) => envelope(service.get_key_value_list(dict_type)),
        Ok(false) => JsonResult::fail_not_found(format!("dictionary type {dict_type}")),
        Err(err) => JsonResult::from(&err),
    }
}

fn envelope<T>(result: Result<T, ServiceError>) -> JsonResult<T> {
    match result {
        Ok(data) => JsonResult::ok(data),
        Err(err) => JsonResult::from(&err),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

pub mod models;
pub mod services;
pub mod api;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use api::AnalyzeOptions;
use models::{DocumentResult, ProfileLabel};
use services::detection::pipeline::DEFAULT_BATCH_CONCURRENCY;
use services::{load_document, AppConfig, ConfigStore, FileProfileStore, ProfileStore};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

const USAGE: &str = "Usage:
  signalcheck analyze <file|-> [--threshold <0..1>] [--raw] [--out <json_path>]
  signalcheck batch <file>... [--threshold <0..1>] [--concurrency <n>]
  signalcheck calibrate <human|ai> <file|->
  signalcheck profiles
  signalcheck clear-profiles
  signalcheck config [set <key> <value>]

Notes:
  - Results are written to stdout as JSON; logs go to stderr and the log file.
  - `--raw` skips punctuation normalization before analysis.
  - Config keys: threshold, normalize-punctuation, profiles-file.
  - Scores are heuristic signals, not verdicts.";

fn env_truthy(name: &str) -> bool {
    matches!(
        std::env::var(name).as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE") | Ok("yes") | Ok("YES")
    )
}

/// Initialize logging: a per-session log file plus a stderr console layer.
pub fn init_logging() {
    let disable_file_log = env_truthy("SIGNALCHECK_DISABLE_FILE_LOG");
    let disable_cleanup = env_truthy("SIGNALCHECK_DISABLE_LOG_CLEANUP");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if disable_file_log {
        init_console_only_logging(env_filter);
        return;
    }

    let logs_dir = match std::env::var("SIGNALCHECK_LOG_DIR") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => get_logs_dir(),
    };

    if let Err(e) = fs::create_dir_all(&logs_dir) {
        eprintln!("Failed to create logs directory: {}", e);
        init_console_only_logging(env_filter);
        info!("Falling back to console-only logging (log dir not writable)");
        return;
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let log_filename = format!("signalcheck_{}.log", timestamp);

    let file_appender = rolling::never(&logs_dir, &log_filename);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(file_guard);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    info!("Log file: {}/{}", logs_dir.display(), log_filename);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if !disable_cleanup {
        std::thread::spawn(move || {
            cleanup_old_logs(&logs_dir, 30);
        });
    }
}

fn get_logs_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        return data_dir.join("signalcheck").join("logs");
    }
    PathBuf::from("logs")
}

fn cleanup_old_logs(logs_dir: &Path, keep: usize) {
    let mut entries: Vec<_> = match fs::read_dir(logs_dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).collect(),
        Err(_) => return,
    };

    entries.retain(|e| {
        let name = e.file_name().to_string_lossy().to_string();
        name.starts_with("signalcheck_") && name.ends_with(".log")
    });

    if entries.len() <= keep {
        return;
    }

    entries.sort_by_key(|e| {
        e.metadata()
            .and_then(|m| m.modified())
            .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
    });

    let remove_count = entries.len().saturating_sub(keep);
    for entry in entries.into_iter().take(remove_count) {
        let _ = fs::remove_file(entry.path());
    }
}

fn init_console_only_logging(env_filter: EnvFilter) {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(cfg!(debug_assertions))
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// Positional arguments after the subcommand, skipping flags and their values.
fn positionals(args: &[String]) -> Vec<String> {
    const VALUE_FLAGS: &[&str] = &["--threshold", "--out", "--concurrency"];
    let mut out = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let a = &args[i];
        if VALUE_FLAGS.contains(&a.as_str()) {
            i += 2;
            continue;
        }
        if !a.starts_with("--") {
            out.push(a.clone());
        }
        i += 1;
    }
    out
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin failed")?;
        return Ok(buf);
    }
    Ok(load_document(Path::new(path))?)
}

fn load_config() -> (ConfigStore, AppConfig) {
    let dir = ConfigStore::default_config_dir().unwrap_or_else(|| PathBuf::from("signalcheck"));
    let store = ConfigStore::new(dir);
    let config = store.load().unwrap_or_else(|e| {
        warn!("{}; using default configuration", e);
        AppConfig::default()
    });
    (store, config)
}

/// Apply one `config set` change and persist it.
fn set_config_value(store: &ConfigStore, key: &str, value: &str) -> anyhow::Result<AppConfig> {
    let mut config = store.load().map_err(anyhow::Error::msg)?;
    config.set(key, value).map_err(anyhow::Error::msg)?;
    store.save(&config).map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T, out_path: Option<&str>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out_path {
        Some(path) => {
            fs::write(path, &json).with_context(|| format!("write {} failed", path))?;
            info!("Wrote JSON: {}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Command-line entry point. `args[0]` is the program name.
pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let Some(command) = args.get(1).map(|s| s.as_str()) else {
        eprintln!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[2..];

    let (config_store, config) = load_config();
    let profiles = FileProfileStore::new(config_store.profiles_path(&config));

    let threshold = match parse_arg_value(rest, "--threshold") {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("invalid --threshold value: {}", raw))?,
        None => config.detection.effective_threshold(),
    };
    let options = AnalyzeOptions {
        threshold,
        normalize_punctuation: config.detection.normalize_punctuation && !has_flag(rest, "--raw"),
    };

    match command {
        "analyze" => {
            let inputs = positionals(rest);
            let Some(path) = inputs.first() else {
                bail!("analyze needs an input file (or - for stdin)");
            };
            let text = read_input(path)?;
            let payload = serde_json::json!({ "text": text });
            let response = api::analyze_request(&payload, options, &profiles)?;
            print_json(&response, parse_arg_value(rest, "--out").as_deref())
        }
        "batch" => {
            let inputs = positionals(rest);
            if inputs.is_empty() {
                bail!("batch needs at least one input file");
            }
            let concurrency = parse_arg_value(rest, "--concurrency")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BATCH_CONCURRENCY);
            let mut texts = Vec::with_capacity(inputs.len());
            for path in &inputs {
                texts.push(read_input(path)?);
            }
            let results = services::analyze_batch(texts, options.threshold, concurrency).await;

            #[derive(Serialize)]
            struct BatchItem {
                file: String,
                result: DocumentResult,
            }
            let items: Vec<BatchItem> = inputs
                .into_iter()
                .zip(results)
                .map(|(file, result)| BatchItem { file, result })
                .collect();
            print_json(&items, parse_arg_value(rest, "--out").as_deref())
        }
        "calibrate" => {
            let inputs = positionals(rest);
            let (Some(label), Some(path)) = (inputs.first(), inputs.get(1)) else {
                bail!("calibrate needs a label (human|ai) and an input file");
            };
            let text = read_input(path)?;
            let profile = api::calibrate(label, &text, options, &profiles)?;
            print_json(&profile, None)
        }
        "profiles" => {
            #[derive(Serialize)]
            struct Profiles {
                path: String,
                human: Option<models::ReferenceProfile>,
                ai: Option<models::ReferenceProfile>,
            }
            let listing = Profiles {
                path: profiles.path().display().to_string(),
                human: profiles.load(ProfileLabel::Human),
                ai: profiles.load(ProfileLabel::Ai),
            };
            print_json(&listing, None)
        }
        "clear-profiles" => {
            api::clear_profiles(&profiles)?;
            eprintln!("Cleared calibration profiles at {}", profiles.path().display());
            Ok(())
        }
        "config" => {
            let inputs = positionals(rest);
            match inputs.first().map(|s| s.as_str()) {
                None => {
                    #[derive(Serialize)]
                    struct ConfigListing<'a> {
                        path: String,
                        config: &'a AppConfig,
                    }
                    let listing = ConfigListing {
                        path: config_store.config_file().display().to_string(),
                        config: &config,
                    };
                    print_json(&listing, None)
                }
                Some("set") => {
                    let (Some(key), Some(value)) = (inputs.get(1), inputs.get(2)) else {
                        bail!("config set needs a key and a value");
                    };
                    let updated = set_config_value(&config_store, key, value)?;
                    print_json(&updated, None)
                }
                Some(other) => bail!("unknown config action: {}", other),
            }
        }
        "-h" | "--help" | "help" => {
            eprintln!("{}", USAGE);
            Ok(())
        }
        other => bail!("unknown command: {}\n\n{}", other, USAGE),
    }
}

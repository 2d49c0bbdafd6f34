use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use attune_core::audit::AuditSummary;
use attune_core::{
    calculate_compatibility_weighted, rng_for, ActivityCatalog, EngineError, SessionPlanner,
    SessionSettings, Selector,
};
use contracts::{EngineConfig, Profile, Rating, TurnContext};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to encode output: {0}")]
    Output(#[source] serde_json::Error),
}

fn print_usage() {
    println!("attune-cli [--config <path>] [--rating <G|R|X>] <command>");
    println!("commands:");
    println!("  compat <a.json> <b.json>");
    println!("  select <a.json> <b.json> <catalog.json> <step> [total]");
    println!("  session <a.json> <b.json> <catalog.json> [steps]");
    println!("environment:");
    println!("  ATTUNE_CONFIG  engine config json, overridden by --config");
    println!("  ATTUNE_SEED    fixed sampling seed");
    println!("  RUST_LOG       log filter, default info");
}

/// Flags accepted anywhere on the command line; everything else is positional.
#[derive(Debug, Default)]
struct Options {
    config_path: Option<PathBuf>,
    rating: Option<Rating>,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options, CliError> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter
                    .next()
                    .ok_or_else(|| CliError::Usage("missing value for --config".to_string()))?;
                options.config_path = Some(PathBuf::from(path));
            }
            "--rating" => {
                let raw = iter
                    .next()
                    .ok_or_else(|| CliError::Usage("missing value for --rating".to_string()))?;
                options.rating = Some(parse_rating(raw)?);
            }
            _ => options.positional.push(arg.clone()),
        }
    }
    Ok(options)
}

fn parse_rating(raw: &str) -> Result<Rating, CliError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "G" => Ok(Rating::G),
        "R" => Ok(Rating::R),
        "X" => Ok(Rating::X),
        _ => Err(CliError::Usage(format!("invalid rating: {raw}"))),
    }
}

fn parse_u32(value: Option<&String>, label: &str) -> Result<u32, CliError> {
    let raw = value.ok_or_else(|| CliError::Usage(format!("missing {label}")))?;
    raw.parse::<u32>()
        .map_err(|_| CliError::Usage(format!("invalid {label}: {raw}")))
}

fn parse_optional_u32(value: Option<&String>, label: &str, default: u32) -> Result<u32, CliError> {
    match value {
        Some(_) => parse_u32(value, label),
        None => Ok(default),
    }
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = read_text(path)?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_profile(value: Option<&String>, label: &str) -> Result<Profile, CliError> {
    let path = value.ok_or_else(|| CliError::Usage(format!("missing {label}")))?;
    let profile: Profile = read_json(Path::new(path))?;
    profile.validate().map_err(EngineError::from)?;
    Ok(profile)
}

fn read_catalog(value: Option<&String>) -> Result<ActivityCatalog, CliError> {
    let path = value.ok_or_else(|| CliError::Usage("missing catalog".to_string()))?;
    Ok(ActivityCatalog::from_json(&read_text(Path::new(path))?)?)
}

fn config_path(options: &Options) -> Option<PathBuf> {
    options.config_path.clone().or_else(|| {
        env::var("ATTUNE_CONFIG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    })
}

fn load_config(options: &Options) -> Result<EngineConfig, CliError> {
    let mut config = match config_path(options) {
        Some(path) => read_json::<EngineConfig>(&path)?,
        None => EngineConfig::default(),
    };
    if let Some(raw) = env::var("ATTUNE_SEED")
        .ok()
        .filter(|value| !value.trim().is_empty())
    {
        let seed = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| CliError::Usage(format!("invalid ATTUNE_SEED: {raw}")))?;
        config.seed = Some(seed);
    }
    config.validate().map_err(EngineError::from)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(value).map_err(CliError::Output)?;
    println!("{encoded}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn run_compat(options: &Options, config: &EngineConfig) -> Result<(), CliError> {
    let args = &options.positional;
    let profile_a = read_profile(args.get(1), "profile a")?;
    let profile_b = read_profile(args.get(2), "profile b")?;
    let report =
        calculate_compatibility_weighted(&profile_a, &profile_b, &config.compatibility_weights);
    info!(
        score = report.overall_score,
        label = %report.interpretation_label,
        "compatibility report ready"
    );
    print_json(&report)
}

fn run_select(options: &Options, config: EngineConfig) -> Result<(), CliError> {
    let args = &options.positional;
    let profile_a = read_profile(args.get(1), "profile a")?;
    let profile_b = read_profile(args.get(2), "profile b")?;
    let catalog = read_catalog(args.get(3))?;
    let step = parse_u32(args.get(4), "step")?;
    let total = parse_optional_u32(args.get(5), "total", config.session_length)?;
    if step == 0 || total == 0 {
        return Err(CliError::Usage("step and total start at 1".to_string()));
    }

    let ctx = TurnContext::new(step, total, options.rating.unwrap_or(Rating::R));
    let mut rng = rng_for(&config);
    let selector = Selector::new(config);
    let selection = selector.select(&ctx, &profile_a, &profile_b, &catalog, &mut rng);
    info!(step, found = selection.is_found(), "selection finished");
    print_json(&selection)
}

#[derive(Serialize)]
struct SessionOutput<'a> {
    cards: &'a [attune_core::Card],
    truths: u32,
    dares: u32,
    empty_turns: u32,
    audit: AuditSummary,
}

fn run_session(options: &Options, config: EngineConfig) -> Result<(), CliError> {
    let args = &options.positional;
    let profile_a = read_profile(args.get(1), "profile a")?;
    let profile_b = read_profile(args.get(2), "profile b")?;
    let catalog = read_catalog(args.get(3))?;
    let steps = parse_optional_u32(args.get(4), "steps", config.session_length)?;
    if steps == 0 {
        return Err(CliError::Usage("steps must be at least 1".to_string()));
    }

    let settings = SessionSettings {
        rating_tier: options.rating.unwrap_or(Rating::R),
        total_steps: steps,
        ..SessionSettings::default()
    };
    let rng = rng_for(&config);
    let mut planner =
        SessionPlanner::new(&catalog, config, settings, vec![profile_a, profile_b], rng)?;

    let mut empty_turns = 0;
    for _ in 0..steps {
        if planner.next_card().is_none() {
            empty_turns += 1;
        }
    }

    let (truths, dares) = planner.counts();
    let audit = planner.audit();
    info!(
        cards = planner.played().len(),
        truths,
        dares,
        empty_turns,
        clean = audit.is_clean(),
        "session finished"
    );
    print_json(&SessionOutput {
        cards: planner.played(),
        truths,
        dares,
        empty_turns,
        audit: AuditSummary::from(&audit),
    })
}

fn run(options: &Options) -> Result<(), CliError> {
    let command = options.positional.first().map(String::as_str);
    match command {
        Some("compat") => run_compat(options, &load_config(options)?),
        Some("select") => run_select(options, load_config(options)?),
        Some("session") => run_session(options, load_config(options)?),
        Some(other) => Err(CliError::Usage(format!("unknown command: {other}"))),
        None => {
            print_usage();
            Ok(())
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = parse_options(&args).and_then(|options| run(&options));
    if let Err(err) = result {
        eprintln!("error: {err}");
        if matches!(err, CliError::Usage(_)) {
            print_usage();
            process::exit(2);
        }
        process::exit(1);
    }
}

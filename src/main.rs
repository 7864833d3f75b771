use account_tier::config::{Config, ProviderKind};
use account_tier::enrich::{self, CachedEnricher};
use account_tier::scoring::{CriteriaRegistry, Tier};
use account_tier::{batch, config, credentials, csv, output, overrides, scoring};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    /// Tier-grouped table
    #[default]
    Table,
    /// Tab-separated, no header
    Tsv,
    /// Full CSV export with score columns
    Csv,
    /// JSON array of scored accounts
    Json,
}

/// Run-time changes to the configured criteria
#[derive(Args, Debug, Default)]
struct CriteriaArgs {
    /// Set a criterion weight, e.g. --weight revenue=30 (repeatable)
    #[arg(long = "weight", value_name = "ID=WEIGHT")]
    weights: Vec<String>,

    /// Disable a criterion (repeatable)
    #[arg(long = "disable", value_name = "ID")]
    disable: Vec<String>,

    /// Enable a criterion (repeatable)
    #[arg(long = "enable", value_name = "ID")]
    enable: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enrich, score and tier the accounts in a CSV file
    Score {
        /// CSV file with a header row
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write results to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enrichment provider (overrides the config file)
        #[arg(long)]
        provider: Option<ProviderKind>,

        /// Bypass the enrichment cache
        #[arg(long)]
        no_cache: bool,

        /// Wipe the enrichment cache before scoring
        #[arg(long)]
        clear_cache: bool,

        /// Score even if enabled weights do not sum to 100
        #[arg(long)]
        allow_unbalanced: bool,

        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Show the scoring criteria and their weights
    Criteria {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Set, clear or list manual tier overrides
    Override {
        /// Company name (omit to list all overrides)
        company: Option<String>,

        /// Tier to assign (1-4)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        tier: Option<u8>,

        /// Reason shown next to the account
        #[arg(short, long)]
        justification: Option<String>,

        /// Remove the company's override
        #[arg(long, conflicts_with_all = ["tier", "justification"])]
        clear: bool,
    },
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "account-tier")]
#[command(about = "Tier sales accounts by weighted scoring of enriched signals", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/account-tier/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Apply --weight, --enable and --disable, in that order
fn apply_criteria_args(
    registry: &mut CriteriaRegistry,
    args: &CriteriaArgs,
) -> anyhow::Result<()> {
    for arg in &args.weights {
        registry.apply_weight_arg(arg)?;
    }
    for id in &args.enable {
        registry.set_enabled(id, true)?;
    }
    for id in &args.disable {
        registry.set_enabled(id, false)?;
    }
    Ok(())
}

/// Load config and build the effective criteria, exiting on errors
fn load_registry(
    config_path: Option<PathBuf>,
    args: &CriteriaArgs,
) -> (Config, CriteriaRegistry) {
    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut registry = config.registry();
    if let Err(e) = apply_criteria_args(&mut registry, args) {
        eprintln!("Criteria error: {}", e);
        std::process::exit(EXIT_CONFIG);
    }
    (config, registry)
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.map(PathBuf::from);

    let code = match cli.command {
        Commands::Init => match config::run_init_wizard(config_path) {
            Ok(()) => EXIT_SUCCESS,
            Err(e) => {
                eprintln!("Init failed: {:#}", e);
                EXIT_CONFIG
            }
        },
        Commands::Criteria { criteria } => {
            let (_, registry) = load_registry(config_path, &criteria);
            let use_colors = output::should_use_colors();
            println!("{}", output::format_criteria(&registry, use_colors));
            match scoring::validate_criteria(registry.as_slice()) {
                Ok(()) => EXIT_SUCCESS,
                Err(errors) => {
                    eprintln!();
                    for error in errors {
                        eprintln!("  - {}", error);
                    }
                    EXIT_CONFIG
                }
            }
        }
        Commands::Override {
            company,
            tier,
            justification,
            clear,
        } => run_override(company, tier, justification, clear),
        Commands::Score {
            file,
            format,
            output,
            provider,
            no_cache,
            clear_cache,
            allow_unbalanced,
            criteria,
        } => {
            let opts = ScoreOptions {
                file,
                format,
                output,
                provider,
                no_cache,
                clear_cache,
                allow_unbalanced,
                verbose: cli.verbose,
            };
            run_score(config_path, &criteria, opts).await
        }
    };

    std::process::exit(code);
}

struct ScoreOptions {
    file: PathBuf,
    format: OutputFormat,
    output: Option<PathBuf>,
    provider: Option<ProviderKind>,
    no_cache: bool,
    clear_cache: bool,
    allow_unbalanced: bool,
    verbose: bool,
}

async fn run_score(
    config_path: Option<PathBuf>,
    criteria: &CriteriaArgs,
    opts: ScoreOptions,
) -> i32 {

    let start_time = Instant::now();
    let (mut config, registry) = load_registry(config_path, criteria);
    if let Some(provider) = opts.provider {
        config.enrichment.provider = provider;
    }

    // Weight sum gate
    if let Err(errors) = scoring::validate_criteria(registry.as_slice()) {
        if !opts.allow_unbalanced {
            eprintln!("Criteria errors:");
            for error in errors {
                eprintln!("  - {}", error);
            }
            eprintln!("Fix the weights or pass --allow-unbalanced.");
            return EXIT_CONFIG;
        }
        for error in errors {
            log::warn!("{}", error);
        }
    }

    if opts.clear_cache {
        if let Err(e) = enrich::clear_cache() {
            eprintln!("Failed to clear cache: {:#}", e);
        } else {
            log::info!("Enrichment cache cleared");
        }
    }

    let accounts = match csv::read_accounts(&opts.file) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            return EXIT_CONFIG;
        }
    };
    log::debug!("Read {} accounts from {}", accounts.len(), opts.file.display());

    let api_key = if config.enrichment.provider == ProviderKind::Http {
        match credentials::resolve_api_key(&config.enrichment) {
            Ok(key) => key,
            Err(e) => {
                eprintln!("Credential error: {}", e);
                return EXIT_AUTH;
            }
        }
    } else {
        None
    };

    let provider = match enrich::build_provider(&config.enrichment, api_key) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Enrichment config error: {:#}", e);
            return EXIT_CONFIG;
        }
    };
    let enricher: Box<dyn enrich::EnrichmentProvider> = if opts.no_cache {
        log::debug!("Cache: disabled (--no-cache)");
        provider
    } else {
        Box::new(CachedEnricher::new(provider, Some(enrich::get_cache_path())))
    };

    let mut results =
        batch::process_batch(accounts, registry.as_slice(), enricher.as_ref()).await;

    match overrides::load_overrides(&overrides::get_overrides_path()) {
        Ok(state) => {
            let applied = overrides::apply_overrides(&mut results, &state);
            if applied > 0 {
                log::info!("Applied {} manual tier overrides", applied);
            }
        }
        Err(e) => log::warn!("Ignoring tier overrides: {:#}", e),
    }

    let use_colors = opts.output.is_none() && output::should_use_colors();
    let rendered = match opts.format {
        OutputFormat::Table => output::format_tier_table(&results, use_colors),
        OutputFormat::Tsv => output::format_tsv(&results),
        OutputFormat::Csv => csv::to_csv(&results),
        OutputFormat::Json => match output::format_json(&results) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Output error: {:#}", e);
                return EXIT_CONFIG;
            }
        },
    };

    match opts.output {
        Some(ref path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                eprintln!("Failed to write {}: {}", path.display(), e);
                return EXIT_CONFIG;
            }
            eprintln!("Wrote {} accounts to {}", results.len(), path.display());
        }
        None => {
            let rendered = rendered.trim_end_matches('\n');
            if !rendered.is_empty() {
                println!("{}", rendered);
            }
        }
    }

    if opts.verbose {
        for scored in &results {
            eprintln!();
            eprintln!("{}", output::format_account_detail(scored, false));
        }
    }

    let summary = batch::BatchSummary::from_results(&results);
    if matches!(opts.format, OutputFormat::Table) || opts.verbose {
        eprintln!();
        eprintln!(
            "{}",
            output::format_summary(&summary, use_colors)
        );
    }
    log::debug!("Done in {:?}", start_time.elapsed());

    // Every enrichment failing points at the provider, not the data
    if summary.total > 0 && summary.failed == summary.total {
        eprintln!("All enrichments failed. Check the provider endpoint and network connection.");
        return EXIT_NETWORK;
    }

    EXIT_SUCCESS
}

fn run_override(
    company: Option<String>,
    tier: Option<u8>,
    justification: Option<String>,
    clear: bool,
) -> i32 {
    use overrides::{get_overrides_path, load_overrides, save_overrides};

    let path = get_overrides_path();
    let mut state = match load_overrides(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load overrides: {:#}", e);
            return EXIT_CONFIG;
        }
    };

    let Some(company) = company else {
        if state.is_empty() {
            println!("No tier overrides.");
            return EXIT_SUCCESS;
        }
        let mut entries: Vec<_> = state.overrides.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (name, entry) in entries {
            let tier_name = entry.tier().map(|t| t.name).unwrap_or("unknown tier");
            println!(
                "{}\t{}\t{}\t{}",
                name,
                tier_name,
                entry.overridden_at.format("%Y-%m-%d"),
                entry.justification.as_deref().unwrap_or("")
            );
        }
        return EXIT_SUCCESS;
    };

    let message = if clear {
        if !state.clear(&company) {
            println!("No override for {}.", company);
            return EXIT_SUCCESS;
        }
        format!("Cleared override for {}.", company)
    } else {
        let Some(tier) = tier.and_then(Tier::from_id) else {
            eprintln!("A tier (1-4) is required, or pass --clear.");
            return EXIT_CONFIG;
        };
        state.set(&company, tier, justification);
        format!("{} will be shown as {}.", company, tier.name)
    };

    if let Err(e) = save_overrides(&path, &state) {
        eprintln!("Failed to save overrides: {:#}", e);
        return EXIT_CONFIG;
    }

    println!("{}", message);
    EXIT_SUCCESS
}

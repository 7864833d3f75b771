use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, Config, EnrichmentConfig, ProviderKind};
use crate::scoring::{default_criteria, validate_criteria, Criterion, MAX_WEIGHT};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Parse a weight answer. 0 disables the criterion.
fn parse_weight(input: &str) -> Result<u32, String> {
    match input.trim().trim_end_matches('%').parse::<u32>() {
        Ok(w) if w <= MAX_WEIGHT => Ok(w),
        Ok(_) => Err(format!("must be between 0 and {}", MAX_WEIGHT)),
        Err(_) => Err("must be a whole number".to_string()),
    }
}

/// Ask for a weight per criterion until the enabled weights sum to 100.
fn prompt_weights() -> Result<Vec<Criterion>> {
    loop {
        let mut criteria = Vec::new();
        let mut total = 0;
        for default in default_criteria() {
            let weight = loop {
                let input = prompt_with_default(
                    &format!("  {} weight (0 disables)", default.label()),
                    &default.weight.to_string(),
                )?;
                match parse_weight(&input) {
                    Ok(w) => break w,
                    Err(e) => println!("  Invalid: {}. Try again.", e),
                }
            };
            total += weight;
            criteria.push(Criterion {
                enabled: weight > 0,
                weight,
                ..default
            });
        }

        match validate_criteria(&criteria) {
            Ok(()) => return Ok(criteria),
            Err(errors) => {
                println!("  Weights add up to {}%.", total);
                for error in errors {
                    println!("  - {}", error);
                }
                println!("  Let's go through them again.");
                println!();
            }
        }
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Account Tier Configuration Wizard");
    println!("=================================");
    println!();

    // 1. Criteria weights
    println!("Each account gets a 0-10 score per criterion. Weights decide how much");
    println!("each criterion counts toward the 0-100 tier score; enabled weights must total 100.");
    println!();
    for c in default_criteria() {
        println!("  {:<24} {:>3}%", c.label(), c.weight);
    }
    println!();
    let criteria = if prompt_yes_no("Use these default weights?", true)? {
        default_criteria()
    } else {
        prompt_weights()?
    };

    // 2. Enrichment provider
    println!();
    println!("Enrichment fills in employee count, revenue, hiring trends and the other signals.");
    println!("  mock     -- generated offline data, stable per company (good for trying things out)");
    println!("  http     -- POST each account to an enrichment endpoint or API proxy");
    println!("  fixture  -- read prepared results from a JSON file");
    let provider = loop {
        let input = prompt_with_default("Provider", "mock")?;
        match input.parse::<ProviderKind>() {
            Ok(p) => break p,
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    let mut enrichment = EnrichmentConfig {
        provider,
        ..EnrichmentConfig::default()
    };
    match provider {
        ProviderKind::Mock => {}
        ProviderKind::Http => {
            let endpoint = loop {
                let e = prompt("  Endpoint URL: ")?;
                if !e.is_empty() {
                    break e;
                }
                println!("  Endpoint is required.");
            };
            enrichment.endpoint = Some(endpoint);
            let env_var = prompt_with_default(
                "  Environment variable holding the API key",
                crate::credentials::DEFAULT_KEY_VAR,
            )?;
            if env_var != crate::credentials::DEFAULT_KEY_VAR {
                enrichment.api_key_env = Some(env_var);
            }
            let timeout = loop {
                let t = prompt_with_default("  Request timeout", "30s")?;
                match humantime::parse_duration(&t) {
                    Ok(_) => break t,
                    Err(e) => println!("  Invalid: {}. Try again.", e),
                }
            };
            enrichment.timeout = Some(timeout);
        }
        ProviderKind::Fixture => {
            let path = loop {
                let p = prompt("  Fixtures JSON path: ")?;
                if !p.is_empty() {
                    break p;
                }
                println!("  Path is required.");
            };
            enrichment.fixtures = Some(PathBuf::from(path));
        }
    }

    // 3. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        criteria,
        enrichment,
    };

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `account-tier score accounts.csv` to tier your first upload.");

    Ok(())
}

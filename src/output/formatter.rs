use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::account::ScoredAccount;
use crate::batch::BatchSummary;
use crate::scoring::{CriteriaRegistry, Tier, TIERS};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Parse "#rrggbb" into RGB components
fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

fn tier_heading(tier: &Tier, count: usize, use_colors: bool) -> String {
    let heading = format!("{} ({})", tier.name, count);
    if !use_colors {
        return format!("{}  {}", heading, tier.description);
    }
    match hex_rgb(tier.color) {
        Some((r, g, b)) => format!(
            "{}  {}",
            heading.truecolor(r, g, b).bold(),
            tier.description.dimmed()
        ),
        None => format!("{}  {}", heading.bold(), tier.description.dimmed()),
    }
}

/// Text after the account name: the error for failed accounts, otherwise the justification
fn account_note(scored: &ScoredAccount) -> String {
    match scored.enrichment_error {
        Some(ref err) => format!("! enrichment failed: {}", err),
        None => scored.justification.clone().unwrap_or_default(),
    }
}

/// Format scored accounts as a table grouped by tier, best tier first.
///
/// Within a tier, accounts are listed by score descending; ties keep upload
/// order. Each row: upload row number, score, name, note. Failed accounts
/// carry a "!" marker and their error; manually tiered accounts a "*".
pub fn format_tier_table(accounts: &[ScoredAccount], use_colors: bool) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }

    let term_width = get_terminal_width();
    let index_width = format!("{}.", accounts.len()).len();
    let score_width = 3;
    let separator = "  ";
    let name_width = accounts
        .iter()
        .map(|a| a.name().chars().count())
        .max()
        .unwrap_or(0)
        .min(32);

    let mut sections = Vec::new();
    for tier in TIERS.iter() {
        let mut rows: Vec<(usize, &ScoredAccount)> = accounts
            .iter()
            .enumerate()
            .filter(|(_, a)| a.tier.id == tier.id)
            .collect();
        if rows.is_empty() {
            continue;
        }
        rows.sort_by(|a, b| b.1.tier_score().cmp(&a.1.tier_score()));

        let mut lines = vec![tier_heading(tier, rows.len(), use_colors)];
        for (idx, scored) in rows {
            let index_str = format!("{:>width$}", format!("{}.", idx + 1), width = index_width);
            let marker = if scored.manual_override { "*" } else { " " };
            let score_str = format!("{:>width$}{}", scored.tier_score(), marker, width = score_width);
            let name = truncate_text(scored.name(), name_width);
            let name_padded = format!("{:<width$}", name, width = name_width);

            let fixed_width =
                2 + index_width + 1 + score_width + 1 + separator.len() * 2 + name_width;
            let note = account_note(scored);
            let note = match term_width {
                Some(width) if width > fixed_width + 10 => truncate_text(&note, width - fixed_width),
                Some(_) => truncate_text(&note, 20),
                None => note,
            };

            let line = if use_colors {
                let note = if scored.is_failed() {
                    note.red().to_string()
                } else {
                    note.dimmed().to_string()
                };
                format!(
                    "  {} {}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    name_padded,
                    separator,
                    note
                )
            } else {
                format!(
                    "  {} {}{}{}{}{}",
                    index_str, score_str, separator, name_padded, separator, note
                )
            };
            lines.push(line.trim_end().to_string());
        }
        sections.push(lines.join("\n"));
    }

    sections.join("\n\n")
}

/// Format scored accounts as tab-separated values for scripting
/// Columns: score, tier, name, url, note (no headers, no colors)
pub fn format_tsv(accounts: &[ScoredAccount]) -> String {
    if accounts.is_empty() {
        return String::new();
    }

    accounts
        .iter()
        .map(|scored| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                scored.tier_score(),
                scored.tier.name,
                scored.name(),
                scored.account.url().unwrap_or_default(),
                account_note(scored).replace(['\t', '\n', '\r'], " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format scored accounts as a pretty-printed JSON array
pub fn format_json(accounts: &[ScoredAccount]) -> Result<String> {
    serde_json::to_string_pretty(accounts).context("Failed to serialize scored accounts")
}

/// Per-criterion breakdown for one account (for verbose mode)
pub fn format_account_detail(scored: &ScoredAccount, use_colors: bool) -> String {
    let title = format!("{}: {} ({})", scored.name(), scored.tier_score(), scored.tier.name);
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title
    }];

    if let Some(ref err) = scored.enrichment_error {
        lines.push(format!("  Enrichment failed: {}", err));
    }
    for item in &scored.breakdown {
        lines.push(format!(
            "  {:<24} {:>2}/10 x {:>3}% = {:>5.1}  {}",
            item.label,
            item.sub_score,
            item.weight,
            item.contribution,
            item.value.as_deref().unwrap_or("-")
        ));
    }
    if scored.manual_override {
        lines.push("  Tier set manually".to_string());
    }
    lines.join("\n")
}

/// One-line batch summary
pub fn format_summary(summary: &BatchSummary, use_colors: bool) -> String {
    let counts: Vec<String> = TIERS
        .iter()
        .zip(summary.per_tier.iter())
        .map(|(tier, count)| {
            let text = format!("{}: {}", tier.name, count);
            match (use_colors, hex_rgb(tier.color)) {
                (true, Some((r, g, b))) => text.truecolor(r, g, b).to_string(),
                _ => text,
            }
        })
        .collect();

    let mut line = format!("{} accounts | {}", summary.total, counts.join(" | "));
    if summary.failed > 0 {
        line.push_str(&format!(" | {} failed", summary.failed));
    }
    if summary.overridden > 0 {
        line.push_str(&format!(" | {} manual", summary.overridden));
    }
    line
}

/// List criteria with weights and the enabled total
pub fn format_criteria(registry: &CriteriaRegistry, use_colors: bool) -> String {
    let mut lines: Vec<String> = registry
        .iter()
        .map(|c| {
            let status = if c.enabled { "" } else { "  (disabled)" };
            let line = format!("{:<18} {:<24} {:>3}%{}", c.id, c.label(), c.weight, status);
            if use_colors && !c.enabled {
                line.dimmed().to_string()
            } else {
                line
            }
        })
        .collect();

    let sum = registry.enabled_weight_sum();
    let total = format!("Enabled total: {}%", sum);
    lines.push(String::new());
    if registry.is_balanced() {
        lines.push(total);
    } else {
        let warning = format!("{} (must be 100% to score)", total);
        lines.push(if use_colors {
            warning.yellow().to_string()
        } else {
            warning
        });
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountRecord;
    use crate::scoring::{classify, Criterion};

    fn scored(company: &str, score: u8, justification: Option<&str>) -> ScoredAccount {
        let record: AccountRecord = [("company", company), ("url", "https://example.com")]
            .into_iter()
            .collect();
        ScoredAccount::scored(
            record,
            score,
            classify(score),
            justification.map(String::from),
            Vec::new(),
        )
    }

    #[test]
    fn test_table_empty() {
        assert_eq!(format_tier_table(&[], false), "No accounts found.");
    }

    #[test]
    fn test_table_groups_by_tier() {
        let accounts = vec![
            scored("Low Co", 20, None),
            scored("Top Co", 90, Some("Expanding fast")),
            scored("Mid Co", 70, None),
            scored("Top Two", 95, None),
        ];
        let table = format_tier_table(&accounts, false);

        let tier1 = table.find("Tier 1 (2)").unwrap();
        let tier2 = table.find("Tier 2 (1)").unwrap();
        let tier4 = table.find("Tier 4 (1)").unwrap();
        assert!(tier1 < tier2 && tier2 < tier4);
        assert!(!table.contains("Tier 3"));

        // Higher score first within a tier, upload row number kept
        let top_two = table.find("Top Two").unwrap();
        let top_co = table.find("Top Co").unwrap();
        assert!(top_two < top_co);
        assert!(table.contains("4.  95"));
        assert!(table.contains("Expanding fast"));
    }

    #[test]
    fn test_table_marks_failures_and_overrides() {
        let record: AccountRecord = [("company", "Broken Inc")].into_iter().collect();
        let failed = ScoredAccount::failed(record, "HTTP 500".to_string());
        let mut manual = scored("Manual Co", 40, None);
        manual.override_tier(TIERS[0], None);

        let table = format_tier_table(&[failed, manual], false);
        assert!(table.contains("! enrichment failed: HTTP 500"));
        assert!(table.contains(" 40*"));
        assert!(table.find("Manual Co").unwrap() < table.find("Broken Inc").unwrap());
    }

    #[test]
    fn test_format_tsv() {
        let accounts = vec![scored("Acme", 88, Some("Line one\nline two"))];
        assert_eq!(
            format_tsv(&accounts),
            "88\tTier 1\tAcme\thttps://example.com\tLine one line two"
        );
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_json() {
        let json = format_json(&[scored("Acme", 88, None)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["company"], "Acme");
        assert_eq!(value[0]["tierScore"], 88);
        assert_eq!(value[0]["tier"]["id"], 1);
        assert_eq!(value[0]["tier"]["color"], "#16a34a");
        assert_eq!(value[0]["manualOverride"], false);
        assert!(value[0].get("enrichmentError").is_none());
    }

    #[test]
    fn test_format_summary() {
        let summary = BatchSummary {
            total: 4,
            per_tier: [1, 1, 0, 2],
            failed: 1,
            overridden: 0,
        };
        assert_eq!(
            format_summary(&summary, false),
            "4 accounts | Tier 1: 1 | Tier 2: 1 | Tier 3: 0 | Tier 4: 2 | 1 failed"
        );
    }

    #[test]
    fn test_format_criteria() {
        let registry = CriteriaRegistry::default();
        let text = format_criteria(&registry, false);
        assert!(text.contains("revenue"));
        assert!(text.contains("Annual Revenue"));
        assert!(text.ends_with("Enabled total: 100%"));

        let unbalanced = CriteriaRegistry::new(vec![Criterion::new("employees", "Employee Count", 60)]);
        let text = format_criteria(&unbalanced, false);
        assert!(text.contains("Enabled total: 60% (must be 100% to score)"));
    }

    #[test]
    fn test_hex_rgb() {
        assert_eq!(hex_rgb("#16a34a"), Some((0x16, 0xa3, 0x4a)));
        assert_eq!(hex_rgb("green"), None);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Short", 10), "Short");
        assert_eq!(truncate_text("A very long company name", 10), "A very ...");
    }
}

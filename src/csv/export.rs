use crate::account::ScoredAccount;

const SCORE_COLUMNS: [&str; 4] = ["tierScore", "tier", "justification", "enrichmentError"];

/// Quote a cell when it holds a delimiter, quote or line break
pub fn escape_cell(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Column order for an export: every account field in first-seen order,
/// followed by the scoring columns.
pub fn export_columns(accounts: &[ScoredAccount]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for scored in accounts {
        for key in scored.account.keys() {
            if !SCORE_COLUMNS.contains(&key) && !columns.iter().any(|c| c.as_str() == key) {
                columns.push(key.to_string());
            }
        }
    }
    columns.extend(SCORE_COLUMNS.iter().map(|c| c.to_string()));
    columns
}

/// Render scored accounts back to CSV. The tier is written as its name.
pub fn to_csv(accounts: &[ScoredAccount]) -> String {
    let columns = export_columns(accounts);
    let mut out = String::new();

    let header: Vec<String> = columns.iter().map(|c| escape_cell(c)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for scored in accounts {
        let row: Vec<String> = columns
            .iter()
            .map(|column| escape_cell(&cell_value(scored, column)))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn cell_value(scored: &ScoredAccount, column: &str) -> String {
    match column {
        "tierScore" => scored.tier_score().to_string(),
        "tier" => scored.tier.name.to_string(),
        "justification" => scored.justification.clone().unwrap_or_default(),
        "enrichmentError" => scored.enrichment_error.clone().unwrap_or_default(),
        _ => scored
            .account
            .get(column)
            .map(|v| v.to_string())
            .unwrap_or_default(),
    }
}

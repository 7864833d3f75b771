use super::criteria::Criterion;
use crate::account::FieldValue;

/// Highest sub-score a single criterion can produce.
pub const MAX_SUB_SCORE: u8 = 10;

/// Lower bounds (exclusive) for employee headcount, highest first.
const EMPLOYEE_BREAKPOINTS: [(f64, u8); 9] = [
    (10_000.0, 10),
    (5_000.0, 9),
    (1_000.0, 8),
    (500.0, 7),
    (250.0, 6),
    (100.0, 5),
    (50.0, 4),
    (20.0, 3),
    (10.0, 2),
];

/// Lower bounds (exclusive) for annual revenue in dollars, highest first.
const REVENUE_BREAKPOINTS: [(f64, u8); 9] = [
    (1_000_000_000.0, 10),
    (500_000_000.0, 9),
    (250_000_000.0, 8),
    (100_000_000.0, 7),
    (50_000_000.0, 6),
    (25_000_000.0, 5),
    (10_000_000.0, 4),
    (5_000_000.0, 3),
    (1_000_000.0, 2),
];

/// Map a categorical label to its fixed score. Case-sensitive, exact match.
pub fn categorical_score(label: &str) -> Option<u8> {
    let score = match label {
        "High" | "Strong" | "Positive" | "Yes" => 10,
        "Medium" | "Moderate" => 6,
        "Neutral" => 5,
        "Low" | "Weak" => 3,
        "Unknown" | "Negative" | "No" => 0,
        _ => return None,
    };
    Some(score)
}

/// Turn one raw field value into a 0-10 sub-score for `criterion`.
///
/// Never fails: a missing, unrecognised or unparseable value scores 0.
pub fn normalize(value: Option<&FieldValue>, criterion: &Criterion) -> u8 {
    let Some(value) = value else {
        return 0;
    };

    if let Some(score) = value.as_text().and_then(categorical_score) {
        return score;
    }

    let breakpoints = match criterion.id.as_str() {
        "employees" => &EMPLOYEE_BREAKPOINTS,
        "revenue" => &REVENUE_BREAKPOINTS,
        _ => return 0,
    };

    let amount = match value {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => extract_number(s),
    };

    match amount {
        Some(n) => bucket(n, breakpoints),
        None => 0,
    }
}

fn bucket(value: f64, breakpoints: &[(f64, u8)]) -> u8 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    breakpoints
        .iter()
        .find(|(floor, _)| value > *floor)
        .map(|(_, score)| *score)
        .unwrap_or(1)
}

/// A number read out of free text, with its magnitude suffix if one followed.
#[derive(Debug, Clone, Copy)]
struct Token {
    value: f64,
    multiplier: Option<f64>,
    end: usize,
}

/// Pull a representative number out of free text.
///
/// Reads the first digit group (thousands separators allowed). When it is
/// followed by a hyphen, en-dash or "to" and a second digit group, the two
/// bounds are averaged. A magnitude suffix (`K`, `M`, `B`, `T` or the spelled
/// word) scales the group it follows; without one any decimal fraction is
/// dropped. Returns `None` when the text holds no digits.
pub fn extract_number(text: &str) -> Option<f64> {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;
    let first = read_token(&chars, start)?;

    let Some(second_start) = range_continuation(&chars, first.end) else {
        return Some(first.value);
    };
    let Some(second) = read_token(&chars, second_start) else {
        return Some(first.value);
    };

    // "$10-50M": the suffix on the upper bound applies to both
    let low = match (first.multiplier, second.multiplier) {
        (None, Some(multiplier)) => first.value * multiplier,
        _ => first.value,
    };
    Some((low + second.value) / 2.0)
}

fn read_token(chars: &[char], start: usize) -> Option<Token> {
    let mut i = start;
    let mut digits = String::new();

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            digits.push(c);
            i += 1;
        } else if c == ',' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()) {
            i += 1;
        } else {
            break;
        }
    }
    if digits.is_empty() {
        return None;
    }

    let mut fraction = String::new();
    let mut after_fraction = i;
    if chars.get(i) == Some(&'.') {
        let mut j = i + 1;
        while j < chars.len() && chars[j].is_ascii_digit() {
            fraction.push(chars[j]);
            j += 1;
        }
        if !fraction.is_empty() {
            after_fraction = j;
        }
    }

    let integer: f64 = digits.parse().ok()?;
    match read_suffix(chars, after_fraction) {
        Some((multiplier, end)) => {
            let value: f64 = if fraction.is_empty() {
                integer
            } else {
                format!("{}.{}", digits, fraction).parse().ok()?
            };
            Some(Token {
                value: value * multiplier,
                multiplier: Some(multiplier),
                end,
            })
        }
        None => Some(Token {
            value: integer,
            multiplier: None,
            end: after_fraction,
        }),
    }
}

/// Look for a magnitude suffix at `pos`, allowing spaces before it.
fn read_suffix(chars: &[char], pos: usize) -> Option<(f64, usize)> {
    let mut i = pos;
    while i < chars.len() && chars[i] == ' ' {
        i += 1;
    }
    let rest: String = chars[i..].iter().collect::<String>().to_lowercase();

    const WORDS: [(&str, f64); 6] = [
        ("thousand", 1e3),
        ("million", 1e6),
        ("billion", 1e9),
        ("trillion", 1e12),
        ("bn", 1e9),
        ("mm", 1e6),
    ];
    for (word, multiplier) in WORDS {
        if rest.starts_with(word) && !is_alpha_at(&rest, word.len()) {
            return Some((multiplier, i + word.chars().count()));
        }
    }

    let multiplier = match rest.chars().next()? {
        'k' => 1e3,
        'm' => 1e6,
        'b' => 1e9,
        't' => 1e12,
        _ => return None,
    };
    if is_alpha_at(&rest, 1) {
        return None;
    }
    Some((multiplier, i + 1))
}

fn is_alpha_at(s: &str, byte_idx: usize) -> bool {
    s[byte_idx..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic())
}

/// If a range separator follows `pos`, return where the upper bound starts.
fn range_continuation(chars: &[char], pos: usize) -> Option<usize> {
    let mut i = pos;
    let skip_spaces = |i: &mut usize| {
        while *i < chars.len() && chars[*i] == ' ' {
            *i += 1;
        }
    };

    skip_spaces(&mut i);
    match chars.get(i) {
        Some('-') | Some('–') => i += 1,
        Some('t') if chars.get(i + 1) == Some(&'o') => i += 2,
        _ => return None,
    }
    skip_spaces(&mut i);
    if matches!(chars.get(i), Some('$') | Some('€') | Some('£')) {
        i += 1;
    }
    chars.get(i).filter(|c| c.is_ascii_digit()).map(|_| i)
}

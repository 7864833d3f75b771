use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Field names the built-in criteria read from an enriched record.
pub const KNOWN_CRITERION_KEYS: [&str; 8] = [
    "employees",
    "revenue",
    "industryGrowth",
    "govInvestment",
    "businessActivity",
    "hiringTrends",
    "techAdoption",
    "tariffExposure",
];

const COMPANY_KEYS: [&str; 6] = [
    "company",
    "companyName",
    "company_name",
    "name",
    "Company",
    "Company Name",
];

const URL_KEYS: [&str; 4] = ["url", "website", "URL", "Website"];

/// A single value held by an account record.
///
/// A field that is absent from the record is the "missing" case; there is no
/// separate variant for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }

    /// True for empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            FieldValue::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// An uploaded account: an ordered, open mapping of field name to value.
///
/// Insertion order is kept so exports reproduce the uploaded column order.
/// Keys matching a criterion id are read by the scorer; everything else
/// passes through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountRecord {
    fields: Vec<(String, FieldValue)>,
}

impl AccountRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace a field. Replacing keeps the original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overlay another record's fields onto this one
    pub fn merge(&mut self, other: AccountRecord) {
        for (k, v) in other.fields {
            self.insert(k, v);
        }
    }

    /// Company name, looked up under the usual column spellings
    pub fn company_name(&self) -> Option<&str> {
        self.first_text(&COMPANY_KEYS)
    }

    pub fn url(&self) -> Option<&str> {
        self.first_text(&URL_KEYS)
    }

    /// Name to show for this account, falling back to a placeholder
    pub fn display_name(&self) -> &str {
        self.company_name().unwrap_or("(unnamed account)")
    }

    fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .filter_map(FieldValue::as_text)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for AccountRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = AccountRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for AccountRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = AccountRecord;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of field names to string or number values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut record = AccountRecord::new();
        while let Some((key, value)) = access.next_entry::<String, Option<FieldValue>>()? {
            // null means "missing"
            if let Some(value) = value {
                record.insert(key, value);
            }
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for AccountRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RecordVisitor)
    }
}

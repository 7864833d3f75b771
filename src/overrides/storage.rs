use super::types::OverrideState;
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Get the default override file path (~/.config/account-tier/overrides.json)
pub fn get_overrides_path() -> PathBuf {
    crate::config::get_config_dir().join("overrides.json")
}

/// Load override state from a JSON file
///
/// If the file doesn't exist, returns a new empty state.
/// If the file exists but has an unsupported version, returns an error.
pub fn load_overrides(path: &Path) -> Result<OverrideState> {
    if !path.exists() {
        return Ok(OverrideState::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open overrides file at {}", path.display()))?;

    let state: OverrideState =
        serde_json::from_reader(file).context("Failed to load tier overrides")?;

    if state.version != 1 {
        anyhow::bail!("Unsupported overrides version: {}", state.version);
    }

    Ok(state)
}

/// Save override state to a JSON file atomically
///
/// Creates the parent directory if it doesn't exist.
pub fn save_overrides(path: &Path, state: &OverrideState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize tier overrides")?;

    file.commit().context("Failed to save tier overrides")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::TIERS;
    use std::env;

    #[test]
    fn test_load_missing_file_returns_empty() {
        let temp_path = env::temp_dir().join("account_tier_test_overrides_missing.json");
        let _ = std::fs::remove_file(&temp_path);

        let state = load_overrides(&temp_path).unwrap();
        assert_eq!(state.version, 1);
        assert!(state.is_empty());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_path = env::temp_dir().join("account_tier_test_overrides_roundtrip.json");
        let _ = std::fs::remove_file(&temp_path);

        let mut state = OverrideState::new();
        state.set("Acme", TIERS[0], Some("Signed LOI".to_string()));
        state.set("Globex", TIERS[3], None);

        save_overrides(&temp_path, &state).unwrap();
        let loaded = load_overrides(&temp_path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("acme"), state.get("acme"));
        assert_eq!(loaded.get("globex").unwrap().tier_id, 4);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_unsupported_version() {
        let temp_path = env::temp_dir().join("account_tier_test_overrides_version.json");
        std::fs::write(&temp_path, r#"{"version": 2, "overrides": {}}"#).unwrap();

        let err = load_overrides(&temp_path).unwrap_err();
        assert!(err.to_string().contains("Unsupported overrides version"));

        let _ = std::fs::remove_file(&temp_path);
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use lineage_crypto::VerifyMode;
use lineage_store::{FileStoreConfig, SyncMode};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "lineage.toml";

/// How re-verification treats self-reported digests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerifyModeSetting {
    #[default]
    Strict,
    SignatureOnly,
}

impl From<VerifyModeSetting> for VerifyMode {
    fn from(setting: VerifyModeSetting) -> Self {
        match setting {
            VerifyModeSetting::Strict => VerifyMode::Strict,
            VerifyModeSetting::SignatureOnly => VerifyMode::SignatureOnly,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LineageConfig {
    /// Backing location of the event store.
    pub store_path: PathBuf,
    pub sync_mode: SyncMode,
    pub verify_mode: VerifyModeSetting,
    /// Demo: rounds in which both sources emit valid events.
    pub bootstrap_rounds: usize,
    /// Demo: rounds in which the attacker forges every other event.
    pub misbehavior_rounds: usize,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("lineage.wal"),
            sync_mode: SyncMode::default(),
            verify_mode: VerifyModeSetting::default(),
            bootstrap_rounds: 3,
            misbehavior_rounds: 6,
        }
    }
}

impl LineageConfig {
    /// Load from `explicit`, which must exist, or from
    /// [`DEFAULT_CONFIG_FILE`] if present, or fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn store_config(&self) -> FileStoreConfig {
        FileStoreConfig {
            sync_mode: self.sync_mode,
        }
    }
}

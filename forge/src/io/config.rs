//! Forge configuration, a TOML file passed with `--config`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::assembler::ForgeOptions;
use crate::core::capability::Capabilities;
use crate::core::synth::{DetectMode, SynthOptions};
use crate::oracle::Blacklist;

/// Forge configuration (TOML). Every table and field is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ForgeConfig {
    pub synthesis: SynthesisConfig,
    /// Facts about the target gathered by reconnaissance.
    pub capabilities: Capabilities,
    pub oracle: OracleConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SynthesisConfig {
    pub detect_mode: DetectMode,
    /// Deepest goal nesting explored before a branch is abandoned.
    pub max_depth: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let defaults = SynthOptions::default();
        Self {
            detect_mode: defaults.detect_mode,
            max_depth: defaults.max_depth,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OracleConfig {
    /// Substrings the target filter is known to reject.
    pub blacklist: Vec<String>,
}

impl ForgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.synthesis.max_depth == 0 {
            return Err(anyhow!("synthesis.max_depth must be > 0"));
        }
        if self.capabilities.runtime_minor.is_some() && self.capabilities.runtime_major.is_none() {
            return Err(anyhow!(
                "capabilities.runtime_minor requires capabilities.runtime_major"
            ));
        }
        if self.oracle.blacklist.iter().any(|word| word.is_empty()) {
            return Err(anyhow!("oracle.blacklist entries must be non-empty"));
        }
        Ok(())
    }

    pub fn options(&self) -> ForgeOptions {
        ForgeOptions {
            synthesis: SynthOptions {
                capabilities: self.capabilities,
                detect_mode: self.synthesis.detect_mode,
                max_depth: self.synthesis.max_depth,
            },
            share_priorities: false,
        }
    }

    pub fn blacklist(&self) -> Blacklist {
        Blacklist::new(self.oracle.blacklist.iter().cloned())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ForgeConfig::default()`.
pub fn load_config(path: &Path) -> Result<ForgeConfig> {
    if !path.exists() {
        let cfg = ForgeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ForgeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Oracle;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, ForgeConfig::default());
        assert_eq!(cfg.synthesis.max_depth, 256);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("forge.toml");
        fs::write(
            &path,
            "[synthesis]\ndetect_mode = \"fast\"\n\n[oracle]\nblacklist = [\"__\", \".\"]\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.synthesis.detect_mode, DetectMode::Fast);
        assert_eq!(cfg.synthesis.max_depth, 256);
        assert!(!cfg.capabilities.framework);
        assert!(!cfg.blacklist().accepts("a.b"));
    }

    #[test]
    fn minor_without_major_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("forge.toml");
        fs::write(&path, "[capabilities]\nruntime_minor = 8\n").expect("write");
        let err = load_config(&path).expect_err("invalid");
        assert!(format!("{err:#}").contains("runtime_minor"));
    }

    #[test]
    fn capabilities_flow_into_options() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("forge.toml");
        fs::write(
            &path,
            "[capabilities]\nruntime_major = 3\nframework = true\n\n[oracle]\nblacklist = [\"{{\"]\n",
        )
        .expect("write");
        let cfg = load_config(&path).expect("load");
        let options = cfg.options();
        assert_eq!(options.synthesis.capabilities.runtime_major, Some(3));
        assert!(options.synthesis.capabilities.framework);
        assert!(!cfg.blacklist().accepts("{{7}}"));
    }
}

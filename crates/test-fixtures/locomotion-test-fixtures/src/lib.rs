use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

/// Fixture name to path (relative to `fixtures/`), per kind.
#[derive(Debug, Deserialize)]
struct Manifest {
    scenarios: HashMap<String, String>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

#[derive(Copy, Clone, Debug)]
enum Kind {
    Scenario,
    Config,
}

impl Kind {
    fn entries(self) -> &'static HashMap<String, String> {
        match self {
            Kind::Scenario => &MANIFEST.scenarios,
            Kind::Config => &MANIFEST.configs,
        }
    }

    fn keys(self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn path(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("unknown {self:?} fixture '{name}'"))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn json(self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read fixture at {}", path.display()))
    }
}

/// Recorded motor traces with the parameter values they must leave behind.
pub mod scenarios {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Scenario.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Scenario.json(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let text = json(name)?;
        serde_json::from_str(&text).with_context(|| format!("scenario '{name}' does not parse"))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Scenario.path(name)
    }
}

/// Controller configurations as JSON documents.
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        Kind::Config.keys()
    }

    pub fn json(name: &str) -> Result<String> {
        Kind::Config.json(name)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Kind::Config.path(name)
    }
}

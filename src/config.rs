// Tue Jan 20 2026 - Alex

use crate::layout::{AbiProfile, PointerWidth};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bits: u32,
    pub base_offset: u64,
    pub unicode: bool,
    pub symbol_database: Option<PathBuf>,
    pub interactive: bool,
    pub width_overrides: BTreeMap<String, u64>,
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bits: 64,
            base_offset: 0,
            unicode: true,
            symbol_database: None,
            interactive: false,
            width_overrides: BTreeMap::new(),
            quiet: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate().map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn with_bits(mut self, bits: u32) -> Self {
        self.bits = bits;
        self
    }

    pub fn with_base_offset(mut self, base_offset: u64) -> Self {
        self.base_offset = base_offset;
        self
    }

    pub fn with_unicode(mut self, unicode: bool) -> Self {
        self.unicode = unicode;
        self
    }

    pub fn with_symbol_database(mut self, path: PathBuf) -> Self {
        self.symbol_database = Some(path);
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn with_width_override(mut self, name: &str, width: u64) -> Self {
        self.width_overrides.insert(name.to_string(), width);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if PointerWidth::from_bits(self.bits).is_none() {
            return Err(format!("bits must be 32 or 64, got {}", self.bits));
        }
        if let Some(path) = &self.symbol_database {
            if !path.exists() {
                return Err(format!("Symbol database does not exist: {:?}", path));
            }
        }
        if let Some(name) = self.width_overrides.keys().find(|name| name.trim().is_empty()) {
            return Err(format!("Width override with an empty type name: {:?}", name));
        }
        Ok(())
    }

    pub fn pointer_width(&self) -> PointerWidth {
        PointerWidth::from_bits(self.bits).unwrap_or(PointerWidth::Bits64)
    }

    /// Width table for this configuration, overrides applied last.
    pub fn abi_profile(&self) -> AbiProfile {
        AbiProfile::new(self.pointer_width())
            .with_unicode(self.unicode)
            .with_widths(&self.width_overrides)
    }
}

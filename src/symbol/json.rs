// Tue Jan 20 2026 - Alex

use crate::symbol::{SymbolError, SymbolIndex, TypeLayout};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

impl SymbolIndex {
    /// Reads a JSON array of [`TypeLayout`] records.
    pub fn load_json(path: &Path) -> Result<Self, SymbolError> {
        let file = File::open(path)?;
        let layouts: Vec<TypeLayout> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::from_layouts(layouts))
    }

    pub fn from_json_str(json: &str) -> Result<Self, SymbolError> {
        let layouts: Vec<TypeLayout> = serde_json::from_str(json)?;
        Ok(Self::from_layouts(layouts))
    }

    pub fn to_json_string(&self) -> Result<String, SymbolError> {
        let layouts: Vec<&TypeLayout> = self.iter().collect();
        Ok(serde_json::to_string_pretty(&layouts)?)
    }

    pub fn save_json(&self, path: &Path) -> Result<(), SymbolError> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.to_json_string()?.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

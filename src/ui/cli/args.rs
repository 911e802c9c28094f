// Wed Jan 15 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "struct-offsets")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Annotates C struct and union declarations with member offsets", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Raise verbosity, overriding --log-level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON file with defaults for the resolve and types commands
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annotate a declaration with the end offset of every member
    Resolve(ResolveArgs),
    /// Build a JSON symbol index from a PDB file
    Index(IndexArgs),
    /// List the type width table of a profile
    Types(TypesArgs),
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// File holding the declaration; stdin when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(short, long)]
    pub bits: Option<u32>,

    /// Offset of the first member, decimal or 0x-hex
    #[arg(long)]
    pub base: Option<String>,

    /// TCHAR and TBYTE are one byte wide
    #[arg(long)]
    pub ansi: bool,

    /// `.pdb` file or JSON index consulted for unknown type names
    #[arg(short, long)]
    pub symbols: Option<PathBuf>,

    /// Take the layout of this type from the symbol database when it has one
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(long)]
    pub interactive: bool,

    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct IndexArgs {
    #[arg(short, long)]
    pub pdb: PathBuf,

    #[arg(short, long, default_value = "symbols.json")]
    pub output: PathBuf,
}

#[derive(Parser, Debug)]
pub struct TypesArgs {
    #[arg(short, long)]
    pub bits: Option<u32>,

    #[arg(long)]
    pub ansi: bool,

    /// Only names containing this text, case-insensitive
    #[arg(short, long)]
    pub filter: Option<String>,
}

impl ResolveArgs {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(input) = &self.input {
            if !input.exists() {
                return Err(format!("Input file does not exist: {:?}", input));
            }
        }
        if let Some(bits) = self.bits {
            if bits != 32 && bits != 64 {
                return Err(format!("--bits must be 32 or 64, got {}", bits));
            }
        }
        if let Some(base) = &self.base {
            crate::utils::parse_offset(base)?;
        }
        Ok(())
    }
}

impl IndexArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.pdb.exists() {
            return Err(format!("PDB file does not exist: {:?}", self.pdb));
        }
        Ok(())
    }
}

impl TypesArgs {
    pub fn validate(&self) -> Result<(), String> {
        match self.bits {
            Some(bits) if bits != 32 && bits != 64 => Err(format!("--bits must be 32 or 64, got {}", bits)),
            _ => Ok(()),
        }
    }
}

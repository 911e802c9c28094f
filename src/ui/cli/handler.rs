// Wed Jan 15 2026 - Alex

use super::args::{Args, Command, IndexArgs, ResolveArgs, TypesArgs};
use crate::config::Config;
use crate::layout::{
    annotate, annotate_block, normalize_bytes, LayoutEngine, NoFallback, TypeFallback, TypeWidthResolver,
};
use crate::symbol::{open_database, pdb_index::index_pdb, CachedDatabase, Lookup, NoSymbols, SymbolDatabase, SymbolIndex};
use crate::ui::format::format_declaration;
use crate::ui::prompt::InteractivePrompt;
use crate::ui::UIManager;
use crate::utils::logging::{scoped_timer, LoggingUtils};
use crate::utils::{parse_offset, pluralize};
use anyhow::Context;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

pub struct CommandHandler {
    ui: UIManager,
}

impl CommandHandler {
    pub fn new() -> Self {
        Self { ui: UIManager::new() }
    }

    pub fn execute(mut self, args: Args) -> anyhow::Result<()> {
        self.setup_logging(&args);

        let config = match &args.config {
            Some(path) => Config::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
            None => Config::default(),
        };
        self.ui = UIManager::new().with_quiet(args.quiet || config.quiet);

        match args.command {
            Command::Resolve(resolve_args) => self.handle_resolve(resolve_args, config),
            Command::Index(index_args) => self.handle_index(index_args),
            Command::Types(types_args) => self.handle_types(types_args, config),
        }
    }

    fn setup_logging(&self, args: &Args) {
        let level = if args.verbose > 0 {
            LoggingUtils::level_from_verbosity(args.verbose as usize)
        } else {
            LoggingUtils::level_from_str(&args.log_level)
        };
        LoggingUtils::init_logger(level);
    }

    fn handle_resolve(&self, args: ResolveArgs, config: Config) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let config = Self::apply_resolve_flags(&args, config)?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        let _timer = scoped_timer("resolve");

        let abi = config.abi_profile();
        self.ui.info(&format!("Using {} profile with {} known types", abi.pointer(), abi.len()));

        let database = match &config.symbol_database {
            Some(path) => Some(self.load_database(path)?),
            None => None,
        };
        let symbols: &dyn SymbolDatabase = match &database {
            Some(db) => db,
            None => &NoSymbols,
        };

        let fallback: Box<dyn TypeFallback> = if config.interactive {
            if args.input.is_none() {
                self.ui.warning("Interactive answers are read from stdin after the declaration");
            }
            Box::new(InteractivePrompt::stdin())
        } else {
            Box::new(NoFallback)
        };

        if let Some(name) = &args.name {
            if self.resolve_by_name(name, symbols, fallback.as_ref(), &args)? {
                return Ok(());
            }
        }

        let bytes = Self::read_input(args.input.as_deref())?;
        let text = normalize_bytes(&bytes)?;

        let engine = LayoutEngine::new(
            TypeWidthResolver::new(&abi)
                .with_symbols(symbols)
                .with_fallback(fallback.as_ref()),
        );
        let declaration = engine.resolve_declaration(&text, config.base_offset)?;

        let unresolved = declaration.unresolved_fields();
        for field in &unresolved {
            self.ui.warning(&format!("{} {}: {}", field.declared_type, field.declared_name, field.status));
        }

        let rendered = if args.json {
            serde_json::to_string_pretty(&declaration)?
        } else {
            format_declaration(&annotate(&declaration))
        };
        self.write_output(args.output.as_deref(), &rendered)?;

        if unresolved.is_empty() {
            self.ui.success(&format!("Resolved {} bytes", declaration.size()));
        } else {
            self.ui.warning(&format!(
                "Resolved {} bytes with {} left unsized",
                declaration.size(),
                pluralize(unresolved.len(), "field", "fields")
            ));
        }
        Ok(())
    }

    fn apply_resolve_flags(args: &ResolveArgs, mut config: Config) -> anyhow::Result<Config> {
        if let Some(bits) = args.bits {
            config.bits = bits;
        }
        if let Some(base) = &args.base {
            config.base_offset = parse_offset(base).map_err(|e| anyhow::anyhow!(e))?;
        }
        if args.ansi {
            config.unicode = false;
        }
        if let Some(symbols) = &args.symbols {
            config.symbol_database = Some(symbols.clone());
        }
        if args.interactive {
            config.interactive = true;
        }
        Ok(config)
    }

    fn load_database(&self, path: &Path) -> anyhow::Result<CachedDatabase<SymbolIndex>> {
        self.ui.info(&format!("Loading symbols from {}", path.display()));
        let index = open_database(path).with_context(|| format!("Failed to open symbol database {:?}", path))?;
        self.ui.success(&format!("Loaded {}", pluralize(index.len(), "type", "types")));
        Ok(CachedDatabase::new(index))
    }

    /// Writes the database layout of `name` when there is one; `false` means fall back to text.
    fn resolve_by_name(
        &self,
        name: &str,
        symbols: &dyn SymbolDatabase,
        fallback: &dyn TypeFallback,
        args: &ResolveArgs,
    ) -> anyhow::Result<bool> {
        self.ui.info(&format!("Looking up {} in the symbol database", name));

        let layout = match symbols.lookup_layout(name) {
            Lookup::Found(layout) => Some(layout),
            Lookup::Ambiguous(candidates) => fallback
                .choose_candidate(name, &candidates)
                .and_then(|choice| symbols.lookup_layout(&choice).found()),
            Lookup::NotFound => None,
        };

        let Some(layout) = layout else {
            self.ui.warning(&format!("No layout for {}, resolving the declaration text", name));
            return Ok(false);
        };

        let block = layout.to_aggregate();
        let rendered = if args.json {
            serde_json::to_string_pretty(&block)?
        } else {
            format_declaration(&annotate_block(&block))
        };
        self.write_output(args.output.as_deref(), &rendered)?;
        self.ui.success(&format!("{} is {} bytes", layout.name, layout.size));
        Ok(true)
    }

    fn handle_index(&self, args: IndexArgs) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        let _timer = scoped_timer("index");

        self.ui.info(&format!("Indexing {}", args.pdb.display()));
        let index = index_pdb(&args.pdb)?;
        index.save_json(&args.output)?;

        self.ui.success(&format!(
            "Wrote {} to {}",
            pluralize(index.len(), "type", "types"),
            args.output.display()
        ));
        Ok(())
    }

    fn handle_types(&self, args: TypesArgs, mut config: Config) -> anyhow::Result<()> {
        args.validate().map_err(|e| anyhow::anyhow!(e))?;
        if let Some(bits) = args.bits {
            config.bits = bits;
        }
        if args.ansi {
            config.unicode = false;
        }
        config.validate().map_err(|e| anyhow::anyhow!(e))?;

        let abi = config.abi_profile();
        let filter = args.filter.as_deref().map(str::to_ascii_uppercase);

        let mut out = String::new();
        let mut shown = 0usize;
        for (name, width) in abi.iter() {
            if filter.as_deref().map_or(true, |f| name.contains(f)) {
                out.push_str(&format!("{:<40} {}\n", name, width));
                shown += 1;
            }
        }
        self.write_output(None, &out)?;
        self.ui.info(&format!("{} in the {} profile", pluralize(shown, "type", "types"), abi.pointer()));
        Ok(())
    }

    fn read_input(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
        match path {
            Some(path) => fs::read(path).with_context(|| format!("Failed to read {:?}", path)),
            None => {
                let mut bytes = Vec::new();
                io::stdin().read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }

    fn write_output(&self, path: Option<&Path>, text: &str) -> anyhow::Result<()> {
        match path {
            Some(path) => {
                fs::write(path, text).with_context(|| format!("Failed to write {:?}", path))?;
                self.ui.success(&format!("Output written to {}", path.display()));
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                if !text.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

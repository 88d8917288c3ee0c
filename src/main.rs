//! hpo-lookup CLI: map clinical terms to Human Phenotype Ontology ids.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use hpo_lookup::config::{ConfigError, LookupConfig};
use hpo_lookup::lookup::HpoLookup;
use hpo_lookup::paths::HpoPaths;
use hpo_lookup::tool::ToolRegistry;

#[derive(Parser)]
#[command(name = "hpo-lookup", version, about = "Exact HPO term lookup")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/hpo-lookup/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ontology JSON document to search (overrides the config file).
    #[arg(long, global = true)]
    ontology: Option<PathBuf>,

    /// Keep parsed ontologies in memory between lookups.
    #[arg(long, global = true)]
    cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single clinical term.
    Lookup {
        /// The term, e.g. "Iron deficiency anaemia".
        query: String,
    },

    /// Look up every comma/semicolon separated term in a string.
    Resolve {
        /// Delimited terms, e.g. "short stature; developmental delay".
        text: String,

        /// Where to save the mapping (default: next to the ontology).
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print the mapping without saving it.
        #[arg(long)]
        no_save: bool,

        /// Match terms in parallel.
        #[arg(long)]
        parallel: bool,
    },

    /// Describe the registered agent tools.
    Tools,

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write the default configuration to the config file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    // stdout carries results; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let initializing = matches!(
        cli.command,
        Commands::Config {
            action: ConfigAction::Init { .. }
        }
    );
    // `config init` replaces the file, so an unreadable one must not stop it.
    let (config_file, mut config, paths) = match &cli.config {
        Some(path) if initializing => (path.clone(), LookupConfig::default(), None),
        Some(path) => (path.clone(), LookupConfig::load(path)?, None),
        None => {
            let paths = HpoPaths::resolve()?;
            let config = if initializing {
                LookupConfig::default()
            } else {
                LookupConfig::discover(&paths)?
            };
            (paths.config_file(), config, Some(paths))
        }
    };
    if let Some(ontology) = cli.ontology {
        config.ontology_path = ontology;
    }
    config.cache |= cli.cache;

    match cli.command {
        Commands::Lookup { query } => {
            let lookup = HpoLookup::new(config)?;
            let outcome = lookup.lookup(&query)?;
            println!("{outcome}");
        }

        Commands::Resolve {
            text,
            output,
            no_save,
            parallel,
        } => {
            if output.is_some() {
                config.output_path = output;
            }
            config.persist &= !no_save;
            config.parallel |= parallel;

            let lookup = HpoLookup::new(config)?;
            let mapping = lookup.resolve(&text)?;
            println!("{}", mapping.to_json_pretty()?);
            if lookup.config().persist {
                eprintln!(
                    "Results saved to {}",
                    lookup.config().resolved_output_path().display()
                );
            }
        }

        Commands::Tools => {
            let registry = ToolRegistry::with_builtin();
            for sig in registry.list() {
                println!("{}", sig.render_prompt());
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let text = toml::to_string_pretty(&config).into_diagnostic()?;
                println!("# {}", config_file.display());
                print!("{text}");
            }
            ConfigAction::Init { force } => {
                if config_file.exists() && !force {
                    return Err(ConfigError::AlreadyExists {
                        path: config_file.display().to_string(),
                    }
                    .into());
                }
                let mut defaults = LookupConfig::default();
                if let Some(paths) = &paths {
                    paths.ensure_dirs()?;
                }
                if let Some(paths) = paths.or_else(|| HpoPaths::resolve().ok()) {
                    defaults.ontology_path = paths.default_ontology();
                }
                defaults.save(&config_file)?;
                println!("Wrote default config to {}", config_file.display());
            }
        },
    }

    Ok(())
}

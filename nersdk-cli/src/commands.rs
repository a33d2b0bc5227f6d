//! Subcomandos da CLI `nersdk`.
//!
//! Códigos de saída: `0` sucesso, `1` erro de rotulagem ou pacote com
//! problema, `2` entrada ausente ou ilegível, `3` falha ao gravar a saída.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use nersdk_core::diagnostics::{check_packs, PackCheck, PatternFileStatus};
use nersdk_core::hooks::HookStatus;
use nersdk_core::pattern::PATTERN_FILE;
use nersdk_core::records::{self, RecordFormat};
use nersdk_core::{HookRegistry, Labeler, LoaderConfig, PackLoader};

const EXIT_INPUT: u8 = 2;
const EXIT_OUTPUT: u8 = 3;

const DEFAULT_DOCTOR_PACK: &str = "nersdk.domains.finance";

#[derive(Parser)]
#[command(name = "nersdk")]
#[command(about = "Rule-based BIO labeling (core rules + optional domain packs) with JSON/JSONL IO")]
#[command(version)]
pub struct Cli {
    /// Extra roots searched for dotted pack names (platform path-list syntax)
    #[arg(long, global = true, env = "NERSDK_PACK_PATH")]
    pack_path: Option<OsString>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Verbose antes do parse completo (configuração do log).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Read a text file (one text per line), label it, and save JSON or JSONL
    Tag {
        /// Input .txt file
        #[arg(long = "in")]
        input: PathBuf,
        /// Output path (.json or .jsonl)
        #[arg(long = "out")]
        output: PathBuf,
        /// Force output format; otherwise inferred from --out
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Domain packs (dotted module names or folders)
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        domains: Vec<String>,
        /// Disable JSON indentation (ignored for JSONL)
        #[arg(long)]
        no_pretty: bool,
    },

    /// Load JSON/JSONL records and save them again (format conversion)
    Roundtrip {
        /// Input .json or .jsonl file
        #[arg(long = "in")]
        input: PathBuf,
        /// Output path (.json or .jsonl)
        #[arg(long = "out")]
        output: PathBuf,
        /// Force output format; otherwise inferred from --out
        #[arg(long, value_enum)]
        format: Option<Format>,
        /// Disable JSON indentation (ignored for JSONL)
        #[arg(long)]
        no_pretty: bool,
    },

    /// Check domain packs for missing or broken files
    Doctor {
        /// Packs to verify (defaults to the finance pack)
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        domains: Vec<String>,
    },

    /// Domain pack utilities
    Domains {
        #[command(subcommand)]
        command: DomainCommands,
    },
}

#[derive(Subcommand)]
enum DomainCommands {
    /// List built-in domain packs
    List,
    /// Show details for domain packs
    Info {
        /// Packs to inspect (dotted module names or folders)
        #[arg(long, num_args = 1.., value_delimiter = ',', required = true)]
        domains: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Jsonl,
}

impl From<Format> for RecordFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => RecordFormat::Json,
            Format::Jsonl => RecordFormat::Jsonl,
        }
    }
}

pub fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let roots = cli
        .pack_path
        .as_ref()
        .map(|value| std::env::split_paths(value).collect::<Vec<_>>())
        .unwrap_or_default();
    let config = LoaderConfig::default().with_roots(roots);
    debug!(roots = ?config.search_roots, verbose = cli.verbose, "pack search roots");
    let loader = PackLoader::new(config, HookRegistry::builtin());

    match cli.command {
        Commands::Tag {
            input,
            output,
            format,
            domains,
            no_pretty,
        } => cmd_tag(loader, &input, &output, format, &domains, !no_pretty),
        Commands::Roundtrip {
            input,
            output,
            format,
            no_pretty,
        } => cmd_roundtrip(&input, &output, format, !no_pretty),
        Commands::Doctor { domains } => cmd_doctor(&loader, domains),
        Commands::Domains { command } => match command {
            DomainCommands::List => cmd_domains_list(&loader),
            DomainCommands::Info { domains } => cmd_domains_info(&loader, &domains),
        },
    }
}

fn output_format(format: Option<Format>, output: &Path) -> RecordFormat {
    format
        .map(RecordFormat::from)
        .unwrap_or_else(|| RecordFormat::infer_from_path(output))
}

fn cmd_tag(
    loader: PackLoader,
    input: &Path,
    output: &Path,
    format: Option<Format>,
    domains: &[String],
    pretty: bool,
) -> anyhow::Result<ExitCode> {
    let raw = match fs::read_to_string(input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: cannot read input file {}: {e}", input.display());
            return Ok(ExitCode::from(EXIT_INPUT));
        }
    };
    let texts: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    info!(texts = texts.len(), domains = ?domains, "tagging");

    let labeler = Labeler::new(loader);
    let tagged = labeler
        .bulk_tag(&texts, domains)
        .context("failed to tag input texts")?;

    let format = output_format(format, output);
    if let Err(e) = records::save(&tagged, output, format, pretty) {
        eprintln!("error: failed to write output: {e}");
        return Ok(ExitCode::from(EXIT_OUTPUT));
    }

    println!("Tagged {} texts -> {}", tagged.len(), output.display());
    Ok(ExitCode::SUCCESS)
}

fn cmd_roundtrip(
    input: &Path,
    output: &Path,
    format: Option<Format>,
    pretty: bool,
) -> anyhow::Result<ExitCode> {
    let loaded = match records::load(input, RecordFormat::infer_from_path(input)) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: failed to load {}: {e}", input.display());
            return Ok(ExitCode::from(EXIT_INPUT));
        }
    };

    let format = output_format(format, output);
    if let Err(e) = records::save(&loaded, output, format, pretty) {
        eprintln!("error: failed to write output: {e}");
        return Ok(ExitCode::from(EXIT_OUTPUT));
    }

    println!(
        "Loaded {} records from {} -> {}",
        loaded.len(),
        input.display(),
        output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_doctor(loader: &PackLoader, mut domains: Vec<String>) -> anyhow::Result<ExitCode> {
    if domains.is_empty() {
        domains.push(DEFAULT_DOCTOR_PACK.to_string());
    }
    println!("nersdk doctor: domain pack diagnostics\n");

    let reports = check_packs(loader, &domains);
    for report in &reports {
        println!("Checking pack: {}", report.identifier);
        match &report.outcome {
            PackCheck::Failed { kind, message } => {
                println!("  [FAIL] failed to load ({kind}): {message}");
            }
            PackCheck::Loaded {
                patterns,
                hook,
                info,
            } => {
                match patterns {
                    PatternFileStatus::Found { count } => {
                        println!("  [ok]   {PATTERN_FILE} found ({count} entity patterns)")
                    }
                    PatternFileStatus::Missing => println!("  [warn] {PATTERN_FILE} missing"),
                }
                match hook {
                    HookStatus::Loaded { matcher } => {
                        println!("  [ok]   hook bound to '{matcher}'")
                    }
                    HookStatus::MissingCallable { reason } => {
                        println!("  [warn] hook file present but unusable: {reason}")
                    }
                    HookStatus::Absent => println!("  [info] no hook file (optional)"),
                }
                debug!(pack = %info.name, labels = ?info.labels, "pack checked");
            }
        }
        println!();
    }

    if reports.iter().all(|r| r.is_healthy()) {
        println!("All domain packs look healthy.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Some checks failed; review the output above.");
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_domains_list(loader: &PackLoader) -> anyhow::Result<ExitCode> {
    let builtin = loader.discover_builtin();
    if builtin.is_empty() {
        println!("No built-in domain packs found.");
        return Ok(ExitCode::SUCCESS);
    }
    println!("Built-in domain packs:");
    for name in builtin {
        match loader.load(&name) {
            Ok(pack) => println!(
                "  - {name}  (entities: {}, hook: {})",
                pack.patterns.len(),
                if pack.has_hook() { "yes" } else { "no" }
            ),
            Err(e) => println!("  - {name}  (failed to load: {e})"),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_domains_info(loader: &PackLoader, domains: &[String]) -> anyhow::Result<ExitCode> {
    let mut ok = true;
    for name in domains {
        println!("Info: {name}");
        match loader.load(name) {
            Ok(pack) => {
                let info = pack.info();
                println!("   - base: {}", info.base.display());
                if let Some(description) = &info.description {
                    println!("   - description: {description}");
                }
                println!("   - entities: {}", info.pattern_count);
                if !info.labels.is_empty() {
                    println!("   - labels: {}", info.labels.join(", "));
                }
                match &info.hook {
                    Some(hook) => println!("   - hook: {hook}"),
                    None => println!("   - hook: no"),
                }
                println!("   - priority: {}", info.priority);
            }
            Err(e) => {
                ok = false;
                println!("   - ERROR: {e}");
            }
        }
        println!();
    }
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

//! Alloy CLI - Consolidate a codebase into a single markdown document.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use alloy::builder::{Alloy, Consolidation};
use alloy::errors::{exit_code, AlloyError};
use alloy::filter::parse_extensions;
use alloy::patterns::DEFAULT_IGNORE_FILE;
use alloy::tokens::Encoding;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "alloy")]
#[command(about = "Consolidate a codebase into a single markdown document")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the selected files into one markdown document
    Consolidate {
        #[command(flatten)]
        select: SelectArgs,

        /// Write the document to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Token encoding for the token count
        #[arg(long, default_value = "cl100k")]
        encoding: EncodingArg,

        /// Output a JSON summary
        #[arg(long)]
        json: bool,
    },

    /// List every file with its include/exclude decision
    Files {
        #[command(flatten)]
        select: SelectArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct SelectArgs {
    /// Project root
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Only include these extensions (comma-separated or repeated); overrides ignore patterns
    #[arg(short, long)]
    extensions: Vec<String>,

    /// Extra ignore pattern (repeatable)
    #[arg(short = 'x', long)]
    exclude: Vec<String>,

    /// Ignore file name at the project root
    #[arg(long, default_value = DEFAULT_IGNORE_FILE)]
    ignore_file: String,

    /// Also skip files matched by .gitignore
    #[arg(long)]
    gitignore: bool,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Maximum directory depth
    #[arg(long)]
    max_depth: Option<usize>,
}

impl SelectArgs {
    fn builder(self) -> Alloy {
        let mut builder = Alloy::new(self.path)
            .extensions(parse_extensions(&self.extensions))
            .exclude(self.exclude)
            .ignore_file(self.ignore_file)
            .respect_gitignore(self.gitignore)
            .include_hidden(!self.no_hidden)
            .follow_symlinks(self.follow_symlinks);
        if let Some(depth) = self.max_depth {
            builder = builder.max_depth(depth);
        }
        builder
    }
}

#[derive(Clone, ValueEnum)]
enum EncodingArg {
    Cl100k,
    O200k,
}

impl From<EncodingArg> for Encoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Cl100k => Encoding::Cl100kBase,
            EncodingArg::O200k => Encoding::O200kBase,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_output = json_flag(&cli.command);

    let result = match cli.command {
        Commands::Consolidate {
            select,
            output,
            encoding,
            json,
        } => run_consolidate(select, output, encoding.into(), json),
        Commands::Files { select, json } => run_files(select, json),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "alloy", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if json_output {
            #[derive(Serialize)]
            struct ErrorOutput {
                error: String,
            }

            let payload = ErrorOutput {
                error: e.to_string(),
            };

            let json = serde_json::to_string(&payload)
                .unwrap_or_else(|_| "{\"error\":\"serialization failed\"}".to_string());
            eprintln!("{json}");
        } else {
            eprintln!("error: {}", e);
        }
        std::process::exit(exit_code(&e));
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn json_flag(cmd: &Commands) -> bool {
    match cmd {
        Commands::Consolidate { json, .. } => *json,
        Commands::Files { json, .. } => *json,
        Commands::Completions { .. } => false,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AlloyError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AlloyError::Io(std::io::Error::other(e.to_string())))
}

// --- Consolidate command ---

#[derive(Serialize)]
struct SkippedOutput {
    path: String,
    error: String,
}

#[derive(Serialize)]
struct ConsolidateOutput {
    file_count: usize,
    token_count: usize,
    skipped: Vec<SkippedOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    document: Option<String>,
}

fn run_consolidate(
    select: SelectArgs,
    output: Option<PathBuf>,
    encoding: Encoding,
    json: bool,
) -> Result<(), AlloyError> {
    let Consolidation {
        document,
        file_count,
        token_count,
        skipped,
        walk_errors,
    } = select.builder().encoding(encoding).consolidate()?;

    if let Some(path) = &output {
        fs::write(path, &document).map_err(|e| AlloyError::Output(path.clone(), e))?;
    }

    let skipped: Vec<SkippedOutput> = skipped
        .iter()
        .map(|s| SkippedOutput {
            path: s.path.display().to_string(),
            error: s.error.to_string(),
        })
        .chain(walk_errors.iter().map(|e| SkippedOutput {
            path: e.path().display().to_string(),
            error: e.to_string(),
        }))
        .collect();

    if json {
        let payload = ConsolidateOutput {
            file_count,
            token_count,
            skipped,
            output: output.as_ref().map(|p| p.display().to_string()),
            document: output.is_none().then_some(document),
        };
        println!("{}", to_json(&payload)?);
        return Ok(());
    }

    if output.is_none() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(document.as_bytes())?;
        out.flush()?;
    }

    for s in &skipped {
        eprintln!("skipped {}: {}", s.path, s.error);
    }
    eprintln!("{} files, {} tokens", file_count, token_count);

    Ok(())
}

// --- Files command ---

#[derive(Serialize)]
struct FileDecision {
    path: String,
    included: bool,
    reason: String,
}

fn run_files(select: SelectArgs, json: bool) -> Result<(), AlloyError> {
    let decisions: Vec<FileDecision> = select
        .builder()
        .select()?
        .iter()
        .map(|s| FileDecision {
            path: s.display(),
            included: s.result.is_accepted(),
            reason: s.result.to_string(),
        })
        .collect();

    if json {
        #[derive(Serialize)]
        struct Output {
            files: Vec<FileDecision>,
        }
        println!("{}", to_json(&Output { files: decisions })?);
    } else {
        use std::io::BufWriter;
        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for d in &decisions {
            writeln!(out, "{}  {}", d.path, d.reason).ok();
        }
        let included = decisions.iter().filter(|d| d.included).count();
        writeln!(out, "{} of {} files included", included, decisions.len()).ok();
    }

    Ok(())
}

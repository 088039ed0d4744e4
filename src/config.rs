/*!
 * Configuration handling for ctxpack
 */

use std::path::PathBuf;

use clap::Parser;
use clap_complete::Shell;

use crate::error::Result;
use crate::tokenizer::Model;

/// Default directory generated documents are written to
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Command-line arguments for ctxpack
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "ctxpack",
    version = env!("CARGO_PKG_VERSION"),
    about = "Pack a project directory into a single text context document for LLMs",
    long_about = "Scans a project directory with fixed build/VCS/binary exclusion rules, lets you narrow the selection, and writes every selected file into one timestamped context document."
)]
pub struct Args {
    /// Project directory to scan
    #[clap(default_value = ".")]
    pub directory_path: String,

    /// Base name for the generated file (defaults to the project directory name)
    #[clap(long)]
    pub name: Option<String>,

    /// Directory generated documents are written to
    #[clap(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// Comma-separated list of additional name patterns to ignore
    #[clap(long, value_delimiter = ',')]
    pub ignore_patterns: Vec<String>,

    /// Comma-separated project-relative paths to deselect (directories cascade)
    #[clap(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Comma-separated project-relative paths to select exclusively
    #[clap(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Treat non-UTF-8 files as undecodable instead of reading them as Latin-1
    #[clap(long)]
    pub no_latin1_fallback: bool,

    /// Print the scanned entries instead of generating a document
    #[clap(long)]
    pub list: bool,

    /// Print the listing as JSON (with --list)
    #[clap(long, requires = "list")]
    pub json: bool,

    /// LLM model to use for exact token counting
    #[clap(long, value_enum)]
    pub model: Option<Model>,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Project root to scan
    pub target_dir: PathBuf,

    /// Directory generated documents are written to
    pub output_dir: PathBuf,

    /// Custom output base name
    pub base_name: Option<String>,

    /// Extra name patterns to ignore
    pub ignore_patterns: Vec<String>,

    /// Paths deselected after scanning
    pub exclude_paths: Vec<String>,

    /// Paths selected exclusively after scanning
    pub only_paths: Vec<String>,

    /// Decode non-UTF-8 files as Latin-1
    pub latin1_fallback: bool,

    /// Print the listing instead of generating
    pub list: bool,

    /// Listing as JSON
    pub json: bool,

    /// LLM model to use for tokenization
    pub model: Option<Model>,

    /// Debug logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_dir: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            base_name: None,
            ignore_patterns: Vec::new(),
            exclude_paths: Vec::new(),
            only_paths: Vec::new(),
            latin1_fallback: true,
            list: false,
            json: false,
            model: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        Self {
            target_dir: PathBuf::from(args.directory_path),
            output_dir: PathBuf::from(args.output_dir),
            base_name: args.name,
            ignore_patterns: args.ignore_patterns,
            exclude_paths: args.exclude,
            only_paths: args.only,
            latin1_fallback: !args.no_latin1_fallback,
            list: args.list,
            json: args.json,
            model: args.model,
            verbose: args.verbose,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        crate::ensure!(
            self.target_dir.is_dir(),
            Config,
            "Target directory not found: {}",
            self.target_dir.display()
        );

        crate::ensure!(
            !self.output_dir.is_file(),
            Config,
            "Output directory path is a file: {}",
            self.output_dir.display()
        );

        Ok(())
    }
}

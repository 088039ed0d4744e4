/*!
 * ctxpack - Pack a project directory into a single text context document
 *
 * Three stages used in sequence: the scanner lists and filters a project
 * tree, the selection model tracks which entries are included, and the
 * writer serializes the included files into one document.
 */

pub mod config;
pub mod error;
pub mod report;
pub mod scanner;
pub mod selection;
pub mod tokenizer;
pub mod types;
pub mod utils;
pub mod writer;


use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;

// Re-export main components for easier access
pub use config::Config;
pub use error::{CtxError, Result};
pub use report::{GenerationReport, ReportFormat, Reporter};
pub use scanner::Scanner;
pub use selection::{SelectionChange, SelectionCommand, SelectionModel};
pub use types::{Entry, EntryKind, ScanResult, ScanStatus};
pub use writer::{ContextWriter, FileBlock, Generation};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Scan `root` with the default rules
pub fn scan(root: impl AsRef<Path>) -> Result<ScanResult> {
    let config = Config {
        target_dir: root.as_ref().to_path_buf(),
        ..Config::default()
    };
    Scanner::new(config, Arc::new(ProgressBar::hidden())).scan()
}

/// Set one entry's flag, cascading into directories
pub fn toggle(entries: &mut [Entry], path: &str, value: bool) -> Result<usize> {
    selection::toggle(entries, path, value)
}

/// Set every selectable entry's flag
pub fn set_all(entries: &mut [Entry], value: bool) -> usize {
    selection::set_all(entries, value)
}

/// Generate a document into the default output directory
pub fn generate(
    root: impl AsRef<Path>,
    entries: &[Entry],
    base_name: Option<&str>,
) -> Result<Generation> {
    ContextWriter::new(Config::default(), Arc::new(ProgressBar::hidden())).generate(
        root.as_ref(),
        entries,
        base_name,
    )
}

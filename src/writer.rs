/*!
 * Context document writer for ctxpack
 *
 * Turns the included files of a scan into one plain-text document framed
 * by fixed banners and per-file delimiters, then saves it under a
 * timestamped name in the output directory.
 */

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use indicatif::ProgressBar;
use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CtxError, Result};
use crate::types::Entry;
use crate::utils::language_hint;

/// Files above this size are noted, never read
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Base name used when sanitizing leaves nothing
pub const DEFAULT_BASE_NAME: &str = "project_context";

/// Extension of generated documents
pub const OUTPUT_EXTENSION: &str = "txt";

static DISALLOWED_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w -]").expect("valid file name pattern"));
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").expect("valid space pattern"));

/// What a single selected file turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBlock {
    /// Decoded as UTF-8
    Text { content: String, hint: String },
    /// Decoded with the Latin-1 fallback
    Latin1 { content: String, hint: String },
    /// Missing or not a regular file
    NotFound,
    /// Zero bytes
    Empty,
    /// Larger than [`MAX_FILE_SIZE`]
    TooLarge { size: u64 },
    /// Decoded text contained NUL
    Binary { after_fallback: bool },
    /// Not UTF-8 and the fallback is disabled
    DecodeFailure,
    /// I/O failure while reading
    ReadError { kind: String, message: String },
}

impl FileBlock {
    /// Classify the file at `abs_path`, stopping at the first matching rule
    pub fn classify(abs_path: &Path, rel_path: &str, latin1_fallback: bool) -> Self {
        let metadata = match fs::metadata(abs_path) {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => return Self::NotFound,
        };

        match metadata.len() {
            0 => return Self::Empty,
            size if size > MAX_FILE_SIZE => return Self::TooLarge { size },
            _ => {}
        }

        // fs::read closes the handle before returning
        match fs::read(abs_path) {
            Ok(bytes) => Self::decode(bytes, language_hint(rel_path), latin1_fallback),
            Err(e) => Self::ReadError {
                kind: format!("{:?}", e.kind()),
                message: e.to_string(),
            },
        }
    }

    fn decode(bytes: Vec<u8>, hint: String, latin1_fallback: bool) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) if text.contains('\0') => Self::Binary {
                after_fallback: false,
            },
            Ok(text) => Self::Text {
                content: normalize_newlines(&text).trim().to_string(),
                hint,
            },
            Err(err) if latin1_fallback => {
                let bytes = err.into_bytes();
                if bytes.contains(&0) {
                    return Self::Binary {
                        after_fallback: true,
                    };
                }
                let text: String = bytes.into_iter().map(char::from).collect();
                Self::Latin1 {
                    content: normalize_newlines(&text).trim().to_string(),
                    hint,
                }
            }
            Err(_) => Self::DecodeFailure,
        }
    }

    /// Short name used for tallies
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Latin1 { .. } => "latin-1",
            Self::NotFound => "not found",
            Self::Empty => "empty",
            Self::TooLarge { .. } => "too large",
            Self::Binary { .. } => "binary",
            Self::DecodeFailure => "decode failure",
            Self::ReadError { .. } => "read error",
        }
    }

    pub fn is_note(&self) -> bool {
        !matches!(self, Self::Text { .. } | Self::Latin1 { .. })
    }

    /// Render the block with its header and footer lines
    pub fn render(&self, rel_path: &str) -> String {
        let body = match self {
            Self::Text { content, hint } => fenced(content, hint),
            Self::Latin1 { content, hint } => fenced(content, &format!("{} latin-1", hint)),
            Self::NotFound => "Error: Path not found or is not a file.".to_string(),
            Self::Empty => "(File is empty)".to_string(),
            Self::TooLarge { .. } => format!(
                "Note: Skipped file larger than {}KB.",
                MAX_FILE_SIZE / 1024
            ),
            Self::Binary {
                after_fallback: false,
            } => "Note: Skipped potential binary file (contained NUL bytes).".to_string(),
            Self::Binary {
                after_fallback: true,
            } => "Note: Skipped potential binary file (NUL bytes after latin-1).".to_string(),
            Self::DecodeFailure => {
                "Error: Could not decode file (binary or unknown encoding).".to_string()
            }
            Self::ReadError { kind, message } => {
                format!("Error reading file content: {}: {}", kind, message)
            }
        };

        format!(
            "--- File: {} ---\n{}\n--- END OF FILE: {} ---\n",
            rel_path, body, rel_path
        )
    }
}

/// `\r\n` and lone `\r` become `\n`
fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn fenced(content: &str, tag: &str) -> String {
    format!("```{}\n{}\n```", tag, content)
}

/// Outcome of a successful generation
#[derive(Debug, Clone)]
pub struct Generation {
    /// Where the document was saved
    pub output_path: PathBuf,
    /// Summary line
    pub message: String,
    /// Whitespace-delimited tokens in the document
    pub word_count: usize,
    /// Character length divided by four
    pub token_count_approx: usize,
    /// Number of file blocks
    pub files_included: usize,
    /// Blocks rendered as notes instead of file content
    pub notes: usize,
    /// Block count per [`FileBlock::label`]
    pub tally: BTreeMap<&'static str, usize>,
    /// The full document
    pub document: String,
}

/// Writer for context documents
pub struct ContextWriter {
    /// Writer configuration
    config: Config,
    /// Progress bar
    progress: Arc<ProgressBar>,
}

impl ContextWriter {
    /// Create a new context writer
    pub fn new(config: Config, progress: Arc<ProgressBar>) -> Self {
        Self { config, progress }
    }

    /// Generate and save a document for the included files of `entries`
    pub fn generate(
        &self,
        root: &Path,
        entries: &[Entry],
        base_name: Option<&str>,
    ) -> Result<Generation> {
        self.generate_at(root, entries, base_name, Local::now())
    }

    /// Same as [`generate`](Self::generate) with an explicit timestamp
    pub fn generate_at(
        &self,
        root: &Path,
        entries: &[Entry],
        base_name: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Generation> {
        let root = fs::canonicalize(root)
            .ok()
            .filter(|path| path.is_dir())
            .ok_or_else(|| CtxError::InvalidRoot(root.display().to_string()))?;

        if entries.is_empty() {
            return Err(CtxError::NoEntries);
        }

        let mut files: Vec<&Entry> = entries
            .iter()
            .filter(|e| e.is_file() && e.included())
            .collect();
        if files.is_empty() {
            return Err(CtxError::NoSelection);
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));

        self.progress.set_length(files.len() as u64);

        let mut tally = BTreeMap::new();
        let mut notes = 0;
        let mut blocks = Vec::with_capacity(files.len());
        for file in &files {
            self.progress.set_message(format!("Reading: {}", file.path));

            let block = FileBlock::classify(
                &root.join(&file.path),
                &file.path,
                self.config.latin1_fallback,
            );
            if let FileBlock::ReadError { message, .. } = &block {
                warn!(path = %file.path, error = %message, "could not read file");
            } else {
                debug!(path = %file.path, block = block.label(), "serialized");
            }

            if block.is_note() {
                notes += 1;
            }
            *tally.entry(block.label()).or_insert(0) += 1;
            blocks.push(block.render(&file.path));
            self.progress.inc(1);
        }

        let project_name = project_name(&root);
        let document = assemble_document(&project_name, now, &blocks);
        let word_count = count_words(&document);
        let token_count_approx = approx_tokens(&document);

        let base = base_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(project_name.as_str());
        let file_name = output_file_name(base, now);
        let output_path = self.write_document(&file_name, &document)?;

        info!(
            path = %output_path.display(),
            files = files.len(),
            word_count,
            token_count_approx,
            "context document written"
        );

        Ok(Generation {
            message: format!(
                "Context file generated: {} ({} files processed)",
                file_name,
                files.len()
            ),
            output_path,
            word_count,
            token_count_approx,
            files_included: files.len(),
            notes,
            tally,
            document,
        })
    }

    /// Write through a temp file so a failed write leaves nothing behind
    fn write_document(&self, file_name: &str, document: &str) -> Result<PathBuf> {
        let failure = |source: io::Error| CtxError::WriteFailure {
            file_name: file_name.to_string(),
            source,
        };
        let output_dir = &self.config.output_dir;

        fs::create_dir_all(output_dir).map_err(failure)?;

        let mut temp = NamedTempFile::new_in(output_dir).map_err(failure)?;
        temp.write_all(document.as_bytes()).map_err(failure)?;
        temp.flush().map_err(failure)?;

        let path = output_dir.join(file_name);
        temp.persist_noclobber(&path).map_err(|e| failure(e.error))?;

        Ok(path)
    }
}

/// Basename of the project root
pub fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| root.display().to_string())
}

/// Banner, blocks separated by blank lines, closing banner
pub fn assemble_document(project_name: &str, now: DateTime<Local>, blocks: &[String]) -> String {
    let mut document = format!(
        "--- START OF PROJECT CONTEXT FOR: {} ---\nGenerated: {}\nNumber of files included: {}\n---\n\n",
        project_name,
        now.format("%Y-%m-%d %H:%M:%S"),
        blocks.len()
    );
    document.push_str(&blocks.join("\n"));
    document.push_str(&format!(
        "\n--- END OF PROJECT CONTEXT FOR: {} ---",
        project_name
    ));
    document
}

pub fn count_words(document: &str) -> usize {
    document.split_whitespace().count()
}

/// Character length divided by four, rounded down
pub fn approx_tokens(document: &str) -> usize {
    document.chars().count() / 4
}

/// Keep word characters, spaces and hyphens; space runs become `_`
pub fn sanitize_base_name(base: &str) -> String {
    let kept = DISALLOWED_NAME_CHARS.replace_all(base, "");
    let sanitized = SPACE_RUN.replace_all(kept.trim(), "_").to_string();
    if sanitized.is_empty() {
        DEFAULT_BASE_NAME.to_string()
    } else {
        sanitized
    }
}

/// `<sanitized base>_<YYYYMMDD_HHMMSS>.txt`
pub fn output_file_name(base: &str, now: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        sanitize_base_name(base),
        now.format("%Y%m%d_%H%M%S"),
        OUTPUT_EXTENSION
    )
}

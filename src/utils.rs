/*!
 * Utility functions and fixed filtering rules for ctxpack
 */

use std::collections::HashSet;

use glob_match::glob_match;
use once_cell::sync::Lazy;

/// Directory names never descended into (lowercase)
pub static EXCLUDE_DIRS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // Version control & editors
        ".git",
        ".idea",
        ".vscode",
        // Python
        "venv",
        ".venv",
        "env",
        ".env",
        "local_env",
        "__pycache__",
        ".mypy_cache",
        ".pytest_cache",
        ".ruff_cache",
        // JavaScript
        "node_modules",
        "bower_components",
        "jspm_packages",
        ".angular",
        ".next",
        ".nuxt",
        // Build output
        "target",
        "build",
        "dist",
        "out",
        "bin",
        "obj",
        "packages",
        "docs_build",
        "site",
        ".gradle",
        ".mvn",
        // Caches & scratch
        "logs",
        "temp",
        "tmp",
        ".cache",
        "coverage",
        // Infrastructure tooling
        ".terraform",
        ".terragrunt-cache",
        ".serverless",
        ".dynamodb",
        ".localstack",
        ".vagrant",
        ".kitchen",
        // PHP/Ruby
        "vendor",
    ]
    .into_iter()
    .collect()
});

/// Hidden directories that are still scanned
pub static ALLOWED_HIDDEN_DIRS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| [".well-known"].into_iter().collect());

/// Exact file names never listed (lowercase)
pub static EXCLUDE_FILES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // OS artifacts
        ".ds_store",
        "thumbs.db",
        "nohup.out",
        // Lock files
        "pipfile.lock",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "composer.lock",
        // Logs
        "npm-debug.log",
        "yarn-debug.log",
        "yarn.error.log",
        // Tool configuration
        ".gitignore",
        ".gitattributes",
        ".gitmodules",
        ".editorconfig",
        ".npmrc",
        ".babelrc",
        ".eslintrc",
        ".eslintrc.js",
        ".eslintrc.json",
        ".eslintrc.yaml",
        ".eslintrc.yml",
        ".prettierrc",
        ".prettierrc.js",
        ".prettierrc.json",
        ".prettierrc.yaml",
        ".prettierrc.yml",
        "pytest.ini",
        "tox.ini",
        "setup.cfg",
        "pyproject.toml",
        "web.config",
        "app.config",
        // Environment overrides
        ".env.local",
        ".env.development",
        ".env.production",
        ".env.test",
    ]
    .into_iter()
    .collect()
});

/// Glob patterns matched against lowercase file names
pub static EXCLUDE_FILE_PATTERNS: &[&str] = &[
    // Logs & scratch
    "*.log", "*.tmp", "*.bak", "*.swp", "*.swo", "*.cache", "*.ds_store",
    // Compiled
    "*.pyc", "*.pyo", "*.exe", "*.dll", "*.o", "*.so", "*.bin",
    "*.class", "*.jar", "*.war", "*.ear",
    // Archives & images
    "*.zip", "*.tar.gz", "*.rar", "*.7z", "*.gz", "*.bz2", "*.xz", "*.dmg", "*.iso",
    // Documents
    "*.pdf", "*.doc", "*.docx", "*.xls", "*.xlsx", "*.ppt", "*.pptx",
    // Media
    "*.jpg", "*.jpeg", "*.png", "*.gif", "*.bmp", "*.svg", "*.ico",
    "*.mp3", "*.wav", "*.ogg", "*.mp4", "*.avi", "*.mkv",
    // Lock files
    "*.lock",
];

/// Extension-less names used verbatim as a language hint
static KNOWN_BARE_NAMES: &[&str] = &[
    "dockerfile",
    "makefile",
    "readme",
    "license",
    ".gitattributes",
    ".editorconfig",
    "jenkinsfile",
    "vagrantfile",
    "gemfile",
    "procfile",
    ".gitignore",
    ".env",
];

/// Whether a directory entry is dropped by the fixed rules
pub fn is_excluded(name: &str, is_dir: bool) -> bool {
    let lower = name.to_lowercase();

    if is_dir {
        return EXCLUDE_DIRS.contains(lower.as_str())
            || (name.starts_with('.') && !ALLOWED_HIDDEN_DIRS.contains(lower.as_str()));
    }

    if EXCLUDE_FILES.contains(lower.as_str()) {
        return true;
    }

    if name.starts_with('.') && !is_allowed_dotfile(&lower) {
        return true;
    }

    EXCLUDE_FILE_PATTERNS
        .iter()
        .any(|pattern| glob_match(pattern, &lower))
}

/// rc files, `.git*` files and `.env` survive the dotfile rule
fn is_allowed_dotfile(lower: &str) -> bool {
    lower == ".env" || lower.starts_with(".git") || lower.ends_with("rc")
}

/// Derive the fence tag for a file from its name
pub fn language_hint(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    let lower = name.to_lowercase();

    if let Some((_, ext)) = lower.rsplit_once('.') {
        if !ext.is_empty() {
            return ext.to_string();
        }
    }

    if KNOWN_BARE_NAMES.contains(&lower.as_str()) {
        return lower;
    }

    "text".to_string()
}

/// Format a human-readable file size
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

/// Format a number with human-readable units
pub fn format_number(num: usize) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_and_hidden_directories() {
        assert!(is_excluded("node_modules", true));
        assert!(is_excluded("Target", true));
        assert!(is_excluded(".github", true));
        assert!(!is_excluded(".well-known", true));
        assert!(!is_excluded("src", true));
    }

    #[test]
    fn dotfile_rules() {
        assert!(!is_excluded(".bashrc", false));
        assert!(!is_excluded(".env", false));
        assert!(!is_excluded(".gitlab-ci.yml", false));
        assert!(is_excluded(".gitignore", false));
        assert!(is_excluded(".npmrc", false));
        assert!(is_excluded(".env.local", false));
        assert!(is_excluded(".hidden", false));
    }

    #[test]
    fn pattern_rules_are_case_insensitive() {
        assert!(is_excluded("Photo.PNG", false));
        assert!(is_excluded("backup.tar.gz", false));
        assert!(is_excluded("Cargo.lock", false));
        assert!(is_excluded("server.log", false));
        assert!(!is_excluded("main.rs", false));
        assert!(!is_excluded("Cargo.toml", false));
    }

    #[test]
    fn language_hints() {
        assert_eq!(language_hint("src/a.py"), "py");
        assert_eq!(language_hint("web/App.TSX"), "tsx");
        assert_eq!(language_hint("Dockerfile"), "dockerfile");
        assert_eq!(language_hint("docs/README"), "readme");
        assert_eq!(language_hint(".bashrc"), "bashrc");
        assert_eq!(language_hint("notes"), "text");
        assert_eq!(language_hint("weird."), "text");
    }

    #[test]
    fn human_sizes() {
        assert_eq!(format_file_size(512), "512 bytes");
        assert_eq!(format_file_size(2048), "2.00 KB");
        assert_eq!(format_number(1500), "1.5K");
    }
}

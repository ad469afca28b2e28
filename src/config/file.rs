//! Settings file discovery
//!
//! Looks for a settings file in the working directory first, then in the
//! user's config directory.

use std::path::{Path, PathBuf};

/// Settings file locations (in order of precedence)
pub const SETTINGS_LOCATIONS: &[&str] = &[
    "./lokatani-tester.yaml",
    "./lokatani-tester.yml",
    "./lokatani-tester.json",
    "./.lokatani-tester.yaml",
    "~/.config/lokatani-tester/config.yaml",
    "~/.lokatani-tester.yaml",
];

/// First existing settings file, if any
pub fn find_settings_file() -> Option<PathBuf> {
    find_in(SETTINGS_LOCATIONS)
}

fn find_in(locations: &[&str]) -> Option<PathBuf> {
    locations
        .iter()
        .map(|location| expand_path(location))
        .find(|path| path.is_file())
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
pub(super) fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

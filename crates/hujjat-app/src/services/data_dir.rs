// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::PathBuf;

const APP_DIR: &str = "hujjat";

/// Return the application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let dir = base_dir(|key| std::env::var(key).ok()).join(APP_DIR);
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// Return a subdirectory inside the data dir (e.g. "output").
pub fn data_subdir(name: &str) -> PathBuf {
    let dir = data_dir().join(name);
    std::fs::create_dir_all(&dir).ok();
    dir
}

/// XDG data home, then `~/.local/share`, then the system temp dir.
fn base_dir(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(xdg) = lookup("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg);
    }
    if let Some(home) = lookup("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local").join("share");
    }
    std::env::temp_dir()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_wins_over_home() {
        let base = base_dir(|key| match key {
            "XDG_DATA_HOME" => Some("/data".into()),
            "HOME" => Some("/home/u".into()),
            _ => None,
        });
        assert_eq!(base, PathBuf::from("/data"));
    }

    #[test]
    fn home_fallback_uses_local_share() {
        let base = base_dir(|key| (key == "HOME").then(|| "/home/u".to_string()));
        assert_eq!(base, PathBuf::from("/home/u/.local/share"));
    }

    #[test]
    fn empty_values_are_ignored() {
        let base = base_dir(|_| Some(String::new()));
        assert_eq!(base, std::env::temp_dir());
    }
}

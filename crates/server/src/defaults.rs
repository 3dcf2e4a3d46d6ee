#![forbid(unsafe_code)]

use std::path::PathBuf;

pub const STORAGE_DIR_ENV: &str = "NOVELSHELF_DIR";
pub const DEFAULT_STORE_DIRNAME: &str = ".novelshelf";

pub fn resolve_storage_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(STORAGE_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(DEFAULT_STORE_DIRNAME))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_DIRNAME))
}

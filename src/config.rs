//! Configuration management for codedock
//!
//! Stores settings in ~/.config/codedock/config.json. The Dify API key is
//! never written here: it comes from `DIFY_API_KEY` or the system keychain.

use crate::dify::DEFAULT_ENDPOINT;
use crate::store::Store;
use keyring::Entry;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "DIFY_API_KEY";
const KEYRING_SERVICE: &str = "codedock";
const KEYRING_USERNAME: &str = "dify_api_key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workflow run endpoint
    pub endpoint: String,
    /// Store directory; the platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// How often the file list is re-read for changes from other processes
    pub refresh_interval_ms: u64,
    /// Quiet period before code edits are written
    pub save_debounce_ms: u64,
    /// Prefix of the pseudo-user id sent with each run
    pub user_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            data_dir: None,
            refresh_interval_ms: 300,
            save_debounce_ms: 300,
            user_prefix: "tui".to_string(),
        }
    }
}

fn keyring_disabled() -> bool {
    if cfg!(test) {
        return true;
    }
    matches!(
        std::env::var("CODEDOCK_DISABLE_KEYRING")
            .unwrap_or_default()
            .to_lowercase()
            .as_str(),
        "1" | "true" | "yes"
    )
}

fn keyring_entry() -> Result<Entry, keyring::Error> {
    Entry::new(KEYRING_SERVICE, KEYRING_USERNAME)
}

fn read_keyring_key() -> Result<Option<String>, keyring::Error> {
    if keyring_disabled() {
        return Ok(None);
    }
    let entry = keyring_entry()?;
    match entry.get_password() {
        Ok(key) => Ok(Some(key)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(err) => Err(err),
    }
}

fn write_keyring_key(key: &str) -> Result<(), String> {
    if keyring_disabled() {
        return Err(format!(
            "System keychain is disabled. Set the {} environment variable instead.",
            API_KEY_ENV
        ));
    }
    let entry = keyring_entry().map_err(|e| e.to_string())?;
    entry.set_password(key).map_err(|e| e.to_string())
}

impl Config {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("codedock"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                preserve_corrupt_config(path, &content);
                eprintln!(
                    "  Warning: Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                    err
                );
                Self::default()
            }
        }
    }

    /// Write the config to its default location unless a file is already there.
    /// Returns whether a file was written.
    pub fn save_if_missing(&self) -> Result<bool, String> {
        let path =
            Self::config_path().ok_or_else(|| "Could not determine config directory".to_string())?;
        self.save_to_if_missing(&path)
    }

    fn save_to_if_missing(&self, path: &Path) -> Result<bool, String> {
        if path.exists() {
            return Ok(false);
        }
        self.save_to(path)?;
        Ok(true)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(dir, fs::Permissions::from_mode(0o700)) {
                    eprintln!("  Warning: Failed to set config directory permissions: {}", e);
                }
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;
        write_config_atomic(path, &content).map_err(|e| format!("Failed to write config: {}", e))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(50))
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    /// Store directory: explicit override, then config, then the platform default.
    pub fn resolve_data_dir(&self, cli_override: Option<PathBuf>) -> PathBuf {
        cli_override
            .or_else(|| self.data_dir.clone())
            .or_else(Store::default_dir)
            .unwrap_or_else(|| PathBuf::from(".codedock"))
    }

    /// Get the Dify API key (from environment or keychain)
    pub fn get_api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Some(key.trim().to_string());
            }
        }

        match read_keyring_key() {
            Ok(key) => key,
            Err(err) => {
                eprintln!(
                    "  Warning: Failed to read API key from system keychain: {}",
                    err
                );
                eprintln!(
                    "  Tip: Set the {} environment variable as a workaround.",
                    API_KEY_ENV
                );
                None
            }
        }
    }

    /// Store the API key in the keychain and verify it reads back
    pub fn set_api_key(&self, key: &str) -> Result<(), String> {
        write_keyring_key(key).map_err(|write_err| {
            format!(
                "Failed to store API key in system keychain: {}. \
                 You can set the {} environment variable instead.",
                write_err, API_KEY_ENV
            )
        })?;

        match read_keyring_key() {
            Ok(Some(stored_key)) if stored_key == key => Ok(()),
            Ok(_) => Err(format!(
                "API key verification failed: key was not persisted to keychain. \
                 You can set the {} environment variable instead.",
                API_KEY_ENV
            )),
            Err(read_err) => Err(format!(
                "API key verification failed: couldn't read back from keychain ({}).",
                read_err
            )),
        }
    }

    /// Dify app keys look like `app-...`
    pub fn validate_api_key_format(key: &str) -> bool {
        key.starts_with("app-")
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/codedock/config.json".to_string())
    }
}

/// Interactive prompt to set up the API key
pub fn setup_api_key_interactive() -> Result<(), String> {
    use std::io;

    println!();
    println!("  ┌─────────────────────────────────────────────────────────┐");
    println!("  │  DIFY SETUP                                             │");
    println!("  └─────────────────────────────────────────────────────────┘");
    println!();
    println!("  codedock runs a Dify workflow for each assistant task.");
    println!();
    println!("  1. Copy the API key of your workflow app (Dify > API Access)");
    println!("  2. Paste it below (saved in your system keychain)");
    println!();
    print!("  API Key: ");
    io::stdout().flush().map_err(|e| e.to_string())?;

    let mut key = String::new();
    io::stdin().read_line(&mut key).map_err(|e| e.to_string())?;
    let key = key.trim().to_string();

    if key.is_empty() {
        return Err("No API key provided".to_string());
    }

    if !Config::validate_api_key_format(&key) {
        println!();
        println!("  Warning: Key doesn't look like a Dify app key (should start with app-)");
        println!("     Saving anyway...");
    }

    let config = Config::load();
    config.set_api_key(&key)?;

    println!();
    println!("  + API key saved to the system keychain");
    match config.save_if_missing() {
        Ok(true) => println!("  + Settings written to {}", Config::config_location()),
        Ok(false) => println!("  Settings: {}", Config::config_location()),
        Err(e) => println!("  Warning: Could not write settings: {}", e),
    }
    println!();

    Ok(())
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

fn write_config_atomic(path: &Path, content: &str) -> Result<(), String> {
    use std::fs::OpenOptions;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)
        .map_err(|e| e.to_string())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
            eprintln!("  Warning: Failed to set temp config file permissions: {}", e);
        }
    }

    file.write_all(content.as_bytes())
        .map_err(|e| e.to_string())?;
    drop(file);

    #[cfg(windows)]
    {
        if path.exists() {
            let _ = fs::remove_file(path);
        }
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.to_string());
    }
    Ok(())
}

use std::{env, path::PathBuf};

use log::LevelFilter;

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `INDIESOUND__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("INDIESOUND")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.tick_ms == 0 {
            return Err("audio.tick_ms must be >= 1".to_string());
        }
        let step = self.controls.volume_step;
        if !(step > 0.0 && step <= 1.0) {
            return Err(format!("controls.volume_step must be in (0, 1], got {step}"));
        }
        if self.log_level().is_none() {
            return Err(format!("log.level {:?} is not a log level", self.log.level));
        }
        Ok(())
    }

    pub fn log_level(&self) -> Option<LevelFilter> {
        self.log.level.trim().parse().ok()
    }

    /// Configured store root, or the XDG data default.
    pub fn store_root(&self) -> Option<PathBuf> {
        self.store
            .root
            .clone()
            .or_else(|| data_home().map(|d| d.join("indiesound").join("store")))
    }

    /// Configured volume state file, or the XDG state default.
    pub fn state_path(&self) -> Option<PathBuf> {
        self.audio
            .state_path
            .clone()
            .or_else(|| state_home().map(|d| d.join("indiesound").join("state.toml")))
    }

    /// Configured TUI log file, or the XDG state default.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .clone()
            .or_else(|| state_home().map(|d| d.join("indiesound").join("indiesound.log")))
    }
}

/// Resolve the config path from `INDIESOUND_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("INDIESOUND_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/indiesound/config.toml`
/// or `~/.config/indiesound/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("indiesound").join("config.toml"))
}

fn data_home() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn state_home() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state")
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var).filter(|v| !v.is_empty()) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}

//! Configuration management for kpa-term.
//!
//! Settings are layered, lowest priority first:
//! 1. built-in defaults
//! 2. `~/.kpa/config.toml` (or the file given with `--config`)
//! 3. environment: `KPA_SERVER_URL`, `KPA_SOCKET_URL`, `KPA_PROMPT`
//! 4. command-line flags
//!
//! ```toml
//! server_url = "http://localhost:8080"
//! # socket_url = "ws://localhost:8080/ws"   # derived from server_url when unset
//! prompt = "$ "
//! request_timeout_secs = 30
//! scrollback_lines = 1000
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ScenarioId;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const SOCKET_PATH: &str = "/ws";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST API
    pub server_url: String,
    /// WebSocket URL of the shell backend; derived from `server_url` if unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_url: Option<String>,
    /// Prompt shown in the terminal pane
    pub prompt: String,
    pub request_timeout_secs: u64,
    /// Lines of terminal scrollback kept by the screen model
    pub scrollback_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            socket_url: None,
            prompt: "$ ".to_string(),
            request_timeout_secs: 30,
            scrollback_lines: 1000,
        }
    }
}

impl Config {
    /// Config directory (~/.kpa), also home of the log files.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kpa")
    }

    /// Default config file path (~/.kpa/config.toml)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load config from `path`, or return the defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Apply environment overrides. `lookup` is usually `std::env::var(..).ok()`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("KPA_SERVER_URL").filter(|v| !v.is_empty()) {
            self.server_url = url;
        }
        if let Some(url) = lookup("KPA_SOCKET_URL").filter(|v| !v.is_empty()) {
            self.socket_url = Some(url);
        }
        if let Some(prompt) = lookup("KPA_PROMPT") {
            self.prompt = prompt;
        }
    }

    /// Apply command-line overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(url) = &args.server_url {
            self.server_url = url.clone();
        }
        if let Some(url) = &args.socket_url {
            self.socket_url = Some(url.clone());
        }
    }

    /// WebSocket URL of the shell backend.
    ///
    /// Without an explicit `socket_url`, the scheme of `server_url` is
    /// switched to ws/wss and `/ws` is appended.
    pub fn shell_socket_url(&self) -> String {
        if let Some(url) = &self.socket_url {
            return url.clone();
        }

        let base = self.server_url.trim_end_matches('/');
        let base = if let Some(rest) = base.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = base.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            base.to_string()
        };
        format!("{}{}", base, SOCKET_PATH)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parsed command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub scenario_id: Option<ScenarioId>,
    pub server_url: Option<String>,
    pub socket_url: Option<String>,
    pub config_path: Option<PathBuf>,
    pub help: bool,
}

pub const USAGE: &str = "\
Usage: kpa-term [OPTIONS] [SCENARIO_ID]

Options:
  --scenario <id>    Scenario to open (same as SCENARIO_ID)
  --server <url>     REST API base URL (default: http://localhost:8080)
  --socket <url>     Shell WebSocket URL (default: derived from --server)
  --config <path>    Config file (default: ~/.kpa/config.toml)
  -h, --help         Show this help

Keys: Ctrl+B then n (switch pane), c (check scenario), l (redraw), q (quit)";

impl Args {
    /// Parse arguments, excluding the binary name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut parsed = Args::default();
        let mut iter = args.into_iter().map(Into::<String>::into);

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--server" => parsed.server_url = Some(required_value(&mut iter, &arg)?),
                "--socket" => parsed.socket_url = Some(required_value(&mut iter, &arg)?),
                "--config" => {
                    parsed.config_path = Some(PathBuf::from(required_value(&mut iter, &arg)?))
                }
                "--scenario" => {
                    let value = required_value(&mut iter, &arg)?;
                    parsed.scenario_id = Some(parse_scenario_id(&value)?);
                }
                other if other.starts_with('-') => bail!("Unknown option: {}", other),
                other => {
                    if parsed.scenario_id.is_some() {
                        bail!("Unexpected argument: {}", other);
                    }
                    parsed.scenario_id = Some(parse_scenario_id(other)?);
                }
            }
        }

        Ok(parsed)
    }
}

fn required_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    iter.next()
        .with_context(|| format!("Missing value for {}", flag))
}

fn parse_scenario_id(value: &str) -> Result<ScenarioId> {
    value
        .parse()
        .with_context(|| format!("Invalid scenario ID: {}", value))
}

/// Resolve the effective configuration for a run.
pub fn resolve(args: &Args) -> Result<Config> {
    let path = args.config_path.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)?;
    config.apply_env(|key| std::env::var(key).ok());
    config.apply_args(args);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "server_url = \"https://kpa.example.com\"\nprompt = \"k> \"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server_url, "https://kpa.example.com");
        assert_eq!(config.prompt, "k> ");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.socket_url, None);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn socket_url_is_derived_from_server_url() {
        let mut config = Config::default();
        assert_eq!(config.shell_socket_url(), "ws://localhost:8080/ws");

        config.server_url = "https://kpa.example.com/".to_string();
        assert_eq!(config.shell_socket_url(), "wss://kpa.example.com/ws");

        config.socket_url = Some("ws://other:9000/socket".to_string());
        assert_eq!(config.shell_socket_url(), "ws://other:9000/socket");
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("KPA_SERVER_URL", "http://10.0.0.5:8080"),
            ("KPA_PROMPT", "kubectl$ "),
            ("KPA_SOCKET_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server_url, "http://10.0.0.5:8080");
        assert_eq!(config.prompt, "kubectl$ ");
        assert_eq!(config.socket_url, None);
    }

    #[test]
    fn args_override_env() {
        let mut config = Config::default();
        config.apply_env(|_| Some("http://from-env".to_string()));
        let args = Args::parse(["--server", "http://from-args"]).unwrap();
        config.apply_args(&args);
        assert_eq!(config.server_url, "http://from-args");
    }

    #[test]
    fn parses_positional_scenario_and_flags() {
        let args = Args::parse(["--server", "http://h:1", "42", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(args.scenario_id, Some(42));
        assert_eq!(args.server_url.as_deref(), Some("http://h:1"));
        assert_eq!(args.config_path, Some(PathBuf::from("/tmp/c.toml")));
        assert!(!args.help);
    }

    #[test]
    fn parses_scenario_flag() {
        let args = Args::parse(["--scenario", "7"]).unwrap();
        assert_eq!(args.scenario_id, Some(7));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Args::parse(["abc"]).is_err());
        assert!(Args::parse(["--server"]).is_err());
        assert!(Args::parse(["--verbose"]).is_err());
        assert!(Args::parse(["1", "2"]).is_err());
    }

    #[test]
    fn no_arguments_means_no_scenario() {
        let args = Args::parse(Vec::<String>::new()).unwrap();
        assert_eq!(args, Args::default());
    }
}

//! Handler functions for `railgraph config` subcommands.
//!
//! `get` reads the effective configuration (file, environment and defaults
//! merged). `set` edits the file itself through [`ConfigFile`], coercing the
//! new value to the type the key already has and refusing edits that would
//! leave an unusable configuration behind.

use crate::cli::ConfigAction;
use crate::config::RailgraphConfig;
use railgraph_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Keys that are valid but absent from a default configuration.
const OPTIONAL_KEYS: &[&str] = &["base_path", "store.snapshot_path"];

// ============================================================================
// Command dispatch
// ============================================================================

/// Handle a config subcommand.
///
/// Takes the raw `--config` path because `path` and `init` must work before
/// any file exists.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => cmd_config_path(config_path),
        ConfigAction::Get { key } => {
            println!("{}", cmd_config_get(config_path, &key)?);
            Ok(())
        }
        ConfigAction::Set { key, value } => cmd_config_set(config_path, &key, &value),
        ConfigAction::Init { file, force } => cmd_config_init(file.as_deref(), force),
        ConfigAction::Export { docker_env } => {
            let config = RailgraphConfig::load(config_path)?;
            for line in export_lines(&config, docker_env)? {
                println!("{line}");
            }
            Ok(())
        }
    }
}

// ============================================================================
// Command handlers
// ============================================================================

fn cmd_config_path(config_path: Option<&str>) -> Result<()> {
    let path = RailgraphConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("No config directory on this platform"))?;
    println!("{}", path.display());
    if !path.exists() {
        log::info!(
            "{} does not exist yet; `railgraph config init` creates it",
            path.display()
        );
    }
    Ok(())
}

/// The effective value of `key`, formatted for display.
fn cmd_config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = RailgraphConfig::load(config_path)?;
    let effective = as_table(&config)?;
    match lookup(&effective, key) {
        Some(value) => Ok(display_value(value)),
        None if OPTIONAL_KEYS.contains(&key) => Ok(String::new()),
        None => Err(Error::config(format!("Unknown configuration key '{key}'"))),
    }
}

fn cmd_config_set(config_path: Option<&str>, key: &str, raw: &str) -> Result<()> {
    let path = RailgraphConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("No config directory on this platform"))?;

    let mut file = ConfigFile::open(&path)?;
    let value = file.set(key, raw)?;
    file.save()?;

    println!("{key} = {value} ({})", path.display());
    Ok(())
}

fn cmd_config_init(file: Option<&str>, force: bool) -> Result<()> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => RailgraphConfig::default_config_path()
            .ok_or_else(|| Error::config("No config directory on this platform"))?,
    };

    if path.exists() && !force {
        return Err(Error::config(format!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }

    let body = format!(
        "# Railgraph configuration.\n# Unset keys fall back to RAILGRAPH_* variables, then built-in defaults.\n\n{}",
        RailgraphConfig::default().to_toml_string()?
    );
    std::fs::write(&path, body).map_err(|e| Error::io_with_path(e, &path))?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

/// `KEY=value` lines, or `--env KEY=value` for `docker run`.
fn export_lines(config: &RailgraphConfig, docker_env: bool) -> Result<Vec<String>> {
    let prefix = if docker_env { "--env " } else { "" };
    Ok(config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| format!("{prefix}{key}={value}"))
        .collect())
}

// ============================================================================
// ConfigFile
// ============================================================================

/// A configuration file opened for editing.
struct ConfigFile {
    path: PathBuf,
    doc: toml::Table,
}

impl ConfigFile {
    /// Read and parse an existing file.
    fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::config(format!(
                "{} does not exist; run `railgraph config init` first",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let doc = toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            doc,
        })
    }

    /// Set `key` from its command-line spelling, returning the stored value.
    ///
    /// The value takes the type the key has in the file, or failing that in
    /// the default configuration.
    fn set(&mut self, key: &str, raw: &str) -> Result<toml::Value> {
        let defaults = as_table(&RailgraphConfig::default())?;
        let template = lookup(&self.doc, key).or_else(|| lookup(&defaults, key));
        if template.is_none() && !OPTIONAL_KEYS.contains(&key) {
            return Err(Error::config(format!("Unknown configuration key '{key}'")));
        }

        let value = coerce(key, raw, template)?;
        insert(&mut self.doc, key, value.clone())?;
        Ok(value)
    }

    /// Write the document back after checking it still makes a usable config.
    fn save(&self) -> Result<()> {
        let body = toml::to_string_pretty(&self.doc).map_err(|e| Error::config(e.to_string()))?;
        let config: RailgraphConfig =
            toml::from_str(&body).map_err(|e| Error::config(format!("Edit rejected: {e}")))?;
        config.validate()?;
        std::fs::write(&self.path, body).map_err(|e| Error::io_with_path(e, &self.path))
    }
}

// ============================================================================
// TOML helpers
// ============================================================================

fn as_table(config: &RailgraphConfig) -> Result<toml::Table> {
    match toml::Value::try_from(config).map_err(|e| Error::config(e.to_string()))? {
        toml::Value::Table(table) => Ok(table),
        other => Err(Error::config(format!(
            "configuration serialized as {}, not a table",
            other.type_str()
        ))),
    }
}

/// Resolve a dotted key such as `query.max_k`.
fn lookup<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    match key.split_once('.') {
        None => table.get(key),
        Some((section, rest)) => lookup(table.get(section)?.as_table()?, rest),
    }
}

/// Store `value` under a dotted key, creating sections on the way.
fn insert(table: &mut toml::Table, key: &str, value: toml::Value) -> Result<()> {
    match key.split_once('.') {
        None if key.is_empty() => Err(Error::config("Empty configuration key")),
        None => {
            table.insert(key.to_string(), value);
            Ok(())
        }
        Some((section, rest)) => {
            if section.is_empty() {
                return Err(Error::config("Empty configuration key"));
            }
            let child = table
                .entry(section.to_string())
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            match child.as_table_mut() {
                Some(child) => insert(child, rest, value),
                None => Err(Error::config(format!(
                    "'{section}' is a value, not a section"
                ))),
            }
        }
    }
}

/// Parse `raw` as the type of `template`, or guess when there is none.
fn coerce(key: &str, raw: &str, template: Option<&toml::Value>) -> Result<toml::Value> {
    let mismatch =
        |expected: &str| Error::config(format!("'{key}' expects {expected}, got '{raw}'"));
    match template {
        Some(toml::Value::Integer(_)) => raw
            .parse()
            .map(toml::Value::Integer)
            .map_err(|_| mismatch("a whole number")),
        Some(toml::Value::Float(_)) => raw
            .parse()
            .map(toml::Value::Float)
            .map_err(|_| mismatch("a number")),
        Some(toml::Value::Boolean(_)) => raw
            .parse()
            .map(toml::Value::Boolean)
            .map_err(|_| mismatch("true or false")),
        Some(toml::Value::String(_)) => Ok(toml::Value::String(raw.to_string())),
        Some(_) => Err(Error::config(format!(
            "'{key}' is a section; set its keys individually"
        ))),
        None => Ok(guess(raw)),
    }
}

fn guess(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = raw.parse() {
        toml::Value::Integer(i)
    } else if let Ok(f) = raw.parse() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(raw.to_string())
    }
}

/// Strings print bare; sections print as TOML.
fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(t) => toml::to_string_pretty(t)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| value.to_string()),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

use crate::errors::{VaultError, VaultResult};
use crate::paths::resolve_note_path;
use crate::writer::{append_to_note, create_note, WriteOptions};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

static DATE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{date:([^{}]+)\}\}").expect("valid placeholder pattern"));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyNoteConfig {
    pub location: String,
    pub date_format: String,
    pub template_path: Option<String>,
}

impl Default for DailyNoteConfig {
    fn default() -> Self {
        Self {
            location: "Journal/Daily".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            template_path: None,
        }
    }
}

pub fn daily_note_path(config: &DailyNoteConfig, date: NaiveDate) -> VaultResult<String> {
    let mut filename = String::new();
    write!(filename, "{}", date.format(&config.date_format)).map_err(|_| {
        VaultError::InvalidPath(format!(
            "invalid daily note date format: {}",
            config.date_format
        ))
    })?;
    filename.push_str(".md");

    let location = expand_location(&config.location, date);
    let location = location.trim_matches('/');
    if location.is_empty() || location == "." {
        Ok(filename)
    } else {
        Ok(format!("{location}/{filename}"))
    }
}

pub fn create_daily_note(
    vault_root: &Path,
    config: &DailyNoteConfig,
    date: NaiveDate,
    opts: &WriteOptions,
) -> VaultResult<String> {
    let relative = daily_note_path(config, date)?;
    let full_path = resolve_note_path(vault_root, &relative)?;
    if full_path.is_file() {
        return Ok(relative);
    }

    let content = match &config.template_path {
        Some(template) => read_template(vault_root, template),
        None => String::new(),
    };
    create_note(vault_root, &relative, &content, None, false, opts)?;
    Ok(relative)
}

pub fn append_to_daily_note(
    vault_root: &Path,
    config: &DailyNoteConfig,
    date: NaiveDate,
    content: &str,
    opts: &WriteOptions,
) -> VaultResult<String> {
    let relative = create_daily_note(vault_root, config, date, opts)?;
    append_to_note(vault_root, &relative, content, opts)?;
    Ok(relative)
}

fn expand_location(template: &str, date: NaiveDate) -> String {
    DATE_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "YYYY" => date.format("%Y").to_string(),
            "YY" => date.format("%y").to_string(),
            "MM" => date.format("%m").to_string(),
            "DD" => date.format("%d").to_string(),
            other => {
                tracing::warn!(code = other, "unknown daily note date placeholder");
                caps[0].to_string()
            }
        })
        .into_owned()
}

// A broken template should not block the day's note; degrade to empty.
fn read_template(vault_root: &Path, template: &str) -> String {
    let result = resolve_note_path(vault_root, template)
        .and_then(|path| fs::read_to_string(&path).map_err(VaultError::from));
    match result {
        Ok(content) => content,
        Err(error) => {
            tracing::warn!(template, %error, "daily note template unavailable, creating empty note");
            String::new()
        }
    }
}

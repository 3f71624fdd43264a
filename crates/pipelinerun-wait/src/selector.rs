//! Target selection.
//!
//! A wait targets either one PipelineRun by name or every PipelineRun
//! carrying a set of labels, never both.

use crate::error::WaitError;
use std::fmt;
use std::str::FromStr;

/// A single `key=value` label requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub key: String,
    pub value: String,
}

/// Longest label name or value
const MAX_NAME_LEN: usize = 63;

/// Longest DNS-subdomain key prefix
const MAX_PREFIX_LEN: usize = 253;

/// `[A-Za-z0-9]([-A-Za-z0-9_.]*[A-Za-z0-9])?`, at most 63 characters.
fn is_label_name(s: &str) -> bool {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_NAME_LEN
                && first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        }
        _ => false,
    }
}

/// Lowercase RFC 1123 subdomain, at most 253 characters.
fn is_dns_subdomain(s: &str) -> bool {
    s.len() <= MAX_PREFIX_LEN
        && s.split('.').all(|part| {
            let bytes = part.as_bytes();
            match (bytes.first(), bytes.last()) {
                (Some(first), Some(last)) => {
                    first.is_ascii_alphanumeric()
                        && last.is_ascii_alphanumeric()
                        && bytes
                            .iter()
                            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase() || *b == b'-')
                }
                _ => false,
            }
        })
}

/// `[prefix/]name` as accepted by the Kubernetes API.
fn is_label_key(key: &str) -> bool {
    match key.split_once('/') {
        Some((prefix, name)) => is_dns_subdomain(prefix) && is_label_name(name),
        None => is_label_name(key),
    }
}

impl FromStr for Label {
    type Err = WaitError;

    /// Parse `KEY=VALUE`, rejecting anything the API server would read as
    /// more than a single equality requirement.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| WaitError::InvalidLabel(format!("expected KEY=VALUE, got '{s}'")))?;
        if !is_label_key(key) {
            return Err(WaitError::InvalidLabel(format!(
                "invalid key '{key}' in '{s}'"
            )));
        }
        if !value.is_empty() && !is_label_name(value) {
            return Err(WaitError::InvalidLabel(format!(
                "invalid value '{value}' in '{s}'"
            )));
        }

        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Which PipelineRuns to wait for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Exactly one run, fetched by name
    Name(String),
    /// All runs matching every label
    Labels(Vec<Label>),
}

impl Selector {
    /// Build a selector from the raw flags.
    ///
    /// Exactly one of a non-empty name or at least one label must be present.
    pub fn from_args(name: Option<String>, labels: Vec<Label>) -> Result<Self, WaitError> {
        let name = name.filter(|name| !name.is_empty());

        match (name, labels.is_empty()) {
            (Some(name), true) => Ok(Selector::Name(name)),
            (None, false) => Ok(Selector::Labels(labels)),
            (Some(_), false) => Err(WaitError::InvalidSelector(
                "-n and -l are mutually exclusive".to_string(),
            )),
            (None, true) => Err(WaitError::InvalidSelector(
                "one of -n NAME or -l KEY=VALUE is required".to_string(),
            )),
        }
    }

    /// Label requirements as `(key, value)` pairs; empty for a name selector.
    pub fn label_pairs(&self) -> Vec<(String, String)> {
        match self {
            Selector::Name(_) => Vec::new(),
            Selector::Labels(labels) => labels
                .iter()
                .map(|label| (label.key.clone(), label.value.clone()))
                .collect(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "name {name}"),
            Selector::Labels(labels) => {
                let joined = labels
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "labels {joined}")
            }
        }
    }
}

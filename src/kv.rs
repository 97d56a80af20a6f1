//! `key=value` argument parsing
//!
//! Turns command-line tokens into the set of fields to merge into a secret.
//! Values can be given literally, loaded from a file (`key=@file`) or read
//! from standard input (`key=-`). A bare `-` or `@file` token supplies a
//! whole JSON object of fields at once.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ArgumentError;

/// Fields supplied on the command line, keyed by field name
pub type PatchSet = BTreeMap<String, Value>;

/// Accumulates parsed tokens into a [`PatchSet`]
pub struct KvBuilder {
    stdin: Option<Box<dyn Read>>,
    stdin_consumed: bool,
    result: PatchSet,
}

impl KvBuilder {
    /// Create a builder that may read values from `stdin`
    pub fn new(stdin: Box<dyn Read>) -> Self {
        Self {
            stdin: Some(stdin),
            stdin_consumed: false,
            result: PatchSet::new(),
        }
    }

    /// Create a builder for which any `-` token is an error
    pub fn without_stdin() -> Self {
        Self {
            stdin: None,
            stdin_consumed: false,
            result: PatchSet::new(),
        }
    }

    /// Mark stdin as already used up, e.g. because the tokens came from it
    pub fn stdin_consumed(mut self) -> Self {
        self.stdin_consumed = true;
        self
    }

    /// Parse tokens in order, stopping at the first invalid one
    pub fn add<I, S>(&mut self, tokens: I) -> Result<(), ArgumentError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for token in tokens {
            self.add_one(token.as_ref())?;
        }
        Ok(())
    }

    /// Finish parsing and hand back the collected fields
    pub fn into_map(self) -> PatchSet {
        self.result
    }

    fn add_one(&mut self, raw: &str) -> Result<(), ArgumentError> {
        if raw.is_empty() {
            return Ok(());
        }

        let Some((key, value)) = raw.split_once('=') else {
            if raw == "-" {
                let contents = self.read_stdin(raw)?;
                return self.merge_json(raw, &contents);
            }
            if let Some(file) = raw.strip_prefix('@') {
                let contents = read_file(raw, file)?;
                return self.merge_json(raw, &contents);
            }
            return Err(ArgumentError::Malformed {
                token: raw.to_string(),
            });
        };

        let value = if let Some(file) = value.strip_prefix('@') {
            read_file(raw, file)?
        } else if let Some(escaped) = value.strip_prefix("\\@") {
            format!("@{}", escaped)
        } else if value == "-" {
            self.read_stdin(raw)?
        } else {
            value.to_string()
        };

        debug!("Parsed field {:?}", key);
        self.result.insert(key.to_string(), Value::String(value));
        Ok(())
    }

    fn read_stdin(&mut self, token: &str) -> Result<String, ArgumentError> {
        if self.stdin_consumed {
            return Err(ArgumentError::StdinConsumed {
                token: token.to_string(),
            });
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ArgumentError::StdinUnavailable {
                token: token.to_string(),
            })?;
        self.stdin_consumed = true;

        let mut buf = Vec::new();
        stdin
            .read_to_end(&mut buf)
            .map_err(|source| ArgumentError::StdinRead {
                token: token.to_string(),
                source,
            })?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn merge_json(&mut self, token: &str, contents: &str) -> Result<(), ArgumentError> {
        let object: Map<String, Value> =
            serde_json::from_str(contents).map_err(|source| ArgumentError::InvalidJson {
                token: token.to_string(),
                source,
            })?;
        self.result.extend(object);
        Ok(())
    }
}

fn read_file(token: &str, file: &str) -> Result<String, ArgumentError> {
    // Binary contents are kept, invalid UTF-8 becomes U+FFFD
    let bytes = fs::read(file).map_err(|source| ArgumentError::FileRead {
        token: token.to_string(),
        path: PathBuf::from(file),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse `tokens` into a [`PatchSet`], reading `-` values from `stdin`
pub fn parse_tokens<I, S>(tokens: I, stdin: Box<dyn Read>) -> Result<PatchSet, ArgumentError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut builder = KvBuilder::new(stdin);
    builder.add(tokens)?;
    Ok(builder.into_map())
}

/// Read whitespace separated tokens from `reader`
pub fn split_tokens<R: Read>(mut reader: R) -> Result<Vec<String>, ArgumentError> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .map_err(|source| ArgumentError::StdinRead {
            token: "-".to_string(),
            source,
        })?;
    Ok(String::from_utf8_lossy(&buf)
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

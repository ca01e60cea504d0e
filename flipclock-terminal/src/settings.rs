/// Settings file persisted between runs
///
/// The file holds one `key = value` integer pair per line; blank lines and
/// `#` comments are ignored.
use flipclock_core::SettingsStore;
use nom::{
    character::complete::{char, i32 as integer, space0, u32 as key},
    combinator::{all_consuming, opt, rest},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult,
};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings line {line}: {text:?}")]
    Parse { line: usize, text: String },
}

/// Integer settings backed by a text file
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
    values: BTreeMap<u32, i32>,
}

impl FileSettingsStore {
    /// Store that starts empty and saves to `path`
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: BTreeMap::new(),
        }
    }

    /// Load `path`; a missing file yields an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => parse_settings(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("No settings file at {}", path.display());
                BTreeMap::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        log::debug!("Loaded {} settings from {}", values.len(), path.display());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, format_settings(&self.values)).map_err(io_err)?;
        log::info!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn read_int(&self, key: u32) -> Option<i32> {
        self.values.get(&key).copied()
    }

    fn write_int(&mut self, key: u32, value: i32) {
        self.values.insert(key, value);
    }
}

fn entry(input: &str) -> IResult<&str, (u32, i32)> {
    terminated(
        separated_pair(key, delimited(space0, char('='), space0), integer),
        pair(space0, opt(preceded(char('#'), rest))),
    )(input)
}

pub fn parse_settings(text: &str) -> Result<BTreeMap<u32, i32>, StoreError> {
    let mut values = BTreeMap::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (_, (k, v)) = all_consuming(entry)(line).map_err(|_| StoreError::Parse {
            line: index + 1,
            text: line.to_string(),
        })?;
        values.insert(k, v);
    }
    Ok(values)
}

fn format_settings(values: &BTreeMap<u32, i32>) -> String {
    let mut out = String::from("# flipclock settings\n");
    for (k, v) in values {
        out.push_str(&format!("{} = {}\n", k, v));
    }
    out
}

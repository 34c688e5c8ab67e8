//! Release manifest (`RELEASES`) parsing and serialization.
//!
//! The manifest is plain text with one package per line:
//! `<hash> <filename> <filesize>`, newline separated, no header.

mod pruner;

pub use pruner::{PruneOutcome, PrunePlan, prune_release_dir};

use crate::error::{ManifestError, ReleaseError, Result};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// File name of the release manifest, locally and as a release asset
pub const MANIFEST_FILE_NAME: &str = "RELEASES";

/// Marker contained in full package file names
pub const FULL_MARKER: &str = "-full";

/// Marker contained in delta package file names
pub const DELTA_MARKER: &str = "-delta";

/// Package kind, derived from the file name markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Complete installable package
    Full,
    /// Incremental package between two versions
    Delta,
    /// Anything else listed in the manifest
    Other,
}

/// One entry of a release manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLine {
    /// Content hash of the package
    pub hash: String,
    /// Package file name, relative to the release directory
    pub filename: String,
    /// Package size in bytes
    pub filesize: u64,
}

impl ReleaseLine {
    /// Parse a single manifest line.
    ///
    /// Tokens are split on single spaces and taken positionally; tokens past
    /// the third are ignored.
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = |reason: String| {
            ReleaseError::Manifest(ManifestError::MalformedLine {
                line_number: 0,
                line: line.to_string(),
                reason,
            })
        };

        let tokens: Vec<&str> = line.split(' ').collect();
        if tokens.len() < 3 {
            return Err(malformed(format!(
                "expected 3 fields, found {}",
                tokens.len()
            )));
        }

        let filesize = tokens[2]
            .parse::<u64>()
            .map_err(|e| malformed(format!("invalid file size '{}': {}", tokens[2], e)))?;

        Ok(Self {
            hash: tokens[0].to_string(),
            filename: tokens[1].to_string(),
            filesize,
        })
    }

    /// Classify the package by its file name
    pub fn kind(&self) -> PackageKind {
        if self.filename.contains(FULL_MARKER) {
            PackageKind::Full
        } else if self.filename.contains(DELTA_MARKER) {
            PackageKind::Delta
        } else {
            PackageKind::Other
        }
    }
}

impl fmt::Display for ReleaseLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.hash, self.filename, self.filesize)
    }
}

impl FromStr for ReleaseLine {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parsed release manifest, in publish order (oldest first)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseManifest {
    /// Manifest entries
    pub lines: Vec<ReleaseLine>,
}

impl ReleaseManifest {
    /// Create a manifest from entries
    pub fn new(lines: Vec<ReleaseLine>) -> Self {
        Self { lines }
    }

    /// Parse manifest text.
    ///
    /// A leading byte-order mark, blank lines and trailing carriage returns
    /// are tolerated. Malformed lines report their 1-based line number.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let raw = raw.trim_end_matches('\r');
            if raw.trim().is_empty() {
                continue;
            }
            let line = ReleaseLine::parse(raw).map_err(|e| match e {
                ReleaseError::Manifest(ManifestError::MalformedLine { line, reason, .. }) => {
                    ReleaseError::Manifest(ManifestError::MalformedLine {
                        line_number: index + 1,
                        line,
                        reason,
                    })
                }
                other => other,
            })?;
            lines.push(line);
        }

        Ok(Self { lines })
    }

    /// Read and parse a manifest file
    pub async fn read(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::parse(&text)
    }

    /// Serialized manifest text, one line per entry
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(ReleaseLine::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Overwrite a manifest file with this manifest
    pub async fn write(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, self.to_text()).await?;
        Ok(())
    }

    /// Whether a package with this file name is listed
    pub fn contains(&self, filename: &str) -> bool {
        self.lines.iter().any(|l| l.filename == filename)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::{
    borrow::Cow,
    fmt,
    fs::{create_dir_all, write},
    path::{Path, PathBuf},
};
use strum_macros::Display;

use crate::archive::Archive;
use crate::cipher::decrypt_entry;
use crate::error::{Error, Result};
use crate::log::Logger;
use crate::manifest::{asset_path, FileDescriptor, Manifest};
use crate::path::safe_join;

/// Extensions skipped by default. PNGs come out of the cipher corrupted.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[".png"];

const JSON_EXTENSION: &str = ".json";

static COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*|/\*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum WarningKind {
    #[strum(to_string = "archive size doesn't match manifest size")]
    RawSizeMismatch,
    #[strum(to_string = "archive file hash doesn't match manifest hash")]
    RawHashMismatch,
    #[strum(to_string = "decrypted size doesn't match original size")]
    DecryptedSizeMismatch,
    #[strum(to_string = "decrypted hash doesn't match original hash")]
    DecryptedHashMismatch,
    #[strum(to_string = "json couldn't be reformatted, written as-is")]
    UnformattableJson,
}

/// A non-fatal finding for one manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Encrypted file name from the manifest.
    pub file: String,
    pub kind: WarningKind,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for file {} (expected {}, got {})",
            self.kind, self.file, self.expected, self.actual
        )
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub warnings: Vec<Warning>,
    /// Output paths, in manifest order.
    pub written: Vec<PathBuf>,
    /// `original name`s of entries that were not extracted.
    pub skipped: Vec<String>,
}

impl ExtractionReport {
    fn warn(
        &mut self,
        logger: &Logger,
        file: &FileDescriptor,
        kind: WarningKind,
        expected: impl ToString,
        actual: impl ToString,
    ) {
        let warning = Warning {
            file: file.name.clone(),
            kind,
            expected: expected.to_string(),
            actual: actual.to_string(),
        };

        logger.warn(format!("Warning: {warning}."));
        self.warnings.push(warning);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Output name suffixes that are never extracted.
    pub excluded_extensions: Vec<String>,
    /// Pretty-print comment-free `.json` files.
    pub reformat_json: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            reformat_json: true,
        }
    }
}

impl ExtractOptions {
    pub fn is_excluded(&self, original_name: &str) -> bool {
        let name: String = original_name.to_ascii_lowercase();

        self.excluded_extensions
            .iter()
            .any(|ext| name.ends_with(&ext.to_ascii_lowercase()))
    }
}

fn md5_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Outcome of trying to pretty-print a decrypted `.json` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonFormat {
    Formatted(String),
    /// The text has `//` or `/*` somewhere; the game's json dialect allows
    /// comments and reparsing would drop them.
    HasComments,
    Invalid(String),
}

pub fn format_json(data: &[u8]) -> JsonFormat {
    let text: &str = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(e) => return JsonFormat::Invalid(e.to_string()),
    };

    if COMMENT_RE.is_match(text) {
        return JsonFormat::HasComments;
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => return JsonFormat::Invalid(e.to_string()),
    };

    match serde_json::to_string_pretty(&value) {
        Ok(formatted) => JsonFormat::Formatted(formatted),
        Err(e) => JsonFormat::Invalid(e.to_string()),
    }
}

/// Decrypts every encrypted manifest entry into `output_dir`.
///
/// Size and hash mismatches are collected into the report. An entry missing from
/// the archive aborts the run.
pub fn extract(
    archive: &mut Archive,
    manifest: &Manifest,
    output_dir: &Path,
    options: &ExtractOptions,
    logger: &Logger,
) -> Result<ExtractionReport> {
    let mut report: ExtractionReport = ExtractionReport::default();

    for file in &manifest.files {
        if !file.is_encrypted || options.is_excluded(&file.original_name) {
            logger.debug(format!("Skipping {}.", file.original_name));
            report.skipped.push(file.original_name.clone());
            continue;
        }

        let entry: String = asset_path(&file.name);
        let raw: Vec<u8> = archive
            .read_entry(&entry)?
            .ok_or_else(|| Error::MissingAsset(entry.clone()))?;

        if raw.len() as u64 != file.size {
            report.warn(logger, file, WarningKind::RawSizeMismatch, file.size, raw.len());
        }

        let raw_hash: String = md5_hex(&raw);
        if !raw_hash.eq_ignore_ascii_case(&file.hash) {
            report.warn(logger, file, WarningKind::RawHashMismatch, &file.hash, raw_hash);
        }

        let decrypted: Vec<u8> = decrypt_entry(archive, &entry)?;

        if decrypted.len() as u64 != file.original_size {
            report.warn(
                logger,
                file,
                WarningKind::DecryptedSizeMismatch,
                file.original_size,
                decrypted.len(),
            );
        }

        let decrypted_hash: String = md5_hex(&decrypted);
        if !decrypted_hash.eq_ignore_ascii_case(&file.original_hash) {
            report.warn(
                logger,
                file,
                WarningKind::DecryptedHashMismatch,
                &file.original_hash,
                decrypted_hash,
            );
        }

        let output_path: PathBuf = safe_join(output_dir, &file.original_name)?;

        let is_json: bool = file
            .original_name
            .to_ascii_lowercase()
            .ends_with(JSON_EXTENSION);

        let contents: Cow<[u8]> = if options.reformat_json && is_json {
            match format_json(&decrypted) {
                JsonFormat::Formatted(formatted) => Cow::Owned(formatted.into_bytes()),
                JsonFormat::HasComments => Cow::Borrowed(decrypted.as_slice()),
                JsonFormat::Invalid(reason) => {
                    report.warn(
                        logger,
                        file,
                        WarningKind::UnformattableJson,
                        "valid json",
                        reason,
                    );
                    Cow::Borrowed(decrypted.as_slice())
                }
            }
        } else {
            Cow::Borrowed(decrypted.as_slice())
        };

        if let Some(parent) = output_path.parent() {
            create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        logger.debug(format!("Writing to {}...", output_path.display()));
        write(&output_path, contents).map_err(|e| Error::io(&output_path, e))?;

        report.written.push(output_path);
    }

    Ok(report)
}

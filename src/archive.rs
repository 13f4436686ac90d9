use serde::Deserialize;
use std::{
    collections::BTreeSet,
    fs::read,
    io::{Cursor, Read, Seek},
    path::Path,
};
use strum_macros::Display;
use zip::{result::ZipError, ZipArchive};

use crate::error::{Error, Result};
use crate::log::Logger;

/// Top-level directory every usable apk carries.
pub const ASSETS_DIR: &str = "assets";
/// Literal name of the base apk inside a split container.
pub const BASE_ARCHIVE_NAME: &str = "base.apk";
/// Split container manifest describing the bundled apks.
pub const SPLIT_MANIFEST_NAME: &str = "manifest.json";
/// Extensions (lowercase, without the dot) that mark a split container.
pub const SPLIT_EXTENSIONS: &[&str] = &["xapks", "xapk", "apks"];

const BASE_SPLIT_ID: &str = "base";

/// Upper bound on the buffer preallocated from a zip header's declared size.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

pub(crate) fn capacity_hint(declared: u64) -> usize {
    declared.min(MAX_PREALLOC) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ContainerKind {
    #[strum(to_string = "apk")]
    Plain,
    #[strum(to_string = "xapk")]
    Split,
}

/// A way of finding the base apk inside a split container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SplitStrategy {
    /// A `base.apk` entry stored directly in the container.
    #[strum(to_string = "base entry")]
    BaseEntry,
    /// The `manifest.json` entry listing split apks, one of them with id `base`.
    #[strum(to_string = "split manifest")]
    SplitManifest,
}

#[derive(Deserialize)]
struct SplitManifest {
    #[serde(default)]
    split_apks: Vec<SplitApk>,
}

#[derive(Deserialize)]
struct SplitApk {
    file: String,
    id: String,
}

impl SplitStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [SplitStrategy; 2] = [
        SplitStrategy::BaseEntry,
        SplitStrategy::SplitManifest,
    ];

    /// Returns the raw bytes of the base apk, or `None` when this strategy does not apply.
    pub fn locate_base<R: Read + Seek>(
        self,
        container: &mut ZipArchive<R>,
    ) -> Result<Option<Vec<u8>>> {
        match self {
            SplitStrategy::BaseEntry => read_entry(container, BASE_ARCHIVE_NAME),
            SplitStrategy::SplitManifest => {
                let Some(manifest) = read_entry(container, SPLIT_MANIFEST_NAME)? else {
                    return Ok(None);
                };

                let manifest: SplitManifest = serde_json::from_slice(&manifest)
                    .map_err(|e| Error::json(SPLIT_MANIFEST_NAME, e))?;

                let Some(base) = manifest
                    .split_apks
                    .into_iter()
                    .find(|split| split.id == BASE_SPLIT_ID)
                else {
                    return Ok(None);
                };

                read_entry(container, &base.file)
            }
        }
    }
}

pub(crate) fn read_entry<R: Read + Seek>(
    zip: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    let mut file = match zip.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(Error::zip(name, e)),
    };

    let mut buf: Vec<u8> = Vec::with_capacity(capacity_hint(file.size()));
    file.read_to_end(&mut buf).map_err(|e| Error::io(name, e))?;

    Ok(Some(buf))
}

/// Names of the top-level directories of a zip. Files stored at the archive root
/// do not count.
pub fn top_level_dirs<R: Read + Seek>(zip: &ZipArchive<R>) -> BTreeSet<String> {
    zip.file_names()
        .filter_map(|name| name.rsplit_once('/').map(|(parent, _)| parent))
        .filter_map(|parent| parent.split('/').next())
        .filter(|first| !first.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_split_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SPLIT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn open_zip(path: &Path) -> Result<ZipArchive<Cursor<Vec<u8>>>> {
    let bytes: Vec<u8> = read(path).map_err(|e| Error::io(path, e))?;

    ZipArchive::new(Cursor::new(bytes)).map_err(|e| Error::zip(path.display().to_string(), e))
}

/// The in-memory apk that holds the encrypted assets.
pub struct Archive {
    zip: ZipArchive<Cursor<Vec<u8>>>,
    kind: ContainerKind,
}

impl Archive {
    /// Opens the apk behind `path`, unwrapping split containers.
    ///
    /// Paths with a split extension are unwrapped directly. Anything else is opened
    /// as a plain apk first; if that lacks an `assets` directory the file is opened
    /// again from scratch as a split container, since some of those are shipped
    /// with an `.apk` or `.zip` extension.
    pub fn open<P: AsRef<Path>>(path: P, logger: &Logger) -> Result<Self> {
        let path: &Path = path.as_ref();

        if is_split_path(path) {
            logger.debug("Loading xapk...");
            return Self::open_split(path, logger);
        }

        let zip = open_zip(path)?;

        if top_level_dirs(&zip).contains(ASSETS_DIR) {
            return Ok(Self {
                zip,
                kind: ContainerKind::Plain,
            });
        }

        logger.debug(format!(
            "No `{ASSETS_DIR}` directory in {}, retrying as xapk...",
            path.display()
        ));

        match Self::open_split(path, logger) {
            Ok(archive) if archive.top_level_dirs().contains(ASSETS_DIR) => Ok(archive),
            _ => Err(Error::InvalidContainer(path.to_path_buf())),
        }
    }

    /// Opens `path` as a split container and returns its base apk.
    pub fn open_split<P: AsRef<Path>>(path: P, logger: &Logger) -> Result<Self> {
        let path: &Path = path.as_ref();
        let mut container = open_zip(path)?;

        for strategy in SplitStrategy::ORDER {
            let Some(base) = strategy.locate_base(&mut container)? else {
                continue;
            };

            logger.debug(format!("Found base apk via {strategy}."));

            let zip = ZipArchive::new(Cursor::new(base))
                .map_err(|e| Error::zip(format!("{}:{BASE_ARCHIVE_NAME}", path.display()), e))?;

            return Ok(Self {
                zip,
                kind: ContainerKind::Split,
            });
        }

        Err(Error::NoBaseArchive(path.to_path_buf()))
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn top_level_dirs(&self) -> BTreeSet<String> {
        top_level_dirs(&self.zip)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.zip.file_names().any(|n| n == name)
    }

    /// Reads an entry's raw bytes, `None` if the apk has no such entry.
    pub fn read_entry(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        read_entry(&mut self.zip, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_size_does_not_drive_allocation() {
        assert_eq!(capacity_hint(12), 12);
        assert_eq!(capacity_hint(u64::MAX), MAX_PREALLOC as usize);
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::archive::{Archive, ASSETS_DIR};
use crate::cipher::decrypt_entry;
use crate::error::{Error, Result};
use crate::log::Logger;

/// Encrypted manifest path, relative to the `assets` directory.
pub const MANIFEST_NAME: &str = "files.lby";

/// Archive path of an encrypted asset.
pub fn asset_path(name: &str) -> String {
    format!("{ASSETS_DIR}/{name}")
}

/// One asset listed in `files.lby`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path of the encrypted file, relative to `assets/`.
    pub name: String,
    /// Output path of the decrypted file.
    #[serde(rename = "original name")]
    pub original_name: String,
    /// Size of the encrypted file.
    pub size: u64,
    /// MD5 of the encrypted file, lowercase hex.
    pub hash: String,
    #[serde(rename = "original size")]
    pub original_size: u64,
    #[serde(rename = "original hash")]
    pub original_hash: String,
    #[serde(rename = "lby")]
    pub is_encrypted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "files hash")]
    pub files_hash: String,
    pub version: Value,
    pub gversion: Value,
    #[serde(default)]
    pub vh: Option<Value>,
    #[serde(default)]
    pub vi: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    pub files: Vec<FileDescriptor>,
}

fn display_field(value: &Option<Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "<none>".to_string(),
    }
}

impl Manifest {
    /// Parses decrypted manifest bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let entry: String = asset_path(MANIFEST_NAME);

        let text: &str = std::str::from_utf8(bytes).map_err(|e| Error::ManifestDecode {
            entry: entry.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(text).map_err(|e| Error::ManifestDecode {
            entry,
            reason: e.to_string(),
        })
    }
}

/// Decrypts and parses `assets/files.lby`.
pub fn decode_manifest(archive: &mut Archive, logger: &Logger) -> Result<Manifest> {
    let decrypted: Vec<u8> = decrypt_entry(archive, &asset_path(MANIFEST_NAME))?;
    let manifest: Manifest = Manifest::from_bytes(&decrypted)?;

    logger.debug(format!("files.json hash: {}", manifest.files_hash));
    logger.debug(format!("version: {}", manifest.version));
    logger.debug(format!("gversion: {}", manifest.gversion));
    logger.debug(format!("vh: {}", display_field(&manifest.vh)));
    logger.debug(format!("vi: {}", display_field(&manifest.vi)));
    logger.debug(format!("id: {}", display_field(&manifest.id)));

    Ok(manifest)
}

use serde::{Deserialize, Serialize};
use std::{
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};
use crate::log::Logger;
use crate::path::safe_join;

/// Decrypted script listing, written by the extractor into the output root.
pub const SCRIPT_LISTING_NAME: &str = "scripting.json";
/// Directory, under the output root, receiving the dumped Lua sources.
pub const SCRIPT_DIR: &str = "lua_src";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub path: String,
    pub name: String,
    pub code: String,
}

/// Writes every script of the listing at `listing_path` to
/// `output_dir/lua_src/<path>`. Returns the number of scripts written.
pub fn export_scripts<P: AsRef<Path>, Q: AsRef<Path>>(
    listing_path: P,
    output_dir: Q,
    logger: &Logger,
) -> Result<usize> {
    let listing_path: &Path = listing_path.as_ref();

    if !listing_path.is_file() {
        return Err(Error::MissingScriptListing(listing_path.to_path_buf()));
    }

    let listing: String = read_to_string(listing_path).map_err(|e| Error::io(listing_path, e))?;
    let scripts: Vec<ScriptEntry> = serde_json::from_str(&listing)
        .map_err(|e| Error::json(listing_path.display().to_string(), e))?;

    let script_dir: PathBuf = output_dir.as_ref().join(SCRIPT_DIR);
    create_dir_all(&script_dir).map_err(|e| Error::io(&script_dir, e))?;

    for script in &scripts {
        let path: PathBuf = safe_join(&script_dir, &script.path)?;

        if let Some(parent) = path.parent() {
            create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        logger.debug(format!("Dumping script {} to {}...", script.name, path.display()));
        write(&path, &script.code).map_err(|e| Error::io(&path, e))?;
    }

    Ok(scripts.len())
}

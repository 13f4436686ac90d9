//!An unpacker for TheoTown `lby` asset bundles. Opens an apk (or an xapk/apks wrapping one), decrypts `assets/files.lby` and every asset it lists, and dumps the bundled Lua scripts.

pub mod archive;
pub mod cipher;
pub mod error;
pub mod extract;
pub mod log;
pub mod manifest;
mod path;
pub mod scripts;

use std::path::{Path, PathBuf};

pub use archive::{Archive, ContainerKind, SplitStrategy};
pub use cipher::{decrypt, decrypt_entry, initial_key};
pub use error::{Error, Result};
pub use extract::{extract, ExtractOptions, ExtractionReport, Warning, WarningKind};
pub use log::Logger;
pub use manifest::{decode_manifest, FileDescriptor, Manifest};
pub use scripts::{export_scripts, ScriptEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackReport {
    pub container: ContainerKind,
    pub extraction: ExtractionReport,
    /// Number of dumped scripts, `None` if there was no script listing.
    pub scripts: Option<usize>,
}

pub struct Unpacker {
    logger: Logger,
    options: ExtractOptions,
    export_scripts: bool,
}

impl Default for Unpacker {
    fn default() -> Self {
        Self::new()
    }
}

impl Unpacker {
    /// Creates a new unpacker with default options: quiet, PNGs skipped, json reformatted, scripts dumped.
    pub fn new() -> Self {
        Self {
            logger: Logger::new(false),
            options: ExtractOptions::default(),
            export_scripts: true,
        }
    }

    /// Enables debug logging.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.logger.set_enabled(verbose);
    }

    /// Replaces the list of output name suffixes that are never extracted.
    pub fn set_excluded_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.excluded_extensions = extensions.into_iter().map(Into::into).collect();
    }

    /// When `false`, `.json` files are written exactly as decrypted.
    pub fn set_reformat_json(&mut self, reformat: bool) {
        self.options.reformat_json = reformat;
    }

    pub fn set_export_scripts(&mut self, export: bool) {
        self.export_scripts = export;
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Unpacks the container at `input_path` into `output_path`.
    pub fn unpack<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<UnpackReport> {
        let output_path: &Path = output_path.as_ref();

        let mut archive: Archive = Archive::open(input_path, &self.logger)?;
        let manifest: Manifest = decode_manifest(&mut archive, &self.logger)?;

        self.logger.info("Decrypting files...");
        let extraction: ExtractionReport = extract(
            &mut archive,
            &manifest,
            output_path,
            &self.options,
            &self.logger,
        )?;

        let scripts: Option<usize> = if self.export_scripts {
            self.logger.info("Dumping lua scripts...");

            let listing: PathBuf = output_path.join(scripts::SCRIPT_LISTING_NAME);

            match export_scripts(&listing, output_path, &self.logger) {
                Ok(count) => Some(count),
                Err(Error::MissingScriptListing(path)) => {
                    self.logger.warn(format!(
                        "No script listing at {}, skipping script dump.",
                        path.display()
                    ));
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        Ok(UnpackReport {
            container: archive.kind(),
            extraction,
            scripts,
        })
    }
}

/// Unpacks the container at `input_path` into `output_path` with default options.
pub fn unpack<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
    verbose: bool,
) -> Result<UnpackReport> {
    let mut unpacker: Unpacker = Unpacker::new();
    unpacker.set_verbose(verbose);
    unpacker.unpack(input_path, output_path)
}

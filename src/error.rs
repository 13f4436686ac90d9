use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} is not a valid apk: no `assets` directory found")]
    InvalidContainer(PathBuf),

    #[error("no base apk found in {0}")]
    NoBaseArchive(PathBuf),

    #[error("failed to decode manifest {entry}: {reason}")]
    ManifestDecode { entry: String, reason: String },

    #[error("{0} is listed in the manifest but missing from the archive")]
    MissingAsset(String),

    #[error("script listing {0} does not exist")]
    MissingScriptListing(PathBuf),

    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip error on {path}: {source}")]
    Zip {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("json error on {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(path: impl Into<String>, source: zip::result::ZipError) -> Self {
        Error::Zip {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

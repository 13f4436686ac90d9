use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Joins a manifest-supplied relative path onto `root`, rejecting absolute
/// paths and `..` components.
pub fn safe_join(root: &Path, relative: &str) -> Result<PathBuf> {
    let normalized: String = relative.replace('\\', "/");
    let mut out: PathBuf = root.to_path_buf();
    let mut pushed: bool = false;

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => {
                out.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafePath(relative.to_string()));
            }
        }
    }

    if !pushed {
        return Err(Error::UnsafePath(relative.to_string()));
    }

    Ok(out)
}

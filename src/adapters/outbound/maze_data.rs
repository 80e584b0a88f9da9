use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{DomainError, DomainResult};
use crate::domains::maze::MazeLayoutSource;

/// Environment variable overriding the layout directory.
pub const MAZE_DATA_DIR_ENV: &str = "MAZE_DATA_DIR";

const LAYOUT_EXTENSION: &str = "txt";

/// Layout used when no file is configured or found.
pub const BUILTIN_LAYOUT: &str = "\
*********
*P  *   *
* * * * *
* *   * *
* ***** *
*       *
*********
";

/// Plain-text layouts stored as `<base>/<name>.txt`.
pub struct FilesystemMazeSource {
    base: PathBuf,
}

impl FilesystemMazeSource {
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| match env::var(MAZE_DATA_DIR_ENV) {
            Ok(v) => PathBuf::from(v),
            Err(_) => PathBuf::from("resources/mazes"),
        });
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn layout_path(&self, name: &str) -> PathBuf {
        let mut p = self.base.join(name);
        if p.extension().is_none() {
            p.set_extension(LAYOUT_EXTENSION);
        }
        p
    }

    /// Write a layout, creating the directory as needed.
    pub fn save_layout(&self, name: &str, layout: &str) -> DomainResult<()> {
        fs::create_dir_all(&self.base).map_err(|e| infra(&self.base, e))?;
        let p = self.layout_path(name);
        fs::write(&p, layout).map_err(|e| infra(&p, e))
    }
}

fn infra(path: &Path, e: std::io::Error) -> DomainError {
    DomainError::Infrastructure(format!("{}: {}", path.display(), e))
}

impl MazeLayoutSource for FilesystemMazeSource {
    fn load_layout(&self, name: &str) -> DomainResult<String> {
        let p = self.layout_path(name);
        fs::read_to_string(&p).map_err(|e| infra(&p, e))
    }

    fn list_layouts(&self) -> DomainResult<Vec<String>> {
        let entries = fs::read_dir(&self.base).map_err(|e| infra(&self.base, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| infra(&self.base, e))?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(LAYOUT_EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

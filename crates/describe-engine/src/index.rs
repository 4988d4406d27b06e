//! Markdown index of the files in an output directory.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use describe_model::{ConfigError, RunSpec, Task};
use tracing::info;

use crate::{EngineError, IndexError};

/// Extensions that are indexed; anything else is ignored.
pub const INDEX_EXTENSIONS: [&str; 8] = ["png", "jpeg", "html", "pdf", "webp", "svg", "eps", "emf"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub label: String,
    pub path: String,
    /// Embed as an image rather than link.
    pub embed: bool,
}

impl IndexEntry {
    pub fn to_markdown(&self) -> String {
        let bang = if self.embed { "!" } else { "" };
        format!("### {}[{}]({})", bang, self.label, self.path)
    }
}

/// Indexable entries of `dir`, ordered by file name.
pub fn index_entries(dir: &Path) -> Result<Vec<IndexEntry>, IndexError> {
    let meta = fs::metadata(dir).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => IndexError::NotFound(dir.to_path_buf()),
        _ => IndexError::Io {
            path: dir.to_path_buf(),
            source,
        },
    })?;
    if !meta.is_dir() {
        return Err(IndexError::NotADirectory(dir.to_path_buf()));
    }

    let io_err = |source: std::io::Error| IndexError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_dir() {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    Ok(names
        .into_iter()
        .filter_map(|name| {
            let (label, ext) = name.split_once('.')?;
            if !INDEX_EXTENSIONS.contains(&ext) {
                return None;
            }
            Some(IndexEntry {
                label: label.to_string(),
                path: dir.join(&name).display().to_string(),
                embed: ext != "html",
            })
        })
        .collect())
}

/// Write the index of `dir` to `target`. Returns the number of entries.
///
/// A failed write leaves whatever was written in place.
pub fn write_index(dir: &Path, target: &Path) -> Result<usize, IndexError> {
    let entries = index_entries(dir)?;
    let write_err = |source: std::io::Error| IndexError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut out = BufWriter::new(File::create(target).map_err(write_err)?);
    for entry in &entries {
        writeln!(out, "{}", entry.to_markdown()).map_err(write_err)?;
    }
    out.flush().map_err(write_err)?;

    info!(entries = entries.len(), index = %target.display(), "wrote markdown index");
    Ok(entries.len())
}

/// Build the markdown index a run asks for, if any.
pub fn markdown(run: &RunSpec) -> Result<Option<usize>, EngineError> {
    let Some(target) = &run.markdown else {
        return Ok(None);
    };
    if run.task != Task::Index {
        return Err(ConfigError::IndexWithTask.into());
    }
    let dir = run.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    Ok(Some(write_index(&dir, target)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_lines() {
        let img = IndexEntry {
            label: "age".into(),
            path: "plots/age.png".into(),
            embed: true,
        };
        assert_eq!(img.to_markdown(), "### ![age](plots/age.png)");

        let page = IndexEntry {
            label: "age".into(),
            path: "plots/age.html".into(),
            embed: false,
        };
        assert_eq!(page.to_markdown(), "### [age](plots/age.html)");
    }
}

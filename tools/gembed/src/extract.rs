//! Writing decoded entries to disk.
//!
//! Extraction is two-phase: every entry is resolved against the image
//! first, and only a fully resolved plan touches the filesystem. A decode
//! failure anywhere in the table therefore leaves the output root untouched.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use gembed_embed::FileEntry;

use crate::verbose::vprintln;

/// One entry, resolved and ready to write.
#[derive(Debug, PartialEq, Eq)]
pub struct Planned<'a> {
    /// Entry name as stored in the table.
    pub name: &'a str,
    /// Destination path under the output root.
    pub path: PathBuf,
    /// File content, or `None` for a directory.
    pub content: Option<&'a [u8]>,
}

/// Totals of a completed extraction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Directories created.
    pub dirs: usize,
    /// Files written.
    pub files: usize,
    /// Content bytes written.
    pub bytes: u64,
}

/// Resolves every entry's name and content against `data`.
pub fn plan<'a>(data: &'a [u8], entries: &[FileEntry], root: &Path) -> Result<Vec<Planned<'a>>> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let raw = entry
                .name(data)
                .with_context(|| format!("entry {i}: name out of range"))?;
            let name = std::str::from_utf8(raw)
                .with_context(|| format!("entry {i}: name is not valid UTF-8"))?;
            let relative =
                relative_path(name).with_context(|| format!("entry {i}: rejected name `{name}`"))?;
            let content = if entry.is_directory {
                None
            } else {
                Some(
                    entry
                        .content(data)
                        .with_context(|| format!("entry {i} (`{name}`): content out of range"))?,
                )
            };
            Ok(Planned {
                name,
                path: root.join(relative),
                content,
            })
        })
        .collect()
}

/// Creates directories and writes files, in plan order.
///
/// Parent directories are created as needed, so a file may precede the
/// directory entry that contains it.
pub fn materialize(plan: &[Planned<'_>]) -> Result<Summary> {
    let mut summary = Summary::default();
    for item in plan {
        match item.content {
            None => {
                std::fs::create_dir_all(&item.path)
                    .with_context(|| format!("Failed to create {}", item.path.display()))?;
                vprintln!("    mkdir {}", item.path.display());
                summary.dirs += 1;
            }
            Some(content) => {
                if let Some(parent) = item.path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                std::fs::write(&item.path, content)
                    .with_context(|| format!("Failed to write {}", item.path.display()))?;
                vprintln!("    write {} ({} bytes)", item.path.display(), content.len());
                summary.files += 1;
                summary.bytes += content.len() as u64;
            }
        }
    }
    Ok(summary)
}

/// Turns a table name into a path that stays under the output root.
fn relative_path(name: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir => bail!("parent directory component"),
            Component::RootDir | Component::Prefix(_) => bail!("absolute path"),
        }
    }
    if path.as_os_str().is_empty() {
        bail!("empty name");
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gembed_embed::Digest;

    fn entry(name_ptr: u64, name_len: u64, content_ptr: u64, content_len: u64) -> FileEntry {
        FileEntry {
            record_offset: 0,
            name_ptr,
            name_len,
            content_ptr,
            content_len,
            hash: Digest::default(),
            is_directory: content_len == 0,
        }
    }

    /// Fresh, empty directory under the system temp dir.
    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gembed-extract-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn relative_paths() {
        assert_eq!(relative_path("a/b.txt").unwrap(), PathBuf::from("a/b.txt"));
        assert_eq!(relative_path("./a/").unwrap(), PathBuf::from("a"));
        assert!(relative_path("../etc/passwd").is_err());
        assert!(relative_path("a/../../b").is_err());
        assert!(relative_path("/etc/passwd").is_err());
        assert!(relative_path("").is_err());
        assert!(relative_path(".").is_err());
    }

    #[test]
    fn plan_resolves_names_and_content() {
        let data = b"assetsassets/a.txtAAA\0";
        let entries = [entry(0, 6, 0, 0), entry(6, 12, 18, 4)];
        let root = Path::new("out");
        let plan = plan(data, &entries, root).unwrap();
        assert_eq!(
            plan,
            [
                Planned {
                    name: "assets",
                    path: PathBuf::from("out/assets"),
                    content: None,
                },
                Planned {
                    name: "assets/a.txt",
                    path: PathBuf::from("out/assets/a.txt"),
                    content: Some(&b"AAA\0"[..]),
                },
            ]
        );
    }

    #[test]
    fn plan_fails_on_out_of_range_content() {
        let data = b"f";
        let entries = [entry(0, 1, 0, 99)];
        let err = plan(data, &entries, Path::new("out")).unwrap_err();
        assert!(format!("{err:#}").contains("content out of range"));
    }

    #[test]
    fn plan_rejects_escaping_names() {
        let data = b"../x";
        let entries = [entry(0, 4, 0, 0)];
        assert!(plan(data, &entries, Path::new("out")).is_err());
    }

    #[test]
    fn materialize_writes_tree() {
        let root = scratch_dir("tree");
        let data = b"dirdir/f.bindir/sub/g.txtXY\0hi";
        let entries = [
            entry(0, 3, 0, 0),
            entry(3, 9, 25, 3),
            // No directory entry for dir/sub: parents are created on demand.
            entry(12, 13, 28, 2),
        ];
        let plan = plan(data, &entries, &root).unwrap();
        let summary = materialize(&plan).unwrap();

        assert_eq!(
            summary,
            Summary {
                dirs: 1,
                files: 2,
                bytes: 5
            }
        );
        assert!(root.join("dir").is_dir());
        assert_eq!(std::fs::read(root.join("dir/f.bin")).unwrap(), b"XY\0");
        assert_eq!(std::fs::read(root.join("dir/sub/g.txt")).unwrap(), b"hi");

        std::fs::remove_dir_all(&root).unwrap();
    }
}

//! Storage for the files of one component.
//!
//! A bundle holds a component's HDL sources next to its description. The
//! [`Bundle`] trait is the archive interface the component model works
//! against; [`DirBundle`] stores members as plain files in the component
//! directory and [`MemoryBundle`] keeps everything in memory.

use orchestra_config::COMPONENT_FILE;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// An archive of component files.
pub trait Bundle {
    /// Names of the member files, sorted. The description file is not a member.
    fn members(&self) -> io::Result<Vec<String>>;

    /// Reads a member's bytes.
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Adds a member or replaces its contents.
    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()>;

    /// Removes a member. Removing an absent member is not an error.
    fn remove(&mut self, name: &str) -> io::Result<()>;

    /// Stores the rendered component description.
    fn persist(&mut self, description: &str) -> io::Result<()>;

    /// Returns `true` if `name` is a member.
    fn contains(&self, name: &str) -> bool {
        self.members()
            .map(|m| m.iter().any(|n| n.eq_ignore_ascii_case(name)))
            .unwrap_or(false)
    }

    /// Copies a member into `dest_dir` and returns the written path.
    fn extract(&self, name: &str, dest_dir: &Path) -> io::Result<PathBuf> {
        let data = self.read(name)?;
        let path = dest_dir.join(name);
        std::fs::write(&path, data)?;
        Ok(path)
    }
}

/// A bundle backed by a component directory, `<library>/<base>/`.
#[derive(Debug, Clone)]
pub struct DirBundle {
    dir: PathBuf,
}

impl DirBundle {
    /// Opens an existing component directory.
    pub fn open(dir: &Path) -> io::Result<Self> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("component directory '{}' not found", dir.display()),
            ));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Creates the component directory if needed and opens it.
    pub fn create(dir: &Path) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Self::open(dir)
    }

    /// The component directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn member_path(&self, name: &str) -> io::Result<PathBuf> {
        let valid = !name.is_empty()
            && Path::new(name).file_name().is_some_and(|f| f == name)
            && !name.eq_ignore_ascii_case(COMPONENT_FILE);
        if valid {
            Ok(self.dir.join(name))
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid bundle member name '{name}'"),
            ))
        }
    }
}

impl Bundle for DirBundle {
    fn members(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name != COMPONENT_FILE {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.member_path(name)?)
    }

    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        std::fs::write(self.member_path(name)?, data)
    }

    fn remove(&mut self, name: &str) -> io::Result<()> {
        match std::fs::remove_file(self.member_path(name)?) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn persist(&mut self, description: &str) -> io::Result<()> {
        std::fs::write(self.dir.join(COMPONENT_FILE), description)
    }
}

/// An in-memory bundle.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundle {
    files: BTreeMap<String, Vec<u8>>,
    description: Option<String>,
}

impl MemoryBundle {
    /// Creates an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a member, builder style.
    pub fn with_file(mut self, name: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files.insert(name.to_string(), data.into());
        self
    }

    /// The last persisted description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Bundle for MemoryBundle {
    fn members(&self) -> io::Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files.get(name).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("bundle member '{name}' not found"),
            )
        })
    }

    fn write(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        self.files.insert(name.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&mut self, name: &str) -> io::Result<()> {
        self.files.remove(name);
        Ok(())
    }

    fn persist(&mut self, description: &str) -> io::Result<()> {
        self.description = Some(description.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_bundle_members() {
        let mut bundle = MemoryBundle::new().with_file("b.vhd", "b").with_file("a.vhd", "a");
        assert_eq!(bundle.members().unwrap(), vec!["a.vhd", "b.vhd"]);
        assert!(bundle.contains("A.VHD"));
        bundle.remove("a.vhd").unwrap();
        bundle.remove("a.vhd").unwrap();
        assert_eq!(bundle.members().unwrap(), vec!["b.vhd"]);
        assert!(bundle.read("a.vhd").is_err());
        bundle.persist("[component]").unwrap();
        assert_eq!(bundle.description(), Some("[component]"));
    }

    #[test]
    fn dir_bundle_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut bundle = DirBundle::create(&tmp.path().join("uart")).unwrap();
        bundle.write("uart.vhd", b"entity uart is end;").unwrap();
        bundle.persist("[component]\nname = \"uart\"\n").unwrap();
        assert_eq!(bundle.members().unwrap(), vec!["uart.vhd"]);
        assert_eq!(bundle.read("uart.vhd").unwrap(), b"entity uart is end;");
        assert!(bundle.dir().join(COMPONENT_FILE).is_file());

        let out = tmp.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let path = bundle.extract("uart.vhd", &out).unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"entity uart is end;");

        bundle.remove("uart.vhd").unwrap();
        assert!(bundle.members().unwrap().is_empty());
    }

    #[test]
    fn dir_bundle_rejects_paths() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut bundle = DirBundle::open(tmp.path()).unwrap();
        assert!(bundle.write("../escape.vhd", b"x").is_err());
        assert!(bundle.write(COMPONENT_FILE, b"x").is_err());
    }

    #[test]
    fn open_missing_directory_fails() {
        let err = DirBundle::open(Path::new("/nonexistent/component")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}

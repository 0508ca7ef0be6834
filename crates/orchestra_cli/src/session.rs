//! Project and library resolution shared by the CLI commands.

use std::path::{Path, PathBuf};

use crate::GlobalArgs;

/// Name of the project description file.
pub const PROJECT_FILE: &str = "project.toml";

/// Default component library directory, relative to the project.
pub const LIBRARY_DIR: &str = "components";

/// Default output directory, relative to the project.
pub const OUTPUT_DIR: &str = "build";

/// Where one invocation reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The `project.toml` file.
    pub project_file: PathBuf,
    /// The component library directory.
    pub library: PathBuf,
    /// The default output directory.
    pub output: PathBuf,
}

impl Session {
    /// Resolves the session from `--project` and `--library`, walking up
    /// from the current directory when no project is given.
    pub fn resolve(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let project_file = match &global.project {
            Some(p) if p.is_dir() => p.join(PROJECT_FILE),
            Some(p) => p.clone(),
            None => find_project_root(&std::env::current_dir()?)?.join(PROJECT_FILE),
        };
        Ok(Self::for_project(project_file, global.library.clone()))
    }

    /// The session of a known project file.
    pub fn for_project(project_file: PathBuf, library: Option<PathBuf>) -> Self {
        let dir = project_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            library: library.unwrap_or_else(|| dir.join(LIBRARY_DIR)),
            output: dir.join(OUTPUT_DIR),
            project_file,
        }
    }
}

/// The component library for commands that do not need a project:
/// `--library`, else the library of the enclosing project, else
/// `components/` in the current directory.
pub fn library_dir(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(library) = &global.library {
        return Ok(library.clone());
    }
    match Session::resolve(global) {
        Ok(session) => Ok(session.library),
        Err(_) => Ok(std::env::current_dir()?.join(LIBRARY_DIR)),
    }
}

/// Walks up from `start` looking for the nearest directory containing
/// `project.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {PROJECT_FILE} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global(project: Option<PathBuf>, library: Option<PathBuf>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: 0,
            color: false,
            project,
            library,
        }
    }

    #[test]
    fn finds_root_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(PROJECT_FILE), "[project]\nname = \"soc\"\n").unwrap();
        let sub = tmp.path().join("rtl").join("deep");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find project.toml"));
    }

    #[test]
    fn project_directory_resolves_to_its_file() {
        let tmp = TempDir::new().unwrap();
        let session = Session::resolve(&global(Some(tmp.path().to_path_buf()), None)).unwrap();
        assert_eq!(session.project_file, tmp.path().join(PROJECT_FILE));
        assert_eq!(session.library, tmp.path().join(LIBRARY_DIR));
        assert_eq!(session.output, tmp.path().join(OUTPUT_DIR));
    }

    #[test]
    fn library_flag_wins() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("ip");
        let session = Session::resolve(&global(
            Some(tmp.path().join("soc.toml")),
            Some(lib.clone()),
        ))
        .unwrap();
        assert_eq!(session.project_file, tmp.path().join("soc.toml"));
        assert_eq!(session.library, lib);
        assert_eq!(library_dir(&global(None, Some(lib.clone()))).unwrap(), lib);
    }
}

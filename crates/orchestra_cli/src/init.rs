//! `orchestra init`: project scaffolding.
//!
//! Creates a project directory holding an empty `project.toml` and the
//! `components/` library directory.

use std::fs;
use std::path::PathBuf;

use orchestra_project::Project;

use crate::session::{LIBRARY_DIR, PROJECT_FILE};
use crate::GlobalArgs;

/// Runs the `orchestra init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory, named after it.
pub fn run(name: Option<String>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{n}' already exists").into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };

    let project_file = project_dir.join(PROJECT_FILE);
    if project_file.exists() {
        return Err(format!("{} already exists", project_file.display()).into());
    }
    let project_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("top");

    let mut project = Project::new(project_name)?;
    if !global.quiet {
        eprintln!("  Creating new project `{}`", project.name());
    }
    project.save_as(&project_file)?;
    fs::create_dir_all(project_dir.join(LIBRARY_DIR))?;

    if !global.quiet {
        eprintln!("     Created {}", project_file.display());
        eprintln!("     Created {}", project_dir.join(LIBRARY_DIR).display());
    }
    Ok(0)
}

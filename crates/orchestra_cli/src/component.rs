//! `orchestra component`: edits and checks library components.

use std::path::{Path, PathBuf};

use orchestra_component::Component;

use crate::session::library_dir;
use crate::{ComponentCommand, GlobalArgs};

/// Runs an `orchestra component` subcommand.
pub fn run(command: &ComponentCommand, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    match command {
        ComponentCommand::Check { component } => {
            let dir = component_dir(component, global)?;
            let mut component = Component::open(&dir)?;
            check(&mut component, global)
        }
        ComponentCommand::AddHdl {
            component,
            file,
            scope,
            order,
            top,
        } => {
            let dir = component_dir(component, global)?;
            let name = base_name(component, &dir);
            let mut component = Component::open_or_create(&dir, &name)?;
            component.add_hdl(file, scope, *order, *top)?;
            component.save()?;
            status(global, "Added", file, component.name());
            Ok(0)
        }
        ComponentCommand::RemoveHdl { component, name } => {
            let dir = component_dir(component, global)?;
            let mut component = Component::open(&dir)?;
            component.remove_hdl(name)?;
            component.save()?;
            status(global, "Removed", Path::new(name), component.name());
            Ok(0)
        }
        ComponentCommand::SetTop { component, name } => {
            let dir = component_dir(component, global)?;
            let mut component = Component::open(&dir)?;
            component.set_top(name)?;
            component.save()?;
            check(&mut component, global)
        }
    }
}

/// A component given as an existing directory is used as is; anything else
/// names a component of the library.
fn component_dir(component: &str, global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = Path::new(component);
    if path.is_dir() || path.components().count() > 1 {
        return Ok(path.to_path_buf());
    }
    let dir = library_dir(global)?.join(component);
    tracing::debug!("component '{component}' resolved to {}", dir.display());
    Ok(dir)
}

fn base_name(component: &str, dir: &Path) -> String {
    dir.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(component)
        .to_ascii_lowercase()
}

fn status(global: &GlobalArgs, verb: &str, file: &Path, component: &str) {
    if !global.quiet {
        eprintln!("{verb:>12} {} to `{component}`", file.display());
    }
}

/// Prints the component's interfaces and errors; exit code 1 on errors.
fn check(component: &mut Component, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    if !global.quiet {
        eprintln!("   Checking {}", component.name());
    }
    let errors = component.check().to_vec();
    for iface in component.interfaces() {
        let clock = iface
            .clock
            .as_deref()
            .map(|c| format!(" (clock {c})"))
            .unwrap_or_default();
        println!("{} {}{clock}", iface.kind.prefix(), iface.name);
        for port in &iface.ports {
            println!("    {:<24} {:<6} {}", port.port, port.role.name(), port.direction);
        }
    }
    for message in &errors {
        eprintln!("  {message}");
    }
    if errors.is_empty() {
        Ok(0)
    } else {
        eprintln!(
            "error: component `{}` has {} error(s)",
            component.name(),
            errors.len()
        );
        Ok(1)
    }
}

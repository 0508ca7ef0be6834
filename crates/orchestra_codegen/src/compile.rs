//! Writes the complete output directory of a checked project.

use crate::error::GenerationError;
use crate::intercon::{intercon_name, make_intercon};
use crate::syscon::{syscon_source, SYSCON_FILE};
use crate::testbench::{make_script, make_testbench, testbench_name};
use crate::top::make_top;
use orchestra_project::{Linkage, Project};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Options of [`compile`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CompileOptions {
    /// Empty the output directory before writing.
    pub clean: bool,
}

/// Generates every output file of `project` into `output`.
///
/// The project must have passed its last check. Returns the written files
/// in simulation compile order followed by the script.
pub fn compile(
    project: &Project,
    output: &Path,
    options: CompileOptions,
) -> Result<Vec<PathBuf>, GenerationError> {
    let linkage = project
        .linkage()
        .filter(|_| project.is_valid())
        .ok_or_else(|| GenerationError::InvalidProject(project.name().to_string()))?;
    compile_linkage(linkage, output, options)
}

/// Generates every output file of an already resolved linkage.
pub fn compile_linkage(
    linkage: &Linkage,
    output: &Path,
    options: CompileOptions,
) -> Result<Vec<PathBuf>, GenerationError> {
    if let Some(wire) = linkage.wires.iter().find(|w| w.masters.len() > 1) {
        return Err(GenerationError::MultiMaster {
            wire: wire.name.clone(),
            masters: wire.masters.len(),
        });
    }
    prepare(output, options.clean)?;

    let mut files = Vec::new();
    let mut bases = HashSet::new();
    for instance in &linkage.instances {
        if bases.insert(instance.base().to_string()) {
            let extracted = instance.component().extract_hdl(output)?;
            tracing::info!(
                "extracted {} file(s) of component '{}'",
                extracted.len(),
                instance.base()
            );
            files.extend(extracted);
        }
    }

    files.push(write(output, SYSCON_FILE, &syscon_source())?);

    let mut intercons = Vec::new();
    for wire in linkage.wires.iter().filter(|w| !w.masters.is_empty()) {
        let intercon = make_intercon(linkage, wire)?;
        let name = format!("{}.vhd", intercon_name(&wire.name));
        files.push(write(output, &name, &intercon.module.render())?);
        intercons.push(intercon);
    }

    let top = make_top(linkage, &intercons)?;
    files.push(write(output, &format!("{}.vhd", linkage.name), &top.render())?);

    let bench = make_testbench(linkage, &top.entity)?;
    files.push(write(
        output,
        &format!("{}.vhd", testbench_name(&linkage.name)),
        &bench.render(),
    )?);

    let names: Vec<String> = files
        .iter()
        .filter_map(|f| f.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    files.push(write(
        output,
        &format!("{}.do", linkage.name),
        &make_script(&linkage.name, &names),
    )?);
    Ok(files)
}

fn prepare(output: &Path, clean: bool) -> Result<(), GenerationError> {
    if clean && output.exists() {
        tracing::info!("cleaning {}", output.display());
        for entry in fs::read_dir(output).map_err(|e| GenerationError::io(output, e))? {
            let path = entry.map_err(|e| GenerationError::io(output, e))?.path();
            let removed = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            removed.map_err(|e| GenerationError::io(&path, e))?;
        }
    }
    fs::create_dir_all(output).map_err(|e| GenerationError::io(output, e))
}

fn write(dir: &Path, name: &str, text: &str) -> Result<PathBuf, GenerationError> {
    let path = dir.join(name);
    fs::write(&path, text).map_err(|e| GenerationError::io(&path, e))?;
    tracing::info!("wrote {}", path.display());
    Ok(path)
}

//! `orchestra compile`: generates the VHDL output of a checked project.

use orchestra_codegen::CompileOptions;
use orchestra_diagnostics::{ReportRenderer, TerminalRenderer};

use crate::check::{load_and_check, summarize};
use crate::session::Session;
use crate::{CompileArgs, GlobalArgs};

/// Runs the `orchestra compile` command.
///
/// Nothing is written when the check reports errors.
pub fn run(args: &CompileArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = Session::resolve(global)?;
    let (project, report) = load_and_check(&session, global)?;
    if !report.is_empty() {
        eprint!("{}", TerminalRenderer::new(global.color).render(&report));
    }
    if report.has_errors() {
        return Ok(summarize(project.name(), &report, global));
    }

    let output = args.output.clone().unwrap_or(session.output);
    if !global.quiet {
        eprintln!("   Compiling {} into {}", project.name(), output.display());
    }
    let files = orchestra_codegen::compile(&project, &output, CompileOptions { clean: args.clean })?;
    if !global.quiet {
        for file in &files {
            eprintln!("     Created {}", file.display());
        }
        eprintln!("    Finished `{}`: {} file(s)", project.name(), files.len());
    }
    Ok(0)
}

//! `orchestra check`: links the project and prints the report.

use orchestra_component::ComponentLibrary;
use orchestra_diagnostics::{JsonRenderer, Report, ReportRenderer, TerminalRenderer};
use orchestra_project::Project;

use crate::session::Session;
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `orchestra check` command.
///
/// Returns exit code 0 if the report holds no error, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let session = Session::resolve(global)?;
    let (project, report) = load_and_check(&session, global)?;

    match args.format {
        ReportFormat::Text => {
            if !report.is_empty() {
                eprint!("{}", TerminalRenderer::new(global.color).render(&report));
            }
        }
        ReportFormat::Json => println!("{}", JsonRenderer.render(&report)),
    }
    Ok(summarize(project.name(), &report, global))
}

/// Opens the session's project and checks it against its library.
pub fn load_and_check(
    session: &Session,
    global: &GlobalArgs,
) -> Result<(Project, Report), Box<dyn std::error::Error>> {
    tracing::debug!(
        "project file {}, library {}",
        session.project_file.display(),
        session.library.display()
    );
    let mut project = Project::open(&session.project_file)?;
    if !global.quiet {
        eprintln!("   Checking {}", project.name());
    }
    let mut library = ComponentLibrary::new(&session.library);
    let report = project.check(&mut library).clone();
    Ok((project, report))
}

/// Prints the closing status line and returns the exit code.
pub fn summarize(name: &str, report: &Report, global: &GlobalArgs) -> i32 {
    let errors = report.error_count();
    let warnings = report.warning_count();
    if errors > 0 {
        eprintln!("error: project `{name}` has {errors} error(s) and {warnings} warning(s)");
        1
    } else {
        if !global.quiet {
            eprintln!("    Finished `{name}`: {warnings} warning(s)");
        }
        0
    }
}

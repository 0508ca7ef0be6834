//! `orchestra arbiter`: writes a standalone round-robin arbiter.

use orchestra_codegen::arbiter::{arbiter_name, arbiter_source};

use crate::{ArbiterArgs, GlobalArgs};

/// Runs the `orchestra arbiter` command.
pub fn run(args: &ArbiterArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let text = arbiter_source(args.masters)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, text)?;
            if !global.quiet {
                eprintln!(
                    "     Created {} ({})",
                    path.display(),
                    arbiter_name(args.masters)
                );
            }
        }
        None => print!("{text}"),
    }
    Ok(0)
}

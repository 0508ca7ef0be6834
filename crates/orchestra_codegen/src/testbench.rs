//! Testbench skeleton and simulation script.

use crate::error::GenerationError;
use crate::vhdl::{Constant, Expr, Instantiation, Module, Signal, Statement};
use orchestra_common::InternalError;
use orchestra_project::Linkage;
use orchestra_vhdl::Entity;

/// Name of the testbench entity of `project`.
pub fn testbench_name(project: &str) -> String {
    format!("{project}_tb")
}

fn period(clock: &str) -> String {
    format!("{}_PERIOD", clock.to_ascii_uppercase())
}

/// Builds a testbench that drives every clock at its frequency, pulses the
/// external reset and instantiates the top level as `uut`.
pub fn make_testbench(linkage: &Linkage, top: &Entity) -> Result<Module, GenerationError> {
    let slowest = linkage
        .min_frequency()
        .ok_or_else(|| InternalError::new("testbench needs at least one clock domain"))?;

    let mut module = Module::new(
        &format!("Testbench of system '{}'", linkage.name),
        Entity::new(&testbench_name(&linkage.name)),
    );
    for clock in &linkage.clocks {
        module.constants.push(Constant {
            name: period(&clock.name),
            ty: "time".into(),
            value: format!("1 sec / {}", clock.frequency.hz()),
        });
    }
    module.constants.push(Constant {
        name: "RESET_ON".into(),
        ty: "time".into(),
        value: format!("1 sec / ({} * 3)", slowest.hz()),
    });
    module.constants.push(Constant {
        name: "RESET_OFF".into(),
        ty: "time".into(),
        value: "RESET_ON * 5".into(),
    });

    let clocks: Vec<&str> = linkage.clocks.iter().map(|c| c.name.as_str()).collect();
    for port in &top.ports {
        let mut signal = Signal::new(&port.name, port.ty.clone());
        if clocks.iter().any(|c| c.eq_ignore_ascii_case(&port.name)) {
            signal.init = Some(Expr::Bit(false));
        }
        module.signal(signal);
    }
    module.components.push(top.clone());

    module.comment("Stimuli");
    module.push(Statement::Waveform {
        target: Expr::name(crate::top::RESET),
        elements: vec![
            (Expr::Bit(false), None),
            (Expr::Bit(true), Some("RESET_ON".into())),
            (Expr::Bit(false), Some("RESET_OFF".into())),
        ],
    });
    for clock in &linkage.clocks {
        module.push(Statement::Waveform {
            target: Expr::name(&clock.name),
            elements: vec![(
                Expr::name(&clock.name).negate(),
                Some(format!("{}/2", period(&clock.name))),
            )],
        });
    }

    module.instantiate(Instantiation {
        label: "uut".into(),
        component: top.name.clone(),
        generics: Vec::new(),
        ports: top
            .ports
            .iter()
            .map(|p| (p.name.clone(), Some(Expr::name(&p.name))))
            .collect(),
    });
    Ok(module)
}

/// A ModelSim/Questa script compiling `files` in order and loading the
/// testbench.
pub fn make_script(project: &str, files: &[String]) -> String {
    let mut out = String::from("vlib WORK\n\n");
    for file in files {
        out.push_str("vcom -93 ");
        out.push_str(file);
        out.push('\n');
    }
    out.push_str(&format!("\nvsim {}\n", testbench_name(project)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_lists_files_in_order() {
        let files = vec!["ram.vhd".to_string(), "syscon.vhd".to_string(), "soc.vhd".to_string()];
        assert_eq!(
            make_script("soc", &files),
            "vlib WORK\n\nvcom -93 ram.vhd\nvcom -93 syscon.vhd\nvcom -93 soc.vhd\n\nvsim soc_tb\n"
        );
    }

    #[test]
    fn period_constant_names() {
        assert_eq!(period("sys"), "SYS_PERIOD");
        assert_eq!(testbench_name("soc"), "soc_tb");
    }
}

//! The reference scenarios: generic-dependent widths, a minimal linked
//! system, name classification and clock domain validation.

use orchestra_common::Frequency;
use orchestra_conformance::{small_soc, Workspace};
use orchestra_config::ClockGenerator;
use orchestra_diagnostics::Report;
use orchestra_project::{Instance, Project};
use orchestra_wishbone::{classify, InterfaceKind, Role};
use std::collections::BTreeMap;

fn count(report: &Report, needle: &str) -> usize {
    report.iter().filter(|(_, m)| m.text.contains(needle)).count()
}

// ===========================================================================
// Scenario A: port width follows generic overrides
// ===========================================================================

#[test]
fn address_width_defaults_from_generic() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let dma = library.find("dma").unwrap();
    let instance = Instance::new("d0", dma, BTreeMap::new());
    assert_eq!(instance.port_width("wbm_name_adr").unwrap(), 8);
}

#[test]
fn address_width_follows_override() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let dma = library.find("dma").unwrap();
    let overrides = BTreeMap::from([("WIDTH".to_string(), "12".to_string())]);
    let instance = Instance::new("d0", dma, overrides);
    assert_eq!(instance.port_width("wbm_name_adr").unwrap(), 12);
    assert_eq!(instance.port_width("wbm_name_dat_i").unwrap(), 8);
}

#[test]
fn dma_master_interface_is_named() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let dma = library.find("dma").unwrap();
    let iface = dma.interface("name").unwrap();
    assert_eq!(iface.kind, InterfaceKind::Master);
    assert_eq!(iface.port(Role::Adr).unwrap().port, "wbm_name_adr");
}

// ===========================================================================
// Scenario B: a master and a slave on one wire
// ===========================================================================

#[test]
fn linked_pair_checks_clean() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let mut p = small_soc(&mut library);
    let report = p.check(&mut library);
    assert_eq!(report.error_count(), 0, "{report:?}");
    assert!(p.is_valid());
}

#[test]
fn unlinked_slave_reports_one_not_connected() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let mut p = small_soc(&mut library);
    p.disconnect("ram0", "wbs_noname").unwrap();
    let report = p.check(&mut library).clone();
    assert_eq!(count(&report, "not connected"), 1, "{report:?}");
    assert_eq!(
        count(&report, "Component 'ram0', slave interface 'wbs_noname' not connected."),
        1
    );
    assert!(!p.is_valid());
}

// ===========================================================================
// Scenario C: classification of raw port names
// ===========================================================================

#[test]
fn classifies_reference_names() {
    let c = classify("WBS_CTRL_ADR");
    assert_eq!(c.kind, InterfaceKind::Slave);
    assert_eq!(c.name.as_deref(), Some("ctrl"));
    assert_eq!(c.role, Some(Role::Adr));

    let c = classify("RESET");
    assert_eq!(c.kind, InterfaceKind::ClockReset);
    assert_eq!(c.name.as_deref(), Some("default"));
    assert_eq!(c.role, Some(Role::Rst));

    let c = classify("FOO");
    assert_eq!(c.kind, InterfaceKind::Export);
    assert_eq!(c.name.as_deref(), Some("export"));
    assert_eq!(c.role, Some(Role::Export));
}

#[test]
fn classification_is_deterministic_and_total() {
    for name in ["wbm_adr_o", "WBS_", "gls", "", "_", "wbc_clk", "wbs_x_y_sel_i", "data"] {
        assert_eq!(classify(name), classify(name), "{name}");
    }
}

// ===========================================================================
// Scenario D: clock domains
// ===========================================================================

#[test]
fn missing_clock_domain_is_reported() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let mut p = Project::new("noclk").unwrap();
    let report = p.check(&mut library).clone();
    let clocks = report.category("clocks").unwrap();
    assert!(clocks.messages.iter().any(|m| m.text == "No clock domain defined."));
}

#[test]
fn zero_frequency_is_reported() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let mut p = Project::new("zero").unwrap();
    p.add_clock("sys", Frequency::new(0), ClockGenerator::Static)
        .unwrap();
    let report = p.check(&mut library).clone();
    assert_eq!(count(&report, "Clock 'sys' has bad frequency value."), 1);
}

// ===========================================================================
// Check properties
// ===========================================================================

#[test]
fn check_is_idempotent() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let mut p = small_soc(&mut library);
    p.disconnect("ram0", "default").unwrap();
    let first = p.check(&mut library).clone();
    let second = p.check(&mut library).clone();
    assert_eq!(first, second);
    let mut fresh = ws.library();
    assert_eq!(p.check(&mut fresh).clone(), first);
}

#[test]
fn report_serializes_to_json() {
    let ws = Workspace::new().with_fixtures();
    let mut library = ws.library();
    let mut p = Project::new("empty").unwrap();
    let report = p.check(&mut library).clone();
    let json = serde_json::to_value(&report).unwrap();
    let text = json.to_string();
    assert!(text.contains("No components in project."));
}

//! The project: its description, its set management and the linker check.

use crate::address::{AddressMap, BusGeometry};
use crate::error::ProjectError;
use crate::instance::Instance;
use crate::linkage::{ClockLink, InterfaceRef, Linkage, WireLink, RESERVED_CLOCK_NAMES};
use orchestra_common::Frequency;
use orchestra_component::{Component, ComponentError, ComponentLibrary};
use orchestra_config::{
    is_vhdl_identifier, load_project, save_project, ClockGenerator, ClockRecord,
    InstanceInterfaceRecord, InstanceRecord, ProjectDescription, ProjectMeta, Section, WireRecord,
};
use orchestra_diagnostics::{Message, Report};
use orchestra_wishbone::{Direction, InterfaceKind};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const CLOCKS: &str = "clocks";
const COMPONENTS: &str = "Components";
const WIRE: &str = "Wire";

/// A system-on-chip project.
///
/// The description is the persisted state. [`Project::check`] resolves it
/// against a component library into a [`Linkage`]; any mutation drops the
/// linkage until the next check.
#[derive(Debug)]
pub struct Project {
    description: ProjectDescription,
    path: Option<PathBuf>,
    linkage: Option<Linkage>,
    report: Report,
}

impl Project {
    /// Creates an empty project.
    pub fn new(name: &str) -> Result<Self, ProjectError> {
        let name = valid_name(name)?;
        let description = ProjectDescription {
            project: ProjectMeta {
                name,
                ..ProjectMeta::default()
            },
            ..ProjectDescription::default()
        };
        Ok(Self::from_description(description))
    }

    /// Wraps a loaded description.
    pub fn from_description(description: ProjectDescription) -> Self {
        Self {
            description,
            path: None,
            linkage: None,
            report: Report::new(),
        }
    }

    /// Loads the project file at `path`.
    pub fn open(path: &Path) -> Result<Self, ProjectError> {
        let description = load_project(path)?;
        tracing::debug!(
            "opened project '{}' from {}",
            description.project.name,
            path.display()
        );
        let mut project = Self::from_description(description);
        project.path = Some(path.to_path_buf());
        Ok(project)
    }

    /// Writes the project back to the file it was opened from or last saved to.
    pub fn save(&self) -> Result<(), ProjectError> {
        match &self.path {
            Some(path) => Ok(save_project(path, &self.description)?),
            None => Err(ProjectError::NoPath),
        }
    }

    /// Writes the project to `path` and remembers it.
    pub fn save_as(&mut self, path: &Path) -> Result<(), ProjectError> {
        save_project(path, &self.description)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// The project name.
    pub fn name(&self) -> &str {
        &self.description.project.name
    }

    /// The persisted description.
    pub fn description(&self) -> &ProjectDescription {
        &self.description
    }

    /// The project file, once known.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // ========================================================================
    // Set management
    // ========================================================================

    /// Adds a wire.
    pub fn add_wire(&mut self, name: &str, kind: &str) -> Result<(), ProjectError> {
        let name = valid_name(name)?;
        let record = WireRecord {
            name: name.clone(),
            kind: kind.to_string(),
        };
        self.description
            .wires
            .insert(record)
            .map_err(|_| ProjectError::DuplicateWire(name))?;
        self.invalidate();
        Ok(())
    }

    /// Removes a wire. Interfaces linked to it become unlinked.
    pub fn remove_wire(&mut self, name: &str) -> Result<(), ProjectError> {
        self.description
            .wires
            .remove(name)
            .ok_or_else(|| ProjectError::UnknownWire(name.to_string()))?;
        for iface in self.linked_to(name) {
            iface.link = None;
        }
        self.invalidate();
        Ok(())
    }

    /// Adds a clock domain.
    pub fn add_clock(
        &mut self,
        name: &str,
        frequency: Frequency,
        generator: ClockGenerator,
    ) -> Result<(), ProjectError> {
        let name = valid_name(name)?;
        if RESERVED_CLOCK_NAMES.contains(&name.as_str()) {
            return Err(ProjectError::ReservedClock(name));
        }
        let record = ClockRecord {
            name: name.clone(),
            frequency,
            generator,
        };
        self.description
            .clocks
            .insert(record)
            .map_err(|_| ProjectError::DuplicateClock(name))?;
        self.invalidate();
        Ok(())
    }

    /// Removes a clock domain that no instance links to.
    pub fn remove_clock(&mut self, name: &str) -> Result<(), ProjectError> {
        if !self.description.clocks.contains(name) {
            return Err(ProjectError::UnknownClock(name.to_string()));
        }
        let user = self.description.instances.iter().find(|i| {
            i.interfaces
                .iter()
                .any(|f| f.link.as_deref().is_some_and(|l| l.eq_ignore_ascii_case(name)))
        });
        if let Some(user) = user {
            return Err(ProjectError::ClockInUse {
                clock: name.to_ascii_lowercase(),
                instance: user.name.clone(),
            });
        }
        self.description.clocks.remove(name);
        self.invalidate();
        Ok(())
    }

    /// Adds an instance of `component`, with one unlinked entry per
    /// interface of the component.
    pub fn add_instance(&mut self, name: &str, component: &Component) -> Result<(), ProjectError> {
        let name = valid_name(name)?;
        if self.description.instances.contains(&name) {
            return Err(ProjectError::DuplicateInstance(name));
        }
        let mut interfaces = Section::new();
        for iface in component.interfaces() {
            let _ = interfaces.insert(InstanceInterfaceRecord {
                name: iface.name.clone(),
                link: None,
                offset: None,
            });
        }
        let record = InstanceRecord {
            name: name.clone(),
            component: component.name().to_string(),
            generics: Default::default(),
            interfaces,
        };
        self.description
            .instances
            .insert(record)
            .map_err(|_| ProjectError::DuplicateInstance(name.clone()))?;
        tracing::debug!("project '{}': added instance '{name}'", self.name());
        self.invalidate();
        Ok(())
    }

    /// Removes an instance.
    pub fn remove_instance(&mut self, name: &str) -> Result<(), ProjectError> {
        self.description
            .instances
            .remove(name)
            .ok_or_else(|| ProjectError::UnknownInstance(name.to_string()))?;
        self.invalidate();
        Ok(())
    }

    /// Looks up an instance record by name.
    pub fn find_instance(&self, name: &str) -> Option<&InstanceRecord> {
        self.description.instances.get(name)
    }

    /// Overrides a generic of an instance.
    pub fn set_generic(&mut self, instance: &str, generic: &str, value: &str) -> Result<(), ProjectError> {
        let record = self.instance_mut(instance)?;
        record
            .generics
            .insert(generic.to_ascii_lowercase(), value.to_string());
        self.invalidate();
        Ok(())
    }

    /// Links an instance interface to a wire or clock domain, and sets the
    /// base address of a slave interface.
    pub fn connect(
        &mut self,
        instance: &str,
        interface: &str,
        link: &str,
        offset: Option<u64>,
    ) -> Result<(), ProjectError> {
        let link = link.to_ascii_lowercase();
        if !self.description.wires.contains(&link) && !self.description.clocks.contains(&link) {
            return Err(ProjectError::UnknownWire(link));
        }
        let record = self.instance_mut(instance)?;
        let iface = match record.interfaces.get_mut(interface) {
            Some(iface) => iface,
            None => {
                let _ = record.interfaces.insert(InstanceInterfaceRecord {
                    name: interface.to_ascii_lowercase(),
                    link: None,
                    offset: None,
                });
                record
                    .interfaces
                    .get_mut(interface)
                    .ok_or_else(|| ProjectError::UnknownInterface {
                        instance: instance.to_string(),
                        interface: interface.to_string(),
                    })?
            }
        };
        iface.link = Some(link);
        if offset.is_some() {
            iface.offset = offset;
        }
        self.invalidate();
        Ok(())
    }

    /// Clears the link and offset of an instance interface.
    pub fn disconnect(&mut self, instance: &str, interface: &str) -> Result<(), ProjectError> {
        let record = self.instance_mut(instance)?;
        let iface = record
            .interfaces
            .get_mut(interface)
            .ok_or_else(|| ProjectError::UnknownInterface {
                instance: instance.to_string(),
                interface: interface.to_string(),
            })?;
        iface.link = None;
        iface.offset = None;
        self.invalidate();
        Ok(())
    }

    fn instance_mut(&mut self, name: &str) -> Result<&mut InstanceRecord, ProjectError> {
        self.description
            .instances
            .get_mut(name)
            .ok_or_else(|| ProjectError::UnknownInstance(name.to_string()))
    }

    fn linked_to<'a>(&'a mut self, link: &'a str) -> impl Iterator<Item = &'a mut InstanceInterfaceRecord> + 'a {
        self.description
            .instances
            .iter_mut()
            .flat_map(|i| i.interfaces.iter_mut())
            .filter(move |f| f.link.as_deref().is_some_and(|l| l.eq_ignore_ascii_case(link)))
    }

    fn invalidate(&mut self) {
        self.linkage = None;
    }

    // ========================================================================
    // Linking
    // ========================================================================

    /// Resolves every instance against `library`, rebuilds the linkage and
    /// returns the report.
    ///
    /// The linkage is kept only when the report holds no error.
    pub fn check(&mut self, library: &mut ComponentLibrary) -> &Report {
        let (report, linkage) = Linker::new(&self.description).run(library);
        tracing::info!(
            "project '{}': {} error(s), {} warning(s)",
            self.name(),
            report.error_count(),
            report.warning_count()
        );
        self.linkage = (!report.has_errors()).then_some(linkage);
        self.report = report;
        &self.report
    }

    /// `true` if the last check passed and nothing changed since.
    pub fn is_valid(&self) -> bool {
        self.linkage.is_some()
    }

    /// The report of the last check.
    pub fn last_errors(&self) -> &Report {
        &self.report
    }

    /// The linkage of the last successful check.
    pub fn linkage(&self) -> Option<&Linkage> {
        self.linkage.as_ref()
    }
}

fn valid_name(name: &str) -> Result<String, ProjectError> {
    let lower = name.trim().to_ascii_lowercase();
    if is_vhdl_identifier(&lower) {
        Ok(lower)
    } else {
        Err(ProjectError::InvalidName(name.to_string()))
    }
}

/// One run of the project check.
struct Linker<'a> {
    description: &'a ProjectDescription,
    report: Report,
    linkage: Linkage,
    component_errors: Vec<Message>,
    component_warnings: Vec<Message>,
}

impl<'a> Linker<'a> {
    fn new(description: &'a ProjectDescription) -> Self {
        Self {
            description,
            report: Report::new(),
            linkage: Linkage::new(&description.project.name),
            component_errors: Vec::new(),
            component_warnings: Vec::new(),
        }
    }

    fn run(mut self, library: &mut ComponentLibrary) -> (Report, Linkage) {
        self.check_clocks();
        for wire in self.description.wires.iter() {
            self.linkage.wires.push(WireLink::new(&wire.name, &wire.kind));
        }

        let mut seen_bases = HashSet::new();
        if self.description.instances.is_empty() {
            self.component_errors
                .push(Message::error("No components in project."));
        }
        let description = self.description;
        for record in description.instances.iter() {
            self.link_instance(record, library, &mut seen_bases);
        }
        let errors = std::mem::take(&mut self.component_errors);
        let warnings = std::mem::take(&mut self.component_warnings);
        self.report.extend(COMPONENTS, errors.into_iter().chain(warnings));

        self.check_wires();
        (self.report, self.linkage)
    }

    fn check_clocks(&mut self) {
        let description = self.description;
        if description.clocks.is_empty() {
            self.report.error(CLOCKS, "No clock domain defined.");
        }
        for clock in description.clocks.iter() {
            if !clock.frequency.is_valid() {
                self.report.error(
                    CLOCKS,
                    format!("Clock '{}' has bad frequency value.", clock.name),
                );
            }
            if RESERVED_CLOCK_NAMES.contains(&clock.name.to_ascii_lowercase().as_str()) {
                self.report.error(
                    CLOCKS,
                    format!("Clock '{}' uses a reserved top-level name.", clock.name),
                );
            }
            self.linkage.clocks.push(ClockLink {
                name: clock.name.to_ascii_lowercase(),
                frequency: clock.frequency,
                generator: clock.generator,
                interfaces: Vec::new(),
            });
        }
    }

    fn link_instance(
        &mut self,
        record: &InstanceRecord,
        library: &mut ComponentLibrary,
        seen_bases: &mut HashSet<String>,
    ) {
        let component = match library.find(&record.component) {
            Ok(component) => component,
            Err(ComponentError::NotFound { base, .. }) => {
                self.component_errors
                    .push(Message::error(format!("Component '{base}' don't exist.")));
                return;
            }
            Err(e) => {
                self.report
                    .error(&format!("IP {}", record.component), format!("{e}."));
                return;
            }
        };
        if seen_bases.insert(component.name().to_ascii_lowercase()) {
            self.report.extend(
                &format!("IP {}", component.name()),
                component.last_errors().iter().cloned(),
            );
        }

        let mut instance = Instance::new(&record.name, component, record.generics.clone());
        self.report
            .extend(&format!("Component {}", instance.name()), instance.check());
        if instance.entity().is_some() {
            self.link_interfaces(record, &mut instance);
        }
        tracing::debug!("linked instance '{}' ({})", instance.name(), instance.base());
        self.linkage.instances.push(instance);
    }

    fn link_interfaces(&mut self, record: &InstanceRecord, instance: &mut Instance) {
        let name = instance.name().to_string();
        let mut declared = HashSet::new();

        for rec in record.interfaces.iter() {
            let key = rec.name.to_ascii_lowercase();
            if !declared.insert(key.clone()) {
                self.component_errors.push(Message::error(format!(
                    "Component '{name}', duplicate interface '{key}' declaration."
                )));
                continue;
            }
            let Some(iface) = instance.interface(&key) else {
                self.component_errors.push(Message::error(format!(
                    "Component '{name}', interface '{key}' not present in base IP '{}'.",
                    instance.base()
                )));
                continue;
            };
            let kind = iface.kind;
            let what = kind.describe();
            let iref = InterfaceRef::new(&name, &iface.name);
            let drives_clock = kind == InterfaceKind::ClockReset
                && iface.ports.iter().any(|p| p.direction == Direction::Out);

            if rec.offset.is_some() && kind != InterfaceKind::Slave {
                self.component_warnings.push(Message::warning(format!(
                    "Component '{name}', {what} interface '{key}' unused parameter OFFSET."
                )));
            }

            match kind {
                InterfaceKind::Export => self.linkage.externals.push(iref),
                InterfaceKind::ClockReset => {
                    if drives_clock {
                        self.component_errors.push(Message::error(format!(
                            "Component '{name}', clock interface '{key}' drives its clock; only clock inputs can be linked."
                        )));
                        continue;
                    }
                    let Some(link) = rec.link.as_deref() else {
                        self.not_connected(&name, what, &key);
                        continue;
                    };
                    match self
                        .linkage
                        .clocks
                        .iter_mut()
                        .find(|c| c.name.eq_ignore_ascii_case(link))
                    {
                        Some(clock) => clock.interfaces.push(iref),
                        None => self.component_errors.push(Message::error(format!(
                            "Component '{name}', clock interface '{key}' connected to unavailable clock '{link}'."
                        ))),
                    }
                }
                InterfaceKind::Master | InterfaceKind::Slave => {
                    let Some(link) = rec.link.as_deref() else {
                        self.not_connected(&name, what, &key);
                        continue;
                    };
                    let Some(wire) = self
                        .linkage
                        .wires
                        .iter_mut()
                        .find(|w| w.name.eq_ignore_ascii_case(link))
                    else {
                        self.component_errors.push(Message::error(format!(
                            "Component '{name}', {what} interface '{key}' connected to unavailable bus '{link}'."
                        )));
                        continue;
                    };
                    if kind == InterfaceKind::Master {
                        wire.masters.push(iref);
                    } else if let Some(offset) = rec.offset {
                        wire.slaves.push(iref);
                        instance.set_offset(&key, offset);
                    } else {
                        self.component_errors.push(Message::error(format!(
                            "Component '{name}', slave interface '{key}' has no OFFSET."
                        )));
                    }
                }
            }
        }

        for iface in instance.interfaces() {
            if declared.contains(&iface.name) {
                continue;
            }
            if iface.kind == InterfaceKind::Export {
                self.component_warnings.push(Message::warning(format!(
                    "Component '{name}', globals interface '{}' not used.",
                    iface.name
                )));
                self.linkage
                    .externals
                    .push(InterfaceRef::new(&name, &iface.name));
            } else {
                self.not_connected(&name, iface.kind.describe(), &iface.name);
            }
        }
    }

    fn not_connected(&mut self, instance: &str, what: &str, interface: &str) {
        self.component_errors.push(Message::error(format!(
            "Component '{instance}', {what} interface '{interface}' not connected."
        )));
    }

    fn check_wires(&mut self) {
        if self.description.wires.is_empty() {
            self.report.error(WIRE, "No wire defined.");
        }
        let instances = &self.linkage.instances;
        for wire in self.linkage.wires.iter_mut() {
            if wire.masters.is_empty() {
                self.report
                    .error(WIRE, format!("Wire '{}' has no master.", wire.name));
            }
            if wire.slaves.is_empty() {
                self.report
                    .error(WIRE, format!("Wire '{}' has no slave.", wire.name));
            }
            if wire.masters.len() > 1 {
                self.report.warning(
                    WIRE,
                    format!(
                        "Wire '{}' has {} masters; only single-master wires can be compiled.",
                        wire.name,
                        wire.masters.len()
                    ),
                );
            }
            if wire.slaves.is_empty() {
                continue;
            }
            let Some(master) = wire.single_master() else {
                continue;
            };
            match address_map(instances, &wire.name, master, &wire.slaves) {
                Ok(map) => {
                    let errors = map.validate();
                    if errors.is_empty() {
                        tracing::debug!(
                            "wire '{}': {} slave window(s) decoded",
                            wire.name,
                            map.windows.len()
                        );
                    }
                    self.report.extend(WIRE, errors.into_iter().map(Message::error));
                    wire.address_map = Some(map);
                }
                Err(errors) => self.report.extend(WIRE, errors.into_iter().map(Message::error)),
            }
        }
    }
}

/// Evaluates the geometry of a wire's master and slaves into an address map.
fn address_map(
    instances: &[Instance],
    wire: &str,
    master: &InterfaceRef,
    slaves: &[InterfaceRef],
) -> Result<AddressMap, Vec<String>> {
    let geometry = |iref: &InterfaceRef| -> Result<(u64, BusGeometry), String> {
        let instance = instances
            .iter()
            .find(|i| i.name() == iref.instance)
            .ok_or_else(|| format!("Wire '{wire}': unknown instance '{}'.", iref.instance))?;
        let iface = instance
            .interface(&iref.interface)
            .ok_or_else(|| format!("Wire '{wire}': unknown interface '{iref}'."))?;
        let geometry =
            BusGeometry::of(instance, iface).map_err(|e| format!("Wire '{wire}': {e}."))?;
        Ok((instance.offset(&iref.interface).unwrap_or(0), geometry))
    };

    let (_, master_geometry) = geometry(master).map_err(|e| vec![e])?;
    let mut map = AddressMap::new(wire, master_geometry);
    let mut errors = Vec::new();
    for slave in slaves {
        match geometry(slave) {
            Ok((offset, g)) => {
                if let Err(e) = map.add_slave(&slave.instance, &slave.interface, offset, g) {
                    errors.push(e);
                }
            }
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(map)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orchestra_component::MemoryBundle;
    use orchestra_config::{ComponentDescription, HdlFileRecord};

    const CPU: &str = "
entity cpu is
  port (
    clk       : in  std_logic;
    reset     : in  std_logic;
    wbm_adr_o : out std_logic_vector(7 downto 0);
    wbm_dat_i : in  std_logic_vector(7 downto 0);
    wbm_dat_o : out std_logic_vector(7 downto 0);
    wbm_we_o  : out std_logic;
    wbm_ack_i : in  std_logic;
    wbm_cyc_o : out std_logic;
    wbm_stb_o : out std_logic
  );
end entity;";

    const RAM: &str = "
entity ram is
  generic (addr_width : natural := 4);
  port (
    clk       : in  std_logic;
    reset     : in  std_logic;
    wbs_adr_i : in  std_logic_vector(addr_width - 1 downto 0);
    wbs_dat_i : in  std_logic_vector(7 downto 0);
    wbs_dat_o : out std_logic_vector(7 downto 0);
    wbs_we_i  : in  std_logic;
    wbs_ack_o : out std_logic;
    wbs_cyc_i : in  std_logic;
    wbs_stb_i : in  std_logic;
    gls_led   : out std_logic
  );
end entity;";

    fn component(name: &str, text: &str) -> Component {
        let file = format!("{name}.vhd");
        let mut desc = ComponentDescription::default();
        desc.component.name = name.into();
        let _ = desc.hdl_files.insert(HdlFileRecord {
            name: file.clone(),
            scope: "all".into(),
            order: 1,
            top: false,
        });
        let mut c = Component::from_description(
            desc,
            Box::new(MemoryBundle::new().with_file(&file, text)),
        );
        c.set_top(&file).unwrap();
        assert!(c.check().is_empty(), "{:?}", c.last_errors());
        c
    }

    fn library() -> ComponentLibrary {
        let mut library = ComponentLibrary::new("/nonexistent");
        library.insert(component("cpu", CPU));
        library.insert(component("ram", RAM));
        library
    }

    /// A clean master/slave project on one wire.
    fn soc(library: &mut ComponentLibrary) -> Project {
        let mut p = Project::new("soc").unwrap();
        p.add_clock("sys", Frequency::new(50_000_000), ClockGenerator::Static)
            .unwrap();
        p.add_wire("main", "wishbone").unwrap();
        let cpu = library.find("cpu").unwrap();
        let ram = library.find("ram").unwrap();
        p.add_instance("cpu0", &cpu).unwrap();
        p.add_instance("ram0", &ram).unwrap();
        p.connect("cpu0", "default", "sys", None).unwrap();
        p.connect("cpu0", "wbm_noname", "main", None).unwrap();
        p.connect("ram0", "default", "sys", None).unwrap();
        p.connect("ram0", "wbs_noname", "main", Some(0x10)).unwrap();
        p
    }

    fn count(report: &Report, needle: &str) -> usize {
        report.iter().filter(|(_, m)| m.text.contains(needle)).count()
    }

    #[test]
    fn master_and_slave_check_clean() {
        let mut library = library();
        let mut p = soc(&mut library);
        let report = p.check(&mut library).clone();
        assert!(!report.has_errors(), "{report:?}");
        assert!(p.is_valid());

        let linkage = p.linkage().unwrap();
        let wire = linkage.wire("main").unwrap();
        assert_eq!(wire.masters, vec![InterfaceRef::new("cpu0", "wbm_noname")]);
        assert_eq!(wire.slaves, vec![InterfaceRef::new("ram0", "wbs_noname")]);
        let map = wire.address_map.as_ref().unwrap();
        assert_eq!(map.windows[0].offset, 0x10);
        assert_eq!(map.windows[0].span(), 16);
        assert_eq!(linkage.clock("sys").unwrap().interfaces.len(), 2);
        assert_eq!(linkage.externals, vec![InterfaceRef::new("ram0", "export")]);
        assert_eq!(
            linkage
                .clock_of(&InterfaceRef::new("ram0", "wbs_noname"))
                .map(|c| c.name.as_str()),
            Some("sys")
        );
    }

    #[test]
    fn unlinked_slave_is_not_connected() {
        let mut library = library();
        let mut p = soc(&mut library);
        p.disconnect("ram0", "wbs_noname").unwrap();
        let report = p.check(&mut library);
        assert_eq!(count(report, "not connected"), 1);
        assert!(report.mentions("Component 'ram0', slave interface 'wbs_noname' not connected."));
        assert!(report.mentions("Wire 'main' has no slave."));
        assert!(!p.is_valid());
    }

    #[test]
    fn no_clock_domain() {
        let mut library = library();
        let mut p = soc(&mut library);
        p.disconnect("cpu0", "default").unwrap();
        p.disconnect("ram0", "default").unwrap();
        p.remove_clock("sys").unwrap();
        let report = p.check(&mut library);
        let clocks = report.category("clocks").unwrap();
        assert_eq!(clocks.messages[0].text, "No clock domain defined.");
        assert_eq!(report.categories()[0].name, "clocks");
    }

    #[test]
    fn reset_is_not_a_clock_name() {
        let mut p = Project::new("soc").unwrap();
        for name in ["reset", "RESET", "Reset_On", "reset_off"] {
            assert!(matches!(
                p.add_clock(name, Frequency::new(1_000), ClockGenerator::Static),
                Err(ProjectError::ReservedClock(_))
            ));
        }
        assert!(p.description().clocks.is_empty());
    }

    #[test]
    fn reserved_clock_in_loaded_file_is_reported() {
        let mut library = library();
        let mut p = soc(&mut library);
        let mut description = p.description().clone();
        description
            .clocks
            .insert(ClockRecord {
                name: "Reset".into(),
                frequency: Frequency::new(1_000),
                generator: ClockGenerator::Static,
            })
            .unwrap();
        p = Project::from_description(description);
        let report = p.check(&mut library);
        assert!(report.mentions("Clock 'Reset' uses a reserved top-level name."));
        assert!(report.has_errors());
    }

    #[test]
    fn zero_hz_clock() {
        let mut library = library();
        let mut p = soc(&mut library);
        p.add_clock("dead", Frequency::new(0), ClockGenerator::Static)
            .unwrap();
        let report = p.check(&mut library);
        assert!(report.mentions("Clock 'dead' has bad frequency value."));
    }

    #[test]
    fn empty_project() {
        let mut library = library();
        let mut p = Project::new("empty").unwrap();
        let report = p.check(&mut library);
        assert!(report.mentions("No clock domain defined."));
        assert!(report.mentions("No wire defined."));
        assert!(report.mentions("No components in project."));
        let names: Vec<_> = report.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["clocks", "Components", "Wire"]);
    }

    #[test]
    fn check_is_idempotent() {
        let mut library = library();
        let mut p = soc(&mut library);
        p.disconnect("cpu0", "wbm_noname").unwrap();
        let first = p.check(&mut library).clone();
        let second = p.check(&mut library).clone();
        assert_eq!(first, second);
        assert!(first.has_errors());
    }

    #[test]
    fn missing_component() {
        let mut library = library();
        let mut p = soc(&mut library);
        let uart = component("uart", RAM);
        p.add_instance("uart0", &uart).unwrap();
        let report = p.check(&mut library);
        assert!(report.mentions("Component 'uart' don't exist."));
    }

    #[test]
    fn slave_without_offset() {
        let mut library = library();
        let mut p = soc(&mut library);
        let ram = library.find("ram").unwrap();
        p.add_instance("ram1", &ram).unwrap();
        p.connect("ram1", "default", "sys", None).unwrap();
        p.connect("ram1", "wbs_noname", "main", None).unwrap();
        let report = p.check(&mut library);
        assert!(report.mentions("Component 'ram1', slave interface 'wbs_noname' has no OFFSET."));
    }

    #[test]
    fn overlapping_slaves_are_rejected() {
        let mut library = library();
        let mut p = soc(&mut library);
        let ram = library.find("ram").unwrap();
        p.add_instance("ram1", &ram).unwrap();
        p.connect("ram1", "default", "sys", None).unwrap();
        p.connect("ram1", "wbs_noname", "main", Some(0x10)).unwrap();
        let report = p.check(&mut library);
        assert!(report.mentions("Wire 'main': slaves 'ram0.wbs_noname' and 'ram1.wbs_noname' overlap."));
        assert!(report.category("Wire").is_some());
    }

    #[test]
    fn generic_override_changes_the_window() {
        let mut library = library();
        let mut p = soc(&mut library);
        p.set_generic("ram0", "ADDR_WIDTH", "5").unwrap();
        let report = p.check(&mut library);
        assert!(report.mentions("is not aligned"), "{report:?}");
        p.connect("ram0", "wbs_noname", "main", Some(0x20)).unwrap();
        assert!(!p.check(&mut library).has_errors());
        let linkage = p.linkage().unwrap();
        let map = linkage.wire("main").unwrap().address_map.as_ref().unwrap();
        assert_eq!(map.windows[0].span(), 32);
    }

    #[test]
    fn second_master_is_a_warning() {
        let mut library = library();
        let mut p = soc(&mut library);
        let cpu = library.find("cpu").unwrap();
        p.add_instance("cpu1", &cpu).unwrap();
        p.connect("cpu1", "default", "sys", None).unwrap();
        p.connect("cpu1", "wbm_noname", "main", None).unwrap();
        let report = p.check(&mut library);
        assert!(!report.has_errors(), "{report:?}");
        assert!(report.mentions("Wire 'main' has 2 masters"));
        let wire = p.linkage().unwrap().wire("main").unwrap();
        assert!(wire.address_map.is_none());
    }

    #[test]
    fn offset_on_master_is_a_warning() {
        let mut library = library();
        let mut p = soc(&mut library);
        p.connect("cpu0", "wbm_noname", "main", Some(4)).unwrap();
        let report = p.check(&mut library);
        assert!(!report.has_errors());
        assert!(report.mentions("master interface 'wbm_noname' unused parameter OFFSET."));
    }

    #[test]
    fn unknown_interface_on_instance() {
        let mut library = library();
        let mut p = soc(&mut library);
        p.connect("ram0", "bogus", "main", None).unwrap();
        let report = p.check(&mut library);
        assert!(report.mentions("Component 'ram0', interface 'bogus' not present in base IP 'ram'."));
    }

    #[test]
    fn set_management() {
        let mut library = library();
        let mut p = soc(&mut library);
        assert!(matches!(
            p.add_wire("MAIN", "wishbone"),
            Err(ProjectError::DuplicateWire(_))
        ));
        assert!(matches!(
            p.remove_clock("sys"),
            Err(ProjectError::ClockInUse { .. })
        ));
        assert!(matches!(
            p.add_instance("Ram0", &library.find("ram").unwrap()),
            Err(ProjectError::DuplicateInstance(_))
        ));
        assert!(matches!(p.add_wire("9bad", "wishbone"), Err(ProjectError::InvalidName(_))));
        assert!(p.find_instance("RAM0").is_some());

        p.check(&mut library);
        assert!(p.is_valid());
        p.remove_wire("main").unwrap();
        assert!(!p.is_valid());
        let ram0 = p.find_instance("ram0").unwrap();
        assert_eq!(ram0.interfaces.get("wbs_noname").unwrap().link, None);
        p.remove_instance("ram0").unwrap();
        assert!(p.find_instance("ram0").is_none());
    }

    #[test]
    fn report_serializes() {
        let mut library = library();
        let mut p = Project::new("empty").unwrap();
        let report = p.check(&mut library);
        let json = serde_json::to_string(report).unwrap();
        assert!(json.contains("No clock domain defined."));
    }

    #[test]
    fn save_and_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("project.toml");
        let mut library = library();
        let mut p = soc(&mut library);
        p.save_as(&path).unwrap();
        let mut reopened = Project::open(&path).unwrap();
        assert_eq!(reopened.description(), p.description());
        assert!(!reopened.check(&mut library).has_errors());
    }
}

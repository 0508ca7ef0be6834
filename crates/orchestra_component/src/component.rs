//! The component model: description, bundle and derived top entity.

use crate::bundle::{Bundle, DirBundle};
use crate::error::ComponentError;
use crate::interface::{group_ports, Interface};
use orchestra_config::{
    component_to_string, load_component, ComponentDescription, ComponentMeta, GenericRecord,
    HdlFileRecord, InterfaceRecord, Keyed, PortRecord, Section, COMPONENT_FILE,
};
use orchestra_diagnostics::Message;
use orchestra_vhdl::{parse_entity, Entity};
use orchestra_wishbone::check_signals;
use std::path::{Path, PathBuf};

/// A reusable IP block.
///
/// The description lists the HDL files and records the generics, ports and
/// interfaces of the top entity. The entity itself and the interfaces built
/// from it are derived state, refreshed by [`Component::set_top`] and
/// [`Component::check`].
pub struct Component {
    description: ComponentDescription,
    bundle: Box<dyn Bundle>,
    entity: Option<Entity>,
    interfaces: Vec<Interface>,
    errors: Vec<Message>,
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.description.component.name)
            .field("entity", &self.entity.as_ref().map(|e| &e.name))
            .field("errors", &self.errors.len())
            .finish()
    }
}

impl Component {
    /// Creates an empty component named `name` stored in `bundle`.
    pub fn new(name: &str, bundle: Box<dyn Bundle>) -> Self {
        let description = ComponentDescription {
            component: ComponentMeta {
                name: name.to_string(),
                ..ComponentMeta::default()
            },
            ..ComponentDescription::default()
        };
        Self::from_description(description, bundle)
    }

    /// Wraps an existing description and its bundle.
    pub fn from_description(description: ComponentDescription, bundle: Box<dyn Bundle>) -> Self {
        Self {
            description,
            bundle,
            entity: None,
            interfaces: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Opens the component stored in `dir`.
    pub fn open(dir: &Path) -> Result<Self, ComponentError> {
        let description = load_component(dir)?;
        let bundle = DirBundle::open(dir)
            .map_err(|e| ComponentError::io(format!("cannot open {}", dir.display()), e))?;
        tracing::debug!("opened component '{}' from {}", description.component.name, dir.display());
        Ok(Self::from_description(description, Box::new(bundle)))
    }

    /// Opens the component stored in `dir`, or starts a new one named `name`
    /// there when the directory holds no description yet.
    pub fn open_or_create(dir: &Path, name: &str) -> Result<Self, ComponentError> {
        if dir.join(COMPONENT_FILE).is_file() {
            return Self::open(dir);
        }
        let bundle = DirBundle::create(dir)
            .map_err(|e| ComponentError::io(format!("cannot create {}", dir.display()), e))?;
        tracing::info!("creating component '{name}' in {}", dir.display());
        Ok(Self::new(name, Box::new(bundle)))
    }

    /// Writes the description back into the bundle.
    pub fn save(&mut self) -> Result<(), ComponentError> {
        let text = component_to_string(&self.description)?;
        self.bundle
            .persist(&text)
            .map_err(|e| ComponentError::io("cannot save component description", e))
    }

    /// The component (base) name.
    pub fn name(&self) -> &str {
        &self.description.component.name
    }

    /// The persisted description.
    pub fn description(&self) -> &ComponentDescription {
        &self.description
    }

    /// The component's bundle.
    pub fn bundle(&self) -> &dyn Bundle {
        self.bundle.as_ref()
    }

    /// HDL files sorted by load order.
    pub fn hdl_files(&self) -> Vec<&HdlFileRecord> {
        let mut files: Vec<&HdlFileRecord> = self.description.hdl_files.iter().collect();
        files.sort_by_key(|f| f.order);
        files
    }

    /// The designated top file, if exactly one file is flagged.
    pub fn top_file(&self) -> Option<&HdlFileRecord> {
        let mut tops = self.description.hdl_files.iter().filter(|f| f.top);
        match (tops.next(), tops.next()) {
            (Some(top), None) => Some(top),
            _ => None,
        }
    }

    /// The parsed top entity, once derived.
    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    /// The interfaces derived from the top entity.
    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// Looks up a derived interface by name, case-insensitively.
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
    }

    // ========================================================================
    // HDL files
    // ========================================================================

    /// Designates `name` as the top file and rebuilds generics, ports and
    /// interfaces from its entity.
    pub fn set_top(&mut self, name: &str) -> Result<(), ComponentError> {
        if !self.description.hdl_files.contains(name) {
            return Err(ComponentError::UnknownFile(name.to_string()));
        }
        for file in self.description.hdl_files.iter_mut() {
            file.top = file.name.eq_ignore_ascii_case(name);
        }
        self.clear_derived();

        let entity = self.parse_file(name)?;
        let (interfaces, mut errors) = group_ports(&entity);
        if !errors.is_empty() {
            return Err(errors.remove(0));
        }

        if let Err(e) = self.record_entity(&entity, &interfaces) {
            self.clear_derived();
            return Err(e);
        }

        tracing::info!(
            "component '{}': top entity '{}' with {} interface(s)",
            self.name(),
            entity.name,
            interfaces.len()
        );
        self.entity = Some(entity);
        self.interfaces = interfaces;
        Ok(())
    }

    /// Copies `source` into the bundle as a new HDL file.
    ///
    /// `order` is the 1-based load position; 0 or a position past the end
    /// appends. Files at or after the position move down by one.
    pub fn add_hdl(
        &mut self,
        source: &Path,
        scope: &str,
        order: u32,
        top: bool,
    ) -> Result<(), ComponentError> {
        if !source.is_file() {
            return Err(ComponentError::SourceNotFound(source.to_path_buf()));
        }
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ComponentError::SourceNotFound(source.to_path_buf()))?;
        if self.description.hdl_files.contains(&name) {
            return Err(ComponentError::DuplicateFile(name));
        }

        let data = std::fs::read(source)
            .map_err(|e| ComponentError::io(format!("cannot read {}", source.display()), e))?;
        self.bundle
            .write(&name, &data)
            .map_err(|e| ComponentError::io(format!("cannot store '{name}'"), e))?;

        let count = self.description.hdl_files.len() as u32;
        let order = if order == 0 || order > count { count + 1 } else { order };
        for file in self.description.hdl_files.iter_mut() {
            if file.order >= order {
                file.order += 1;
            }
        }
        let record = HdlFileRecord {
            name: name.clone(),
            scope: scope.to_string(),
            order,
            top: false,
        };
        let index = (order as usize - 1).min(self.description.hdl_files.len());
        if self.description.hdl_files.insert_at(index, record).is_err() {
            return Err(ComponentError::DuplicateFile(name));
        }
        tracing::debug!("component '{}': added '{name}' at order {order}", self.name());

        if top {
            self.set_top(&name)?;
        }
        Ok(())
    }

    /// Removes an HDL file from the component.
    ///
    /// Removing the top file clears generics, ports and interfaces.
    pub fn remove_hdl(&mut self, name: &str) -> Result<(), ComponentError> {
        let record = self
            .description
            .hdl_files
            .remove(name)
            .ok_or_else(|| ComponentError::UnknownFile(name.to_string()))?;
        self.bundle
            .remove(&record.name)
            .map_err(|e| ComponentError::io(format!("cannot remove '{}'", record.name), e))?;

        if record.top {
            self.clear_derived();
        }
        for file in self.description.hdl_files.iter_mut() {
            if file.order > record.order {
                file.order -= 1;
            }
        }
        tracing::debug!("component '{}': removed '{}'", self.name(), record.name);
        Ok(())
    }

    /// Copies every HDL file into `dest_dir` in load order.
    pub fn extract_hdl(&self, dest_dir: &Path) -> Result<Vec<PathBuf>, ComponentError> {
        self.hdl_files()
            .into_iter()
            .map(|file| {
                self.bundle.extract(&file.name, dest_dir).map_err(|e| {
                    ComponentError::io(format!("cannot extract '{}'", file.name), e)
                })
            })
            .collect()
    }

    /// Records the generics, ports and interfaces of a freshly parsed top
    /// entity in the description.
    fn record_entity(&mut self, entity: &Entity, interfaces: &[Interface]) -> Result<(), ComponentError> {
        for generic in &entity.generics {
            let record = GenericRecord {
                name: generic.name.clone(),
                ty: generic.ty.to_string(),
                value: generic.default.clone(),
            };
            record_once(&mut self.description.generics, "generic", record)?;
        }
        for iface in interfaces {
            for port in &iface.ports {
                let record = PortRecord {
                    name: port.port.clone(),
                    interface: iface.name.clone(),
                    role: port.role,
                };
                record_once(&mut self.description.ports, "port", record)?;
            }
            let record = InterfaceRecord {
                name: iface.name.clone(),
                kind: iface.kind,
                clock: iface.clock.clone(),
            };
            record_once(&mut self.description.interfaces, "interface", record)?;
        }
        Ok(())
    }

    fn clear_derived(&mut self) {
        self.description.generics.clear();
        self.description.ports.clear();
        self.description.interfaces.clear();
        self.entity = None;
        self.interfaces.clear();
    }

    fn parse_file(&self, name: &str) -> Result<Entity, ComponentError> {
        let data = self
            .bundle
            .read(name)
            .map_err(|e| ComponentError::io(format!("cannot read '{name}'"), e))?;
        parse_entity(&String::from_utf8_lossy(&data)).map_err(|source| ComponentError::Parse {
            file: name.to_string(),
            source,
        })
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Re-derives the top entity and checks the description against it.
    ///
    /// Returns the collected errors; the component is valid iff the list is
    /// empty. The derived entity and interfaces stay available afterwards
    /// whenever the top file could be parsed.
    pub fn check(&mut self) -> &[Message] {
        let mut errors = Vec::new();
        self.entity = None;
        self.interfaces.clear();

        if let Ok(members) = self.bundle.members() {
            for file in self.description.hdl_files.iter() {
                if !members.iter().any(|m| m.eq_ignore_ascii_case(&file.name)) {
                    errors.push(Message::error(format!(
                        "HDL file '{}' missing from component bundle.",
                        file.name
                    )));
                }
            }
        }

        let tops: Vec<&str> = self
            .description
            .hdl_files
            .iter()
            .filter(|f| f.top)
            .map(|f| f.name.as_str())
            .collect();
        let top = match tops.as_slice() {
            [] => {
                errors.push(Message::error("No top file defined."));
                None
            }
            [only] => Some(only.to_string()),
            many => {
                errors.push(Message::error(format!(
                    "Several top files defined: {}.",
                    many.join(", ")
                )));
                None
            }
        };

        if let Some(top) = top {
            match self.parse_file(&top) {
                Ok(entity) => {
                    let (interfaces, group_errors) = group_ports(&entity);
                    errors.extend(group_errors.iter().map(|e| Message::error(format!("{e}."))));
                    self.check_interfaces(&interfaces, &mut errors);
                    self.check_ports(&entity, &interfaces, &mut errors);
                    self.check_generics(&entity, &mut errors);
                    self.entity = Some(entity);
                    self.interfaces = interfaces;
                }
                Err(e) => errors.push(Message::error(format!("{e}."))),
            }
        }

        if !errors.is_empty() {
            tracing::debug!("component '{}': {} error(s)", self.name(), errors.len());
        }
        self.errors = errors;
        &self.errors
    }

    /// `true` if the last check found errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The errors found by the last check.
    pub fn last_errors(&self) -> &[Message] {
        &self.errors
    }

    fn check_interfaces(&self, derived: &[Interface], errors: &mut Vec<Message>) {
        for declared in self.description.interfaces.iter() {
            let Some(iface) = derived.iter().find(|i| i.name.eq_ignore_ascii_case(&declared.name))
            else {
                errors.push(Message::error(format!(
                    "Interface '{}' has no signal.",
                    declared.name
                )));
                continue;
            };
            if iface.kind != declared.kind {
                errors.push(Message::error(format!(
                    "Interface '{}' declared as {} but its signals are {}.",
                    declared.name, declared.kind, iface.kind
                )));
                continue;
            }
            for violation in check_signals(iface.kind, &iface.signal_uses()) {
                errors.push(Message::error(format!(
                    "Interface '{}': {violation}.",
                    declared.name
                )));
            }
        }
        for iface in derived {
            if !self.description.interfaces.contains(&iface.name) {
                errors.push(Message::error(format!(
                    "Interface '{}' of top entity not declared.",
                    iface.name
                )));
            }
        }
    }

    fn check_ports(&self, entity: &Entity, derived: &[Interface], errors: &mut Vec<Message>) {
        for declared in self.description.ports.iter() {
            if entity.port(&declared.name).is_none() {
                errors.push(Message::error(format!(
                    "Port '{}' not present in top entity.",
                    declared.name
                )));
                continue;
            }
            let classified = derived.iter().find_map(|i| {
                i.ports
                    .iter()
                    .find(|p| p.port.eq_ignore_ascii_case(&declared.name))
                    .map(|p| (i.name.as_str(), p.role))
            });
            if let Some((iface, role)) = classified {
                if !iface.eq_ignore_ascii_case(&declared.interface) || role != declared.role {
                    errors.push(Message::error(format!(
                        "Port '{}' declared as {} of '{}' but classifies as {role} of '{iface}'.",
                        declared.name, declared.role, declared.interface
                    )));
                }
            }
        }
        for port in &entity.ports {
            if !self.description.ports.contains(&port.name) {
                errors.push(Message::error(format!(
                    "Port '{}' of top entity not declared.",
                    port.name
                )));
            }
        }
    }

    fn check_generics(&self, entity: &Entity, errors: &mut Vec<Message>) {
        for declared in self.description.generics.iter() {
            if entity.generic(&declared.name).is_none() {
                errors.push(Message::error(format!(
                    "Generic '{}' not present in top entity.",
                    declared.name
                )));
            }
        }
        for generic in &entity.generics {
            if !self.description.generics.contains(&generic.name) {
                errors.push(Message::error(format!(
                    "Generic '{}' of top entity not declared.",
                    generic.name
                )));
            }
        }
    }
}

fn record_once<T: Keyed>(section: &mut Section<T>, what: &'static str, record: T) -> Result<(), ComponentError> {
    section
        .insert(record)
        .map_err(|r| ComponentError::DuplicateDeclaration {
            what,
            name: r.key().to_string(),
        })
}

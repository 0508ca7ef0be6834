//! Component instances and their generic bindings.

use crate::error::ProjectError;
use orchestra_component::{Component, Interface};
use orchestra_diagnostics::Message;
use orchestra_vhdl::{parse_expression, Entity};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Generic values may reference other generics; this bounds the chain.
const MAX_GENERIC_DEPTH: usize = 16;

/// A component bound into a project under a unique name.
#[derive(Debug, Clone)]
pub struct Instance {
    name: String,
    component: Rc<Component>,
    overrides: BTreeMap<String, String>,
    offsets: BTreeMap<String, u64>,
}

impl Instance {
    /// Binds `component` as `name` with the given generic overrides.
    pub fn new(name: &str, component: Rc<Component>, overrides: BTreeMap<String, String>) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            component,
            overrides: overrides
                .into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v))
                .collect(),
            offsets: BTreeMap::new(),
        }
    }

    /// The instance name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base component name.
    pub fn base(&self) -> &str {
        self.component.name()
    }

    /// The backing component.
    pub fn component(&self) -> &Component {
        &self.component
    }

    /// The component's top entity, if it could be parsed.
    pub fn entity(&self) -> Option<&Entity> {
        self.component.entity()
    }

    /// The component's interfaces.
    pub fn interfaces(&self) -> &[Interface] {
        self.component.interfaces()
    }

    /// Looks up an interface by name.
    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.component.interface(name)
    }

    /// The generic overrides, by lowercase name.
    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.overrides
    }

    /// Records the base address of a slave interface.
    pub fn set_offset(&mut self, interface: &str, offset: u64) {
        self.offsets.insert(interface.to_ascii_lowercase(), offset);
    }

    /// The base address of a slave interface.
    pub fn offset(&self, interface: &str) -> Option<u64> {
        self.offsets.get(&interface.to_ascii_lowercase()).copied()
    }

    /// The value text bound to a generic: the override, else the entity default.
    pub fn generic_value(&self, name: &str) -> Option<&str> {
        let key = name.to_ascii_lowercase();
        if let Some(value) = self.overrides.get(&key) {
            return Some(value);
        }
        self.entity()?.generic(&key)?.default.as_deref()
    }

    /// Evaluates a generic to an integer.
    pub fn generic_int(&self, name: &str) -> Result<i64, ProjectError> {
        self.eval_generic(name, 0)
    }

    fn eval_generic(&self, name: &str, depth: usize) -> Result<i64, ProjectError> {
        let error = |message: String| ProjectError::Generic {
            instance: self.name.clone(),
            generic: name.to_ascii_lowercase(),
            message,
        };
        if depth > MAX_GENERIC_DEPTH {
            return Err(error("generic values reference each other in a cycle".into()));
        }
        let known = self.overrides.contains_key(&name.to_ascii_lowercase())
            || self.entity().is_some_and(|e| e.generic(name).is_some());
        if !known {
            return Err(error("no such generic".into()));
        }
        let text = self
            .generic_value(name)
            .ok_or_else(|| error("no value bound".into()))?;
        let expr = parse_expression(text)
            .map_err(|_| error(format!("value '{text}' is not an integer")))?;
        expr.eval(&|n: &str| self.eval_generic(n, depth + 1).ok())
            .map_err(|e| error(e.to_string()))
    }

    /// Evaluates the width of a port of the top entity under this
    /// instance's generic bindings.
    pub fn port_width(&self, port: &str) -> Result<u64, ProjectError> {
        let decl = self
            .entity()
            .and_then(|e| e.port(port))
            .ok_or_else(|| ProjectError::UnknownPort {
                instance: self.name.clone(),
                port: port.to_string(),
            })?;
        decl.width(&|n: &str| self.eval_generic(n, 0).ok())
            .map_err(|source| ProjectError::Width {
                instance: self.name.clone(),
                port: decl.name.clone(),
                source,
            })
    }

    /// Checks the generic overrides and every port width.
    pub fn check(&self) -> Vec<Message> {
        let mut messages = Vec::new();
        let Some(entity) = self.entity() else {
            return messages;
        };
        for name in self.overrides.keys() {
            if entity.generic(name).is_none() {
                messages.push(Message::error(format!(
                    "Generic '{name}' not present in component '{}'.",
                    self.base()
                )));
            }
        }
        for port in &entity.ports {
            match self.port_width(&port.name) {
                Ok(0) => messages.push(Message::error(format!(
                    "Port '{}' has a null range.",
                    port.name
                ))),
                Ok(_) => {}
                Err(ProjectError::Width { source, .. }) => messages.push(Message::error(format!(
                    "Port '{}': cannot evaluate width: {source}.",
                    port.name
                ))),
                Err(e) => messages.push(Message::error(format!("{e}."))),
            }
        }
        messages
    }
}

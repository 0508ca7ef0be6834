//! The component library: a directory of component bundles with a load cache.

use crate::component::Component;
use crate::error::ComponentError;
use orchestra_config::COMPONENT_FILE;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Components found under `<root>/<base>/component.toml`.
///
/// Components are loaded and checked on first use and cached by lowercase
/// base name for the lifetime of the library value.
#[derive(Debug)]
pub struct ComponentLibrary {
    root: PathBuf,
    cache: HashMap<String, Rc<Component>>,
}

impl ComponentLibrary {
    /// Creates a library rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    /// The library directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding component `base`.
    pub fn component_dir(&self, base: &str) -> PathBuf {
        self.root.join(base)
    }

    /// Returns the checked component `base`, loading it on first use.
    pub fn find(&mut self, base: &str) -> Result<Rc<Component>, ComponentError> {
        let key = base.to_ascii_lowercase();
        if let Some(component) = self.cache.get(&key) {
            return Ok(Rc::clone(component));
        }

        let dir = self.component_dir(base);
        if !dir.join(COMPONENT_FILE).is_file() {
            return Err(ComponentError::NotFound {
                base: base.to_string(),
                path: dir,
            });
        }
        let mut component = Component::open(&dir)?;
        component.check();
        if component.has_errors() {
            tracing::warn!(
                "component '{base}' loaded with {} error(s)",
                component.last_errors().len()
            );
        } else {
            tracing::debug!("component '{base}' loaded");
        }
        Ok(self.insert(component))
    }

    /// Adds an already built component to the cache under its own name.
    pub fn insert(&mut self, component: Component) -> Rc<Component> {
        let rc = Rc::new(component);
        self.cache
            .insert(rc.name().to_ascii_lowercase(), Rc::clone(&rc));
        rc
    }

    /// Drops every cached component.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Base names of the components available on disk, sorted.
    pub fn available(&self) -> Result<Vec<String>, ComponentError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| {
            ComponentError::io(format!("cannot list {}", self.root.display()), e)
        })?;
        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.join(COMPONENT_FILE).is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::MemoryBundle;

    const BLINK: &str = "entity blink is port (clk, reset : in std_logic; led : out std_logic); end;";

    fn write_component(root: &Path, base: &str) {
        let tmp_src = root.join(format!("{base}.src.vhd"));
        std::fs::write(&tmp_src, BLINK).unwrap();
        let mut c = Component::open_or_create(&root.join(base), base).unwrap();
        c.add_hdl(&tmp_src, "all", 0, true).unwrap();
        c.save().unwrap();
        std::fs::remove_file(tmp_src).unwrap();
    }

    #[test]
    fn find_loads_and_caches() {
        let tmp = tempfile::TempDir::new().unwrap();
        write_component(tmp.path(), "blink");
        let mut lib = ComponentLibrary::new(tmp.path());
        let first = lib.find("blink").unwrap();
        assert!(!first.has_errors(), "{:?}", first.last_errors());
        assert_eq!(first.interfaces().len(), 2);
        let second = lib.find("BLINK").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(lib.available().unwrap(), vec!["blink"]);
    }

    #[test]
    fn missing_component() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut lib = ComponentLibrary::new(tmp.path());
        assert!(matches!(
            lib.find("nothing"),
            Err(ComponentError::NotFound { .. })
        ));
    }

    #[test]
    fn inserted_components_are_found() {
        let mut lib = ComponentLibrary::new("/nonexistent");
        lib.insert(Component::new("Mem", Box::new(MemoryBundle::new())));
        assert_eq!(lib.find("mem").unwrap().name(), "Mem");
        lib.clear();
        assert!(lib.find("mem").is_err());
    }
}

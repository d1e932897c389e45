//! Ordered registry of declared build targets.

use crate::model::{AttributeAccess, BuildTarget};
use log::debug;
use mlua::{MetaMethod, UserData, UserDataMethods};
use std::cell::RefCell;
use std::rc::Rc;

/// Registry shared between the Lua runtime and the host.
pub type SharedRegistry = Rc<RefCell<Registry>>;

/// Build targets in declaration order.
///
/// Names are not deduplicated: two targets with the same name are two
/// separate jobs.
#[derive(Debug, Default)]
pub struct Registry {
    targets: Vec<BuildTarget>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry ready to be shared with a Lua state.
    pub fn shared() -> SharedRegistry {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Append a new target and return its index.
    pub fn register(&mut self, name: impl Into<String>) -> usize {
        let target = BuildTarget::new(name);
        debug!("    (Debug) registering pdf '{}'", target.name());
        self.targets.push(target);
        self.targets.len() - 1
    }

    /// All targets in declaration order.
    pub fn all(&self) -> &[BuildTarget] {
        &self.targets
    }

    /// Target at `index`.
    pub fn get(&self, index: usize) -> Option<&BuildTarget> {
        self.targets.get(index)
    }

    /// Mutable target at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut BuildTarget> {
        self.targets.get_mut(index)
    }

    /// Hand every target over for execution, leaving the registry empty.
    pub fn take_all(&mut self) -> Vec<BuildTarget> {
        std::mem::take(&mut self.targets)
    }

    /// Number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if no target is registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Script-side handle to one registered target.
///
/// Supports `t.key`, `t.key = v`, `t { ... }` and `tostring(t)`.
#[derive(Debug, Clone)]
pub struct TargetHandle {
    registry: SharedRegistry,
    index: usize,
}

impl TargetHandle {
    /// Register a target and return its handle.
    pub fn register(registry: &SharedRegistry, name: impl Into<String>) -> Self {
        let index = registry.borrow_mut().register(name);
        Self {
            registry: registry.clone(),
            index,
        }
    }

    /// Bulk-assign attributes from a script table.
    pub fn apply_attributes(&self, attributes: &mlua::Table) -> mlua::Result<()> {
        self.with_target(|target| target.apply_attributes(attributes))?
            .map_err(mlua::Error::external)
    }

    fn with_target<R>(&self, f: impl FnOnce(&mut BuildTarget) -> R) -> mlua::Result<R> {
        let mut registry = self.registry.borrow_mut();
        let target = registry.get_mut(self.index).ok_or_else(|| {
            mlua::Error::runtime("pdf target is no longer available (recipe already executed)")
        })?;
        Ok(f(target))
    }
}

impl UserData for TargetHandle {
    fn add_methods<M: UserDataMethods<Self>>(methods: &mut M) {
        methods.add_meta_method(MetaMethod::Index, |_, this, key: String| {
            this.with_target(|target| target.get(&key))
        });

        methods.add_meta_method(
            MetaMethod::NewIndex,
            |_, this, (key, value): (String, mlua::Value)| {
                this.with_target(|target| target.set(&key, value))
            },
        );

        methods.add_meta_method(MetaMethod::Call, |_, this, attributes: mlua::Table| {
            this.apply_attributes(&attributes)
        });

        methods.add_meta_method(MetaMethod::ToString, |_, this, ()| {
            this.with_target(|target| format!("pdf({:?})", target.name()))
        });
    }
}

//! Scope execution: makes builder methods callable on an instance for the
//! duration of one block.
//!
//! Setup pushes a [`ScopeFrame`] holding every registered definition; the
//! dispatcher consults the innermost frame first. Teardown pops the frame from
//! [`ScopeGuard`]'s `Drop`, so it also happens when the block returns an error
//! or unwinds.

use indexmap::IndexMap;
use tracing::trace;

use crate::dsl::Registry;
use crate::runtime::{Handler, Instance};
use crate::MzlError;

/// Builder methods visible during one scope, plus the interceptor switch.
#[derive(Clone, Default)]
pub struct ScopeFrame {
    pub(crate) methods: IndexMap<String, Handler>,
    /// Unresolved calls bubble to the nesting chain and delegate when set.
    pub(crate) intercept: bool,
}

impl ScopeFrame {
    /// Snapshot of `registry` for an instance. Opaque instances get no
    /// interceptor.
    pub fn from_registry(registry: &Registry, opaque: bool) -> Self {
        let methods = registry
            .iter()
            .map(|(name, def)| (name.clone(), def.handler.clone()))
            .collect();
        ScopeFrame {
            methods,
            intercept: !opaque,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.methods.keys()
    }

    pub fn intercepts(&self) -> bool {
        self.intercept
    }
}

/// Active scope on an instance; dropping it tears the scope down.
pub struct ScopeGuard<'a> {
    instance: &'a Instance,
    depth: usize,
}

impl<'a> ScopeGuard<'a> {
    pub fn enter(instance: &'a Instance, frame: ScopeFrame) -> Self {
        let mut frames = instance.0.frames.borrow_mut();
        trace!(
            receiver = %instance.describe(),
            methods = frame.methods.len(),
            intercept = frame.intercept,
            "scope setup"
        );
        frames.push(frame);
        let depth = frames.len();
        ScopeGuard { instance, depth }
    }

    /// Nesting depth of this scope on its instance (1 for the outermost).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let mut frames = self.instance.0.frames.borrow_mut();
        frames.truncate(self.depth - 1);
        trace!(receiver = %self.instance.describe(), depth = self.depth, "scope teardown");
    }
}

/// Runs `block` against `instance` with `frame` installed, then tears the
/// frame down. Returns the instance, or the block's error.
pub fn run<F>(instance: &Instance, frame: ScopeFrame, block: F) -> Result<Instance, MzlError>
where
    F: FnOnce(&Instance) -> Result<(), MzlError>,
{
    let _guard = ScopeGuard::enter(instance, frame);
    block(instance)?;
    Ok(instance.clone())
}

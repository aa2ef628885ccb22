//! The per-class builder controller: registration and construction surface.
//!
//! A [`Controller`] owns one class's [`Registry`], its default option
//! groups, after-init hooks, delegate provider and construction settings.
//! Controllers are obtained through [`Class::controller`] and shared: every
//! handle for a class points at the same state.
//!
//! # Example
//! ```rust
//! use mzl::runtime::Class;
//! use mzl::{args, opts, Value};
//!
//! let counter = Class::new("Counter");
//! counter.set_initializer(|inst, _args| {
//!     inst.set("total", 0);
//!     Ok(())
//! });
//! let ctrl = counter.controller();
//! ctrl.def("total", opts! { "persist" => true }, |inst, _args, _block| Ok(inst.get("total")));
//! ctrl.def("add", opts! {}, |inst, args, _block| {
//!     let sum: i64 = args.iter().filter_map(Value::as_int).sum();
//!     let total = inst.get("total").as_int().unwrap_or(0) + sum;
//!     inst.set("total", total);
//!     Ok(Value::from(total))
//! });
//!
//! let built = ctrl.build(|c| {
//!     c.call("add", args![2, 2])?;
//!     Ok(())
//! }).unwrap();
//! assert_eq!(built.call("total", args![]).unwrap(), Value::from(4));
//! assert!(!built.responds_to("add"));
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::debug;

use crate::dsl::inheritance;
use crate::dsl::registry::{Defaults, Registry};
use crate::runtime::{handler, scope, Block, Class, CollectionKind, Handler, Instance, ScopeFrame};
use crate::value::{Args, Options, Value};
use crate::{err_ctx, MzlError};

/// Name of the class-level entry point until renamed.
pub const DEFAULT_ENTRY_POINT: &str = "mzl";

/// Hook run on every instance after construction, before its block.
pub type Hook = Rc<dyn Fn(&Instance) -> Result<(), MzlError>>;

/// Produces the object unresolved calls are forwarded to.
pub type DelegateProvider = Rc<dyn Fn(&Instance) -> Result<Value, MzlError>>;

#[derive(Clone)]
pub(crate) struct ControllerState {
    pub(crate) subject: Class,
    pub(crate) registry: Registry,
    pub(crate) defaults: Defaults,
    pub(crate) hooks: im::Vector<Hook>,
    pub(crate) delegate: Option<DelegateProvider>,
    pub(crate) override_new: bool,
    pub(crate) entry_point: String,
}

impl ControllerState {
    pub(crate) fn empty(subject: Class) -> Self {
        ControllerState {
            subject,
            registry: Registry::new(),
            defaults: Defaults::new(),
            hooks: im::Vector::new(),
            delegate: None,
            override_new: false,
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

/// Shared handle to a class's builder controller.
#[derive(Clone)]
pub struct Controller(pub(crate) Rc<RefCell<ControllerState>>);

impl Controller {
    pub(crate) fn from_state(state: ControllerState) -> Self {
        Controller(Rc::new(RefCell::new(state)))
    }

    /// The class this controller instantiates.
    pub fn subject(&self) -> Class {
        self.0.borrow().subject.clone()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub(crate) fn register(
        &self,
        name: &str,
        handler: Handler,
        options: Options,
        collection: CollectionKind,
    ) -> &Self {
        let mut state = self.0.borrow_mut();
        let persist = options.flag("persist");
        let class = state.subject.name().to_string();
        if state.registry.register(name, handler, options, collection).is_some() {
            debug!(class = %class, name, "builder method redefined");
        }
        debug!(class = %class, name, persist, ?collection, "registered builder method");
        drop(state);
        self
    }

    /// Defines a builder method. `options` are layered over the `"def"`
    /// defaults group; `persist: true` keeps the method on instances after
    /// construction.
    pub fn def<F>(&self, name: &str, options: Options, body: F) -> &Self
    where
        F: Fn(&Instance, Args, Option<Block<'_>>) -> Result<Value, MzlError> + 'static,
    {
        let options = options.over(&self.0.borrow().defaults.get("def"));
        self.register(name, handler(body), options, CollectionKind::None)
    }

    /// Forwards calls that nothing else resolves to the object `provider`
    /// returns for the instance.
    pub fn delegate<F>(&self, provider: F) -> &Self
    where
        F: Fn(&Instance) -> Result<Value, MzlError> + 'static,
    {
        self.0.borrow_mut().delegate = Some(Rc::new(provider));
        self
    }

    pub(crate) fn delegate_provider(&self) -> Option<DelegateProvider> {
        self.0.borrow().delegate.clone()
    }

    /// Appends a hook run after construction. Hooks run in registration order.
    pub fn after_init<F>(&self, hook: F) -> &Self
    where
        F: Fn(&Instance) -> Result<(), MzlError> + 'static,
    {
        self.0.borrow_mut().hooks.push_back(Rc::new(hook));
        self
    }

    /// Routes [`Class::create`] through this controller.
    pub fn override_constructor(&self, enabled: bool) -> &Self {
        let mut state = self.0.borrow_mut();
        if state.override_new != enabled {
            debug!(class = %state.subject.name(), enabled, "constructor override");
        }
        state.override_new = enabled;
        drop(state);
        self
    }

    pub fn is_constructor_overridden(&self) -> bool {
        self.0.borrow().override_new
    }

    /// Renames the class-level entry point used by [`Class::controller_named`].
    pub fn rename(&self, entry_point: &str) -> &Self {
        self.0.borrow_mut().entry_point = entry_point.to_string();
        self
    }

    pub fn entry_point(&self) -> String {
        self.0.borrow().entry_point.clone()
    }

    /// Snapshot of the default option groups.
    pub fn defaults(&self) -> Defaults {
        self.0.borrow().defaults.clone()
    }

    /// Mutable access to the default option groups:
    /// `ctrl.defaults_mut().group("def").insert("persist", true)`.
    pub fn defaults_mut(&self) -> RefMut<'_, Defaults> {
        RefMut::map(self.0.borrow_mut(), |state| &mut state.defaults)
    }

    pub fn registry(&self) -> Ref<'_, Registry> {
        Ref::map(self.0.borrow(), |state| &state.registry)
    }

    /// Registered builder-method names in registration order.
    pub fn dsl_methods(&self) -> Vec<String> {
        self.0.borrow().registry.names()
    }

    pub fn is_persistent(&self, name: &str) -> bool {
        self.0.borrow().registry.is_persistent(name)
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Constructs an instance: runs the class initializer with `args`,
    /// installs persistent builder methods, then runs the hooks.
    pub fn new(&self, args: Args) -> Result<Instance, MzlError> {
        let (subject, persistent, hooks) = {
            let state = self.0.borrow();
            (
                state.subject.clone(),
                state.registry.persistent(),
                state.hooks.clone(),
            )
        };
        let instance = subject.instantiate(args)?;
        for (name, handler) in persistent {
            instance.install_method(name, handler);
        }
        for hook in hooks.iter() {
            hook(&instance)?;
        }
        debug!(class = %subject.name(), "constructed instance");
        Ok(instance)
    }

    /// Constructs an instance and runs `block` in a builder scope on it.
    pub fn new_with<F>(&self, args: Args, block: F) -> Result<Instance, MzlError>
    where
        F: FnOnce(&Instance) -> Result<(), MzlError>,
    {
        let instance = self.new(args)?;
        self.exec(&instance, block)
    }

    /// Shorthand for [`Controller::new_with`] without constructor arguments.
    pub fn build<F>(&self, block: F) -> Result<Instance, MzlError>
    where
        F: FnOnce(&Instance) -> Result<(), MzlError>,
    {
        self.new_with(Args::none(), block)
    }

    /// Runs `block` against `instance` with every builder method visible.
    pub fn exec<F>(&self, instance: &Instance, block: F) -> Result<Instance, MzlError>
    where
        F: FnOnce(&Instance) -> Result<(), MzlError>,
    {
        let frame = ScopeFrame::from_registry(&self.0.borrow().registry, instance.is_opaque());
        scope::run(instance, frame, block)
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("Controller")
            .field("subject", &state.subject)
            .field("methods", &state.registry.names())
            .field("entry_point", &state.entry_point)
            .finish()
    }
}

// ============================================================================
// CLASS AND INSTANCE ENTRY POINTS
// ============================================================================

impl Class {
    /// The builder controller of this class, created (and inherited from the
    /// superclass) on first access.
    pub fn controller(&self) -> Controller {
        inheritance::controller_for(self)
    }

    /// The controller, reached through its (possibly renamed) entry point.
    pub fn controller_named(&self, entry_point: &str) -> Result<Controller, MzlError> {
        let controller = self.controller();
        if controller.entry_point() != entry_point {
            return Err(err_ctx!(
                UnresolvedCall,
                entry_point,
                self.name(),
                "undefined method '{}' for class {}",
                entry_point,
                self.name()
            ));
        }
        Ok(controller)
    }

    /// Host-level construction. Goes through the builder controller when the
    /// constructor is overridden, plain instantiation otherwise.
    pub fn create(&self, args: Args) -> Result<Instance, MzlError> {
        let controller = self.controller();
        if controller.is_constructor_overridden() {
            controller.new(args)
        } else {
            self.instantiate(args)
        }
    }

    /// Like [`Class::create`]; `block` only runs when the constructor is
    /// overridden.
    pub fn create_with<F>(&self, args: Args, block: F) -> Result<Instance, MzlError>
    where
        F: FnOnce(&Instance) -> Result<(), MzlError>,
    {
        let controller = self.controller();
        if controller.is_constructor_overridden() {
            controller.new_with(args, block)
        } else {
            self.instantiate(args)
        }
    }
}

impl Instance {
    /// The builder controller of this instance's class.
    pub fn controller(&self) -> Controller {
        self.class().controller()
    }

    /// Reopens a builder scope on an existing instance.
    pub fn reopen<F>(&self, block: F) -> Result<Instance, MzlError>
    where
        F: FnOnce(&Instance) -> Result<(), MzlError>,
    {
        self.controller().exec(self, block)
    }
}

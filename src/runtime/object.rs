//! Host object model: classes, instances and their state slots.
//!
//! A [`Class`] is an open, reference-counted descriptor (name, superclass,
//! initializer, native methods, unresolved-call fallback). An [`Instance`] is
//! a reference-counted object with named slots, a table of permanently
//! installed methods, a stack of scope frames and an optional non-owning link
//! to the instance it was built inside of.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::err_ctx;
use crate::runtime::scope::ScopeFrame;
use crate::runtime::Collection;
use crate::value::{Args, Options, Value};
use crate::MzlError;

// ============================================================================
// CALLABLE TYPES
// ============================================================================

/// Nested block handed to a builder method, run against the receiver.
pub type Block<'a> = &'a dyn Fn(&Instance) -> Result<(), MzlError>;

/// A builder method or native method. Receives the instance it runs
/// against, its positional arguments, and an optional nested block.
pub type Handler = Rc<dyn Fn(&Instance, Args, Option<Block<'_>>) -> Result<Value, MzlError>>;

/// Wraps a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&Instance, Args, Option<Block<'_>>) -> Result<Value, MzlError> + 'static,
{
    Rc::new(f)
}

/// Host handler for calls nothing else resolved; receives the call name.
pub type Fallback =
    Rc<dyn Fn(&Instance, &str, Args, Option<Block<'_>>) -> Result<Value, MzlError>>;

/// Host constructor body, run with the constructor arguments.
pub type Initializer = Rc<dyn Fn(&Instance, Args) -> Result<(), MzlError>>;

// ============================================================================
// CLASSES
// ============================================================================

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a class, stable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

struct ClassData {
    id: ClassId,
    name: String,
    superclass: Option<Class>,
    initializer: RefCell<Option<Initializer>>,
    fallback: RefCell<Option<Fallback>>,
    natives: RefCell<IndexMap<String, Handler>>,
}

/// Shared handle to a class descriptor.
#[derive(Clone)]
pub struct Class(Rc<ClassData>);

impl Class {
    /// Creates a root class.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_superclass(name.into(), None)
    }

    /// Creates a class inheriting from `parent`.
    pub fn subclass(name: impl Into<String>, parent: &Class) -> Self {
        Self::with_superclass(name.into(), Some(parent.clone()))
    }

    fn with_superclass(name: String, superclass: Option<Class>) -> Self {
        let id = ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed));
        Class(Rc::new(ClassData {
            id,
            name,
            superclass,
            initializer: RefCell::new(None),
            fallback: RefCell::new(None),
            natives: RefCell::new(IndexMap::new()),
        }))
    }

    pub fn id(&self) -> ClassId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn superclass(&self) -> Option<Class> {
        self.0.superclass.clone()
    }

    /// This class followed by its superclasses, nearest first.
    pub fn ancestors(&self) -> Vec<Class> {
        let mut chain = vec![self.clone()];
        let mut cursor = self.superclass();
        while let Some(class) = cursor {
            cursor = class.superclass();
            chain.push(class);
        }
        chain
    }

    /// True when `self` is `other` or inherits from it.
    pub fn inherits(&self, other: &Class) -> bool {
        self.ancestors().iter().any(|c| c == other)
    }

    /// Sets the constructor body. Subclasses without their own inherit it.
    pub fn set_initializer<F>(&self, initializer: F)
    where
        F: Fn(&Instance, Args) -> Result<(), MzlError> + 'static,
    {
        *self.0.initializer.borrow_mut() = Some(Rc::new(initializer));
    }

    /// Sets the handler consulted when a call finds no method and no ancestor
    /// responds. Returning `UnresolvedCall` lets resolution continue.
    pub fn set_fallback<F>(&self, fallback: F)
    where
        F: Fn(&Instance, &str, Args, Option<Block<'_>>) -> Result<Value, MzlError> + 'static,
    {
        *self.0.fallback.borrow_mut() = Some(Rc::new(fallback));
    }

    /// Defines an ordinary (always visible) method on the class.
    pub fn define_method<F>(&self, name: impl Into<String>, method: F)
    where
        F: Fn(&Instance, Args, Option<Block<'_>>) -> Result<Value, MzlError> + 'static,
    {
        self.define_handler(name, handler(method));
    }

    pub(crate) fn define_handler(&self, name: impl Into<String>, handler: Handler) {
        self.0.natives.borrow_mut().insert(name.into(), handler);
    }

    /// Native method lookup through the superclass chain.
    pub fn native_method(&self, name: &str) -> Option<Handler> {
        self.ancestors()
            .into_iter()
            .find_map(|class| class.0.natives.borrow().get(name).cloned())
    }

    pub fn fallback(&self) -> Option<Fallback> {
        self.ancestors()
            .into_iter()
            .find_map(|class| class.0.fallback.borrow().clone())
    }

    fn initializer(&self) -> Option<Initializer> {
        self.ancestors()
            .into_iter()
            .find_map(|class| class.0.initializer.borrow().clone())
    }

    /// Plain host construction: allocates the instance and runs the
    /// initializer. No builder methods are installed.
    pub fn instantiate(&self, args: Args) -> Result<Instance, MzlError> {
        let instance = Instance(Rc::new(InstanceData {
            class: self.clone(),
            slots: RefCell::new(IndexMap::new()),
            methods: RefCell::new(IndexMap::new()),
            frames: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            opaque: Cell::new(false),
            attr_options: RefCell::new(IndexMap::new()),
        }));
        match self.initializer() {
            Some(initializer) => initializer(&instance, args)?,
            None if !args.is_empty() => {
                return Err(err_ctx!(
                    Arity,
                    "new",
                    self.name(),
                    "{} takes no constructor arguments, got {}",
                    self.name(),
                    args.len()
                ));
            }
            None => {}
        }
        Ok(instance)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

// ============================================================================
// INSTANCES
// ============================================================================

pub(crate) struct InstanceData {
    class: Class,
    slots: RefCell<IndexMap<String, Value>>,
    /// Permanently installed (persistent) builder methods.
    pub(crate) methods: RefCell<IndexMap<String, Handler>>,
    /// Active scope frames, innermost last.
    pub(crate) frames: RefCell<Vec<ScopeFrame>>,
    parent: RefCell<Weak<InstanceData>>,
    opaque: Cell<bool>,
    attr_options: RefCell<IndexMap<String, Options>>,
}

/// Shared handle to a constructed object. Equality is identity.
#[derive(Clone)]
pub struct Instance(pub(crate) Rc<InstanceData>);

impl Instance {
    pub fn class(&self) -> &Class {
        &self.0.class
    }

    pub fn is_a(&self, class: &Class) -> bool {
        self.0.class.inherits(class)
    }

    /// Reads a slot; unset slots read as `Nil`.
    pub fn get(&self, slot: &str) -> Value {
        self.0.slots.borrow().get(slot).cloned().unwrap_or_default()
    }

    pub fn set(&self, slot: impl Into<String>, value: impl Into<Value>) {
        self.0.slots.borrow_mut().insert(slot.into(), value.into());
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.0.slots.borrow().contains_key(slot)
    }

    /// Returns the slot's value, assigning `init()` first when it is unset
    /// or `Nil`.
    pub fn slot_or_insert_with<F>(&self, slot: &str, init: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        if let Some(value) = self.0.slots.borrow().get(slot) {
            if !value.is_nil() {
                return value.clone();
            }
        }
        let value = init();
        self.set(slot, value.clone());
        value
    }

    /// The container memoized under `slot`, if one was created.
    pub fn collection(&self, slot: &str) -> Option<Collection> {
        self.get(slot).as_collection().cloned()
    }

    /// Instance this one was built inside of, if it is still alive.
    pub fn parent(&self) -> Option<Instance> {
        self.0.parent.borrow().upgrade().map(Instance)
    }

    pub fn is_opaque(&self) -> bool {
        self.0.opaque.get()
    }

    /// Sets the nesting link and opacity; done once at child creation.
    pub fn link_to(&self, parent: &Instance, opaque: bool) {
        *self.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
        self.0.opaque.set(opaque);
    }

    /// True while at least one scope is active on this instance.
    pub fn in_scope(&self) -> bool {
        !self.0.frames.borrow().is_empty()
    }

    /// Options recorded by attribute builder methods, keyed by attribute name.
    pub fn attr_options(&self, attr: &str) -> Options {
        self.0.attr_options.borrow().get(attr).cloned().unwrap_or_default()
    }

    pub(crate) fn record_attr_options(&self, attr: &str, options: Options) {
        self.0.attr_options.borrow_mut().insert(attr.to_string(), options);
    }

    /// Installs a method that stays callable for the life of the instance.
    pub(crate) fn install_method(&self, name: impl Into<String>, handler: Handler) {
        self.0.methods.borrow_mut().insert(name.into(), handler);
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn describe(&self) -> String {
        format!("#<{}>", self.0.class.name())
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

//! Class → controller table and controller inheritance.
//!
//! The first time a class's controller is requested, a subclass copies its
//! superclass's controller (creating that one first if needed): registry,
//! default groups and hooks are copied, as are the delegate provider, the
//! constructor override and the entry-point name. Afterwards the two
//! controllers evolve independently.
//!
//! Entries are never removed. The table is per thread.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

use crate::dsl::controller::{Controller, ControllerState, DelegateProvider};
use crate::runtime::{Class, ClassId};

thread_local! {
    static CONTROLLERS: RefCell<HashMap<ClassId, Controller>> = RefCell::new(HashMap::new());
}

/// Returns the controller for `class`, creating it on first access.
pub fn controller_for(class: &Class) -> Controller {
    if let Some(existing) = CONTROLLERS.with(|table| table.borrow().get(&class.id()).cloned()) {
        return existing;
    }
    let state = match class.superclass() {
        Some(parent) => inherit(&controller_for(&parent), class),
        None => ControllerState::empty(class.clone()),
    };
    let controller = Controller::from_state(state);
    CONTROLLERS.with(|table| {
        table
            .borrow_mut()
            .insert(class.id(), controller.clone());
    });
    controller
}

/// True once a controller exists for `class`.
pub fn has_controller(class: &Class) -> bool {
    CONTROLLERS.with(|table| table.borrow().contains_key(&class.id()))
}

/// The delegate provider registered for `class`, if any.
pub fn delegate_for(class: &Class) -> Option<DelegateProvider> {
    controller_for(class).delegate_provider()
}

fn inherit(parent: &Controller, subclass: &Class) -> ControllerState {
    let source = parent.0.borrow();
    debug!(
        class = %subclass.name(),
        superclass = %source.subject.name(),
        methods = source.registry.len(),
        "inheriting builder controller"
    );
    ControllerState {
        subject: subclass.clone(),
        registry: source.registry.clone_for_subclass(),
        defaults: source.defaults.clone(),
        hooks: source.hooks.clone(),
        delegate: source.delegate.clone(),
        override_new: source.override_new,
        entry_point: source.entry_point.clone(),
    }
}

//! # Builder-Method DSL Engine
//!
//! Registration and construction of scoped builder methods.
//!
//! ## Module Structure
//!
//! - **`registry`**: per-class definitions and default option groups
//! - **`controller`**: the `Controller` registration/construction surface
//! - **`inheritance`**: class → controller table, copied down to subclasses
//! - **`factory`**: `child`, `collection`, `array` and `hash`
//! - **`alias`**: aliases with argument adaptation
//! - **`attr`**: set-once attributes
//!
//! Registering methods on a controller is expected to finish before
//! instances are built; a subclass copies its superclass's controller the
//! first time its own is requested.

pub mod controller;
pub mod inheritance;
pub mod registry;

mod alias;
mod attr;
mod factory;

pub use attr::AttrDefault;
pub use controller::{Controller, DelegateProvider, Hook, DEFAULT_ENTRY_POINT};
pub use registry::{Defaults, Definition, Registry};

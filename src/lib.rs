//! # mzl
//!
//! An engine for internal configuration DSLs. A class registers builder
//! methods on its [`dsl::Controller`]; those methods are callable on an
//! instance only inside a construction scope (unless registered with
//! `persist: true`). Children and collections nest recursively, and calls a
//! nested instance cannot answer bubble up to the instance it was built in.
//!
//! ```rust
//! use mzl::runtime::Class;
//! use mzl::{args, opts, Value};
//!
//! let parent = Class::new("Parent");
//! let child = Class::new("Child");
//! parent.controller().def("greet", opts! {}, |inst, _args, _block| {
//!     inst.set("greeted", true);
//!     Ok(Value::Nil)
//! });
//! parent.controller().child("kid", &child, opts! {});
//!
//! let built = parent.controller().build(|p| {
//!     let greet_from_child = |kid: &mzl::runtime::Instance| -> Result<(), mzl::MzlError> {
//!         kid.call("greet", args![])?;
//!         Ok(())
//!     };
//!     p.call_with("kid", args![], Some(&greet_from_child))?;
//!     Ok(())
//! }).unwrap();
//! assert_eq!(built.get("greeted"), Value::Bool(true));
//! ```
//!
//! Logging goes through `tracing`; the library never installs a subscriber.

pub use crate::diagnostics::{ErrorContext, ErrorType, MzlError};
pub use crate::value::{Args, Key, Options, Value};

pub mod cli;
pub mod demo;
pub mod diagnostics;
pub mod dsl;
pub mod runtime;
pub mod value;

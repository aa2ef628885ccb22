//! # Host Object Runtime
//!
//! A small dynamic object model for builder-method classes to run on.
//!
//! ## Module Structure
//!
//! - **`object`**: `Class` descriptors and `Instance` handles with state slots
//! - **`collection`**: list and keyed-map child containers
//! - **`scope`**: scope frames and the guard that tears them down
//! - **`dispatch`**: `Instance::call` and the capability query
//! - **`resolver`**: bubbling of unresolved calls up the nesting chain

pub mod collection;
pub mod object;
pub mod resolver;
pub mod scope;

mod dispatch;

pub use collection::{Collection, CollectionKind};
pub use object::{handler, Block, Class, ClassId, Fallback, Handler, Initializer, Instance};
pub use scope::{ScopeFrame, ScopeGuard};

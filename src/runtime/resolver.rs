//! Resolution of calls that miss every method on their receiver.
//!
//! While a non-opaque scope is active, a miss is forwarded one hop up the
//! nesting chain when any ancestor can answer it. Otherwise the class
//! fallback runs, then the class delegate, and finally the call fails with
//! `UnresolvedCall`.

use tracing::debug;

use crate::dsl::inheritance;
use crate::runtime::{Block, Instance};
use crate::value::{Args, Value};
use crate::{err_ctx, MzlError};

/// Nesting chain of `instance`, root first, ending at its direct parent.
///
/// The walk stops at the first opaque ancestor, which is included.
pub fn ancestor_chain(instance: &Instance) -> Vec<Instance> {
    let mut chain = Vec::new();
    let mut cursor = instance.parent();
    while let Some(ancestor) = cursor {
        cursor = if ancestor.is_opaque() {
            None
        } else {
            ancestor.parent()
        };
        chain.push(ancestor);
    }
    chain.reverse();
    chain
}

/// Resolves a miss on an intercepting instance.
pub fn resolve(
    instance: &Instance,
    name: &str,
    args: Args,
    block: Option<Block<'_>>,
) -> Result<Value, MzlError> {
    let chain = ancestor_chain(instance);
    if chain.iter().any(|ancestor| ancestor.responds_to(name)) {
        if let Some(parent) = instance.parent() {
            debug!(
                call = name,
                from = %instance.describe(),
                to = %parent.describe(),
                "bubbling call to parent"
            );
            return parent.call_with(name, args, block);
        }
    }

    if let Some(fallback) = instance.class().fallback() {
        match fallback(instance, name, args.clone(), block) {
            Err(err) if err.is_unresolved() => {}
            other => return other,
        }
    }

    if let Some(provider) = inheritance::delegate_for(instance.class()) {
        let delegate = provider(instance)?;
        match &delegate {
            Value::Nil => {}
            Value::Object(target) if target.responds_to(name) => {
                debug!(
                    call = name,
                    from = %instance.describe(),
                    to = %target.describe(),
                    "forwarding call to delegate"
                );
                return target.call_with(name, args, block);
            }
            other => {
                return Err(err_ctx!(
                    UnresolvedCall,
                    name,
                    other.describe(),
                    "undefined method '{}' for {}",
                    name,
                    other.describe()
                ));
            }
        }
    }

    Err(unresolved(instance, name))
}

/// Handles a miss on an instance without an intercepting scope.
pub fn fallback_or_unresolved(
    instance: &Instance,
    name: &str,
    args: Args,
    block: Option<Block<'_>>,
) -> Result<Value, MzlError> {
    match instance.class().fallback() {
        Some(fallback) => fallback(instance, name, args, block),
        None => Err(unresolved(instance, name)),
    }
}

fn unresolved(instance: &Instance, name: &str) -> MzlError {
    err_ctx!(
        UnresolvedCall,
        name,
        instance.describe(),
        "undefined method '{}' for {}",
        name,
        instance.describe()
    )
}

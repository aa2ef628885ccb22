//! Controlled dispatch for [`Instance`] calls.
//!
//! Lookup order: the innermost scope frame, then permanently installed
//! methods, then class natives (through the superclass chain). A miss goes to
//! the nesting resolver when the innermost frame intercepts, and to the class
//! fallback otherwise.

use tracing::trace;

use crate::runtime::{resolver, Block, Handler, Instance};
use crate::value::{Args, Value};
use crate::MzlError;

impl Instance {
    /// Finds the handler a call to `name` would run, without invoking it.
    pub fn lookup(&self, name: &str) -> Option<Handler> {
        let scoped = self
            .0
            .frames
            .borrow()
            .last()
            .and_then(|frame| frame.methods.get(name).cloned());
        if scoped.is_some() {
            return scoped;
        }
        let installed = self.0.methods.borrow().get(name).cloned();
        if installed.is_some() {
            return installed;
        }
        self.class().native_method(name)
    }

    /// Capability query: true when a call to `name` would find a method.
    pub fn responds_to(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// True when the innermost active scope bubbles unresolved calls.
    pub fn intercepting(&self) -> bool {
        self.0
            .frames
            .borrow()
            .last()
            .map(|frame| frame.intercept)
            .unwrap_or(false)
    }

    pub fn call(&self, name: &str, args: Args) -> Result<Value, MzlError> {
        self.call_with(name, args, None)
    }

    /// Calls `name` with a nested block.
    pub fn call_with(
        &self,
        name: &str,
        args: Args,
        block: Option<Block<'_>>,
    ) -> Result<Value, MzlError> {
        trace!(receiver = %self.describe(), call = name, args = args.len(), "dispatch");
        // The handler is cloned out so no borrow is held while it runs.
        if let Some(handler) = self.lookup(name) {
            return handler(self, args, block);
        }
        if self.intercepting() {
            resolver::resolve(self, name, args, block)
        } else {
            resolver::fallback_or_unresolved(self, name, args, block)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::Class;
    use crate::value::{Args, Value};
    use crate::{args, err_ctx};

    #[test]
    fn test_native_methods_are_inherited() {
        let base = Class::new("Base");
        base.define_method("greet", |_inst, _args, _block| Ok(Value::from("hello")));
        let derived = Class::subclass("Derived", &base);
        let inst = derived.instantiate(Args::none()).unwrap();
        assert!(inst.responds_to("greet"));
        assert_eq!(inst.call("greet", args![]).unwrap(), Value::from("hello"));
    }

    #[test]
    fn test_unknown_call_is_unresolved() {
        let inst = Class::new("Bare").instantiate(Args::none()).unwrap();
        let err = inst.call("nothing_here", args![]).unwrap_err();
        assert!(err.is_unresolved());
        assert_eq!(err.call(), Some("nothing_here"));
    }

    #[test]
    fn test_fallback_handles_misses_outside_scope() {
        let class = Class::new("Ghost");
        class.set_fallback(|inst, name, _args, _block| {
            Err(err_ctx!(Handler, name, inst.describe(), "no such thing: {}", name))
        });
        let inst = class.instantiate(Args::none()).unwrap();
        let err = inst.call("boo", args![]).unwrap_err();
        assert_eq!(err.to_string(), "no such thing: boo");
    }
}

//! # Shared fixtures for mzl integration tests
//!
//! Small classes reused across test files: a counter, a constructor-overriding
//! base class, and an identity child that remembers what it was told.

#![allow(dead_code)]

use mzl::runtime::{Class, Instance};
use mzl::{opts, MzlError, Value};

/// Gives a closure the signature of a nested block.
pub fn block<F>(f: F) -> F
where
    F: Fn(&Instance) -> Result<(), MzlError>,
{
    f
}

/// A class whose `Class::create` goes through its controller.
pub fn overridden(name: &str) -> Class {
    let class = Class::new(name);
    class.controller().override_constructor(true);
    class
}

/// `Counter`: persistent `total()`, scope-only `add(*nums)`.
pub fn counter() -> Class {
    let class = Class::new("Counter");
    class.set_initializer(|inst, _args| {
        inst.set("total", 0);
        Ok(())
    });
    let ctrl = class.controller();
    ctrl.def("total", opts! { "persist" => true }, |inst, _args, _block| {
        Ok(inst.get("total"))
    });
    ctrl.def("add", opts! {}, |inst, args, _block| {
        let sum: i64 = args.iter().filter_map(Value::as_int).sum();
        let total = inst.get("total").as_int().unwrap_or(0) + sum;
        inst.set("total", total);
        Ok(Value::from(total))
    });
    class
}

/// Subclass of `base` with scope-only `i_am(value)`, persistent
/// `who_am_i?()`, and an initializer keeping its optional option map in
/// the `opts` slot.
pub fn identity_child(base: &Class, name: &str) -> Class {
    let class = Class::subclass(name, base);
    class.set_initializer(|inst, args| {
        args.expect_at_most(1, "new")?;
        inst.set("opts", args.first().cloned().unwrap_or_default());
        Ok(())
    });
    let ctrl = class.controller();
    ctrl.def("i_am", opts! {}, |inst, args, _block| {
        args.expect_exactly(1, "i_am")?;
        let value = args.first().cloned().unwrap_or_default();
        inst.set("identity", value.clone());
        Ok(value)
    });
    ctrl.def("who_am_i?", opts! { "persist" => true }, |inst, _args, _block| {
        Ok(inst.get("identity"))
    });
    class
}

/// Records that the receiving instance was reached, returning it.
pub fn mark(name: &str) -> impl Fn(&Instance, mzl::Args, Option<mzl::runtime::Block<'_>>) -> Result<Value, MzlError> + 'static {
    let slot = name.to_string();
    move |inst, _args, _block| {
        inst.set(slot.as_str(), true);
        Ok(Value::Object(inst.clone()))
    }
}

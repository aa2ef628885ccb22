//! Set-once attributes.
//!
//! `attr("name", ...)` installs one accessor as a class-native method and as
//! a scope-only builder method. Without arguments it reads; with a value it
//! stores it once, and only while a scope is active. Flags passed along with
//! the value are kept per instance and read back with
//! [`Instance::attr_options`](crate::runtime::Instance::attr_options).

use std::rc::Rc;

use crate::dsl::Controller;
use crate::runtime::{handler, CollectionKind, Instance};
use crate::value::{Args, Options, Value};
use crate::{err_ctx, MzlError};

/// Computes an attribute's value when it was never set.
pub type AttrDefault = Rc<dyn Fn(&Instance) -> Result<Value, MzlError>>;

impl Controller {
    /// Declares an attribute without a default; unset attributes read as `Nil`.
    pub fn attr(&self, name: &str, options: Options) -> &Self {
        self.define_attr(name, options, None)
    }

    /// Declares an attribute whose unset value is computed by `default`.
    pub fn attr_or<F>(&self, name: &str, options: Options, default: F) -> &Self
    where
        F: Fn(&Instance) -> Result<Value, MzlError> + 'static,
    {
        self.define_attr(name, options, Some(Rc::new(default)))
    }

    fn define_attr(&self, name: &str, options: Options, default: Option<AttrDefault>) -> &Self {
        let mut options = options.over(&self.0.borrow().defaults.get("attr"));
        options.insert("persist", false);

        // Shared by the class-native getter and the registry entry.
        let accessor = {
            let attr = name.to_string();
            handler(move |inst, mut args, _block| {
                if args.is_empty() {
                    return read(inst, &attr, default.as_ref());
                }
                if !inst.in_scope() {
                    return Err(err_ctx!(
                        AttributeMisuse,
                        attr.as_str(),
                        inst.describe(),
                        "attribute '{}' can only be set inside a builder scope",
                        attr
                    ));
                }
                let flags = args.optify(1);
                args.expect_exactly(1, &attr)?;
                assign(inst, &attr, args, flags)
            })
        };
        self.subject().define_handler(name, accessor.clone());
        self.register(name, accessor, options, CollectionKind::None)
    }
}

fn read(inst: &Instance, attr: &str, default: Option<&AttrDefault>) -> Result<Value, MzlError> {
    if inst.has_slot(attr) {
        return Ok(inst.get(attr));
    }
    match default {
        Some(default) => default(inst),
        None => Ok(Value::Nil),
    }
}

fn assign(inst: &Instance, attr: &str, mut args: Args, flags: Options) -> Result<Value, MzlError> {
    if inst.has_slot(attr) {
        return Err(err_ctx!(
            AttributeMisuse,
            attr,
            inst.describe(),
            "attribute '{}' is already set to {}",
            attr,
            inst.get(attr).describe()
        ));
    }
    let value = args.shift().unwrap_or_default();
    inst.set(attr, value.clone());
    if !flags.is_empty() {
        inst.record_attr_options(attr, flags);
    }
    Ok(value)
}

//! Demo classes built on the DSL engine: a running-total calculator and a
//! holder with a calculator child. Used by the `mzl` binary.
//!
//! Each class is created once per thread and reused.

use crate::runtime::{Class, Instance};
use crate::value::{Args, Value};
use crate::{err_ctx, err_msg, opts, MzlError};

thread_local! {
    static CALCULATE: Class = build_calculate();
    static SCOPES: Class = build_scopes();
}

/// `Calculate`: `total` is persistent; `add`, `sub` and `exp` exist only
/// inside a builder scope.
pub fn calculate() -> Class {
    CALCULATE.with(Class::clone)
}

/// `Scopes`: holds a persistent `calculate` child.
pub fn scopes() -> Class {
    SCOPES.with(Class::clone)
}

/// Looks up a demo class by its command-line name.
pub fn by_name(name: &str) -> Option<Class> {
    match name {
        "calculate" => Some(calculate()),
        "scopes" => Some(scopes()),
        _ => None,
    }
}

fn build_calculate() -> Class {
    let class = Class::new("Calculate");
    class.set_initializer(|inst, args| {
        args.expect_exactly(0, "Calculate.new")?;
        inst.set("total", 0);
        Ok(())
    });

    let ctrl = class.controller();
    ctrl.def("total", opts! { "persist" => true }, |inst, args, _block| {
        args.expect_exactly(0, "total")?;
        Ok(inst.get("total"))
    });
    ctrl.def("add", opts! {}, |inst, args, _block| {
        let sum = sum(&args, "add")?;
        update(inst, "add", |total| checked(total, &sum, i64::checked_add, |a, b| a + b))
    });
    ctrl.def("sub", opts! {}, |inst, args, _block| {
        let sum = sum(&args, "sub")?;
        update(inst, "sub", |total| checked(total, &sum, i64::checked_sub, |a, b| a - b))
    });
    ctrl.def("exp", opts! {}, |inst, args, _block| {
        args.expect_exactly(1, "exp")?;
        let exponent = args.get(0).cloned().unwrap_or_default();
        update(inst, "exp", |total| power(total, &exponent))
    });
    class
}

fn build_scopes() -> Class {
    let class = Class::new("Scopes");
    class.controller().child("calculate", &calculate(), opts! {});
    class
}

/// Sum of numeric arguments; at least one is required.
fn sum(args: &Args, call: &str) -> Result<Value, MzlError> {
    if args.is_empty() {
        return Err(err_ctx!(Arity, call, "Calculate", "'{}' expects at least one number", call));
    }
    let mut total = Value::Int(0);
    for index in 0..args.len() {
        args.number(index, call)?;
        let value = args.get(index).cloned().unwrap_or_default();
        total = checked(&total, &value, i64::checked_add, |a, b| a + b)
            .ok_or_else(|| err_msg!(Handler, "'{}' overflowed", call))?;
    }
    Ok(total)
}

fn update<F>(inst: &Instance, call: &str, op: F) -> Result<Value, MzlError>
where
    F: FnOnce(&Value) -> Option<Value>,
{
    let total = inst.get("total");
    let next = op(&total).ok_or_else(|| {
        err_ctx!(Handler, call, inst.describe(), "'{}' cannot update total {}", call, total)
    })?;
    inst.set("total", next.clone());
    Ok(next)
}

/// Integer arithmetic while both sides are integers, float otherwise.
fn checked(
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b).map(Value::Int),
        _ => Some(Value::Float(float_op(lhs.as_f64()?, rhs.as_f64()?))),
    }
}

fn power(base: &Value, exponent: &Value) -> Option<Value> {
    match (base, exponent) {
        (Value::Int(b), Value::Int(e)) if *e >= 0 => {
            let e = u32::try_from(*e).ok()?;
            b.checked_pow(e).map(Value::Int)
        }
        _ => Some(Value::Float(base.as_f64()?.powf(exponent.as_f64()?))),
    }
}

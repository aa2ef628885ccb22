//! Scope visibility, persistence and construction behavior.

mod common;

use common::{block, counter, overridden};
use mzl::runtime::Class;
use mzl::{args, opts, ErrorType, Value};

#[test]
fn counter_adds_inside_scope() {
    let built = counter()
        .controller()
        .build(|c| {
            c.call("add", args![2, 2])?;
            Ok(())
        })
        .unwrap();
    assert_eq!(built.call("total", args![]).unwrap(), Value::from(4));
}

#[test]
fn counter_starts_at_zero() {
    let fresh = counter().controller().new(args![]).unwrap();
    assert_eq!(fresh.call("total", args![]).unwrap(), Value::from(0));
}

#[test]
fn scope_only_methods_vanish_after_construction() {
    let class = counter();
    let inst = class.controller().new(args![]).unwrap();
    assert!(!inst.responds_to("add"));
    let err = inst.call("add", args![1]).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::UnresolvedCall);
}

#[test]
fn persistent_methods_visible_inside_and_after() {
    let class = counter();
    let inst = class
        .controller()
        .build(|c| {
            assert_eq!(c.call("total", args![])?, Value::from(0));
            Ok(())
        })
        .unwrap();
    assert!(inst.responds_to("total"));
}

#[test]
fn scope_only_method_unavailable_before_scope() {
    let class = Class::new("Pinger");
    class
        .controller()
        .def("foo", opts! {}, |_inst, _args, _block| Ok(Value::sym("pong")));
    let plain = class.instantiate(args![]).unwrap();
    assert!(plain.call("foo", args![]).unwrap_err().is_unresolved());

    let pinged = class
        .controller()
        .build(|p| {
            assert_eq!(p.call("foo", args![])?, Value::sym("pong"));
            Ok(())
        })
        .unwrap();
    assert!(!pinged.responds_to("foo"));
}

#[test]
fn reopen_changes_total() {
    let inst = counter().controller().new(args![]).unwrap();
    inst.reopen(|c| {
        c.call("add", args![1, 1, 1, 1])?;
        Ok(())
    })
    .unwrap();
    assert_eq!(inst.call("total", args![]).unwrap(), Value::from(4));
    assert!(!inst.in_scope());
}

#[test]
fn handlers_receive_nested_blocks() {
    let class = Class::new("Blocky");
    class
        .controller()
        .def("call_block", opts! {}, |inst, _args, nested| {
            if let Some(nested) = nested {
                nested(inst)?;
            }
            Ok(Value::Nil)
        });
    let inst = class
        .controller()
        .build(|b| {
            b.call_with(
                "call_block",
                args![],
                Some(&block(|inner| {
                    inner.set("ran", true);
                    Ok(())
                })),
            )?;
            Ok(())
        })
        .unwrap();
    assert_eq!(inst.get("ran"), Value::Bool(true));
}

#[test]
fn teardown_runs_after_failing_block() {
    let class = counter();
    let inst = class.controller().new(args![]).unwrap();
    let err = inst
        .reopen(|c| {
            c.call("add", args![5])?;
            c.call("missing", args![])?;
            Ok(())
        })
        .unwrap_err();
    assert!(err.is_unresolved());
    assert!(!inst.in_scope());
    assert!(!inst.responds_to("add"));
    assert_eq!(inst.get("total"), Value::from(5));
}

#[test]
fn constructor_arguments_reach_initializer() {
    let class = Class::new("Greeting");
    class.set_initializer(|inst, args| {
        args.expect_exactly(1, "new")?;
        inst.set("text", args.first().cloned().unwrap_or_default());
        Ok(())
    });
    let inst = class.controller().new(args!["hello"]).unwrap();
    assert_eq!(inst.get("text"), Value::from("hello"));
    assert!(class.controller().new(args![]).unwrap_err().is_arity());
}

#[test]
fn create_uses_controller_only_when_overridden() {
    let class = counter();
    assert!(!class.create(args![]).unwrap().responds_to("total"));

    let overriding = overridden("Eager");
    overriding
        .controller()
        .def("properties", opts! { "persist" => true }, |inst, _args, _block| {
            Ok(inst.get("properties"))
        });
    let inst = overriding
        .create_with(args![], |i| {
            i.set("properties", "set in scope");
            Ok(())
        })
        .unwrap();
    assert_eq!(inst.call("properties", args![]).unwrap(), Value::from("set in scope"));
}

#[test]
fn dsl_methods_lists_registration_order() {
    let class = Class::new("Listed");
    assert!(class.controller().dsl_methods().is_empty());
    class
        .controller()
        .def("call_block", opts! {}, |_i, _a, _b| Ok(Value::Nil))
        .def("properties", opts! { "persist" => true }, |_i, _a, _b| Ok(Value::Nil))
        .def("throw_the_instance", opts! {}, |_i, _a, _b| Ok(Value::Nil));
    assert_eq!(
        class.controller().dsl_methods(),
        vec!["call_block", "properties", "throw_the_instance"]
    );
}

#[test]
fn instance_controller_is_the_class_controller() {
    let class = counter();
    let inst = class.controller().new(args![]).unwrap();
    assert_eq!(inst.controller().subject(), class);
}

//! List and keyed-map collections.

mod common;

use common::{block, identity_child, overridden};
use mzl::runtime::{Class, Collection, Instance};
use mzl::{args, opts, Args, ErrorType, Key, MzlError, Options, Value};

fn things(inst: &Instance) -> Collection {
    inst.call("things", args![])
        .unwrap()
        .as_collection()
        .cloned()
        .unwrap()
}

fn who(inst: &Instance) -> Value {
    inst.call("who_am_i?", args![]).unwrap()
}

/// Calls `thing(args) { i_am(identity) }` on `owner`.
fn thing_named(owner: &Instance, args: Args, identity: Value) -> Result<Value, MzlError> {
    owner.call_with(
        "thing",
        args,
        Some(&block(|t| {
            t.call("i_am", args![identity.clone()])?;
            Ok(())
        })),
    )
}

// ----------------------------------------------------------------------
// Lists
// ----------------------------------------------------------------------

#[test]
fn array_appends_children() {
    let base = overridden("Base");
    let child = identity_child(&base, "Item");
    let parent = Class::subclass("List", &base);
    parent.controller().array("thing", &child, opts! {});

    let inst = parent
        .create_with(args![], |p| {
            p.call("thing", args![])?;
            Ok(())
        })
        .unwrap();
    assert!(inst.responds_to("things"));
    assert!(!inst.responds_to("thing"));
    assert_eq!(things(&inst).len(), 1);

    inst.reopen(|p| {
        for _ in 0..4 {
            p.call("thing", args![])?;
        }
        Ok(())
    })
    .unwrap();
    assert_eq!(things(&inst).len(), 5);
}

#[test]
fn array_keeps_call_order() {
    let base = overridden("Base");
    let child = identity_child(&base, "Item");
    let parent = Class::subclass("List", &base);
    parent.controller().array("thing", &child, opts! {});

    let inst = parent
        .create_with(args![], |p| {
            for i in 0..5 {
                thing_named(p, args![], Value::from(i))?;
            }
            Ok(())
        })
        .unwrap();
    let ids: Vec<Value> = things(&inst).instances().iter().map(who).collect();
    assert_eq!(ids, (0..5).map(Value::from).collect::<Vec<_>>());
}

#[test]
fn array_can_be_empty() {
    let base = overridden("Base");
    let parent = Class::subclass("List", &base);
    parent
        .controller()
        .array("thing", &identity_child(&base, "Item"), opts! {});
    let inst = parent.create(args![]).unwrap();
    let container = things(&inst);
    assert!(container.is_empty());
    assert!(container.ptr_eq(&things(&inst)));
}

#[test]
fn arrays_nest() {
    let base = overridden("Base");
    let child = identity_child(&base, "Item");
    let inner = Class::subclass("Inner", &child);
    let middle = Class::subclass("Middle", &child);
    middle.controller().array("thing", &inner, opts! {});
    let outer = Class::subclass("Outer", &base);
    outer.controller().array("thing", &middle, opts! {});

    let inst = outer
        .create_with(args![], |o| {
            for prefix in ["one", "two"] {
                o.call_with(
                    "thing",
                    args![],
                    Some(&block(|m| {
                        thing_named(m, args![], Value::sym(format!("{prefix}_one")))?;
                        thing_named(m, args![], Value::sym(format!("{prefix}_two")))?;
                        Ok(())
                    })),
                )?;
            }
            Ok(())
        })
        .unwrap();

    let outer_things = things(&inst);
    let first = outer_things.first().unwrap();
    let last = outer_things.last().unwrap();
    assert_eq!(who(&things(&first).last().unwrap()), Value::sym("one_two"));
    assert_eq!(who(&things(&last).first().unwrap()), Value::sym("two_one"));
}

#[test]
fn scope_only_array_accessor() {
    let base = overridden("Base");
    let child = identity_child(&base, "Item");
    base.controller()
        .array("thing", &child, opts! { "persist" => false });
    let inst = base
        .create_with(args![], |b| {
            thing_named(b, args![], Value::sym("me"))?;
            let listed = b.call("things", args![])?;
            let first = listed.as_collection().and_then(Collection::first);
            assert_eq!(first.map(|f| who(&f)), Some(Value::sym("me")));
            Ok(())
        })
        .unwrap();
    assert!(!inst.responds_to("things"));
    let stored = inst.collection("things").unwrap();
    assert_eq!(who(&stored.get(0).unwrap()), Value::sym("me"));
}

// ----------------------------------------------------------------------
// Keyed maps
// ----------------------------------------------------------------------

fn keyed() -> Class {
    let base = overridden("Base");
    let child = identity_child(&base, "Item");
    let parent = Class::subclass("Keyed", &base);
    parent.controller().hash("thing", &child, opts! {});
    parent
}

#[test]
fn hash_stores_children_by_key() {
    let inst = keyed()
        .create_with(args![], |p| {
            thing_named(p, args![Value::sym("one")], Value::sym("first_thing"))?;
            thing_named(p, args![Value::sym("two")], Value::sym("second_thing"))?;
            Ok(())
        })
        .unwrap();
    let map = things(&inst);
    assert_eq!(map.len(), 2);
    assert_eq!(map.keys(), vec![Key::sym("one"), Key::sym("two")]);
    assert_eq!(who(&map.get_key(&Key::sym("one")).unwrap()), Value::sym("first_thing"));
    assert_eq!(who(&map.get_key(&Key::sym("two")).unwrap()), Value::sym("second_thing"));
}

#[test]
fn hash_distinguishes_symbol_and_string_keys() {
    let inst = keyed()
        .create_with(args![], |p| {
            thing_named(p, args![Value::sym("one")], Value::sym("thing_one"))?;
            thing_named(p, args!["one"], Value::from("thing_one"))?;
            Ok(())
        })
        .unwrap();
    let map = things(&inst);
    assert_eq!(map.keys(), vec![Key::sym("one"), Key::from("one")]);
    assert_eq!(who(&map.get_key(&Key::from("one")).unwrap()), Value::from("thing_one"));
}

#[test]
fn hash_overwrite_keeps_first_position() {
    let inst = keyed()
        .create_with(args![], |p| {
            thing_named(p, args![Value::sym("a")], Value::from(1))?;
            thing_named(p, args![Value::sym("b")], Value::from(2))?;
            thing_named(p, args![Value::sym("a")], Value::from(3))?;
            Ok(())
        })
        .unwrap();
    let map = things(&inst);
    assert_eq!(map.keys(), vec![Key::sym("a"), Key::sym("b")]);
    assert_eq!(who(&map.get_key(&Key::sym("a")).unwrap()), Value::from(3));
}

#[test]
fn hash_passes_options_to_children() {
    let inst = keyed()
        .create_with(args![], |p| {
            p.call("thing", args![Value::sym("one"), opts! { "this" => "that" }])?;
            p.call("thing", args![Value::sym("two"), opts! { "these" => "those" }])?;
            Ok(())
        })
        .unwrap();
    let map = things(&inst);
    let one = map.get_key(&Key::sym("one")).unwrap();
    let two = map.get_key(&Key::sym("two")).unwrap();
    assert_eq!(one.get("opts"), Value::Map(opts! { "this" => "that" }));
    assert_eq!(two.get("opts"), Value::Map(opts! { "these" => "those" }));
}

#[test]
fn hash_rejects_unhashable_key() {
    let err = keyed()
        .create_with(args![], |p| {
            p.call("thing", args![1.5])?;
            Ok(())
        })
        .unwrap_err();
    assert_eq!(err.error_type(), ErrorType::TypeError);
}

// ----------------------------------------------------------------------
// Opacity
// ----------------------------------------------------------------------

#[test]
fn collection_opacity() {
    let base = overridden("Base");
    let child = identity_child(&base, "Item");
    let parent = Class::subclass("FooParent", &base);
    parent.controller().def("foo", opts! {}, |inst, args, _block| {
        let value = args.first().cloned().unwrap_or_default();
        inst.set("foo", value.clone());
        Ok(value)
    });
    let opaque_parent = Class::subclass("OpaqueParent", &parent);
    let transparent_parent = Class::subclass("TransparentParent", &parent);
    opaque_parent
        .controller()
        .array("thing", &child, Options::flags(["opaque"]));
    transparent_parent.controller().array("thing", &child, opts! {});

    let call_foo = |p: &Instance| -> Result<(), MzlError> {
        p.call_with(
            "thing",
            args![],
            Some(&block(|t| {
                t.call("foo", args![Value::sym("bar")])?;
                Ok(())
            })),
        )?;
        Ok(())
    };

    let err = opaque_parent.create_with(args![], call_foo).unwrap_err();
    assert!(err.is_unresolved());

    let inst = transparent_parent.create_with(args![], call_foo).unwrap();
    assert_eq!(inst.get("foo"), Value::sym("bar"));
}

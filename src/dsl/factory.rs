//! Child and collection builder methods.
//!
//! A child accessor lazily builds one instance of the child class and
//! memoizes it in a slot named after the accessor. A collection registers a
//! scope-only creator that builds a fresh child per call and an accessor
//! (named by the `plural` option) returning the container.
//!
//! Every child built here is linked to its owner, so calls it cannot answer
//! bubble to the owner while a scope is active, unless it was declared
//! `opaque`.

use crate::dsl::Controller;
use crate::runtime::{handler, Class, Collection, CollectionKind, Instance};
use crate::value::{Args, Key, Options, Value};
use crate::{err_ctx, opts, MzlError};

impl Controller {
    /// Declares a single memoized child of class `class`.
    ///
    /// Options: `persist` (default `true`), `opaque` (default `false`). Flags
    /// and options passed to the accessor become the child's constructor
    /// argument on first use; a block reopens the child's scope.
    pub fn child(&self, name: &str, class: &Class, options: Options) -> &Self {
        let options = options.over(&opts! { "persist" => true, "opaque" => false });
        let opaque = options.flag("opaque");
        let slot = name.to_string();
        let child_class = class.clone();

        let accessor = handler(move |owner, mut args, block| {
            let ctor_options = args.optify(0);
            if !args.is_empty() {
                return Err(err_ctx!(
                    Arity,
                    slot.as_str(),
                    owner.describe(),
                    "'{}' accepts only flags and options, got {} positional argument(s)",
                    slot,
                    args.len()
                ));
            }
            let child = match owner.get(&slot) {
                Value::Object(existing) => existing,
                _ => {
                    let ctor_args = if ctor_options.is_empty() {
                        Args::none()
                    } else {
                        Args::new(vec![Value::Map(ctor_options)])
                    };
                    let created = child_class.controller().new(ctor_args)?;
                    created.link_to(owner, opaque);
                    owner.set(slot.as_str(), created.clone());
                    created
                }
            };
            if let Some(block) = block {
                child.reopen(block)?;
            }
            Ok(Value::Object(child))
        });
        self.register(name, accessor, options, CollectionKind::None)
    }

    /// Declares a collection of children of class `class`.
    ///
    /// Registers the scope-only creator `name` and the accessor named by the
    /// `plural` option (default `name` + "s"), persistent unless
    /// `persist: false`. For [`CollectionKind::Map`] the creator's leading
    /// argument is the key; remaining arguments go to the child constructor.
    pub fn collection(
        &self,
        name: &str,
        class: &Class,
        kind: CollectionKind,
        options: Options,
    ) -> &Self {
        let kind = match kind {
            CollectionKind::None => CollectionKind::List,
            other => other,
        };
        let options = options.over(&opts! {
            "persist" => true,
            "plural" => format!("{name}s"),
            "opaque" => false,
        });
        let plural = match options.get("plural") {
            Some(Value::Str(plural)) | Some(Value::Symbol(plural)) => plural.clone(),
            _ => format!("{name}s"),
        };
        let opaque = options.flag("opaque");

        let creator = {
            let creator_name = name.to_string();
            let slot = plural.clone();
            let child_class = class.clone();
            handler(move |owner, mut args, block| {
                let key = match kind {
                    CollectionKind::Map => {
                        let raw = args.shift().ok_or_else(|| {
                            err_ctx!(
                                Arity,
                                creator_name.as_str(),
                                owner.describe(),
                                "'{}' expects a key as its first argument",
                                creator_name
                            )
                        })?;
                        Some(Key::try_from(raw)?)
                    }
                    _ => None,
                };
                let container = container_of(owner, &slot, kind)?;
                let created = child_class.controller().new(args)?;
                created.link_to(owner, opaque);
                if let Some(block) = block {
                    created.reopen(block)?;
                }
                match key {
                    Some(key) => {
                        container.insert(key, created.clone());
                    }
                    None => container.push(created.clone()),
                }
                Ok(Value::Object(created))
            })
        };
        self.register(
            name,
            creator,
            opts! { "persist" => false, "opaque" => opaque },
            kind,
        );

        let accessor = {
            let slot = plural.clone();
            handler(move |owner, args, _block| {
                args.expect_exactly(0, &slot)?;
                Ok(Value::Collection(container_of(owner, &slot, kind)?))
            })
        };
        self.register(&plural, accessor, options, CollectionKind::None)
    }

    /// Ordered-list collection.
    pub fn array(&self, name: &str, class: &Class, options: Options) -> &Self {
        self.collection(name, class, CollectionKind::List, options)
    }

    /// Keyed-map collection.
    pub fn hash(&self, name: &str, class: &Class, options: Options) -> &Self {
        self.collection(name, class, CollectionKind::Map, options)
    }
}

/// The container memoized in `slot`, created empty on first access.
fn container_of(owner: &Instance, slot: &str, kind: CollectionKind) -> Result<Collection, MzlError> {
    let value = owner.slot_or_insert_with(slot, || Value::Collection(Collection::new(kind)));
    match value {
        Value::Collection(container) => Ok(container),
        other => Err(err_ctx!(
            Internal,
            slot,
            owner.describe(),
            "slot '{}' holds {} instead of a collection",
            slot,
            other.describe()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;

    #[test]
    fn test_child_is_memoized_and_linked() {
        let owner_class = Class::new("Owner");
        let child_class = Class::new("Part");
        owner_class.controller().child("part", &child_class, opts! {});
        let owner = owner_class.controller().new(args![]).unwrap();
        let first = owner.call("part", args![]).unwrap();
        let second = owner.call("part", args![]).unwrap();
        assert_eq!(first, second);
        let part = first.as_object().unwrap();
        assert_eq!(part.parent(), Some(owner.clone()));
        assert!(!part.is_opaque());
    }

    #[test]
    fn test_child_rejects_positional_arguments() {
        let owner_class = Class::new("Owner");
        owner_class.controller().child("part", &Class::new("Part"), opts! {});
        let owner = owner_class.controller().new(args![]).unwrap();
        assert!(owner.call("part", args![1]).unwrap_err().is_arity());
    }

    #[test]
    fn test_custom_plural_names_the_accessor() {
        let owner_class = Class::new("Owner");
        owner_class
            .controller()
            .array("child", &Class::new("Kid"), opts! { "plural" => "children" });
        let owner = owner_class.controller().new(args![]).unwrap();
        assert!(owner.responds_to("children"));
        assert!(!owner.responds_to("childs"));
        let container = owner.call("children", args![]).unwrap();
        assert!(container.as_collection().unwrap().is_empty());
    }

    #[test]
    fn test_hash_creator_requires_a_key() {
        let owner_class = Class::new("Owner");
        owner_class.controller().hash("thing", &Class::new("Thing"), opts! {});
        let err = owner_class
            .controller()
            .build(|o| {
                o.call("thing", args![])?;
                Ok(())
            })
            .unwrap_err();
        assert!(err.is_arity());
    }
}

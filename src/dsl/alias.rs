//! Builder-method aliases with argument adaptation.
//!
//! An alias forwards to an existing builder method after folding trailing
//! flags into an option map and merging the alias's own options under the
//! caller's. When the target rejects the extra option map with an `Arity`
//! error before its nested block runs, the call is retried once without it.

use std::cell::Cell;

use tracing::debug;

use crate::dsl::Controller;
use crate::runtime::{handler, Block, CollectionKind, Instance};
use crate::value::{Options, Value};
use crate::{err_ctx, opts, MzlError};

impl Controller {
    /// Registers `new_name` as an alias of `existing`, adding `extra`
    /// options to every call. The alias inherits the persistence and
    /// collection kind of `existing`.
    ///
    /// # Errors
    /// `AliasSourceMissing` when `existing` is not registered.
    pub fn alias(&self, new_name: &str, existing: &str, extra: Options) -> Result<&Self, MzlError> {
        let source = self.registry().get(existing).cloned();
        let source = source.ok_or_else(|| {
            err_ctx!(
                AliasSourceMissing,
                existing,
                self.subject().name(),
                "cannot alias '{}' to unregistered builder method '{}'",
                new_name,
                existing
            )
            .with_help(format!("register '{existing}' before aliasing it"))
        })?;

        let target = source.handler.clone();
        let keyed = source.collection == CollectionKind::Map;
        let alias_name = new_name.to_string();
        let forward = handler(move |inst, mut args, block| {
            // On keyed maps the key occupies the value slot.
            let key = if keyed { args.shift() } else { None };
            let mut options = args.optify(if keyed { 0 } else { 1 });
            options.merge_missing(&extra);
            if let Some(key) = key {
                args.unshift(key);
            }
            if options.is_empty() {
                return target(inst, args, block);
            }

            let bare = args.clone();
            args.push(Value::Map(options));
            // Only a rejection raised before the nested block starts is
            // attributed to the appended option map.
            let started = Cell::new(false);
            let watched = |target_inst: &Instance| -> Result<(), MzlError> {
                started.set(true);
                match block {
                    Some(block) => block(target_inst),
                    None => Ok(()),
                }
            };
            let watched_block: Option<Block<'_>> = block.map(|_| &watched as Block<'_>);
            match target(inst, args, watched_block) {
                Err(err) if err.is_arity() && !started.get() => {
                    debug!(alias = %alias_name, error = %err, "retrying alias without options");
                    target(inst, bare, block).map_err(|retry| {
                        err_ctx!(
                            ArgumentAdaptation,
                            alias_name.as_str(),
                            inst.describe(),
                            "alias '{}' could not adapt its arguments",
                            alias_name
                        )
                        .caused_by(retry)
                    })
                }
                other => other,
            }
        });

        self.register(
            new_name,
            forward,
            opts! { "persist" => source.is_persistent() },
            source.collection,
        );
        Ok(self)
    }
}

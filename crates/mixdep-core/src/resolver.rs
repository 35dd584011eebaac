//! Reference-list expansion into a flat, dependency-ordered mixin list.
//!
//! Depth-first walk over the registry with explicit per-alias visit
//! state, so a completed repeat (alias already contributed) is skipped
//! while a true cycle (alias still being visited) is reported with its
//! walk path.

use std::collections::HashMap;

use mixdep_common::error::{MixdepError, Result};
use mixdep_common::types::Literal;

use crate::parser::parse_reference;
use crate::registry::{Implementation, Reference, Registry};

/// Visit state of an alias during one resolution walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    /// The alias's dependencies are still being expanded.
    InProgress,
    /// The alias has fully contributed; later sightings are skipped.
    Done,
}

/// State for a single `resolve` call.
struct Walk<'a, M> {
    registry: &'a Registry<M>,
    output: Vec<M>,
    visited: HashMap<String, Visit>,
    /// Aliases currently being expanded, for cycle path reporting.
    stack: Vec<String>,
}

impl<M: Clone> Walk<'_, M> {
    fn visit(&mut self, alias: &str, args: &[Literal]) -> Result<()> {
        match self.visited.get(alias) {
            Some(Visit::Done) => return Ok(()),
            Some(Visit::InProgress) => {
                let start = self.stack.iter().position(|a| a == alias).unwrap_or(0);
                let mut path = self.stack[start..].to_vec();
                path.push(alias.to_owned());
                return Err(MixdepError::CircularDependency { path });
            }
            None => {}
        }

        let entry = self
            .registry
            .get(alias)
            .ok_or_else(|| MixdepError::UnknownAlias {
                alias: alias.to_owned(),
            })?;

        let _ = self.visited.insert(alias.to_owned(), Visit::InProgress);
        self.stack.push(alias.to_owned());

        // Dependency edges never carry call arguments; arguments apply
        // only to the directly referenced alias.
        for dep in &entry.depends_on {
            self.visit(dep, &[])?;
        }

        match &entry.implementation {
            Some(Implementation::Concrete(mixin)) => self.output.push(mixin.clone()),
            Some(Implementation::Factory(factory)) => self.output.push(factory(args)),
            None => {}
        }

        let _ = self.stack.pop();
        let _ = self.visited.insert(alias.to_owned(), Visit::Done);
        Ok(())
    }
}

impl<M: Clone> Registry<M> {
    /// Expands `references` into a flat, deduplicated, dependency-ordered
    /// list of concrete mixins.
    ///
    /// Each alias contributes at most one entry, with its dependencies
    /// placed before it. Grouping aliases contribute only their members.
    /// Inline references are appended verbatim, in position, and are
    /// never deduplicated. Factories are invoked exactly once per call,
    /// at the point their alias is reached in the walk, with the call
    /// arguments of the top-level reference that reached them first.
    ///
    /// The registry is only read; on failure no partial list is exposed.
    ///
    /// # Errors
    ///
    /// Returns [`MixdepError::UnknownAlias`] if a referenced alias is not
    /// registered, [`MixdepError::CircularDependency`] if the dependency
    /// graph reached from a reference contains a cycle, or
    /// [`MixdepError::MalformedReference`] for invalid call-style syntax.
    pub fn resolve(&self, references: &[Reference<M>]) -> Result<Vec<M>> {
        tracing::debug!(count = references.len(), "resolving mixin references");
        let mut walk = Walk {
            registry: self,
            output: Vec::new(),
            visited: HashMap::new(),
            stack: Vec::new(),
        };

        for reference in references {
            match reference {
                Reference::Inline(mixin) => walk.output.push(mixin.clone()),
                Reference::Named(text) => {
                    let parsed = parse_reference(text)?;
                    walk.visit(&parsed.alias, &parsed.args)?;
                }
            }
        }

        Ok(walk.output)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn concrete(mixin: &'static str) -> Implementation<&'static str> {
        Implementation::concrete(mixin)
    }

    fn named(text: &str) -> Reference<&'static str> {
        Reference::named(text)
    }

    #[test]
    fn single_alias_resolves_to_its_mixin() {
        let mut registry = Registry::new();
        registry.add("m", concrete("implM"), &[]);

        let resolved = registry.resolve(&[named("m")]).expect("should resolve");
        assert_eq!(resolved, vec!["implM"]);
    }

    #[test]
    fn dependency_precedes_dependent() {
        let mut registry = Registry::new();
        registry.add("m1", concrete("impl1"), &[]);
        registry.add("m2", concrete("impl2"), &["m1"]);

        let resolved = registry.resolve(&[named("m2")]).expect("should resolve");
        assert_eq!(resolved, vec!["impl1", "impl2"]);
    }

    #[test]
    fn alias_contributes_at_most_once() {
        let mut registry = Registry::new();
        registry.add("base", concrete("implBase"), &[]);
        registry.add("a", concrete("implA"), &["base"]);
        registry.add("b", concrete("implB"), &["base"]);

        let resolved = registry
            .resolve(&[named("a"), named("b"), named("base")])
            .expect("should resolve");
        assert_eq!(resolved, vec!["implBase", "implA", "implB"]);
    }

    #[test]
    fn diamond_dependencies_resolve_in_declared_order() {
        let mut registry = Registry::new();
        registry.add("d", concrete("implD"), &[]);
        registry.add("b", concrete("implB"), &["d"]);
        registry.add("c", concrete("implC"), &["d"]);
        registry.add("a", concrete("implA"), &["b", "c"]);

        let resolved = registry.resolve(&[named("a")]).expect("should resolve");
        assert_eq!(resolved, vec!["implD", "implB", "implC", "implA"]);
    }

    #[test]
    fn duplicate_declared_dependencies_contribute_once() {
        let mut registry = Registry::new();
        registry.add("dep", concrete("implDep"), &[]);
        registry.add("m", concrete("implM"), &["dep", "dep"]);

        let resolved = registry.resolve(&[named("m")]).expect("should resolve");
        assert_eq!(resolved, vec!["implDep", "implM"]);
    }

    #[test]
    fn grouping_alias_contributes_only_members() {
        let mut registry = Registry::new();
        registry.add("m1", concrete("impl1"), &[]);
        registry.add("m2", concrete("impl2"), &[]);
        registry.alias("all", &["m1", "m2"]);

        let resolved = registry.resolve(&[named("all")]).expect("should resolve");
        assert_eq!(resolved, vec!["impl1", "impl2"]);
    }

    #[test]
    fn duplicate_add_keeps_first_registration() {
        let mut registry = Registry::new();
        registry.add("x", concrete("implA"), &[]);
        registry.add("x", concrete("implB"), &[]);

        let resolved = registry.resolve(&[named("x")]).expect("should resolve");
        assert_eq!(resolved, vec!["implA"]);
    }

    #[test]
    fn replace_wins_over_earlier_add() {
        let mut registry = Registry::new();
        registry.add("x", concrete("implA"), &[]);
        registry.replace("x", concrete("implB"), &[]);

        let resolved = registry.resolve(&[named("x")]).expect("should resolve");
        assert_eq!(resolved, vec!["implB"]);
    }

    #[test]
    fn factory_receives_call_arguments() {
        let mut registry = Registry::new();
        registry.add(
            "m",
            Implementation::factory(|args: &[Literal]| {
                if args.first().and_then(Literal::as_str) == Some("foo") {
                    "implTrue"
                } else {
                    "implFalse"
                }
            }),
            &[],
        );

        let resolved = registry
            .resolve(&[named("m(\"foo\")")])
            .expect("should resolve");
        assert_eq!(resolved, vec!["implTrue"]);
    }

    #[test]
    fn bare_factory_reference_gets_empty_arguments() {
        let mut registry = Registry::new();
        registry.add(
            "m",
            Implementation::factory(|args: &[Literal]| {
                if args.is_empty() { "noArgs" } else { "args" }
            }),
            &[],
        );

        let resolved = registry.resolve(&[named("m")]).expect("should resolve");
        assert_eq!(resolved, vec!["noArgs"]);
    }

    #[test]
    fn transitive_dependency_gets_no_args() {
        let mut registry = Registry::new();
        registry.add(
            "inner",
            Implementation::factory(|args: &[Literal]| {
                if args.is_empty() { "innerPlain" } else { "innerArgs" }
            }),
            &[],
        );
        registry.add(
            "outer",
            Implementation::factory(|args: &[Literal]| {
                if args.is_empty() { "outerPlain" } else { "outerArgs" }
            }),
            &["inner"],
        );

        let resolved = registry
            .resolve(&[named("outer(1)")])
            .expect("should resolve");
        assert_eq!(resolved, vec!["innerPlain", "outerArgs"]);
    }

    #[test]
    fn factory_invoked_once_per_resolution() {
        let calls = Rc::new(Cell::new(0_usize));
        let counter = Rc::clone(&calls);

        let mut registry = Registry::new();
        registry.add(
            "m",
            Implementation::factory(move |_: &[Literal]| {
                counter.set(counter.get() + 1);
                "made"
            }),
            &[],
        );
        registry.alias("group", &["m"]);

        // Reachable three times within one call: once via the group,
        // twice directly.
        let resolved = registry
            .resolve(&[named("group"), named("m(2)"), named("m")])
            .expect("should resolve");
        assert_eq!(resolved, vec!["made"]);
        assert_eq!(calls.get(), 1);

        let _ = registry.resolve(&[named("m")]).expect("should resolve");
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn unknown_alias_fails_naming_it() {
        let registry: Registry<&str> = Registry::new();
        let err = registry.resolve(&[named("missing")]).expect_err("should fail");
        assert!(matches!(
            err,
            MixdepError::UnknownAlias { alias } if alias == "missing"
        ));
    }

    #[test]
    fn unknown_transitive_dependency_fails() {
        let mut registry = Registry::new();
        registry.add("m", concrete("impl"), &["ghost"]);

        let err = registry.resolve(&[named("m")]).expect_err("should fail");
        assert!(matches!(
            err,
            MixdepError::UnknownAlias { alias } if alias == "ghost"
        ));
    }

    #[test]
    fn two_node_cycle_is_detected_with_path() {
        let mut registry = Registry::new();
        registry.add("a", concrete("implA"), &["b"]);
        registry.add("b", concrete("implB"), &["a"]);

        let err = registry.resolve(&[named("a")]).expect_err("should fail");
        match err {
            MixdepError::CircularDependency { path } => {
                assert_eq!(path, vec!["a", "b", "a"]);
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn self_cycle_is_detected() {
        let mut registry = Registry::new();
        registry.add("a", concrete("implA"), &["a"]);

        let err = registry.resolve(&[named("a")]).expect_err("should fail");
        match err {
            MixdepError::CircularDependency { path } => {
                assert_eq!(path, vec!["a", "a"]);
            }
            other => panic!("expected CircularDependency, got {other:?}"),
        }
    }

    #[test]
    fn repeat_across_siblings_is_not_a_cycle() {
        let mut registry = Registry::new();
        registry.add("shared", concrete("implShared"), &[]);
        registry.add("left", concrete("implLeft"), &["shared"]);
        registry.add("right", concrete("implRight"), &["shared"]);
        registry.add("top", concrete("implTop"), &["left", "right"]);

        let resolved = registry.resolve(&[named("top")]).expect("should resolve");
        assert_eq!(
            resolved,
            vec!["implShared", "implLeft", "implRight", "implTop"]
        );
    }

    #[test]
    fn inline_references_pass_through_unresolved() {
        let mut registry = Registry::new();
        registry.add("m1", concrete("impl1"), &[]);

        let resolved = registry
            .resolve(&[Reference::inline("raw"), named("m1"), Reference::inline("raw")])
            .expect("should resolve");
        assert_eq!(resolved, vec!["raw", "impl1", "raw"]);
    }

    #[test]
    fn malformed_reference_aborts_resolution() {
        let mut registry = Registry::new();
        registry.add("ok", concrete("implOk"), &[]);

        let err = registry
            .resolve(&[named("ok"), named("bad(1")])
            .expect_err("should fail");
        assert!(matches!(err, MixdepError::MalformedReference { .. }));
    }

    #[test]
    fn nested_grouping_aliases_expand_in_order() {
        let mut registry = Registry::new();
        registry.add("m1", concrete("impl1"), &[]);
        registry.add("m2", concrete("impl2"), &[]);
        registry.add("m3", concrete("impl3"), &[]);
        registry.alias("pair", &["m1", "m2"]);
        registry.alias("all", &["pair", "m3"]);

        let resolved = registry.resolve(&[named("all")]).expect("should resolve");
        assert_eq!(resolved, vec!["impl1", "impl2", "impl3"]);
    }

    #[test]
    fn injected_dependencies_participate_in_resolution() {
        let mut registry = Registry::new();
        registry.add("third_party", concrete("implTp"), &[]);
        registry.add("mine", concrete("implMine"), &[]);
        registry
            .inject("third_party", &["mine"])
            .expect("should inject");

        let resolved = registry
            .resolve(&[named("third_party")])
            .expect("should resolve");
        assert_eq!(resolved, vec!["implMine", "implTp"]);
    }

    #[test]
    fn resolve_does_not_mutate_the_registry() {
        let mut registry = Registry::new();
        registry.add("m", concrete("impl"), &[]);
        registry.alias("g", &["m"]);

        let first = registry.resolve(&[named("g")]).expect("should resolve");
        let second = registry.resolve(&[named("g")]).expect("should resolve");
        assert_eq!(first, second);
        assert_eq!(registry.len(), 2);
    }
}

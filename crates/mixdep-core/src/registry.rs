//! Alias-keyed mixin registration.
//!
//! The registry is an explicit value owned by the host application,
//! constructed once at startup and populated before any resolution runs.
//! Mutation takes `&mut self` and resolution takes `&self`, so the
//! populate-then-resolve discipline is enforced by the borrow checker.

use std::collections::HashMap;
use std::fmt;

use mixdep_common::error::{MixdepError, Result};
use mixdep_common::types::Literal;

/// The implementation form of a registered mixin.
pub enum Implementation<M> {
    /// A ready behavior value, cloned into each resolution that reaches it.
    Concrete(M),
    /// A dynamic mixin: a factory invoked at resolution time with the
    /// call arguments from the referencing string (empty when the alias
    /// is reached as a transitive dependency).
    Factory(Box<dyn Fn(&[Literal]) -> M>),
}

impl<M> Implementation<M> {
    /// Wraps a ready behavior value.
    #[must_use]
    pub const fn concrete(mixin: M) -> Self {
        Self::Concrete(mixin)
    }

    /// Wraps a factory producing the behavior value at resolution time.
    #[must_use]
    pub fn factory<F>(f: F) -> Self
    where
        F: Fn(&[Literal]) -> M + 'static,
    {
        Self::Factory(Box::new(f))
    }
}

impl<M: fmt::Debug> fmt::Debug for Implementation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(m) => f.debug_tuple("Concrete").field(m).finish(),
            Self::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

/// A single registration record.
#[derive(Debug)]
pub struct RegistryEntry<M> {
    /// The alias under which this entry was registered (case-sensitive).
    pub alias: String,
    /// The mixin implementation, or `None` for a pure grouping alias.
    pub implementation: Option<Implementation<M>>,
    /// Aliases that must be included before this entry, in declared
    /// order. Duplicates are allowed here and deduplicated during
    /// resolution.
    pub depends_on: Vec<String>,
}

impl<M> RegistryEntry<M> {
    /// Returns `true` if this entry is a pure grouping alias that
    /// contributes no behavior of its own.
    #[must_use]
    pub const fn is_grouping(&self) -> bool {
        self.implementation.is_none()
    }
}

/// A resolution input element: an alias reference (possibly call-style)
/// or a raw behavior value passed through verbatim.
#[derive(Debug)]
pub enum Reference<M> {
    /// A bare alias or call-style string, e.g. `"events"` or
    /// `"paginate(25)"`.
    Named(String),
    /// A raw behavior value not present in the registry. Included as-is,
    /// never deduplicated against aliases.
    Inline(M),
}

impl<M> Reference<M> {
    /// Builds a named (alias or call-style) reference.
    pub fn named(text: impl Into<String>) -> Self {
        Self::Named(text.into())
    }

    /// Builds an inline raw-behavior reference.
    pub const fn inline(mixin: M) -> Self {
        Self::Inline(mixin)
    }
}

impl<M> From<&str> for Reference<M> {
    fn from(text: &str) -> Self {
        Self::Named(text.to_owned())
    }
}

impl<M> From<String> for Reference<M> {
    fn from(text: String) -> Self {
        Self::Named(text)
    }
}

/// A registry of mixins keyed by alias.
///
/// Entries are created by [`add`](Self::add) and [`alias`](Self::alias),
/// mutated in place by [`inject`](Self::inject) and
/// [`replace`](Self::replace), and never deleted.
#[derive(Debug)]
pub struct Registry<M> {
    entries: HashMap<String, RegistryEntry<M>>,
    /// Registration order, for deterministic whole-registry validation.
    order: Vec<String>,
}

impl<M> Registry<M> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers `implementation` under `alias` with the given
    /// dependencies.
    ///
    /// This *will not* replace an existing entry: registering an alias
    /// twice is a silent no-op and the first registration wins. Use
    /// [`replace`](Self::replace) to overwrite.
    pub fn add(
        &mut self,
        alias: impl Into<String>,
        implementation: Implementation<M>,
        depends_on: &[&str],
    ) {
        let alias = alias.into();
        if self.entries.contains_key(&alias) {
            tracing::debug!(alias, "alias already registered, add skipped");
            return;
        }
        self.insert(alias, Some(implementation), depends_on);
    }

    /// Registers `implementation` under `alias`, unconditionally
    /// overwriting any existing entry (dependencies included).
    pub fn replace(
        &mut self,
        alias: impl Into<String>,
        implementation: Implementation<M>,
        depends_on: &[&str],
    ) {
        let alias = alias.into();
        if let Some(entry) = self.entries.get_mut(&alias) {
            entry.implementation = Some(implementation);
            entry.depends_on = depends_on.iter().map(|&d| d.to_owned()).collect();
        } else {
            self.insert(alias, Some(implementation), depends_on);
        }
    }

    /// Appends dependencies to an already-registered alias.
    ///
    /// Useful for attaching additional behavior to third-party mixins
    /// registered elsewhere. The entry must pre-exist; `inject` augments,
    /// never creates.
    ///
    /// # Errors
    ///
    /// Returns [`MixdepError::UnknownAlias`] if `alias` is not registered.
    pub fn inject(&mut self, alias: &str, depends_on: &[&str]) -> Result<()> {
        let entry = self
            .entries
            .get_mut(alias)
            .ok_or_else(|| MixdepError::UnknownAlias {
                alias: alias.to_owned(),
            })?;
        entry
            .depends_on
            .extend(depends_on.iter().map(|&d| d.to_owned()));
        Ok(())
    }

    /// Registers `group_alias` as a pure grouping entry: it has no
    /// implementation of its own and exists only to pull in its member
    /// aliases as dependencies.
    ///
    /// Follows [`add`](Self::add)'s first-wins rule: if `group_alias` is
    /// already registered, this call is a silent no-op (members do not
    /// accumulate across repeated calls).
    pub fn alias(&mut self, group_alias: impl Into<String>, member_aliases: &[&str]) {
        let group_alias = group_alias.into();
        if self.entries.contains_key(&group_alias) {
            tracing::debug!(alias = group_alias, "alias already registered, add skipped");
            return;
        }
        self.insert(group_alias, None, member_aliases);
    }

    /// Looks up the registration record for `alias`.
    #[must_use]
    pub fn get(&self, alias: &str) -> Option<&RegistryEntry<M>> {
        self.entries.get(alias)
    }

    /// Returns the number of registered aliases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no aliases are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over registered aliases in registration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn insert(
        &mut self,
        alias: String,
        implementation: Option<Implementation<M>>,
        depends_on: &[&str],
    ) {
        self.order.push(alias.clone());
        let _ = self.entries.insert(
            alias.clone(),
            RegistryEntry {
                alias,
                implementation,
                depends_on: depends_on.iter().map(|&d| d.to_owned()).collect(),
            },
        );
    }
}

impl<M> Default for Registry<M> {
    fn default() -> Self {
        Self::new()
    }
}

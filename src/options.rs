//! Dependency-following options and architecture selection.
//!
//! Both are composed from the configuration document and command-line flags.
//! Dependency options use OR semantics: a flag can enable a capability, never
//! disable one the configuration already enabled.

use crate::config::AptlyConfig;
use std::fmt;

/// Set of optional package relationships the dependency resolver should follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DependencyOptions(u8);

impl DependencyOptions {
    pub const FOLLOW_SUGGESTS: Self = Self(1);
    pub const FOLLOW_RECOMMENDS: Self = Self(1 << 1);
    pub const FOLLOW_ALL_VARIANTS: Self = Self(1 << 2);
    pub const FOLLOW_SOURCE: Self = Self(1 << 3);

    const NAMED: [(Self, &'static str); 4] = [
        (Self::FOLLOW_SUGGESTS, "suggests"),
        (Self::FOLLOW_RECOMMENDS, "recommends"),
        (Self::FOLLOW_ALL_VARIANTS, "all-variants"),
        (Self::FOLLOW_SOURCE, "source"),
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Names of the enabled capabilities, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl std::ops::BitOr for DependencyOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for DependencyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.names().collect();
        f.write_str(&names.join(","))
    }
}

/// Command-line side of the dependency options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyFlags {
    pub follow_suggests: bool,
    pub follow_recommends: bool,
    pub follow_all_variants: bool,
    pub follow_source: bool,
}

/// Enable each capability when either the configuration or the flag asks for it.
pub fn compose_dependency_options(
    config: &AptlyConfig,
    flags: &DependencyFlags,
) -> DependencyOptions {
    let pairs = [
        (
            config.dependency_follow_suggests || flags.follow_suggests,
            DependencyOptions::FOLLOW_SUGGESTS,
        ),
        (
            config.dependency_follow_recommends || flags.follow_recommends,
            DependencyOptions::FOLLOW_RECOMMENDS,
        ),
        (
            config.dependency_follow_all_variants || flags.follow_all_variants,
            DependencyOptions::FOLLOW_ALL_VARIANTS,
        ),
        (
            config.dependency_follow_source || flags.follow_source,
            DependencyOptions::FOLLOW_SOURCE,
        ),
    ];

    let mut options = DependencyOptions::empty();
    for (enabled, flag) in pairs {
        if enabled {
            options.insert(flag);
        }
    }
    options
}

/// A non-empty comma-separated override replaces the configured list verbatim.
pub fn resolve_architectures(config: &AptlyConfig, flag: Option<&str>) -> Vec<String> {
    match flag {
        Some(list) if !list.is_empty() => list.split(',').map(str::to_string).collect(),
        _ => config.architectures.clone(),
    }
}

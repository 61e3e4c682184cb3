//! Property-based tests for dependency option composition

use aptly::config::AptlyConfig;
use aptly::options::{compose_dependency_options, resolve_architectures, DependencyFlags, DependencyOptions};
use proptest::prelude::*;

fn capability_flags() -> impl Strategy<Value = [bool; 4]> {
    any::<[bool; 4]>()
}

proptest! {
    /// Each capability is on exactly when the config or the flag enables it.
    #[test]
    fn test_composition_is_or(config_bits in capability_flags(), flag_bits in capability_flags()) {
        let config = AptlyConfig {
            dependency_follow_suggests: config_bits[0],
            dependency_follow_recommends: config_bits[1],
            dependency_follow_all_variants: config_bits[2],
            dependency_follow_source: config_bits[3],
            ..AptlyConfig::default()
        };
        let flags = DependencyFlags {
            follow_suggests: flag_bits[0],
            follow_recommends: flag_bits[1],
            follow_all_variants: flag_bits[2],
            follow_source: flag_bits[3],
        };

        let options = compose_dependency_options(&config, &flags);
        let capabilities = [
            DependencyOptions::FOLLOW_SUGGESTS,
            DependencyOptions::FOLLOW_RECOMMENDS,
            DependencyOptions::FOLLOW_ALL_VARIANTS,
            DependencyOptions::FOLLOW_SOURCE,
        ];
        for (i, capability) in capabilities.into_iter().enumerate() {
            prop_assert_eq!(options.contains(capability), config_bits[i] || flag_bits[i]);
        }
    }

    /// A non-empty override is split verbatim; an empty one keeps the config list.
    #[test]
    fn test_architecture_override(
        configured in prop::collection::vec("[a-z0-9]{1,8}", 0..4),
        requested in prop::collection::vec("[a-z0-9]{1,8}", 0..4),
    ) {
        let config = AptlyConfig {
            architectures: configured.clone(),
            ..AptlyConfig::default()
        };
        let flag = requested.join(",");

        let resolved = resolve_architectures(&config, Some(&flag));
        if requested.is_empty() {
            prop_assert_eq!(resolved, configured);
        } else {
            prop_assert_eq!(resolved, requested);
        }
    }
}

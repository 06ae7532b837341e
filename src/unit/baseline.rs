//! Managed defaults computed from the current flags.

use super::{DirectiveMap, OrderingSet};
use crate::flags::FeatureFlags;

/// Resource limits emitted for every service.
pub const DEFAULT_LIMITS: &[(&str, &str)] = &[
    ("LimitNOFILE", "65536"),
    ("LimitNPROC", "4096"),
    ("LimitCORE", "0"),
    ("TimeoutStartSec", "300"),
    ("TimeoutStopSec", "300"),
];

/// Groups granted to services with device access.
pub const DEVICE_GROUPS: &[&str] = &["dialout", "plugdev"];

/// Device rules for services with restricted (not full) device access.
pub const DEVICE_ALLOW: &[&str] = &["char-usb rwm", "char-tty rwm"];

/// Freshly computed managed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub defaults: DirectiveMap,
    /// Minimum ordering; merged with, never replacing, what the user had.
    pub ordering: OrderingSet,
}

impl Baseline {
    pub fn build(flags: &FeatureFlags) -> Self {
        Self {
            defaults: default_limits(),
            ordering: ordering_seed(flags),
        }
    }
}

pub fn default_limits() -> DirectiveMap {
    DEFAULT_LIMITS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Units the service must start after (and require).
///
/// Listening services wait for `network-online.target`; other networked
/// services only need `network.target`. Without network, ordering after
/// local filesystems is enough and nothing is required.
pub fn ordering_seed(flags: &FeatureFlags) -> OrderingSet {
    let mut ordering = OrderingSet::new();

    if flags.network {
        let target = if flags.listening {
            "network-online.target"
        } else {
            "network.target"
        };
        ordering.add_after(target);
        ordering.add_requires(target);
    } else {
        ordering.add_after("local-fs.target");
    }

    ordering
}

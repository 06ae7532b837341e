//! Merge a previous unit file with the freshly computed baseline.

use anyhow::Result;
use std::path::Path;

use super::baseline::{Baseline, DEVICE_ALLOW, DEVICE_GROUPS};
use super::format::{format_custom, format_defaults};
use super::parser::{self, Preserved};
use super::target::UnitTarget;
use super::{CustomDirectives, DirectiveMap, ManagedKeys, OrderingSet};

/// Result of one reconciliation pass, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Flags are normalized.
    pub target: UnitTarget,
    pub ordering: OrderingSet,
    pub defaults: DirectiveMap,
    pub custom: CustomDirectives,
}

impl Reconciled {
    pub fn defaults_block(&self) -> String {
        format_defaults(&self.defaults)
    }

    pub fn custom_block(&self) -> String {
        format_custom(&self.custom)
    }
}

/// Runs reconciliation against a fixed managed key registry.
pub struct Reconciler<'a> {
    registry: &'a ManagedKeys,
    previous: Option<UnitTarget>,
}

impl<'a> Reconciler<'a> {
    pub fn new(registry: &'a ManagedKeys) -> Self {
        Self {
            registry,
            previous: None,
        }
    }

    /// The target the existing unit file was generated for.
    ///
    /// Lines that run wrote are generator output even when the current flags
    /// no longer produce them, so a flag change drops them instead of
    /// keeping them as custom.
    pub fn with_previous(mut self, previous: UnitTarget) -> Self {
        self.previous = Some(previous);
        self
    }

    /// Reconcile against the unit file at `existing`, if any.
    ///
    /// A missing file is a first run; a file that cannot be read is an error.
    pub fn reconcile(&self, target: UnitTarget, existing: Option<&Path>) -> Result<Reconciled> {
        let content = match existing {
            Some(path) => parser::read_existing(path)?,
            None => None,
        };
        self.reconcile_content(target, content.as_deref())
    }

    /// Reconcile against unit file text already in memory.
    ///
    /// Fails only if the service template references a variable the target
    /// does not provide.
    pub fn reconcile_content(
        &self,
        mut target: UnitTarget,
        existing: Option<&str>,
    ) -> Result<Reconciled> {
        let Baseline {
            mut defaults,
            mut ordering,
        } = Baseline::build(&target.flags);

        let Preserved {
            ordering: preserved_ordering,
            mut custom,
        } = match existing {
            Some(content) => {
                let mut rendered = target.clone();
                rendered.flags.normalize();
                let mut managed = self.registry.resolve(&rendered)?;
                if let Some(previous) = &self.previous {
                    let mut previous = previous.clone();
                    previous.flags.normalize();
                    managed.extend(self.registry.resolve(&previous)?);
                }
                parser::classify(content, &managed, &mut defaults)
            }
            None => Preserved::default(),
        };

        ordering.merge(&preserved_ordering);

        // Device defaults go in after parsing so a user's own values win.
        if target.flags.devices {
            custom.seed("SupplementaryGroups", DEVICE_GROUPS);
            if !target.flags.full_devices {
                custom.seed("DeviceAllow", DEVICE_ALLOW);
            }
        }

        target.flags.normalize();

        Ok(Reconciled {
            target,
            ordering,
            defaults,
            custom,
        })
    }
}

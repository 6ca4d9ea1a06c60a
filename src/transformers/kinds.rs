//! Kind classification
//!
//! Decides, from a resource's group and kind, which nested locations receive
//! common labels and annotations in addition to the resource's own
//! `metadata`. Kinds are looked up in a static table; anything not listed
//! (including custom resources) only has its top-level metadata touched.

use std::fmt;

/// Which metadata map a transformer writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetadataField {
    Labels,
    Annotations,
}

impl MetadataField {
    pub fn key(self) -> &'static str {
        match self {
            MetadataField::Labels => "labels",
            MetadataField::Annotations => "annotations",
        }
    }
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which transformer flavors a rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Selector fields; annotations never populate match criteria
    LabelsOnly,
    LabelsAndAnnotations,
}

impl Scope {
    pub fn includes(self, field: MetadataField) -> bool {
        match self {
            Scope::LabelsOnly => field == MetadataField::Labels,
            Scope::LabelsAndAnnotations => true,
        }
    }
}

/// Final segment of an injection path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Leaf {
    /// `labels` or `annotations`, depending on the transformer
    Metadata,
    Key(&'static str),
}

/// One location to inject pairs into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectionRule {
    pub parent: &'static [&'static str],
    pub leaf: Leaf,
    pub scope: Scope,
    /// Create missing containers along the path; otherwise skip the rule
    pub create: bool,
}

impl InjectionRule {
    const fn metadata(parent: &'static [&'static str]) -> Self {
        Self {
            parent,
            leaf: Leaf::Metadata,
            scope: Scope::LabelsAndAnnotations,
            create: true,
        }
    }

    const fn selector(parent: &'static [&'static str], key: &'static str, create: bool) -> Self {
        Self {
            parent,
            leaf: Leaf::Key(key),
            scope: Scope::LabelsOnly,
            create,
        }
    }

    /// Full path of mapping keys for the given transformer flavor.
    pub fn path(&self, field: MetadataField) -> Vec<&'static str> {
        let leaf = match self.leaf {
            Leaf::Metadata => field.key(),
            Leaf::Key(key) => key,
        };
        let mut path = self.parent.to_vec();
        path.push(leaf);
        path
    }
}

/// Structural class of a kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindClass {
    /// Pod template plus `spec.selector.matchLabels`
    Workload,
    /// Pod template plus a flat `spec.selector`. ReplicationController
    /// selectors are plain `map[string]string`, so they never get a
    /// `matchLabels` wrapper.
    LegacyWorkload,
    /// Flat `spec.selector` only
    ServiceSelector,
    /// Job template nested under `spec.jobTemplate`
    CronWorkload,
    /// Pre-existing `spec.selector.matchLabels` only
    DisruptionBudget,
    Generic,
}

const UNIVERSAL: InjectionRule = InjectionRule::metadata(&["metadata"]);

const WORKLOAD_RULES: &[InjectionRule] = &[
    InjectionRule::metadata(&["spec", "template", "metadata"]),
    InjectionRule::selector(&["spec", "selector"], "matchLabels", true),
];

const LEGACY_WORKLOAD_RULES: &[InjectionRule] = &[
    InjectionRule::metadata(&["spec", "template", "metadata"]),
    InjectionRule::selector(&["spec"], "selector", true),
];

const SERVICE_RULES: &[InjectionRule] = &[InjectionRule::selector(&["spec"], "selector", true)];

const CRON_WORKLOAD_RULES: &[InjectionRule] = &[
    InjectionRule::metadata(&["spec", "jobTemplate", "metadata"]),
    InjectionRule::metadata(&["spec", "jobTemplate", "spec", "template", "metadata"]),
    InjectionRule::selector(&["spec", "jobTemplate", "spec", "selector"], "matchLabels", false),
];

const DISRUPTION_BUDGET_RULES: &[InjectionRule] = &[InjectionRule::selector(
    &["spec", "selector"],
    "matchLabels",
    false,
)];

impl KindClass {
    /// Rules beyond the universal `metadata` one.
    pub fn rules(self) -> &'static [InjectionRule] {
        match self {
            KindClass::Workload => WORKLOAD_RULES,
            KindClass::LegacyWorkload => LEGACY_WORKLOAD_RULES,
            KindClass::ServiceSelector => SERVICE_RULES,
            KindClass::CronWorkload => CRON_WORKLOAD_RULES,
            KindClass::DisruptionBudget => DISRUPTION_BUDGET_RULES,
            KindClass::Generic => &[],
        }
    }
}

struct KindEntry {
    groups: &'static [&'static str],
    kind: &'static str,
    class: KindClass,
}

const CORE: &[&str] = &[""];
const APPS: &[&str] = &["apps"];
const APPS_OR_EXTENSIONS: &[&str] = &["apps", "extensions"];
const BATCH: &[&str] = &["batch"];
const POLICY: &[&str] = &["policy"];

#[rustfmt::skip]
const KIND_TABLE: &[KindEntry] = &[
    KindEntry { groups: APPS_OR_EXTENSIONS, kind: "Deployment", class: KindClass::Workload },
    KindEntry { groups: APPS, kind: "StatefulSet", class: KindClass::Workload },
    KindEntry { groups: APPS_OR_EXTENSIONS, kind: "DaemonSet", class: KindClass::Workload },
    KindEntry { groups: APPS_OR_EXTENSIONS, kind: "ReplicaSet", class: KindClass::Workload },
    KindEntry { groups: BATCH, kind: "Job", class: KindClass::Workload },
    KindEntry { groups: CORE, kind: "ReplicationController", class: KindClass::LegacyWorkload },
    KindEntry { groups: CORE, kind: "Service", class: KindClass::ServiceSelector },
    KindEntry { groups: BATCH, kind: "CronJob", class: KindClass::CronWorkload },
    KindEntry { groups: POLICY, kind: "PodDisruptionBudget", class: KindClass::DisruptionBudget },
];

/// Look up the structural class of a (group, kind) pair.
pub fn kind_class(group: &str, kind: &str) -> KindClass {
    KIND_TABLE
        .iter()
        .find(|entry| entry.kind == kind && entry.groups.contains(&group))
        .map(|entry| entry.class)
        .unwrap_or(KindClass::Generic)
}

/// All injection rules for a resource, universal `metadata` rule first.
pub fn classify(group: &str, kind: &str) -> Vec<InjectionRule> {
    let extra = kind_class(group, kind).rules();
    let mut rules = Vec::with_capacity(extra.len() + 1);
    rules.push(UNIVERSAL);
    rules.extend_from_slice(extra);
    rules
}

//! Property tests for label and annotation propagation.
//!
//! Generates random valid pair-sets and random resource mixes, then checks
//! that a transform is idempotent, covers every resource's metadata, keeps
//! selectors free of annotations and leaves generic kinds' specs untouched.

use std::collections::BTreeMap;

use kube_labeler::transformers::MetadataField;
use kube_labeler::{Gvk, MapTransformer, ResId, ResMap, Resource, Transformer};
use proptest::prelude::*;
use serde_yaml::Value;

const FIXTURES: &[(&str, &str, &str, &str)] = &[
    (
        "",
        "v1",
        "ConfigMap",
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: NAME\ndata:\n  key: value\n",
    ),
    (
        "",
        "v1",
        "Secret",
        "apiVersion: v1\nkind: Secret\nmetadata:\n  name: NAME\ntype: Opaque\n",
    ),
    (
        "example.com",
        "v1",
        "Foo",
        "apiVersion: example.com/v1\nkind: Foo\nmetadata:\n  name: NAME\nspec:\n  selector:\n    matchLabels: {}\n",
    ),
    (
        "apps",
        "v1",
        "Deployment",
        "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: NAME\nspec:\n  template:\n    metadata:\n      labels:\n        pre-existing: kept\n",
    ),
    (
        "apps",
        "v1",
        "StatefulSet",
        "apiVersion: apps/v1\nkind: StatefulSet\nmetadata:\n  name: NAME\nspec:\n  selector:\n    matchLabels:\n      pre-existing: kept\n",
    ),
    (
        "apps",
        "v1",
        "DaemonSet",
        "apiVersion: apps/v1\nkind: DaemonSet\nmetadata:\n  name: NAME\nspec:\n  template:\n    spec:\n      containers: []\n",
    ),
    (
        "batch",
        "v1",
        "Job",
        "apiVersion: batch/v1\nkind: Job\nmetadata:\n  name: NAME\nspec:\n  template:\n    metadata:\n      annotations:\n        pre-existing: kept\n",
    ),
    (
        "",
        "v1",
        "Service",
        "apiVersion: v1\nkind: Service\nmetadata:\n  name: NAME\nspec:\n  ports:\n  - port: 80\n",
    ),
];

fn is_generic(kind: &str) -> bool {
    matches!(kind, "ConfigMap" | "Secret" | "Foo")
}

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-z0-9-]{0,10}[a-z0-9]",
        "[a-z]{1,8}\\.io/[a-z][a-z0-9]{0,8}",
    ]
}

fn pairs_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map(
        key_strategy().prop_filter("reserved fixture key", |k| k != "pre-existing"),
        "[A-Za-z0-9]([A-Za-z0-9._-]{0,8}[A-Za-z0-9])?",
        1..5,
    )
}

fn resmap_strategy() -> impl Strategy<Value = ResMap> {
    prop::collection::vec((0..FIXTURES.len(), 0u8..3), 1..8).prop_map(|picks| {
        picks
            .into_iter()
            .map(|(fixture, suffix)| {
                let (group, version, kind, yaml) = FIXTURES[fixture];
                let name = format!("{}-{}", kind.to_lowercase(), suffix);
                let resource = Resource::from_yaml(&yaml.replace("NAME", &name))
                    .expect("fixture should parse");
                (ResId::new(Gvk::new(group, version, kind), &name), resource)
            })
            .collect()
    })
}

fn mapping_at<'a>(resource: &'a Resource, path: &[&str]) -> Option<&'a serde_yaml::Mapping> {
    resource.get_path(path).and_then(Value::as_mapping)
}

fn contains_all(mapping: Option<&serde_yaml::Mapping>, pairs: &BTreeMap<String, String>) -> bool {
    mapping.is_some_and(|m| {
        pairs
            .iter()
            .all(|(k, v)| m.get(k.as_str()).and_then(Value::as_str) == Some(v.as_str()))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn labels_are_idempotent(resmap in resmap_strategy(), pairs in pairs_strategy()) {
        let lt = MapTransformer::labels(pairs).unwrap();
        let mut once = resmap;
        lt.transform(&mut once).unwrap();
        let mut twice = once.clone();
        lt.transform(&mut twice).unwrap();
        prop_assert!(once.error_if_not_equal(&twice).is_ok());
    }

    #[test]
    fn annotations_are_idempotent(resmap in resmap_strategy(), pairs in pairs_strategy()) {
        let at = MapTransformer::annotations(pairs).unwrap();
        let mut once = resmap;
        at.transform(&mut once).unwrap();
        let mut twice = once.clone();
        at.transform(&mut twice).unwrap();
        prop_assert!(once.error_if_not_equal(&twice).is_ok());
    }

    #[test]
    fn labels_reach_every_applicable_location(
        resmap in resmap_strategy(),
        pairs in pairs_strategy(),
    ) {
        let original = resmap.clone();
        let mut m = resmap;
        MapTransformer::labels(pairs.clone()).unwrap().transform(&mut m).unwrap();

        for (id, res) in m.iter() {
            prop_assert!(contains_all(mapping_at(res, &["metadata", "labels"]), &pairs));

            let before = original.get(id).unwrap();
            match id.gvk.kind.as_str() {
                "Deployment" | "StatefulSet" | "DaemonSet" | "Job" => {
                    prop_assert!(contains_all(
                        mapping_at(res, &["spec", "template", "metadata", "labels"]),
                        &pairs
                    ));
                    prop_assert!(contains_all(
                        mapping_at(res, &["spec", "selector", "matchLabels"]),
                        &pairs
                    ));
                    for path in [
                        &["spec", "template", "metadata", "labels"][..],
                        &["spec", "selector", "matchLabels"][..],
                    ] {
                        if let Some(prior) = mapping_at(before, path) {
                            let after = mapping_at(res, path).unwrap();
                            for (k, v) in prior {
                                prop_assert_eq!(after.get(k), Some(v));
                            }
                        }
                    }
                }
                "Service" => {
                    prop_assert!(contains_all(mapping_at(res, &["spec", "selector"]), &pairs));
                    prop_assert_eq!(res.get_path(&["spec", "ports"]), before.get_path(&["spec", "ports"]));
                }
                kind => {
                    prop_assert!(is_generic(kind));
                    prop_assert_eq!(res.get_path(&["spec"]), before.get_path(&["spec"]));
                }
            }
        }
    }

    #[test]
    fn annotations_never_reach_selectors(
        resmap in resmap_strategy(),
        pairs in pairs_strategy(),
    ) {
        let original = resmap.clone();
        let mut m = resmap;
        let at = MapTransformer::annotations(pairs.clone()).unwrap();
        prop_assert_eq!(at.field(), MetadataField::Annotations);
        at.transform(&mut m).unwrap();

        for (id, res) in m.iter() {
            prop_assert!(contains_all(mapping_at(res, &["metadata", "annotations"]), &pairs));
            let before = original.get(id).unwrap();
            prop_assert_eq!(
                res.get_path(&["spec", "selector"]),
                before.get_path(&["spec", "selector"])
            );
            if is_generic(&id.gvk.kind) {
                prop_assert_eq!(res.get_path(&["spec"]), before.get_path(&["spec"]));
            }
        }
    }
}

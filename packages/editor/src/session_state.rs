//! # Session Layout
//!
//! Where a store keeps its state, and how the custom topic side-table is
//! layered onto a tree.
//!
//! ```text
//! <prefix>_config    full document JSON, rules re-serialized from the tree
//! <prefix>_clusters  [{ "name": lemma, "customTopics": [...] }]
//! ```

use expectations_common::{read_json, write_json, CommonResult, SessionStore};
use expectations_parser::{ClusterTopicSet, ConfigurationTree, RawDocument};
use tracing::debug;

/// Session keys for one assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub config: String,
    pub clusters: String,
}

impl SessionKeys {
    /// Keys scoped to `prefix`, normally the assignment id.
    ///
    /// The prefix is kept verbatim; backends with a restricted key alphabet
    /// escape it themselves.
    pub fn new(prefix: &str) -> Self {
        Self {
            config: format!("{prefix}_config"),
            clusters: format!("{prefix}_clusters"),
        }
    }
}

pub fn read_document(store: &dyn SessionStore, keys: &SessionKeys) -> Option<RawDocument> {
    read_json(store, &keys.config)
}

pub fn write_document(
    store: &mut dyn SessionStore,
    keys: &SessionKeys,
    document: &RawDocument,
) -> CommonResult<()> {
    write_json(store, &keys.config, document)
}

pub fn read_topic_set(store: &dyn SessionStore, keys: &SessionKeys) -> Option<ClusterTopicSet> {
    read_json(store, &keys.clusters)
}

pub fn write_topic_set(
    store: &mut dyn SessionStore,
    keys: &SessionKeys,
    topics: &ClusterTopicSet,
) -> CommonResult<()> {
    write_json(store, &keys.clusters, topics)
}

/// Drop both keys
pub fn clear(store: &mut dyn SessionStore, keys: &SessionKeys) -> CommonResult<()> {
    store.remove(&keys.config)?;
    store.remove(&keys.clusters)
}

/// Overwrite the custom terms of every cluster whose lemma has an entry.
/// Clusters without a lemma keep their own terms.
///
/// Returns the number of clusters touched.
pub fn apply_topic_set(tree: &mut ConfigurationTree, topics: &ClusterTopicSet) -> usize {
    let mut touched = 0;
    for cluster in tree.clusters_mut() {
        if cluster.topic.lemma.is_empty() {
            continue;
        }
        if let Some(entry) = topics.get(&cluster.topic.lemma) {
            cluster.topic.custom_terms = entry.custom_topics.clone();
            touched += 1;
        }
    }
    debug!(entries = topics.len(), touched, "Applied custom topic side-table");
    touched
}

/// Side-table to keep after a load: `base` with every stored entry layered
/// on top. Stored lemmas the tree no longer has are kept.
pub fn layer_topic_sets(base: ClusterTopicSet, stored: Option<&ClusterTopicSet>) -> ClusterTopicSet {
    let mut layered = base;
    if let Some(stored) = stored {
        layered.overlay(stored);
    }
    layered
}

#[cfg(test)]
mod tests {
    use super::*;
    use expectations_common::MemorySessionStore;
    use expectations_parser::{Cluster, ClusterTopics, Rule, Topic};

    fn tree() -> ConfigurationTree {
        let cluster = |lemma: &str, custom: &[&str]| Cluster {
            topic: Topic {
                lemma: lemma.to_string(),
                custom_terms: custom.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            ..Default::default()
        };

        ConfigurationTree {
            rules: vec![Rule {
                children: vec![cluster("Sample", &["cohort"]), cluster("Spread", &[])],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_keys_are_scoped_to_prefix() {
        let keys = SessionKeys::new("course 12/assignment");
        assert_eq!(keys.config, "course 12/assignment_config");
        assert_eq!(keys.clusters, "course 12/assignment_clusters");
    }

    #[test]
    fn test_similar_prefixes_do_not_collide() {
        let dotted = SessionKeys::new("course.7");
        let plain = SessionKeys::new("course_7");
        assert_ne!(dotted.config, plain.config);
        assert_ne!(dotted.clusters, plain.clusters);
    }

    #[test]
    fn test_corrupt_side_table_reads_as_absent() {
        let keys = SessionKeys::new("a1");
        let mut store = MemorySessionStore::new();
        store.set(&keys.clusters, "{not json").unwrap();

        assert!(read_topic_set(&store, &keys).is_none());
    }

    #[test]
    fn test_apply_only_touches_matching_lemmas() {
        let mut tree = tree();
        let topics: ClusterTopicSet = vec![ClusterTopics {
            name: "Spread".into(),
            custom_topics: vec!["range".into()],
        }]
        .into_iter()
        .collect();

        assert_eq!(apply_topic_set(&mut tree, &topics), 1);
        assert_eq!(tree.rules[0].children[0].topic.custom_terms, vec!["cohort"]);
        assert_eq!(tree.rules[0].children[1].topic.custom_terms, vec!["range"]);
    }

    #[test]
    fn test_apply_skips_clusters_without_lemma() {
        let mut tree = tree();
        tree.rules[0].children[0].topic.lemma.clear();
        let topics: ClusterTopicSet = vec![ClusterTopics {
            name: String::new(),
            custom_topics: vec!["stray".into()],
        }]
        .into_iter()
        .collect();

        assert_eq!(apply_topic_set(&mut tree, &topics), 0);
        assert_eq!(tree.rules[0].children[0].topic.custom_terms, vec!["cohort"]);
    }

    #[test]
    fn test_layering_keeps_orphans() {
        let base = ClusterTopicSet::defaults_for(&tree().rules);
        let stored: ClusterTopicSet = vec![ClusterTopics {
            name: "Retired".into(),
            custom_topics: vec!["old".into()],
        }]
        .into_iter()
        .collect();

        let layered = layer_topic_sets(base, Some(&stored));
        let names: Vec<_> = layered.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Sample", "Spread", "Retired"]);
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let keys = SessionKeys::new("a1");
        let mut store = MemorySessionStore::new();
        write_document(&mut store, &keys, &RawDocument::default()).unwrap();
        write_topic_set(&mut store, &keys, &ClusterTopicSet::new()).unwrap();

        clear(&mut store, &keys).unwrap();
        assert!(store.is_empty());
    }
}

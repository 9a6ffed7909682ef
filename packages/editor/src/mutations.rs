//! # Tree Mutations
//!
//! The only two ways a loaded tree changes in place.
//!
//! ### SetClusterCustomTopics
//! - Replaces the cluster's custom terms with exactly the given list
//! - Persisted together with the custom topic side-table
//! - Does not check for duplicates; see `ConfigurationStore::try_update_cluster_topics`
//!
//! ### UpdateLemmaCounts
//! - Complete snapshot of usage counts, last entry per lemma wins
//! - Not persisted

use crate::duplicates::DuplicateMatch;
use crate::notifier::ChangeEvent;
use crate::usage::{update_lemma_counts, LemmaCount};
use expectations_parser::ConfigurationTree;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Replace the custom terms of one cluster
    #[serde(rename_all = "camelCase")]
    SetClusterCustomTopics {
        rule_index: usize,
        cluster_index: usize,
        topics: Vec<String>,
    },

    /// Replace all usage counts with a tagger snapshot
    UpdateLemmaCounts { counts: Vec<LemmaCount> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("No cluster at rule {rule_index}, cluster {cluster_index}")]
    ClusterNotFound {
        rule_index: usize,
        cluster_index: usize,
    },

    #[error("Duplicate topic: {0}")]
    DuplicateTopic(DuplicateMatch),
}

impl Mutation {
    /// Check the mutation against the tree without changing it
    pub fn validate(&self, tree: &ConfigurationTree) -> Result<(), MutationError> {
        match self {
            Mutation::SetClusterCustomTopics {
                rule_index,
                cluster_index,
                ..
            } => {
                tree.cluster(*rule_index, *cluster_index)
                    .ok_or(MutationError::ClusterNotFound {
                        rule_index: *rule_index,
                        cluster_index: *cluster_index,
                    })?;
                Ok(())
            }
            Mutation::UpdateLemmaCounts { .. } => Ok(()),
        }
    }

    /// Validate, then apply in place
    pub fn apply(&self, tree: &mut ConfigurationTree) -> Result<(), MutationError> {
        self.validate(tree)?;

        match self {
            Mutation::SetClusterCustomTopics {
                rule_index,
                cluster_index,
                topics,
            } => {
                let cluster = tree.cluster_mut(*rule_index, *cluster_index).ok_or(
                    MutationError::ClusterNotFound {
                        rule_index: *rule_index,
                        cluster_index: *cluster_index,
                    },
                )?;
                cluster.topic.custom_terms = topics.clone();
                Ok(())
            }
            Mutation::UpdateLemmaCounts { counts } => {
                update_lemma_counts(tree, counts);
                Ok(())
            }
        }
    }

    /// Whether the change must be written to the session store
    pub fn persists(&self) -> bool {
        matches!(self, Mutation::SetClusterCustomTopics { .. })
    }

    pub fn event(&self) -> ChangeEvent {
        ChangeEvent::Mutated
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::SetClusterCustomTopics { .. } => "set_cluster_custom_topics",
            Mutation::UpdateLemmaCounts { .. } => "update_lemma_counts",
        }
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Store version after the change
    pub version: u64,
    pub event: ChangeEvent,
}

/// Trim, drop blanks and drop case-insensitive repeats (first spelling kept)
pub fn normalize_topics<S: AsRef<str>>(topics: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    topics
        .iter()
        .map(|topic| topic.as_ref().trim())
        .filter(|topic| !topic.is_empty())
        .filter(|topic| seen.insert(topic.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expectations_parser::{Cluster, Rule, Topic};

    fn tree() -> ConfigurationTree {
        ConfigurationTree {
            rules: vec![Rule {
                children: vec![Cluster {
                    topic: Topic {
                        lemma: "Data Descriptors".into(),
                        predefined_terms: vec!["mean".into()],
                        ..Default::default()
                    },
                    usage_count: 2,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::SetClusterCustomTopics {
            rule_index: 0,
            cluster_index: 1,
            topics: vec!["mode".into()],
        };

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json["type"], "setClusterCustomTopics");
        assert_eq!(json["ruleIndex"], 0);

        let back: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(back, mutation);
    }

    #[test]
    fn test_missing_cluster_leaves_tree_untouched() {
        let mut tree = tree();
        let before = tree.clone();

        let mutation = Mutation::SetClusterCustomTopics {
            rule_index: 0,
            cluster_index: 999,
            topics: vec!["x".into()],
        };

        assert_eq!(
            mutation.apply(&mut tree),
            Err(MutationError::ClusterNotFound {
                rule_index: 0,
                cluster_index: 999
            })
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn test_set_custom_topics_replaces_exactly() {
        let mut tree = tree();
        Mutation::SetClusterCustomTopics {
            rule_index: 0,
            cluster_index: 0,
            topics: vec!["Mean".into(), " spaced ".into()],
        }
        .apply(&mut tree)
        .unwrap();

        assert_eq!(tree.rules[0].children[0].topic.custom_terms, vec!["Mean", " spaced "]);
    }

    #[test]
    fn test_only_topic_edits_persist() {
        let counts = Mutation::UpdateLemmaCounts { counts: vec![] };
        assert!(!counts.persists());
        assert_eq!(counts.event(), ChangeEvent::Mutated);
    }

    #[test]
    fn test_normalize_topics() {
        let normalized = normalize_topics(&["  outlier ", "", "Mode", "mode", "   ", "IQR"]);
        assert_eq!(normalized, vec!["outlier", "Mode", "IQR"]);
    }
}

use crate::ast::Rule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Custom topics recorded for one cluster lemma
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterTopics {
    /// Cluster lemma
    pub name: String,
    #[serde(default)]
    pub custom_topics: Vec<String>,
}

/// Side-table of custom topics keyed by lemma.
///
/// Persisted next to the document so custom topics survive a reload that
/// replaces the rest of the local copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterTopicSet {
    entries: Vec<ClusterTopics>,
}

impl ClusterTopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every distinct non-empty lemma of the tree with an empty custom list
    pub fn defaults_for(rules: &[Rule]) -> Self {
        Self::collect(rules, |_| Vec::new())
    }

    /// Every distinct non-empty lemma of the tree with its current custom list
    pub fn snapshot_of(rules: &[Rule]) -> Self {
        Self::collect(rules, |terms| terms.to_vec())
    }

    fn collect(rules: &[Rule], custom: impl Fn(&[String]) -> Vec<String>) -> Self {
        let mut seen = HashSet::new();
        let entries = rules
            .iter()
            .flat_map(|rule| rule.children.iter())
            .filter(|cluster| !cluster.topic.lemma.is_empty())
            .filter(|cluster| seen.insert(cluster.topic.lemma.clone()))
            .map(|cluster| ClusterTopics {
                name: cluster.topic.lemma.clone(),
                custom_topics: custom(&cluster.topic.custom_terms),
            })
            .collect();

        Self { entries }
    }

    pub fn get(&self, lemma: &str) -> Option<&ClusterTopics> {
        self.entries.iter().find(|entry| entry.name == lemma)
    }

    pub fn contains(&self, lemma: &str) -> bool {
        self.get(lemma).is_some()
    }

    /// Append an entry unless its lemma is already present
    pub fn push(&mut self, entry: ClusterTopics) -> bool {
        if self.contains(&entry.name) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Replace entries that share a lemma with `other`, append the rest
    pub fn overlay(&mut self, other: &ClusterTopicSet) {
        for entry in &other.entries {
            match self.entries.iter_mut().find(|own| own.name == entry.name) {
                Some(own) => own.custom_topics = entry.custom_topics.clone(),
                None => self.entries.push(entry.clone()),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClusterTopics> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<ClusterTopics> for ClusterTopicSet {
    fn from_iter<I: IntoIterator<Item = ClusterTopics>>(iter: I) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.push(entry);
        }
        set
    }
}

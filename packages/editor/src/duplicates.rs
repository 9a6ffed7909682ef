//! # Duplicate Topic Detection
//!
//! Finds the first cluster, in document order, whose predefined or custom
//! terms already contain one of the candidate terms. Matching ignores case
//! but not surrounding whitespace.

use expectations_parser::{Cluster, ConfigurationTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Which list of the colliding cluster held the term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Predefined,
    Custom,
}

/// First collision found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateMatch {
    pub rule_index: usize,
    pub cluster_index: usize,
    /// Lemma of the cluster that already owns the term
    pub lemma: String,
    /// The colliding candidate, in the caller's casing
    pub topic: String,
    pub match_type: MatchType,
}

impl fmt::Display for DuplicateMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' already belongs to {} [{}.{}]",
            self.topic, self.lemma, self.rule_index, self.cluster_index
        )
    }
}

/// Scans a tree for candidate collisions
pub struct DuplicateDetector<'a> {
    tree: &'a ConfigurationTree,
    replacing: Option<(usize, usize)>,
}

impl<'a> DuplicateDetector<'a> {
    pub fn new(tree: &'a ConfigurationTree) -> Self {
        Self {
            tree,
            replacing: None,
        }
    }

    /// Ignore the custom terms of the cluster at these coordinates, which
    /// are about to be replaced. Its predefined terms still count.
    pub fn replacing(mut self, rule_index: usize, cluster_index: usize) -> Self {
        self.replacing = Some((rule_index, cluster_index));
        self
    }

    pub fn find<S: AsRef<str>>(&self, candidates: &[S]) -> Option<DuplicateMatch> {
        if candidates.is_empty() {
            return None;
        }

        let lowered: Vec<(String, &str)> = candidates
            .iter()
            .map(|c| (c.as_ref().to_lowercase(), c.as_ref()))
            .collect();

        for (rule_index, rule) in self.tree.rules.iter().enumerate() {
            for (cluster_index, cluster) in rule.children.iter().enumerate() {
                let include_custom = self.replacing != Some((rule_index, cluster_index));
                let terms = term_index(cluster, include_custom);

                for (key, original) in &lowered {
                    if let Some(match_type) = terms.get(key.as_str()) {
                        return Some(DuplicateMatch {
                            rule_index,
                            cluster_index,
                            lemma: cluster.topic.lemma.clone(),
                            topic: original.to_string(),
                            match_type: *match_type,
                        });
                    }
                }
            }
        }

        None
    }
}

/// Lower-cased terms of one cluster; predefined wins when a term is in both
fn term_index(cluster: &Cluster, include_custom: bool) -> HashMap<String, MatchType> {
    let mut terms = HashMap::new();
    if include_custom {
        for term in &cluster.topic.custom_terms {
            terms.insert(term.to_lowercase(), MatchType::Custom);
        }
    }
    for term in &cluster.topic.predefined_terms {
        terms.insert(term.to_lowercase(), MatchType::Predefined);
    }
    terms
}

/// First collision of any candidate with an existing term
pub fn check_duplicates<S: AsRef<str>>(
    tree: &ConfigurationTree,
    candidates: &[S],
) -> Option<DuplicateMatch> {
    DuplicateDetector::new(tree).find(candidates)
}

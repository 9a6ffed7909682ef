//! Read-only lookups over a parsed tree.
//!
//! Index and id lookups return `None` (or an empty collection) when nothing
//! matches; none of them panic on out-of-range input.

use crate::ast::{Cluster, ConfigurationTree, Rule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Lemma with its full term list, as sent to topic analysis services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaTopics {
    pub lemma: String,
    pub topics: Vec<String>,
}

impl ConfigurationTree {
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn cluster_count(&self) -> usize {
        self.rules.iter().map(|rule| rule.children.len()).sum()
    }

    pub fn rule(&self, rule_index: usize) -> Option<&Rule> {
        self.rules.get(rule_index)
    }

    pub fn cluster(&self, rule_index: usize, cluster_index: usize) -> Option<&Cluster> {
        self.rules.get(rule_index)?.children.get(cluster_index)
    }

    pub fn cluster_mut(&mut self, rule_index: usize, cluster_index: usize) -> Option<&mut Cluster> {
        self.rules.get_mut(rule_index)?.children.get_mut(cluster_index)
    }

    pub fn rule_by_id(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Cluster with the given id and its `(rule_index, cluster_index)`
    pub fn cluster_by_id(&self, id: &str) -> Option<(usize, usize, &Cluster)> {
        self.rules.iter().enumerate().find_map(|(rule_index, rule)| {
            rule.children
                .iter()
                .enumerate()
                .find(|(_, cluster)| cluster.id == id)
                .map(|(cluster_index, cluster)| (rule_index, cluster_index, cluster))
        })
    }

    /// Cluster at a position counted across all rules
    pub fn cluster_by_flat_index(&self, index: usize) -> Option<&Cluster> {
        let mut offset = 0;
        for rule in &self.rules {
            let len = rule.children.len();
            if index < offset + len {
                return rule.children.get(index - offset);
            }
            offset += len;
        }
        None
    }

    /// Position of a cluster counted across all rules
    pub fn flat_index(&self, rule_index: usize, cluster_index: usize) -> Option<usize> {
        let rule = self.rules.get(rule_index)?;
        if cluster_index >= rule.children.len() {
            return None;
        }
        let before: usize = self.rules[..rule_index]
            .iter()
            .map(|rule| rule.children.len())
            .sum();
        Some(before + cluster_index)
    }

    /// Distinct non-empty lemmas in document order
    pub fn lemmas(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.clusters()
            .map(|cluster| cluster.lemma())
            .filter(|lemma| !lemma.is_empty() && seen.insert(*lemma))
            .map(str::to_string)
            .collect()
    }

    pub fn predefined_topic_count(&self, rule_index: usize, cluster_index: usize) -> Option<usize> {
        self.cluster(rule_index, cluster_index)
            .map(|cluster| cluster.topic.predefined_terms.len())
    }

    pub fn custom_topic_count(&self, rule_index: usize, cluster_index: usize) -> Option<usize> {
        self.cluster(rule_index, cluster_index)
            .map(|cluster| cluster.topic.custom_terms.len())
    }

    /// Predefined then custom terms of one cluster, one per line
    pub fn cluster_topic_text(&self, rule_index: usize, cluster_index: usize) -> Option<String> {
        let cluster = self.cluster(rule_index, cluster_index)?;
        Some(
            cluster
                .topic
                .all_terms()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Every term of every cluster joined with `;`
    pub fn all_topics_text(&self) -> String {
        self.clusters()
            .flat_map(|cluster| cluster.topic.all_terms())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// One `{lemma, topics}` entry per cluster that has a lemma
    pub fn topics_by_lemma(&self) -> Vec<LemmaTopics> {
        self.clusters()
            .filter(|cluster| !cluster.lemma().is_empty())
            .map(|cluster| LemmaTopics {
                lemma: cluster.lemma().to_string(),
                topics: cluster.topic.all_terms().cloned().collect(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Cluster, ConfigurationTree, Rule, Topic};

    fn cluster(lemma: &str, predefined: &[&str], custom: &[&str]) -> Cluster {
        Cluster {
            id: format!("c-{}", lemma),
            name: lemma.to_string(),
            topic: Topic {
                lemma: lemma.to_string(),
                predefined_terms: predefined.iter().map(|s| s.to_string()).collect(),
                custom_terms: custom.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn tree() -> ConfigurationTree {
        ConfigurationTree {
            rules: vec![
                Rule {
                    id: "r-0".into(),
                    children: vec![cluster("A", &["a1", "a2"], &["ax"]), cluster("B", &[], &[])],
                    ..Default::default()
                },
                Rule {
                    id: "r-1".into(),
                    children: vec![],
                    ..Default::default()
                },
                Rule {
                    id: "r-2".into(),
                    children: vec![cluster("C", &["c1"], &[]), cluster("A", &["a3"], &[])],
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_index_lookups_out_of_range() {
        let tree = tree();
        assert!(tree.cluster(0, 1).is_some());
        assert!(tree.cluster(0, 2).is_none());
        assert!(tree.cluster(9, 0).is_none());
        assert!(tree.rule(3).is_none());
        assert_eq!(tree.predefined_topic_count(5, 5), None);
        assert_eq!(tree.cluster_topic_text(1, 0), None);
    }

    #[test]
    fn test_flat_index_walks_across_rules() {
        let tree = tree();
        assert_eq!(tree.cluster_by_flat_index(0).unwrap().lemma(), "A");
        assert_eq!(tree.cluster_by_flat_index(1).unwrap().lemma(), "B");
        assert_eq!(tree.cluster_by_flat_index(2).unwrap().lemma(), "C");
        assert_eq!(tree.cluster_by_flat_index(3).unwrap().topic.predefined_terms, vec!["a3"]);
        assert!(tree.cluster_by_flat_index(4).is_none());

        assert_eq!(tree.flat_index(2, 1), Some(3));
        assert_eq!(tree.flat_index(1, 0), None);
    }

    #[test]
    fn test_id_lookups() {
        let tree = tree();
        assert_eq!(tree.rule_by_id("r-2").unwrap().children.len(), 2);
        let (rule_index, cluster_index, found) = tree.cluster_by_id("c-C").unwrap();
        assert_eq!((rule_index, cluster_index), (2, 0));
        assert_eq!(found.lemma(), "C");
        assert!(tree.cluster_by_id("missing").is_none());
    }

    #[test]
    fn test_lemmas_are_distinct_and_ordered() {
        assert_eq!(tree().lemmas(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_topic_text_formats() {
        let tree = tree();
        assert_eq!(tree.cluster_topic_text(0, 0).unwrap(), "a1\na2\nax");
        assert_eq!(tree.cluster_topic_text(0, 1).unwrap(), "");
        assert_eq!(tree.all_topics_text(), "a1;a2;ax;c1;a3");
        assert_eq!(tree.predefined_topic_count(0, 0), Some(2));
        assert_eq!(tree.custom_topic_count(0, 0), Some(1));
    }

    #[test]
    fn test_topics_by_lemma() {
        let structured = tree().topics_by_lemma();
        assert_eq!(structured.len(), 4);
        assert_eq!(structured[0].lemma, "A");
        assert_eq!(structured[0].topics, vec!["a1", "a2", "ax"]);
    }
}

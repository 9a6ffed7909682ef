//! # Usage Aggregation
//!
//! Folds a tagger's lemma counts into the tree. Each batch is a complete
//! snapshot: clusters whose lemma is absent from the batch drop to zero.

use expectations_parser::ConfigurationTree;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One `{lemma, count}` pair reported by the tagger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LemmaCount {
    pub lemma: String,
    pub count: u32,
}

impl LemmaCount {
    pub fn new(lemma: impl Into<String>, count: u32) -> Self {
        Self {
            lemma: lemma.into(),
            count,
        }
    }
}

/// Reset every usage count, then copy each entry's count onto clusters
/// whose lemma equals it exactly. Later entries for the same lemma
/// overwrite earlier ones; counts are never summed.
///
/// Returns how many cluster assignments were made.
pub fn update_lemma_counts(tree: &mut ConfigurationTree, counts: &[LemmaCount]) -> usize {
    for cluster in tree.clusters_mut() {
        cluster.usage_count = 0;
    }

    let mut assigned = 0;
    for entry in counts {
        for cluster in tree.clusters_mut() {
            if cluster.topic.lemma == entry.lemma {
                cluster.usage_count = entry.count;
                assigned += 1;
            }
        }
    }

    debug!(entries = counts.len(), assigned, "Applied lemma counts");
    assigned
}

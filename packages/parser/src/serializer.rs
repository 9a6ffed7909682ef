use crate::ast::{Cluster, ConfigurationTree, Rule, Topic};
use crate::raw::{RawDocument, RawRule, RawRuleSet, RawTopic};

/// Convert the live tree back into wire nodes (inverse of the parser).
///
/// Usage counts are derived data and are not written. A cluster with a
/// blank topic is written with an empty `topics` array; a rule's own
/// `topics` slot is written back as it was read.
pub fn serialize_rules(rules: &[Rule]) -> Vec<RawRule> {
    rules.iter().map(serialize_rule).collect()
}

/// Full wire document with the live rules spliced in
pub fn serialize_document(tree: &ConfigurationTree) -> RawDocument {
    RawDocument {
        id: tree.id.clone(),
        info: tree.info.clone(),
        rules: RawRuleSet {
            name: tree.name.clone(),
            overview: tree.overview.clone(),
            rules: serialize_rules(&tree.rules).into_iter().map(Some).collect(),
            extra: tree.rule_set_extra.clone(),
        },
        extra: tree.document_extra.clone(),
    }
}

fn serialize_rule(rule: &Rule) -> RawRule {
    RawRule {
        id: Some(rule.id.clone()),
        name: rule.name.clone(),
        description: rule.description.clone(),
        examples: rule.examples.clone(),
        kind: rule.kind.clone(),
        is_group: rule.is_group,
        topics: rule.topics.clone(),
        children: Some(
            rule.children
                .iter()
                .map(|cluster| Some(serialize_cluster(cluster)))
                .collect(),
        ),
        extra: rule.extra.clone(),
    }
}

fn serialize_cluster(cluster: &Cluster) -> RawRule {
    let topics = if cluster.topic.is_blank() && cluster.topic.extra.is_empty() {
        Vec::new()
    } else {
        vec![serialize_topic(&cluster.topic)]
    };

    RawRule {
        id: Some(cluster.id.clone()),
        name: cluster.name.clone(),
        description: cluster.description.clone(),
        examples: cluster.examples.clone(),
        kind: cluster.kind.clone(),
        is_group: cluster.is_group,
        topics: Some(topics),
        children: cluster.nested.clone(),
        extra: cluster.extra.clone(),
    }
}

fn serialize_topic(topic: &Topic) -> RawTopic {
    RawTopic {
        lemma: topic.lemma.clone(),
        user_defined: topic.is_user_defined,
        pre_defined_topics: topic.predefined_terms.clone(),
        custom_topics: topic.custom_terms.clone(),
        no_lexical_overlap: topic.no_lexical_overlap,
        extra: topic.extra.clone(),
    }
}

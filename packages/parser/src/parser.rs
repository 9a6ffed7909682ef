use crate::ast::{Cluster, ConfigurationTree, Rule, Topic};
use crate::error::{ParseError, ParseResult};
use crate::id_generator::IdGenerator;
use crate::raw::{RawDocument, RawRule, RawTopic};
use crate::topic_set::ClusterTopicSet;
use serde_json::Value;
use tracing::debug;

/// How a document is being loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// A server template adopted as-is; custom topic defaults are derived
    FreshTemplate,
    /// The user's saved copy; existing custom topics stand
    Restored,
}

/// Tree plus, in fresh-template mode, the derived custom topic defaults
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub tree: ConfigurationTree,
    pub default_topics: Option<ClusterTopicSet>,
}

/// Builds the rule/cluster tree from wire nodes
pub struct Parser {
    ids: IdGenerator,
}

impl Parser {
    pub fn new(document_id: &str) -> Self {
        Self {
            ids: IdGenerator::new(document_id),
        }
    }

    /// Map rule nodes to rules, skipping empty entries
    pub fn parse_rules(&mut self, raw: &[Option<RawRule>]) -> Vec<Rule> {
        raw.iter()
            .flatten()
            .map(|rule| self.parse_rule(rule))
            .collect()
    }

    fn parse_rule(&mut self, raw: &RawRule) -> Rule {
        let id = self.node_id(raw);
        let children: Vec<Cluster> = raw
            .children
            .iter()
            .flatten()
            .flatten()
            .map(|child| self.parse_cluster(child))
            .collect();

        debug!(rule = %raw.name, clusters = children.len(), "Parsed rule");

        Rule {
            id,
            name: raw.name.clone(),
            description: raw.description.clone(),
            examples: raw.examples.clone(),
            kind: raw.kind.clone(),
            is_group: raw.is_group,
            children,
            topics: raw.topics.clone(),
            extra: raw.extra.clone(),
        }
    }

    fn parse_cluster(&mut self, raw: &RawRule) -> Cluster {
        let id = self.node_id(raw);
        let topic = raw
            .topics
            .as_ref()
            .and_then(|topics| topics.first())
            .map(parse_topic)
            .unwrap_or_default();

        Cluster {
            id,
            name: raw.name.clone(),
            description: raw.description.clone(),
            examples: raw.examples.clone(),
            kind: raw.kind.clone(),
            is_group: raw.is_group,
            topic,
            usage_count: 0,
            nested: raw.children.clone(),
            extra: raw.extra.clone(),
        }
    }

    fn node_id(&mut self, raw: &RawRule) -> String {
        let generated = self.ids.new_id();
        match &raw.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => generated,
        }
    }

    /// Build the full tree for a document
    pub fn parse_document(&mut self, raw: &RawDocument, mode: ParseMode) -> ParsedDocument {
        let rules = self.parse_rules(&raw.rules.rules);
        let default_topics = match mode {
            ParseMode::FreshTemplate => Some(ClusterTopicSet::defaults_for(&rules)),
            ParseMode::Restored => None,
        };

        let tree = ConfigurationTree {
            id: raw.id.clone(),
            info: raw.info.clone(),
            name: raw.rules.name.clone(),
            overview: raw.rules.overview.clone(),
            rules,
            rule_set_extra: raw.rules.extra.clone(),
            document_extra: raw.extra.clone(),
        };

        ParsedDocument {
            tree,
            default_topics,
        }
    }
}

fn parse_topic(raw: &RawTopic) -> Topic {
    Topic {
        lemma: raw.lemma.clone(),
        is_user_defined: raw.user_defined,
        predefined_terms: raw.pre_defined_topics.clone(),
        custom_terms: raw.custom_topics.clone(),
        no_lexical_overlap: raw.no_lexical_overlap,
        extra: raw.extra.clone(),
    }
}

/// Map rule nodes with ids generated from an empty document id
pub fn parse(raw: &[Option<RawRule>]) -> Vec<Rule> {
    Parser::new("").parse_rules(raw)
}

/// Build the tree for a whole document
pub fn parse_document(raw: &RawDocument, mode: ParseMode) -> ParsedDocument {
    Parser::new(&raw.id).parse_document(raw, mode)
}

/// Decode document text. Only text that is not a JSON object fails.
pub fn parse_str(source: &str) -> ParseResult<RawDocument> {
    let value: Value = serde_json::from_str(source)?;
    parse_value(value)
}

pub fn parse_value(value: Value) -> ParseResult<RawDocument> {
    if !value.is_object() {
        return Err(ParseError::not_an_object(json_kind(&value)));
    }
    Ok(serde_json::from_value(value)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

//! Wire shape of a configuration document.
//!
//! These types mirror the JSON exactly as it is fetched and stored. Unknown
//! keys at every level land in `extra` and are written back unchanged.
//!
//! Known fields are always written in their snake_case form. camelCase
//! spellings such as `isGroup` or `predefinedTopics` are accepted on input
//! only, so a camelCase document round-trips in value but not byte for byte.

use crate::serde_helpers;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Complete configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default, deserialize_with = "serde_helpers::string")]
    pub id: String,

    #[serde(default, deserialize_with = "serde_helpers::or_default")]
    pub info: DocumentInfo,

    #[serde(default, deserialize_with = "serde_helpers::or_default")]
    pub rules: RawRuleSet,

    /// `impressions`, `promptTemplates`, `values`, ...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Document metadata. `version`, `saved_at`, `name` and `filename`
/// together identify a revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInfo {
    #[serde(default, deserialize_with = "serde_helpers::opt_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "serde_helpers::opt_string", skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "serde_helpers::opt_string", skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "serde_helpers::opt_string", skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,

    #[serde(
        default,
        alias = "saved",
        deserialize_with = "serde_helpers::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub saved_at: Option<String>,

    #[serde(default, deserialize_with = "serde_helpers::opt_string", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentInfo {
    /// Same revision key (version, saved time, name, filename)
    pub fn same_revision(&self, other: &DocumentInfo) -> bool {
        self.version == other.version
            && self.saved_at == other.saved_at
            && self.name == other.name
            && self.filename == other.filename
    }
}

/// The `rules` block: a titled, ordered list of rule nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRuleSet {
    #[serde(default, deserialize_with = "serde_helpers::string")]
    pub name: String,

    #[serde(default, deserialize_with = "serde_helpers::string")]
    pub overview: String,

    #[serde(default, deserialize_with = "serde_helpers::nodes")]
    pub rules: Vec<Option<RawRule>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A rule or cluster node. Both levels share one wire shape; clusters carry
/// the `topics` slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRule {
    #[serde(default, deserialize_with = "serde_helpers::opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "serde_helpers::string")]
    pub name: String,

    #[serde(default, deserialize_with = "serde_helpers::string")]
    pub description: String,

    #[serde(default, deserialize_with = "serde_helpers::opt_string", skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "serde_helpers::string")]
    pub kind: String,

    #[serde(default, alias = "isGroup", deserialize_with = "serde_helpers::boolean")]
    pub is_group: bool,

    #[serde(default, deserialize_with = "serde_helpers::topics", skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<RawTopic>>,

    #[serde(default, deserialize_with = "serde_helpers::opt_nodes", skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Option<RawRule>>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One slot of a cluster's `topics` array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTopic {
    #[serde(default, deserialize_with = "serde_helpers::string")]
    pub lemma: String,

    #[serde(default, alias = "userDefined", alias = "isUserDefined", deserialize_with = "serde_helpers::boolean")]
    pub user_defined: bool,

    #[serde(default, alias = "predefinedTopics", deserialize_with = "serde_helpers::strings")]
    pub pre_defined_topics: Vec<String>,

    #[serde(default, alias = "customTopics", deserialize_with = "serde_helpers::strings")]
    pub custom_topics: Vec<String>,

    #[serde(default, alias = "noLexicalOverlap", deserialize_with = "serde_helpers::boolean")]
    pub no_lexical_overlap: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_top_level_keys_are_kept() {
        let value = json!({
            "id": "doc-1",
            "info": { "name": "Stats", "version": 3, "savedAt": "2024-01-02" },
            "rules": { "name": "Expectations", "overview": "<p>o</p>", "rules": [] },
            "impressions": { "commonClusters": 2, "rareClusters": 1 },
            "promptTemplates": { "summary": { "prompt": "x", "temperature": 0.2 } }
        });

        let doc: RawDocument = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(doc.id, "doc-1");
        assert_eq!(doc.info.version.as_deref(), Some("3"));
        assert!(doc.extra.contains_key("impressions"));
        assert!(doc.extra.contains_key("promptTemplates"));

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["impressions"], value["impressions"]);
        assert_eq!(back["promptTemplates"], value["promptTemplates"]);
    }

    #[test]
    fn test_topic_accepts_camel_case_aliases() {
        let topic: RawTopic = serde_json::from_value(json!({
            "lemma": "Data Descriptors",
            "predefinedTopics": ["mean", "median"],
            "customTopics": ["mode"],
            "noLexicalOverlap": true
        }))
        .unwrap();

        assert_eq!(topic.pre_defined_topics, vec!["mean", "median"]);
        assert_eq!(topic.custom_topics, vec!["mode"]);
        assert!(topic.no_lexical_overlap);
        assert!(!topic.user_defined);
    }

    #[test]
    fn test_wrongly_typed_fields_fall_back_to_defaults() {
        let rule: RawRule = serde_json::from_value(json!({
            "name": 12,
            "description": ["not", "text"],
            "is_group": "true",
            "topics": "none",
            "children": {}
        }))
        .unwrap();

        assert_eq!(rule.name, "12");
        assert_eq!(rule.description, "");
        assert!(rule.is_group);
        assert!(rule.topics.is_none());
        assert!(rule.children.is_none());
    }

    #[test]
    fn test_same_revision() {
        let a = DocumentInfo {
            version: Some("1".into()),
            saved_at: Some("t".into()),
            ..Default::default()
        };
        let mut b = a.clone();
        assert!(a.same_revision(&b));

        b.saved_at = Some("t2".into());
        assert!(!a.same_revision(&b));
    }
}

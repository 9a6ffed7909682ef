use crate::raw::{DocumentInfo, RawRule, RawTopic};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A lemma with its predefined and user-added terms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub lemma: String,
    pub is_user_defined: bool,
    pub predefined_terms: Vec<String>,
    pub custom_terms: Vec<String>,
    pub no_lexical_overlap: bool,

    /// Unknown keys of the wire topic slot
    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl Topic {
    /// Predefined terms followed by custom terms
    pub fn all_terms(&self) -> impl Iterator<Item = &String> {
        self.predefined_terms.iter().chain(self.custom_terms.iter())
    }

    /// No lemma, no terms and no flags set
    pub fn is_blank(&self) -> bool {
        self.lemma.is_empty()
            && self.predefined_terms.is_empty()
            && self.custom_terms.is_empty()
            && !self.is_user_defined
            && !self.no_lexical_overlap
    }
}

/// A topic cluster under a rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub name: String,
    /// HTML
    pub description: String,
    /// HTML
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_group: bool,
    pub topic: Topic,

    /// Derived from tagger output, never authoritative
    pub usage_count: u32,

    /// Nested nodes below a cluster are carried but not interpreted
    #[serde(skip)]
    pub nested: Option<Vec<Option<RawRule>>>,

    #[serde(skip)]
    pub extra: Map<String, Value>,
}

impl Cluster {
    pub fn lemma(&self) -> &str {
        &self.topic.lemma
    }
}

/// A named expectation owning its topic clusters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    /// HTML
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_group: bool,
    pub children: Vec<Cluster>,

    /// A `topics` slot on a rule node is carried but not interpreted
    #[serde(skip)]
    pub topics: Option<Vec<RawTopic>>,

    #[serde(skip)]
    pub extra: Map<String, Value>,
}

/// Parsed configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationTree {
    /// Server-assigned document id
    pub id: String,
    pub info: DocumentInfo,
    pub name: String,
    /// HTML
    pub overview: String,
    pub rules: Vec<Rule>,

    /// Unknown keys of the `rules` block
    #[serde(skip)]
    pub rule_set_extra: Map<String, Value>,

    /// Pass-through top-level keys (`impressions`, `promptTemplates`, ...)
    #[serde(skip)]
    pub document_extra: Map<String, Value>,
}

impl ConfigurationTree {
    /// Every cluster in document order
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.rules.iter().flat_map(|rule| rule.children.iter())
    }

    pub fn clusters_mut(&mut self) -> impl Iterator<Item = &mut Cluster> {
        self.rules.iter_mut().flat_map(|rule| rule.children.iter_mut())
    }
}

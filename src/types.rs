//! API types for the metadata client.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attributes of a variable, keyed by attribute name.
///
/// The service does not publish a fixed schema, so every attribute it returns
/// is kept. String values are stored verbatim, `null` becomes an empty string
/// and any other JSON value is stored as its compact JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Get the value of an attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether the attribute is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attribute names in name order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }

    /// Remove and return an attribute.
    pub(crate) fn take(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw.into_iter().map(|(k, v)| (k, value_text(v))).collect())
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Attributes {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Text form of a JSON value as stored in [`Attributes`].
pub(crate) fn value_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Which attributes of a variable to request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributeSelector {
    /// Every attribute.
    #[default]
    All,
    /// A single attribute; the result is its value.
    One(String),
    /// Several attributes; the result is a mapping.
    Many(Vec<String>),
}

impl AttributeSelector {
    /// Query pairs sent to the service. Each name is both key and value.
    pub(crate) fn query_pairs(&self) -> Vec<(&str, &str)> {
        match self {
            AttributeSelector::All => Vec::new(),
            AttributeSelector::One(name) => vec![(name.as_str(), name.as_str())],
            AttributeSelector::Many(names) => {
                names.iter().map(|n| (n.as_str(), n.as_str())).collect()
            }
        }
    }
}

impl From<&str> for AttributeSelector {
    fn from(name: &str) -> Self {
        AttributeSelector::One(name.to_string())
    }
}

impl From<String> for AttributeSelector {
    fn from(name: String) -> Self {
        AttributeSelector::One(name)
    }
}

impl From<Vec<String>> for AttributeSelector {
    fn from(names: Vec<String>) -> Self {
        AttributeSelector::Many(names)
    }
}

impl From<&[&str]> for AttributeSelector {
    fn from(names: &[&str]) -> Self {
        AttributeSelector::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for AttributeSelector {
    fn from(names: [&str; N]) -> Self {
        AttributeSelector::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Result of [`Client::select`](crate::Client::select).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Value of a single requested attribute.
    Value(String),
    /// Mapping of attribute names to values.
    Attributes(Attributes),
}

impl Selection {
    /// The single value, if one attribute was requested.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Selection::Value(v) => Some(v),
            Selection::Attributes(_) => None,
        }
    }

    /// The single value, if one attribute was requested.
    pub fn into_value(self) -> Option<String> {
        match self {
            Selection::Value(v) => Some(v),
            Selection::Attributes(_) => None,
        }
    }

    /// The mapping, if all or several attributes were requested.
    pub fn as_attributes(&self) -> Option<&Attributes> {
        match self {
            Selection::Value(_) => None,
            Selection::Attributes(a) => Some(a),
        }
    }

    /// The mapping, if all or several attributes were requested.
    pub fn into_attributes(self) -> Option<Attributes> {
        match self {
            Selection::Value(_) => None,
            Selection::Attributes(a) => Some(a),
        }
    }
}

/// Comparison operator of a [`Filter`].
///
/// Operators outside the named set are carried as [`Operator::Other`] and sent
/// as-is. An `Other` holding a named operator's text parses back as that
/// named variant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Exact match.
    Eq,
    /// Not equal.
    Neq,
    /// SQL-style pattern match using `%` wildcards.
    Like,
    /// Negated pattern match.
    NotLike,
    /// Any other operator the service understands, e.g. `in` or `ge`.
    #[serde(untagged)]
    Other(String),
}

/// A single comparison predicate on a variable attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filter {
    /// Attribute name.
    pub name: String,
    /// Comparison operator.
    pub op: Operator,
    /// Value to compare against.
    pub val: String,
}

impl Filter {
    /// Create a filter.
    pub fn new(name: impl Into<String>, op: Operator, val: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op,
            val: val.into(),
        }
    }

    /// `name == val`
    pub fn eq(name: impl Into<String>, val: impl Into<String>) -> Self {
        Self::new(name, Operator::Eq, val)
    }

    /// `name LIKE pattern`
    pub fn like(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(name, Operator::Like, pattern)
    }
}

/// Boolean combination of filters.
///
/// Serializes to the shape the service expects: a bare filter object for a
/// leaf, `{"and": [...]}` or `{"or": [...]}` for the combinators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "TreeRepr")]
pub enum FilterTree {
    /// A single predicate.
    Leaf(Filter),
    /// All children must match.
    And(Vec<FilterTree>),
    /// Any child must match.
    Or(Vec<FilterTree>),
}

impl FilterTree {
    /// Conjunction of the given trees.
    pub fn and<I, T>(children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FilterTree>,
    {
        FilterTree::And(children.into_iter().map(Into::into).collect())
    }

    /// Disjunction of the given trees.
    pub fn or<I, T>(children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FilterTree>,
    {
        FilterTree::Or(children.into_iter().map(Into::into).collect())
    }
}

impl From<Filter> for FilterTree {
    fn from(filter: Filter) -> Self {
        FilterTree::Leaf(filter)
    }
}

impl Serialize for FilterTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            FilterTree::Leaf(f) => TreeRef::Leaf(f),
            FilterTree::And(children) => TreeRef::And { and: children },
            FilterTree::Or(children) => TreeRef::Or { or: children },
        };
        repr.serialize(serializer)
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum TreeRef<'a> {
    And { and: &'a [FilterTree] },
    Or { or: &'a [FilterTree] },
    Leaf(&'a Filter),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TreeRepr {
    And { and: Vec<FilterTree> },
    Or { or: Vec<FilterTree> },
    Leaf(Filter),
}

impl From<TreeRepr> for FilterTree {
    fn from(repr: TreeRepr) -> Self {
        match repr {
            TreeRepr::And { and } => FilterTree::And(and),
            TreeRepr::Or { or } => FilterTree::Or(or),
            TreeRepr::Leaf(f) => FilterTree::Leaf(f),
        }
    }
}

/// Argument of a structured search.
///
/// A list is combined with AND by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filters {
    /// Trees combined with AND.
    List(Vec<FilterTree>),
    /// A single tree.
    Tree(FilterTree),
}

impl Default for Filters {
    fn default() -> Self {
        Filters::List(Vec::new())
    }
}

impl From<Filter> for Filters {
    fn from(filter: Filter) -> Self {
        Filters::Tree(filter.into())
    }
}

impl From<FilterTree> for Filters {
    fn from(tree: FilterTree) -> Self {
        Filters::Tree(tree)
    }
}

impl From<Vec<FilterTree>> for Filters {
    fn from(trees: Vec<FilterTree>) -> Self {
        Filters::List(trees)
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Filters::List(filters.into_iter().map(Into::into).collect())
    }
}

/// Envelope sent as the `q` parameter of a structured search.
#[derive(Debug, Serialize)]
pub(crate) struct SearchQuery<'a> {
    pub filters: &'a Filters,
}

/// Match list returned by the `filter` and `search` endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct MatchList {
    pub matches: Vec<String>,
}

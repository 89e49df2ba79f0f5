//! The recipient router: ordered predicate tables over instance tags,
//! evaluated top to bottom with first match winning. Tables are plain data,
//! so the two account variants are configuration rather than code forks.

use models::{Recipient, TagSet};

pub mod variants;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("routing table default recipient must not be empty")]
    EmptyDefault,
    #[error("routing rule {index} has an empty recipient")]
    EmptyRecipient { index: usize },
}

/// A single predicate over an instance's tag values.
///
/// `OwnerContainsAny` matches when the Owner value contains any one of the
/// given substrings. The legacy scripts chained these checks with an
/// `or` between bare literals, which always evaluated truthy; the intended
/// either-substring membership is what's implemented here.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPredicate {
    CostCenterIn(Vec<String>),
    ProductIn(Vec<String>),
    ProductContains(String),
    ProductPresent,
    ProductInAndOwnerContainsAny {
        products: Vec<String>,
        owner_any: Vec<String>,
    },
    ServiceIn(Vec<String>),
    OwnerContainsAny(Vec<String>),
}

impl TagPredicate {
    pub fn matches(&self, tags: &TagSet) -> bool {
        match self {
            TagPredicate::CostCenterIn(values) => {
                tags.cost_center().is_some_and(|cc| values.iter().any(|v| v == cc))
            }
            TagPredicate::ProductIn(values) => {
                tags.product().is_some_and(|p| values.iter().any(|v| v == p))
            }
            TagPredicate::ProductContains(needle) => {
                tags.product().is_some_and(|p| p.contains(needle.as_str()))
            }
            TagPredicate::ProductPresent => tags.product().is_some(),
            TagPredicate::ProductInAndOwnerContainsAny {
                products,
                owner_any,
            } => {
                tags.product().is_some_and(|p| products.iter().any(|v| v == p))
                    && contains_any(tags.owner(), owner_any)
            }
            TagPredicate::ServiceIn(values) => {
                tags.service().is_some_and(|s| values.iter().any(|v| v == s))
            }
            TagPredicate::OwnerContainsAny(substrings) => {
                contains_any(tags.owner(), substrings)
            }
        }
    }
}

fn contains_any(value: Option<&str>, needles: &[String]) -> bool {
    value.is_some_and(|v| needles.iter().any(|n| v.contains(n.as_str())))
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoutingRule {
    pub when: TagPredicate,
    pub recipient: Recipient,
}

/// An ordered rule table with a mandatory default. `route` can therefore
/// never leave a recipient unresolved, no matter which tags are absent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "TableSpec")]
pub struct RoutingTable {
    rules: Vec<RoutingRule>,
    default: Recipient,
}

#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TableSpec {
    rules: Vec<RoutingRule>,
    default: Recipient,
}

impl TryFrom<TableSpec> for RoutingTable {
    type Error = TableError;

    fn try_from(spec: TableSpec) -> Result<Self, TableError> {
        RoutingTable::new(spec.rules, spec.default)
    }
}

impl RoutingTable {
    pub fn new(rules: Vec<RoutingRule>, default: Recipient) -> Result<Self, TableError> {
        if default.is_empty() {
            return Err(TableError::EmptyDefault);
        }
        if let Some(index) = rules.iter().position(|r| r.recipient.is_empty()) {
            return Err(TableError::EmptyRecipient { index });
        }
        Ok(Self { rules, default })
    }

    /// Evaluates rules in order and returns the first matching recipient,
    /// falling back to the table default.
    pub fn route(&self, tags: &TagSet) -> &Recipient {
        self.rules
            .iter()
            .find(|rule| rule.when.matches(tags))
            .map(|rule| &rule.recipient)
            .unwrap_or(&self.default)
    }

    pub fn rules(&self) -> &[RoutingRule] {
        &self.rules
    }

    pub fn default_recipient(&self) -> &Recipient {
        &self.default
    }
}

use serde::{Deserialize, Serialize};

use crate::element::Attribute;
use crate::operator::ExpressionOperator;
use crate::short_form::{com, ShortForm};

/// One `field <operator> value` comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeFilter {
    /// Dotted path of the body field to compare.
    pub field_name: String,
    pub operator: ExpressionOperator,
    /// Right-hand side; `None` compares against null.
    pub field_value: Option<Attribute>,
}

impl CompositeFilter {
    pub fn new(
        field_name: impl Into<String>,
        operator: ExpressionOperator,
        field_value: Option<Attribute>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            operator,
            field_value,
        }
    }

    /// Render as a predicate string for the filter engine.
    pub fn to_predicate(&self) -> String {
        let value = self
            .field_value
            .as_ref()
            .map_or_else(|| "NULL".to_string(), Attribute::to_string);
        if self.operator.is_substring() {
            format!("{} {}{}%'", self.field_name, self.operator.symbol(), value)
        } else {
            format!("{} {} {}", self.field_name, self.operator.symbol(), value)
        }
    }
}

/// Conjunction of filters: an object matches when every filter holds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeFilterSet {
    pub filters: Vec<CompositeFilter>,
}

impl CompositeFilterSet {
    pub fn new(filters: Vec<CompositeFilter>) -> Self {
        Self { filters }
    }

    pub fn to_predicate(&self) -> String {
        self.filters
            .iter()
            .map(CompositeFilter::to_predicate)
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Polymorphic filter list, one entry per archive query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum QueryFilterList {
    CompositeFilterSet(Vec<CompositeFilterSet>),
}

impl QueryFilterList {
    pub const COMPOSITE_FILTER_SET: ShortForm = ShortForm::new(
        com::AREA,
        com::ARCHIVE_SERVICE,
        com::VERSION,
        com::COMPOSITE_FILTER_SET,
    )
    .list();

    pub fn short_form(&self) -> ShortForm {
        match self {
            Self::CompositeFilterSet(_) => Self::COMPOSITE_FILTER_SET,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::CompositeFilterSet(sets) => sets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

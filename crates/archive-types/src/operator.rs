use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::short_form::{com, ShortForm};

/// Comparison operator of a filter predicate.
///
/// Travels on the wire as its one-byte code (1..=8).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum ExpressionOperator {
    Equal = 1,
    Differ = 2,
    Greater = 3,
    GreaterOrEqual = 4,
    Less = 5,
    LessOrEqual = 6,
    Contains = 7,
    /// Rendered as a negated substring match, not a case-insensitive one.
    IContains = 8,
}

impl ExpressionOperator {
    pub const SHORT_FORM: ShortForm = ShortForm::new(
        com::AREA,
        com::ARCHIVE_SERVICE,
        com::VERSION,
        com::EXPRESSION_OPERATOR,
    );

    pub const ALL: [ExpressionOperator; 8] = [
        Self::Equal,
        Self::Differ,
        Self::Greater,
        Self::GreaterOrEqual,
        Self::Less,
        Self::LessOrEqual,
        Self::Contains,
        Self::IContains,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Predicate symbol understood by the filter engine.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Differ => "!=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Contains => "LIKE '%",
            Self::IContains => "NOT LIKE '%",
        }
    }

    /// Returns `true` for the two substring operators, whose value must be
    /// closed with `%'`.
    pub const fn is_substring(self) -> bool {
        matches!(self, Self::Contains | Self::IContains)
    }
}

/// Translate a raw operator code; undefined codes give an empty symbol.
pub fn translate_operator(code: u8) -> &'static str {
    ExpressionOperator::from_code(code).map_or("", ExpressionOperator::symbol)
}

impl From<ExpressionOperator> for u8 {
    fn from(op: ExpressionOperator) -> Self {
        op.code()
    }
}

impl TryFrom<u8> for ExpressionOperator {
    type Error = TypeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(TypeError::UnknownOperatorCode(code))
    }
}

impl fmt::Display for ExpressionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

//! Filter type registry.
//!
//! Every [`FilterType`] has exactly one [`FilterTypeConfig`] declaring which
//! key kinds, operators and value kinds a filter of that type may carry, and
//! whether it may be negated. The grammar only ever builds filters inside
//! these contracts; consumers can use the same table to validate or explain
//! a filter.
//!
//! The table is a `match` over the enum, so a missing entry is a compile
//! error rather than a runtime lookup failure.

use std::fmt;

use serde::Serialize;

use crate::token::TokenKind;

/// An operator in a key/value term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TermOperator {
    #[default]
    #[serde(rename = "")]
    Default,
    #[serde(rename = ">=")]
    GreaterThanEqual,
    #[serde(rename = "<=")]
    LessThanEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl TermOperator {
    pub const ALL: [TermOperator; 7] = [
        TermOperator::Default,
        TermOperator::GreaterThanEqual,
        TermOperator::LessThanEqual,
        TermOperator::GreaterThan,
        TermOperator::LessThan,
        TermOperator::Equal,
        TermOperator::NotEqual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TermOperator::Default => "",
            TermOperator::GreaterThanEqual => ">=",
            TermOperator::LessThanEqual => "<=",
            TermOperator::GreaterThan => ">",
            TermOperator::LessThan => "<",
            TermOperator::Equal => "=",
            TermOperator::NotEqual => "!=",
        }
    }

    /// Maps an operator symbol as written in a query. The empty string is
    /// the default operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        TermOperator::ALL.into_iter().find(|op| op.as_str() == symbol)
    }
}

impl fmt::Display for TermOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logic operator joining sibling expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BooleanOperator {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
}

impl BooleanOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
        }
    }

    /// Case-insensitive: `and`, `And` and `AND` are all [`BooleanOperator::And`].
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("AND") {
            Some(BooleanOperator::And)
        } else if keyword.eq_ignore_ascii_case("OR") {
            Some(BooleanOperator::Or)
        } else {
            None
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shapes a filter token can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    Text,
    TextIn,
    Date,
    SpecificDate,
    RelativeDate,
    Duration,
    Numeric,
    NumericIn,
    Boolean,
    AggregateSimple,
    AggregateDate,
    AggregateRelativeDate,
    Has,
    Is,
}

impl FilterType {
    pub const ALL: [FilterType; 14] = [
        FilterType::Text,
        FilterType::TextIn,
        FilterType::Date,
        FilterType::SpecificDate,
        FilterType::RelativeDate,
        FilterType::Duration,
        FilterType::Numeric,
        FilterType::NumericIn,
        FilterType::Boolean,
        FilterType::AggregateSimple,
        FilterType::AggregateDate,
        FilterType::AggregateRelativeDate,
        FilterType::Has,
        FilterType::Is,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterType::Text => "text",
            FilterType::TextIn => "textIn",
            FilterType::Date => "date",
            FilterType::SpecificDate => "specificDate",
            FilterType::RelativeDate => "relativeDate",
            FilterType::Duration => "duration",
            FilterType::Numeric => "numeric",
            FilterType::NumericIn => "numericIn",
            FilterType::Boolean => "boolean",
            FilterType::AggregateSimple => "aggregateSimple",
            FilterType::AggregateDate => "aggregateDate",
            FilterType::AggregateRelativeDate => "aggregateRelativeDate",
            FilterType::Has => "has",
            FilterType::Is => "is",
        }
    }

    /// The capability contract of this filter type.
    pub fn config(self) -> &'static FilterTypeConfig {
        match self {
            FilterType::Text => &TEXT,
            FilterType::TextIn => &TEXT_IN,
            FilterType::Date => &DATE,
            FilterType::SpecificDate => &SPECIFIC_DATE,
            FilterType::RelativeDate => &RELATIVE_DATE,
            FilterType::Duration => &DURATION,
            FilterType::Numeric => &NUMERIC,
            FilterType::NumericIn => &NUMERIC_IN,
            FilterType::Boolean => &BOOLEAN,
            FilterType::AggregateSimple => &AGGREGATE_SIMPLE,
            FilterType::AggregateDate => &AGGREGATE_DATE,
            FilterType::AggregateRelativeDate => &AGGREGATE_RELATIVE_DATE,
            FilterType::Has => &HAS,
            FilterType::Is => &IS,
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Same as [`FilterType::config`].
pub fn lookup(filter_type: FilterType) -> &'static FilterTypeConfig {
    filter_type.config()
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterTypeConfig {
    pub valid_keys: &'static [TokenKind],
    /// Empty when operators do not apply to the filter type.
    pub valid_ops: &'static [TermOperator],
    pub valid_values: &'static [TokenKind],
    pub can_negate: bool,
}

impl FilterTypeConfig {
    pub fn accepts_key(&self, kind: TokenKind) -> bool {
        self.valid_keys.contains(&kind)
    }

    /// The default operator is accepted everywhere, it is what a filter
    /// carries when the query spelled no operator.
    pub fn accepts_operator(&self, op: TermOperator) -> bool {
        op == TermOperator::Default || self.valid_ops.contains(&op)
    }

    pub fn accepts_value(&self, kind: TokenKind) -> bool {
        self.valid_values.contains(&kind)
    }
}

const ALL_OPERATORS: &[TermOperator] = &TermOperator::ALL;
const TEXT_KEYS: &[TokenKind] = &[TokenKind::KeySimple, TokenKind::KeyExplicitTag];
const SIMPLE_KEY: &[TokenKind] = &[TokenKind::KeySimple];
const AGGREGATE_KEY: &[TokenKind] = &[TokenKind::KeyAggregate];

static TEXT: FilterTypeConfig = FilterTypeConfig {
    valid_keys: TEXT_KEYS,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueText],
    can_negate: true,
};

static TEXT_IN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: TEXT_KEYS,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueTextList],
    can_negate: true,
};

static DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenKind::ValueIso8601Date],
    can_negate: false,
};

static SPECIFIC_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueIso8601Date],
    can_negate: false,
};

static RELATIVE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueRelativeDate],
    can_negate: false,
};

static DURATION: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenKind::ValueDuration],
    can_negate: false,
};

static NUMERIC: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenKind::ValueNumber],
    can_negate: false,
};

static NUMERIC_IN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueNumberList],
    can_negate: false,
};

static BOOLEAN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueBoolean],
    can_negate: true,
};

static AGGREGATE_SIMPLE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenKind::ValueDuration, TokenKind::ValueNumber, TokenKind::ValuePercentage],
    can_negate: true,
};

static AGGREGATE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenKind::ValueIso8601Date],
    can_negate: true,
};

static AGGREGATE_RELATIVE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[TokenKind::ValueRelativeDate],
    can_negate: true,
};

// `has` tests whether a field is present and compares no value, so its value
// set could be empty. `has_filter` in search.pest still reads `has:<field>`
// with the field name as a plain or quoted text value, so ValueText is listed.
static HAS: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueText],
    can_negate: true,
};

static IS: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: &[],
    valid_values: &[TokenKind::ValueText],
    can_negate: true,
};

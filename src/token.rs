//! The typed token model.
//!
//! A parsed query is a sequence of [`Token`]s. Every token remembers the
//! exact slice of the query it was built from (`text`) and where that slice
//! sits (`location`), so concatenating the texts of the top-level tokens
//! gives back the query byte for byte.
//!
//! Tokens come in three families, each a closed enum:
//! * [`Node`] – what may appear in a token sequence (filters, free text,
//!   logic groups and booleans, whitespace).
//! * [`Key`] – the left-hand side of a filter.
//! * [`Value`] – the right-hand side of a filter.

use std::fmt;
use std::ops::Range;

use chrono::{DateTime, FixedOffset, TimeDelta};
use serde::Serialize;

use crate::filter::{BooleanOperator, FilterType, FilterTypeConfig, TermOperator};

/// Discriminant shared by every token family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenKind {
    Spaces,
    Filter,
    FreeText,
    LogicGroup,
    LogicBoolean,
    KeySimple,
    KeyExplicitTag,
    KeyAggregate,
    KeyAggregateArgs,
    ValueIso8601Date,
    ValueRelativeDate,
    ValueDuration,
    ValuePercentage,
    ValueBoolean,
    ValueNumber,
    ValueText,
    ValueNumberList,
    ValueTextList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Position {
    /// Byte offset into the query.
    pub offset: usize,
    /// 1-based.
    pub line: usize,
    /// 1-based, counted in chars.
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }
}

/// Implemented by each token family to report its [`TokenKind`].
pub trait Variant {
    fn kind(&self) -> TokenKind;
}

/// A node of the parse tree together with the source it spans.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Located<T> {
    pub text: String,
    pub location: Location,
    #[serde(flatten)]
    pub node: T,
}

impl<T: Variant> Located<T> {
    pub fn kind(&self) -> TokenKind {
        self.node.kind()
    }
}

impl<T> fmt::Display for Located<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub type Token = Located<Node>;
pub type KeyToken = Located<Key>;
pub type ValueToken = Located<Value>;

/// One entry of a separator-preserving list. The first item of a list has
/// an empty separator; the others keep the exact text (whitespace and comma)
/// that preceded them. A trailing separator may have no item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem<T> {
    pub separator: String,
    pub value: Option<Located<T>>,
}

impl<T> ListItem<T> {
    pub fn first(value: Located<T>) -> Self {
        Self { separator: String::new(), value: Some(value) }
    }
}

/// Rebuilds the source of a list body (everything between the brackets).
pub fn join_list<T>(items: &[ListItem<T>]) -> String {
    let mut joined = String::new();
    for item in items {
        joined.push_str(&item.separator);
        if let Some(value) = &item.value {
            joined.push_str(&value.text);
        }
    }
    joined
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Spaces { value: String },
    Filter(Box<Filter>),
    FreeText { value: String, quoted: bool },
    LogicGroup { inner: Vec<Token> },
    LogicBoolean { value: BooleanOperator },
}

impl Variant for Node {
    fn kind(&self) -> TokenKind {
        match self {
            Node::Spaces { .. } => TokenKind::Spaces,
            Node::Filter(_) => TokenKind::Filter,
            Node::FreeText { .. } => TokenKind::FreeText,
            Node::LogicGroup { .. } => TokenKind::LogicGroup,
            Node::LogicBoolean { .. } => TokenKind::LogicBoolean,
        }
    }
}

impl Node {
    pub fn as_filter(&self) -> Option<&Filter> {
        match self {
            Node::Filter(filter) => Some(&**filter),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub filter: FilterType,
    pub config: &'static FilterTypeConfig,
    pub negated: bool,
    pub key: KeyToken,
    pub operator: TermOperator,
    pub value: ValueToken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Key {
    /// A plain identifier, optionally quoted in the query.
    #[serde(rename = "keySimple")]
    Simple { value: String, quoted: bool },
    /// `tags[key]`
    #[serde(rename = "keyExplicitTag")]
    ExplicitTag { prefix: String, key: Box<KeyToken> },
    /// `name(args)`; the whitespace just inside the parentheses is kept.
    #[serde(rename = "keyAggregate")]
    Aggregate {
        name: Box<KeyToken>,
        args: Option<Box<KeyToken>>,
        #[serde(rename = "argsSpaceBefore")]
        args_space_before: Box<Token>,
        #[serde(rename = "argsSpaceAfter")]
        args_space_after: Box<Token>,
    },
    #[serde(rename = "keyAggregateArgs")]
    AggregateArgs { args: Vec<ListItem<Key>> },
}

impl Variant for Key {
    fn kind(&self) -> TokenKind {
        match self {
            Key::Simple { .. } => TokenKind::KeySimple,
            Key::ExplicitTag { .. } => TokenKind::KeyExplicitTag,
            Key::Aggregate { .. } => TokenKind::KeyAggregate,
            Key::AggregateArgs { .. } => TokenKind::KeyAggregateArgs,
        }
    }
}

impl Key {
    /// The identifier a simple key names, looking through explicit tags.
    pub fn name(&self) -> Option<&str> {
        match self {
            Key::Simple { value, .. } => Some(value.as_str()),
            Key::ExplicitTag { key, .. } => key.node.name(),
            Key::Aggregate { name, .. } => name.node.name(),
            Key::AggregateArgs { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Value {
    /// `None` when the text looked like a date but is not a calendar date.
    #[serde(rename = "valueIso8601Date")]
    Iso8601Date { value: Option<DateTime<FixedOffset>> },
    #[serde(rename = "valueRelativeDate")]
    RelativeDate(RelativeDate),
    #[serde(rename = "valueDuration")]
    Duration(Duration),
    #[serde(rename = "valuePercentage")]
    Percentage { value: f64 },
    #[serde(rename = "valueBoolean")]
    Boolean { value: bool },
    #[serde(rename = "valueNumber")]
    Number(Number),
    #[serde(rename = "valueText")]
    Text { value: String, quoted: bool },
    #[serde(rename = "valueNumberList")]
    NumberList { items: Vec<ListItem<Value>> },
    #[serde(rename = "valueTextList")]
    TextList { items: Vec<ListItem<Value>> },
}

impl Variant for Value {
    fn kind(&self) -> TokenKind {
        match self {
            Value::Iso8601Date { .. } => TokenKind::ValueIso8601Date,
            Value::RelativeDate(_) => TokenKind::ValueRelativeDate,
            Value::Duration(_) => TokenKind::ValueDuration,
            Value::Percentage { .. } => TokenKind::ValuePercentage,
            Value::Boolean { .. } => TokenKind::ValueBoolean,
            Value::Number(_) => TokenKind::ValueNumber,
            Value::Text { .. } => TokenKind::ValueText,
            Value::NumberList { .. } => TokenKind::ValueNumberList,
            Value::TextList { .. } => TokenKind::ValueTextList,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Sign {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Sign::Plus),
            "-" => Some(Sign::Minus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RelativeDateUnit {
    #[serde(rename = "w")]
    Weeks,
    #[serde(rename = "d")]
    Days,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "m")]
    Minutes,
}

impl RelativeDateUnit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "w" => Some(RelativeDateUnit::Weeks),
            "d" => Some(RelativeDateUnit::Days),
            "h" => Some(RelativeDateUnit::Hours),
            "m" => Some(RelativeDateUnit::Minutes),
            _ => None,
        }
    }
}

/// `-7d`, `+2w`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeDate {
    /// Magnitude, saturating at `u64::MAX`.
    pub value: u64,
    pub sign: Sign,
    pub unit: RelativeDateUnit,
}

impl RelativeDate {
    /// The signed offset from "now"; `None` when it does not fit a `TimeDelta`.
    pub fn offset(&self) -> Option<TimeDelta> {
        let magnitude = i64::try_from(self.value).ok()?;
        let delta = match self.unit {
            RelativeDateUnit::Weeks => TimeDelta::try_weeks(magnitude),
            RelativeDateUnit::Days => TimeDelta::try_days(magnitude),
            RelativeDateUnit::Hours => TimeDelta::try_hours(magnitude),
            RelativeDateUnit::Minutes => TimeDelta::try_minutes(magnitude),
        }?;
        Some(match self.sign {
            Sign::Plus => delta,
            Sign::Minus => -delta,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DurationUnit {
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "d")]
    Days,
    #[serde(rename = "w")]
    Weeks,
}

impl DurationUnit {
    /// Accepts every spelling the grammar does: `ms`, `s`, `m`/`min`,
    /// `h`/`hr`, `d`/`day`, `w`/`wk`.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "ms" => Some(DurationUnit::Milliseconds),
            "s" => Some(DurationUnit::Seconds),
            "m" | "min" => Some(DurationUnit::Minutes),
            "h" | "hr" => Some(DurationUnit::Hours),
            "d" | "day" => Some(DurationUnit::Days),
            "w" | "wk" => Some(DurationUnit::Weeks),
            _ => None,
        }
    }

    pub fn milliseconds(self) -> f64 {
        match self {
            DurationUnit::Milliseconds => 1.0,
            DurationUnit::Seconds => 1_000.0,
            DurationUnit::Minutes => 60_000.0,
            DurationUnit::Hours => 3_600_000.0,
            DurationUnit::Days => 86_400_000.0,
            DurationUnit::Weeks => 604_800_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duration {
    pub value: f64,
    pub unit: DurationUnit,
}

impl Duration {
    pub fn milliseconds(&self) -> f64 {
        self.value * self.unit.milliseconds()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumberUnit {
    #[serde(rename = "k")]
    Thousand,
    #[serde(rename = "m")]
    Million,
    #[serde(rename = "b")]
    Billion,
}

impl NumberUnit {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "k" => Some(NumberUnit::Thousand),
            "m" => Some(NumberUnit::Million),
            "b" => Some(NumberUnit::Billion),
            _ => None,
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            NumberUnit::Thousand => 1e3,
            NumberUnit::Million => 1e6,
            NumberUnit::Billion => 1e9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Number {
    /// The literal as written, without its unit.
    pub value: String,
    /// `value` with the unit multiplier applied.
    #[serde(rename = "rawValue")]
    pub raw_value: f64,
    pub unit: Option<NumberUnit>,
}

/// Concatenates the text of a token sequence. For the top-level tokens of a
/// successful parse this is the original query.
pub fn reconstruct(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

/// Every filter in the sequence, including those nested in logic groups,
/// in source order.
pub fn filters(tokens: &[Token]) -> Vec<&Filter> {
    let mut found = Vec::new();
    collect_filters(tokens, &mut found);
    found
}

fn collect_filters<'t>(tokens: &'t [Token], found: &mut Vec<&'t Filter>) {
    for token in tokens {
        match &token.node {
            Node::Filter(filter) => found.push(&**filter),
            Node::LogicGroup { inner } => collect_filters(inner, found),
            _ => (),
        }
    }
}

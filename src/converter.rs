//! Token construction.
//!
//! [`TokenConverter`] has one constructor per token kind. The grammar walker
//! calls them as it recognizes each construct, handing over the matched text
//! and its location explicitly. Constructors never fail and never
//! re-validate: the grammar only calls them for combinations it accepts.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

use crate::filter::{BooleanOperator, FilterType, TermOperator};
use crate::token::{
    Duration, DurationUnit, Filter, Key, KeyToken, ListItem, Located, Location, Node, Number,
    NumberUnit, RelativeDate, RelativeDateUnit, Sign, Token, Value, ValueToken,
};

/// The source slice a construct matched and where it sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'q> {
    pub text: &'q str,
    pub location: Location,
}

impl<'q> Match<'q> {
    pub fn new(text: &'q str, location: Location) -> Self {
        Self { text, location }
    }
}

/// An item following the first one in a comma separated list, with the
/// exact separator text that preceded it.
pub type ListTail<T> = Vec<(String, Option<Located<T>>)>;

#[derive(Debug, Default, Clone, Copy)]
pub struct TokenConverter;

impl TokenConverter {
    pub fn new() -> Self {
        Self
    }

    fn make<T>(&self, m: Match<'_>, node: T) -> Located<T> {
        Located { text: m.text.to_string(), location: m.location, node }
    }

    pub fn token_spaces(&self, m: Match<'_>, value: &str) -> Token {
        self.make(m, Node::Spaces { value: value.to_string() })
    }

    /// A missing operator becomes [`TermOperator::Default`].
    pub fn token_filter(
        &self,
        m: Match<'_>,
        filter_type: FilterType,
        key: KeyToken,
        value: ValueToken,
        operator: Option<TermOperator>,
        negated: bool,
    ) -> Token {
        let config = filter_type.config();
        let operator = operator.unwrap_or_default();
        debug_assert!(config.accepts_key(key.kind()), "{filter_type} filter with {:?} key", key.kind());
        debug_assert!(config.accepts_value(value.kind()), "{filter_type} filter with {:?} value", value.kind());
        debug_assert!(config.accepts_operator(operator), "{filter_type} filter with operator {operator:?}");
        debug_assert!(!negated || config.can_negate, "{filter_type} filter cannot be negated");
        self.make(
            m,
            Node::Filter(Box::new(Filter { filter: filter_type, config, negated, key, operator, value })),
        )
    }

    pub fn token_free_text(&self, m: Match<'_>, value: &str, quoted: bool) -> Token {
        self.make(m, Node::FreeText { value: value.to_string(), quoted })
    }

    pub fn token_logic_group(&self, m: Match<'_>, inner: Vec<Token>) -> Token {
        self.make(m, Node::LogicGroup { inner })
    }

    pub fn token_logic_boolean(&self, m: Match<'_>, value: BooleanOperator) -> Token {
        self.make(m, Node::LogicBoolean { value })
    }

    pub fn token_key_simple(&self, m: Match<'_>, value: &str, quoted: bool) -> KeyToken {
        self.make(m, Key::Simple { value: value.to_string(), quoted })
    }

    pub fn token_key_explicit_tag(&self, m: Match<'_>, prefix: &str, key: KeyToken) -> KeyToken {
        self.make(m, Key::ExplicitTag { prefix: prefix.to_string(), key: Box::new(key) })
    }

    pub fn token_key_aggregate(
        &self,
        m: Match<'_>,
        name: KeyToken,
        args: Option<KeyToken>,
        args_space_before: Token,
        args_space_after: Token,
    ) -> KeyToken {
        self.make(
            m,
            Key::Aggregate {
                name: Box::new(name),
                args: args.map(Box::new),
                args_space_before: Box::new(args_space_before),
                args_space_after: Box::new(args_space_after),
            },
        )
    }

    pub fn token_key_aggregate_args(&self, m: Match<'_>, first: KeyToken, rest: ListTail<Key>) -> KeyToken {
        self.make(m, Key::AggregateArgs { args: join(first, rest) })
    }

    /// The date is parsed here but a failure is not an error: the token
    /// carries `None` and the consumer decides what an invalid date means.
    pub fn token_value_iso8601_date(&self, m: Match<'_>, value: &str) -> ValueToken {
        self.make(m, Value::Iso8601Date { value: parse_iso8601(value) })
    }

    pub fn token_value_relative_date(
        &self,
        m: Match<'_>,
        value: &str,
        sign: Sign,
        unit: RelativeDateUnit,
    ) -> ValueToken {
        let value = value.parse::<u64>().unwrap_or(u64::MAX);
        self.make(m, Value::RelativeDate(RelativeDate { value, sign, unit }))
    }

    pub fn token_value_duration(&self, m: Match<'_>, value: &str, unit: DurationUnit) -> ValueToken {
        self.make(m, Value::Duration(Duration { value: parse_number(value), unit }))
    }

    pub fn token_value_percentage(&self, m: Match<'_>, value: &str) -> ValueToken {
        self.make(m, Value::Percentage { value: parse_number(value) })
    }

    /// `1` and `true` in any case are true, everything else is false.
    pub fn token_value_boolean(&self, m: Match<'_>, value: &str) -> ValueToken {
        let value = value == "1" || value.eq_ignore_ascii_case("true");
        self.make(m, Value::Boolean { value })
    }

    pub fn token_value_number(&self, m: Match<'_>, value: &str, unit: Option<NumberUnit>) -> ValueToken {
        let multiplier = unit.map_or(1.0, NumberUnit::multiplier);
        let raw_value = parse_number(value) * multiplier;
        self.make(m, Value::Number(Number { value: value.to_string(), raw_value, unit }))
    }

    pub fn token_value_text(&self, m: Match<'_>, value: &str, quoted: bool) -> ValueToken {
        self.make(m, Value::Text { value: value.to_string(), quoted })
    }

    pub fn token_value_number_list(&self, m: Match<'_>, first: ValueToken, rest: ListTail<Value>) -> ValueToken {
        self.make(m, Value::NumberList { items: join(first, rest) })
    }

    pub fn token_value_text_list(&self, m: Match<'_>, first: ValueToken, rest: ListTail<Value>) -> ValueToken {
        self.make(m, Value::TextList { items: join(first, rest) })
    }
}

fn join<T>(first: Located<T>, rest: ListTail<T>) -> Vec<ListItem<T>> {
    std::iter::once(ListItem::first(first))
        .chain(rest.into_iter().map(|(separator, value)| ListItem { separator, value }))
        .collect()
}

// the grammar only hands over digits with an optional sign and fraction
fn parse_number(value: &str) -> f64 {
    value.parse::<f64>().unwrap_or(f64::NAN)
}

/// `YYYY-MM-DD`, optionally followed by `THH:MM[:SS[.fff]]`, then optionally
/// `Z` or `+HH:MM`/`-HH:MM`. A value without an offset is taken as UTC.
pub fn parse_iso8601(value: &str) -> Option<DateTime<FixedOffset>> {
    let (local, offset) = split_offset(value)?;
    let naive = if local.contains('T') {
        NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M"))
            .ok()?
    } else {
        NaiveDate::parse_from_str(local, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)?
    };
    offset.from_local_datetime(&naive).single()
}

// `YYYY-MM-DD`
const DATE_LEN: usize = 10;

fn split_offset(value: &str) -> Option<(&str, FixedOffset)> {
    if let Some(local) = value.strip_suffix('Z') {
        return Some((local, FixedOffset::east_opt(0)?));
    }
    // the offset sign comes after the time part, or right after the date
    let sign_at = match value.find('T') {
        Some(t) => value[t..].rfind(|c: char| c == '+' || c == '-').map(|i| t + i),
        None => value
            .get(DATE_LEN..)
            .filter(|rest| rest.starts_with(|c: char| c == '+' || c == '-'))
            .map(|_| DATE_LEN),
    };
    match sign_at {
        Some(at) => {
            let (local, offset) = value.split_at(at);
            let sign = if offset.starts_with('-') { -1 } else { 1 };
            let (hours, minutes) = offset[1..].split_once(':')?;
            let seconds = hours.parse::<i32>().ok()? * 3600 + minutes.parse::<i32>().ok()? * 60;
            Some((local, FixedOffset::east_opt(sign * seconds)?))
        }
        None => Some((value, FixedOffset::east_opt(0)?)),
    }
}

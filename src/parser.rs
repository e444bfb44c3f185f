//! Query parsing.
//!
//! The grammar (`search.pest`) is run by pest; [`PestGrammar`] walks the
//! resulting pairs depth first and hands each recognized construct to the
//! [`TokenConverter`] together with its text and location. Any other
//! [`Grammar`] implementation can be plugged in through [`parse_search_with`].

use pest::Parser;
use pest::error::{ErrorVariant, InputLocation, LineColLocation};
use pest::iterators::{Pair, Pairs};
use pest_derive::Parser;
use tracing::{debug, warn};

use crate::converter::{ListTail, Match, TokenConverter};
use crate::error::{Result, SearchError, SyntaxError};
use crate::filter::{BooleanOperator, FilterType, TermOperator};
use crate::token::{
    DurationUnit, KeyToken, Located, Location, NumberUnit, Position, RelativeDateUnit, Sign, Token,
    ValueToken,
};

#[derive(Parser)]
#[grammar = "search.pest"]
pub struct SearchParser;

/// Either the complete top-level token sequence or the reason there is none.
pub type ParseResult = Result<Vec<Token>>;

/// Turns a query into tokens by calling the converter for each construct it
/// recognizes, in source order.
pub trait Grammar {
    fn parse(&self, query: &str, converter: &TokenConverter) -> ParseResult;
}

/// The search grammar in `search.pest`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PestGrammar;

impl Grammar for PestGrammar {
    fn parse(&self, query: &str, converter: &TokenConverter) -> ParseResult {
        let mut pairs = SearchParser::parse(Rule::search, query).map_err(|e| syntax_error(e, query))?;
        let search = pairs
            .next()
            .ok_or_else(|| SearchError::Invariant("no search pair produced".into()))?;
        let walker = Walker { converter };
        walker.sequence(search.into_inner())
    }
}

/// Parses a query with the default grammar. All or nothing: either every
/// byte of `query` is covered by a token or a [`SyntaxError`] is returned.
pub fn parse_search(query: &str) -> ParseResult {
    parse_search_with(&PestGrammar, query)
}

pub fn parse_search_with<G: Grammar + ?Sized>(grammar: &G, query: &str) -> ParseResult {
    // a fresh converter per parse
    let converter = TokenConverter::new();
    let result = grammar.parse(query, &converter);
    match &result {
        Ok(tokens) => debug!(bytes = query.len(), tokens = tokens.len(), "parsed search query"),
        Err(e) => debug!(bytes = query.len(), error = %e, "search query rejected"),
    }
    result
}

/// Parses `query`, falling back to a single free text token spanning the
/// whole query when it is not valid syntax.
pub fn parse_search_or_free_text(query: &str) -> Vec<Token> {
    match parse_search(query) {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(error = %e, "unparseable search query, treating it as free text");
            free_text_fallback(query)
        }
    }
}

/// The whole query as one unquoted free text token (nothing for an empty query).
pub fn free_text_fallback(query: &str) -> Vec<Token> {
    match pest::Span::new(query, 0, query.len()) {
        Some(span) if !query.is_empty() => {
            vec![TokenConverter::new().token_free_text(Match::new(query, location(span)), query, false)]
        }
        _ => Vec::new(),
    }
}

// ---- errors ----

fn syntax_error(error: pest::error::Error<Rule>, query: &str) -> SearchError {
    let byte_offset = match &error.location {
        InputLocation::Pos(p) => *p,
        InputLocation::Span((start, _)) => *start,
    };
    let (line, column) = match &error.line_col {
        LineColLocation::Pos(lc) => *lc,
        LineColLocation::Span(lc, _) => *lc,
    };
    let mut expected: Vec<String> = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } => {
            positives.iter().map(|rule| describe(*rule).to_string()).collect()
        }
        ErrorVariant::CustomError { message } => vec![message.clone()],
    };
    expected.sort();
    expected.dedup();
    let position = query.get(..byte_offset).map_or(byte_offset, |s| s.chars().count());
    let message = if expected.is_empty() {
        format!("unexpected input at {:?}", query.get(byte_offset..).unwrap_or(""))
    } else {
        format!("expected {}", expected.join(", "))
    };
    SearchError::Syntax(SyntaxError { position, byte_offset, line, column, expected, message })
}

fn describe(rule: Rule) -> &'static str {
    match rule {
        Rule::EOI => "end of query",
        Rule::boolean_operator => "AND or OR",
        Rule::logic_group => "parenthesized group",
        Rule::free_text_quoted | Rule::free_text_unquoted => "free text",
        Rule::spaces => "whitespace",
        Rule::negation => "negation",
        Rule::operator => "operator",
        Rule::key_simple | Rule::key_quoted | Rule::key_quoted_inner | Rule::key_explicit_tag
        | Rule::key_aggregate => "filter key",
        Rule::key_aggregate_args | Rule::aggregate_param_quoted | Rule::aggregate_param_raw => {
            "aggregate argument"
        }
        Rule::list_separator => "comma",
        Rule::quoted_inner => "closing quote",
        Rule::value_quoted | Rule::value_unquoted | Rule::value_in_list => "text value",
        Rule::number | Rule::numeric_literal | Rule::numeric_value => "number",
        Rule::number_unit => "number unit",
        Rule::percentage_value => "percentage",
        Rule::duration_value | Rule::duration_unit => "duration",
        Rule::rel_date_value | Rule::rel_date_sign | Rule::rel_date_magnitude | Rule::rel_date_unit => {
            "relative date"
        }
        Rule::iso_date_value => "date",
        Rule::boolean_value => "boolean",
        Rule::text_in_list | Rule::numeric_in_list => "list",
        _ => "filter",
    }
}

// ---- positions ----

fn position(pos: pest::Position<'_>) -> Position {
    let (line, column) = pos.line_col();
    Position { offset: pos.pos(), line, column }
}

fn location(span: pest::Span<'_>) -> Location {
    Location { start: position(span.start_pos()), end: position(span.end_pos()) }
}

// ---- walking ----

struct Walker<'c> {
    converter: &'c TokenConverter,
}

impl<'q> Walker<'_> {
    fn matched(&self, pair: &Pair<'q, Rule>) -> Match<'q> {
        Match::new(pair.as_str(), location(pair.as_span()))
    }

    /// Top level and group bodies.
    fn sequence(&self, pairs: Pairs<'q, Rule>) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        for pair in pairs {
            match pair.as_rule() {
                Rule::EOI => (),
                Rule::spaces => {
                    if !pair.as_str().is_empty() {
                        tokens.push(self.spaces(&pair));
                    }
                }
                _ => tokens.push(self.operand(pair)?),
            }
        }
        Ok(tokens)
    }

    fn spaces(&self, pair: &Pair<'q, Rule>) -> Token {
        self.converter.token_spaces(self.matched(pair), pair.as_str())
    }

    fn operand(&self, pair: Pair<'q, Rule>) -> Result<Token> {
        let m = self.matched(&pair);
        match pair.as_rule() {
            Rule::boolean_operator => {
                let value = BooleanOperator::from_keyword(pair.as_str())
                    .ok_or_else(|| unexpected(&pair, "boolean operator"))?;
                Ok(self.converter.token_logic_boolean(m, value))
            }
            Rule::logic_group => {
                let inner = self.sequence(pair.into_inner())?;
                Ok(self.converter.token_logic_group(m, inner))
            }
            Rule::free_text_quoted => Ok(self.converter.token_free_text(m, inner_text(pair), true)),
            Rule::free_text_unquoted => Ok(self.converter.token_free_text(m, pair.as_str(), false)),
            _ => self.filter(pair),
        }
    }

    fn filter(&self, pair: Pair<'q, Rule>) -> Result<Token> {
        let m = self.matched(&pair);
        let filter_type = match pair.as_rule() {
            Rule::has_filter => FilterType::Has,
            Rule::is_filter => FilterType::Is,
            Rule::date_filter => FilterType::Date,
            Rule::specific_date_filter => FilterType::SpecificDate,
            Rule::rel_date_filter => FilterType::RelativeDate,
            Rule::duration_filter => FilterType::Duration,
            Rule::boolean_filter => FilterType::Boolean,
            Rule::numeric_in_filter => FilterType::NumericIn,
            Rule::numeric_filter => FilterType::Numeric,
            Rule::aggregate_duration_filter
            | Rule::aggregate_numeric_filter
            | Rule::aggregate_percentage_filter => FilterType::AggregateSimple,
            Rule::aggregate_date_filter => FilterType::AggregateDate,
            Rule::aggregate_rel_date_filter => FilterType::AggregateRelativeDate,
            Rule::text_in_filter => FilterType::TextIn,
            Rule::text_filter => FilterType::Text,
            _ => return Err(unexpected(&pair, "search term")),
        };
        let mut negated = false;
        let mut operator = None;
        let mut key = None;
        let mut value = None;
        for part in pair.clone().into_inner() {
            match part.as_rule() {
                Rule::negation => negated = true,
                Rule::operator => {
                    let op = TermOperator::from_symbol(part.as_str())
                        .ok_or_else(|| unexpected(&part, "operator"))?;
                    operator = Some(op);
                }
                Rule::key_simple | Rule::key_quoted | Rule::key_explicit_tag | Rule::key_aggregate => {
                    key = Some(self.key(part)?);
                }
                _ => value = Some(self.value(part)?),
            }
        }
        let key = key.ok_or_else(|| unexpected(&pair, "filter with a key"))?;
        let value = value.ok_or_else(|| unexpected(&pair, "filter with a value"))?;
        Ok(self.converter.token_filter(m, filter_type, key, value, operator, negated))
    }

    fn key(&self, pair: Pair<'q, Rule>) -> Result<KeyToken> {
        let m = self.matched(&pair);
        match pair.as_rule() {
            Rule::key_simple | Rule::aggregate_param_raw => {
                Ok(self.converter.token_key_simple(m, pair.as_str(), false))
            }
            Rule::key_quoted | Rule::aggregate_param_quoted => {
                Ok(self.converter.token_key_simple(m, inner_text(pair), true))
            }
            Rule::key_explicit_tag => {
                let mut parts = pair.clone().into_inner();
                let prefix = parts.next().ok_or_else(|| unexpected(&pair, "tag prefix"))?;
                let key = parts.next().ok_or_else(|| unexpected(&pair, "tag key"))?;
                let key = self.key(key)?;
                Ok(self.converter.token_key_explicit_tag(m, prefix.as_str(), key))
            }
            Rule::key_aggregate => {
                let mut parts = pair.clone().into_inner();
                let name = parts.next().ok_or_else(|| unexpected(&pair, "aggregate name"))?;
                let name = self.key(name)?;
                let before = parts.next().ok_or_else(|| unexpected(&pair, "whitespace"))?;
                let before = self.spaces(&before);
                let mut next = parts.next().ok_or_else(|| unexpected(&pair, "whitespace"))?;
                let mut args = None;
                if next.as_rule() == Rule::key_aggregate_args {
                    args = Some(self.key(next)?);
                    next = parts.next().ok_or_else(|| unexpected(&pair, "whitespace"))?;
                }
                let after = self.spaces(&next);
                Ok(self.converter.token_key_aggregate(m, name, args, before, after))
            }
            Rule::key_aggregate_args => {
                let (first, rest) = self.list(&pair, |walker, item| walker.key(item))?;
                Ok(self.converter.token_key_aggregate_args(m, first, rest))
            }
            _ => Err(unexpected(&pair, "filter key")),
        }
    }

    fn value(&self, pair: Pair<'q, Rule>) -> Result<ValueToken> {
        let m = self.matched(&pair);
        match pair.as_rule() {
            Rule::iso_date_value => Ok(self.converter.token_value_iso8601_date(m, pair.as_str())),
            Rule::rel_date_value => {
                let (sign, magnitude, unit) = self.three(&pair)?;
                let sign = Sign::from_symbol(sign.as_str()).ok_or_else(|| unexpected(&sign, "sign"))?;
                let unit = RelativeDateUnit::from_suffix(unit.as_str())
                    .ok_or_else(|| unexpected(&unit, "relative date unit"))?;
                Ok(self.converter.token_value_relative_date(m, magnitude.as_str(), sign, unit))
            }
            Rule::duration_value => {
                let mut parts = pair.clone().into_inner();
                let number = parts.next().ok_or_else(|| unexpected(&pair, "number"))?;
                let unit = parts.next().ok_or_else(|| unexpected(&pair, "duration unit"))?;
                let unit = DurationUnit::from_suffix(unit.as_str())
                    .ok_or_else(|| unexpected(&unit, "duration unit"))?;
                Ok(self.converter.token_value_duration(m, number.as_str(), unit))
            }
            Rule::percentage_value => {
                let number = pair.clone().into_inner().next().ok_or_else(|| unexpected(&pair, "number"))?;
                Ok(self.converter.token_value_percentage(m, number.as_str()))
            }
            Rule::boolean_value => Ok(self.converter.token_value_boolean(m, pair.as_str())),
            Rule::numeric_value => {
                let mut parts = pair.clone().into_inner();
                let literal = parts.next().ok_or_else(|| unexpected(&pair, "number"))?;
                let unit = match parts.next() {
                    Some(unit) => Some(
                        NumberUnit::from_suffix(unit.as_str()).ok_or_else(|| unexpected(&unit, "number unit"))?,
                    ),
                    None => None,
                };
                Ok(self.converter.token_value_number(m, literal.as_str(), unit))
            }
            Rule::value_quoted => Ok(self.converter.token_value_text(m, inner_text(pair), true)),
            Rule::value_unquoted | Rule::value_in_list => {
                Ok(self.converter.token_value_text(m, pair.as_str(), false))
            }
            Rule::numeric_in_list => {
                let (first, rest) = self.list(&pair, |walker, item| walker.value(item))?;
                Ok(self.converter.token_value_number_list(m, first, rest))
            }
            Rule::text_in_list => {
                let (first, rest) = self.list(&pair, |walker, item| walker.value(item))?;
                Ok(self.converter.token_value_text_list(m, first, rest))
            }
            _ => Err(unexpected(&pair, "filter value")),
        }
    }

    /// Splits a list pair into its first item and the `(separator, item)`
    /// pairs that follow. A separator directly followed by another separator
    /// or the end of the list has no item.
    fn list<T>(
        &self,
        pair: &Pair<'q, Rule>,
        item: impl Fn(&Self, Pair<'q, Rule>) -> Result<Located<T>>,
    ) -> Result<(Located<T>, ListTail<T>)> {
        let mut parts = pair.clone().into_inner();
        let first = parts.next().ok_or_else(|| unexpected(pair, "list item"))?;
        let first = item(self, first)?;
        let mut rest: ListTail<T> = Vec::new();
        for part in parts {
            if part.as_rule() == Rule::list_separator {
                rest.push((part.as_str().to_string(), None));
            } else {
                let value = item(self, part)?;
                match rest.last_mut() {
                    Some((_, slot)) if slot.is_none() => *slot = Some(value),
                    _ => return Err(unexpected(pair, "list separator")),
                }
            }
        }
        Ok((first, rest))
    }

    fn three(&self, pair: &Pair<'q, Rule>) -> Result<(Pair<'q, Rule>, Pair<'q, Rule>, Pair<'q, Rule>)> {
        let mut parts = pair.clone().into_inner();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c)) => Ok((a, b, c)),
            _ => Err(unexpected(pair, "three parts")),
        }
    }
}

/// Text between the quotes of a quoted construct, escapes left as written.
fn inner_text<'q>(pair: Pair<'q, Rule>) -> &'q str {
    pair.into_inner().next().map_or("", |inner| inner.as_str())
}

fn unexpected(pair: &Pair<'_, Rule>, wanted: &str) -> SearchError {
    SearchError::Invariant(format!(
        "expected {wanted}, grammar produced {:?} at {}",
        pair.as_rule(),
        pair.as_span().start()
    ))
}

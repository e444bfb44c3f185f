//! search_syntax – a tokenizer for structured search bar queries.
//!
//! A query such as
//!
//! ```text
//! is:unresolved !browser:firefox (count():>10k OR p95(duration):>1.5s) age:-24h
//! ```
//!
//! is parsed into a sequence of typed, located tokens: filters, free text,
//! parenthesized logic groups, `AND`/`OR` booleans and the whitespace between
//! them. Concatenating the `text` of the top-level tokens always gives back
//! the query exactly, so a consumer can both interpret the query (build a
//! backend filter) and re-render it (highlight it in a search bar).
//!
//! ## Modules
//! * [`filter`] – The filter type registry: for each [`filter::FilterType`]
//!   the key kinds, operators and value kinds it accepts and whether it may be
//!   negated.
//! * [`token`] – The token model: [`token::Token`], [`token::Key`],
//!   [`token::Value`] and their locations.
//! * [`converter`] – [`converter::TokenConverter`], one constructor per token
//!   kind, called by the grammar as it recognizes constructs.
//! * [`parser`] – The pest grammar (`search.pest`), the [`parser::Grammar`]
//!   seam and [`parse_search`].
//! * [`settings`] – Configuration for the `search-syntax` binary.
//!
//! ## Parsing
//! [`parse_search`] is all or nothing: it returns the full token sequence or
//! a [`SearchError::Syntax`] carrying the offset where the grammar gave up
//! and what it expected there. Values that are syntactically fine but
//! semantically odd (a date like `2021-02-30`) are not errors; the token
//! carries the unparsed marker and the consumer decides.
//!
//! ## Quick Start
//! ```
//! use search_syntax::{parse_search, token::{reconstruct, filters, Value}};
//! let query = "user.email:foo@example.com count:>5k";
//! let tokens = parse_search(query).unwrap();
//! assert_eq!(reconstruct(&tokens), query);
//! let found = filters(&tokens);
//! assert_eq!(found.len(), 2);
//! match &found[1].value.node {
//!     Value::Number(number) => assert_eq!(number.raw_value, 5000.0),
//!     other => panic!("unexpected value {other:?}"),
//! }
//! ```
//!
//! Callers that would rather show something than nothing can use
//! [`parse_search_or_free_text`], which degrades an invalid query to a single
//! free text token.

pub mod converter;
pub mod error;
pub mod filter;
pub mod parser;
pub mod settings;
pub mod token;

pub use error::{Result, SearchError, SyntaxError};
pub use parser::{parse_search, parse_search_or_free_text, parse_search_with, Grammar, ParseResult, PestGrammar};

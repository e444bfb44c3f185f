//! `search-syntax [QUERY...]`
//!
//! Tokenizes each query given on the command line, or each line of stdin
//! when there are none, and prints the tokens as JSON, one document per
//! query. A query that does not parse is logged and printed as a single
//! free text token.

use std::io::{self, BufRead, Write};

use search_syntax::parser::free_text_fallback;
use search_syntax::settings::Settings;
use search_syntax::{Result, parse_search};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let (settings, load_error) = match Settings::from_env() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
    if let Some(e) = load_error {
        warn!(error = %e, "could not load settings, using defaults");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line?;
            emit(&settings, &line, &mut out)?;
        }
    } else {
        for query in &args {
            emit(&settings, query, &mut out)?;
        }
    }
    Ok(())
}

fn emit(settings: &Settings, query: &str, out: &mut impl Write) -> Result<()> {
    let tokens = if !settings.admits(query) {
        warn!(bytes = query.len(), max = ?settings.max_query_length, "query too long, treating it as free text");
        free_text_fallback(query)
    } else {
        match parse_search(query) {
            Ok(tokens) => {
                info!(tokens = tokens.len(), "tokenized");
                tokens
            }
            Err(e) => {
                warn!(error = %e, "unparseable search query, treating it as free text");
                free_text_fallback(query)
            }
        }
    };
    let json = if settings.pretty {
        serde_json::to_string_pretty(&tokens)?
    } else {
        serde_json::to_string(&tokens)?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

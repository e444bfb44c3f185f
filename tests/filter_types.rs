use search_syntax::filter::{FilterType, TermOperator, lookup};
use search_syntax::parse_search;
use search_syntax::token::{TokenKind, filters};

fn filter_type_of(query: &str) -> FilterType {
    let tokens = parse_search(query).expect("query ok");
    let found = filters(&tokens);
    assert_eq!(found.len(), 1, "one filter in {query:?}");
    found[0].filter
}

#[test]
fn every_filter_type_has_a_config() {
    for filter_type in FilterType::ALL {
        let config = lookup(filter_type);
        assert!(!config.valid_keys.is_empty(), "{filter_type} has keys");
        assert!(!config.valid_values.is_empty(), "{filter_type} has values");
        assert!(std::ptr::eq(config, filter_type.config()));
    }
}

#[test]
fn negation_capability() {
    let negatable: Vec<FilterType> = FilterType::ALL.into_iter().filter(|t| t.config().can_negate).collect();
    assert_eq!(
        negatable,
        vec![
            FilterType::Text,
            FilterType::TextIn,
            FilterType::Boolean,
            FilterType::AggregateSimple,
            FilterType::AggregateDate,
            FilterType::AggregateRelativeDate,
            FilterType::Has,
            FilterType::Is,
        ]
    );
}

#[test]
fn operator_capability() {
    assert!(FilterType::Numeric.config().accepts_operator(TermOperator::GreaterThan));
    assert!(FilterType::Date.config().accepts_operator(TermOperator::LessThanEqual));
    assert!(!FilterType::Text.config().accepts_operator(TermOperator::GreaterThan));
    assert!(FilterType::Text.config().accepts_operator(TermOperator::Default), "default is always accepted");
    assert!(FilterType::TextIn.config().valid_ops.is_empty());
}

#[test]
fn key_capability() {
    assert!(FilterType::Text.config().accepts_key(TokenKind::KeyExplicitTag));
    assert!(!FilterType::Numeric.config().accepts_key(TokenKind::KeyExplicitTag));
    assert!(FilterType::AggregateSimple.config().accepts_key(TokenKind::KeyAggregate));
    assert!(!FilterType::AggregateSimple.config().accepts_key(TokenKind::KeySimple));
}

#[test]
fn aggregate_simple_values() {
    let config = FilterType::AggregateSimple.config();
    assert!(config.accepts_value(TokenKind::ValueDuration));
    assert!(config.accepts_value(TokenKind::ValueNumber));
    assert!(config.accepts_value(TokenKind::ValuePercentage));
    assert!(!config.accepts_value(TokenKind::ValueText));
}

#[test]
fn grammar_picks_filter_types() {
    let cases = [
        ("has:release", FilterType::Has),
        ("is:unresolved", FilterType::Is),
        ("timestamp:>2021-01-01", FilterType::Date),
        ("timestamp:2021-01-01", FilterType::SpecificDate),
        ("age:-24h", FilterType::RelativeDate),
        ("transaction.duration:>1.5s", FilterType::Duration),
        ("error.handled:true", FilterType::Boolean),
        ("count:[1, 2, 3]", FilterType::NumericIn),
        ("count:>=42", FilterType::Numeric),
        ("p95():>1.5s", FilterType::AggregateSimple),
        ("count():>10", FilterType::AggregateSimple),
        ("failure_rate():>50%", FilterType::AggregateSimple),
        ("last_seen():>2021-01-01", FilterType::AggregateDate),
        ("last_seen():-7d", FilterType::AggregateRelativeDate),
        ("browser:[firefox, chrome]", FilterType::TextIn),
        ("browser:firefox", FilterType::Text),
        ("tags[browser]:firefox", FilterType::Text),
    ];
    for (query, expected) in cases {
        assert_eq!(filter_type_of(query), expected, "filter type of {query:?}");
    }
}

#[test]
fn filters_respect_their_config() {
    let query = "has:a !is:b t:>2021-01-01 t:2021-01-01 age:-1d d:2s e:true n:[1,2] n:5 count():>1 \
                 !last_seen():>2021-01-01 !last_seen():+1w !x:[a] tags[y]:z";
    let tokens = parse_search(query).expect("query ok");
    let found = filters(&tokens);
    assert_eq!(found.len(), 14);
    for filter in found {
        assert!(filter.config.accepts_key(filter.key.kind()), "key of {:?}", filter.filter);
        assert!(filter.config.accepts_value(filter.value.kind()), "value of {:?}", filter.filter);
        assert!(filter.config.accepts_operator(filter.operator), "operator of {:?}", filter.filter);
        assert!(!filter.negated || filter.config.can_negate, "negation of {:?}", filter.filter);
    }
}

#[test]
fn negation_is_recorded() {
    let tokens = parse_search("!browser:firefox !has:release").expect("query ok");
    let found = filters(&tokens);
    assert!(found[0].negated);
    assert_eq!(found[0].filter, FilterType::Text);
    assert!(found[1].negated);
    assert_eq!(found[1].filter, FilterType::Has);
}

#[test]
fn non_negatable_types_are_never_negated() {
    let cases = [
        ("t:>2021-01-01", FilterType::Date, FilterType::Text),
        ("t:2021-01-01", FilterType::SpecificDate, FilterType::Text),
        ("age:-1d", FilterType::RelativeDate, FilterType::Text),
        ("d:2s", FilterType::Duration, FilterType::Text),
        ("d:>=2s", FilterType::Duration, FilterType::Text),
        ("n:5", FilterType::Numeric, FilterType::Text),
        ("n:<5k", FilterType::Numeric, FilterType::Text),
        ("n:[1,2]", FilterType::NumericIn, FilterType::TextIn),
    ];
    for (query, plain, negated) in cases {
        assert!(!plain.config().can_negate, "{plain} cannot be negated");
        assert_eq!(filter_type_of(query), plain, "filter type of {query:?}");

        let negated_query = format!("!{query}");
        let tokens = parse_search(&negated_query).expect("query ok");
        let found = filters(&tokens);
        assert_eq!(found.len(), 1, "one filter in {negated_query:?}");
        assert_eq!(found[0].filter, negated, "filter type of {negated_query:?}");
        assert!(found[0].negated, "{negated_query:?} is negated");
        assert!(found[0].config.can_negate, "{negated_query:?} has a negatable type");
        assert_eq!(found[0].text, negated_query);
    }
}

#[test]
fn negated_numeric_falls_back_to_text() {
    let tokens = parse_search("!count:5").expect("query ok");
    let found = filters(&tokens);
    assert_eq!(found[0].filter, FilterType::Text);
    assert!(found[0].negated);
}

#[test]
fn missing_operator_is_default() {
    let tokens = parse_search("count:5").expect("query ok");
    assert_eq!(filters(&tokens)[0].operator, TermOperator::Default);
}

#[test]
fn operator_symbols() {
    for op in TermOperator::ALL {
        assert_eq!(TermOperator::from_symbol(op.as_str()), Some(op));
    }
    assert_eq!(TermOperator::from_symbol("=>"), None);
}

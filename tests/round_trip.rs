use search_syntax::parse_search;
use search_syntax::token::{Node, TokenKind, reconstruct};

const QUERIES: &[&str] = &[
    "",
    "   ",
    "hello",
    "is:unresolved",
    "  is:unresolved   browser:firefox  ",
    "user.email:foo@example.com count:>5k",
    "!browser:\"Mobile Safari\" some free text \"quoted free text\"",
    "(a:1 OR b:2) AND c:3",
    "x:[a, b,  c] y:[1, 2k]",
    "tags[environment]:prod count( a ,  b ):>10 p95(transaction.duration):>1.5s",
    "timestamp:>2021-01-01T00:00:00Z age:-24h failure_rate():>50%",
    "a:1\n\tb:2",
];

#[test]
fn text_of_tokens_is_the_query() {
    for query in QUERIES {
        let tokens = parse_search(query).expect("query ok");
        assert_eq!(reconstruct(&tokens), *query, "round trip of {query:?}");
    }
}

#[test]
fn locations_match_text() {
    for query in QUERIES {
        let tokens = parse_search(query).expect("query ok");
        let mut offset = 0;
        for token in &tokens {
            assert_eq!(token.location.start.offset, offset, "tokens of {query:?} are contiguous");
            assert_eq!(&query[token.location.range()], token.text, "location of {:?}", token.text);
            offset = token.location.end.offset;
        }
        assert_eq!(offset, query.len(), "tokens of {query:?} cover it");
    }
}

#[test]
fn empty_query_has_no_tokens() {
    let tokens = parse_search("").expect("query ok");
    assert!(tokens.is_empty());
}

#[test]
fn whitespace_only_query_is_one_spaces_token() {
    let tokens = parse_search("   ").expect("query ok");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].node, Node::Spaces { value: "   ".into() });
}

#[test]
fn top_level_sequence_shape() {
    let tokens = parse_search("  is:unresolved   hello ").expect("query ok");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Spaces, TokenKind::Filter, TokenKind::Spaces, TokenKind::FreeText, TokenKind::Spaces]
    );
}

#[test]
fn adjacent_operands_have_no_empty_spaces_between() {
    let tokens = parse_search("a:1(b:2)").expect("query ok");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind()).collect();
    assert_eq!(kinds, vec![TokenKind::Filter, TokenKind::LogicGroup]);
}

#[test]
fn positions_count_lines_and_columns() {
    let tokens = parse_search("a:1\n\tb:2").expect("query ok");
    let last = tokens.last().expect("a token");
    assert_eq!(last.text, "b:2");
    assert_eq!(last.location.start.offset, 5);
    assert_eq!(last.location.start.line, 2);
    assert_eq!(last.location.start.column, 2);
    assert_eq!(last.location.end.column, 5);
}

#[test]
fn columns_count_characters() {
    let tokens = parse_search("ü:1 b:2").expect("query ok");
    let last = tokens.last().expect("a token");
    assert_eq!(last.location.start.offset, 5, "byte offset");
    assert_eq!(last.location.start.column, 5, "char column");
}

#[test]
fn tokens_serialize_to_json() {
    let tokens = parse_search("is:unresolved count():>5k").expect("query ok");
    let json = serde_json::to_value(&tokens).expect("serializes");
    assert_eq!(json[0]["type"], "filter");
    assert_eq!(json[0]["filter"], "is");
    assert_eq!(json[0]["text"], "is:unresolved");
    assert_eq!(json[0]["key"]["type"], "keySimple");
    assert_eq!(json[0]["operator"], "");
    assert_eq!(json[2]["filter"], "aggregateSimple");
    assert_eq!(json[2]["operator"], ">");
    assert_eq!(json[2]["value"]["type"], "valueNumber");
    assert_eq!(json[2]["value"]["rawValue"], 5000.0);
    assert_eq!(json[2]["value"]["unit"], "k");
    assert_eq!(json[2]["config"]["canNegate"], true);
}

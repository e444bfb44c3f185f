use search_syntax::filter::BooleanOperator;
use search_syntax::parse_search;
use search_syntax::token::{Node, TokenKind, filters, reconstruct};

#[test]
fn group_and_boolean() {
    let query = "(a:1 OR b:2) AND c:3";
    let tokens = parse_search(query).expect("query ok");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind()).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::LogicGroup, TokenKind::Spaces, TokenKind::LogicBoolean, TokenKind::Spaces, TokenKind::Filter]
    );
    assert_eq!(tokens[0].text, "(a:1 OR b:2)");
    assert_eq!(tokens[2].node, Node::LogicBoolean { value: BooleanOperator::And });

    match &tokens[0].node {
        Node::LogicGroup { inner } => {
            let kinds: Vec<TokenKind> = inner.iter().map(|t| t.kind()).collect();
            assert_eq!(
                kinds,
                vec![TokenKind::Filter, TokenKind::Spaces, TokenKind::LogicBoolean, TokenKind::Spaces, TokenKind::Filter]
            );
            assert_eq!(inner[2].node, Node::LogicBoolean { value: BooleanOperator::Or });
            assert_eq!(inner[0].location.start.offset, 1, "inner tokens keep query offsets");
            assert_eq!(reconstruct(inner), "a:1 OR b:2");
        }
        other => panic!("expected a group, got {other:?}"),
    }
    assert_eq!(filters(&tokens).len(), 3, "filters are found inside groups");
}

#[test]
fn group_keeps_inner_padding() {
    let tokens = parse_search("( a:1 )").expect("query ok");
    match &tokens[0].node {
        Node::LogicGroup { inner } => {
            assert_eq!(inner.len(), 3);
            assert_eq!(inner[0].node, Node::Spaces { value: " ".into() });
            assert_eq!(inner[2].node, Node::Spaces { value: " ".into() });
        }
        other => panic!("expected a group, got {other:?}"),
    }
}

#[test]
fn nested_groups() {
    let query = "((a OR b) c)";
    let tokens = parse_search(query).expect("query ok");
    assert_eq!(tokens.len(), 1);
    match &tokens[0].node {
        Node::LogicGroup { inner } => {
            assert_eq!(inner[0].kind(), TokenKind::LogicGroup);
            assert_eq!(inner[0].text, "(a OR b)");
        }
        other => panic!("expected a group, got {other:?}"),
    }
}

#[test]
fn operators_are_case_insensitive() {
    let tokens = parse_search("a and b or c").expect("query ok");
    let operators: Vec<&Node> = tokens.iter().filter(|t| t.kind() == TokenKind::LogicBoolean).map(|t| &t.node).collect();
    assert_eq!(
        operators,
        vec![
            &Node::LogicBoolean { value: BooleanOperator::And },
            &Node::LogicBoolean { value: BooleanOperator::Or },
        ]
    );
    assert_eq!(tokens[2].text, "and", "operator text is kept as written");
}

#[test]
fn words_starting_with_operators_are_free_text() {
    let tokens = parse_search("ANDROID ORACLE").expect("query ok");
    assert_eq!(tokens[0].node, Node::FreeText { value: "ANDROID".into(), quoted: false });
    assert_eq!(tokens[2].node, Node::FreeText { value: "ORACLE".into(), quoted: false });
}

#[test]
fn operator_before_a_group() {
    let tokens = parse_search("a OR(b)").expect("query ok");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind()).collect();
    assert_eq!(kinds, vec![TokenKind::FreeText, TokenKind::Spaces, TokenKind::LogicBoolean, TokenKind::LogicGroup]);
}

#[test]
fn free_text() {
    let tokens = parse_search("hello \"big world\"").expect("query ok");
    assert_eq!(tokens[0].node, Node::FreeText { value: "hello".into(), quoted: false });
    assert_eq!(tokens[2].text, "\"big world\"");
    assert_eq!(tokens[2].node, Node::FreeText { value: "big world".into(), quoted: true });
}

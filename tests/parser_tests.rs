// tests/parser_tests.rs

use filter_expr::{
    Ast, Condition, GroupedToken, Literal, ParseError, TokenKind, build, group, lexer::tokenize,
    output::to_expression, parse,
};

fn render(expr: &str) -> String {
    to_expression(&group(tokenize(expr)).unwrap())
}

fn parse_err(expr: &str) -> ParseError {
    parse(expr).unwrap_err()
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_group_keeps_brackets() {
    let grouped = group(tokenize("( a == 1 )")).unwrap();
    assert_eq!(grouped.len(), 1);

    let GroupedToken::Group(members) = &grouped[0] else {
        panic!("expected a group, got {:?}", grouped[0]);
    };
    assert_eq!(members.len(), 5);
    assert_eq!(members.first().and_then(GroupedToken::kind), Some(TokenKind::LeftBracket));
    assert_eq!(members.last().and_then(GroupedToken::kind), Some(TokenKind::RightBracket));
}

#[test]
fn test_nested_groups() {
    let grouped = group(tokenize("((a == 1) || [b == 2])")).unwrap();
    let GroupedToken::Group(outer) = &grouped[0] else {
        panic!("expected a group");
    };
    assert!(matches!(outer[1], GroupedToken::Group(_)));
    assert!(matches!(outer[3], GroupedToken::Group(_)));
}

#[test]
fn test_empty_expression() {
    assert_eq!(group(tokenize("")).unwrap(), vec![]);
    assert_eq!(parse("  ").unwrap(), None);
}

// ============================================================================
// Structural Errors
// ============================================================================

#[test]
fn test_unmatched_right_bracket() {
    let err = parse_err("test == 123 && ( keyword contains 'hello'))");
    assert_eq!(err, ParseError::UnmatchedRightBracket { offset: 42 });
}

#[test]
fn test_mismatched_bracket_kind() {
    let err = parse_err("( a == 1 ]");
    assert_eq!(err, ParseError::UnmatchedRightBracket { offset: 9 });
}

#[test]
fn test_unclosed_bracket_reports_outermost() {
    let err = parse_err("( ( a == 1 )");
    assert_eq!(err, ParseError::UnclosedBracket { offset: 0 });
}

#[test]
fn test_deeply_unclosed_brackets() {
    let err = parse_err(&"(".repeat(5_000));
    assert!(matches!(err, ParseError::MissingTerminator { .. }), "{err:?}");

    let expr = format!("{}a == 1", "( ".repeat(5_000));
    assert_eq!(parse_err(&expr), ParseError::UnclosedBracket { offset: 0 });

    let expr = format!("a == 1{}", " )".repeat(5_000));
    assert_eq!(parse_err(&expr), ParseError::UnmatchedRightBracket { offset: 7 });
}

#[test]
fn test_missing_terminator() {
    assert_eq!(
        parse_err("a == 1 &&"),
        ParseError::MissingTerminator {
            offset: 9,
            last: TokenKind::LogicalOp,
        }
    );
    assert_eq!(
        parse_err("a =="),
        ParseError::MissingTerminator {
            offset: 4,
            last: TokenKind::Condition,
        }
    );
    assert!(matches!(parse_err("a"), ParseError::MissingTerminator { .. }));
}

#[test]
fn test_illegal_transitions() {
    let test_cases = vec![
        ("a 1", 2, TokenKind::Number, TokenKind::Identifier),
        ("== 1", 0, TokenKind::Condition, TokenKind::LiteralBegin),
        ("a == b", 5, TokenKind::Identifier, TokenKind::Condition),
        ("a == 1 b == 2", 7, TokenKind::Identifier, TokenKind::Number),
        ("a == 1 && && b == 2", 10, TokenKind::LogicalOp, TokenKind::LogicalOp),
        ("a (b == 1)", 2, TokenKind::LeftBracket, TokenKind::Identifier),
        ("a == 1 @", 7, TokenKind::Illegal, TokenKind::Number),
    ];

    for (input, offset, found, after) in test_cases {
        match parse_err(input) {
            ParseError::IllegalTransition {
                offset: o,
                found: f,
                after: a,
                ..
            } => {
                assert_eq!((o, f, a), (offset, found, after), "Failed for input: {}", input);
            }
            other => panic!("expected IllegalTransition for {}, got {:?}", input, other),
        }
    }
}

#[test]
fn test_illegal_only_input() {
    let err = parse_err("@@@");
    assert_eq!(err.offset(), 0);
    assert!(matches!(err, ParseError::IllegalTransition { found: TokenKind::Illegal, .. }));
}

#[test]
fn test_error_messages_point_at_offset() {
    let err = parse_err("a == 1 &&");
    assert_eq!(err.to_string(), "incomplete expression at position 9 (ends with logical operator)");

    let err = parse_err("a == b");
    assert_eq!(err.to_string(), "unexpected identifier 'b' at position 5 (after condition)");
}

// ============================================================================
// AST Building
// ============================================================================

#[test]
fn test_left_associativity() {
    let ast = parse("a==1 && b==2 || c==3").unwrap().unwrap();
    assert_eq!(
        ast,
        Ast::or(
            Ast::and(
                Ast::term("a", Condition::Equal, 1.0),
                Ast::term("b", Condition::Equal, 2.0),
            ),
            Ast::term("c", Condition::Equal, 3.0),
        )
    );
}

#[test]
fn test_no_connective_precedence() {
    let ast = parse("a==1 || b==2 && c==3").unwrap().unwrap();
    assert_eq!(
        ast,
        Ast::and(
            Ast::or(
                Ast::term("a", Condition::Equal, 1.0),
                Ast::term("b", Condition::Equal, 2.0),
            ),
            Ast::term("c", Condition::Equal, 3.0),
        )
    );
}

#[test]
fn test_group_attaches_as_right_child() {
    let ast = parse("a == 1 && (b == 2 || c == 3)").unwrap().unwrap();
    assert_eq!(
        ast,
        Ast::and(
            Ast::term("a", Condition::Equal, 1.0),
            Ast::or(
                Ast::term("b", Condition::Equal, 2.0),
                Ast::term("c", Condition::Equal, 3.0),
            ),
        )
    );
}

#[test]
fn test_leading_group_becomes_root() {
    let ast = parse("((a == 1)) || b != 'x'").unwrap().unwrap();
    assert_eq!(
        ast,
        Ast::or(
            Ast::term("a", Condition::Equal, 1.0),
            Ast::term("b", Condition::NotEqual, "x"),
        )
    );
}

#[test]
fn test_term_literal_kinds() {
    let ast = parse("flag == true && name startsWith \"Al\"").unwrap().unwrap();
    let terms = ast.terms();
    assert_eq!(terms[0].value, Literal::Bool(true));
    assert_eq!(terms[1].condition, Condition::StartsWith);
    assert_eq!(terms[1].value, Literal::from("Al"));
}

#[test]
fn test_deep_nesting_builds_single_term() {
    let expr = format!("{}a == 1{}", "( ".repeat(5_000), " )".repeat(5_000));
    let ast = parse(&expr).unwrap().unwrap();
    assert_eq!(ast, Ast::term("a", Condition::Equal, 1.0));
    assert_eq!(render(&expr), expr);
}

#[test]
fn test_long_chain_is_left_leaning() {
    let expr = vec!["a == 1"; 5_000].join(" || ");
    let ast = parse(&expr).unwrap().unwrap();
    assert_eq!(ast.terms().len(), 5_000);

    let Ast::Operator { right, .. } = &ast else {
        panic!("expected an operator, got a term");
    };
    assert_eq!(**right, Ast::term("a", Condition::Equal, 1.0));
}

#[test]
fn test_build_empty() {
    assert_eq!(build(&[]), None);
}

// ============================================================================
// Rendering
// ============================================================================

#[test]
fn test_render_normalises_spacing() {
    let test_cases = vec![
        ("a==1", "a == 1"),
        ("  a   ==   1  ", "a == 1"),
        ("age>=18&&(city==\"NY\")", "age >= 18 && ( city == 'NY' )"),
        ("x in 'a,b'||[y < 2.50]", "x in 'a,b' || [ y < 2.5 ]"),
        ("n == -0.5 && f == false", "n == -0.5 && f == false"),
        ("s == 'it\\'s'", "s == 'it\\'s'"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(render(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_render_is_stable() {
    let once = render("a==1&&(b contains \"x\"||c>=2)");
    assert_eq!(render(&once), once);
}

use grammarc::{parse_grammar, Element, Error, Suffix, Terminal};

#[test]
fn two_string_terminals() {
    let grammar = parse_grammar(r#"grammar G { a : "x" "y" ; }"#).unwrap();
    assert_eq!(&*grammar.name, "G");
    assert_eq!(grammar.productions.len(), 1);

    let production = &grammar.productions[0];
    assert_eq!(&*production.name, "a");
    assert_eq!(production.rules.len(), 1);

    let strings: Vec<_> = production.rules[0]
        .components
        .iter()
        .map(|component| match component.element {
            Element::Terminal(id) => grammar.terminals[id].clone(),
            ref other => panic!("expected terminal, got {other:?}"),
        })
        .collect();
    assert_eq!(
        strings,
        [Terminal::String("x".into()), Terminal::String("y".into())]
    );
}

#[test]
fn labelled_repetition() {
    let grammar = parse_grammar("grammar G { a : label = ident* ; }").unwrap();
    let component = &grammar.productions[0].rules[0].components[0];
    assert_eq!(component.label.as_deref(), Some("label"));
    assert_eq!(component.suffixes, [Suffix::ZeroOrMore]);
    let Element::Terminal(id) = component.element else {
        panic!("expected terminal");
    };
    assert_eq!(grammar.terminals[id], Terminal::Ident("ident".into()));
}

#[test]
fn unterminated_code_block() {
    let err = parse_grammar("grammar G { a : x { never { closed ; }").unwrap_err();
    assert!(
        matches!(
            err,
            Error::Lex(grammarc_runtime::Error::UnexpectedEof { .. })
        ),
        "{err}"
    );
}

#[test]
fn regex_literal_with_flag() {
    let grammar = parse_grammar("grammar G { a : /[ab]+/i ; }").unwrap();
    let component = &grammar.productions[0].rules[0].components[0];
    let Element::Terminal(id) = component.element else {
        panic!("expected terminal");
    };
    let Terminal::Set(set) = &grammar.terminals[id] else {
        panic!("expected a regex set");
    };
    assert_eq!(&*set.source, "[ab]+");
    assert_eq!(&*set.flags, "i");
    assert!(set.regex.is_match("BA"));
    assert!(component.suffixes.is_empty());
}

#[test]
fn equal_terminals_are_shared() {
    let grammar = parse_grammar(
        r#"grammar G {
            a : "x" b /y/ 3 ;
            b : 'x' b /y/ 3 /y/i ;
        }"#,
    )
    .unwrap();
    let ids = |index: usize| -> Vec<_> {
        grammar.productions[index].rules[0]
            .components
            .iter()
            .map(|component| match component.element {
                Element::Terminal(id) => id,
                ref other => panic!("expected terminal, got {other:?}"),
            })
            .collect()
    };
    let a = ids(0);
    let b = ids(1);
    assert_eq!(a, b[..4]);
    // flags are part of the identity
    assert_ne!(b[2], b[4]);
    assert_eq!(grammar.terminals.len(), 5);
}

#[test]
fn escaped_quote_in_string() {
    let grammar = parse_grammar(r#"grammar G { a : "a\"b" ; }"#).unwrap();
    let (_, terminal) = grammar.terminals.iter().next().unwrap();
    assert_eq!(terminal, &Terminal::String("a\"b".into()));
}

#[test]
fn lookahead_and_negation() {
    let grammar = parse_grammar("grammar G { a : (?= b) (?! c d) ~e (f | g)+ ; }").unwrap();
    let components = &grammar.productions[0].rules[0].components;
    assert_eq!(components.len(), 4);

    assert!(matches!(&components[0].element, Element::ForwardAssertion(rules) if rules.len() == 1));
    assert!(
        matches!(&components[1].element, Element::NegativeAssertion(rules) if rules[0].components.len() == 2)
    );
    assert!(matches!(
        &components[2].element,
        Element::Negate(inner) if matches!(**inner, Element::Terminal(_))
    ));
    assert!(matches!(&components[3].element, Element::Compound(rules) if rules.len() == 2));
    assert_eq!(components[3].suffixes, [Suffix::OneOrMore]);
}

#[test]
fn comments_are_skipped() {
    let grammar = parse_grammar(
        "// leading\ngrammar G { /* block */ a : x // trailing\n ; }",
    )
    .unwrap();
    assert_eq!(grammar.productions[0].rules[0].components.len(), 1);
}

#[test]
fn spans_resolve_to_positions() {
    let src = "grammar G {\n  a : x ;\n  b : y ;\n}";
    let grammar = parse_grammar(src).unwrap();
    let b = &grammar.productions[1];
    assert_eq!(b.span.as_str(src), "b : y ;");
    let source = grammarc_runtime::Source::new(src);
    assert_eq!(
        source.position(b.span.start),
        grammarc_runtime::Position::new(3, 3)
    );
    assert_eq!(grammar.span.as_str(src), src);
}

#[test]
fn first_syntax_error_aborts() {
    let err = parse_grammar("grammar G { a : x ; b x ; }").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unexpected token at 1:23. Expected ':' found: 'x' (ident)"
    );
}

#[test]
fn invalid_escape_is_a_lexical_error() {
    let err = parse_grammar(r#"grammar G { a : "\q" ; }"#).unwrap_err();
    assert!(matches!(
        err,
        Error::Lex(grammarc_runtime::Error::Decode { .. })
    ));
}

#[test]
fn consumed_tokens_span_all_modes() {
    let (grammar, tokens) =
        grammarc::parse_grammar_with_tokens("grammar G { a : /x/ ; }").unwrap();
    assert_eq!(grammar.productions.len(), 1);

    let scanned: Vec<(&str, &str)> = tokens
        .iter()
        .map(|set| (set[0].rule(), set[0].text()))
        .collect();
    assert_eq!(
        scanned,
        [
            ("grammar", "grammar"),
            ("ident", "G"),
            ("{", "{"),
            ("ident", "a"),
            (":", ":"),
            ("/", "/"),
            ("regex_char", "x"),
            ("/", "/"),
            (";", ";"),
            ("}", "}"),
        ]
    );
}

#[test]
fn keyword_can_be_an_identifier() {
    let grammar = parse_grammar("grammar grammar { grammar : grammar ; }").unwrap();
    assert_eq!(&*grammar.name, "grammar");
    assert_eq!(&*grammar.productions[0].name, "grammar");
    let Element::Terminal(id) = grammar.productions[0].rules[0].components[0].element else {
        panic!("expected terminal");
    };
    assert_eq!(grammar.terminals[id], Terminal::Ident("grammar".into()));
}

#[test]
fn lifetimes_do_not_swallow_code_blocks() {
    let grammar = parse_grammar("grammar G { a : x { f::<'a>() } y { g::<'b>() } ; }").unwrap();
    let components = &grammar.productions[0].rules[0].components;
    assert_eq!(components.len(), 2);
    let code: Vec<_> = components
        .iter()
        .map(|component| component.postfix_code.as_ref().unwrap().text.to_string())
        .collect();
    assert_eq!(code, [" f::<'a>() ", " g::<'b>() "]);
}

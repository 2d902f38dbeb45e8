use crate::{
    grammar_parser, ActionRegistry, EarleyParser, Grammar, GrammarError, Production, Rule, Symbol,
};

fn build(gram: &Grammar) -> Result<EarleyParser, GrammarError> {
    EarleyParser::new(gram, &ActionRegistry::new())
}

#[test]
fn multiply_defined_nonterminal() {
    let g = grammar_parser::parse("%%\na -> 'x' ;\na -> 'y' ;").unwrap();
    match build(&g) {
        Err(GrammarError::MultiplyDefined(name)) => assert_eq!(name, "a"),
        other => panic!("expected multiply-defined error, got {:?}", other.err()),
    }
}

#[test]
fn undefined_nonterminal() {
    let g = grammar_parser::parse("%%\ns -> t ;").unwrap();
    match build(&g) {
        Err(GrammarError::Undefined(name)) => assert_eq!(name, "t"),
        other => panic!("expected undefined-symbol error, got {:?}", other.err()),
    }
}

#[test]
fn reserved_prefix_is_rejected() {
    let mut g = Grammar::new();
    g.add_rule(Rule::new("*sneaky").production(Production::new(vec![Symbol::lit("a")])));
    assert!(matches!(build(&g), Err(GrammarError::ReservedName(_))));
}

#[test]
fn action_count_must_cover_every_position() {
    let mut g = Grammar::new();
    let broken = Production {
        rhs: vec![Symbol::lit("a")],
        actions: vec![],
        dprec: None,
        assoc: None,
    };
    g.add_rule(Rule::new("s").production(broken));
    match build(&g) {
        Err(GrammarError::BadActions { lhs, got, want }) => {
            assert_eq!(lhs, "s");
            assert_eq!((got, want), (0, 2));
        }
        other => panic!("expected bad-actions error, got {:?}", other.err()),
    }
}

#[test]
fn epsilon_must_stand_alone() {
    let mut g = Grammar::new();
    g.add_rule(
        Rule::new("s").production(Production::new(vec![Symbol::Epsilon, Symbol::lit("a")])),
    );
    assert!(matches!(build(&g), Err(GrammarError::MalformedEpsilon(_))));
}

#[test]
fn start_symbol_needs_a_rule() {
    let mut g = grammar_parser::parse("%%\ns -> 'a' ;").unwrap();
    g.set_start("t");
    match build(&g) {
        Err(GrammarError::NoStartRule(name)) => assert_eq!(name, "t"),
        other => panic!("expected no-start-rule error, got {:?}", other.err()),
    }
}

#[test]
fn unregistered_action_name() {
    let g = grammar_parser::parse("%%\ns -> 'a' %{ nope %} ;").unwrap();
    match build(&g) {
        Err(GrammarError::UnknownAction(name)) => assert_eq!(name, "nope"),
        other => panic!("expected unknown-action error, got {:?}", other.err()),
    }
}

#[test]
fn prec_override_requires_a_declaration() {
    let g = grammar_parser::parse("%%\ne -> 'a' %prec '+' ;").unwrap();
    match build(&g) {
        Err(GrammarError::UndeclaredOperator(op)) => assert_eq!(op, "\\+"),
        other => panic!("expected undeclared-operator error, got {:?}", other.err()),
    }
}

#[test]
fn invalid_terminal_pattern() {
    let g = grammar_parser::parse("%%\ns -> /[/ ;").unwrap();
    match build(&g) {
        Err(GrammarError::BadPattern { pattern, .. }) => assert_eq!(pattern, "["),
        other => panic!("expected bad-pattern error, got {:?}", other.err()),
    }
}

#[test]
fn optional_symbols_count_as_defined() {
    let g = grammar_parser::parse("%optional num /[0-9]+/\n%%\ns -> num ;").unwrap();
    assert!(build(&g).is_ok());
}

use crate::{ActionRegistry, Ambiguity, ParseResult, Val};

use super::{arith_registry, compile, ARITH};

fn run_flags(gram_src: &str, registry: &ActionRegistry, input: &str) -> (Val, Ambiguity) {
    let parser = compile(gram_src, registry);
    let tokens = parser.tokenize(input).unwrap();
    let mut run = parser.parse_run();
    match run.feed(&tokens).unwrap() {
        ParseResult::Done(v) => (v, run.ambiguity()),
        ParseResult::Pending => panic!("incomplete input: {:?}", input),
    }
}

#[test]
fn unambiguous_input_sets_no_flags() {
    let (_, amb) = run_flags(ARITH, &arith_registry(), "1+2");
    assert_eq!(amb, Ambiguity { ambiguous: false, resolved: true });
}

#[test]
fn associativity_conflicts_do_not_count_as_ambiguity() {
    // competing derivations settled by associativity alone
    let (_, amb) = run_flags(ARITH, &arith_registry(), "1+2+3");
    assert_eq!(amb, Ambiguity { ambiguous: false, resolved: true });
}

#[test]
fn precedence_conflicts_are_resolved_ambiguity() {
    let (_, amb) = run_flags(ARITH, &arith_registry(), "1+2*3");
    assert_eq!(amb, Ambiguity { ambiguous: true, resolved: true });
}

#[test]
fn dprec_picks_the_higher_production() {
    let src = "
%%
x -> a %dprec 1 %{ via_a %}
   | b %dprec 2 %{ via_b %}
   ;
a -> 'q' ;
b -> 'q' ;
";
    let mut r = ActionRegistry::new();
    r.register("via_a", |_| Ok(Val::from("a won")));
    r.register("via_b", |_| Ok(Val::from("b won")));
    let (v, amb) = run_flags(src, &r, "q");
    assert_eq!(v, Val::from("b won"));
    assert_eq!(amb, Ambiguity { ambiguous: true, resolved: true });
}

#[test]
fn unresolvable_conflict_keeps_the_first_edge() {
    let src = "
%%
x -> a %{ via_a %}
   | b %{ via_b %}
   ;
a -> 'q' ;
b -> 'q' ;
";
    let mut r = ActionRegistry::new();
    r.register("via_a", |_| Ok(Val::from("a won")));
    r.register("via_b", |_| Ok(Val::from("b won")));
    let (v, amb) = run_flags(src, &r, "q");
    // no rule applies; the edge already in the chart survives
    assert_eq!(v, Val::from("a won"));
    assert_eq!(amb, Ambiguity { ambiguous: true, resolved: false });
}

#[test]
fn equal_dprec_is_unresolved() {
    let src = "
%%
x -> a %dprec 1 %{ via_a %}
   | b %dprec 1 %{ via_b %}
   ;
a -> 'q' ;
b -> 'q' ;
";
    let mut r = ActionRegistry::new();
    r.register("via_a", |_| Ok(Val::from("a won")));
    r.register("via_b", |_| Ok(Val::from("b won")));
    let (v, amb) = run_flags(src, &r, "q");
    assert_eq!(v, Val::from("a won"));
    assert_eq!(amb, Ambiguity { ambiguous: true, resolved: false });
}

#[test]
fn prec_override_reuses_operator_rank() {
    // unary minus borrows the tighter rank of '*' via %prec, so the
    // sub/neg conflict over "-1-2" resolves by precedence
    let src = "
%ignore /[ ]+/
%left '-'
%left '*'
%%
e -> e '-' e %{ sub %}
   | e '*' e %{ mul %}
   | '-' e %prec '*' %{ neg %}
   | /[0-9]+/
   ;
";
    let mut r = ActionRegistry::new();
    r.register("sub", |vals| Ok(Val::node("sub", [vals[0].clone(), vals[2].clone()])));
    r.register("mul", |vals| Ok(Val::node("mul", [vals[0].clone(), vals[2].clone()])));
    r.register("neg", |vals| Ok(Val::node("neg", [vals[1].clone()])));
    let (v, amb) = run_flags(src, &r, "- 1 - 2");
    assert_eq!(
        v,
        Val::node("sub", [Val::node("neg", ["1".into()]), "2".into()]),
    );
    assert_eq!(amb, Ambiguity { ambiguous: true, resolved: true });
}

#[test]
fn without_prec_override_the_operator_rank_applies() {
    // same grammar minus the %prec: neg inherits the rank of its own '-'
    // terminal, and the conflict falls to the associativity comparison
    let src = "
%ignore /[ ]+/
%left '-'
%%
e -> e '-' e %{ sub %}
   | '-' e %{ neg %}
   | /[0-9]+/
   ;
";
    let mut r = ActionRegistry::new();
    r.register("sub", |vals| Ok(Val::node("sub", [vals[0].clone(), vals[2].clone()])));
    r.register("neg", |vals| Ok(Val::node("neg", [vals[1].clone()])));
    let (v, amb) = run_flags(src, &r, "- 1 - 2");
    assert_eq!(
        v,
        Val::node("sub", [Val::node("neg", ["1".into()]), "2".into()]),
    );
    assert_eq!(amb, Ambiguity { ambiguous: false, resolved: true });
}

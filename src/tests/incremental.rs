use crate::{Error, ParseResult, Val};

use super::{arith_registry, compile, ARITH};

#[test]
fn feed_in_chunks() {
    let parser = compile(ARITH, &arith_registry());
    let tokens = parser.tokenize("1+2+3").unwrap();

    let mut run = parser.parse_run();
    // "1+" is a viable prefix but no complete expr
    assert_eq!(run.feed(&tokens[..2]).unwrap(), ParseResult::Pending);
    let v = match run.feed(&tokens[2..]).unwrap() {
        ParseResult::Done(v) => v,
        ParseResult::Pending => panic!("expected completion"),
    };

    let mut oneshot = parser.parse_run();
    match oneshot.feed(&tokens).unwrap() {
        ParseResult::Done(w) => assert_eq!(v, w),
        ParseResult::Pending => panic!("expected completion"),
    }
}

#[test]
fn completion_is_checked_at_feed_boundaries() {
    // a chunk ending on a complete expr finishes the run right there;
    // later operators never get a chance
    let parser = compile(ARITH, &arith_registry());
    let tokens = parser.tokenize("1+2").unwrap();

    let mut run = parser.parse_run();
    assert_eq!(run.feed(&tokens[..1]).unwrap(), ParseResult::Done(Val::from("1")));
}

#[test]
#[should_panic(expected = "completed parse")]
fn feed_after_done_panics() {
    let parser = compile(ARITH, &arith_registry());
    let tokens = parser.tokenize("1").unwrap();
    let mut run = parser.parse_run();
    run.feed(&tokens).unwrap();
    let _ = run.feed(&tokens);
}

#[test]
fn empty_feed_is_pending() {
    let parser = compile(ARITH, &arith_registry());
    let mut run = parser.parse_run();
    assert_eq!(run.feed(&[]).unwrap(), ParseResult::Pending);
}

#[test]
fn error_reports_earliest_dead_position() {
    let parser = compile(ARITH, &arith_registry());
    let tokens = parser.tokenize("1++2").unwrap();
    let mut run = parser.parse_run();
    match run.feed(&tokens) {
        Err(Error::Syntax(e)) => {
            assert_eq!(e.at, 2);
            assert_eq!(e.lexeme, "+");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn trailing_token_after_complete_parse_is_an_error() {
    let parser = compile(ARITH, &arith_registry());
    let tokens = parser.tokenize("1 2").unwrap();
    let mut run = parser.parse_run();
    match run.feed(&tokens) {
        Err(Error::Syntax(e)) => {
            assert_eq!(e.at, 1);
            assert_eq!(e.lexeme, "2");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn error_position_spans_chunk_boundaries() {
    let parser = compile(ARITH, &arith_registry());
    let tokens = parser.tokenize("1+*3").unwrap();
    let mut run = parser.parse_run();
    assert_eq!(run.feed(&tokens[..2]).unwrap(), ParseResult::Pending);
    match run.feed(&tokens[2..]) {
        Err(Error::Syntax(e)) => {
            assert_eq!(e.at, 2);
            assert_eq!(e.lexeme, "*");
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn independent_runs_share_one_parser() {
    let parser = compile(ARITH, &arith_registry());
    let a = parser.tokenize("1+2").unwrap();
    let b = parser.tokenize("3*4").unwrap();

    let mut run_a = parser.parse_run();
    let mut run_b = parser.parse_run();
    assert_eq!(run_a.feed(&a[..2]).unwrap(), ParseResult::Pending);
    assert_eq!(run_b.feed(&b[..2]).unwrap(), ParseResult::Pending);

    match (run_a.feed(&a[2..]).unwrap(), run_b.feed(&b[2..]).unwrap()) {
        (ParseResult::Done(va), ParseResult::Done(vb)) => {
            assert_eq!(va, Val::node("add", ["1".into(), "2".into()]));
            assert_eq!(vb, Val::node("mul", ["3".into(), "4".into()]));
        }
        other => panic!("expected two completions, got {:?}", other),
    }
}

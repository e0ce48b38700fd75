// tests/script_errors.rs
use symbios_script::{Command, Error, Grammar};

fn parse_message(script: &str) -> String {
    match Grammar::parse(script) {
        Err(Error::Parse { message, .. }) => message,
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn unknown_character_is_a_lex_error() {
    let err = Grammar::parse("lsystem A { axiom F@; }").unwrap_err();
    assert_eq!(
        err,
        Error::Lex {
            found: '@',
            line: 1,
            column: 20
        }
    );
}

#[test]
fn underscore_is_not_a_symbol() {
    let err = Grammar::parse("lsystem A { axiom F_G; }").unwrap_err();
    assert!(matches!(err, Error::Lex { found: '_', .. }));
}

#[test]
fn missing_semicolon() {
    let err = Grammar::parse("lsystem A {\n    axiom F\n}").unwrap_err();
    assert_eq!(
        err,
        Error::Parse {
            message: "expected ';', found '}'".into(),
            line: 3,
            column: 1
        }
    );
}

#[test]
fn script_must_start_with_lsystem() {
    assert!(parse_message("axiom F;").contains("'lsystem'"));
}

#[test]
fn trailing_input_is_rejected() {
    assert!(parse_message("lsystem A { axiom F; } F").contains("end of input"));
}

#[test]
fn missing_axiom() {
    assert!(parse_message("lsystem A { replace F by FF; }").contains("no axiom"));
}

#[test]
fn duplicate_axiom() {
    assert!(parse_message("lsystem A { axiom F; axiom G; }").contains("duplicate axiom"));
}

#[test]
fn unknown_command_name() {
    let message = parse_message("lsystem A { axiom F; interpret F as Fly(1); }");
    assert_eq!(message, "unknown command 'Fly'");
}

#[test]
fn too_many_command_arguments() {
    let message = parse_message("lsystem A { axiom F; interpret F as DrawLine(1, 2); }");
    assert!(message.contains("at most 1"));

    let message = parse_message("lsystem A { axiom F; interpret [ as StartBranch(1); }");
    assert!(message.contains("at most 0"));
}

#[test]
fn duplicate_interpretation() {
    let message = parse_message(
        "lsystem A {
            axiom F;
            interpret F as DrawLine(1);
            interpret G F as MoveForward(1);
        }",
    );
    assert!(message.contains("already interpreted"));
}

#[test]
fn duplicate_parameter_names() {
    let message = parse_message(
        "lsystem A {
            axiom A(1)B(2);
            replace A(x) < B(x) by B(x);
        }",
    );
    assert!(message.contains("bound twice"));
}

#[test]
fn brackets_are_not_patterns() {
    let message = parse_message("lsystem A { axiom F; replace A < [ by F; }");
    assert!(message.contains("brackets"));
}

#[test]
fn production_has_one_predecessor() {
    let message = parse_message("lsystem A { axiom F; replace AB by F; }");
    assert!(message.contains("exactly one predecessor"));
}

#[test]
fn unknown_function() {
    let message = parse_message("lsystem A { axiom F(wobble(1)); }");
    assert_eq!(message, "unknown function 'wobble'");
}

#[test]
fn redefined_constant() {
    let message = parse_message("lsystem A { let a = 1; let a = 2; axiom F; }");
    assert!(message.contains("already defined"));
}

#[test]
fn arity_conflict_between_sites() {
    let err = Grammar::parse(
        "lsystem A {
            axiom F(1);
            replace F by F;
        }",
    )
    .unwrap_err();
    assert_eq!(
        err,
        Error::Arity {
            symbol: 'F',
            expected: 1,
            found: 0
        }
    );
}

#[test]
fn arity_conflict_with_interpretation() {
    let err = Grammar::parse(
        "lsystem A {
            axiom F(1);
            interpret F as DrawLine(1);
        }",
    )
    .unwrap_err();
    assert!(matches!(err, Error::Arity { symbol: 'F', .. }));
}

#[test]
fn unbound_successor_variable() {
    let err = Grammar::parse(
        "lsystem A {
            axiom F(1);
            replace F(x) by F(y);
        }",
    )
    .unwrap_err();
    assert_eq!(err, Error::UnboundVariable { name: "y".into() });
}

#[test]
fn unbound_variable_in_let() {
    let err = Grammar::parse("lsystem A { let a = b * 2; axiom F; }").unwrap_err();
    assert_eq!(err, Error::UnboundVariable { name: "b".into() });
}

#[test]
fn let_division_by_zero() {
    let err = Grammar::parse("lsystem A { let a = 1 / 0; axiom F; }").unwrap_err();
    assert!(matches!(err, Error::Arithmetic(_)));
}

#[test]
fn lets_can_build_on_each_other() {
    let grammar = Grammar::parse(
        "lsystem A {
            let a = 2;
            let b = a ^ 3 - 1;
            axiom F(b);
        }",
    )
    .unwrap();
    assert_eq!(grammar.constants()["b"], 7.0);
    assert_eq!(grammar.axiom().to_string(), "F(7)");
}

#[test]
fn compiled_grammar_exposes_its_tables() {
    let grammar = Grammar::parse(
        "lsystem Tables {
            axiom A(1);
            replace L < A(x) > R by A(x + 1) when x < 10 : 3;
            interpret A(len) G as DrawLine(1);
        }",
    )
    .unwrap();

    assert_eq!(grammar.name(), "Tables");
    let production = &grammar.productions()[0];
    assert_eq!(production.left.len(), 1);
    assert_eq!(production.right.len(), 1);
    assert!(production.condition.is_some());
    assert!(!production.is_context_free());

    assert_eq!(grammar.arity('A'), Some(1));
    assert_eq!(grammar.arity('L'), Some(0));
    assert_eq!(
        grammar.interpretation('G').map(|r| r.command),
        Some(Command::DrawLine)
    );
    assert_eq!(grammar.interpretation('A').unwrap().pattern.params, ["len"]);
}

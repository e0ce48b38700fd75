// tests/properties.rs
use proptest::prelude::*;
use symbios_script::{
    Command, Engine, EngineConfig, Error, Grammar, InterpretationRule, RewriteConfig,
    TurtleConfig, TurtleInterpreter, Word, derive,
};

const BUSH: &str = "
lsystem Bush {
    let angle = 0.4;
    axiom X;
    replace X by F[+X][-X]FX : 2;
    replace X by F[-X]FX : 1;
    replace X by F[+X]FX : 1;
    replace F by FF;
    interpret F as DrawLine(1);
    interpret X as Ignore();
    interpret + as RotateLeft(angle);
    interpret - as RotateRight(angle);
    interpret [ as StartBranch();
    interpret ] as EndBranch();
}";

fn bush(seed: u64) -> Engine {
    Engine::compile(
        BUSH,
        EngineConfig {
            rewrite: RewriteConfig {
                iterations: 4,
                seed,
                ..Default::default()
            },
            ..Default::default()
        },
    )
    .unwrap()
}

/// Words whose brackets are balanced and properly nested.
fn balanced_word() -> impl Strategy<Value = String> {
    let leaf = prop::sample::select(vec!["F", "+", "-", "FF", "+F"]).prop_map(String::from);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(|parts| parts.concat()),
            inner.prop_map(|s| format!("[{s}]")),
        ]
    })
}

fn standard_turtle() -> TurtleInterpreter {
    let mut interpreter = TurtleInterpreter::new(TurtleConfig::default());
    interpreter.set_rule(InterpretationRule::constant('F', Command::DrawLine, &[]));
    interpreter.populate_standard_symbols();
    interpreter
}

proptest! {
    #[test]
    fn derivation_is_deterministic_per_seed(seed in any::<u64>()) {
        let first = bush(seed);
        let second = bush(seed);

        prop_assert_eq!(first.derive().unwrap(), second.derive().unwrap());
        prop_assert_eq!(first.render().unwrap(), second.render().unwrap());
    }

    #[test]
    fn unmatched_symbols_are_copied_verbatim(axiom in "[XYZ+\\-]{1,24}") {
        let script = format!(
            "lsystem Copy {{
                axiom {axiom};
                replace F by FF;
            }}"
        );
        let grammar = Grammar::parse(&script).unwrap();
        let config = RewriteConfig { iterations: 3, ..Default::default() };
        prop_assert_eq!(derive(&grammar, &config).unwrap().to_string(), axiom);
    }

    #[test]
    fn balanced_words_leave_an_empty_stack(word in balanced_word()) {
        let interpreter = standard_turtle();
        let geometry = interpreter.interpret(&Word::from_symbols(&word)).unwrap();
        prop_assert_eq!(geometry.vertices.len(), word.matches('F').count());
    }

    #[test]
    fn an_extra_close_underflows(word in balanced_word()) {
        let interpreter = standard_turtle();
        let extra = format!("{word}]");
        prop_assert_eq!(
            interpreter.interpret(&Word::from_symbols(&extra)),
            Err(Error::StackUnderflow { position: word.chars().count() })
        );
    }

    #[test]
    fn branches_restore_the_turtle(prefix in "[F+\\-]{0,6}", body in balanced_word()) {
        // A closed branch never moves the turtle that continues after it.
        let interpreter = standard_turtle();
        let with_branch = format!("{prefix}[{body}]F");
        let without = format!("{prefix}F");

        let a = interpreter.interpret(&Word::from_symbols(&with_branch)).unwrap();
        let b = interpreter.interpret(&Word::from_symbols(&without)).unwrap();
        let last_a = a.vertices.last().unwrap().position;
        let last_b = b.vertices.last().unwrap().position;
        prop_assert!(last_a.abs_diff_eq(last_b, 1e-4));
    }
}

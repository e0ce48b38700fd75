// tests/scenarios.rs
use glam::Vec3;
use symbios_script::{
    AngleUnit, EngineConfig, Engine, Grammar, RewriteConfig, TurtleConfig, TurtleInterpreter,
    derive,
};

fn derive_word(script: &str, iterations: usize) -> String {
    let grammar = Grammar::parse(script).unwrap();
    let config = RewriteConfig {
        iterations,
        ..Default::default()
    };
    derive(&grammar, &config).unwrap().to_string()
}

fn degrees() -> TurtleConfig {
    TurtleConfig {
        angle_unit: AngleUnit::Degrees,
        ..Default::default()
    }
}

fn assert_close(actual: Vec3, expected: Vec3) {
    assert!(
        actual.abs_diff_eq(expected, 1e-4),
        "expected {expected:?}, got {actual:?}"
    );
}

const KOCH: &str = "
lsystem Koch {
    axiom F;
    replace F by F+F-F-F+F;
    interpret F as DrawLine(1);
    interpret + as RotateRight(90);
    interpret - as RotateLeft(90);
}";

#[test]
fn koch_curve_first_generation() {
    let grammar = Grammar::parse(KOCH).unwrap();
    let word = derive(
        &grammar,
        &RewriteConfig {
            iterations: 1,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(word.to_string(), "F+F-F-F+F");
    assert_eq!(word.len(), 9);
}

#[test]
fn koch_curve_third_generation() {
    let word = derive_word(KOCH, 3);
    assert_eq!(word.len(), 249);
    assert!(word.starts_with("F+F-F-F+F+F+F-F-F+F-F+F-F-F+F"));
    assert_eq!(word.matches('F').count(), 125);
}

#[test]
fn koch_curve_turtle_path() {
    let engine = Engine::compile(
        KOCH,
        EngineConfig {
            turtle: degrees(),
            ..Default::default()
        },
    )
    .unwrap();
    let geometry = engine.render().unwrap();

    // Start heading +Y: up, right, up, left, up.
    let expected = [
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(1.0, 2.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        Vec3::new(0.0, 3.0, 0.0),
    ];
    assert_eq!(geometry.vertices.len(), expected.len());
    for (vertex, expected) in geometry.vertices.iter().zip(expected) {
        assert_close(vertex.position, expected);
        assert!(!vertex.leaf);
    }
}

#[test]
fn fractal_binary_tree_unparameterized() {
    let script = "
    lsystem Binary {
        axiom A;
        replace A by ABA;
        replace B by BBB;
    }";

    assert_eq!(derive_word(script, 1), "ABA");
    assert_eq!(derive_word(script, 2), "ABABBBABA");
}

#[test]
fn sierpinski_triangle() {
    let script = "
    lsystem Sierpinski {
        axiom F-G-G;
        replace F by F-G+F+G-F;
        replace G by GG;
    }";

    assert_eq!(derive_word(script, 1), "F-G+F+G-F-GG-GG");
    assert_eq!(
        derive_word(script, 2),
        "F-G+F+G-F-GG+F-G+F+G-F+GG-F-G+F+G-F-GGGG-GGGG"
    );
}

#[test]
fn algae() {
    let script = "
    lsystem Algae {
        axiom A;
        replace A by AB;
        replace B by A;
    }";

    assert_eq!(derive_word(script, 7), "ABAABABAABAABABAABABAABAABABAABAAB");
}

#[test]
fn dragon_curve() {
    let script = "
    lsystem Dragon {
        axiom F;
        replace F by F+G;
        replace G by F-G;
    }";

    assert_eq!(derive_word(script, 3), "F+G+F-G+F+G-F-G");
}

#[test]
fn fractal_plant() {
    let script = "
    lsystem Plant {
        axiom X;
        replace X by F+[[X]-X]-F[-FX]+X;
        replace F by FF;
    }";

    let word = derive_word(script, 2);
    assert_eq!(
        word,
        "FF+[[F+[[X]-X]-F[-FX]+X]-F+[[X]-X]-F[-FX]+X]-FF[-FFF+[[X]-X]-F[-FX]+X]+F+[[X]-X]-F[-FX]+X"
    );
    assert_eq!(word.len(), 89);
}

const TREE: &str = "
lsystem Tree {
    axiom 0;
    replace 1 by 11;
    replace 0 by 1[0]0;
    interpret 1 as DrawLine(1);
    interpret 0 as DrawLeaf(0.5);
    interpret [ as StartBranch();
    interpret ] as EndBranch();
}";

#[test]
fn bracketed_tree_words() {
    assert_eq!(derive_word(TREE, 1), "1[0]0");
    assert_eq!(derive_word(TREE, 3), "1111[11[1[0]0]1[0]0]11[1[0]0]1[0]0");
}

#[test]
fn bracketed_tree_turtle_restores_branch_state() {
    let grammar = Grammar::parse(TREE).unwrap();
    let word = derive(&grammar, &RewriteConfig::default()).unwrap();
    let geometry = TurtleInterpreter::from_grammar(&grammar, TurtleConfig::default())
        .interpret(&word)
        .unwrap();

    let records = geometry.vertex_records();
    assert_eq!(
        records,
        vec![
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 1.5, 0.0, 1.0],
            // Restored to (0, 1) with the pre-branch heading before the trailing leaf.
            [0.0, 1.5, 0.0, 1.0],
        ]
    );
}

#[test]
fn branch_rotation_does_not_leak_past_the_branch() {
    let script = "
    lsystem Fork {
        axiom F[+F]F;
        interpret F as DrawLine(1);
        interpret + as RotateLeft(90);
        interpret [ as StartBranch();
        interpret ] as EndBranch();
    }";
    let engine = Engine::compile(
        script,
        EngineConfig {
            rewrite: RewriteConfig {
                iterations: 0,
                ..Default::default()
            },
            turtle: degrees(),
            ..Default::default()
        },
    )
    .unwrap();

    let geometry = engine.render().unwrap();
    let positions: Vec<Vec3> = geometry.vertices.iter().map(|v| v.position).collect();
    assert_eq!(positions.len(), 3);
    assert_close(positions[0], Vec3::new(0.0, 1.0, 0.0));
    assert_close(positions[1], Vec3::new(-1.0, 1.0, 0.0));
    assert_close(positions[2], Vec3::new(0.0, 2.0, 0.0));
}

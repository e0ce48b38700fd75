//! Interpreter that converts a derived [`Word`] into [`Geometry`].
//!
//! The entry point is [`TurtleInterpreter`]. Build it from a compiled
//! [`Grammar`] with [`TurtleInterpreter::from_grammar`], optionally register
//! extra symbols via [`TurtleInterpreter::set_rule`] or
//! [`TurtleInterpreter::populate_standard_symbols`], then call
//! [`TurtleInterpreter::interpret`].

use crate::error::{Error, Result};
use crate::expr::{Constants, Scope};
use crate::geometry::{Geometry, Polygon};
use crate::grammar::{Grammar, InterpretationRule};
use crate::turtle::{Command, DEFAULT_MAX_STACK_DEPTH, TurtleStack, TurtleState};
use crate::word::Word;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::PI;

/// How rotation magnitudes written in scripts are to be read.
///
/// The unit is declared by the caller; it is never inferred from the values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

/// Configuration for turtle interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurtleConfig {
    /// Step length for motion commands written without an argument.
    pub default_length: f32,
    /// Rotation for rotation commands written without an argument, in `angle_unit`.
    pub default_angle: f32,
    /// Unit of every rotation magnitude, script arguments included.
    pub angle_unit: AngleUnit,
    /// Maximum number of simultaneously open branches.
    pub max_stack_depth: usize,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            default_length: 1.0,
            default_angle: 45.0f32.to_radians(),
            angle_unit: AngleUnit::Radians,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
        }
    }
}

/// Interprets derived words as turtle motion.
#[derive(Clone, Debug)]
pub struct TurtleInterpreter {
    rules: HashMap<char, InterpretationRule>,
    constants: Constants,
    config: TurtleConfig,
}

impl TurtleInterpreter {
    /// Creates an interpreter with the given configuration and an empty symbol table.
    pub fn new(config: TurtleConfig) -> Self {
        Self {
            rules: HashMap::new(),
            constants: Constants::new(),
            config,
        }
    }

    /// Creates an interpreter using the grammar's `interpret` table and `let` constants.
    pub fn from_grammar(grammar: &Grammar, config: TurtleConfig) -> Self {
        Self {
            rules: grammar.interpretations().clone(),
            constants: grammar.constants().clone(),
            config,
        }
    }

    /// Assigns a rule to its pattern's symbol, replacing any previous one.
    pub fn set_rule(&mut self, rule: InterpretationRule) {
        self.rules.insert(rule.pattern.symbol, rule);
    }

    /// Registers the conventional meaning of the structural glyphs for every
    /// glyph that has no rule yet.
    ///
    /// | Symbol | Command                   |
    /// |--------|---------------------------|
    /// | `+`    | `RotateLeft`              |
    /// | `-`    | `RotateRight`             |
    /// | `^`    | `Pitch` (up)              |
    /// | `&`    | `Pitch` (down)            |
    /// | `\`    | `Roll`                    |
    /// | `/`    | `Roll` (opposite sense)   |
    /// | `\|`   | `TurnAround`              |
    /// | `[`    | `StartBranch`             |
    /// | `]`    | `EndBranch`               |
    pub fn populate_standard_symbols(&mut self) {
        let angle = self.config.default_angle as f64;
        let mappings = [
            ('+', Command::RotateLeft, None),
            ('-', Command::RotateRight, None),
            ('^', Command::Pitch, None),
            ('&', Command::Pitch, Some(-angle)),
            ('\\', Command::Roll, None),
            ('/', Command::Roll, Some(-angle)),
            ('|', Command::TurnAround, None),
            ('[', Command::StartBranch, None),
            (']', Command::EndBranch, None),
        ];

        for (symbol, command, arg) in mappings {
            let args: Vec<f64> = arg.into_iter().collect();
            self.rules
                .entry(symbol)
                .or_insert_with(|| InterpretationRule::constant(symbol, command, &args));
        }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Walks `word` once and returns the emitted geometry.
    ///
    /// The turtle starts at the origin with the canonical orientation
    /// (forward `+Y`, up `+Z`, right `+X`). Each module is dispatched through its
    /// interpretation rule; an unmapped symbol is an [`Error::UnknownSymbol`].
    ///
    /// # Branches
    ///
    /// `PushStack`/`StartBranch` save a copy of the turtle, `PopStack`/`EndBranch`
    /// restore it. Closing with nothing open is [`Error::StackUnderflow`]; branches
    /// still open after the last module are [`Error::UnbalancedStack`].
    ///
    /// # Polygons
    ///
    /// `StartPolygon` opens an accumulator (they nest), `RecordPolygonVertex`
    /// appends the turtle position to the innermost one, `EndPolygon` closes it
    /// into [`Geometry::polygons`].
    pub fn interpret(&self, word: &Word) -> Result<Geometry> {
        let mut geometry = Geometry::new();
        let mut turtle = TurtleState::default();
        let mut stack = TurtleStack::new(self.config.max_stack_depth);
        // Open polygons with the index of the module that started them.
        let mut polygons: Vec<(usize, Polygon)> = Vec::new();

        for (i, module) in word.iter().enumerate() {
            let rule = self.rules.get(&module.symbol).ok_or(Error::UnknownSymbol {
                symbol: module.symbol,
                position: i,
            })?;

            if rule.pattern.params.len() != module.params.len() {
                return Err(Error::Arity {
                    symbol: module.symbol,
                    expected: rule.pattern.params.len(),
                    found: module.params.len(),
                });
            }
            let bindings: Vec<(&str, f64)> = rule
                .pattern
                .params
                .iter()
                .map(String::as_str)
                .zip(module.params.iter().copied())
                .collect();
            let scope = Scope::new(&self.constants, &bindings);

            match rule.command {
                // --- MOTION ---
                Command::MoveForward | Command::DrawLine | Command::DrawLeaf => {
                    let distance = self.magnitude(rule, &scope, self.config.default_length)?;
                    turtle.advance(distance);
                    geometry.add_vertex(turtle.position, rule.command == Command::DrawLeaf);
                }

                // --- ROTATION ---
                Command::Yaw | Command::RotateLeft => turtle.yaw(self.angle(rule, &scope)?),
                Command::RotateRight => turtle.yaw(-self.angle(rule, &scope)?),
                Command::Pitch => turtle.pitch(self.angle(rule, &scope)?),
                Command::Roll => turtle.roll(self.angle(rule, &scope)?),
                Command::TurnAround => turtle.yaw(PI),

                // --- BRANCHES ---
                Command::PushStack | Command::StartBranch => stack.push(turtle, i)?,
                Command::PopStack | Command::EndBranch => turtle = stack.pop(i)?,

                // --- POLYGONS ---
                Command::StartPolygon => polygons.push((i, Polygon::default())),
                Command::RecordPolygonVertex => match polygons.last_mut() {
                    Some((_, polygon)) => polygon.vertices.push(turtle.position),
                    None => {
                        return Err(Error::PolygonState {
                            command: Command::RecordPolygonVertex.name(),
                            position: i,
                            reason: "no polygon is open",
                        });
                    }
                },
                Command::EndPolygon => match polygons.pop() {
                    Some((_, polygon)) => geometry.add_polygon(polygon),
                    None => {
                        return Err(Error::PolygonState {
                            command: Command::EndPolygon.name(),
                            position: i,
                            reason: "no polygon is open",
                        });
                    }
                },

                Command::Ignore => {}
            }
        }

        if !stack.is_empty() {
            return Err(Error::UnbalancedStack {
                depth: stack.depth(),
            });
        }
        if let Some((position, _)) = polygons.first() {
            return Err(Error::PolygonState {
                command: Command::StartPolygon.name(),
                position: *position,
                reason: "polygon is never closed",
            });
        }

        tracing::debug!(
            modules = word.len(),
            vertices = geometry.vertices.len(),
            polygons = geometry.polygons.len(),
            "interpreted word"
        );
        Ok(geometry)
    }

    /// The rule's single argument, or `default` when it has none.
    fn magnitude(
        &self,
        rule: &InterpretationRule,
        scope: &Scope<'_>,
        default: f32,
    ) -> Result<f32> {
        match rule.args.first() {
            Some(expr) => Ok(expr.eval(scope)? as f32),
            None => Ok(default),
        }
    }

    /// A rotation magnitude converted to radians.
    fn angle(&self, rule: &InterpretationRule, scope: &Scope<'_>) -> Result<f32> {
        let value = self.magnitude(rule, scope, self.config.default_angle)?;
        Ok(match self.config.angle_unit {
            AngleUnit::Radians => value,
            AngleUnit::Degrees => value.to_radians(),
        })
    }
}

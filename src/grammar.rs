//! The compiled grammar: alphabet arities, constants, axiom, productions and
//! the interpretation table.
//!
//! [`Grammar::parse`] runs the whole front end (lex, parse, semantic checks).
//! The result is immutable; the rewriter and the turtle interpreter only borrow it.

use crate::error::{Error, Result};
use crate::expr::{Constants, Expr, Scope};
use crate::lexer::{Span, tokenize};
use crate::parser::{Script, Statement, parse_script};
use crate::turtle::Command;
use crate::word::{Module, Word};
use std::collections::{HashMap, HashSet};

/// A symbol plus the parameter names it binds when matched.
#[derive(Clone, Debug, PartialEq)]
pub struct ModulePattern {
    pub symbol: char,
    pub params: Vec<String>,
    pub span: Span,
}

/// A symbol plus the expressions producing its parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ModuleTemplate {
    pub symbol: char,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// One `replace` rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Production {
    /// Left context, in word order (nearest neighbour last).
    pub left: Vec<ModulePattern>,
    pub predecessor: ModulePattern,
    /// Right context, in word order (nearest neighbour first).
    pub right: Vec<ModulePattern>,
    pub condition: Option<Expr>,
    pub weight: Expr,
    pub successor: Vec<ModuleTemplate>,
    pub span: Span,
}

impl Production {
    /// All patterns of the rule, contexts included.
    pub fn patterns(&self) -> impl Iterator<Item = &ModulePattern> {
        self.left
            .iter()
            .chain(std::iter::once(&self.predecessor))
            .chain(self.right.iter())
    }

    pub fn is_context_free(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }
}

/// One symbol's entry in the interpretation table.
#[derive(Clone, Debug, PartialEq)]
pub struct InterpretationRule {
    pub pattern: ModulePattern,
    pub command: Command,
    pub args: Vec<Expr>,
}

impl InterpretationRule {
    /// Builds a rule for a parameterless symbol with constant arguments.
    pub fn constant(symbol: char, command: Command, args: &[f64]) -> Self {
        Self {
            pattern: ModulePattern {
                symbol,
                params: Vec::new(),
                span: Span::default(),
            },
            command,
            args: args.iter().copied().map(Expr::Number).collect(),
        }
    }
}

/// An immutable, validated L-System.
#[derive(Clone, Debug)]
pub struct Grammar {
    name: String,
    constants: Constants,
    axiom: Word,
    productions: Vec<Production>,
    interpretations: HashMap<char, InterpretationRule>,
    ignored: HashSet<char>,
    arities: HashMap<char, usize>,
}

impl Grammar {
    /// Compiles script source text into a grammar.
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        let script = parse_script(&tokens)?;
        Self::compile(script)
    }

    /// Runs the semantic checks on a parsed script.
    pub fn compile(script: Script) -> Result<Self> {
        let mut constants = Constants::new();
        let mut axiom: Option<(Vec<ModuleTemplate>, Span)> = None;
        let mut productions = Vec::new();
        let mut interpretations: HashMap<char, InterpretationRule> = HashMap::new();
        let mut ignored = HashSet::new();

        for statement in script.statements {
            match statement {
                Statement::Let { name, value, span } => {
                    if constants.contains_key(&name) {
                        return Err(Error::parse(format!("'{name}' is already defined"), span));
                    }
                    let v = value.eval(&Scope::constants_only(&constants))?;
                    constants.insert(name, v);
                }
                Statement::Axiom { modules, span } => {
                    if axiom.is_some() {
                        return Err(Error::parse("duplicate axiom", span));
                    }
                    axiom = Some((modules, span));
                }
                Statement::Ignore { symbols } => ignored.extend(symbols),
                Statement::Replace(production) => {
                    check_unique_params(production.patterns(), production.span)?;
                    productions.push(production);
                }
                Statement::Interpret {
                    patterns,
                    command,
                    args,
                } => {
                    for pattern in patterns {
                        check_unique_params(std::iter::once(&pattern), pattern.span)?;
                        if interpretations.contains_key(&pattern.symbol) {
                            return Err(Error::parse(
                                format!("symbol '{}' is already interpreted", pattern.symbol),
                                pattern.span,
                            ));
                        }
                        interpretations.insert(
                            pattern.symbol,
                            InterpretationRule {
                                pattern,
                                command,
                                args: args.clone(),
                            },
                        );
                    }
                }
            }
        }

        let Some((axiom_templates, _)) = axiom else {
            return Err(Error::parse(
                format!("lsystem '{}' has no axiom", script.name),
                script.span,
            ));
        };

        let scope = Scope::constants_only(&constants);
        let axiom = axiom_templates
            .iter()
            .map(|t| -> Result<Module> {
                let params = t
                    .args
                    .iter()
                    .map(|a| a.eval(&scope))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Module::new(t.symbol, params))
            })
            .collect::<Result<Word>>()?;

        let mut arities = Arities::default();
        for t in &axiom_templates {
            arities.declare(t.symbol, t.args.len())?;
        }
        for p in &productions {
            for pattern in p.patterns() {
                arities.declare(pattern.symbol, pattern.params.len())?;
            }
            for t in &p.successor {
                arities.declare(t.symbol, t.args.len())?;
            }
            check_bound(
                p.patterns(),
                &constants,
                p.condition
                    .iter()
                    .chain(std::iter::once(&p.weight))
                    .chain(p.successor.iter().flat_map(|t| t.args.iter())),
            )?;
        }
        // Sorted so that the first conflict reported does not depend on hash order.
        let mut rules: Vec<&InterpretationRule> = interpretations.values().collect();
        rules.sort_by_key(|r| (r.pattern.span.line, r.pattern.span.column));
        for rule in rules {
            arities.declare(rule.pattern.symbol, rule.pattern.params.len())?;
            check_bound(std::iter::once(&rule.pattern), &constants, rule.args.iter())?;
        }

        tracing::debug!(
            name = %script.name,
            productions = productions.len(),
            interpretations = interpretations.len(),
            axiom = %axiom,
            "compiled lsystem"
        );

        Ok(Self {
            name: script.name,
            constants,
            axiom,
            productions,
            interpretations,
            ignored,
            arities: arities.0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn axiom(&self) -> &Word {
        &self.axiom
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn interpretations(&self) -> &HashMap<char, InterpretationRule> {
        &self.interpretations
    }

    pub fn interpretation(&self, symbol: char) -> Option<&InterpretationRule> {
        self.interpretations.get(&symbol)
    }

    /// Whether context matching skips over `symbol`.
    pub fn is_ignored(&self, symbol: char) -> bool {
        self.ignored.contains(&symbol)
    }

    /// The parameter count declared for `symbol`, if the script mentions it.
    pub fn arity(&self, symbol: char) -> Option<usize> {
        self.arities.get(&symbol).copied()
    }
}

#[derive(Default)]
struct Arities(HashMap<char, usize>);

impl Arities {
    fn declare(&mut self, symbol: char, found: usize) -> Result<()> {
        match self.0.get(&symbol) {
            Some(&expected) if expected != found => Err(Error::Arity {
                symbol,
                expected,
                found,
            }),
            _ => {
                self.0.insert(symbol, found);
                Ok(())
            }
        }
    }
}

fn check_unique_params<'a>(
    patterns: impl Iterator<Item = &'a ModulePattern>,
    span: Span,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in patterns.flat_map(|p| p.params.iter()) {
        if !seen.insert(name.as_str()) {
            return Err(Error::parse(format!("parameter '{name}' bound twice"), span));
        }
    }
    Ok(())
}

/// Every variable used by `exprs` must be a pattern parameter or a constant.
fn check_bound<'a>(
    patterns: impl Iterator<Item = &'a ModulePattern>,
    constants: &Constants,
    exprs: impl Iterator<Item = &'a Expr>,
) -> Result<()> {
    let bound: HashSet<&str> = patterns
        .flat_map(|p| p.params.iter().map(String::as_str))
        .collect();
    let mut unbound = None;
    for expr in exprs {
        expr.visit_variables(&mut |name| {
            if unbound.is_none() && !bound.contains(name) && !constants.contains_key(name) {
                unbound = Some(name.to_string());
            }
        });
    }
    match unbound {
        Some(name) => Err(Error::UnboundVariable { name }),
        None => Ok(()),
    }
}

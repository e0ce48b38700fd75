//! Parallel rewriting of words, one generation at a time.
//!
//! For every module the rewriter collects the productions whose predecessor,
//! contexts and condition match. No candidate means the module is copied
//! unchanged, one candidate is applied directly (its weight must still be
//! non-negative), and several candidates are resolved by a weighted draw from
//! the caller's random source.
//!
//! Context search is bracket aware: looking left, a complete `[...]` subtree
//! is skipped and an opening `[` is stepped over, so a branch sees its parent;
//! looking right, a `[...]` subtree is skipped and a `]` ends the search.

use crate::error::{Error, Result};
use crate::expr::Scope;
use crate::grammar::{Grammar, ModulePattern, Production};
use crate::word::{Module, Word};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Seed used when the caller does not supply one.
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE_F00D_0001;

/// Caller-side configuration of a derivation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Number of generations to derive from the axiom.
    pub iterations: usize,
    /// Seed of the random source used for stochastic productions.
    pub seed: u64,
    /// Upper bound on the length of any generated word.
    pub max_modules: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            seed: DEFAULT_SEED,
            max_modules: 1 << 22,
        }
    }
}

type Bindings<'g> = Vec<(&'g str, f64)>;

/// Applies a grammar's productions to words.
#[derive(Clone, Copy, Debug)]
pub struct Rewriter<'g> {
    grammar: &'g Grammar,
    max_modules: usize,
}

impl<'g> Rewriter<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            max_modules: RewriteConfig::default().max_modules,
        }
    }

    /// Sets the growth guard (builder pattern).
    pub fn with_max_modules(mut self, max_modules: usize) -> Self {
        self.max_modules = max_modules;
        self
    }

    /// Derives `iterations` generations starting from the axiom.
    pub fn derive<R: Rng + ?Sized>(&self, iterations: usize, rng: &mut R) -> Result<Word> {
        let mut word = self.grammar.axiom().clone();
        for generation in 1..=iterations {
            word = self.step(&word, rng)?;
            tracing::debug!(generation, modules = word.len(), "derived generation");
        }
        Ok(word)
    }

    /// Rewrites every module of `word` once, producing the next generation.
    pub fn step<R: Rng + ?Sized>(&self, word: &Word, rng: &mut R) -> Result<Word> {
        let modules = word.modules();
        let mut next = Vec::with_capacity(modules.len());
        let mut candidates: Vec<(&'g Production, Bindings<'g>)> = Vec::new();

        for (i, module) in modules.iter().enumerate() {
            candidates.clear();

            for production in self.grammar.productions() {
                if production.predecessor.symbol != module.symbol {
                    continue;
                }
                if let Some(bindings) = self.match_production(production, modules, i)? {
                    candidates.push((production, bindings));
                }
            }

            match candidates.len() {
                0 => next.push(module.clone()),
                1 => {
                    let (production, bindings) = &candidates[0];
                    self.weight(module.symbol, production, bindings)?;
                    self.apply(production, bindings, &mut next)?;
                }
                _ => {
                    let chosen = self.choose(module.symbol, &candidates, rng)?;
                    let (production, bindings) = &candidates[chosen];
                    self.apply(production, bindings, &mut next)?;
                }
            }

            if next.len() > self.max_modules {
                return Err(Error::GrowthLimit {
                    len: next.len(),
                    max: self.max_modules,
                });
            }
        }

        Ok(Word::new(next))
    }

    /// Binds the predecessor and contexts of `production` at position `i` and
    /// checks its condition. `None` means the production does not apply.
    fn match_production(
        &self,
        production: &'g Production,
        modules: &[Module],
        i: usize,
    ) -> Result<Option<Bindings<'g>>> {
        let mut bindings = Bindings::new();
        bind(&production.predecessor, &modules[i], &mut bindings)?;

        if !production.left.is_empty()
            && !self.left_context(production, modules, i, &mut bindings)?
        {
            return Ok(None);
        }
        if !production.right.is_empty()
            && !self.right_context(production, modules, i, &mut bindings)?
        {
            return Ok(None);
        }

        if let Some(condition) = &production.condition {
            let scope = Scope::new(self.grammar.constants(), &bindings);
            if condition.eval(&scope)? == 0.0 {
                return Ok(None);
            }
        }
        Ok(Some(bindings))
    }

    fn left_context(
        &self,
        production: &'g Production,
        modules: &[Module],
        i: usize,
        bindings: &mut Bindings<'g>,
    ) -> Result<bool> {
        let mut j = i;
        for pattern in production.left.iter().rev() {
            let found = loop {
                if j == 0 {
                    return Ok(false);
                }
                j -= 1;
                match modules[j].symbol {
                    ']' => {
                        let mut depth = 1;
                        while depth > 0 {
                            if j == 0 {
                                return Ok(false);
                            }
                            j -= 1;
                            match modules[j].symbol {
                                ']' => depth += 1,
                                '[' => depth -= 1,
                                _ => {}
                            }
                        }
                    }
                    '[' => {}
                    s if self.grammar.is_ignored(s) => {}
                    _ => break &modules[j],
                }
            };
            if found.symbol != pattern.symbol {
                return Ok(false);
            }
            bind(pattern, found, bindings)?;
        }
        Ok(true)
    }

    fn right_context(
        &self,
        production: &'g Production,
        modules: &[Module],
        i: usize,
        bindings: &mut Bindings<'g>,
    ) -> Result<bool> {
        let mut j = i + 1;
        for pattern in &production.right {
            let found = loop {
                let Some(module) = modules.get(j) else {
                    return Ok(false);
                };
                j += 1;
                match module.symbol {
                    '[' => {
                        let mut depth = 1;
                        while depth > 0 {
                            let Some(inner) = modules.get(j) else {
                                return Ok(false);
                            };
                            j += 1;
                            match inner.symbol {
                                '[' => depth += 1,
                                ']' => depth -= 1,
                                _ => {}
                            }
                        }
                    }
                    ']' => return Ok(false),
                    s if self.grammar.is_ignored(s) => {}
                    _ => break module,
                }
            };
            if found.symbol != pattern.symbol {
                return Ok(false);
            }
            bind(pattern, found, bindings)?;
        }
        Ok(true)
    }

    fn choose<R: Rng + ?Sized>(
        &self,
        symbol: char,
        candidates: &[(&'g Production, Bindings<'g>)],
        rng: &mut R,
    ) -> Result<usize> {
        let weights = candidates
            .iter()
            .map(|(production, bindings)| self.weight(symbol, production, bindings))
            .collect::<Result<Vec<f64>>>()?;
        let sampler = WeightedIndex::new(&weights).map_err(|e| Error::InvalidWeights {
            symbol,
            reason: e.to_string(),
        })?;

        let chosen = sampler.sample(rng);
        tracing::trace!(%symbol, ?weights, chosen, "stochastic production draw");
        Ok(chosen)
    }

    /// Evaluates a candidate's weight; negative weights are rejected.
    fn weight(
        &self,
        symbol: char,
        production: &Production,
        bindings: &Bindings<'g>,
    ) -> Result<f64> {
        let w = production
            .weight
            .eval(&Scope::new(self.grammar.constants(), bindings))?;
        if w < 0.0 {
            return Err(Error::InvalidWeights {
                symbol,
                reason: format!("negative weight {w}"),
            });
        }
        Ok(w)
    }

    fn apply(
        &self,
        production: &Production,
        bindings: &Bindings<'g>,
        next: &mut Vec<Module>,
    ) -> Result<()> {
        let scope = Scope::new(self.grammar.constants(), bindings);
        for template in &production.successor {
            let params = template
                .args
                .iter()
                .map(|a| a.eval(&scope))
                .collect::<Result<Vec<_>>>()?;
            next.push(Module::new(template.symbol, params));
        }
        Ok(())
    }
}

fn bind<'g>(
    pattern: &'g ModulePattern,
    module: &Module,
    bindings: &mut Bindings<'g>,
) -> Result<()> {
    if pattern.params.len() != module.params.len() {
        return Err(Error::Arity {
            symbol: module.symbol,
            expected: pattern.params.len(),
            found: module.params.len(),
        });
    }
    bindings.extend(
        pattern
            .params
            .iter()
            .map(String::as_str)
            .zip(module.params.iter().copied()),
    );
    Ok(())
}

/// Derives the word described by `config` with a freshly seeded random source.
pub fn derive(grammar: &Grammar, config: &RewriteConfig) -> Result<Word> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    Rewriter::new(grammar)
        .with_max_modules(config.max_modules)
        .derive(config.iterations, &mut rng)
}

/// Iterator over successive generations, starting after the axiom.
///
/// Stops after the first error.
pub struct Derivation<'g> {
    rewriter: Rewriter<'g>,
    rng: StdRng,
    current: Word,
    failed: bool,
}

impl<'g> Derivation<'g> {
    pub fn new(grammar: &'g Grammar, seed: u64) -> Self {
        Self {
            rewriter: Rewriter::new(grammar),
            rng: StdRng::seed_from_u64(seed),
            current: grammar.axiom().clone(),
            failed: false,
        }
    }
}

impl Iterator for Derivation<'_> {
    type Item = Result<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.rewriter.step(&self.current, &mut self.rng) {
            Ok(word) => {
                self.current = word.clone();
                Some(Ok(word))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

//! Built-in iteration plugins.
//!
//! Termination criteria and observers that run after every generation:
//!
//! - [`MaxGenerations`]: fixed generation budget
//! - [`TimeLimit`]: wall-clock budget
//! - [`Cancellation`]: external stop flag
//! - [`Stagnation`]: no improvement of a phenotype score for N generations
//! - [`GenerationLogger`]: progress logging

use super::plugins::{IterControl, IterPlugin};
use super::runner::Ga;
use super::types::{Gene, Phenotype};
use crate::error::{GaError, Result};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stops once the population reaches a generation count.
#[derive(Debug, Clone)]
pub struct MaxGenerations {
    max: u64,
}

impl MaxGenerations {
    pub fn new(max: u64) -> Self {
        Self { max }
    }
}

impl<G: Gene, P: Clone + Send + 'static> IterPlugin<G, P> for MaxGenerations {
    fn on_generation(&mut self, ga: &Ga<G, P>) -> Result<IterControl> {
        Ok(if ga.generation() >= self.max {
            IterControl::Stop
        } else {
            IterControl::Continue
        })
    }

    fn name(&self) -> &str {
        "max_generations"
    }
}

/// Stops once a wall-clock budget is spent.
///
/// The clock starts when the population is set up, so the first generation
/// counts against the budget, and clears on [`Ga::reset`]. The check runs
/// between generations, so a run may overshoot by one generation's worth of
/// work.
#[derive(Debug, Clone)]
pub struct TimeLimit {
    limit: Duration,
    started: Option<Instant>,
}

impl TimeLimit {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            started: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl<G: Gene, P: Clone + Send + 'static> IterPlugin<G, P> for TimeLimit {
    fn on_generation(&mut self, _ga: &Ga<G, P>) -> Result<IterControl> {
        let started = *self.started.get_or_insert_with(Instant::now);
        Ok(if started.elapsed() >= self.limit {
            IterControl::Stop
        } else {
            IterControl::Continue
        })
    }

    fn name(&self) -> &str {
        "time_limit"
    }

    fn on_setup(&mut self) {
        self.started = Some(Instant::now());
    }

    fn reset(&mut self) {
        self.started = None;
    }
}

/// Stops when an external flag is raised.
///
/// The flag may be set from another thread; it is checked once per
/// generation.
#[derive(Debug, Clone)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl<G: Gene, P: Clone + Send + 'static> IterPlugin<G, P> for Cancellation {
    fn on_generation(&mut self, _ga: &Ga<G, P>) -> Result<IterControl> {
        Ok(if self.flag.load(Ordering::Relaxed) {
            IterControl::Stop
        } else {
            IterControl::Continue
        })
    }

    fn name(&self) -> &str {
        "cancellation"
    }
}

/// Stops after `limit` generations without improvement of the best score.
///
/// `score` maps a phenotype to a value where **lower is better**. Cached
/// phenotypes are used when present; the rest are decoded on the fly
/// through the orchestrator's codecs without touching the cache.
///
/// When `min_improvement` is positive, a new best only resets the counter if
/// its relative improvement `(old - new) / |old|` reaches the threshold.
///
/// A `limit` of 0 disables stopping; the plugin still tracks the best score.
pub struct Stagnation<F> {
    limit: usize,
    min_improvement: f64,
    score: F,
    best: Option<f64>,
    stagnant: usize,
}

impl<F> Stagnation<F> {
    pub fn new(limit: usize, score: F) -> Self {
        Self {
            limit,
            min_improvement: 0.0,
            score,
            best: None,
            stagnant: 0,
        }
    }

    /// Sets the minimum relative improvement (negative values become 0).
    pub fn with_min_improvement(mut self, threshold: f64) -> Self {
        self.min_improvement = threshold.max(0.0);
        self
    }

    /// Best (lowest) score seen so far.
    pub fn best_score(&self) -> Option<f64> {
        self.best
    }

    /// Consecutive generations without significant improvement.
    pub fn stagnant_generations(&self) -> usize {
        self.stagnant
    }

    fn record(&mut self, generation_best: f64) {
        match self.best {
            None => {
                self.best = Some(generation_best);
                self.stagnant = 0;
            }
            Some(best) if generation_best < best => {
                self.best = Some(generation_best);
                let ratio = (best - generation_best) / best.abs().max(f64::EPSILON);
                if ratio >= self.min_improvement {
                    self.stagnant = 0;
                } else {
                    self.stagnant += 1;
                }
            }
            Some(_) => self.stagnant += 1,
        }
    }
}

impl<G, P, F> IterPlugin<G, P> for Stagnation<F>
where
    G: Gene,
    P: Clone + Send + 'static,
    F: FnMut(&Phenotype<P>) -> f64 + Send,
{
    fn on_generation(&mut self, ga: &Ga<G, P>) -> Result<IterControl> {
        let Some(population) = ga.population() else {
            return Ok(IterControl::Continue);
        };

        let mut generation_best = f64::INFINITY;
        for ind in population.individuals() {
            let score = match ind.phenotype() {
                Some(phenotype) => (self.score)(phenotype),
                None => (self.score)(&ga.decode(ind.genotype())?),
            };
            if score.is_nan() {
                return Err(GaError::plugin("stagnation", "score function returned NaN"));
            }
            generation_best = generation_best.min(score);
        }
        self.record(generation_best);

        Ok(if self.limit > 0 && self.stagnant >= self.limit {
            IterControl::Stop
        } else {
            IterControl::Continue
        })
    }

    fn name(&self) -> &str {
        "stagnation"
    }

    fn reset(&mut self) {
        self.best = None;
        self.stagnant = 0;
    }
}

/// Logs generation progress at `info` level every `every` generations.
#[derive(Debug, Clone)]
pub struct GenerationLogger {
    every: u64,
}

impl GenerationLogger {
    /// Logs every `every` generations (0 is treated as 1).
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Default for GenerationLogger {
    fn default() -> Self {
        Self::new(1)
    }
}

impl<G: Gene, P: Clone + Send + 'static> IterPlugin<G, P> for GenerationLogger {
    fn on_generation(&mut self, ga: &Ga<G, P>) -> Result<IterControl> {
        if let Some(population) = ga.population() {
            if population.generation() % self.every == 0 {
                info!(
                    "generation {}: {} individuals, diversity {:.3}",
                    population.generation(),
                    population.len(),
                    population.diversity()
                );
            }
        }
        Ok(IterControl::Continue)
    }

    fn name(&self) -> &str {
        "generation_logger"
    }
}

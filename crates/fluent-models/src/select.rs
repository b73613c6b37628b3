//! Model selection
//!
//! Two regimes, picked by the caller from the shape of the input:
//!
//! - [`ModelSelector::search_degree`]: one base variable, every feasible
//!   degree up to `max_search_degree` is fitted and scored; the best score
//!   wins and ties keep the lower degree.
//! - [`ModelSelector::fit_fixed`]: one expansion at a given degree.
//!
//! Scores are R² averaged over targets. They are computed on a seeded
//! held-out split when the row count exceeds `holdout_min_rows`, and
//! in-sample otherwise. Returned coefficients always come from a fit on
//! every row.

use ndarray::ArrayView2;
use serde::Serialize;
use tracing::debug;

use fluent_core::terms::FeatureExpander;

use crate::base::{ModelError, Result};
use crate::config::FitConfig;
use crate::lm::{mean_score, r_squared_per_target, OlsFit, TrainTestSplit};


/// Rows the score was computed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Every row, scored against the fit that used them
    InSample,
    /// Held-out rows of a seeded split
    HeldOut,
}

/// Score of one candidate degree
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidateScore {
    pub degree: usize,
    /// Mean R² over targets
    pub score: f64,
}

/// The winning expansion and its full-data fit
#[derive(Debug, Clone)]
pub struct Selection {
    /// Expansion of the winning candidate
    pub expander: FeatureExpander,
    /// Fit on every row
    pub fit: OlsFit,
    /// R² of each target, in target order
    pub target_scores: Vec<f64>,
    /// Mean of `target_scores`
    pub score: f64,
    pub source: ScoreSource,
    /// Every candidate that produced a score, in the order tried
    pub candidates: Vec<CandidateScore>,
}

impl Selection {
    pub fn degree(&self) -> usize {
        self.expander.degree()
    }
}

/// A scored fit of one candidate
struct Scored {
    expander: FeatureExpander,
    /// Present when the scoring fit already used every row
    full_fit: Option<OlsFit>,
    target_scores: Vec<f64>,
    score: f64,
}

/// Fits and scores candidate expansions
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    config: FitConfig,
}

impl ModelSelector {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Whether `n_rows` rows are scored on a held-out split
    pub fn uses_holdout(&self, n_rows: usize) -> bool {
        n_rows > self.config.holdout_min_rows
    }

    fn source_for(&self, n_rows: usize) -> ScoreSource {
        if self.uses_holdout(n_rows) {
            ScoreSource::HeldOut
        } else {
            ScoreSource::InSample
        }
    }

    /// Try every feasible degree of a single base variable
    ///
    /// A degree `d` is feasible when there are at least `d + 1` rows.
    /// Rank-deficient candidates are skipped; when no candidate fits, the
    /// last failure is returned.
    pub fn search_degree(
        &self,
        variable: &str,
        inputs: ArrayView2<f64>,
        targets: ArrayView2<f64>,
    ) -> Result<Selection> {
        let n_rows = inputs.nrows();
        let feasible: Vec<usize> = (1..=self.config.max_search_degree)
            .filter(|degree| n_rows >= degree + 1)
            .collect();
        if feasible.is_empty() {
            return Err(ModelError::InsufficientData {
                n_samples: n_rows,
                n_required: 2,
            });
        }

        let mut best: Option<Scored> = None;
        let mut candidates = Vec::with_capacity(feasible.len());
        let mut last_error = None;

        for degree in feasible {
            let expander = FeatureExpander::new(&[variable], degree)?;
            let scored = match self.score_candidate(expander, inputs, targets) {
                Ok(scored) => scored,
                Err(err) if err.is_fit_failure() || matches!(err, ModelError::InsufficientData { .. }) => {
                    debug!(degree, error = %err, "Skipping candidate degree");
                    last_error = Some(err);
                    continue;
                }
                Err(err) => return Err(err),
            };

            debug!(degree, score = scored.score, "Scored candidate degree");
            candidates.push(CandidateScore {
                degree,
                score: scored.score,
            });

            let better = match &best {
                Some(current) => scored.score > current.score,
                None => true,
            };
            if better {
                best = Some(scored);
            }
        }

        match best {
            Some(best) => self.finish(best, inputs, targets, candidates),
            None => Err(last_error.unwrap_or_else(|| {
                ModelError::fit("no candidate degree could be fitted", "degree search")
            })),
        }
    }

    /// Fit one expansion of `variables` at `degree`
    pub fn fit_fixed(
        &self,
        variables: &[String],
        degree: usize,
        inputs: ArrayView2<f64>,
        targets: ArrayView2<f64>,
    ) -> Result<Selection> {
        let expander = FeatureExpander::new(variables, degree)?;
        let design = expander.expand(inputs)?;
        let fit = OlsFit::fit(design.view(), targets)?;

        let target_scores = if self.uses_holdout(design.nrows()) {
            self.held_out_scores(design.view(), targets)?
        } else {
            in_sample_scores(&fit, design.view(), targets)?
        };
        let score = mean_score(&target_scores);
        debug!(degree, score, "Scored fixed expansion");

        Ok(Selection {
            source: self.source_for(design.nrows()),
            candidates: vec![CandidateScore { degree, score }],
            expander,
            fit,
            target_scores,
            score,
        })
    }

    fn score_candidate(
        &self,
        expander: FeatureExpander,
        inputs: ArrayView2<f64>,
        targets: ArrayView2<f64>,
    ) -> Result<Scored> {
        let design = expander.expand(inputs)?;

        let (full_fit, target_scores) = if self.uses_holdout(design.nrows()) {
            (None, self.held_out_scores(design.view(), targets)?)
        } else {
            let fit = OlsFit::fit(design.view(), targets)?;
            let scores = in_sample_scores(&fit, design.view(), targets)?;
            (Some(fit), scores)
        };

        Ok(Scored {
            expander,
            full_fit,
            score: mean_score(&target_scores),
            target_scores,
        })
    }

    /// Fit on the training rows of a seeded split, score on the test rows
    fn held_out_scores(
        &self,
        design: ArrayView2<f64>,
        targets: ArrayView2<f64>,
    ) -> Result<Vec<f64>> {
        let split = TrainTestSplit::new(
            design.nrows(),
            self.config.test_fraction,
            self.config.split_seed,
        )?;
        let (x_train, x_test) = split.apply(design);
        let (y_train, y_test) = split.apply(targets);

        let fit = OlsFit::fit(x_train.view(), y_train.view())?;
        let predicted = fit.predict(x_test.view())?;
        Ok(r_squared_per_target(y_test.view(), predicted.view()))
    }

    fn finish(
        &self,
        best: Scored,
        inputs: ArrayView2<f64>,
        targets: ArrayView2<f64>,
        candidates: Vec<CandidateScore>,
    ) -> Result<Selection> {
        let fit = match best.full_fit {
            Some(fit) => fit,
            None => {
                let design = best.expander.expand(inputs)?;
                OlsFit::fit(design.view(), targets)?
            }
        };

        Ok(Selection {
            source: self.source_for(inputs.nrows()),
            expander: best.expander,
            fit,
            target_scores: best.target_scores,
            score: best.score,
            candidates,
        })
    }
}

fn in_sample_scores(
    fit: &OlsFit,
    design: ArrayView2<f64>,
    targets: ArrayView2<f64>,
) -> Result<Vec<f64>> {
    let predicted = fit.predict(design)?;
    Ok(r_squared_per_target(targets, predicted.view()))
}

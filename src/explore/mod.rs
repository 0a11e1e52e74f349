//! One exploration round: n concurrent artifact generations across the
//! candidate values of the exploring axis, or across independent full-space
//! fills.
//!
//! Every task receives its own deep copy of the design space before touching
//! it; the caller's instance is never mutated from inside the batch. A
//! failing task costs only its own slot: the rest of the batch completes
//! and the round returns partial results.

use crate::domains::Domain;
use crate::history::{HistoryRecord, HistoryStore};
use crate::oracle::Oracle;
use crate::space::{AxisStatus, DesignSpace, Example, Tag};
use crate::tags::Tagger;
use anyhow::Context as _;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExploreMode {
    /// Vary the single exploring axis across candidate values.
    #[default]
    SingleAxis,
    /// Re-fill the entire space independently for each attempt. This
    /// approximates varying every axis at once, it is not true joint
    /// sampling: each attempt is an unrelated draw from the fill
    /// distribution.
    AllAxes,
}

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub mode: ExploreMode,
    /// Restore candidate-token order after the concurrent batch completes.
    /// Off, results arrive in completion order.
    pub sort_results: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: ExploreMode::SingleAxis,
            sort_results: true,
        }
    }
}

pub struct ExplorationRunner {
    oracle: Arc<dyn Oracle>,
    tagger: Arc<dyn Tagger>,
    history: Arc<dyn HistoryStore>,
    max_concurrency: usize,
}

impl ExplorationRunner {
    pub fn new(
        oracle: Arc<dyn Oracle>,
        tagger: Arc<dyn Tagger>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        let max_concurrency = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4);
        Self {
            oracle,
            tagger,
            history,
            max_concurrency,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Drive one exploration round and persist its outcome.
    ///
    /// Zero candidates (or an all-constrained space in all-axes mode) is a
    /// legitimate degenerate case: the round is empty, persisted, and
    /// returned as such.
    pub async fn run(
        &self,
        concept: &str,
        space: &mut DesignSpace,
        domain: Arc<dyn Domain>,
        n: usize,
        options: RunOptions,
    ) -> anyhow::Result<Vec<Example>> {
        let tokens: Vec<String> = match options.mode {
            ExploreMode::SingleAxis => {
                space.select_axis_to_explore();
                space.propose_candidates(self.oracle.as_ref(), n).await?
            }
            // Placeholder tokens, used purely to drive the loop count.
            ExploreMode::AllAxes => (0..n).map(|i| format!("exploration_{i}")).collect(),
        };

        let exploring_axis = space.exploring_axis().map(|axis| axis.name.clone());
        info!(
            concept,
            mode = ?options.mode,
            tokens = tokens.len(),
            axis = exploring_axis.as_deref().unwrap_or("-"),
            "starting exploration round"
        );

        let used: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<(usize, anyhow::Result<Example>)> = JoinSet::new();

        for (index, token) in tokens.iter().enumerate() {
            let task = GenerationTask {
                mode: options.mode,
                oracle: Arc::clone(&self.oracle),
                tagger: Arc::clone(&self.tagger),
                domain: Arc::clone(&domain),
                used: Arc::clone(&used),
                concept: concept.to_string(),
                // Deep copy: the task mutates only its own view of the
                // space, sharing nothing with its siblings.
                snapshot: space.clone(),
                exploring_axis: exploring_axis.clone(),
                token: token.clone(),
            };
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let permit = semaphore.acquire_owned().await;
                let result = match permit {
                    Ok(_permit) => task.generate().await,
                    Err(error) => Err(anyhow::Error::from(error)),
                };
                (index, result)
            });
        }

        let total = tokens.len();
        let mut indexed: Vec<(usize, Example)> = Vec::with_capacity(total);
        let mut failed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(example))) => {
                    indexed.push((index, example));
                    info!(done = indexed.len(), total, "generation finished");
                }
                Ok((index, Err(error))) => {
                    failed += 1;
                    warn!(index, %error, "generation failed, dropping its slot");
                }
                Err(join_error) => {
                    failed += 1;
                    warn!(%join_error, "generation task aborted, dropping its slot");
                }
            }
        }

        if options.sort_results {
            // First-match index in the token sequence, so duplicate tokens
            // share a key and the sort stays stable among them.
            indexed.sort_by_key(|(index, _)| {
                let token = &tokens[*index];
                tokens.iter().position(|t| t == token).unwrap_or(*index)
            });
        }
        let results: Vec<Example> = indexed.into_iter().map(|(_, example)| example).collect();

        let key = format!("{}_{}", concept, domain.display_name());
        let record = HistoryRecord {
            run_id: format!("run_{}", Uuid::new_v4().simple()),
            recorded_at: Utc::now().to_rfc3339(),
            design_space: space.clone(),
            results: results.clone(),
        };
        self.history
            .append(&key, record)
            .context("failed to persist exploration round")?;

        info!(%key, results = results.len(), failed, "exploration round persisted");
        Ok(results)
    }
}

/// Everything one generation attempt owns. Built on the runner's thread,
/// moved whole into the spawned task.
struct GenerationTask {
    mode: ExploreMode,
    oracle: Arc<dyn Oracle>,
    tagger: Arc<dyn Tagger>,
    domain: Arc<dyn Domain>,
    used: Arc<Mutex<Vec<String>>>,
    concept: String,
    snapshot: DesignSpace,
    exploring_axis: Option<String>,
    token: String,
}

impl GenerationTask {
    async fn generate(mut self) -> anyhow::Result<Example> {
        match self.mode {
            ExploreMode::SingleAxis => {
                if let Some(name) = &self.exploring_axis {
                    if let Some(axis) = self.snapshot.get_axis_mut(name) {
                        axis.value = self.token.clone();
                    }
                }
            }
            ExploreMode::AllAxes => {
                for axis in &mut self.snapshot.axes {
                    axis.status = AxisStatus::Unconstrained;
                    axis.value.clear();
                }
                self.snapshot.auto_fill(self.oracle.as_ref()).await?;
            }
        }

        let generation = self
            .domain
            .generate_one(&self.concept, &self.snapshot)
            .await?;

        let tags = match self.mode {
            ExploreMode::SingleAxis => {
                let already_used = self
                    .used
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .clone();
                let tags = self
                    .tagger
                    .extract(&generation.prompt, &self.snapshot, &already_used)
                    .await?;
                self.used
                    .lock()
                    .unwrap_or_else(std::sync::PoisonError::into_inner)
                    .extend(tags.iter().map(|tag| tag.value.clone()));
                tags
            }
            // After the per-task reset no axis is exploring, so all-axes
            // examples normally carry no tags.
            ExploreMode::AllAxes => self
                .snapshot
                .exploring_axis()
                .map(|axis| {
                    vec![Tag {
                        dimension: axis.name.clone(),
                        value: axis.value.to_lowercase(),
                    }]
                })
                .unwrap_or_default(),
        };

        Ok(Example {
            prompt: generation.prompt,
            content: generation.content,
            tags,
        })
    }
}

//! The design-space state machine.
//!
//! A [`DesignSpace`] owns the axes describing one concept/domain exploration
//! session: which are fixed, which is being varied, and what values the rest
//! carry. Sessions mutate it in place through the operations here and persist
//! a serde snapshot after each round as their sole checkpoint.
//!
//! Failure semantics are deliberately lopsided: garbled oracle *text*
//! degrades to a no-op or an empty result (the common case with a
//! natural-language backend), while a transport-level oracle failure
//! propagates as [`crate::error::OracleError::Unavailable`].

pub mod prompts;

use crate::markup;
use crate::oracle::Oracle;
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use tracing::{debug, warn};

// ─── Data model ─────────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AxisStatus {
    /// No value assigned yet; may later be auto-filled or promoted to
    /// exploring.
    #[default]
    Unconstrained,
    /// Actively varied across a batch. At most one axis per space.
    Exploring,
    /// Fixed by explicit creation or human feedback; fill and explore must
    /// not touch it.
    Constrained,
}

/// One labeled attribute of a design space (e.g. "car_color").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub name: String,
    pub status: AxisStatus,
    pub value: String,
}

impl Axis {
    pub fn unconstrained(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: AxisStatus::Unconstrained,
            value: String::new(),
        }
    }
}

/// One parsed feedback or fill entry, keyed externally by axis name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisUpdate {
    pub status: AxisStatus,
    pub value: String,
}

/// A short (dimension, value) pair summarizing how one open axis manifested
/// in a generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub dimension: String,
    pub value: String,
}

/// Raw domain output for one generation attempt, before tags are attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// The expanded description actually used to generate the artifact.
    pub prompt: String,
    /// Artifact payload; format owned by the domain, opaque here.
    pub content: String,
}

/// One finished artifact record: immutable once produced, appended to the
/// round history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub prompt: String,
    pub content: String,
    pub tags: Vec<Tag>,
}

/// The full set of axes for one concept/domain exploration session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSpace {
    pub concept: String,
    pub domain: String,
    pub axes: Vec<Axis>,
}

impl fmt::Display for DesignSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, axis) in self.axes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} ({}) : {}", axis.name, axis.status, axis.value)?;
        }
        Ok(())
    }
}

// ─── Operations ─────────────────────────────────────────────────────────────

impl DesignSpace {
    /// Create a design space by asking the oracle to propose axis names for
    /// the concept/domain pair.
    ///
    /// Zero parseable axes is a valid outcome (the downstream operations all
    /// handle an empty space as a no-op), so the only error path here is the
    /// oracle transport itself.
    pub async fn create(
        oracle: &dyn Oracle,
        concept: &str,
        domain: &str,
        context: Option<&str>,
    ) -> anyhow::Result<Self> {
        let prompt = prompts::create_space(concept, domain, context)?;
        let response = oracle.complete(&prompt).await?;

        let mut axes: Vec<Axis> = Vec::new();
        for name in markup::extract_axis_names(&response) {
            if axes.iter().any(|axis| axis.name == name) {
                debug!(axis = %name, "dropping duplicate axis name from oracle");
                continue;
            }
            axes.push(Axis::unconstrained(name));
        }

        if axes.is_empty() {
            warn!(concept, domain, "oracle returned no parseable axes");
        }

        Ok(Self {
            concept: concept.to_string(),
            domain: domain.to_string(),
            axes,
        })
    }

    pub fn get_axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    pub fn get_axis_mut(&mut self, name: &str) -> Option<&mut Axis> {
        self.axes.iter_mut().find(|axis| axis.name == name)
    }

    /// The axis currently being varied, if any.
    pub fn exploring_axis(&self) -> Option<&Axis> {
        self.axes
            .iter()
            .find(|axis| axis.status == AxisStatus::Exploring)
    }

    /// Axes whose value is not yet pinned by feedback (exploring or
    /// unconstrained). These are the axes a generation gets tagged on.
    pub fn open_axes(&self) -> impl Iterator<Item = &Axis> {
        self.axes
            .iter()
            .filter(|axis| axis.status != AxisStatus::Constrained)
    }

    /// Promote the first unconstrained axis to exploring.
    ///
    /// Idempotent: if an axis is already exploring this is a no-op, and if
    /// nothing is unconstrained (all constrained, or the space is empty)
    /// exploration simply does not occur this round.
    pub fn select_axis_to_explore(&mut self) {
        if self.exploring_axis().is_some() {
            return;
        }
        if let Some(axis) = self
            .axes
            .iter_mut()
            .find(|axis| axis.status == AxisStatus::Unconstrained)
        {
            debug!(axis = %axis.name, "selected axis to explore");
            axis.status = AxisStatus::Exploring;
        }
    }

    /// Ask the oracle for up to `n` candidate values of the exploring axis.
    ///
    /// Returns an empty list without consulting the oracle when no axis is
    /// exploring. If several axes are marked exploring through caller misuse,
    /// the first in list order wins and the rest are demoted before the call.
    /// The oracle may under-deliver; callers must not assume exact
    /// cardinality.
    pub async fn propose_candidates(
        &mut self,
        oracle: &dyn Oracle,
        n: usize,
    ) -> anyhow::Result<Vec<String>> {
        let mut exploring = self
            .axes
            .iter_mut()
            .filter(|axis| axis.status == AxisStatus::Exploring);

        let Some(axis) = exploring.next() else {
            debug!("no exploring axis, skipping candidate proposal");
            return Ok(Vec::new());
        };
        let axis_name = axis.name.clone();

        for extra in exploring {
            warn!(axis = %extra.name, "demoting extra exploring axis");
            extra.status = AxisStatus::Unconstrained;
        }

        let prompt = prompts::explore_axis(&self.concept, &self.domain, &axis_name, n)?;
        let response = oracle.complete(&prompt).await?;
        Ok(markup::extract_options(&response))
    }

    /// Fill every unconstrained axis that still has an empty value with a
    /// plausible concrete value, in one batched oracle call.
    ///
    /// Axes the oracle omits are left untouched. Status never changes here;
    /// only explicit feedback reconciliation may constrain an axis.
    pub async fn auto_fill(&mut self, oracle: &dyn Oracle) -> anyhow::Result<()> {
        let targets: Vec<String> = self
            .axes
            .iter()
            .filter(|axis| axis.status == AxisStatus::Unconstrained && axis.value.is_empty())
            .map(|axis| axis.name.clone())
            .collect();

        if targets.is_empty() {
            return Ok(());
        }

        let axis_lines = targets
            .iter()
            .map(|name| format!("{name}: "))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = prompts::fill_space(&self.concept, &self.domain, &axis_lines)?;
        let response = oracle.complete(&prompt).await?;

        for (name, update) in markup::extract_axis_updates(&response) {
            if !targets.contains(&name) {
                debug!(axis = %name, "ignoring fill value for axis not in batch");
                continue;
            }
            if let Some(axis) = self.get_axis_mut(&name) {
                axis.value = update.value;
            }
        }
        Ok(())
    }

    /// Apply parsed feedback updates by axis name.
    ///
    /// References to unknown axes are ignored, never an error. Marking an
    /// axis exploring routes through the single-exploring-axis invariant:
    /// the previously exploring axis reverts to unconstrained.
    pub fn apply_updates(&mut self, updates: &[(String, AxisUpdate)]) {
        for (name, update) in updates {
            let Some(index) = self.axes.iter().position(|axis| axis.name == *name) else {
                debug!(axis = %name, "ignoring update for unknown axis");
                continue;
            };
            if update.status == AxisStatus::Exploring {
                for axis in &mut self.axes {
                    if axis.status == AxisStatus::Exploring {
                        axis.status = AxisStatus::Unconstrained;
                    }
                }
            }
            let axis = &mut self.axes[index];
            axis.status = update.status;
            axis.value = update.value.clone();
        }
    }

    /// Turn free-text human feedback into axis updates through one oracle
    /// call, apply them, and return them for the caller's records.
    pub async fn reconcile_feedback(
        &mut self,
        oracle: &dyn Oracle,
        feedback: &str,
    ) -> anyhow::Result<Vec<(String, AxisUpdate)>> {
        let prompt =
            prompts::reconcile_feedback(&self.concept, &self.domain, &self.to_string(), feedback)?;
        let response = oracle.complete(&prompt).await?;
        let updates = markup::extract_axis_updates(&response);
        self.apply_updates(&updates);
        Ok(updates)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

//! Tag extraction for generated artifacts.
//!
//! One tag per open (exploring/unconstrained) axis, derived from the
//! artifact's textual description. Constrained axes are omitted: their value
//! is already known and redundant to tag.

use crate::markup;
use crate::oracle::Oracle;
use crate::space::{DesignSpace, Tag, prompts};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

/// Pluggable tag source so runners and tests can substitute a deterministic
/// implementation for the oracle-backed one.
pub trait Tagger: Send + Sync {
    /// Derive at most one tag per open axis of `space` from `description`.
    ///
    /// `used` is a soft constraint: the oracle is asked to avoid those values
    /// so concurrent generations sharing an exploring axis don't collide on
    /// identical tags; it is not structurally enforced.
    fn extract<'a>(
        &'a self,
        description: &'a str,
        space: &'a DesignSpace,
        used: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Tag>>> + Send + 'a>>;
}

pub struct OracleTagExtractor {
    oracle: Arc<dyn Oracle>,
}

impl OracleTagExtractor {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }
}

impl Tagger for OracleTagExtractor {
    fn extract<'a>(
        &'a self,
        description: &'a str,
        space: &'a DesignSpace,
        used: &'a [String],
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<Tag>>> + Send + 'a>> {
        Box::pin(async move {
            let open: Vec<&str> = space.open_axes().map(|axis| axis.name.as_str()).collect();
            if open.is_empty() {
                debug!("no open axes, skipping tag extraction");
                return Ok(Vec::new());
            }

            let prompt = prompts::extract_tags(&space.domain, description, &open, used)?;
            let response = self.oracle.complete(&prompt).await?;

            // Keep the first tag per open axis; drop tags for axes the
            // oracle invented and duplicates it emitted. Axes the oracle
            // omitted get no tag, never a synthesized placeholder.
            let mut tags: Vec<Tag> = Vec::new();
            for tag in markup::extract_tags(&response) {
                if !open.contains(&tag.dimension.as_str()) {
                    debug!(dimension = %tag.dimension, "dropping tag for non-open axis");
                    continue;
                }
                if tags.iter().any(|t| t.dimension == tag.dimension) {
                    continue;
                }
                tags.push(tag);
            }
            Ok(tags)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{Axis, AxisStatus};
    use std::sync::Mutex;

    struct CannedOracle {
        response: String,
        prompts: Mutex<Vec<String>>,
    }

    impl CannedOracle {
        fn new(response: &str) -> Self {
            Self {
                response: response.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl Oracle for CannedOracle {
        fn name(&self) -> &str {
            "canned"
        }

        fn complete_with_system<'a>(
            &'a self,
            _system_prompt: Option<&'a str>,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    fn space() -> DesignSpace {
        DesignSpace {
            concept: "elephant".into(),
            domain: "Image".into(),
            axes: vec![
                Axis {
                    name: "color".into(),
                    status: AxisStatus::Exploring,
                    value: "red".into(),
                },
                Axis {
                    name: "pose".into(),
                    status: AxisStatus::Unconstrained,
                    value: "standing".into(),
                },
                Axis {
                    name: "background".into(),
                    status: AxisStatus::Constrained,
                    value: "savanna".into(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn extracts_one_tag_per_open_axis() {
        let oracle = Arc::new(CannedOracle::new(
            "<tags><tag dimension=\"color\">Red</tag><tag dimension=\"pose\">standing</tag></tags>",
        ));
        let extractor = OracleTagExtractor::new(oracle);

        let tags = extractor
            .extract("a red standing elephant", &space(), &[])
            .await
            .unwrap();

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].dimension, "color");
        assert_eq!(tags[0].value, "red");
        assert_eq!(tags[1].dimension, "pose");
    }

    #[tokio::test]
    async fn constrained_axes_are_never_tagged() {
        let oracle = Arc::new(CannedOracle::new(
            "<tags><tag dimension=\"color\">red</tag><tag dimension=\"background\">savanna</tag></tags>",
        ));
        let extractor = OracleTagExtractor::new(oracle);

        let tags = extractor
            .extract("a red elephant on the savanna", &space(), &[])
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].dimension, "color");
    }

    #[tokio::test]
    async fn omitted_axis_gets_no_placeholder() {
        let oracle = Arc::new(CannedOracle::new(
            "<tags><tag dimension=\"color\">red</tag></tags>",
        ));
        let extractor = OracleTagExtractor::new(oracle);

        let tags = extractor.extract("a red elephant", &space(), &[]).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert!(tags.iter().all(|t| t.dimension != "pose"));
    }

    #[tokio::test]
    async fn duplicate_dimension_keeps_first() {
        let oracle = Arc::new(CannedOracle::new(
            "<tags><tag dimension=\"color\">red</tag><tag dimension=\"color\">crimson</tag></tags>",
        ));
        let extractor = OracleTagExtractor::new(oracle);

        let tags = extractor.extract("a red elephant", &space(), &[]).await.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].value, "red");
    }

    #[tokio::test]
    async fn used_tags_reach_the_prompt() {
        let oracle = Arc::new(CannedOracle::new("<tags></tags>"));
        let extractor = OracleTagExtractor::new(Arc::clone(&oracle) as Arc<dyn Oracle>);

        let used = vec!["red".to_string(), "blue".to_string()];
        extractor
            .extract("a green elephant", &space(), &used)
            .await
            .unwrap();

        let prompts = oracle.prompts.lock().unwrap();
        assert!(prompts[0].contains("red, blue"));
    }

    #[tokio::test]
    async fn all_constrained_space_skips_oracle() {
        let oracle = Arc::new(CannedOracle::new("<tags></tags>"));
        let extractor = OracleTagExtractor::new(Arc::clone(&oracle) as Arc<dyn Oracle>);

        let mut fully_constrained = space();
        for axis in &mut fully_constrained.axes {
            axis.status = AxisStatus::Constrained;
        }

        let tags = extractor
            .extract("whatever", &fully_constrained, &[])
            .await
            .unwrap();

        assert!(tags.is_empty());
        assert!(oracle.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn garbled_response_yields_no_tags() {
        let oracle = Arc::new(CannedOracle::new("the elephant sure is red!"));
        let extractor = OracleTagExtractor::new(oracle);

        let tags = extractor.extract("a red elephant", &space(), &[]).await.unwrap();
        assert!(tags.is_empty());
    }
}

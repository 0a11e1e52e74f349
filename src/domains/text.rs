//! Text artifact generation.
//!
//! Two oracle calls per artifact: expand the concretized design space into a
//! one-paragraph description of the piece, then write the piece from that
//! description. The expanded description becomes the `prompt` of the
//! resulting [`Generation`], which is what tag extraction later reads.

use super::Domain;
use crate::oracle::Oracle;
use crate::space::{DesignSpace, Generation};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::debug;

const EXPAND_PROMPT: &str = "\
You are describing a short piece of text about a {{ concept }}.

The piece must express these attributes:

{{ space }}

Write a one-paragraph description of the piece: its subject, form, tone and \
style. Describe only the piece itself, with no preamble.";

const GENERATE_SYSTEM: &str = "\
You are a writer. Given a description of a short piece of text, write the \
piece itself. Return only the piece, with no preamble or commentary.";

pub struct TextDomain {
    oracle: Arc<dyn Oracle>,
}

impl TextDomain {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    fn expand_prompt(&self, concept: &str, space: &DesignSpace) -> anyhow::Result<String> {
        let mut ctx = Context::new();
        ctx.insert("concept", concept);
        ctx.insert("space", &space.to_string());
        let rendered = Tera::one_off(EXPAND_PROMPT, &ctx, false)?;
        Ok(rendered)
    }
}

impl Domain for TextDomain {
    fn name(&self) -> &str {
        "text"
    }

    fn display_name(&self) -> &str {
        "Text"
    }

    fn generate_one<'a>(
        &'a self,
        concept: &'a str,
        space: &'a DesignSpace,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Generation>> + Send + 'a>> {
        Box::pin(async move {
            let expansion_request = self.expand_prompt(concept, space)?;
            let description = self.oracle.complete(&expansion_request).await?;
            let description = description.trim().to_string();
            debug!(concept, "expanded text description");

            let content = self
                .oracle
                .complete_with_system(Some(GENERATE_SYSTEM), &description)
                .await?;

            Ok(Generation {
                prompt: description,
                content: content.trim().to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{Axis, AxisStatus};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedOracle {
        responses: Mutex<VecDeque<String>>,
    }

    impl ScriptedOracle {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().map(|s| (*s).to_string()).collect()),
            }
        }
    }

    impl Oracle for ScriptedOracle {
        fn name(&self) -> &str {
            "scripted"
        }

        fn complete_with_system<'a>(
            &'a self,
            _system_prompt: Option<&'a str>,
            _prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();
            Box::pin(async move { Ok(response) })
        }
    }

    fn space() -> DesignSpace {
        DesignSpace {
            concept: "elephant".into(),
            domain: "Text".into(),
            axes: vec![Axis {
                name: "tone".into(),
                status: AxisStatus::Unconstrained,
                value: "wistful".into(),
            }],
        }
    }

    #[tokio::test]
    async fn generate_one_expands_then_writes() {
        let oracle = Arc::new(ScriptedOracle::new(&[
            " A wistful vignette about an old elephant. ",
            "The elephant remembered the river.",
        ]));
        let domain = TextDomain::new(oracle);

        let generation = domain.generate_one("elephant", &space()).await.unwrap();
        assert_eq!(
            generation.prompt,
            "A wistful vignette about an old elephant."
        );
        assert_eq!(generation.content, "The elephant remembered the river.");
    }

    #[test]
    fn expand_prompt_embeds_space_rendering() {
        let oracle = Arc::new(ScriptedOracle::new(&[]));
        let domain = TextDomain::new(oracle);
        let prompt = domain.expand_prompt("elephant", &space()).unwrap();
        assert!(prompt.contains("tone (unconstrained) : wistful"));
        assert!(prompt.contains("elephant"));
    }

    #[test]
    fn names_are_stable() {
        let domain = TextDomain::new(Arc::new(ScriptedOracle::new(&[])));
        assert_eq!(domain.name(), "text");
        assert_eq!(domain.display_name(), "Text");
    }
}

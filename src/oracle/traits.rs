use std::future::Future;
use std::pin::Pin;

/// The natural-language completion backend.
///
/// Implementations may be slow (seconds), must not be assumed idempotent, and
/// must not be assumed to return well-formed markup; extracting structure
/// from the returned text is the `markup` module's problem. The only failures
/// surfaced here are transport-level ones (`OracleError::Unavailable`).
pub trait Oracle: Send + Sync {
    /// Backend identifier (e.g. "openrouter", "cerebras").
    fn name(&self) -> &str;

    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move { self.complete_with_system(None, prompt).await })
    }

    fn complete_with_system<'a>(
        &'a self,
        system_prompt: Option<&'a str>,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;

    /// Warm up the HTTP connection pool. Default is a no-op; backends with
    /// HTTP clients should override.
    fn warmup(&self) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + '_>> {
        Box::pin(async move { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoOracle;

    impl Oracle for EchoOracle {
        fn name(&self) -> &str {
            "echo"
        }

        fn complete_with_system<'a>(
            &'a self,
            system_prompt: Option<&'a str>,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
            Box::pin(async move {
                Ok(match system_prompt {
                    Some(system) => format!("{system}|{prompt}"),
                    None => prompt.to_string(),
                })
            })
        }
    }

    #[tokio::test]
    async fn complete_defaults_to_no_system_prompt() {
        let oracle = EchoOracle;
        assert_eq!(oracle.complete("hello").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn complete_with_system_threads_both_prompts() {
        let oracle = EchoOracle;
        let out = oracle
            .complete_with_system(Some("sys"), "hello")
            .await
            .unwrap();
        assert_eq!(out, "sys|hello");
    }

    #[tokio::test]
    async fn default_warmup_is_noop() {
        assert!(EchoOracle.warmup().await.is_ok());
    }
}

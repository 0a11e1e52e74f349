use super::openrouter::OpenRouterOracle;
use super::traits::Oracle;
use anyhow::bail;
use std::sync::Arc;

pub const CEREBRAS_BASE_URL: &str = "https://api.cerebras.ai/v1";

/// Map a provider name to a configured oracle.
///
/// Supported names: `openrouter`, `cerebras`, and `custom:<url>` for any
/// OpenAI-compatible endpoint.
pub fn create_oracle(
    provider: &str,
    api_key: Option<&str>,
    model: &str,
    temperature: f64,
) -> anyhow::Result<Arc<dyn Oracle>> {
    match provider {
        "openrouter" => Ok(Arc::new(OpenRouterOracle::new(api_key, model, temperature))),
        "cerebras" => Ok(Arc::new(OpenRouterOracle::with_base_url(
            "cerebras",
            CEREBRAS_BASE_URL,
            api_key,
            model,
            temperature,
        ))),
        name if name.starts_with("custom:") => {
            let url = &name["custom:".len()..];
            if url.is_empty() {
                bail!("custom oracle requires a URL, e.g. custom:https://my-llm.example.com");
            }
            Ok(Arc::new(OpenRouterOracle::with_base_url(
                "custom",
                url,
                api_key,
                model,
                temperature,
            )))
        }
        other => bail!("Unknown oracle provider: {other}"),
    }
}

//! Wiring of resolved settings into live services.

use crate::config::ProviderKind;
use crate::env::Resolved;
use crate::error::Result;
use dealscan_auth::TokenManager;
use dealscan_crm::{CrmClient, CrmSession};
use dealscan_extractor::ContractExtractor;
use dealscan_llm::{BedrockProvider, ModelProvider, OllamaProvider};
use std::sync::Arc;
use tracing::debug;

/// Build the token manager, seeded with `SALESFORCE_ACCESS_TOKEN` if given
pub async fn token_manager(resolved: &Resolved) -> Result<Arc<TokenManager>> {
    let tokens = Arc::new(TokenManager::new(resolved.auth.clone())?);
    if let Some(token) = &resolved.access_token {
        debug!("Seeding token store from the environment");
        tokens.set_token(token.clone(), None, None).await;
    }
    Ok(tokens)
}

/// Build an authorized CRM session
pub async fn crm_session(resolved: &Resolved) -> Result<CrmSession> {
    let tokens = token_manager(resolved).await?;
    let client = CrmClient::new(&resolved.crm)?;
    Ok(CrmSession::new(tokens, client))
}

/// Build the configured model provider
pub async fn model_provider(
    kind: ProviderKind,
    resolved: &Resolved,
) -> Result<Box<dyn ModelProvider>> {
    let provider: Box<dyn ModelProvider> = match kind {
        ProviderKind::Bedrock => Box::new(BedrockProvider::new(&resolved.bedrock).await),
        ProviderKind::Ollama => Box::new(OllamaProvider::new(
            resolved.ollama_endpoint.clone(),
            resolved.ollama_model.clone(),
            resolved.extraction.timeout(),
        )?),
    };
    debug!(provider = provider.name(), "Model provider ready");
    Ok(provider)
}

/// Build the contract extractor over `provider`
pub fn extractor(
    provider: Box<dyn ModelProvider>,
    resolved: &Resolved,
) -> Result<ContractExtractor<Box<dyn ModelProvider>>> {
    Ok(ContractExtractor::new(provider, resolved.extraction.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::env::Environment;

    #[tokio::test]
    async fn test_access_token_from_environment_is_used() {
        let env = Environment::from_pairs([
            ("SALESFORCE_ACCESS_TOKEN", "00D!abc"),
            ("SALESFORCE_INSTANCE_URL", "https://acme.my.salesforce.com"),
        ]);
        let resolved = Config::default().resolve(&env).unwrap();

        let tokens = token_manager(&resolved).await.unwrap();
        assert_eq!(tokens.get_access_token().await.as_deref(), Some("00D!abc"));
        assert_eq!(
            tokens.endpoint_url().await.as_deref(),
            Some("https://acme.my.salesforce.com")
        );
    }

    #[tokio::test]
    async fn test_ollama_provider_is_built() {
        let resolved = Config::default().resolve(&Environment::default()).unwrap();
        let provider = model_provider(ProviderKind::Ollama, &resolved).await.unwrap();
        assert_eq!(provider.name(), "Ollama");
        assert!(!provider.supports_documents());

        let extractor = extractor(provider, &resolved).unwrap();
        assert_eq!(extractor.config().max_tokens, 1000);
    }
}

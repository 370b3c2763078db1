use crate::config::Config;
use crate::error::FetchError;
use crate::i18n::{Dictionary, Language};
use crate::retry::{with_retry_if, RetryConfig};
use async_trait::async_trait;
use tracing::debug;

/// Where dictionaries come from and where the language preference goes.
///
/// `csrf_token` is the page token from `meta[name="csrf-token"]`, forwarded
/// with every request when present.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    /// Fetch the complete dictionary for `language`.
    async fn fetch_dictionary(
        &self,
        language: Language,
        csrf_token: Option<&str>,
    ) -> Result<Dictionary, FetchError>;

    /// Tell the server which language the user picked.
    async fn sync_preference(
        &self,
        language: Language,
        csrf_token: Option<&str>,
    ) -> Result<(), FetchError>;
}

/// `TranslationSource` backed by the application's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct HttpTranslationSource {
    client: reqwest::Client,
    config: Config,
    retry: RetryConfig,
}

impl HttpTranslationSource {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            retry: RetryConfig::dictionary_fetch(config),
            config: config.clone(),
        }
    }

    fn get(&self, url: &str, csrf_token: Option<&str>) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest");

        match csrf_token {
            Some(token) => request.header(self.config.csrf_header.as_str(), token),
            None => request,
        }
    }

    async fn fetch_once(&self, url: &str, csrf_token: Option<&str>) -> Result<Dictionary, FetchError> {
        let response = self
            .get(url, csrf_token)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let dictionary = Dictionary::from_json(&body).map_err(|e| FetchError::Malformed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if dictionary.is_empty() {
            return Err(FetchError::Empty {
                url: url.to_string(),
            });
        }

        Ok(dictionary)
    }
}

#[async_trait]
impl TranslationSource for HttpTranslationSource {
    async fn fetch_dictionary(
        &self,
        language: Language,
        csrf_token: Option<&str>,
    ) -> Result<Dictionary, FetchError> {
        let url = self.config.translations_url(language);

        let dictionary = with_retry_if(
            &self.retry,
            &format!("Dictionary fetch for {}", language.name()),
            || self.fetch_once(&url, csrf_token),
            FetchError::is_retryable,
        )
        .await?;

        debug!(
            "Fetched {} translations for {} ({})",
            dictionary.len(),
            language.name(),
            language.code()
        );
        Ok(dictionary)
    }

    async fn sync_preference(
        &self,
        language: Language,
        csrf_token: Option<&str>,
    ) -> Result<(), FetchError> {
        let url = self.config.preference_url(language);

        let response = self
            .get(&url, csrf_token)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        // The endpoint may answer with a redirect page; only the status matters.
        if !status.is_success() && !status.is_redirection() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        debug!("Server language preference set to {}", language.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn create_test_config(base_url: &str) -> Config {
        Config {
            base_url: base_url.to_string(),
            fetch_attempts: 2,
            fetch_retry_delay: Duration::from_millis(5),
            ..Config::default()
        }
    }

    // ==================== fetch_dictionary Tests ====================

    #[tokio::test]
    async fn test_fetch_dictionary_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/translations/ha"))
            .and(header("X-CSRFToken", "token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "greeting": "Sannu",
                "general_loading": "Ana loda..."
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(&create_test_config(&mock_server.uri()));
        let dictionary = source
            .fetch_dictionary(Language::HAUSA, Some("token-123"))
            .await
            .expect("Should fetch");

        assert_eq!(dictionary.get("greeting"), Some("Sannu"));
        assert_eq!(dictionary.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_dictionary_retries_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/translations/en"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Failed to load translations"
            })))
            .expect(2)
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(&create_test_config(&mock_server.uri()));
        let err = source
            .fetch_dictionary(Language::ENGLISH, None)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_dictionary_does_not_retry_bad_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/translations/ha"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Invalid language code"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(&create_test_config(&mock_server.uri()));
        let err = source.fetch_dictionary(Language::HAUSA, None).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_fetch_dictionary_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/translations/ha"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>Login</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(&create_test_config(&mock_server.uri()));
        let err = source.fetch_dictionary(Language::HAUSA, None).await.unwrap_err();

        assert!(matches!(err, FetchError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_dictionary_empty_object() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/translations/en"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(&create_test_config(&mock_server.uri()));
        let err = source.fetch_dictionary(Language::ENGLISH, None).await.unwrap_err();

        assert!(matches!(err, FetchError::Empty { .. }));
    }

    #[tokio::test]
    async fn test_fetch_dictionary_unreachable_server() {
        // Nothing listens on the discard port.
        let source = HttpTranslationSource::new(&create_test_config("http://127.0.0.1:9"));
        let err = source.fetch_dictionary(Language::ENGLISH, None).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.is_retryable());
    }

    // ==================== sync_preference Tests ====================

    #[tokio::test]
    async fn test_sync_preference_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/set_language/ha"))
            .and(header("X-CSRFToken", "token-123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(&create_test_config(&mock_server.uri()));
        source
            .sync_preference(Language::HAUSA, Some("token-123"))
            .await
            .expect("Should sync");
    }

    #[tokio::test]
    async fn test_sync_preference_failure_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/set_language/en"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let source = HttpTranslationSource::new(&create_test_config(&mock_server.uri()));
        let err = source.sync_preference(Language::ENGLISH, None).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }
}

//! Mock backend for testing
//!
//! Returns deterministic narrative text without a running model server.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{NarrativeBackend, NarrativeRequest};

/// Mock narrative backend
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// When set, every `generate` call fails with this message
    pub fail_with: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            fail_with: None,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            fail_with: None,
        }
    }

    /// Create a mock backend whose generation always fails
    pub fn failing(message: &str) -> Self {
        Self {
            healthy: false,
            fail_with: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl NarrativeBackend for MockBackend {
    async fn generate(&self, request: &NarrativeRequest) -> Result<String> {
        if let Some(ref message) = self.fail_with {
            return Err(Error::NarrativeUnavailable(message.clone()));
        }

        let headline = request
            .prompt
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("(empty prompt)");

        Ok(format!(
            "Mock analysis ({} prompt lines). {}",
            request.prompt.lines().count(),
            headline
        ))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generate_is_deterministic() {
        let backend = MockBackend::new();
        let request = NarrativeRequest::analyst("\n  Analyze the trends\nmore");
        let a = backend.generate(&request).await.unwrap();
        let b = backend.generate(&request).await.unwrap();
        assert_eq!(a, b);
        assert!(a.contains("Analyze the trends"));
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let backend = MockBackend::failing("quota exceeded");
        let err = backend
            .generate(&NarrativeRequest::analyst("x"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(!backend.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_health() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}

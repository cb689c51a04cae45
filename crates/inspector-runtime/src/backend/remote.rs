//! Remote analysis through a vision provider.

use async_trait::async_trait;
use std::sync::Arc;

use inspector_core::{parse_remote_report, Category};

use super::{AnalysisBackend, BackendError, BackendKind, BackendReport};
use crate::image::ImageInput;
use crate::prompts::{analysis_instruction, response_schema, SYSTEM_PREAMBLE};
use crate::providers::{CompletionConfig, VisionProvider, VisionRequest};

/// Backend that sends the label photo to a [`VisionProvider`].
///
/// Makes exactly one provider call per analysis; retries are left to the
/// caller, which falls back to the catalog instead.
pub struct RemoteBackend {
    provider: Arc<dyn VisionProvider>,
    completion: CompletionConfig,
}

impl RemoteBackend {
    pub fn new(provider: Arc<dyn VisionProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion,
        }
    }

    pub fn completion(&self) -> &CompletionConfig {
        &self.completion
    }
}

impl std::fmt::Debug for RemoteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("provider", &self.provider.name())
            .field("model", &self.completion.model)
            .finish()
    }
}

#[async_trait]
impl AnalysisBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn is_available(&self) -> bool {
        self.provider.health_check().await
    }

    async fn analyze(
        &self,
        image: &ImageInput,
        category: &Category,
    ) -> Result<BackendReport, BackendError> {
        let request = VisionRequest {
            system: Some(SYSTEM_PREAMBLE.trim().to_string()),
            instruction: analysis_instruction(category),
            image: image.encode()?,
            response_schema: Some(response_schema()),
        };

        let response = self.provider.complete(request, &self.completion).await?;
        tracing::debug!(
            provider = self.provider.name(),
            model = %response.model,
            tokens = response.usage.total(),
            finish_reason = ?response.finish_reason,
            "Remote response received"
        );

        let report = parse_remote_report(&response.content)?;

        Ok(BackendReport {
            report,
            source: BackendKind::Remote,
            model: Some(response.model),
            usage: Some(response.usage),
        })
    }
}

//! The analysis pipeline.
//!
//! One call per image:
//! 1. Reject a missing or empty image
//! 2. Try the remote backend, if one is configured and healthy, bounded by
//!    `remote_timeout`
//! 3. On any remote fault, log it and answer from the catalog instead
//! 4. Apply the profile overlay to whichever report came back
//!
//! Remote faults never reach the caller. The only caller-visible error is
//! [`AnalysisError::InvalidInput`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use inspector_core::{apply_profile, Catalog, Category, ProfileSource, SafetyReport, UserProfile};

use crate::backend::{
    AnalysisBackend, BackendError, BackendKind, BackendReport, FallbackBackend, IngredientOrder,
    RandomOrder, RemoteBackend, SeededOrder,
};
use crate::config::RuntimeConfig;
use crate::image::ImageInput;
use crate::providers::{build_provider, ProviderError, TokenUsage, VisionProvider};

/// Errors visible to pipeline callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// One analysis request.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub image: Option<ImageInput>,
    pub category: Category,
    pub profile: Option<UserProfile>,
}

impl AnalysisRequest {
    /// Request for `image` in the default (food) category, without profile.
    pub fn new(image: ImageInput) -> Self {
        Self {
            image: Some(image),
            ..Self::default()
        }
    }

    pub fn category(mut self, category: impl Into<Category>) -> Self {
        self.category = category.into();
        self
    }

    pub fn profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// A report plus how it was produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub report: SafetyReport,

    /// Which backend produced the report
    pub source: BackendKind,

    /// Model that answered, for remote reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,

    /// Why the remote path was abandoned, when it was tried
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,

    pub analyzed_at: DateTime<Utc>,
}

/// Remote-first ingredient analysis with catalog fallback.
///
/// Holds no mutable state; concurrent calls are independent.
pub struct AnalysisPipeline {
    remote: Option<Arc<dyn AnalysisBackend>>,
    fallback: FallbackBackend,
    remote_timeout: Duration,
}

impl AnalysisPipeline {
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::new()
    }

    /// Analyze an image and return the full outcome.
    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisOutcome, AnalysisError> {
        let AnalysisRequest {
            image,
            category,
            profile,
        } = request;

        let image = match image {
            None => return Err(AnalysisError::InvalidInput("no image supplied".to_string())),
            Some(image) if image.is_empty() => {
                return Err(AnalysisError::InvalidInput("image is empty".to_string()))
            }
            Some(image) => image,
        };

        let (answer, fallback_reason) = match self.try_remote(&image, &category).await {
            Some(Ok(answer)) => (answer, None),
            Some(Err(err)) => {
                tracing::warn!(error = %err, category = %category, "Remote analysis failed, using catalog fallback");
                (self.fallback_answer(&category).await, Some(err.to_string()))
            }
            None => (self.fallback_answer(&category).await, None),
        };

        let report = apply_profile(answer.report, profile.as_ref());

        tracing::info!(
            score = report.score,
            source = %answer.source,
            ingredients = report.ingredients.len(),
            conflicts = report.conflicts.len(),
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            report,
            source: answer.source,
            model: answer.model,
            usage: answer.usage,
            fallback_reason,
            analyzed_at: Utc::now(),
        })
    }

    /// Analyze an image and return only the report.
    pub async fn analyze(
        &self,
        image: impl Into<Option<ImageInput>>,
        category: impl Into<Category>,
        profile: Option<&UserProfile>,
    ) -> Result<SafetyReport, AnalysisError> {
        let request = AnalysisRequest {
            image: image.into(),
            category: category.into(),
            profile: profile.cloned(),
        };
        Ok(self.run(request).await?.report)
    }

    /// Analyze with the profile read from `source` at call time.
    pub async fn analyze_for(
        &self,
        image: impl Into<Option<ImageInput>>,
        category: impl Into<Category>,
        source: &dyn ProfileSource,
    ) -> Result<SafetyReport, AnalysisError> {
        let profile = source.current_profile();
        self.analyze(image, category, profile.as_ref()).await
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn catalog(&self) -> &Catalog {
        self.fallback.catalog()
    }

    /// `None` when there is no remote backend to try.
    async fn try_remote(
        &self,
        image: &ImageInput,
        category: &Category,
    ) -> Option<Result<BackendReport, BackendError>> {
        let Some(remote) = &self.remote else {
            tracing::debug!("No remote backend configured");
            return None;
        };

        if !remote.is_available().await {
            tracing::debug!(backend = remote.name(), "Remote backend unavailable");
            return Some(Err(BackendError::Unavailable(remote.name().to_string())));
        }

        tracing::debug!(backend = remote.name(), category = %category, "Trying remote analysis");
        let result = match tokio::time::timeout(self.remote_timeout, remote.analyze(image, category))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.remote_timeout)),
        };
        Some(result)
    }

    async fn fallback_answer(&self, category: &Category) -> BackendReport {
        BackendReport {
            report: self.fallback.report(category).await,
            source: BackendKind::Fallback,
            model: None,
            usage: None,
        }
    }
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field("remote", &self.remote.as_ref().map(|r| r.name().to_string()))
            .field("fallback", &self.fallback)
            .field("remote_timeout", &self.remote_timeout)
            .finish()
    }
}

/// Builder for [`AnalysisPipeline`].
pub struct AnalysisPipelineBuilder {
    catalog: Option<Arc<Catalog>>,
    order: Option<Arc<dyn IngredientOrder>>,
    provider: Option<Arc<dyn VisionProvider>>,
    remote: Option<Arc<dyn AnalysisBackend>>,
    config: RuntimeConfig,
}

impl AnalysisPipelineBuilder {
    pub fn new() -> Self {
        Self {
            catalog: None,
            order: None,
            provider: None,
            remote: None,
            config: RuntimeConfig::default(),
        }
    }

    /// Start from configuration, creating the provider it names.
    pub fn from_config(config: RuntimeConfig) -> Result<Self, ProviderError> {
        let provider = config.provider.as_ref().map(build_provider).transpose()?;

        Ok(Self {
            provider,
            config,
            ..Self::new()
        })
    }

    /// Use this catalog instead of the built-in one.
    pub fn catalog(mut self, catalog: impl Into<Arc<Catalog>>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    pub fn order(mut self, order: Arc<dyn IngredientOrder>) -> Self {
        self.order = Some(order);
        self
    }

    /// Shorthand for a [`SeededOrder`].
    pub fn seed(self, seed: u64) -> Self {
        self.order(Arc::new(SeededOrder::new(seed)))
    }

    /// Call this provider on the remote path.
    pub fn provider(mut self, provider: Arc<dyn VisionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use a custom remote backend; takes precedence over `provider`.
    pub fn remote(mut self, remote: Arc<dyn AnalysisBackend>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Never call a remote backend.
    pub fn offline(mut self) -> Self {
        self.provider = None;
        self.remote = None;
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> AnalysisPipeline {
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(Catalog::builtin()));
        let order = self.order.unwrap_or_else(|| Arc::new(RandomOrder));
        let fallback = FallbackBackend::new(catalog)
            .with_order(order)
            .with_delay(self.config.fallback_delay);

        let completion = self.config.completion_config();
        let remote = self.remote.or_else(|| {
            self.provider.map(|provider| {
                Arc::new(RemoteBackend::new(provider, completion)) as Arc<dyn AnalysisBackend>
            })
        });

        AnalysisPipeline {
            remote,
            fallback,
            remote_timeout: self.config.remote_timeout,
        }
    }
}

impl Default for AnalysisPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

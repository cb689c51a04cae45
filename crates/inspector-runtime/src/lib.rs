//! # inspector-runtime
//!
//! Remote-first ingredient analysis for Ingredient Inspector.
//!
//! The pipeline asks a vision provider to read a photographed label and
//! falls back to the static catalog in `inspector-core` whenever the
//! remote path is missing, unhealthy, slow or returns something that is
//! not a report. Either way the user's allergy profile is applied last.
//!
//! ## Guarantees
//!
//! - A non-empty image always yields a report
//! - Remote faults are logged, never returned
//! - No shared mutable state: concurrent analyses are independent
//!
//! ## Example
//!
//! ```rust,no_run
//! use inspector_runtime::{AnalysisPipeline, ImageInput};
//! use inspector_core::UserProfile;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = AnalysisPipeline::builder().seed(7).build();
//! let profile = UserProfile::new().with_allergies(["Milk"]);
//!
//! let report = pipeline
//!     .analyze(ImageInput::from_path("label.jpg")?, "food", Some(&profile))
//!     .await?;
//! println!("{}: {}", report.score, report.summary);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod image;
pub mod pipeline;
pub mod prompts;
pub mod providers;

pub use backend::{
    AnalysisBackend, BackendError, BackendKind, BackendReport, CatalogOrder, FallbackBackend,
    IngredientOrder, RandomOrder, RemoteBackend, SeededOrder,
};
pub use config::{CompletionSettings, ConfigError, ProviderSettings, RuntimeConfig};
pub use image::{ImageError, ImageInput, InlineImage};
pub use pipeline::{
    AnalysisError, AnalysisOutcome, AnalysisPipeline, AnalysisPipelineBuilder, AnalysisRequest,
};
pub use providers::{
    build_provider, ApiCredential, CompletionConfig, CompletionResponse, GeminiProvider,
    ProviderError, TokenUsage, VisionProvider, VisionRequest,
};

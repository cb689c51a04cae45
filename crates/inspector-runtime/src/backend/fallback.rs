//! Catalog-based fallback.
//!
//! The fallback "detects" the whole catalog list for the category, in an
//! order chosen by an [`IngredientOrder`], and scores it with the status
//! formula. It needs no network and cannot fail.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use inspector_core::{Catalog, Category, Ingredient, SafetyReport};

use super::{AnalysisBackend, BackendError, BackendKind, BackendReport};
use crate::image::ImageInput;

/// How fallback ingredients are ordered.
///
/// Implementations hold no mutable state; a seeded order builds a fresh
/// generator on every call so concurrent analyses stay independent.
pub trait IngredientOrder: Send + Sync + fmt::Debug {
    fn arrange(&self, ingredients: &mut [Ingredient]);
}

/// Shuffle with the thread-local generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOrder;

impl IngredientOrder for RandomOrder {
    fn arrange(&self, ingredients: &mut [Ingredient]) {
        ingredients.shuffle(&mut rand::thread_rng());
    }
}

/// Shuffle reproducibly from a fixed seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededOrder {
    seed: u64,
}

impl SeededOrder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl IngredientOrder for SeededOrder {
    fn arrange(&self, ingredients: &mut [Ingredient]) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        ingredients.shuffle(&mut rng);
    }
}

/// Keep catalog order.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogOrder;

impl IngredientOrder for CatalogOrder {
    fn arrange(&self, _ingredients: &mut [Ingredient]) {}
}

/// Deterministic backend answering from the catalog.
#[derive(Debug, Clone)]
pub struct FallbackBackend {
    catalog: Arc<Catalog>,
    order: Arc<dyn IngredientOrder>,
    delay: Duration,
}

impl FallbackBackend {
    /// Create a fallback over `catalog` with random order and no delay.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            order: Arc::new(RandomOrder),
            delay: Duration::ZERO,
        }
    }

    pub fn with_order(mut self, order: Arc<dyn IngredientOrder>) -> Self {
        self.order = order;
        self
    }

    /// Simulated processing time awaited before each report.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Build the report for `category` immediately.
    ///
    /// Unknown categories use the food list.
    pub fn generate(&self, category: &Category) -> SafetyReport {
        let (resolved, pool) = self.catalog.resolve(category);
        if resolved != category {
            tracing::debug!(
                requested = %category,
                resolved = %resolved,
                "Unknown category, using fallback list"
            );
        }

        let mut detected = pool.to_vec();
        self.order.arrange(&mut detected);
        SafetyReport::from_ingredients(detected)
    }

    /// Await the configured delay, then build the report.
    pub async fn report(&self, category: &Category) -> SafetyReport {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.generate(category)
    }
}

#[async_trait]
impl AnalysisBackend for FallbackBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn name(&self) -> &str {
        "catalog"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn analyze(
        &self,
        _image: &ImageInput,
        category: &Category,
    ) -> Result<BackendReport, BackendError> {
        Ok(BackendReport {
            report: self.report(category).await,
            source: BackendKind::Fallback,
            model: None,
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inspector_core::{summary_for, Status};
    use proptest::prelude::*;

    fn backend() -> FallbackBackend {
        FallbackBackend::new(Arc::new(Catalog::builtin()))
    }

    fn names(report: &SafetyReport) -> Vec<String> {
        report.ingredients.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_food_report_uses_whole_catalog() {
        let report = backend().with_order(Arc::new(CatalogOrder)).generate(&Category::food());

        assert_eq!(report.ingredients.len(), 7);
        assert_eq!(report.count(Status::Unsafe), 2);
        assert_eq!(report.count(Status::Moderate), 3);
        assert_eq!(report.score, 10);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.ingredients[0].name, "Water");
    }

    #[test]
    fn test_household_score() {
        let report = backend().generate(&Category::new("household"));
        assert_eq!(report.score, 60);
        assert_eq!(report.summary, "Moderate safety. Consume/Use with awareness.");
    }

    #[test]
    fn test_unknown_category_matches_food() {
        let fallback = backend().with_order(Arc::new(CatalogOrder));
        assert_eq!(
            fallback.generate(&Category::new("garden tools")),
            fallback.generate(&Category::food())
        );
    }

    #[test]
    fn test_seeded_order_is_reproducible() {
        let fallback = backend().with_order(Arc::new(SeededOrder::new(42)));
        let first = fallback.generate(&Category::food());
        for _ in 0..5 {
            assert_eq!(names(&fallback.generate(&Category::food())), names(&first));
        }
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let fallback = backend();
        let mut shuffled = names(&fallback.generate(&Category::new("cosmetics")));
        let mut expected: Vec<String> = Catalog::builtin()
            .ingredients(&Category::new("cosmetics"))
            .iter()
            .map(|i| i.name.clone())
            .collect();
        shuffled.sort();
        expected.sort();
        assert_eq!(shuffled, expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_awaits_delay() {
        let fallback = backend().with_delay(Duration::from_secs(2));
        let start = tokio::time::Instant::now();
        let report = fallback.report(&Category::food()).await;
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(report.score, 10);
    }

    #[tokio::test]
    async fn test_backend_trait_never_fails() {
        let fallback = backend();
        assert!(fallback.is_available().await);
        let answer = fallback
            .analyze(&ImageInput::bytes(vec![1]), &Category::new("baby"))
            .await
            .unwrap();
        assert_eq!(answer.source, BackendKind::Fallback);
        assert_eq!(answer.report.score, 90);
        assert!(answer.model.is_none());
    }

    proptest! {
        #[test]
        fn prop_fallback_reports_are_well_formed(category in "[a-z ]{0,12}", seed in any::<u64>()) {
            let catalog = Catalog::builtin();
            let category = Category::new(category);
            let fallback = FallbackBackend::new(Arc::new(catalog.clone()))
                .with_order(Arc::new(SeededOrder::new(seed)));
            let report = fallback.generate(&category);

            prop_assert!(report.score <= 100);
            prop_assert_eq!(report.summary.as_str(), summary_for(report.score));
            let (_, pool) = catalog.resolve(&category);
            prop_assert_eq!(report.ingredients.len(), pool.len());
            for ingredient in &report.ingredients {
                prop_assert!(pool.contains(ingredient));
            }
        }
    }
}

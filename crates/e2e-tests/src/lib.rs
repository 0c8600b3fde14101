//! End-to-end test infrastructure for the vector analogy solver.
//!
//! Provides a fixture corpus, a `TestHarness` wiring an `AnalogySolver` to a
//! `MockSearchService`, and wait helpers for the published watch state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::timeout;

use analogy_client::MockSearchService;
use analogy_core::{AnalogySolver, AnalogyState, QuerySlot, SearchSlot};
use analogy_types::{Item, ItemId, Operand, SignConvention};

/// Debounce used by every harness.
pub const DEBOUNCE: Duration = Duration::from_millis(300);

/// Upper bound for any single wait in a test.
pub const WAIT: Duration = Duration::from_secs(30);

/// Build a Wikipedia-style article.
pub fn article(id: i64, title: &str, vector: Vec<f32>) -> Item {
    Item::new(
        ItemId::Number(id),
        title,
        format!("{title} is an article about {title}."),
    )
    .with_url(format!(
        "https://en.wikipedia.org/wiki/{}",
        title.replace(' ', "_")
    ))
    .with_vector(vector)
}

/// Small geography corpus.
///
/// Dimensions: [capital, france, italy, germany].
pub fn geography_corpus() -> Vec<Item> {
    vec![
        article(1, "Paris", vec![1.0, 1.0, 0.0, 0.0]),
        article(2, "France", vec![0.0, 1.0, 0.0, 0.0]),
        article(3, "Rome", vec![1.0, 0.0, 1.0, 0.0]),
        article(4, "Italy", vec![0.0, 0.0, 1.0, 0.0]),
        article(5, "Berlin", vec![1.0, 0.0, 0.0, 1.0]),
        article(6, "Germany", vec![0.0, 0.0, 0.0, 1.0]),
        article(7, "Paris Hilton", vec![0.1, 0.0, 0.0, 0.0]),
    ]
}

/// Look up a fixture article by title.
pub fn fixture(title: &str) -> Item {
    geography_corpus()
        .into_iter()
        .find(|item| item.title == title)
        .unwrap_or_else(|| panic!("no fixture article titled {title}"))
}

/// `{"results": [...]}` body as returned by the deployed endpoints.
pub fn results_body(items: &[Item]) -> serde_json::Value {
    serde_json::json!({ "results": items })
}

/// Solver over the geography corpus.
pub struct TestHarness {
    pub service: Arc<MockSearchService>,
    pub solver: AnalogySolver,
}

impl TestHarness {
    /// Must be called from within a Tokio runtime.
    pub fn new(convention: SignConvention) -> Self {
        Self::with_service(MockSearchService::new(geography_corpus()), convention)
    }

    pub fn with_service(service: MockSearchService, convention: SignConvention) -> Self {
        let service = Arc::new(service);
        let solver = AnalogySolver::with_options(service.clone(), DEBOUNCE, convention);
        Self { service, solver }
    }

    pub fn slot(&self, operand: Operand) -> &SearchSlot {
        self.solver.slot(operand)
    }

    /// Type `text` into a slot, wait for options and pick the one titled `title`.
    pub async fn type_and_select(&self, operand: Operand, text: &str, title: &str) -> Item {
        let slot = self.slot(operand);
        slot.on_text_changed(text);

        let state = wait_for_slot(slot, |s| s.options.iter().any(|o| o.title == title)).await;
        let option = state
            .options
            .iter()
            .find(|o| o.title == title)
            .cloned()
            .expect("option present");
        slot.select_option(&option.identifier)
            .expect("option selectable");
        option
    }

    /// Wait until the resolver settles on a complete triple.
    pub async fn wait_for_resolution(&self) -> AnalogyState {
        let mut rx = self.solver.subscribe();
        wait_for_state(&mut rx, |s| s.is_complete() && !s.is_resolving).await
    }
}

/// Wait for a slot state matching `predicate`.
pub async fn wait_for_slot(
    slot: &SearchSlot,
    predicate: impl FnMut(&QuerySlot) -> bool,
) -> QuerySlot {
    let mut rx = slot.subscribe();
    let state = timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for slot state")
        .expect("slot closed")
        .clone();
    state
}

/// Wait for a resolver state matching `predicate`.
pub async fn wait_for_state(
    rx: &mut watch::Receiver<AnalogyState>,
    predicate: impl FnMut(&AnalogyState) -> bool,
) -> AnalogyState {
    let state = timeout(WAIT, rx.wait_for(predicate))
        .await
        .expect("timed out waiting for resolver state")
        .expect("resolver closed")
        .clone();
    state
}

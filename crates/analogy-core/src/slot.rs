//! Incremental search for one analogy operand.
//!
//! A `SearchSlot` turns keystrokes into debounced search requests and
//! publishes the freshest option list. Every dispatched request carries a
//! `RequestToken`; a response is applied only if its token is still the
//! slot's pending token, so a slow older response can never overwrite the
//! answer to a newer query.
//!
//! State is published through `tokio::sync::watch`: renderers subscribe to
//! the whole `QuerySlot`, the resolver subscribes to the selection only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use analogy_client::{ClientError, SearchService};
use analogy_types::{Item, ItemId, Operand};

use crate::debounce::Debouncer;
use crate::error::SolverError;

/// Identifies one dispatched search within a slot. Monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Raw sequence number.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What to show when a slot has no options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyOptions {
    /// A search is in flight
    Loading,
    /// The last search found nothing, or nothing was searched yet
    NoResults,
}

/// Published state of one slot.
#[derive(Debug, Clone, Default)]
pub struct QuerySlot {
    /// Text currently in the input
    pub raw_text: String,
    /// Options from the latest applied search
    pub options: Vec<Item>,
    /// Item chosen by the user, if any
    pub selected: Option<Item>,
    /// Whether a search for the current token is in flight
    pub is_loading: bool,
    /// Token of the in-flight search
    pub pending_token: Option<RequestToken>,
    /// Token of the last search whose response was applied, success or not
    pub settled_token: Option<RequestToken>,
}

impl QuerySlot {
    /// The "no options" affordance, or `None` when options are available.
    pub fn empty_options(&self) -> Option<EmptyOptions> {
        if !self.options.is_empty() {
            None
        } else if self.is_loading {
            Some(EmptyOptions::Loading)
        } else {
            Some(EmptyOptions::NoResults)
        }
    }
}

struct SlotShared {
    operand: Operand,
    state: watch::Sender<QuerySlot>,
    selection: watch::Sender<Option<Item>>,
    next_token: AtomicU64,
}

impl SlotShared {
    fn issue_token(&self) -> RequestToken {
        RequestToken(self.next_token.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn clear_selection(&self) {
        self.selection.send_if_modified(|selected| selected.take().is_some());
        self.state
            .send_if_modified(|slot| slot.selected.take().is_some());
    }

    fn apply_response(&self, token: RequestToken, outcome: Result<Vec<Item>, ClientError>) {
        let operand = self.operand;
        self.state.send_if_modified(|slot| {
            if slot.pending_token != Some(token) {
                debug!(
                    slot = %operand,
                    token = token.value(),
                    "Discarding stale search response"
                );
                return false;
            }

            slot.pending_token = None;
            slot.settled_token = Some(token);
            slot.is_loading = false;
            match outcome {
                Ok(items) => {
                    debug!(slot = %operand, token = token.value(), count = items.len(), "Applied search results");
                    slot.options = items;
                }
                Err(e) => {
                    warn!(slot = %operand, error = %e, "Search failed, keeping previous options");
                }
            }
            true
        });
    }
}

fn dispatch(shared: Arc<SlotShared>, service: Arc<dyn SearchService>, text: String) {
    let token = shared.issue_token();
    shared.state.send_modify(|slot| {
        slot.pending_token = Some(token);
        slot.is_loading = true;
    });
    debug!(slot = %shared.operand, token = token.value(), query = %text, "Dispatching search");

    tokio::spawn(async move {
        let outcome = service.search(&text).await;
        shared.apply_response(token, outcome);
    });
}

/// Debounced, race-safe search input for one operand.
///
/// Dropping the slot cancels its pending debounce timer; responses still in
/// flight land on a channel nobody reads.
pub struct SearchSlot {
    shared: Arc<SlotShared>,
    service: Arc<dyn SearchService>,
    debouncer: Debouncer,
}

impl SearchSlot {
    /// Create an empty slot.
    pub fn new(operand: Operand, service: Arc<dyn SearchService>, debounce: Duration) -> Self {
        let (state, _) = watch::channel(QuerySlot::default());
        let (selection, _) = watch::channel(None);
        Self {
            shared: Arc::new(SlotShared {
                operand,
                state,
                selection,
                next_token: AtomicU64::new(0),
            }),
            service,
            debouncer: Debouncer::new(debounce),
        }
    }

    /// Which operand this slot feeds.
    pub fn operand(&self) -> Operand {
        self.shared.operand
    }

    /// Subscribe to the full slot state.
    pub fn subscribe(&self) -> watch::Receiver<QuerySlot> {
        self.shared.state.subscribe()
    }

    /// Subscribe to the selected item only.
    pub fn subscribe_selection(&self) -> watch::Receiver<Option<Item>> {
        self.shared.selection.subscribe()
    }

    /// Current slot state.
    pub fn snapshot(&self) -> QuerySlot {
        self.shared.state.borrow().clone()
    }

    /// Record a keystroke.
    ///
    /// Clears the selection. Empty text clears the options synchronously,
    /// cancels the pending timer and invalidates any in-flight search.
    /// Otherwise (re)arms the debounce timer for `text`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_text_changed(&self, text: impl Into<String>) {
        let text = text.into();
        self.shared.clear_selection();

        if text.is_empty() {
            self.debouncer.cancel();
            self.shared.state.send_modify(|slot| {
                slot.raw_text.clear();
                slot.options.clear();
                slot.is_loading = false;
                slot.pending_token = None;
            });
            debug!(slot = %self.operand(), "Input cleared");
            return;
        }

        self.shared
            .state
            .send_modify(|slot| slot.raw_text.clone_from(&text));

        let shared = Arc::clone(&self.shared);
        let service = Arc::clone(&self.service);
        self.debouncer
            .schedule(move || dispatch(shared, service, text));
    }

    /// Select one of the current options by identifier.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::UnknownOption` if no current option has `id`;
    /// the slot is left unchanged.
    pub fn select_option(&self, id: &ItemId) -> Result<Item, SolverError> {
        let item = self
            .shared
            .state
            .borrow()
            .options
            .iter()
            .find(|option| &option.identifier == id)
            .cloned()
            .ok_or_else(|| SolverError::UnknownOption(id.clone()))?;

        self.apply_selection(item.clone());
        Ok(item)
    }

    /// Programmatically select `item`, e.g. a pre-filled default.
    pub fn preselect(&self, item: Item) {
        self.apply_selection(item);
    }

    fn apply_selection(&self, item: Item) {
        self.debouncer.cancel();
        let label = item.display_label();
        debug!(slot = %self.operand(), item = %item.identifier, "Option selected");

        self.shared.state.send_modify(|slot| {
            slot.raw_text = label;
            slot.options.clear();
            slot.is_loading = false;
            slot.pending_token = None;
            slot.selected = Some(item.clone());
        });
        self.shared.selection.send_replace(Some(item));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analogy_client::{GatedCalls, GatedSearchService, MockSearchService};
    use tokio::time::timeout;

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn item(id: i64, title: &str) -> Item {
        Item::new(ItemId::Number(id), title, format!("About {title}"))
            .with_url(format!("https://en.wikipedia.org/wiki/{title}"))
            .with_vector(vec![id as f32, 1.0])
    }

    async fn next_search(calls: &mut GatedCalls) -> analogy_client::PendingSearch {
        timeout(Duration::from_secs(10), calls.next())
            .await
            .expect("timed out waiting for a search call")
            .expect("service dropped")
            .into_search()
            .expect("expected a search call")
    }

    async fn wait_until(slot: &SearchSlot, predicate: impl FnMut(&QuerySlot) -> bool) -> QuerySlot {
        let mut rx = slot.subscribe();
        let state = timeout(Duration::from_secs(10), rx.wait_for(predicate))
            .await
            .expect("timed out waiting for slot state")
            .expect("slot dropped")
            .clone();
        state
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_keystrokes_issues_one_search_with_last_text() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);

        for text in ["p", "pa", "par", "pari", "paris"] {
            slot.on_text_changed(text);
            tokio::time::advance(Duration::from_millis(50)).await;
        }

        let call = next_search(&mut calls).await;
        assert_eq!(call.text, "paris");
        assert!(slot.snapshot().is_loading);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(calls.try_next().is_none());

        call.respond(Ok(vec![item(1, "Paris")]));
        let state = wait_until(&slot, |s| !s.is_loading).await;
        assert_eq!(state.options, vec![item(1, "Paris")]);
        assert_eq!(state.raw_text, "paris");
    }

    #[tokio::test(start_paused = true)]
    async fn test_keystrokes_outside_window_each_search() {
        let service = Arc::new(MockSearchService::new(vec![item(1, "Paris")]));
        let slot = SearchSlot::new(Operand::B, service.clone(), DEBOUNCE);

        slot.on_text_changed("pa");
        tokio::time::sleep(Duration::from_millis(400)).await;
        slot.on_text_changed("par");
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(service.search_calls(), 2);
        assert_eq!(slot.snapshot().options, vec![item(1, "Paris")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_never_overwrites_newer() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);

        slot.on_text_changed("lon");
        let first = next_search(&mut calls).await;

        slot.on_text_changed("london");
        let second = next_search(&mut calls).await;
        assert_eq!(first.text, "lon");
        assert_eq!(second.text, "london");

        second.respond(Ok(vec![item(2, "London")]));
        wait_until(&slot, |s| !s.is_loading).await;

        first.respond(Ok(vec![item(3, "Longitude"), item(4, "Lonely")]));
        settle().await;

        let state = slot.snapshot();
        assert_eq!(state.options, vec![item(2, "London")]);
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_older_response_before_newer_keeps_loading() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);

        slot.on_text_changed("ber");
        let first = next_search(&mut calls).await;
        slot.on_text_changed("berlin");
        let second = next_search(&mut calls).await;

        first.respond(Ok(vec![item(5, "Bermuda")]));
        settle().await;
        let state = slot.snapshot();
        assert!(state.options.is_empty());
        assert!(state.is_loading);
        assert_eq!(state.empty_options(), Some(EmptyOptions::Loading));

        second.respond(Ok(vec![item(6, "Berlin")]));
        let state = wait_until(&slot, |s| !s.is_loading).await;
        assert_eq!(state.options, vec![item(6, "Berlin")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_text_empties_options_without_request() {
        let service = Arc::new(MockSearchService::new(vec![item(1, "Paris")]));
        let slot = SearchSlot::new(Operand::C, service.clone(), DEBOUNCE);

        slot.on_text_changed("paris");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(slot.snapshot().options.len(), 1);
        assert_eq!(service.search_calls(), 1);

        slot.on_text_changed("pari");
        slot.on_text_changed("");

        let state = slot.snapshot();
        assert!(state.options.is_empty());
        assert!(state.raw_text.is_empty());
        assert!(!state.is_loading);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(service.search_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_text_discards_in_flight_response() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);

        slot.on_text_changed("rome");
        let call = next_search(&mut calls).await;
        slot.on_text_changed("");

        call.respond(Ok(vec![item(7, "Rome")]));
        settle().await;
        assert!(slot.snapshot().options.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_keeps_previous_options() {
        let service = Arc::new(MockSearchService::new(vec![item(1, "Paris")]));
        let slot = SearchSlot::new(Operand::A, service.clone(), DEBOUNCE);

        slot.on_text_changed("paris");
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(slot.snapshot().options, vec![item(1, "Paris")]);

        service.set_fail_search(true);
        slot.on_text_changed("parisian");
        tokio::time::sleep(Duration::from_millis(400)).await;

        let state = slot.snapshot();
        assert_eq!(state.options, vec![item(1, "Paris")]);
        assert!(!state.is_loading);
        assert_eq!(state.raw_text, "parisian");
        assert_eq!(service.search_calls(), 2);

        // No automatic retry.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(service.search_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_options_hint() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);
        assert_eq!(slot.snapshot().empty_options(), Some(EmptyOptions::NoResults));

        slot.on_text_changed("zzz");
        let call = next_search(&mut calls).await;
        assert_eq!(slot.snapshot().empty_options(), Some(EmptyOptions::Loading));

        call.respond(Ok(Vec::new()));
        let state = wait_until(&slot, |s| !s.is_loading).await;
        assert_eq!(state.empty_options(), Some(EmptyOptions::NoResults));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_option_sets_label_and_clears_options() {
        let service = Arc::new(MockSearchService::new(vec![
            item(1, "Paris"),
            item(2, "Paris_Hilton"),
        ]));
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);
        let mut selection = slot.subscribe_selection();

        slot.on_text_changed("paris");
        tokio::time::sleep(Duration::from_millis(400)).await;

        let chosen = slot.select_option(&ItemId::Number(2)).unwrap();
        assert_eq!(chosen.title, "Paris_Hilton");

        let state = slot.snapshot();
        assert_eq!(state.raw_text, "wiki/Paris_Hilton");
        assert!(state.options.is_empty());
        assert_eq!(state.selected, Some(item(2, "Paris_Hilton")));

        assert!(selection.has_changed().unwrap());
        assert_eq!(*selection.borrow_and_update(), Some(item(2, "Paris_Hilton")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_unknown_option_is_rejected() {
        let service = Arc::new(MockSearchService::new(vec![item(1, "Paris")]));
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);

        slot.on_text_changed("paris");
        tokio::time::sleep(Duration::from_millis(400)).await;

        let err = slot.select_option(&ItemId::Number(99)).unwrap_err();
        assert!(matches!(err, SolverError::UnknownOption(ItemId::Number(99))));
        assert_eq!(slot.snapshot().options.len(), 1);
        assert!(slot.snapshot().selected.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_clears_selection() {
        let service = Arc::new(MockSearchService::new(vec![item(1, "Paris")]));
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);
        let mut selection = slot.subscribe_selection();

        slot.preselect(item(1, "Paris"));
        assert_eq!(*selection.borrow_and_update(), Some(item(1, "Paris")));

        slot.on_text_changed("wiki/Pari");
        assert!(selection.has_changed().unwrap());
        assert_eq!(*selection.borrow_and_update(), None);
        assert!(slot.snapshot().selected.is_none());

        // Further keystrokes do not re-notify an already empty selection.
        slot.on_text_changed("wiki/Par");
        assert!(!selection.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_discards_in_flight_search() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::B, service, DEBOUNCE);

        slot.on_text_changed("oslo");
        let call = next_search(&mut calls).await;
        slot.preselect(item(8, "Oslo"));

        call.respond(Ok(vec![item(8, "Oslo"), item(9, "Oslo_Airport")]));
        settle().await;

        let state = slot.snapshot();
        assert!(state.options.is_empty());
        assert!(!state.is_loading);
        assert_eq!(state.selected, Some(item(8, "Oslo")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokens_increase_per_dispatch() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::A, service, DEBOUNCE);

        slot.on_text_changed("a");
        let _first = next_search(&mut calls).await;
        let first_token = slot.snapshot().pending_token.unwrap();

        slot.on_text_changed("ab");
        let _second = next_search(&mut calls).await;
        let second_token = slot.snapshot().pending_token.unwrap();

        assert!(second_token > first_token);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_token_tracks_applied_response() {
        let (service, mut calls) = GatedSearchService::new();
        let slot = SearchSlot::new(Operand::C, service, DEBOUNCE);
        assert!(slot.snapshot().settled_token.is_none());

        slot.on_text_changed("rome");
        let call = next_search(&mut calls).await;
        let pending = slot.snapshot().pending_token;
        assert!(pending.is_some());

        call.respond(Err(ClientError::Timeout));
        let state = wait_until(&slot, |s| s.settled_token.is_some()).await;
        assert_eq!(state.settled_token, pending);
        assert!(state.pending_token.is_none());
        assert_eq!(state.empty_options(), Some(EmptyOptions::NoResults));
    }
}

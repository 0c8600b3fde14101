//! Wiring of the three search slots to the resolver.
//!
//! The solver owns one `SearchSlot` per operand and a background task that
//! forwards every selection event to the `AnalogyResolver`. The task stops
//! when the solver is shut down or dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use analogy_client::SearchService;
use analogy_types::{Item, Operand, Settings, SignConvention};

use crate::resolver::{AnalogyResolver, AnalogyState};
use crate::slot::SearchSlot;

/// Three debounced search slots feeding one resolver.
pub struct AnalogySolver {
    slots: [SearchSlot; 3],
    resolver: Arc<AnalogyResolver>,
    shutdown_token: CancellationToken,
    observer: Option<JoinHandle<()>>,
}

impl AnalogySolver {
    /// Build a solver from loaded settings.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(service: Arc<dyn SearchService>, settings: &Settings) -> Self {
        Self::with_options(
            service,
            settings.debounce(),
            settings.analogy.sign_convention,
        )
    }

    /// Build a solver with an explicit debounce delay and sign convention.
    pub fn with_options(
        service: Arc<dyn SearchService>,
        debounce: Duration,
        convention: SignConvention,
    ) -> Self {
        let slots = Operand::ALL.map(|operand| {
            SearchSlot::new(operand, Arc::clone(&service), debounce)
        });
        let resolver = Arc::new(AnalogyResolver::new(service, convention));
        let shutdown_token = CancellationToken::new();

        let receivers = [
            slots[0].subscribe_selection(),
            slots[1].subscribe_selection(),
            slots[2].subscribe_selection(),
        ];
        let observer = tokio::spawn(forward_selections(
            receivers,
            Arc::clone(&resolver),
            shutdown_token.clone(),
        ));

        info!(
            debounce_ms = debounce.as_millis() as u64,
            convention = %convention,
            "Analogy solver started"
        );

        Self {
            slots,
            resolver,
            shutdown_token,
            observer: Some(observer),
        }
    }

    /// The search slot for `operand`.
    pub fn slot(&self, operand: Operand) -> &SearchSlot {
        &self.slots[operand.index()]
    }

    pub fn resolver(&self) -> &AnalogyResolver {
        &self.resolver
    }

    /// The configured sign convention.
    pub fn convention(&self) -> SignConvention {
        self.resolver.convention()
    }

    /// Subscribe to resolver state.
    pub fn subscribe(&self) -> watch::Receiver<AnalogyState> {
        self.resolver.subscribe()
    }

    /// Current resolver state.
    pub fn state(&self) -> AnalogyState {
        self.resolver.snapshot()
    }

    /// Select `item` for `operand` without going through a search.
    pub fn preselect(&self, operand: Operand, item: Item) {
        self.slot(operand).preselect(item);
    }

    /// Stop forwarding selections and wait for the observer task to finish.
    pub async fn shutdown(mut self) {
        self.shutdown_token.cancel();
        if let Some(observer) = self.observer.take() {
            let _ = observer.await;
        }
        info!("Analogy solver stopped");
    }
}

impl Drop for AnalogySolver {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
    }
}

async fn forward_selections(
    receivers: [watch::Receiver<Option<Item>>; 3],
    resolver: Arc<AnalogyResolver>,
    shutdown_token: CancellationToken,
) {
    let [mut a, mut b, mut c] = receivers;

    loop {
        let changed = tokio::select! {
            biased;
            _ = shutdown_token.cancelled() => break,
            changed = a.changed() => changed.map(|_| Operand::A),
            changed = b.changed() => changed.map(|_| Operand::B),
            changed = c.changed() => changed.map(|_| Operand::C),
        };

        let Ok(operand) = changed else {
            break;
        };

        let item = match operand {
            Operand::A => a.borrow_and_update().clone(),
            Operand::B => b.borrow_and_update().clone(),
            Operand::C => c.borrow_and_update().clone(),
        };
        debug!(slot = %operand, selected = item.is_some(), "Forwarding selection");
        resolver.set_operand(operand, item);
    }

    debug!("Selection observer stopped");
}

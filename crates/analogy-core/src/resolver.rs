//! Nearest-neighbour resolution of the analogy target.
//!
//! The resolver holds the three selected operands. Every operand event bumps
//! a generation counter; when all three operands are present the target
//! vector is computed and one `nearest` request is issued, tagged with that
//! generation. A response is applied only if no operand event happened
//! since, otherwise it is dropped.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use analogy_client::{ClientError, SearchService};
use analogy_types::{Item, Operand, SignConvention};

use crate::arithmetic;

/// Published resolver state.
#[derive(Debug, Clone)]
pub struct AnalogyState {
    pub a: Option<Item>,
    pub b: Option<Item>,
    pub c: Option<Item>,
    /// Latest resolved item, or the placeholder before the first resolution
    pub result: Item,
    /// Whether a request for the current operands is outstanding
    pub is_resolving: bool,
    generation: u64,
}

impl Default for AnalogyState {
    fn default() -> Self {
        Self {
            a: None,
            b: None,
            c: None,
            result: Item::placeholder(),
            is_resolving: false,
            generation: 0,
        }
    }
}

impl AnalogyState {
    /// The item selected for `operand`.
    pub fn operand(&self, operand: Operand) -> Option<&Item> {
        match operand {
            Operand::A => self.a.as_ref(),
            Operand::B => self.b.as_ref(),
            Operand::C => self.c.as_ref(),
        }
    }

    fn operand_mut(&mut self, operand: Operand) -> &mut Option<Item> {
        match operand {
            Operand::A => &mut self.a,
            Operand::B => &mut self.b,
            Operand::C => &mut self.c,
        }
    }

    /// Whether all three operands are selected.
    pub fn is_complete(&self) -> bool {
        self.a.is_some() && self.b.is_some() && self.c.is_some()
    }

    /// Whether a real result replaced the placeholder.
    pub fn has_result(&self) -> bool {
        !self.result.is_placeholder()
    }

    /// Number of operand events seen so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Resolves the analogy target whenever the operand triple is complete.
pub struct AnalogyResolver {
    service: Arc<dyn SearchService>,
    convention: SignConvention,
    state: Arc<watch::Sender<AnalogyState>>,
}

impl AnalogyResolver {
    /// Create a resolver showing the placeholder result.
    pub fn new(service: Arc<dyn SearchService>, convention: SignConvention) -> Self {
        let (state, _) = watch::channel(AnalogyState::default());
        info!(convention = %convention, "Analogy resolver ready");
        Self {
            service,
            convention,
            state: Arc::new(state),
        }
    }

    /// The configured sign convention.
    pub fn convention(&self) -> SignConvention {
        self.convention
    }

    /// Subscribe to resolver state.
    pub fn subscribe(&self) -> watch::Receiver<AnalogyState> {
        self.state.subscribe()
    }

    /// Current resolver state.
    pub fn snapshot(&self) -> AnalogyState {
        self.state.borrow().clone()
    }

    /// Record a selection event for one operand.
    ///
    /// Every event counts as a change, including re-selecting the same item,
    /// which is how a failed resolution is retried.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_operand(&self, operand: Operand, item: Option<Item>) {
        self.update(|state| *state.operand_mut(operand) = item);
    }

    /// Replace all three operands as a single event.
    pub fn set_operands(&self, a: Option<Item>, b: Option<Item>, c: Option<Item>) {
        self.update(|state| {
            state.a = a;
            state.b = b;
            state.c = c;
        });
    }

    fn update(&self, change: impl FnOnce(&mut AnalogyState)) {
        let convention = self.convention;
        let mut request = None;

        self.state.send_modify(|state| {
            change(state);
            state.generation += 1;

            let (Some(a), Some(b), Some(c)) = (&state.a, &state.b, &state.c) else {
                state.is_resolving = false;
                return;
            };

            match arithmetic::target_vector(convention, a, b, c) {
                Ok(target) => {
                    state.is_resolving = true;
                    request = Some((state.generation, target));
                }
                Err(e) => {
                    warn!(error = %e, "Cannot compute analogy target, keeping previous result");
                    state.is_resolving = false;
                }
            }
        });

        if let Some((generation, target)) = request {
            debug!(generation, dimension = target.len(), "Dispatching nearest request");
            let state = Arc::clone(&self.state);
            let service = Arc::clone(&self.service);
            tokio::spawn(async move {
                let outcome = service.nearest(&target).await;
                apply_resolution(&state, generation, outcome);
            });
        }
    }
}

fn apply_resolution(
    state: &watch::Sender<AnalogyState>,
    generation: u64,
    outcome: Result<Item, ClientError>,
) {
    state.send_if_modified(|state| {
        if state.generation != generation {
            debug!(
                generation,
                current = state.generation,
                "Discarding stale nearest response"
            );
            return false;
        }

        state.is_resolving = false;
        match outcome {
            Ok(item) => {
                debug!(generation, item = %item.identifier, "Analogy resolved");
                state.result = item;
            }
            Err(e) => {
                warn!(generation, error = %e, "Nearest lookup failed, keeping previous result");
            }
        }
        true
    });
}

//! Command implementations for `vector-analogies`.
//!
//! Each handler loads configuration (defaults -> file -> env -> CLI flags),
//! installs logging and then drives the client or the solver headlessly.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::time::timeout;
use tracing::info;

use analogy_client::{HttpSearchService, SearchService};
use analogy_core::{AnalogySolver, SearchSlot};
use analogy_types::{Item, Operand, Settings, SignConvention};

/// Number of content characters shown on a result card.
pub const SNIPPET_CHARS: usize = 750;

/// Load settings and apply CLI overrides.
pub fn load_settings(
    config_path: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    Ok(settings)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Logs go to stderr so command
/// output stays clean on stdout.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn build_service(settings: &Settings) -> Result<Arc<dyn SearchService>> {
    let service = HttpSearchService::from_settings(&settings.service)
        .context("Failed to build search client")?;
    Ok(Arc::new(service))
}

/// Upper bound for one round trip through the solver: the debounce delay
/// plus the transport timeout.
pub fn round_trip_limit(settings: &Settings) -> Duration {
    settings.debounce() + Duration::from_secs(settings.service.timeout_secs)
}

/// One line per option: identifier and display label.
pub fn format_options(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| format!("{}\t{}", item.identifier, item.display_label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render an item as a text card: title, snippet, url.
///
/// The snippet is the first 750 characters of the content followed by an
/// ellipsis, except for the placeholder which is shown in full.
pub fn render_card(item: &Item) -> String {
    let snippet: String = item.content.chars().take(SNIPPET_CHARS).collect();
    let ellipsis = if item.is_placeholder() { "" } else { "..." };

    format!(
        "{}\n\n{}{}\n\nRead more: {}",
        item.title, snippet, ellipsis, item.url
    )
}

/// Effective settings as TOML.
pub fn render_config(settings: &Settings) -> Result<String> {
    toml::to_string_pretty(settings).context("Failed to serialize configuration")
}

/// Type `text` into `slot`, wait for its search to settle and select the
/// first option.
pub async fn select_first_option(slot: &SearchSlot, text: &str, wait: Duration) -> Result<Item> {
    let operand = slot.operand();
    let mut rx = slot.subscribe();
    let before = rx.borrow_and_update().settled_token;

    slot.on_text_changed(text);

    let state = timeout(
        wait,
        rx.wait_for(|s| s.pending_token.is_none() && s.settled_token != before),
    )
    .await
    .with_context(|| format!("Timed out searching for '{text}' (operand {operand})"))?
    .context("Search slot closed")?
    .clone();

    let first = state
        .options
        .first()
        .cloned()
        .with_context(|| format!("No results for '{text}' (operand {operand})"))?;

    slot.select_option(&first.identifier)
        .context("Failed to select option")?;
    info!(slot = %operand, item = %first.identifier, title = %first.title, "Selected option");
    Ok(first)
}

/// Resolve an analogy headlessly through the full solver pipeline.
///
/// Each query is typed into its slot and its first option selected; the
/// resolved nearest item is returned.
pub async fn solve_analogy(
    service: Arc<dyn SearchService>,
    debounce: Duration,
    convention: SignConvention,
    queries: [&str; 3],
    wait: Duration,
) -> Result<Item> {
    let solver = AnalogySolver::with_options(service, debounce, convention);

    for (operand, text) in Operand::ALL.into_iter().zip(queries) {
        select_first_option(solver.slot(operand), text, wait).await?;
    }

    let mut rx = solver.subscribe();
    let state = timeout(wait, rx.wait_for(|s| s.is_complete() && !s.is_resolving))
        .await
        .context("Timed out waiting for the nearest item")?
        .context("Resolver closed")?
        .clone();

    solver.shutdown().await;

    if !state.has_result() {
        bail!("Could not resolve the analogy; rerun with --log-level debug for details");
    }
    Ok(state.result)
}

/// `search <TEXT>`
pub async fn handle_search(
    config_path: Option<&str>,
    log_level: Option<&str>,
    text: &str,
) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    init_logging(&settings)?;

    let service = build_service(&settings)?;
    let items = service.search(text).await.context("Search failed")?;

    if items.is_empty() {
        println!("No results for '{}'", text);
    } else {
        println!("{}", format_options(&items));
    }
    Ok(())
}

/// `solve --a --b --c`
pub async fn handle_solve(
    config_path: Option<&str>,
    log_level: Option<&str>,
    queries: [&str; 3],
    convention_override: Option<SignConvention>,
    debounce_override: Option<u64>,
) -> Result<()> {
    let mut settings = load_settings(config_path, log_level)?;
    if let Some(convention) = convention_override {
        settings.analogy.sign_convention = convention;
    }
    if let Some(debounce_ms) = debounce_override {
        settings.search.debounce_ms = debounce_ms;
    }
    settings.validate().context("Invalid configuration")?;
    init_logging(&settings)?;

    let convention = settings.analogy.sign_convention;
    let service = build_service(&settings)?;
    let item = solve_analogy(
        service,
        settings.debounce(),
        convention,
        queries,
        round_trip_limit(&settings),
    )
    .await?;

    println!("{}", convention.phrase());
    println!();
    println!("{}", render_card(&item));
    Ok(())
}

/// `config`
pub fn handle_config(config_path: Option<&str>, log_level: Option<&str>) -> Result<()> {
    let settings = load_settings(config_path, log_level)?;
    print!("{}", render_config(&settings)?);
    Ok(())
}

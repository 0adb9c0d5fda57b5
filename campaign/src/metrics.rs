//! Campaign metrics.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `giveaway_membership_checks_total{source}` - Membership answers by source (cache, lookup, fallback)
//! - `giveaway_membership_lookup_failures_total` - External lookups that errored
//! - `giveaway_tickets_granted_total{kind}` - Tickets granted (required, boost)
//! - `giveaway_ineligible_actions_total{reason}` - Refused participant actions
//! - `giveaway_render_fallbacks_total` - Rejected edits replaced by a new message
//! - `giveaway_guard_removals_total` - Non-members removed from the group
//! - `giveaway_dispatch_failures_total` - Updates that failed at the top of dispatch

use crate::channels::SocialChannel;
use crate::error::{CampaignError, IneligibleReason, Result};
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Where a membership answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckSource {
    /// Served from a fresh cache entry.
    Cache,
    /// Two external lookups were issued.
    Lookup,
    /// Combining the lookups failed; the last cached value (or `false`) was used.
    Fallback,
}

impl CheckSource {
    const fn label(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Lookup => "lookup",
            Self::Fallback => "fallback",
        }
    }
}

/// Register all metric descriptions.
///
/// Call once at startup, before anything is recorded.
pub fn register_metrics() {
    describe_counter!(
        "giveaway_membership_checks_total",
        "Membership answers by source (cache, lookup, fallback)"
    );
    describe_counter!(
        "giveaway_membership_lookup_failures_total",
        "External membership lookups that returned an error"
    );
    describe_counter!(
        "giveaway_tickets_granted_total",
        "Tickets granted by kind (required, boost)"
    );
    describe_counter!(
        "giveaway_ineligible_actions_total",
        "Participant actions refused by reason"
    );
    describe_counter!(
        "giveaway_render_fallbacks_total",
        "In-place edits that were rejected and replaced by a new message"
    );
    describe_counter!(
        "giveaway_guard_removals_total",
        "Non-members removed from the discussion group"
    );
    describe_counter!(
        "giveaway_dispatch_failures_total",
        "Updates whose handling failed unexpectedly"
    );

    tracing::info!("Campaign metrics registered");
}

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a tokio runtime.
///
/// # Errors
///
/// Returns [`CampaignError::Internal`] if a recorder is already installed or
/// the listener cannot be built.
pub fn install_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| CampaignError::Internal(format!("metrics exporter: {e}")))?;

    register_metrics();
    tracing::info!(%addr, "Metrics available at http://{addr}/metrics");
    Ok(())
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a membership answer.
pub fn record_membership_check(source: CheckSource) {
    metrics::counter!("giveaway_membership_checks_total", "source" => source.label()).increment(1);
}

/// Record a failed external lookup.
pub fn record_lookup_failure() {
    metrics::counter!("giveaway_membership_lookup_failures_total").increment(1);
}

/// Record the required-condition ticket.
pub fn record_required_granted() {
    metrics::counter!("giveaway_tickets_granted_total", "kind" => "required").increment(1);
    tracing::debug!("Recorded required ticket metric");
}

/// Record a boost ticket.
pub fn record_boost_granted(channel: SocialChannel) {
    metrics::counter!("giveaway_tickets_granted_total", "kind" => "boost").increment(1);
    tracing::debug!(channel = channel.as_str(), "Recorded boost ticket metric");
}

/// Record a refused action.
pub fn record_ineligible(reason: IneligibleReason) {
    metrics::counter!("giveaway_ineligible_actions_total", "reason" => reason.label()).increment(1);
}

/// Record an edit that fell back to a new message.
pub fn record_render_fallback() {
    metrics::counter!("giveaway_render_fallbacks_total").increment(1);
}

/// Record a soft removal by the group guard.
pub fn record_guard_removal() {
    metrics::counter!("giveaway_guard_removals_total").increment(1);
}

/// Record an update whose handling failed.
pub fn record_dispatch_failure() {
    metrics::counter!("giveaway_dispatch_failures_total").increment(1);
}

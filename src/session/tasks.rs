//! Poll, visibility and focus-refresh tasks.
//!
//! Tasks hold a `Weak` to the session core and exit once it is gone.

use super::controller::Inner;
use super::Visibility;

use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

pub(super) fn start_polling(inner: &Arc<Inner>) -> bool {
    if !inner.is_alive() {
        return false;
    }
    let Ok(runtime) = Handle::try_current() else {
        tracing::warn!("Cannot start polling outside a Tokio runtime");
        return false;
    };

    let mut tasks = inner.tasks();
    if tasks.poll.as_ref().is_some_and(|h| !h.is_finished()) {
        return false;
    }
    let period = inner.config().polling_interval;
    tasks.poll = Some(runtime.spawn(poll_loop(Arc::downgrade(inner), period)));
    tracing::debug!(interval_ms = period.as_millis() as u64, "Polling started");
    true
}

async fn poll_loop(weak: Weak<Inner>, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        let Some(inner) = weak.upgrade() else { break };
        if !inner.is_alive() {
            break;
        }
        if inner.is_loading() {
            tracing::debug!("Poll tick skipped, fetch in flight");
            continue;
        }
        let Some(query) = inner.last_query() else {
            tracing::debug!("Poll tick skipped, nothing fetched yet");
            continue;
        };

        tracing::debug!(instrument = %query.instrument(), "Poll tick");
        inner.fetch(query).await;
    }
}

pub(super) fn attach_visibility(inner: &Arc<Inner>, mut rx: mpsc::Receiver<Visibility>) -> bool {
    if !inner.is_alive() {
        return false;
    }
    let Ok(runtime) = Handle::try_current() else {
        tracing::warn!("Cannot watch visibility outside a Tokio runtime");
        return false;
    };

    let weak = Arc::downgrade(inner);
    let handle = runtime.spawn(async move {
        while let Some(visibility) = rx.recv().await {
            if visibility != Visibility::Visible {
                continue;
            }
            let Some(inner) = weak.upgrade() else { break };
            notify_focus(&inner);
        }
    });

    if let Some(previous) = inner.tasks().visibility.replace(handle) {
        previous.abort();
    }
    true
}

/// Start a background refresh when one is due. Skipped while a fetch is in flight.
pub(super) fn notify_focus(inner: &Arc<Inner>) -> bool {
    if !inner.is_alive() || inner.is_loading() || !inner.is_refresh_due() {
        return false;
    }
    let Some(query) = inner.last_query() else {
        return false;
    };
    let Ok(runtime) = Handle::try_current() else {
        return false;
    };

    tracing::debug!(instrument = %query.instrument(), "Refreshing stale data on focus");
    let weak = Arc::downgrade(inner);
    let handle = runtime.spawn(async move {
        if let Some(inner) = weak.upgrade() {
            inner.fetch(query).await;
        }
    });

    if let Some(previous) = inner.tasks().refresh.replace(handle) {
        previous.abort();
    }
    true
}

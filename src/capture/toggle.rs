/*!
 * Watcher for the host's native caption toggle.
 */

use log::{debug, warn};

use crate::host::{EventSource, HostPage, SubscriptionId};

/// Subscription to the toggle's enabled attribute
#[derive(Debug, Default)]
pub struct ToggleWatcher {
    subscription: Option<SubscriptionId>,
}

impl ToggleWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to toggle changes. A missing toggle leaves the watcher
    /// uninstalled.
    pub fn install<H: HostPage>(&mut self, host: &mut H) -> bool {
        self.uninstall(host);
        match host.subscribe(EventSource::CaptionToggleAttribute) {
            Ok(subscription) => {
                debug!("Caption toggle watcher installed ({:?})", subscription);
                self.subscription = Some(subscription);
                true
            }
            Err(e) => {
                warn!("Caption toggle not watched: {}", e);
                false
            }
        }
    }

    pub fn uninstall<H: HostPage>(&mut self, host: &mut H) {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe(subscription);
        }
    }

    pub fn is_installed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn owns(&self, subscription: SubscriptionId) -> bool {
        self.subscription == Some(subscription)
    }
}

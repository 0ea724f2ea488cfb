//! Configuration load/save/clear flows
//!
//! Saving configuration hands the device off to another network, so the
//! interesting part is what happens after the POST: the gateway variant
//! polls `/status` until the station interface reports a real address and
//! then points the caller at it; the sensor variant follows a redirect the
//! firmware includes in its response. Either way the submit control is
//! restored in every outcome, navigation or not.

use crate::client::models::{ConfigForm, AP_DEFAULT_IP};
use crate::client::DeviceClient;
use crate::controller::{DashboardEvent, DashboardVariant};
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Timing knobs for the post-save reconnect handshake
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    /// Cadence of the post-save `/status` polls (gateway variant)
    pub status_poll_interval: Duration,

    /// Hard wall-clock deadline for the reconnect wait
    pub deadline: Duration,

    /// Delay the caller should apply before following a redirect, giving
    /// the device time to finish switching networks
    pub redirect_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            status_poll_interval: Duration::from_secs(2),
            deadline: Duration::from_secs(60),
            redirect_delay: Duration::from_millis(1500),
        }
    }
}

/// Where the caller should take the browser/session next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Navigate to `url` after waiting `after`
    Redirect { url: String, after: Duration },

    /// Return to the dashboard home view (device restarts in place)
    ReturnHome,
}

/// Outcome of a configuration save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The device stored the configuration
    Saved { navigation: Navigation },

    /// The device stored the configuration but never reported a station
    /// address before the deadline; the user must find the device manually
    TimedOut,

    /// Communication error; nothing was navigated
    Failed,
}

/// Outcome of a configuration clear
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// Configuration wiped; navigation target if one is known
    Cleared { navigation: Option<Navigation> },

    /// Communication error
    Failed,
}

/// Configuration synchronization flows for one dashboard session
pub struct ConfigSync {
    client: Arc<dyn DeviceClient>,
    variant: DashboardVariant,
    policy: ReconnectPolicy,
    events: broadcast::Sender<DashboardEvent>,
}

impl ConfigSync {
    /// Standalone instance with its own event channel.
    pub fn new(client: Arc<dyn DeviceClient>, variant: DashboardVariant) -> Self {
        let (events, _) = broadcast::channel(64);
        Self::with_events(client, variant, events)
    }

    /// Instance sharing a dashboard controller's event channel, so the
    /// submit-control events land next to the poll updates.
    pub fn with_events(
        client: Arc<dyn DeviceClient>,
        variant: DashboardVariant,
        events: broadcast::Sender<DashboardEvent>,
    ) -> Self {
        Self {
            client,
            variant,
            policy: ReconnectPolicy::default(),
            events,
        }
    }

    /// Override the reconnect timing.
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }

    /// Fetch the remote configuration into a fresh form. Fields the device
    /// does not return stay at their defaults.
    pub async fn load(&self) -> Result<ConfigForm> {
        let cfg = self.client.load_config().await?;
        let mut form = ConfigForm::default();
        form.apply(&cfg);
        Ok(form)
    }

    /// Submit the form and run the variant's post-save handshake.
    ///
    /// `SaveStarted` is emitted first and `SaveFinished` last, in every
    /// outcome; a renderer disabling its submit control on the former can
    /// rely on the latter even when the outcome carries a redirect.
    pub async fn save(&self, form: &ConfigForm) -> SaveOutcome {
        self.emit(DashboardEvent::SaveStarted);
        let outcome = self.save_inner(form).await;
        self.emit(DashboardEvent::SaveFinished);
        outcome
    }

    async fn save_inner(&self, form: &ConfigForm) -> SaveOutcome {
        let response = match self.client.save_config(form).await {
            Ok(response) => response,
            Err(e) => {
                warn!("config save failed: {e}");
                return SaveOutcome::Failed;
            }
        };
        self.emit(DashboardEvent::ConfigAccepted);

        match self.variant {
            DashboardVariant::Gateway => {
                info!("configuration saved, waiting for the station address");
                self.await_station_address().await
            }
            DashboardVariant::Sensor => match response.next_url {
                Some(url) => SaveOutcome::Saved {
                    navigation: Navigation::Redirect {
                        url,
                        after: self.policy.redirect_delay,
                    },
                },
                // no redirect means the device restarts where it is
                None => SaveOutcome::Saved {
                    navigation: Navigation::ReturnHome,
                },
            },
        }
    }

    /// Poll `/status` until the device joins the configured network and
    /// reports a usable address, or the deadline passes.
    async fn await_station_address(&self) -> SaveOutcome {
        let deadline = tokio::time::sleep(self.policy.deadline);
        tokio::pin!(deadline);
        let mut ticker = interval_at(
            Instant::now() + self.policy.status_poll_interval,
            self.policy.status_poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    warn!(
                        "no station address within {:?}, manual navigation required",
                        self.policy.deadline
                    );
                    return SaveOutcome::TimedOut;
                }
                _ = ticker.tick() => {
                    match self.client.status().await {
                        Ok(status) if status.wifi_connected => {
                            if let Some(ip) = status.station_address() {
                                info!("device reachable at {ip}");
                                return SaveOutcome::Saved {
                                    navigation: Navigation::Redirect {
                                        url: format!("http://{ip}/"),
                                        after: Duration::ZERO,
                                    },
                                };
                            }
                        }
                        Ok(_) => {}
                        // expected while the device switches networks
                        Err(e) => debug!("status poll during reconnect failed: {e}"),
                    }
                }
            }
        }
    }

    /// Wipe the stored configuration. The caller is responsible for having
    /// confirmed the action with the user.
    pub async fn clear(&self) -> ClearOutcome {
        match self.client.clear_config().await {
            Err(e) => {
                warn!("config clear failed: {e}");
                ClearOutcome::Failed
            }
            Ok(response) => {
                let navigation = match self.variant {
                    // the gateway always falls back to its AP address
                    DashboardVariant::Gateway => Some(Navigation::Redirect {
                        url: format!("http://{AP_DEFAULT_IP}/"),
                        after: self.policy.redirect_delay,
                    }),
                    DashboardVariant::Sensor => {
                        response.ap_url.map(|url| Navigation::Redirect {
                            url,
                            after: self.policy.redirect_delay,
                        })
                    }
                };
                ClearOutcome::Cleared { navigation }
            }
        }
    }

    fn emit(&self, event: DashboardEvent) {
        let _ = self.events.send(event);
    }
}

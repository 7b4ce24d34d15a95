// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Connection Supervisor
//!
//! Owns the lifecycle of the single store connection: startup connect with
//! linear backoff, on-demand reconnect for request handlers, a delayed
//! one-shot reconnect after socket loss, and a periodic health ping.
//!
//! ## Attempt policy
//! | Caller | Attempts | Backoff |
//! |--------|----------|---------|
//! | `connect(n)` (startup) | up to `n` | `attempt * increment` between attempts |
//! | `ensure_connection()` | 1, or wait for the in-flight one | none |
//! | reconnect after loss | 1, after `reconnect_delay` | none |
//!
//! The state lives in a `watch` channel. An attempt is claimed by flipping
//! `disconnected → connecting`, so at most one attempt is ever in flight;
//! concurrent callers wait on the channel instead of dialing again.
//!
//! Nothing here returns an error or panics. Failures are classified and
//! logged, published as `ConnectionEvent::Error`, and reported as `false`.

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::config::ServerConfig;
use crate::domain::connection::{redact_uri, ConnectionEvent, ConnectionState, FailureKind};
use crate::domain::store::{ConnectOptions, StoreDriver};
use crate::infrastructure::event_bus::EventBus;

#[derive(Debug, Clone)]
pub struct SupervisorSettings {
    pub uri: Option<String>,
    pub backoff_increment: Duration,
    pub wait_timeout: Duration,
    pub reconnect_delay: Duration,
    pub health_interval: Duration,
    pub options: ConnectOptions,
}

impl SupervisorSettings {
    pub fn from_config(config: &ServerConfig, uri: Option<String>) -> Self {
        Self {
            uri,
            backoff_increment: config.connection.backoff_increment(),
            wait_timeout: config.connection.wait_timeout(),
            reconnect_delay: config.connection.reconnect_delay(),
            health_interval: config.connection.health_interval(),
            options: ConnectOptions::default(),
        }
    }
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self::from_config(&ServerConfig::default(), None)
    }
}

/// A claimed attempt. Dropping it unresolved, e.g. when the request that
/// started the attempt is cancelled, hands the slot back as `disconnected`.
struct AttemptSlot<'a> {
    state: &'a watch::Sender<ConnectionState>,
    armed: bool,
}

impl<'a> AttemptSlot<'a> {
    fn claim(state: &'a watch::Sender<ConnectionState>) -> Option<Self> {
        let claimed = state.send_if_modified(|state| {
            if *state == ConnectionState::Disconnected {
                *state = ConnectionState::Connecting;
                true
            } else {
                false
            }
        });
        claimed.then(|| Self { state, armed: true })
    }

    fn resolve(mut self, to: ConnectionState) {
        self.armed = false;
        self.state.send_replace(to);
    }
}

impl Drop for AttemptSlot<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let released = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connecting {
                *state = ConnectionState::Disconnected;
                true
            } else {
                false
            }
        });
        if released {
            warn!("Store connection attempt cancelled before it resolved");
        }
    }
}

enum AttemptOutcome {
    Connected,
    Failed,
    /// Another caller holds the attempt.
    InFlight,
}

pub struct ConnectionSupervisor {
    driver: Arc<dyn StoreDriver>,
    settings: SupervisorSettings,
    state: watch::Sender<ConnectionState>,
    events: EventBus,
    has_connected: AtomicBool,
    reconnect_pending: AtomicBool,
}

impl ConnectionSupervisor {
    pub fn new(driver: Arc<dyn StoreDriver>, settings: SupervisorSettings, events: EventBus) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            driver,
            settings,
            state,
            events,
            has_connected: AtomicBool::new(false),
            reconnect_pending: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch-style subscription to state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn uri(&self) -> Option<&str> {
        self.settings.uri.as_deref()
    }

    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// Connects with up to `max_attempts` tries, sleeping `attempt * increment`
    /// between them. Returns `true` as soon as the store is live.
    /// Without a configured URI there is nothing to retry: one `NotConfigured`
    /// failure is reported and `false` returned at once.
    pub async fn connect(&self, max_attempts: u32) -> bool {
        if self.state() == ConnectionState::Connected {
            debug!("Store already connected");
            return true;
        }

        match &self.settings.uri {
            Some(uri) => info!(uri = %redact_uri(uri), "Attempting to connect to the store"),
            None => {
                self.report_failure(1, FailureKind::NotConfigured, "database URI is not set");
                return false;
            }
        }

        for attempt in 1..=max_attempts {
            match self.attempt(attempt).await {
                AttemptOutcome::Connected => return true,
                AttemptOutcome::InFlight => {
                    if self.wait_for_resolution().await {
                        return true;
                    }
                }
                AttemptOutcome::Failed => {}
            }

            if attempt < max_attempts {
                let wait = self.settings.backoff_increment * attempt;
                info!(
                    attempt,
                    max_attempts,
                    "Retrying store connection in {}s",
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
            }
        }

        error!(
            max_attempts,
            "All store connection attempts failed; continuing without a database"
        );
        false
    }

    /// Returns whether the store is usable right now, making at most one
    /// connect attempt and never waiting longer than the wait timeout for
    /// somebody else's attempt.
    pub async fn ensure_connection(&self) -> bool {
        match self.state() {
            ConnectionState::Connected => true,
            ConnectionState::Connecting => self.wait_for_resolution().await,
            ConnectionState::Disconnected => {
                debug!("Store disconnected, attempting to reconnect");
                match self.attempt(1).await {
                    AttemptOutcome::Connected => true,
                    AttemptOutcome::Failed => false,
                    AttemptOutcome::InFlight => self.wait_for_resolution().await,
                }
            }
        }
    }

    /// Marks a live connection as lost and schedules one reconnect.
    /// Ignored unless the state was `connected`.
    pub fn handle_disconnect(self: &Arc<Self>) {
        let lost = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Connected {
                *state = ConnectionState::Disconnected;
                true
            } else {
                false
            }
        });
        if !lost {
            return;
        }

        warn!(
            "Store disconnected, reconnecting in {}s",
            self.settings.reconnect_delay.as_secs_f64()
        );
        metrics::counter!("schoolhouse_store_disconnects_total").increment(1);
        metrics::gauge!("schoolhouse_store_connected").set(0.0);
        self.events.publish(ConnectionEvent::Disconnected { at: Utc::now() });
        self.schedule_reconnect();
    }

    /// Spawns the periodic health ping. A failed ping counts as socket loss.
    pub fn spawn_health_monitor(self: &Arc<Self>) -> JoinHandle<()> {
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            let period = supervisor.settings.health_interval;
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            loop {
                ticker.tick().await;
                supervisor.check_health().await;
            }
        })
    }

    /// Pings the store if it is believed connected; a failed or timed-out
    /// ping is handled as socket loss. Returns whether the store answered.
    pub async fn check_health(self: &Arc<Self>) -> bool {
        if self.state() != ConnectionState::Connected {
            return false;
        }
        let ping =
            tokio::time::timeout(self.settings.options.server_selection_timeout, self.driver.ping())
                .await;
        match ping {
            Ok(Ok(())) => {
                debug!("Store health ping ok");
                true
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Store health ping failed");
                self.handle_disconnect();
                false
            }
            Err(_) => {
                warn!("Store health ping timed out");
                self.handle_disconnect();
                false
            }
        }
    }

    /// Releases the connection without scheduling a reconnect.
    pub async fn shutdown(&self) {
        self.driver.disconnect().await;
        self.state.send_replace(ConnectionState::Disconnected);
        info!("Store connection closed");
    }

    fn schedule_reconnect(self: &Arc<Self>) {
        if self.reconnect_pending.swap(true, Ordering::SeqCst) {
            return;
        }
        let supervisor = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(supervisor.settings.reconnect_delay).await;
            supervisor.reconnect_pending.store(false, Ordering::SeqCst);
            if supervisor.state() != ConnectionState::Disconnected {
                debug!("Scheduled reconnect skipped, state is {}", supervisor.state());
                return;
            }
            if let AttemptOutcome::Failed = supervisor.attempt(1).await {
                error!("Reconnection failed");
            }
        });
    }

    async fn wait_for_resolution(&self) -> bool {
        let mut rx = self.state.subscribe();
        let waited = tokio::time::timeout(
            self.settings.wait_timeout,
            rx.wait_for(|state| *state != ConnectionState::Connecting),
        )
        .await;
        match waited {
            Ok(Ok(state)) => *state == ConnectionState::Connected,
            Ok(Err(_)) => false,
            Err(_) => {
                warn!(
                    "Timed out after {}s waiting for the store connection",
                    self.settings.wait_timeout.as_secs_f64()
                );
                false
            }
        }
    }

    async fn attempt(&self, attempt: u32) -> AttemptOutcome {
        let Some(uri) = self.settings.uri.as_deref() else {
            self.report_failure(attempt, FailureKind::NotConfigured, "database URI is not set");
            return AttemptOutcome::Failed;
        };

        let Some(slot) = AttemptSlot::claim(&self.state) else {
            return match self.state() {
                ConnectionState::Connected => AttemptOutcome::Connected,
                _ => AttemptOutcome::InFlight,
            };
        };

        metrics::counter!("schoolhouse_store_connect_attempts_total").increment(1);
        let options = &self.settings.options;
        let result =
            tokio::time::timeout(options.server_selection_timeout, self.driver.connect(uri, options))
                .await;

        match result {
            Ok(Ok(())) => {
                slot.resolve(ConnectionState::Connected);
                metrics::counter!("schoolhouse_store_connect_success_total").increment(1);
                metrics::gauge!("schoolhouse_store_connected").set(1.0);
                info!(attempt, uri = %redact_uri(uri), "Store connected");
                let now = Utc::now();
                self.events.publish(ConnectionEvent::Connected { attempt, at: now });
                if self.has_connected.swap(true, Ordering::SeqCst) {
                    info!("Store reconnected");
                    self.events.publish(ConnectionEvent::Reconnected { at: now });
                }
                AttemptOutcome::Connected
            }
            Ok(Err(e)) => {
                slot.resolve(ConnectionState::Disconnected);
                let message = e.to_string();
                self.report_failure(attempt, FailureKind::classify(&message), &message);
                AttemptOutcome::Failed
            }
            Err(_) => {
                slot.resolve(ConnectionState::Disconnected);
                let message = format!(
                    "connection attempt timed out after {}s",
                    options.server_selection_timeout.as_secs_f64()
                );
                self.report_failure(attempt, FailureKind::Timeout, &message);
                AttemptOutcome::Failed
            }
        }
    }

    fn report_failure(&self, attempt: u32, kind: FailureKind, message: &str) {
        metrics::counter!("schoolhouse_store_connect_failures_total", "kind" => kind.to_string())
            .increment(1);
        warn!(attempt, kind = %kind, error = %message, "Store connection attempt failed");
        warn!("{}", kind.hint());
        self.events.publish(ConnectionEvent::Error {
            attempt,
            kind,
            message: message.to_string(),
            at: Utc::now(),
        });
    }
}

//! Session Driver
//!
//! Owns one [`QuizSession`] on a tokio task. Player commands arrive on an mpsc
//! channel, the session is ticked on a fixed interval, and every emitted event
//! is forwarded in order on an outgoing channel.
//!
//! Commands take priority over ticks within one loop turn, so a submit that
//! arrives together with the expiring tick resolves as a submit.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::core::clock::{Clock, Millis};
use crate::core::geo::LatLng;
use crate::game::country::ContinentFilter;
use crate::game::events::QuizEvent;
use crate::game::hints::Viewport;
use crate::game::sequencer::SelectionMode;
use crate::game::session::QuizSession;

/// Driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Tick period in milliseconds.
    pub tick_interval_ms: u64,
    /// Capacity of the command and event channels.
    pub event_buffer: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            event_buffer: 256,
        }
    }
}

impl DriverConfig {
    /// Tick period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Driver failures.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// The event receiver was dropped.
    #[error("event channel closed")]
    EventChannelClosed,
}

/// Input from the player's side.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Start (or restart) a session.
    Start {
        /// Randomness source.
        mode: SelectionMode,
        /// Continent restriction.
        filter: ContinentFilter,
    },
    /// Map click at a point.
    Click(LatLng),
    /// Shortlist panel pick.
    PanelPick(String),
    /// Pointer moved or pressed.
    Activity,
    /// View changed.
    Viewport(Viewport),
    /// Hints on or off.
    SetHints(bool),
    /// Submit the pending selection.
    Submit,
    /// Continue after a round result.
    NextRound,
    /// Abandon the session.
    Leave,
}

/// Runs one session against a clock.
pub struct SessionDriver<C: Clock> {
    session: QuizSession,
    clock: C,
    config: DriverConfig,
}

impl<C: Clock + 'static> SessionDriver<C> {
    /// Wrap a session.
    pub fn new(session: QuizSession, clock: C, config: DriverConfig) -> Self {
        Self { session, clock, config }
    }

    /// Spawn onto the current runtime.
    ///
    /// Returns the command sender, the event receiver and the task handle. The
    /// task ends when the command sender is dropped and hands the session back.
    pub fn spawn(
        self,
    ) -> (
        mpsc::Sender<PlayerCommand>,
        mpsc::Receiver<QuizEvent>,
        JoinHandle<Result<QuizSession, DriverError>>,
    ) {
        let (command_tx, command_rx) = mpsc::channel(self.config.event_buffer);
        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer);
        let handle = tokio::spawn(self.run(command_rx, event_tx));
        (command_tx, event_rx, handle)
    }

    /// Drive the session until the command channel closes.
    ///
    /// Closing the command channel mid-session counts as leaving it.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<PlayerCommand>,
        events: mpsc::Sender<QuizEvent>,
    ) -> Result<QuizSession, DriverError> {
        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Session driver {} running", self.session.id());

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => {
                    let now = self.clock.now_ms();
                    match command {
                        Some(command) => self.apply(command, now),
                        None => {
                            self.session.leave(now);
                            Self::forward(&events, self.session.take_events()).await?;
                            break;
                        }
                    }
                    Self::forward(&events, self.session.take_events()).await?;
                }

                _ = ticker.tick() => {
                    let result = self.session.tick(self.clock.now_ms());
                    if result.timed_out {
                        debug!("Round {} timed out", self.session.round());
                    }
                    Self::forward(&events, result.events).await?;
                }
            }
        }

        info!("Session driver {} stopped", self.session.id());
        Ok(self.session)
    }

    fn apply(&mut self, command: PlayerCommand, now: Millis) {
        let session = &mut self.session;
        let outcome = match command {
            PlayerCommand::Start { mode, filter } => {
                session.start(mode, filter, now);
                Ok(())
            }
            PlayerCommand::Click(point) => session.select_at(point, now).map(|_| ()),
            PlayerCommand::PanelPick(code) => session.select_from_panel(&code, now),
            PlayerCommand::Activity => {
                session.record_activity(now);
                Ok(())
            }
            PlayerCommand::Viewport(viewport) => {
                session.update_viewport(viewport);
                Ok(())
            }
            PlayerCommand::SetHints(enabled) => {
                session.set_hints_enabled(enabled, now);
                Ok(())
            }
            PlayerCommand::Submit => {
                session.submit(now);
                Ok(())
            }
            PlayerCommand::NextRound => session.next_round(now),
            PlayerCommand::Leave => {
                session.leave(now);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            warn!("Command rejected: {}", e);
        }
    }

    async fn forward(events: &mpsc::Sender<QuizEvent>, batch: Vec<QuizEvent>) -> Result<(), DriverError> {
        for event in batch {
            events.send(event).await.map_err(|_| DriverError::EventChannelClosed)?;
        }
        Ok(())
    }
}

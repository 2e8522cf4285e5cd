//! Simulated reader session.
//!
//! Runs a session against the mock reader: activate, one swipe request per
//! payload, deactivate. Every operation status and published event becomes
//! one output line.

use anyhow::Result;
use serde::Serialize;
use swipekit_hardware::mock::MockConnector;
use swipekit_session::{DomainEvent, EventEnvelope, ReaderSession, SessionConfig, SwipeOutcome};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

/// One line of simulator output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Line {
    /// Result of a session operation.
    Status {
        operation: &'static str,
        status: String,
    },

    /// A published event.
    Event(EventEnvelope),
}

impl Line {
    fn status(operation: &'static str, status: impl Into<String>) -> Self {
        Self::Status {
            operation,
            status: status.into(),
        }
    }
}

/// Simulation parameters.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    /// Payloads swiped in order, one swipe request each.
    pub swipes: Vec<String>,

    /// Start with no reader attached.
    pub no_reader: bool,
}

impl Simulation {
    /// Run the simulation and collect its output.
    pub async fn run(&self, config: SessionConfig) -> Result<Vec<Line>> {
        let (connector, reader) = MockConnector::new();
        if self.no_reader {
            reader.detach_reader();
        }

        let session = ReaderSession::spawn(connector, config)?;
        let mut events = session.subscribe();
        let mut lines = Vec::new();

        let activation = session.activate().await?;
        info!(status = activation.as_status(), "Simulated reader activated");
        lines.push(Line::status("activate", activation.as_status()));
        collect(&session, &mut events, &mut lines).await?;

        for payload in &self.swipes {
            match session.request_swipe().await {
                Ok(SwipeOutcome::Started) => {
                    lines.push(Line::status("request_swipe", SwipeOutcome::Started.as_status()));
                    debug!(bytes = payload.len(), "Presenting swipe");
                    reader.present_swipe(payload.clone().into_bytes())?;
                }
                Ok(outcome) => lines.push(Line::status("request_swipe", outcome.as_status())),
                Err(e) => return Err(e.into()),
            }
            collect(&session, &mut events, &mut lines).await?;
        }

        let deactivation = session.deactivate().await;
        lines.push(Line::status("deactivate", deactivation.as_status()));
        collect(&session, &mut events, &mut lines).await?;

        session.shutdown().await;
        Ok(lines)
    }
}

/// Wait for the worker to publish pending events and append them.
async fn collect(
    session: &ReaderSession,
    events: &mut UnboundedReceiver<DomainEvent>,
    lines: &mut Vec<Line>,
) -> Result<()> {
    session.state().await?;
    while let Ok(event) = events.try_recv() {
        lines.push(Line::Event(session.envelope(&event)));
    }
    Ok(())
}

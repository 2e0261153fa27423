//! Report state slots shared by overlapping analysis invocations.
//!
//! Every invocation takes a [`Ticket`] on start and publishes its outcome on
//! completion. Whether a superseded invocation may still overwrite the
//! displayed state is decided by [`SupersededResults`].

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{OptimizerError, OptimizerResult};
use crate::models::{ErrorView, OptimizationReport, ReportSnapshot};

/// Policy for completions that belong to an older invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SupersededResults {
    /// Only the newest invocation may publish
    #[default]
    Discard,
    /// Whichever invocation resolves last is displayed
    LastWriteWins,
}

/// Generation number of one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct Slots {
    latest: u64,
    loading: bool,
    displayed: Option<u64>,
    report: Option<OptimizationReport>,
    error: Option<ErrorView>,
}

impl Slots {
    fn publish(&mut self, ticket: Ticket, outcome: &OptimizerResult<OptimizationReport>) {
        self.loading = false;
        match outcome {
            Ok(report) => {
                self.report = Some(report.clone());
                self.error = None;
            }
            Err(err) => {
                self.report = None;
                self.error = Some(ErrorView::from(err));
            }
        }
        self.displayed = Some(ticket.0);
    }
}

#[derive(Debug, Default)]
pub struct ReportState {
    policy: SupersededResults,
    slots: Mutex<Slots>,
}

impl ReportState {
    pub fn new(policy: SupersededResults) -> Self {
        Self {
            policy,
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn policy(&self) -> SupersededResults {
        self.policy
    }

    /// Start an invocation: clears the previous report and error
    pub fn begin(&self) -> Ticket {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.latest += 1;
        slots.loading = true;
        slots.report = None;
        slots.error = None;
        slots.displayed = None;
        Ticket(slots.latest)
    }

    /// Publish an outcome. Returns `false` when the outcome was dropped.
    pub fn complete(&self, ticket: Ticket, outcome: &OptimizerResult<OptimizationReport>) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        let is_latest = ticket.0 == slots.latest;

        if self.policy == SupersededResults::Discard && !is_latest {
            tracing::debug!(
                ticket = ticket.0,
                latest = slots.latest,
                "Discarding superseded analysis result"
            );
            return false;
        }

        slots.publish(ticket, outcome);
        true
    }

    /// Start an invocation whose outcome is published even if the caller
    /// is dropped before it finishes
    pub fn track(&self) -> InFlight<'_> {
        InFlight {
            state: self,
            ticket: Some(self.begin()),
        }
    }

    /// Resolve an invocation that will never complete. Only the newest
    /// invocation can still hold the loading flag, so older tickets are
    /// ignored under either policy.
    pub fn abandon(&self, ticket: Ticket) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        if ticket.0 != slots.latest || !slots.loading {
            return false;
        }

        tracing::warn!(ticket = ticket.0, "Analysis abandoned before completion");
        slots.publish(
            ticket,
            &Err(OptimizerError::AnalysisFailed(
                "analysis was cancelled before it finished".to_string(),
            )),
        );
        true
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        ReportSnapshot {
            loading: slots.loading,
            displayed_ticket: slots.displayed,
            report: slots.report.clone(),
            error: slots.error.clone(),
        }
    }
}

/// An invocation in progress. Dropping it unfinished abandons the ticket.
#[derive(Debug)]
pub struct InFlight<'a> {
    state: &'a ReportState,
    ticket: Option<Ticket>,
}

impl InFlight<'_> {
    pub fn ticket(&self) -> Option<Ticket> {
        self.ticket
    }

    pub fn finish(mut self, outcome: &OptimizerResult<OptimizationReport>) -> bool {
        match self.ticket.take() {
            Some(ticket) => self.state.complete(ticket, outcome),
            None => false,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.state.abandon(ticket);
        }
    }
}

//! Booking attempt lifecycle

use crate::core::error::{HavenError, HavenResult};
use std::fmt;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Phase of a single booking attempt
///
/// ```text
/// Requested -> Authorizing -> Authorized -> Verifying -> Committed
///     \____________\______________\_____________\______> Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingPhase {
    Requested,
    Authorizing,
    Authorized,
    Verifying,
    Committed,
    Rejected,
}

impl BookingPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingPhase::Committed | BookingPhase::Rejected)
    }

    pub fn can_transition_to(&self, next: BookingPhase) -> bool {
        use BookingPhase::*;

        match (self, next) {
            (from, Rejected) => !from.is_terminal(),
            (Requested, Authorizing) => true,
            (Authorizing, Authorized) => true,
            (Authorized, Verifying) => true,
            (Verifying, Committed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingPhase::Requested => "requested",
            BookingPhase::Authorizing => "authorizing",
            BookingPhase::Authorized => "authorized",
            BookingPhase::Verifying => "verifying",
            BookingPhase::Committed => "committed",
            BookingPhase::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BookingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one request through the phases and logs each move
#[derive(Debug)]
pub struct BookingAttempt {
    hotel_id: Uuid,
    user_id: String,
    phase: BookingPhase,
}

impl BookingAttempt {
    /// A fresh attempt to obtain an authorization
    pub fn requested(hotel_id: Uuid, user_id: &str) -> Self {
        Self::starting_at(hotel_id, user_id, BookingPhase::Requested)
    }

    /// A commit attempt; the client already holds an authorization
    pub fn authorized(hotel_id: Uuid, user_id: &str) -> Self {
        Self::starting_at(hotel_id, user_id, BookingPhase::Authorized)
    }

    fn starting_at(hotel_id: Uuid, user_id: &str, phase: BookingPhase) -> Self {
        debug!(hotel_id = %hotel_id, user_id = %user_id, phase = %phase, "booking attempt started");
        Self {
            hotel_id,
            user_id: user_id.to_string(),
            phase,
        }
    }

    pub fn phase(&self) -> BookingPhase {
        self.phase
    }

    /// Move to `next`, failing on an illegal transition
    pub fn advance(&mut self, next: BookingPhase) -> HavenResult<()> {
        if !self.phase.can_transition_to(next) {
            return Err(HavenError::Internal(format!(
                "illegal booking transition {} -> {}",
                self.phase, next
            )));
        }

        debug!(
            hotel_id = %self.hotel_id,
            from = %self.phase,
            to = %next,
            "booking phase changed"
        );
        self.phase = next;

        Ok(())
    }

    /// Mark the attempt rejected, log the cause and hand the error back
    pub fn reject(&mut self, err: HavenError) -> HavenError {
        let from = self.phase;
        if !self.phase.is_terminal() {
            self.phase = BookingPhase::Rejected;
        }

        if err.status_code().is_server_error() {
            error!(
                hotel_id = %self.hotel_id,
                user_id = %self.user_id,
                phase = %from,
                error = %err,
                "booking attempt failed"
            );
        } else {
            warn!(
                hotel_id = %self.hotel_id,
                user_id = %self.user_id,
                phase = %from,
                code = err.error_code(),
                "booking attempt rejected: {}",
                err
            );
        }

        err
    }
}

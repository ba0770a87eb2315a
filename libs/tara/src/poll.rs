//! Smart-ID status polling
//!
//! The broker's poll endpoint answers `{"status": "..."}`. Only `PENDING` and
//! `COMPLETED` are understood; anything else ends the login. [`PollMachine`]
//! owns the attempt budget and decides what the handshake does after each poll:
//!
//! ```text
//! Init ──poll──▶ Polling ──PENDING (budget left)──▶ Polling
//!                   │ ──COMPLETED──────────────────▶ Completed  (accept)
//!                   │ ──other status───────────────▶ Failed
//!                   └ ──PENDING (budget spent)─────▶ TimedOut
//! ```

use serde::Deserialize;

const PENDING: &str = "PENDING";
const COMPLETED: &str = "COMPLETED";

/// Status reported by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PollStatus {
    Pending,
    Completed,
    /// Any status without a defined transition, kept verbatim.
    Other(String),
}

impl From<String> for PollStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            PENDING => Self::Pending,
            COMPLETED => Self::Completed,
            _ => Self::Other(status),
        }
    }
}

impl std::fmt::Display for PollStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => f.write_str(PENDING),
            Self::Completed => f.write_str(COMPLETED),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// One poll response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollResult {
    pub status: PollStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Init,
    Polling { attempts: u32 },
    Completed,
    TimedOut,
    Failed,
}

/// What to do after a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    /// Sleep for the poll interval, then poll again.
    Wait,
    /// The user confirmed; run the accept step.
    Accept,
    /// The broker reported a status with no transition.
    Fail(String),
    /// The attempt budget is spent.
    TimedOut,
    /// The machine was already in a terminal state; the poll is ignored.
    Finished,
}

#[derive(Debug, Clone)]
pub struct PollMachine {
    state: PollState,
    max_attempts: u32,
}

impl PollMachine {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            state: PollState::Init,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Feed the status of the latest poll.
    pub fn advance(&mut self, status: &PollStatus) -> PollStep {
        let attempts = match self.state {
            PollState::Init => 1,
            PollState::Polling { attempts } => attempts + 1,
            PollState::Completed | PollState::TimedOut | PollState::Failed => {
                return PollStep::Finished;
            }
        };

        let (state, step) = match status {
            PollStatus::Completed => (PollState::Completed, PollStep::Accept),
            // Budget spent: time out right away instead of sleeping once more
            PollStatus::Pending if attempts >= self.max_attempts => {
                (PollState::TimedOut, PollStep::TimedOut)
            }
            PollStatus::Pending => (PollState::Polling { attempts }, PollStep::Wait),
            PollStatus::Other(other) => (PollState::Failed, PollStep::Fail(other.clone())),
        };

        self.state = state;
        step
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_result_deserialize() {
        let pending: PollResult = serde_json::from_str(r#"{"status":"PENDING"}"#).unwrap();
        assert_eq!(pending.status, PollStatus::Pending);

        let completed: PollResult =
            serde_json::from_str(r#"{"status":"COMPLETED","extra":1}"#).unwrap();
        assert_eq!(completed.status, PollStatus::Completed);

        let other: PollResult = serde_json::from_str(r#"{"status":"FAILED"}"#).unwrap();
        assert_eq!(other.status, PollStatus::Other("FAILED".to_string()));
        assert_eq!(other.status.to_string(), "FAILED");
    }

    #[test]
    fn test_poll_result_missing_status() {
        assert!(serde_json::from_str::<PollResult>("{}").is_err());
    }

    #[test]
    fn test_pending_then_completed() {
        let mut machine = PollMachine::new(20);
        assert_eq!(machine.state(), &PollState::Init);

        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::Wait);
        assert_eq!(machine.state(), &PollState::Polling { attempts: 1 });
        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::Wait);
        assert_eq!(machine.advance(&PollStatus::Completed), PollStep::Accept);
        assert_eq!(machine.state(), &PollState::Completed);
    }

    #[test]
    fn test_budget_exhausted() {
        let mut machine = PollMachine::new(3);
        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::Wait);
        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::Wait);
        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::TimedOut);
        assert_eq!(machine.state(), &PollState::TimedOut);
    }

    #[test]
    fn test_completed_on_last_attempt_is_accepted() {
        let mut machine = PollMachine::new(2);
        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::Wait);
        assert_eq!(machine.advance(&PollStatus::Completed), PollStep::Accept);
    }

    #[test]
    fn test_unknown_status_fails_immediately() {
        let mut machine = PollMachine::new(20);
        let step = machine.advance(&PollStatus::Other("USER_REFUSED".to_string()));
        assert_eq!(step, PollStep::Fail("USER_REFUSED".to_string()));
        assert_eq!(machine.state(), &PollState::Failed);
    }

    #[test]
    fn test_terminal_state_ignores_further_polls() {
        let mut machine = PollMachine::new(20);
        machine.advance(&PollStatus::Completed);
        assert_eq!(machine.advance(&PollStatus::Completed), PollStep::Finished);
        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::Finished);
        assert_eq!(machine.state(), &PollState::Completed);
    }

    #[test]
    fn test_zero_budget_still_polls_once() {
        let mut machine = PollMachine::new(0);
        assert_eq!(machine.advance(&PollStatus::Pending), PollStep::TimedOut);
    }
}

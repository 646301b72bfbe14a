//! Time rules for submission, execution, cancellation and escape.
//!
//! All times are unix seconds.

use primitives::Moment;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScheduleError {
  /// `now` is past the submission deadline.
  SubmissionExpired,
  /// The execution deadline leaves less than one delay of lead time.
  DeadlineTooSoon,
  NotYetEligible,
  /// The order is inside its keeper priority window and the caller is not a keeper.
  KeeperWindow,
  TimeOverflow,
}

/// Who may execute an order at a given moment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecutionPhase {
  Pending,
  KeeperPriority,
  Open,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExecutionWindow {
  pub eligible_at: Moment,
  pub bot_window: Moment,
}

impl ExecutionWindow {
  pub fn new(eligible_at: Moment, bot_window: Moment) -> Self {
    Self {
      eligible_at,
      bot_window,
    }
  }

  pub fn phase(&self, now: Moment) -> ExecutionPhase {
    if now < self.eligible_at {
      ExecutionPhase::Pending
    } else if now < self.eligible_at.saturating_add(self.bot_window) {
      ExecutionPhase::KeeperPriority
    } else {
      ExecutionPhase::Open
    }
  }

  pub fn authorize(&self, now: Moment, is_keeper: bool) -> Result<(), ScheduleError> {
    match self.phase(now) {
      ExecutionPhase::Pending => Err(ScheduleError::NotYetEligible),
      ExecutionPhase::KeeperPriority if !is_keeper => Err(ScheduleError::KeeperWindow),
      _ => Ok(()),
    }
  }
}

/// Validates submission deadlines and returns the eligibility time.
pub fn schedule_submission(
  now: Moment,
  delay: Moment,
  submit_deadline: Moment,
  execution_deadline: Moment,
) -> Result<Moment, ScheduleError> {
  if now > submit_deadline {
    return Err(ScheduleError::SubmissionExpired);
  }
  let eligible_at = now
    .checked_add(delay)
    .ok_or(ScheduleError::TimeOverflow)?;
  if execution_deadline < eligible_at {
    return Err(ScheduleError::DeadlineTooSoon);
  }
  Ok(eligible_at)
}

pub fn is_expired(now: Moment, deadline: Moment) -> bool {
  now > deadline
}

/// Whether `threshold` seconds have elapsed since `eligible_at`.
pub fn has_elapsed(now: Moment, eligible_at: Moment, threshold: Moment) -> bool {
  now >= eligible_at.saturating_add(threshold)
}

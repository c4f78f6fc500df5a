//! Admission policy
//!
//! Pure decision logic for one admission pass. Nothing here touches storage
//! or the clock: a pass maps `(ordered backlog, starting availability,
//! capacity)` to `(decisions, ending availability)` and the service applies
//! the result.

use uuid::Uuid;

/// Outcome for a single queued reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Admit and consume `quantity` from availability
    Activate,
    /// Reject permanently and move on to the next reservation
    Reject,
    /// Stop the pass; this and every later reservation stay queued
    Halt,
}

/// Decide what happens to a request for `quantity` tickets
///
/// * fits in what is left: activate
/// * nothing is left: reject and continue
/// * larger than the whole sale: reject and continue, it can never fit
/// * otherwise: halt, so the gap is not handed to a later, smaller request
///   while held tickets may still come back
pub fn decide(quantity: i32, available: i32, capacity: i32) -> AdmissionDecision {
    if quantity <= available {
        AdmissionDecision::Activate
    } else if available <= 0 || quantity > capacity {
        AdmissionDecision::Reject
    } else {
        AdmissionDecision::Halt
    }
}

/// Queue entry as seen by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedRequest {
    pub id: Uuid,
    pub quantity: i32,
}

/// Result of walking a backlog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassPlan {
    /// Reservations to activate, in queue order
    pub activate: Vec<Uuid>,
    /// Reservations to reject, in queue order
    pub reject: Vec<Uuid>,
    /// First reservation the pass stopped at, if any
    pub halted_at: Option<Uuid>,
    /// Reservations left untouched because of the halt
    pub skipped: usize,
    /// Availability after every admission in the plan
    pub remaining: i32,
}

/// Walk `backlog` in order and plan every decision
///
/// `available` is threaded through as an accumulator and decremented as each
/// admission is planned, so later entries see the capacity earlier ones took.
pub fn plan_pass(backlog: &[QueuedRequest], available: i32, capacity: i32) -> PassPlan {
    let mut plan = PassPlan {
        remaining: available,
        ..Default::default()
    };

    for (index, request) in backlog.iter().enumerate() {
        match decide(request.quantity, plan.remaining, capacity) {
            AdmissionDecision::Activate => {
                plan.remaining -= request.quantity;
                plan.activate.push(request.id);
            }
            AdmissionDecision::Reject => plan.reject.push(request.id),
            AdmissionDecision::Halt => {
                plan.halted_at = Some(request.id);
                plan.skipped = backlog.len() - index;
                break;
            }
        }
    }

    plan
}

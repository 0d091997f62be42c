//! Delivery request state machine.
//!
//! Every legal transition is declared once in [`TRANSITIONS`]; the store
//! consults [`rule_for`] / [`next_status`] and never compares statuses ad hoc.
//!
//! ```text
//! pending --accept--> accepted --deliver--> completed
//!    |                   |
//!    +------cancel-------+--cancel / cancel_delivery--> cancelled
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching the SMALLINT `requests.status_id` column.
pub type StatusId = i16;

/// Lifecycle status of a delivery request.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending = 1,
    Accepted = 2,
    Completed = 3,
    Cancelled = 4,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::Pending,
        RequestStatus::Accepted,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    pub fn from_id(id: StatusId) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Completed => "completed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// Whether a request in this status must reference a fulfiller.
    pub fn holds_fulfiller(self) -> bool {
        matches!(self, RequestStatus::Accepted | RequestStatus::Completed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RequestStatus> for StatusId {
    fn from(value: RequestStatus) -> Self {
        value as StatusId
    }
}

impl TryFrom<StatusId> for RequestStatus {
    type Error = CoreError;

    fn try_from(value: StatusId) -> Result<Self, Self::Error> {
        Self::from_id(value)
            .ok_or_else(|| CoreError::Internal(format!("Unknown request status id {value}")))
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown request status '{s}'")))
    }
}

/// A state-changing operation on an existing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestAction {
    Accept,
    Deliver,
    Cancel,
    CancelDelivery,
}

impl RequestAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestAction::Accept => "accept",
            RequestAction::Deliver => "deliver",
            RequestAction::Cancel => "cancel",
            RequestAction::CancelDelivery => "cancel_delivery",
        }
    }
}

impl fmt::Display for RequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may perform a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Performer {
    /// Any fulfiller-role account (the claim).
    AnyFulfiller,
    /// Only the fulfiller currently assigned to the request.
    AssignedFulfiller,
    /// Only the requester who created the request.
    OwningRequester,
}

/// What a transition does to the fulfiller reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillerEffect {
    /// Set the fulfiller to the performer.
    Assign,
    /// Leave the fulfiller as is.
    Keep,
    /// Clear the fulfiller, moving it to `cancelled_fulfiller_id`.
    Release,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub action: RequestAction,
    pub from: &'static [RequestStatus],
    pub to: RequestStatus,
    pub performer: Performer,
    pub fulfiller: FulfillerEffect,
    /// Losing this precondition means another caller won a race, so the
    /// failure is reported as `Conflict` rather than `InvalidState`.
    pub contended: bool,
}

/// The complete transition table.
pub const TRANSITIONS: [TransitionRule; 4] = [
    TransitionRule {
        action: RequestAction::Accept,
        from: &[RequestStatus::Pending],
        to: RequestStatus::Accepted,
        performer: Performer::AnyFulfiller,
        fulfiller: FulfillerEffect::Assign,
        contended: true,
    },
    TransitionRule {
        action: RequestAction::Deliver,
        from: &[RequestStatus::Accepted],
        to: RequestStatus::Completed,
        performer: Performer::AssignedFulfiller,
        fulfiller: FulfillerEffect::Keep,
        contended: false,
    },
    TransitionRule {
        action: RequestAction::Cancel,
        from: &[RequestStatus::Pending, RequestStatus::Accepted],
        to: RequestStatus::Cancelled,
        performer: Performer::OwningRequester,
        fulfiller: FulfillerEffect::Release,
        contended: false,
    },
    TransitionRule {
        action: RequestAction::CancelDelivery,
        from: &[RequestStatus::Accepted],
        to: RequestStatus::Cancelled,
        performer: Performer::AssignedFulfiller,
        fulfiller: FulfillerEffect::Release,
        contended: false,
    },
];

/// Look up the rule for an action.
pub fn rule_for(action: RequestAction) -> &'static TransitionRule {
    match action {
        RequestAction::Accept => &TRANSITIONS[0],
        RequestAction::Deliver => &TRANSITIONS[1],
        RequestAction::Cancel => &TRANSITIONS[2],
        RequestAction::CancelDelivery => &TRANSITIONS[3],
    }
}

impl TransitionRule {
    pub fn allows(&self, current: RequestStatus) -> bool {
        self.from.contains(&current)
    }

    /// Status IDs accepted as the precondition, for conditional updates.
    pub fn from_ids(&self) -> Vec<StatusId> {
        self.from.iter().map(|s| s.id()).collect()
    }

    /// Build the error reported when `current` does not satisfy the rule.
    pub fn rejection(&self, current: RequestStatus) -> CoreError {
        let msg = match self.action {
            RequestAction::Accept => {
                format!("Request has already been {current} and can no longer be accepted")
            }
            RequestAction::Deliver => format!("A {current} request cannot be marked as delivered"),
            RequestAction::Cancel => format!("A {current} request cannot be cancelled"),
            RequestAction::CancelDelivery => {
                format!("Delivery of a {current} request cannot be cancelled")
            }
        };
        if self.contended {
            CoreError::Conflict(msg)
        } else {
            CoreError::InvalidState(msg)
        }
    }
}

/// Resolve the status reached by applying `action` to a request in `current`.
pub fn next_status(
    current: RequestStatus,
    action: RequestAction,
) -> Result<RequestStatus, CoreError> {
    let rule = rule_for(action);
    if rule.allows(current) {
        Ok(rule.to)
    } else {
        Err(rule.rejection(current))
    }
}

/* --------------------------------------------------------------------------
Request attributes
-------------------------------------------------------------------------- */

pub const CATEGORY_OTHER: &str = "other";

/// All valid request categories.
pub const VALID_CATEGORIES: &[&str] = &["groceries", "medicines", "stationery", "food", "other"];

/// Validate a request category against the closed set.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    if VALID_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid category '{category}'. Must be one of: {}",
            VALID_CATEGORIES.join(", ")
        )))
    }
}

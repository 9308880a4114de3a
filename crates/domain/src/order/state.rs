//! Order delivery and payment states.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The delivery state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// Pending ──► Confirmed ──► Processing ──► Shipped ──► Delivered ──► ReturnRequested ──► Returned
///    │            │              │            │                            │
///    └────────────┴──────────────┴────────────┴────────────────────────────┴──► Cancelled
/// ```
///
/// Pending may also move straight to Processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryStatus {
    /// Order placed, awaiting confirmation or payment.
    #[default]
    Pending,

    /// Order confirmed (cash on delivery orders start here).
    Confirmed,

    /// Order is being packed.
    Processing,

    /// Order handed to the carrier.
    Shipped,

    /// Order received by the customer.
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,

    /// Customer asked to return a delivered order.
    ReturnRequested,

    /// Return completed (terminal state).
    Returned,
}

impl DeliveryStatus {
    pub fn can_confirm(&self) -> bool {
        matches!(self, DeliveryStatus::Pending)
    }

    pub fn can_start_processing(&self) -> bool {
        matches!(self, DeliveryStatus::Pending | DeliveryStatus::Confirmed)
    }

    pub fn can_ship(&self) -> bool {
        matches!(self, DeliveryStatus::Processing)
    }

    pub fn can_deliver(&self) -> bool {
        matches!(self, DeliveryStatus::Shipped)
    }

    /// Returns true if the order can still be cancelled. A delivered order
    /// can only be cancelled once its return has been requested.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            DeliveryStatus::Pending
                | DeliveryStatus::Confirmed
                | DeliveryStatus::Processing
                | DeliveryStatus::Shipped
                | DeliveryStatus::ReturnRequested
        )
    }

    pub fn can_request_return(&self) -> bool {
        matches!(self, DeliveryStatus::Delivered)
    }

    pub fn can_complete_return(&self) -> bool {
        matches!(self, DeliveryStatus::ReturnRequested)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Cancelled | DeliveryStatus::Returned)
    }

    /// Returns true if the state machine allows moving to `next`.
    pub fn can_transition_to(&self, next: DeliveryStatus) -> bool {
        match next {
            DeliveryStatus::Pending => false,
            DeliveryStatus::Confirmed => self.can_confirm(),
            DeliveryStatus::Processing => self.can_start_processing(),
            DeliveryStatus::Shipped => self.can_ship(),
            DeliveryStatus::Delivered => self.can_deliver(),
            DeliveryStatus::Cancelled => self.can_cancel(),
            DeliveryStatus::ReturnRequested => self.can_request_return(),
            DeliveryStatus::Returned => self.can_complete_return(),
        }
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Pending => "Pending",
            DeliveryStatus::Confirmed => "Confirmed",
            DeliveryStatus::Processing => "Processing",
            DeliveryStatus::Shipped => "Shipped",
            DeliveryStatus::Delivered => "Delivered",
            DeliveryStatus::Cancelled => "Cancelled",
            DeliveryStatus::ReturnRequested => "ReturnRequested",
            DeliveryStatus::Returned => "Returned",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(DeliveryStatus::Pending),
            "confirmed" => Ok(DeliveryStatus::Confirmed),
            "processing" => Ok(DeliveryStatus::Processing),
            "shipped" => Ok(DeliveryStatus::Shipped),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "cancelled" => Ok(DeliveryStatus::Cancelled),
            "returnrequested" | "returnrequest" => Ok(DeliveryStatus::ReturnRequested),
            "returned" => Ok(DeliveryStatus::Returned),
            _ => Err(OrderError::UnknownStatus(s.to_string())),
        }
    }
}

/// Payment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [DeliveryStatus; 8] = [
        DeliveryStatus::Pending,
        DeliveryStatus::Confirmed,
        DeliveryStatus::Processing,
        DeliveryStatus::Shipped,
        DeliveryStatus::Delivered,
        DeliveryStatus::Cancelled,
        DeliveryStatus::ReturnRequested,
        DeliveryStatus::Returned,
    ];

    #[test]
    fn test_default_state_is_pending() {
        assert_eq!(DeliveryStatus::default(), DeliveryStatus::Pending);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_can_cancel_unless_delivered_or_finished() {
        assert!(DeliveryStatus::Pending.can_cancel());
        assert!(DeliveryStatus::Confirmed.can_cancel());
        assert!(DeliveryStatus::Processing.can_cancel());
        assert!(DeliveryStatus::Shipped.can_cancel());
        assert!(!DeliveryStatus::Delivered.can_cancel());
        assert!(!DeliveryStatus::Cancelled.can_cancel());
        assert!(DeliveryStatus::ReturnRequested.can_cancel());
        assert!(!DeliveryStatus::Returned.can_cancel());
    }

    #[test]
    fn test_forward_path() {
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Confirmed));
        assert!(DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Processing));
        assert!(DeliveryStatus::Confirmed.can_transition_to(DeliveryStatus::Processing));
        assert!(DeliveryStatus::Processing.can_transition_to(DeliveryStatus::Shipped));
        assert!(DeliveryStatus::Shipped.can_transition_to(DeliveryStatus::Delivered));
        assert!(DeliveryStatus::Delivered.can_transition_to(DeliveryStatus::ReturnRequested));
        assert!(DeliveryStatus::ReturnRequested.can_transition_to(DeliveryStatus::Returned));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!DeliveryStatus::Pending.can_transition_to(DeliveryStatus::Shipped));
        assert!(!DeliveryStatus::Processing.can_transition_to(DeliveryStatus::Delivered));
        assert!(!DeliveryStatus::Shipped.can_transition_to(DeliveryStatus::Processing));
        assert!(!DeliveryStatus::Shipped.can_transition_to(DeliveryStatus::ReturnRequested));
        for state in ALL {
            assert!(!state.can_transition_to(DeliveryStatus::Pending));
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for state in ALL.into_iter().filter(|s| s.is_terminal()) {
            for next in ALL {
                assert!(!state.can_transition_to(next), "{state} -> {next}");
            }
        }
    }

    #[test]
    fn test_parse_accepts_display_and_legacy_names() {
        for state in ALL {
            assert_eq!(state.as_str().parse::<DeliveryStatus>().unwrap(), state);
        }
        assert_eq!(
            "Return request".parse::<DeliveryStatus>().unwrap(),
            DeliveryStatus::ReturnRequested
        );
        assert_eq!(
            "shipped".parse::<DeliveryStatus>().unwrap(),
            DeliveryStatus::Shipped
        );
        assert!("lost".parse::<DeliveryStatus>().is_err());
    }
}

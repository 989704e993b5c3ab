//! # Status Transitions
//!
//! Which status writes the order actor accepts.
//!
//! | from | allowed |
//! |------|---------|
//! | any non-terminal state | itself, its pipeline successor, `CANCELLED` |
//! | `DELIVERED`, `CANCELLED` | itself |
//!
//! [`TransitionPolicy::Permissive`] skips the table entirely and accepts every write, which
//! is how the dashboard used to behave and what older tooling still expects.

use crate::model::OrderStatus;
use crate::order_actor::OrderError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may be written from any status.
    Permissive,
    /// Only the moves in [`allowed_transitions`].
    #[default]
    Enforced,
}

/// Targets reachable from `from` under [`TransitionPolicy::Enforced`], including `from`
/// itself.
pub fn allowed_transitions(from: OrderStatus) -> Vec<OrderStatus> {
    let mut allowed = vec![from];
    if from.is_terminal() {
        return allowed;
    }
    allowed.extend(from.successor());
    if !allowed.contains(&OrderStatus::Cancelled) {
        allowed.push(OrderStatus::Cancelled);
    }
    allowed
}

impl TransitionPolicy {
    pub fn check(self, from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        match self {
            Self::Permissive => Ok(()),
            Self::Enforced if allowed_transitions(from).contains(&to) => Ok(()),
            Self::Enforced => Err(OrderError::IllegalTransition { from, to }),
        }
    }

    /// Payment may be confirmed while awaiting payment, or again once paid.
    pub fn check_payment(self, from: OrderStatus) -> Result<(), OrderError> {
        match (self, from) {
            (Self::Permissive, _)
            | (Self::Enforced, OrderStatus::PendingPayment | OrderStatus::PaidWaitingProcess) => {
                Ok(())
            }
            (Self::Enforced, _) => Err(OrderError::IllegalTransition {
                from,
                to: OrderStatus::PaidWaitingProcess,
            }),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "enforced" => Ok(Self::Enforced),
            other => Err(format!("expected `enforced` or `permissive`, got `{other}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn pipeline_moves_one_step_at_a_time() {
        let policy = TransitionPolicy::Enforced;
        assert!(policy.check(PendingPayment, PaidWaitingProcess).is_ok());
        assert!(policy.check(ReadyToShip, DroneAssigned).is_ok());
        assert!(policy.check(Delivering, Delivered).is_ok());

        assert_eq!(
            policy.check(PendingPayment, Delivered),
            Err(OrderError::IllegalTransition { from: PendingPayment, to: Delivered })
        );
        assert!(policy.check(Delivering, Preparing).is_err());
    }

    #[test]
    fn cancel_is_open_until_the_order_ends() {
        let policy = TransitionPolicy::Enforced;
        for from in [PendingPayment, Preparing, DroneAssigned, Delivering] {
            assert!(policy.check(from, Cancelled).is_ok(), "{from} -> CANCELLED");
        }
        assert!(policy.check(Delivered, Cancelled).is_err());
        assert!(policy.check(Cancelled, PendingPayment).is_err());
    }

    #[test]
    fn rewriting_the_same_status_is_accepted() {
        for status in OrderStatus::ALL {
            assert!(TransitionPolicy::Enforced.check(status, status).is_ok());
        }
    }

    #[test]
    fn permissive_accepts_every_pair() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(TransitionPolicy::Permissive.check(from, to).is_ok());
            }
        }
    }

    #[test]
    fn payment_after_dispatch_is_refused_when_enforced() {
        assert!(TransitionPolicy::Enforced.check_payment(PaidWaitingProcess).is_ok());
        assert!(TransitionPolicy::Enforced.check_payment(Delivering).is_err());
        assert!(TransitionPolicy::Permissive.check_payment(Delivered).is_ok());
    }

    #[test]
    fn terminal_states_only_reach_themselves() {
        assert_eq!(allowed_transitions(Delivered), vec![Delivered]);
        assert_eq!(allowed_transitions(Preparing), vec![Preparing, ReadyToShip, Cancelled]);
    }
}

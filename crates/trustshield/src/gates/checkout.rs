use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::gates::verifiers::CredentialVerifier;
use crate::session::CheckoutContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutVerdict {
    Completed,
    PendingReauth,
    Failed,
}

/// How the gate reached its verdict; decides which reward applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutDecision {
    /// Nothing changed, no password needed.
    Direct,
    /// Changed details confirmed with the right secret.
    Reauthenticated,
    AwaitingPassword,
    WrongPassword,
}

impl CheckoutDecision {
    pub fn verdict(self) -> CheckoutVerdict {
        match self {
            CheckoutDecision::Direct | CheckoutDecision::Reauthenticated => {
                CheckoutVerdict::Completed
            }
            CheckoutDecision::AwaitingPassword => CheckoutVerdict::PendingReauth,
            CheckoutDecision::WrongPassword => CheckoutVerdict::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutChanges {
    pub shipping: bool,
    pub payment: bool,
}

impl CheckoutChanges {
    pub fn any(&self) -> bool {
        self.shipping || self.payment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutAssessment {
    pub decision: CheckoutDecision,
    pub changes: CheckoutChanges,
}

/// An empty password counts as not supplied.
pub fn checkout_reauth_gate(
    context: &CheckoutContext,
    shipping: &str,
    payment: &str,
    password: Option<&str>,
    verifier: &dyn CredentialVerifier,
) -> CheckoutAssessment {
    let changes = CheckoutChanges {
        shipping: shipping != context.original_shipping,
        payment: payment != context.original_payment,
    };
    let decision = if !changes.any() {
        CheckoutDecision::Direct
    } else {
        match password.filter(|p| !p.is_empty()) {
            None => CheckoutDecision::AwaitingPassword,
            Some(supplied) if verifier.verify(supplied) => CheckoutDecision::Reauthenticated,
            Some(_) => CheckoutDecision::WrongPassword,
        }
    };
    CheckoutAssessment { decision, changes }
}

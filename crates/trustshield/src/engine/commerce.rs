use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{require_logged_in, require_text, ScoreView, TrustEngine};
use crate::error::{EngineError, EngineResult};
use crate::events::AuditEvent;
use crate::gates::{
    add_item_allowed, checkout_reauth_gate, CartVerdict, CheckoutChanges, CheckoutDecision,
    CheckoutVerdict, GateVerdict,
};
use crate::score::{ScoreReason, SubjectId};
use crate::session::ShoppingState;
use crate::signals::{cart_anomaly, CartFinding, CartObservation, CartRule};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartOutcome {
    pub verdict: CartVerdict,
    pub findings: Vec<CartFinding>,
    pub shopping: ShoppingState,
    pub global: ScoreView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub shipping: String,
    pub payment: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutOutcome {
    pub verdict: CheckoutVerdict,
    pub changes: CheckoutChanges,
    /// Cart value of the completed order.
    pub order_total: Option<u64>,
    pub global: ScoreView,
}

fn cart_reason(rule: CartRule) -> ScoreReason {
    match rule {
        CartRule::HighValue => ScoreReason::HighValueCart,
        CartRule::ValueLock => ScoreReason::CartValueLock,
        CartRule::LuxuryOnly => ScoreReason::LuxuryOnlyCart,
    }
}

impl TrustEngine {
    /// Adds a catalog item to the session's cart, then runs the cart
    /// anomaly rules against the new totals.
    pub fn add_to_cart(&self, session_id: &str, item_key: &str) -> EngineResult<CartOutcome> {
        let item = self
            .catalog
            .find(item_key)
            .cloned()
            .ok_or_else(|| EngineError::validation(format!("unknown catalog item '{item_key}'")))?;

        self.sessions.with_session(session_id, |state| {
            require_logged_in(state)?;
            let subject = SubjectId::session(&state.id);

            if !add_item_allowed(&state.shopping) {
                self.record(AuditEvent::gate(&subject, GateVerdict::Shopping(CartVerdict::Blocked)));
                tracing::info!("cart on session {} is locked, {} refused", state.id, item.id);
                return Ok(CartOutcome {
                    verdict: CartVerdict::Blocked,
                    findings: Vec::new(),
                    shopping: state.shopping.clone(),
                    global: self.global_score(),
                });
            }

            let already_warned = state.shopping.high_value_warned;
            let already_locked = state.shopping.locked;
            state.shopping.add(&item);
            let observation = CartObservation {
                cart_value: state.shopping.cart_value,
                luxury_count: state.shopping.luxury_count,
                low_medium_count: state.shopping.low_medium_count,
                already_warned,
                already_locked,
            };
            self.record(AuditEvent::gate(&subject, GateVerdict::Shopping(CartVerdict::Added)));

            let assessment = cart_anomaly(
                &observation,
                &self.config.thresholds,
                &self.config.rewards,
                self.rng.as_ref(),
            );
            if assessment.warn {
                state.shopping.high_value_warned = true;
            }
            if assessment.lock {
                state.shopping.locked = true;
            }

            let global = SubjectId::global();
            for finding in &assessment.findings {
                self.record(AuditEvent::signal(
                    &subject,
                    finding.signal,
                    Some(format!("{:?}", finding.rule)),
                ));
                self.scores
                    .apply(&global, finding.signal.delta, cart_reason(finding.rule));
            }
            if assessment.lock {
                tracing::warn!(
                    "cart on session {} locked at value {}",
                    state.id,
                    state.shopping.cart_value
                );
            }

            Ok(CartOutcome {
                verdict: CartVerdict::Added,
                findings: assessment.findings,
                shopping: state.shopping.clone(),
                global: self.global_score(),
            })
        })
    }

    /// Completes the order, asking for the password first when shipping
    /// or payment differ from the confirmed details.
    pub fn checkout(
        &self,
        session_id: &str,
        request: &CheckoutRequest,
    ) -> EngineResult<CheckoutOutcome> {
        let shipping = require_text(&request.shipping, "shipping")?;
        let payment = require_text(&request.payment, "payment")?;

        self.sessions.with_session(session_id, |state| {
            require_logged_in(state)?;
            if state.shopping.is_empty() {
                return Err(EngineError::validation(format!(
                    "session {} has an empty cart",
                    state.id
                )));
            }
            let subject = SubjectId::session(&state.id);

            let assessment = checkout_reauth_gate(
                &state.checkout,
                shipping,
                payment,
                request.password.as_deref(),
                self.verifiers.credentials.as_ref(),
            );
            state.checkout.apply(assessment.decision, shipping, payment);
            let verdict = assessment.decision.verdict();
            self.record(AuditEvent::gate(&subject, GateVerdict::Checkout(verdict)));

            let rewards = &self.config.rewards;
            let mut order_total = None;
            match assessment.decision {
                CheckoutDecision::Direct => {
                    self.reward_global(rewards.checkout_direct, ScoreReason::CheckoutCompleted);
                    order_total = Some(state.shopping.cart_value);
                    state.shopping.complete_order();
                }
                CheckoutDecision::Reauthenticated => {
                    self.reward_global(rewards.checkout_reauth_passed, ScoreReason::ReauthCompleted);
                    order_total = Some(state.shopping.cart_value);
                    state.shopping.complete_order();
                }
                CheckoutDecision::WrongPassword => {
                    self.reward_global(rewards.checkout_reauth_failed, ScoreReason::ReauthFailed);
                }
                CheckoutDecision::AwaitingPassword => {}
            }

            tracing::info!("checkout on session {} {verdict:?}", state.id);
            Ok(CheckoutOutcome {
                verdict,
                changes: assessment.changes,
                order_total,
                global: self.global_score(),
            })
        })
    }
}

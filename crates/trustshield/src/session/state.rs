use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::catalog::CatalogItem;
use crate::gates::CheckoutDecision;

/// Cart state of one shopper session.
///
/// `locked` is monotonic: only [`ShoppingState::complete_order`] clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShoppingState {
    pub cart_value: u64,
    pub items_in_cart: u32,
    pub low_medium_count: u32,
    pub luxury_count: u32,
    pub locked: bool,
    /// One-shot high-value warning, reset with the cart.
    pub high_value_warned: bool,
    pub items: Vec<String>,
}

impl ShoppingState {
    pub fn add(&mut self, item: &CatalogItem) {
        self.cart_value = self.cart_value.saturating_add(item.price);
        self.items_in_cart = self.items_in_cart.saturating_add(1);
        if item.tier.is_low_medium() {
            self.low_medium_count = self.low_medium_count.saturating_add(1);
        } else {
            self.luxury_count = self.luxury_count.saturating_add(1);
        }
        self.items.push(item.id.clone());
    }

    pub fn is_empty(&self) -> bool {
        self.items_in_cart == 0
    }

    pub fn complete_order(&mut self) {
        *self = ShoppingState::default();
    }
}

/// Shipping and payment details last confirmed by the shopper.
///
/// `pending_reauth` holds exactly while a changed checkout awaits a
/// correct password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutContext {
    pub original_shipping: String,
    pub original_payment: String,
    pub pending_reauth: bool,
}

impl CheckoutContext {
    pub fn new(shipping: impl Into<String>, payment: impl Into<String>) -> Self {
        Self {
            original_shipping: shipping.into(),
            original_payment: payment.into(),
            pending_reauth: false,
        }
    }

    pub fn apply(&mut self, decision: CheckoutDecision, shipping: &str, payment: &str) {
        match decision {
            CheckoutDecision::Direct => self.pending_reauth = false,
            CheckoutDecision::Reauthenticated => {
                self.original_shipping = shipping.to_string();
                self.original_payment = payment.to_string();
                self.pending_reauth = false;
            }
            CheckoutDecision::AwaitingPassword | CheckoutDecision::WrongPassword => {
                self.pending_reauth = true;
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOtp {
    pub username: String,
    pub issued_at: SystemTime,
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: String,
    pub opened_at: SystemTime,
    pub user: Option<String>,
    pub pending_otp: Option<PendingOtp>,
    pub shopping: ShoppingState,
    pub checkout: CheckoutContext,
}

impl SessionState {
    pub fn new(id: impl Into<String>, checkout: CheckoutContext) -> Self {
        Self {
            id: id.into(),
            opened_at: SystemTime::now(),
            user: None,
            pending_otp: None,
            shopping: ShoppingState::default(),
            checkout,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn snapshot(&self, score: u8) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            user: self.user.clone(),
            awaiting_otp: self.pending_otp.is_some(),
            trust_score: score,
            shopping: self.shopping.clone(),
            checkout: self.checkout.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub user: Option<String>,
    pub awaiting_otp: bool,
    pub trust_score: u8,
    pub shopping: ShoppingState,
    pub checkout: CheckoutContext,
}

//! Shopper sessions: login status, cart and checkout state.

pub mod manager;
pub mod state;

pub use manager::{SessionManager, SessionSlot};
pub use state::{CheckoutContext, PendingOtp, SessionSnapshot, SessionState, ShoppingState};

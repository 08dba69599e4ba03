use utoipa::OpenApi;

use crate::admin::AdminLogEntry;
use crate::catalog::{CatalogItem, ItemTier};
use crate::engine::{
    AdminLogsOutcome, CartOutcome, CheckoutOutcome, CheckoutRequest, HoneypotOutcome,
    HoneypotRequest, LoginOutcome, LoginRequest, LogoutOutcome, OtpOutcome, PaymentOutcome,
    PaymentRequest, ScoreView, ZeroTrustOutcome, ZeroTrustRequest,
};
use crate::gates::{
    CartVerdict, CheckoutChanges, CheckoutVerdict, HoneypotVerdict, MfaVerdict, OtpVerdict,
    ZeroTrustVerdict,
};
use crate::payments::TransactionRecord;
use crate::score::ScoreBand;
use crate::server::admin::{ApiArtifactReport, ApiFirmwareScan};
use crate::server::audit::ApiAuditRecord;
use crate::server::error::{ApiErrorBody, ApiErrorResponse};
use crate::server::session::{AddToCartRequest, OpenSessionResponse, OtpRequest};
use crate::session::{CheckoutContext, SessionSnapshot, ShoppingState};
use crate::signals::{CartFinding, CartRule, Signal, SignalKind, Verdict};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trust Shield API",
        version = "0.1.0",
        description = "Adaptive trust scoring and policy enforcement for retail storefronts"
    ),
    paths(
        crate::server::session::open_session,
        crate::server::session::session_snapshot,
        crate::server::session::login,
        crate::server::session::submit_otp,
        crate::server::session::logout,
        crate::server::session::add_to_cart,
        crate::server::session::checkout,
        crate::server::session::catalog,
        crate::server::admin::zero_trust,
        crate::server::admin::firmware_scan,
        crate::server::admin::refresh_logs,
        crate::server::admin::honeypot,
        crate::server::admin::record_payment,
        crate::server::admin::list_payments,
        crate::server::audit::global_score,
        crate::server::audit::audit_tail,
    ),
    components(schemas(
        // Error
        ApiErrorResponse,
        ApiErrorBody,
        // Sessions
        OpenSessionResponse,
        LoginRequest,
        LoginOutcome,
        OtpRequest,
        OtpOutcome,
        LogoutOutcome,
        SessionSnapshot,
        // Shopping
        CatalogItem,
        ItemTier,
        AddToCartRequest,
        CartOutcome,
        CartFinding,
        CartRule,
        ShoppingState,
        CheckoutRequest,
        CheckoutOutcome,
        CheckoutChanges,
        CheckoutContext,
        // Admin
        ZeroTrustRequest,
        ZeroTrustOutcome,
        ApiFirmwareScan,
        ApiArtifactReport,
        AdminLogsOutcome,
        AdminLogEntry,
        HoneypotRequest,
        HoneypotOutcome,
        PaymentRequest,
        PaymentOutcome,
        TransactionRecord,
        // Scores and verdicts
        ScoreView,
        ScoreBand,
        Signal,
        SignalKind,
        Verdict,
        MfaVerdict,
        OtpVerdict,
        CartVerdict,
        CheckoutVerdict,
        ZeroTrustVerdict,
        HoneypotVerdict,
        // Audit
        ApiAuditRecord,
    )),
    tags(
        (name = "sessions", description = "Shopper sessions, login and MFA"),
        (name = "shopping", description = "Catalog, cart and checkout"),
        (name = "admin", description = "Zero-trust, firmware, admin logs, honeypot and payments"),
        (name = "audit", description = "Scores and the audit trail"),
    )
)]
pub struct ApiDoc;

//! Payment webhooks: signature verification, event parsing, and mapping a
//! price id to a plan and credit allowance.
//!
//! Webhooks are signed with a `Stripe-Signature` header of the form
//! `t=<unix seconds>,v1=<hex hmac-sha256>` where the MAC covers
//! `"<t>.<raw body>"`. Events older or newer than
//! [`SIGNATURE_TOLERANCE_SECS`] are rejected.

use std::path::Path;

use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;

use crate::db::Db;
use crate::error::SeoQueryError;
use crate::validation;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(thiserror::Error, Debug)]
pub enum BillingError {
    #[error("missing Stripe-Signature header")]
    MissingSignature,
    #[error("malformed signature header: {0}")]
    MalformedSignature(String),
    #[error("signature does not match payload")]
    SignatureMismatch,
    #[error("timestamp {timestamp} is outside the {tolerance}s tolerance")]
    TimestampOutOfTolerance { timestamp: i64, tolerance: i64 },
    #[error("invalid event payload: {0}")]
    InvalidPayload(String),
    #[error("no plan configured for price '{0}'")]
    UnknownPrice(String),
    #[error("billing configuration error: {0}")]
    Config(String),
}

impl BillingError {
    /// True when the delivery was valid but the plan table cannot handle it.
    /// The sender should retry once the configuration is fixed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, BillingError::UnknownPrice(_) | BillingError::Config(_))
    }
}

/// A plan and its credit allowance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Plan {
    pub name: String,
    pub credits: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PricedPlan {
    pub price_id: String,
    pub name: String,
    pub credits: i64,
}

/// Price id to plan mapping, loaded from TOML:
///
/// ```toml
/// [free]
/// name = "free"
/// credits = 50
///
/// [[plans]]
/// price_id = "price_1Pro"
/// name = "pro"
/// credits = 5000
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PlanTable {
    free: Plan,
    #[serde(default)]
    plans: Vec<PricedPlan>,
}

impl PlanTable {
    pub fn from_toml_str(s: &str) -> Result<Self, BillingError> {
        let table: PlanTable =
            toml::from_str(s).map_err(|e| BillingError::Config(e.to_string()))?;
        for (i, plan) in table.plans.iter().enumerate() {
            if table.plans[..i].iter().any(|p| p.price_id == plan.price_id) {
                return Err(BillingError::Config(format!(
                    "price '{}' is listed twice",
                    plan.price_id
                )));
            }
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BillingError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| BillingError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn lookup(&self, price_id: &str) -> Option<Plan> {
        self.plans
            .iter()
            .find(|p| p.price_id == price_id)
            .map(|p| Plan {
                name: p.name.clone(),
                credits: p.credits,
            })
    }

    /// Plan assigned when a subscription lapses or is cancelled.
    pub fn free(&self) -> Plan {
        self.free.clone()
    }
}

/// The envelope fields of a webhook event. `data.object` is kept as raw
/// JSON because its shape depends on the event type.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: Value,
}

/// How the user row to update is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    /// Checkout events: upsert by email.
    Email(String),
    /// Subscription events: update the row holding this customer id.
    CustomerId(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanUpdate {
    pub key: UserKey,
    pub plan: String,
    pub credits: i64,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The plan update that was written and the number of user rows it touched.
    Updated { update: PlanUpdate, rows: usize },
    /// Event type the handler does not act on.
    Ignored(String),
}

/// Verifies a signature header against the raw request body.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), BillingError> {
    let mut timestamp: Option<i64> = None;
    let mut signatures: Vec<&str> = Vec::new();
    for part in header.split(',') {
        let (key, value) = part
            .trim()
            .split_once('=')
            .ok_or_else(|| BillingError::MalformedSignature(header.to_string()))?;
        match key {
            "t" => {
                timestamp = Some(value.parse().map_err(|_| {
                    BillingError::MalformedSignature(format!("bad timestamp '{}'", value))
                })?)
            }
            "v1" => signatures.push(value),
            _ => {}
        }
    }
    let timestamp =
        timestamp.ok_or_else(|| BillingError::MalformedSignature("no timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(BillingError::MalformedSignature("no v1 signature".to_string()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::Config(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| match hex::decode(sig) {
        Ok(bytes) => mac.clone().verify_slice(&bytes).is_ok(),
        Err(_) => false,
    });
    if !matched {
        return Err(BillingError::SignatureMismatch);
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(BillingError::TimestampOutOfTolerance {
            timestamp,
            tolerance: SIGNATURE_TOLERANCE_SECS,
        });
    }
    Ok(())
}

/// Builds a signature header for a payload, as the payment provider does.
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, BillingError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BillingError::Config(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let sig = hex::encode(mac.finalize().into_bytes());
    Ok(format!("t={},v1={}", timestamp, sig))
}

/// Decides which plan update an event implies, without touching storage.
pub fn plan_update_for(
    event: &WebhookEvent,
    plans: &PlanTable,
) -> Result<Option<PlanUpdate>, BillingError> {
    let object = &event.data.object;
    match event.event_type.as_str() {
        "checkout.session.completed" => {
            let email = str_at(object, &["customer_details", "email"])
                .or_else(|| str_at(object, &["customer_email"]))
                .ok_or_else(|| {
                    BillingError::InvalidPayload("checkout session has no customer email".into())
                })?;
            let email = validation::validate_email(email)
                .map_err(|e| BillingError::InvalidPayload(e.to_string()))?;
            let price_id = str_at(object, &["metadata", "price_id"]).ok_or_else(|| {
                BillingError::InvalidPayload("checkout session has no metadata.price_id".into())
            })?;
            let plan = plans
                .lookup(price_id)
                .ok_or_else(|| BillingError::UnknownPrice(price_id.to_string()))?;
            Ok(Some(PlanUpdate {
                key: UserKey::Email(email),
                plan: plan.name,
                credits: plan.credits,
                customer_id: str_at(object, &["customer"]).map(str::to_string),
            }))
        }
        "customer.subscription.updated" => {
            let customer = customer_id(object)?;
            let status = str_at(object, &["status"]).unwrap_or_default();
            let plan = if matches!(status, "active" | "trialing") {
                let price_id = object
                    .pointer("/items/data/0/price/id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        BillingError::InvalidPayload("subscription has no price id".into())
                    })?;
                plans
                    .lookup(price_id)
                    .ok_or_else(|| BillingError::UnknownPrice(price_id.to_string()))?
            } else {
                plans.free()
            };
            Ok(Some(PlanUpdate {
                key: UserKey::CustomerId(customer.clone()),
                plan: plan.name,
                credits: plan.credits,
                customer_id: Some(customer),
            }))
        }
        "customer.subscription.deleted" => {
            let customer = customer_id(object)?;
            let plan = plans.free();
            Ok(Some(PlanUpdate {
                key: UserKey::CustomerId(customer.clone()),
                plan: plan.name,
                credits: plan.credits,
                customer_id: Some(customer),
            }))
        }
        _ => Ok(None),
    }
}

fn customer_id(object: &Value) -> Result<String, BillingError> {
    str_at(object, &["customer"])
        .map(str::to_string)
        .ok_or_else(|| BillingError::InvalidPayload("event has no customer id".into()))
}

fn str_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    current.as_str().filter(|s| !s.is_empty())
}

/// Verifies, parses and applies webhook deliveries.
pub struct WebhookHandler {
    secret: String,
    plans: PlanTable,
}

impl WebhookHandler {
    pub fn new(secret: &str, plans: PlanTable) -> Self {
        Self {
            secret: secret.to_string(),
            plans,
        }
    }

    /// Checks the signature and decodes the event.
    pub fn verify(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookEvent, BillingError> {
        let header = signature.ok_or(BillingError::MissingSignature)?;
        verify_signature(payload, header, &self.secret, now)?;
        serde_json::from_slice(payload).map_err(|e| BillingError::InvalidPayload(e.to_string()))
    }

    /// Handles one delivery end to end. Billing errors other than
    /// configuration gaps mean the request was bad; database and
    /// configuration errors mean it should be retried.
    pub fn handle(
        &self,
        db: &Db,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<WebhookOutcome, SeoQueryError> {
        let event = self.verify(payload, signature, now)?;
        let update = match plan_update_for(&event, &self.plans)? {
            Some(update) => update,
            None => {
                tracing::info!("ignoring webhook event {} ({})", event.id, event.event_type);
                return Ok(WebhookOutcome::Ignored(event.event_type));
            }
        };
        let rows = db.apply_plan_update(&update)?;
        tracing::info!(
            "event {} ({}): plan '{}' with {} credits, {} user row(s)",
            event.id,
            event.event_type,
            update.plan,
            update.credits,
            rows
        );
        Ok(WebhookOutcome::Updated { update, rows })
    }
}

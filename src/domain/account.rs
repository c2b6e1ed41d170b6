use super::money::MinorUnits;
use super::timestamp::{TimestampStyle, TransferDate};
use crate::error::{DashboardError, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccountStatus {
    Active,
    Inactive,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Active => f.write_str("ACTIVE"),
            AccountStatus::Inactive => f.write_str("INACTIVE"),
        }
    }
}

/// A worker account as reported by the backend.
///
/// The identity fields, status and daily limit are authoritative from the
/// backend. `gross_volume`, `transferred_invoices` and `last_transfer` are
/// derived by the reconciliation engine and are never read from a payload.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Opaque unique identifier, fixed at creation.
    pub account_id: String,
    /// Display label.
    pub friendly_name: String,
    /// Network address of the worker process.
    pub worker_url: String,
    pub status: AccountStatus,
    /// Cap on transferable value per day, in minor units.
    pub daily_limit: MinorUnits,
    #[serde(skip_deserializing, default)]
    pub gross_volume: MinorUnits,
    #[serde(skip_deserializing, default)]
    pub transferred_invoices: usize,
    #[serde(skip_deserializing, default)]
    pub last_transfer: Option<TransferDate>,
}

impl Account {
    pub fn new(
        account_id: impl Into<String>,
        friendly_name: impl Into<String>,
        worker_url: impl Into<String>,
        daily_limit: MinorUnits,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            friendly_name: friendly_name.into(),
            worker_url: worker_url.into(),
            status: AccountStatus::Active,
            daily_limit,
            gross_volume: MinorUnits::ZERO,
            transferred_invoices: 0,
            last_transfer: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Human-readable last transfer, or `N/A` when nothing was transferred.
    pub fn last_transfer_display(&self, style: &TimestampStyle) -> String {
        style.render_optional(self.last_transfer.as_ref())
    }
}

/// Default daily limit offered when creating a worker, in minor units.
pub const DEFAULT_DAILY_LIMIT: MinorUnits = MinorUnits(10_000);

const API_KEY_PREFIX: &str = "sk_";

/// Request body for creating a worker.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorker {
    pub account_id: String,
    pub friendly_name: String,
    pub worker_url: String,
    pub daily_limit: MinorUnits,
    #[serde(serialize_with = "serialize_secret")]
    pub stripe_api_key: SecretString,
}

fn serialize_secret<S>(secret: &SecretString, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

impl NewWorker {
    /// Checks required fields and the secret key format before anything is sent.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("account id", self.account_id.as_str()),
            ("friendly name", self.friendly_name.as_str()),
            ("worker URL", self.worker_url.as_str()),
            ("API key", self.stripe_api_key.expose_secret().as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(DashboardError::Validation(format!("{field} is required")));
        }
        if !self.stripe_api_key.expose_secret().starts_with(API_KEY_PREFIX) {
            return Err(DashboardError::Validation(
                "API key must start with 'sk_live_' or 'sk_test_'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request body for the daily limit update.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct LimitUpdate {
    pub daily_limit: MinorUnits,
}

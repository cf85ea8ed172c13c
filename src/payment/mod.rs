pub mod balance;
pub mod executor;
pub mod negotiator;
pub mod orchestrator;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::assets::AssetId;

pub const REJECT_UNSUPPORTED_ASSET: &str = "unsupported asset";
pub const REJECT_INSUFFICIENT_BALANCE: &str = "insufficient balance";

/// Where the recipient's funds land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientScope {
    /// An address on the destination chain.
    ExternalChain,
    /// An account custodied inside the provider's intents contract.
    WithinProvider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapMode {
    ExactInput,
    ExactOutput,
}

/// How the destination asset is spelled in a quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationEncoding {
    /// Canonical registry id, e.g. `nep141:base-0x8335...omft.near`.
    AssetId,
    /// `<chain>:<address>`, e.g. `base:0x8335...`.
    ChainPrefixed,
    /// Bare on-chain address.
    BareAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    pub origin_asset: AssetId,
    pub destination_asset: AssetId,
    /// Smallest unit of the origin asset.
    pub amount: u128,
    pub recipient: String,
    pub recipient_scope: RecipientScope,
    pub refund_recipient: String,
    /// Each quote attempt gets `now + deadline_window` as its deadline.
    pub deadline_window: TimeDelta,
    pub max_slippage_bps: u32,
    pub swap_mode: SwapMode,
    pub destination_encoding: DestinationEncoding,
    /// Ask for an indicative quote only; the provider issues no deposit
    /// address.
    pub dry: bool,
}

/// One alternate set of request parameters layered over a [`TransferIntent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamOverride {
    pub label: String,
    pub recipient_scope: Option<RecipientScope>,
    pub destination_encoding: Option<DestinationEncoding>,
    pub swap_mode: Option<SwapMode>,
}

impl ParamOverride {
    pub fn canonical() -> Self {
        Self {
            label: "asset-id".to_string(),
            ..Default::default()
        }
    }

    pub fn chain_prefixed() -> Self {
        Self {
            label: "chain-prefixed".to_string(),
            destination_encoding: Some(DestinationEncoding::ChainPrefixed),
            ..Default::default()
        }
    }

    pub fn bare_address() -> Self {
        Self {
            label: "bare-address".to_string(),
            destination_encoding: Some(DestinationEncoding::BareAddress),
            ..Default::default()
        }
    }

    pub fn within_provider() -> Self {
        Self {
            label: "within-provider".to_string(),
            recipient_scope: Some(RecipientScope::WithinProvider),
            ..Default::default()
        }
    }

    pub fn exact_output() -> Self {
        Self {
            label: "exact-output".to_string(),
            swap_mode: Some(SwapMode::ExactOutput),
            ..Default::default()
        }
    }

    pub fn default_variants() -> Vec<Self> {
        vec![
            Self::canonical(),
            Self::chain_prefixed(),
            Self::bare_address(),
            Self::within_provider(),
            Self::exact_output(),
        ]
    }

    pub fn apply(&self, intent: &TransferIntent) -> TransferIntent {
        let mut out = intent.clone();
        if let Some(scope) = self.recipient_scope {
            out.recipient_scope = scope;
        }
        if let Some(encoding) = self.destination_encoding {
            out.destination_encoding = encoding;
        }
        if let Some(mode) = self.swap_mode {
            out.swap_mode = mode;
        }
        out
    }
}

impl fmt::Display for ParamOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for ParamOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "asset-id" => Ok(Self::canonical()),
            "chain-prefixed" => Ok(Self::chain_prefixed()),
            "bare-address" => Ok(Self::bare_address()),
            "within-provider" => Ok(Self::within_provider()),
            "exact-output" => Ok(Self::exact_output()),
            other => Err(format!("unknown quote variant preset: {other}")),
        }
    }
}

/// Provider-issued offer. Consumed by value when executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub quoted_input_amount: u128,
    pub quoted_output_amount: u128,
    pub deposit_address: String,
    pub expiry: DateTime<Utc>,
    pub provider_quote_id: String,
    /// Label of the variant that produced this quote.
    pub variant: String,
}

impl Quote {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Completed {
        #[serde(with = "amount_string")]
        settled_amount: u128,
    },
    Rejected {
        reason: String,
    },
    /// Settlement was not observed in time; funds may still arrive.
    TimedOut,
    Failed {
        cause: String,
    },
    /// Dry run: a quote was obtained and nothing was moved.
    Simulated {
        #[serde(with = "amount_string")]
        quoted_input_amount: u128,
        #[serde(with = "amount_string")]
        quoted_output_amount: u128,
    },
}

impl ExecutionOutcome {
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    pub fn failed(cause: impl Into<String>) -> Self {
        Self::Failed {
            cause: cause.into(),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::Rejected { .. } => "rejected",
            Self::TimedOut => "timed_out",
            Self::Failed { .. } => "failed",
            Self::Simulated { .. } => "simulated",
        }
    }
}

/// A single payment to run through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub payment_id: String,
    pub recipient: String,
    /// Smallest unit of `origin_asset`.
    pub amount: u128,
    pub origin_asset: AssetId,
    pub token: String,
    pub chain: String,
}

// u128 does not survive serde's buffered (internally tagged) path, so
// amounts travel as decimal strings.
mod amount_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//! Static registry of the fungible assets the intents contract can hold.
//!
//! The table is built once at startup and never mutated afterwards. Lookups
//! by chain, on-chain address and symbol go through indices derived at build
//! time.

mod table;

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical identifier of an asset on a specific chain, e.g.
/// `nep141:base-0x833589fcd6edb6e08f4c7c32d4f71b54bda02913.omft.near`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub const NATIVE_ADDRESS: &str = "native";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub chain: String,
    /// On-chain contract address, or `native` for the chain's own coin.
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
    pub name: String,
}

impl AssetInfo {
    pub fn is_native(&self) -> bool {
        self.address == NATIVE_ADDRESS
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("asset not found: {0}")]
    NotFound(AssetId),

    #[error("unsupported token/chain combination: {token} on {chain}")]
    UnsupportedRoute { token: String, chain: String },
}

#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: HashMap<AssetId, AssetInfo>,
    by_chain: HashMap<String, Vec<AssetId>>,
    by_address: HashMap<String, Vec<AssetId>>,
    by_symbol: HashMap<String, Vec<AssetId>>,
    routes: HashMap<(String, String), AssetId>,
}

impl AssetRegistry {
    /// Registry populated with the built-in token table and token/chain routes.
    pub fn builtin() -> Self {
        let assets = table::ASSETS.iter().map(|a| {
            (
                AssetId::new(a.id),
                AssetInfo {
                    chain: a.chain.to_string(),
                    address: a.address.to_string(),
                    symbol: a.symbol.to_string(),
                    decimals: a.decimals,
                    name: a.name.to_string(),
                },
            )
        });
        let routes = table::ROUTES
            .iter()
            .map(|(token, chain, id)| (token.to_string(), chain.to_string(), AssetId::new(*id)));
        Self::new(assets, routes)
    }

    pub fn new(
        assets: impl IntoIterator<Item = (AssetId, AssetInfo)>,
        routes: impl IntoIterator<Item = (String, String, AssetId)>,
    ) -> Self {
        let assets: HashMap<AssetId, AssetInfo> = assets.into_iter().collect();

        let mut by_chain: HashMap<String, Vec<AssetId>> = HashMap::new();
        let mut by_address: HashMap<String, Vec<AssetId>> = HashMap::new();
        let mut by_symbol: HashMap<String, Vec<AssetId>> = HashMap::new();
        for (id, info) in &assets {
            by_chain
                .entry(info.chain.to_ascii_lowercase())
                .or_default()
                .push(id.clone());
            by_address
                .entry(info.address.to_ascii_lowercase())
                .or_default()
                .push(id.clone());
            by_symbol
                .entry(info.symbol.to_ascii_uppercase())
                .or_default()
                .push(id.clone());
        }
        for ids in by_chain
            .values_mut()
            .chain(by_address.values_mut())
            .chain(by_symbol.values_mut())
        {
            ids.sort();
        }

        let routes = routes
            .into_iter()
            .map(|(token, chain, id)| {
                (
                    (token.to_ascii_uppercase(), chain.to_ascii_lowercase()),
                    id,
                )
            })
            .collect();

        Self {
            assets,
            by_chain,
            by_address,
            by_symbol,
            routes,
        }
    }

    pub fn lookup(&self, id: &AssetId) -> Result<&AssetInfo, RegistryError> {
        self.assets
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.assets.contains_key(id)
    }

    pub fn by_chain(&self, chain: &str) -> &[AssetId] {
        self.by_chain
            .get(&chain.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Addresses compare case-insensitively; EVM checksummed and lowercased
    /// forms resolve to the same assets.
    pub fn by_address(&self, address: &str) -> &[AssetId] {
        self.by_address
            .get(&address.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn by_symbol(&self, symbol: &str) -> &[AssetId] {
        self.by_symbol
            .get(&symbol.to_ascii_uppercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn supported_chains(&self) -> Vec<&str> {
        self.assets
            .values()
            .map(|a| a.chain.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Resolves a user-facing token/chain pair such as `USDC` on `Base` to
    /// the destination asset id.
    pub fn resolve_route(&self, token: &str, chain: &str) -> Result<&AssetId, RegistryError> {
        let key = (token.to_ascii_uppercase(), chain.to_ascii_lowercase());
        self.routes
            .get(&key)
            .filter(|id| self.assets.contains_key(*id))
            .ok_or_else(|| RegistryError::UnsupportedRoute {
                token: token.to_string(),
                chain: chain.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &AssetInfo)> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Renders a smallest-unit amount as a decimal string. Display only.
pub fn format_units(amount: u128, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let digits = amount.to_string();
    let decimals = usize::from(decimals);
    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{frac}")
    }
}

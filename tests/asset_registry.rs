use anyhow::Result;

use recurring_intents::assets::{AssetId, AssetInfo, AssetRegistry, RegistryError, format_units};

const BASE_USDC: &str = "nep141:base-0x833589fcd6edb6e08f4c7c32d4f71b54bda02913.omft.near";

#[test]
fn every_builtin_asset_resolves_with_a_chain() -> Result<()> {
    let registry = AssetRegistry::builtin();
    assert!(!registry.is_empty());

    for (id, _) in registry.iter() {
        let info = registry.lookup(id)?;
        assert!(!info.chain.is_empty(), "{id} has no chain");
        assert!(!info.symbol.is_empty(), "{id} has no symbol");
    }
    Ok(())
}

#[test]
fn lookup_unknown_asset_is_not_found() {
    let registry = AssetRegistry::builtin();
    let id = AssetId::new("nep141:does-not-exist.near");

    assert_eq!(registry.lookup(&id), Err(RegistryError::NotFound(id.clone())));
    assert!(!registry.contains(&id));
}

#[test]
fn base_usdc_has_six_decimals() -> Result<()> {
    let registry = AssetRegistry::builtin();
    let info = registry.lookup(&AssetId::new(BASE_USDC))?;

    assert_eq!(info.chain, "base");
    assert_eq!(info.symbol, "USDC");
    assert_eq!(info.decimals, 6);
    assert!(!info.is_native());
    Ok(())
}

#[test]
fn routes_resolve_case_insensitively() -> Result<()> {
    let registry = AssetRegistry::builtin();

    assert_eq!(registry.resolve_route("USDC", "Base")?.as_str(), BASE_USDC);
    assert_eq!(registry.resolve_route("usdc", "base")?.as_str(), BASE_USDC);
    assert_eq!(
        registry.resolve_route("ETH", "Arbitrum")?.as_str(),
        "nep141:arb.omft.near"
    );

    let err = registry.resolve_route("DOGE", "base").unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnsupportedRoute {
            token: "DOGE".to_string(),
            chain: "base".to_string(),
        }
    );
    Ok(())
}

#[test]
fn secondary_indexes() {
    let registry = AssetRegistry::builtin();
    let base_usdc = AssetId::new(BASE_USDC);

    let checksummed = registry.by_address("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
    let lowered = registry.by_address("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913");
    assert_eq!(checksummed, lowered);
    assert!(lowered.contains(&base_usdc));

    assert!(registry.by_chain("BASE").contains(&base_usdc));
    assert!(registry.by_symbol("usdc").contains(&base_usdc));
    assert!(registry.by_symbol("usdc").len() > 1);
    assert!(registry.by_chain("no-such-chain").is_empty());

    let chains = registry.supported_chains();
    for chain in ["near", "eth", "base", "arbitrum", "solana"] {
        assert!(chains.contains(&chain), "missing chain {chain}");
    }
}

#[test]
fn custom_registry_without_route_target() {
    let id = AssetId::new("nep141:token.test.near");
    let registry = AssetRegistry::new(
        [(
            id.clone(),
            AssetInfo {
                chain: "near".to_string(),
                address: "token.test.near".to_string(),
                symbol: "TST".to_string(),
                decimals: 8,
                name: "Test".to_string(),
            },
        )],
        [(
            "TST".to_string(),
            "near".to_string(),
            AssetId::new("nep141:missing.near"),
        )],
    );

    assert_eq!(registry.len(), 1);
    assert!(registry.lookup(&id).is_ok());
    // A route pointing outside the table is not usable.
    assert!(registry.resolve_route("TST", "near").is_err());
}

#[test]
fn format_units_uses_integer_arithmetic() {
    assert_eq!(format_units(100_000, 6), "0.1");
    assert_eq!(format_units(1_500_000, 6), "1.5");
    assert_eq!(format_units(42, 6), "0.000042");
    assert_eq!(format_units(0, 6), "0");
    assert_eq!(format_units(7, 0), "7");
    assert_eq!(
        format_units(1_000_000_000_000_000_000_000_000, 24),
        "1"
    );
    assert_eq!(
        format_units(u128::MAX, 24),
        "340282366920938.463463374607431768211455"
    );
}

pub(super) struct AssetRow {
    pub id: &'static str,
    pub chain: &'static str,
    pub address: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub name: &'static str,
}

pub(super) const ASSETS: &[AssetRow] = &[
    AssetRow {
        id: "nep141:wrap.near",
        chain: "near",
        address: "wrap.near",
        symbol: "NEAR",
        decimals: 24,
        name: "Near",
    },
    AssetRow {
        id: "nep141:near.omft.near",
        chain: "near",
        address: "wrap.near",
        symbol: "NEAR",
        decimals: 24,
        name: "Near",
    },
    AssetRow {
        id: "nep141:eth-0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.omft.near",
        chain: "eth",
        address: "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48",
        symbol: "USDC",
        decimals: 6,
        name: "USD Coin",
    },
    AssetRow {
        id: "nep141:17208628f84f5d6ad33f0da3bbbeb27ffcb398eac501a31bd6ad2011e36133a1",
        chain: "near",
        address: "17208628f84f5d6ad33f0da3bbbeb27ffcb398eac501a31bd6ad2011e36133a1",
        symbol: "USDC",
        decimals: 6,
        name: "USD Coin",
    },
    AssetRow {
        id: "nep141:base-0x833589fcd6edb6e08f4c7c32d4f71b54bda02913.omft.near",
        chain: "base",
        address: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
        symbol: "USDC",
        decimals: 6,
        name: "USD Coin",
    },
    AssetRow {
        id: "nep141:arb-0xaf88d065e77c8cc2239327c5edb3a432268e5831.omft.near",
        chain: "arbitrum",
        address: "0xaf88d065e77c8cC2239327C5EDb3A432268e5831",
        symbol: "USDC",
        decimals: 6,
        name: "USD Coin",
    },
    AssetRow {
        id: "nep141:sol-5ce3bf3a31af18be40ba30f721101b4341690186.omft.near",
        chain: "solana",
        address: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
        symbol: "USDC",
        decimals: 6,
        name: "USD Coin",
    },
    AssetRow {
        id: "nep141:gnosis-0x2a22f9c3b484c3629090feed35f17ff8f88f76f0.omft.near",
        chain: "gnosis",
        address: "0x2a22f9c3b484c3629090feed35f17ff8f88f76f0",
        symbol: "USDC",
        decimals: 6,
        name: "USD Coin",
    },
    AssetRow {
        id: "nep141:eth-0xdac17f958d2ee523a2206206994597c13d831ec7.omft.near",
        chain: "eth",
        address: "0xdAC17F958D2ee523a2206206994597C13D831ec7",
        symbol: "USDT",
        decimals: 6,
        name: "Tether USD",
    },
    AssetRow {
        id: "nep141:usdt.tether-token.near",
        chain: "near",
        address: "usdt.tether-token.near",
        symbol: "USDT",
        decimals: 6,
        name: "Tether USD",
    },
    AssetRow {
        id: "nep141:arb-0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9.omft.near",
        chain: "arbitrum",
        address: "0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9",
        symbol: "USDT",
        decimals: 6,
        name: "Tether USD",
    },
    AssetRow {
        id: "nep141:sol-c800a4bd850783ccb82c2b2c7e84175443606352.omft.near",
        chain: "solana",
        address: "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB",
        symbol: "USDT",
        decimals: 6,
        name: "Tether USD",
    },
    AssetRow {
        id: "nep141:tron-d28a265909efecdcee7c5028585214ea0b96f015.omft.near",
        chain: "tron",
        address: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t",
        symbol: "USDT",
        decimals: 6,
        name: "Tether USD",
    },
    AssetRow {
        id: "nep141:eth.omft.near",
        chain: "eth",
        address: "native",
        symbol: "ETH",
        decimals: 18,
        name: "ETH",
    },
    AssetRow {
        id: "nep141:eth.bridge.near",
        chain: "near",
        address: "eth.bridge.near",
        symbol: "ETH",
        decimals: 18,
        name: "ETH",
    },
    AssetRow {
        id: "nep141:aurora",
        chain: "near",
        address: "aurora",
        symbol: "ETH",
        decimals: 18,
        name: "ETH",
    },
    AssetRow {
        id: "nep141:base.omft.near",
        chain: "base",
        address: "native",
        symbol: "ETH",
        decimals: 18,
        name: "ETH",
    },
    AssetRow {
        id: "nep141:arb.omft.near",
        chain: "arbitrum",
        address: "native",
        symbol: "ETH",
        decimals: 18,
        name: "ETH",
    },
    AssetRow {
        id: "nep141:eth-0x6b175474e89094c44da98b954eedeac495271d0f.omft.near",
        chain: "eth",
        address: "0x6b175474e89094c44da98b954eedeac495271d0f",
        symbol: "DAI",
        decimals: 18,
        name: "DAI",
    },
    AssetRow {
        id: "nep141:gnosis.omft.near",
        chain: "gnosis",
        address: "native",
        symbol: "xDAI",
        decimals: 18,
        name: "xDAI",
    },
    AssetRow {
        id: "nep141:btc.omft.near",
        chain: "bitcoin",
        address: "native",
        symbol: "BTC",
        decimals: 8,
        name: "Bitcoin",
    },
    AssetRow {
        id: "nep141:nbtc.bridge.near",
        chain: "near",
        address: "nbtc.bridge.near",
        symbol: "nBTC",
        decimals: 8,
        name: "Bitcoin",
    },
    AssetRow {
        id: "nep141:aaaaaa20d9e0e2461697782ef11675f668207961.factory.bridge.near",
        chain: "near",
        address: "aaaaaa20d9e0e2461697782ef11675f668207961.factory.bridge.near",
        symbol: "AURORA",
        decimals: 18,
        name: "Aurora",
    },
    AssetRow {
        id: "nep141:eth-0xaaaaaa20d9e0e2461697782ef11675f668207961.omft.near",
        chain: "eth",
        address: "0xAaAAAA20D9E0e2461697782ef11675f668207961",
        symbol: "AURORA",
        decimals: 18,
        name: "Aurora",
    },
    AssetRow {
        id: "nep141:zec.omft.near",
        chain: "zcash",
        address: "native",
        symbol: "ZEC",
        decimals: 8,
        name: "Zcash",
    },
    AssetRow {
        id: "nep141:bera.omft.near",
        chain: "berachain",
        address: "native",
        symbol: "BERA",
        decimals: 18,
        name: "BERA",
    },
    AssetRow {
        id: "nep141:sol-c58e6539c2f2e097c251f8edf11f9c03e581f8d4.omft.near",
        chain: "solana",
        address: "6p6xgHyF7AeE6TZkSmFsko444wqoP15icUSqi2jfGiPN",
        symbol: "TRUMP",
        decimals: 6,
        name: "OFFICIAL TRUMP",
    },
    AssetRow {
        id: "nep141:sol-d600e625449a4d9380eaf5e3265e54c90d34e260.omft.near",
        chain: "solana",
        address: "FUAfBo2jgks6gB4Z4LfZkqSZgzNucisEHqnNebaRxM1P",
        symbol: "MELANIA",
        decimals: 6,
        name: "Official Melania Meme",
    },
    AssetRow {
        id: "nep141:eth-0x6982508145454ce325ddbe47a25d4ec3d2311933.omft.near",
        chain: "eth",
        address: "0x6982508145454Ce325dDbE47a25d4ec3d2311933",
        symbol: "PEPE",
        decimals: 18,
        name: "Pepe",
    },
    AssetRow {
        id: "nep141:eth-0x95ad61b0a150d79219dcf64e1e6cc01f0b64c4ce.omft.near",
        chain: "eth",
        address: "0x95aD61b0a150d79219dCF64E1E6Cc01f0B64C4cE",
        symbol: "SHIB",
        decimals: 18,
        name: "Shiba Inu",
    },
    AssetRow {
        id: "nep141:eth-0x514910771af9ca656af840dff83e8264ecf986ca.omft.near",
        chain: "eth",
        address: "0x514910771AF9Ca656af840dff83E8264EcF986CA",
        symbol: "LINK",
        decimals: 18,
        name: "Chainlink",
    },
];

/// User-facing (token, chain) pairs and the asset they settle into.
pub(super) const ROUTES: &[(&str, &str, &str)] = &[
    (
        "USDC",
        "base",
        "nep141:base-0x833589fcd6edb6e08f4c7c32d4f71b54bda02913.omft.near",
    ),
    (
        "USDC",
        "ethereum",
        "nep141:eth-0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48.omft.near",
    ),
    (
        "USDC",
        "arbitrum",
        "nep141:arb-0xaf88d065e77c8cc2239327c5edb3a432268e5831.omft.near",
    ),
    (
        "USDC",
        "solana",
        "nep141:sol-5ce3bf3a31af18be40ba30f721101b4341690186.omft.near",
    ),
    (
        "USDT",
        "ethereum",
        "nep141:eth-0xdac17f958d2ee523a2206206994597c13d831ec7.omft.near",
    ),
    (
        "USDT",
        "arbitrum",
        "nep141:arb-0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9.omft.near",
    ),
    (
        "USDT",
        "solana",
        "nep141:sol-c800a4bd850783ccb82c2b2c7e84175443606352.omft.near",
    ),
    (
        "ETH",
        "ethereum",
        "nep141:eth.omft.near",
    ),
    (
        "ETH",
        "base",
        "nep141:base.omft.near",
    ),
    (
        "ETH",
        "arbitrum",
        "nep141:arb.omft.near",
    ),
];

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use chrono::TimeDelta;
use clap::Parser as _;
use recurring_intents::assets::{AssetId, AssetRegistry};
use recurring_intents::near::account::{NearAccount, NearConfig};
use recurring_intents::near::{DEFAULT_INTENTS_CONTRACT, DEFAULT_WRAP_CONTRACT};
use recurring_intents::oneclick::client::{DEFAULT_BASE_URL, OneClickClient, OneClickConfig};
use recurring_intents::payment::ParamOverride;
use recurring_intents::payment::executor::{ExecutorConfig, TransferExecutor};
use recurring_intents::payment::negotiator::QuoteNegotiator;
use recurring_intents::payment::orchestrator::{OrchestratorConfig, PaymentOrchestrator};
use recurring_intents::proto::v1::payment_service_server::PaymentServiceServer;
use recurring_intents::schedule::scheduler::Scheduler;
use recurring_intents::schedule::service::PaymentServiceImpl;
use tonic::transport::Server;

#[derive(Debug, clap::Parser)]
struct Args {
    #[arg(long, env = "PAY_LISTEN_ADDR", default_value = "127.0.0.1:50061")]
    listen_addr: String,

    #[arg(long, env = "NEAR_RPC_URL", default_value = "https://rpc.mainnet.near.org")]
    near_rpc_url: String,

    #[arg(long, env = "NEAR_ACCOUNT_ID")]
    near_account_id: String,

    #[arg(long, env = "NEAR_PRIVATE_KEY", hide_env_values = true)]
    near_private_key: String,

    #[arg(long, env = "INTENTS_CONTRACT", default_value = DEFAULT_INTENTS_CONTRACT)]
    intents_contract: String,

    #[arg(long, env = "WRAP_CONTRACT", default_value = DEFAULT_WRAP_CONTRACT)]
    wrap_contract: String,

    #[arg(long, env = "ONECLICK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    oneclick_base_url: String,

    #[arg(long, env = "ONECLICK_JWT", hide_env_values = true)]
    oneclick_jwt: Option<String>,

    #[arg(long, env = "ONECLICK_TIMEOUT_SECS", default_value_t = 30)]
    oneclick_timeout_secs: u64,

    /// Asset spent by every payment, as held in the intents contract.
    #[arg(long, env = "ORIGIN_ASSET", default_value = "nep141:wrap.near")]
    origin_asset: String,

    /// Smallest-unit floor for the balance check.
    #[arg(long, env = "MIN_REQUIRED_BALANCE", default_value_t = 0)]
    min_required_balance: u128,

    #[arg(long, env = "SLIPPAGE_BPS", default_value_t = 100)]
    slippage_bps: u32,

    #[arg(long, env = "QUOTE_WINDOW_SECS", default_value_t = 600)]
    quote_window_secs: i64,

    /// Comma-separated quote variant presets, tried in order.
    #[arg(
        long,
        env = "QUOTE_VARIANTS",
        value_delimiter = ',',
        default_value = "asset-id,chain-prefixed,bare-address,within-provider,exact-output"
    )]
    variants: Vec<ParamOverride>,

    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 5)]
    poll_interval_secs: u64,

    #[arg(long, env = "SETTLEMENT_TIMEOUT_SECS", default_value_t = 600)]
    settlement_timeout_secs: u64,

    #[arg(long, env = "TICK_INTERVAL_SECS", default_value_t = 60)]
    tick_interval_secs: u64,

    /// SQLite file for payment records; in-memory when absent.
    #[arg(long, env = "STORE_PATH")]
    store_path: Option<PathBuf>,

    /// Deposit native NEAR into the intents contract to cover a shortfall
    /// of the wrapped native asset.
    #[arg(long, env = "WRAP_NATIVE", default_value_t = false)]
    wrap_native: bool,

    /// Quote only; never deposit or transfer.
    #[arg(long, env = "SIMULATE", default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    recurring_intents::logging::init().context("init logging")?;

    let args = Args::parse();
    let listen_addr: SocketAddr = args.listen_addr.parse().context("parse listen_addr")?;
    anyhow::ensure!(args.tick_interval_secs > 0, "tick_interval_secs must be > 0");
    anyhow::ensure!(!args.variants.is_empty(), "at least one quote variant is required");

    let registry = Arc::new(AssetRegistry::builtin());
    let origin_asset = AssetId::new(args.origin_asset);
    registry
        .lookup(&origin_asset)
        .context("origin_asset is not in the asset registry")?;

    let account = Arc::new(
        NearAccount::new(NearConfig {
            rpc_url: args.near_rpc_url,
            account_id: args.near_account_id,
            secret_key: args.near_private_key,
            intents_contract: args.intents_contract,
            wrap_contract: args.wrap_contract,
        })
        .context("create NEAR account")?,
    );

    let provider = Arc::new(
        OneClickClient::new(OneClickConfig {
            base_url: args.oneclick_base_url,
            jwt: args.oneclick_jwt,
            request_timeout: Duration::from_secs(args.oneclick_timeout_secs),
        })
        .context("create 1Click client")?,
    );

    let negotiator = QuoteNegotiator::new(provider.clone(), registry.clone());
    let executor = TransferExecutor::new(
        provider,
        ExecutorConfig {
            poll_interval: Duration::from_secs(args.poll_interval_secs),
            settlement_timeout: Duration::from_secs(args.settlement_timeout_secs),
        },
    );
    let orchestrator = Arc::new(PaymentOrchestrator::new(
        account,
        registry.clone(),
        negotiator,
        executor,
        OrchestratorConfig {
            min_required_balance: args.min_required_balance,
            max_slippage_bps: args.slippage_bps,
            quote_window: TimeDelta::seconds(args.quote_window_secs),
            variants: args.variants,
            wrap_native: args.wrap_native,
            dry_run: args.dry_run,
            ..Default::default()
        },
    ));

    let scheduler = match args.store_path {
        Some(path) => Scheduler::open(path, orchestrator, registry.clone())
            .context("open scheduler store")?,
        None => Scheduler::new(orchestrator, registry.clone()).context("create scheduler")?,
    };
    let scheduler = Arc::new(scheduler);

    let status = scheduler.status().context("read scheduler status")?;
    tracing::info!(
        account_id = %status.account_id,
        payments = status.total_payments,
        active = status.active_payments,
        origin_asset = %origin_asset,
        dry_run = args.dry_run,
        "scheduler ready"
    );

    scheduler.spawn_driver(Duration::from_secs(args.tick_interval_secs));

    let svc = PaymentServiceImpl::new(scheduler, origin_asset);

    tracing::info!(%listen_addr, "starting payment gRPC server");

    Server::builder()
        .add_service(PaymentServiceServer::new(svc))
        .serve(listen_addr)
        .await
        .context("serve gRPC")?;

    Ok(())
}

use anyhow::{Context as _, Result};
use clap::{Parser as _, Subcommand};
use recurring_intents::assets::{AssetId, AssetInfo, AssetRegistry};
use recurring_intents::proto::v1::payment_service_client::PaymentServiceClient;
use recurring_intents::proto::v1::{
    AddPaymentRequest, CancelPaymentRequest, ExecuteNowRequest, GetStatusRequest,
    ListPaymentsRequest, Outcome, OutcomeKind, RecurringPayment, UpdateFrequencyRequest,
};
use recurring_intents::schedule::Frequency;
use recurring_intents::schedule::service::frequency_to_proto;
use serde_json::json;
use tonic::transport::Channel;

#[derive(Debug, clap::Parser)]
struct Args {
    #[arg(long, env = "PAY_GRPC_URL", default_value = "http://127.0.0.1:50061")]
    grpc_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Add {
        #[arg(long)]
        recipient: String,

        /// Smallest unit of the origin asset.
        #[arg(long)]
        amount: String,

        #[arg(long)]
        token: String,

        #[arg(long)]
        chain: String,

        /// 5min, weekly or monthly.
        #[arg(long)]
        frequency: Frequency,
    },
    Cancel {
        #[arg(long)]
        id: String,
    },
    List {
        #[arg(long, default_value_t = false)]
        active_only: bool,
    },
    ExecuteNow {
        #[arg(long)]
        id: String,
    },
    UpdateFrequency {
        #[arg(long)]
        id: String,

        #[arg(long)]
        frequency: Frequency,
    },
    Status,
    /// Query the built-in asset registry without contacting the server.
    Assets {
        #[arg(long)]
        chain: Option<String>,

        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    recurring_intents::logging::init().context("init logging")?;
    let args = Args::parse();

    let out = match args.command {
        Command::Assets { chain, symbol, id } => assets_json(chain, symbol, id)?,
        command => remote(&args.grpc_url, command).await?,
    };

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

async fn remote(grpc_url: &str, command: Command) -> Result<serde_json::Value> {
    let mut client: PaymentServiceClient<Channel> =
        PaymentServiceClient::connect(grpc_url.to_string())
            .await
            .context("connect gRPC")?;

    let out = match command {
        Command::Add {
            recipient,
            amount,
            token,
            chain,
            frequency,
        } => {
            let payment = client
                .add_payment(AddPaymentRequest {
                    recipient,
                    amount,
                    token,
                    chain,
                    frequency: frequency_to_proto(frequency) as i32,
                })
                .await
                .context("AddPayment")?
                .into_inner();

            payment_json(payment)
        }
        Command::Cancel { id } => {
            let payment = client
                .cancel_payment(CancelPaymentRequest { id })
                .await
                .context("CancelPayment")?
                .into_inner();

            payment_json(payment)
        }
        Command::List { active_only } => {
            let resp = client
                .list_payments(ListPaymentsRequest { active_only })
                .await
                .context("ListPayments")?
                .into_inner();

            json!({
              "payments": resp.payments.into_iter().map(payment_json).collect::<Vec<_>>(),
            })
        }
        Command::ExecuteNow { id } => {
            let resp = client
                .execute_now(ExecuteNowRequest { id })
                .await
                .context("ExecuteNow")?
                .into_inner();

            json!({
              "payment": resp.payment.map(payment_json),
              "outcome": resp.outcome.map(outcome_json),
            })
        }
        Command::UpdateFrequency { id, frequency } => {
            let payment = client
                .update_frequency(UpdateFrequencyRequest {
                    id,
                    frequency: frequency_to_proto(frequency) as i32,
                })
                .await
                .context("UpdateFrequency")?
                .into_inner();

            payment_json(payment)
        }
        Command::Status => {
            let status = client
                .get_status(GetStatusRequest {})
                .await
                .context("GetStatus")?
                .into_inner();

            json!({
              "account_id": status.account_id,
              "total_payments": status.total_payments,
              "active_payments": status.active_payments,
              "in_flight": status.in_flight,
              "last_tick_at": status.last_tick_at,
            })
        }
        Command::Assets { .. } => anyhow::bail!("assets is answered without the server"),
    };
    Ok(out)
}

fn assets_json(
    chain: Option<String>,
    symbol: Option<String>,
    id: Option<String>,
) -> Result<serde_json::Value> {
    let registry = AssetRegistry::builtin();

    if let Some(id) = id {
        let id = AssetId::new(id);
        let info = registry.lookup(&id).context("lookup asset")?;
        return Ok(asset_json(&id, info));
    }

    let mut ids: Vec<&AssetId> = match (&chain, &symbol) {
        (Some(chain), _) => registry.by_chain(chain).iter().collect(),
        (None, Some(symbol)) => registry.by_symbol(symbol).iter().collect(),
        (None, None) => registry.iter().map(|(id, _)| id).collect(),
    };
    if let (Some(_), Some(symbol)) = (&chain, &symbol) {
        let same_symbol = registry.by_symbol(symbol);
        ids.retain(|id| same_symbol.contains(*id));
    }
    ids.sort();

    let mut assets = Vec::with_capacity(ids.len());
    for id in ids {
        let info = registry.lookup(id).context("lookup asset")?;
        assets.push(asset_json(id, info));
    }

    Ok(json!({
      "chains": registry.supported_chains(),
      "assets": assets,
    }))
}

fn asset_json(id: &AssetId, info: &AssetInfo) -> serde_json::Value {
    json!({
      "id": id.as_str(),
      "chain": info.chain,
      "address": info.address,
      "symbol": info.symbol,
      "decimals": info.decimals,
      "name": info.name,
    })
}

fn payment_json(payment: RecurringPayment) -> serde_json::Value {
    let frequency = recurring_intents::proto::v1::Frequency::try_from(payment.frequency)
        .ok()
        .map(|f| format!("{f:?}"))
        .unwrap_or_else(|| format!("UNKNOWN({})", payment.frequency));

    json!({
      "id": payment.id,
      "recipient": payment.recipient,
      "amount": payment.amount,
      "origin_asset": payment.origin_asset,
      "destination_asset": payment.destination_asset,
      "token": payment.token,
      "chain": payment.chain,
      "frequency": frequency,
      "next_due_at": payment.next_due_at,
      "active": payment.active,
      "last_outcome": payment.last_outcome.map(outcome_json),
      "last_run_at": payment.last_run_at,
      "created_at": payment.created_at,
    })
}

fn outcome_json(outcome: Outcome) -> serde_json::Value {
    let kind = OutcomeKind::try_from(outcome.kind)
        .ok()
        .map(|k| format!("{k:?}"))
        .unwrap_or_else(|| format!("UNKNOWN({})", outcome.kind));

    json!({
      "kind": kind,
      "settled_amount": outcome.settled_amount,
      "reason": outcome.reason,
      "quoted_amount_in": outcome.quoted_amount_in,
      "quoted_amount_out": outcome.quoted_amount_out,
    })
}

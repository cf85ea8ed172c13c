use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tonic::{Request, Response, Status};

use super::scheduler::Scheduler;
use super::{Frequency, NewRecurringPayment, RecurringPayment, ScheduleError};
use crate::assets::AssetId;
use crate::payment::ExecutionOutcome;
use crate::proto::v1 as pb;

/// gRPC front of a [`Scheduler`]. Every payment added through it spends
/// `origin_asset`.
#[derive(Clone)]
pub struct PaymentServiceImpl {
    scheduler: Arc<Scheduler>,
    origin_asset: AssetId,
}

impl PaymentServiceImpl {
    pub fn new(scheduler: Arc<Scheduler>, origin_asset: AssetId) -> Self {
        Self {
            scheduler,
            origin_asset,
        }
    }
}

pub fn frequency_from_proto(value: i32) -> Result<Frequency, Status> {
    match pb::Frequency::try_from(value) {
        Ok(pb::Frequency::EveryFiveMinutes) => Ok(Frequency::EveryFiveMinutes),
        Ok(pb::Frequency::Weekly) => Ok(Frequency::Weekly),
        Ok(pb::Frequency::Monthly) => Ok(Frequency::Monthly),
        _ => Err(Status::invalid_argument("frequency is required")),
    }
}

pub fn frequency_to_proto(frequency: Frequency) -> pb::Frequency {
    match frequency {
        Frequency::EveryFiveMinutes => pb::Frequency::EveryFiveMinutes,
        Frequency::Weekly => pb::Frequency::Weekly,
        Frequency::Monthly => pb::Frequency::Monthly,
    }
}

pub fn outcome_to_proto(outcome: &ExecutionOutcome) -> pb::Outcome {
    match outcome {
        ExecutionOutcome::Completed { settled_amount } => pb::Outcome {
            kind: pb::OutcomeKind::Completed as i32,
            settled_amount: settled_amount.to_string(),
            ..Default::default()
        },
        ExecutionOutcome::Rejected { reason } => pb::Outcome {
            kind: pb::OutcomeKind::Rejected as i32,
            reason: reason.clone(),
            ..Default::default()
        },
        ExecutionOutcome::TimedOut => pb::Outcome {
            kind: pb::OutcomeKind::TimedOut as i32,
            ..Default::default()
        },
        ExecutionOutcome::Failed { cause } => pb::Outcome {
            kind: pb::OutcomeKind::Failed as i32,
            reason: cause.clone(),
            ..Default::default()
        },
        ExecutionOutcome::Simulated {
            quoted_input_amount,
            quoted_output_amount,
        } => pb::Outcome {
            kind: pb::OutcomeKind::Simulated as i32,
            quoted_amount_in: quoted_input_amount.to_string(),
            quoted_amount_out: quoted_output_amount.to_string(),
            ..Default::default()
        },
    }
}

pub fn record_to_proto(record: &RecurringPayment) -> pb::RecurringPayment {
    pb::RecurringPayment {
        id: record.id.clone(),
        recipient: record.recipient.clone(),
        amount: record.amount.to_string(),
        origin_asset: record.origin_asset.to_string(),
        destination_asset: record.destination_asset.to_string(),
        token: record.token.clone(),
        chain: record.chain.clone(),
        frequency: frequency_to_proto(record.frequency) as i32,
        next_due_at: timestamp(record.next_due_at),
        active: record.active,
        last_outcome: record.last_outcome.as_ref().map(outcome_to_proto),
        last_run_at: record.last_run_at.map(timestamp).unwrap_or_default(),
        created_at: timestamp(record.created_at),
    }
}

fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn status_from(err: ScheduleError) -> Status {
    match err {
        ScheduleError::NotFound(_) => Status::not_found(err.to_string()),
        ScheduleError::InvalidDefinition(_) | ScheduleError::Registry(_) => {
            Status::invalid_argument(err.to_string())
        }
        ScheduleError::AlreadyRunning(_) | ScheduleError::Inactive(_) => {
            Status::failed_precondition(err.to_string())
        }
        ScheduleError::Store(e) => Status::internal(format!("store: {e:#}")),
    }
}

fn require_id(id: &str) -> Result<&str, Status> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Status::invalid_argument("id is required"));
    }
    Ok(id)
}

#[tonic::async_trait]
impl pb::payment_service_server::PaymentService for PaymentServiceImpl {
    async fn add_payment(
        &self,
        request: Request<pb::AddPaymentRequest>,
    ) -> Result<Response<pb::RecurringPayment>, Status> {
        let req = request.into_inner();

        let amount = req
            .amount
            .trim()
            .parse::<u128>()
            .map_err(|e| Status::invalid_argument(format!("invalid amount: {e}")))?;
        let frequency = frequency_from_proto(req.frequency)?;

        let record = self
            .scheduler
            .add(
                NewRecurringPayment {
                    recipient: req.recipient,
                    amount,
                    origin_asset: self.origin_asset.clone(),
                    token: req.token,
                    chain: req.chain,
                    frequency,
                },
                Utc::now(),
            )
            .map_err(status_from)?;

        Ok(Response::new(record_to_proto(&record)))
    }

    async fn cancel_payment(
        &self,
        request: Request<pb::CancelPaymentRequest>,
    ) -> Result<Response<pb::RecurringPayment>, Status> {
        let req = request.into_inner();
        let id = require_id(&req.id)?;

        let record = self.scheduler.cancel(id).map_err(status_from)?;
        Ok(Response::new(record_to_proto(&record)))
    }

    async fn list_payments(
        &self,
        request: Request<pb::ListPaymentsRequest>,
    ) -> Result<Response<pb::ListPaymentsResponse>, Status> {
        let req = request.into_inner();

        let payments = self
            .scheduler
            .list(req.active_only)
            .map_err(status_from)?
            .iter()
            .map(record_to_proto)
            .collect();
        Ok(Response::new(pb::ListPaymentsResponse { payments }))
    }

    async fn execute_now(
        &self,
        request: Request<pb::ExecuteNowRequest>,
    ) -> Result<Response<pb::ExecuteNowResponse>, Status> {
        let req = request.into_inner();
        let id = require_id(&req.id)?;

        let (record, outcome) = self
            .scheduler
            .execute_now(id, Utc::now())
            .await
            .map_err(status_from)?;
        Ok(Response::new(pb::ExecuteNowResponse {
            payment: Some(record_to_proto(&record)),
            outcome: Some(outcome_to_proto(&outcome)),
        }))
    }

    async fn update_frequency(
        &self,
        request: Request<pb::UpdateFrequencyRequest>,
    ) -> Result<Response<pb::RecurringPayment>, Status> {
        let req = request.into_inner();
        let id = require_id(&req.id)?;
        let frequency = frequency_from_proto(req.frequency)?;

        let record = self
            .scheduler
            .update_frequency(id, frequency, Utc::now())
            .map_err(status_from)?;
        Ok(Response::new(record_to_proto(&record)))
    }

    async fn get_status(
        &self,
        _request: Request<pb::GetStatusRequest>,
    ) -> Result<Response<pb::ServiceStatus>, Status> {
        let status = self.scheduler.status().map_err(status_from)?;
        Ok(Response::new(pb::ServiceStatus {
            account_id: status.account_id,
            total_payments: status.total_payments,
            active_payments: status.active_payments,
            in_flight: status.in_flight,
            last_tick_at: status.last_tick_at.map(timestamp).unwrap_or_default(),
        }))
    }
}

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{Decimal, EventKey, MemberId, PackageId, Slot, Transaction};
use crate::engine::{PurchaseRequest, RegistrationRequest};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub member_id: Option<String>,
    pub referrer_id: Option<String>,
    pub package_id: Option<String>,
    pub amount: Option<String>,
    pub event_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeBody {
    pub package_id: String,
    pub amount: String,
    pub event_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementDto {
    pub member_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDto {
    pub id: i64,
    pub event_key: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    pub amount: String,
    pub transaction_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i64>,
    pub created_at_ms: i64,
}

impl TransactionDto {
    pub fn from_domain(tx: &Transaction) -> Self {
        TransactionDto {
            id: tx.id,
            event_key: tx.event_key.as_str().to_string(),
            user_id: tx.user_id.as_str().to_string(),
            from_user_id: tx.from_user_id.as_ref().map(|u| u.as_str().to_string()),
            package_id: tx.package_id.as_ref().map(|p| p.as_str().to_string()),
            amount: tx.amount.to_canonical_string(),
            transaction_type: tx.transaction_type.as_str().to_string(),
            status: tx.status.as_str().to_string(),
            wallet_type: tx.wallet_type.map(|w| w.as_str().to_string()),
            level: tx.level,
            created_at_ms: tx.created_at_ms.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub placement: PlacementDto,
    pub transactions: Vec<TransactionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResponse {
    pub transactions: Vec<TransactionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_child_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_child_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_expires_at_ms: Option<i64>,
    pub total_earnings: String,
    pub is_active: bool,
    pub milestone_state: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<RegisterResponse>, AppError> {
    let purchase = parse_purchase(body.package_id, body.amount, body.event_key)?;

    let outcome = state
        .enrollment
        .register(RegistrationRequest {
            member_id: body.member_id.map(MemberId::new),
            referrer_id: body.referrer_id.map(MemberId::new),
            purchase,
        })
        .await?;

    Ok(Json(RegisterResponse {
        placement: PlacementDto {
            member_id: outcome.placement.member_id.as_str().to_string(),
            parent_id: outcome
                .placement
                .parent_id
                .map(|p| p.as_str().to_string()),
            slot: outcome.placement.slot.map(|s| s.as_str()),
        },
        transactions: outcome
            .transactions
            .iter()
            .map(TransactionDto::from_domain)
            .collect(),
    }))
}

pub async fn upgrade(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<UpgradeBody>,
) -> Result<Json<UpgradeResponse>, AppError> {
    let amount = Decimal::from_str(&body.amount)
        .map_err(|_| AppError::BadRequest("Invalid amount".into()))?;
    let purchase = PurchaseRequest {
        package_id: PackageId::new(body.package_id),
        amount,
        event_key: EventKey::new(body.event_key),
    };

    let transactions = state
        .enrollment
        .upgrade(MemberId::new(id), purchase)
        .await?;

    Ok(Json(UpgradeResponse {
        transactions: transactions
            .iter()
            .map(TransactionDto::from_domain)
            .collect(),
    }))
}

pub async fn get_member(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MemberResponse>, AppError> {
    let member_id = MemberId::new(id);
    let member = state
        .repo
        .get_member(&member_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("member {} not found", member_id)))?;

    let package = match &member.package_id {
        Some(pid) => state.repo.get_package(pid).await?,
        None => None,
    };

    let package_expires_at_ms = match (&package, member.package_purchased_at_ms) {
        (Some(pkg), Some(at)) => Some(pkg.expires_at_ms(at.as_i64())),
        _ => None,
    };

    let milestone_state = member.milestone_state(package.as_ref()).as_str().to_string();

    Ok(Json(MemberResponse {
        id: member.id.as_str().to_string(),
        referrer_id: member.referrer_id.map(|r| r.as_str().to_string()),
        left_child_id: member.left_child_id.map(|c| c.as_str().to_string()),
        right_child_id: member.right_child_id.map(|c| c.as_str().to_string()),
        package_id: member.package_id.map(|p| p.as_str().to_string()),
        package_expires_at_ms,
        total_earnings: member.total_earnings.to_canonical_string(),
        is_active: member.is_active,
        milestone_state,
    }))
}

fn parse_purchase(
    package_id: Option<String>,
    amount: Option<String>,
    event_key: Option<String>,
) -> Result<Option<PurchaseRequest>, AppError> {
    match (package_id, amount, event_key) {
        (None, None, None) => Ok(None),
        (Some(package_id), Some(amount), Some(event_key)) => {
            let amount = Decimal::from_str(&amount)
                .map_err(|_| AppError::BadRequest("Invalid amount".into()))?;
            Ok(Some(PurchaseRequest {
                package_id: PackageId::new(package_id),
                amount,
                event_key: EventKey::new(event_key),
            }))
        }
        _ => Err(AppError::BadRequest(
            "packageId, amount and eventKey must be supplied together".into(),
        )),
    }
}

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::{MemberId, WalletType};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub member_id: String,
    pub company: String,
    pub register: String,
    pub bonus: String,
}

/// The three derived balances: signed sums over the member's COMPLETED
/// ledger rows per wallet type.
pub async fn get_wallet(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<WalletResponse>, AppError> {
    let member_id = MemberId::new(id);
    if state.repo.get_member(&member_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "member {} not found",
            member_id
        )));
    }

    let company = state
        .repo
        .wallet_balance(&member_id, WalletType::Company)
        .await?;
    let register = state
        .repo
        .wallet_balance(&member_id, WalletType::Register)
        .await?;
    let bonus = state
        .repo
        .wallet_balance(&member_id, WalletType::Bonus)
        .await?;

    Ok(Json(WalletResponse {
        member_id: member_id.as_str().to_string(),
        company: company.to_canonical_string(),
        register: register.to_canonical_string(),
        bonus: bonus.to_canonical_string(),
    }))
}

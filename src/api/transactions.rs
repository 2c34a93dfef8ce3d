use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::members::TransactionDto;
use crate::api::AppState;
use crate::domain::MemberId;
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub member_id: String,
    pub transaction_count: usize,
    pub transactions: Vec<TransactionDto>,
}

pub async fn get_transactions(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let member_id = MemberId::new(id);
    if state.repo.get_member(&member_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "member {} not found",
            member_id
        )));
    }

    let transactions = state.repo.transactions_for_member(&member_id).await?;

    Ok(Json(TransactionsResponse {
        member_id: member_id.as_str().to_string(),
        transaction_count: transactions.len(),
        transactions: transactions.iter().map(TransactionDto::from_domain).collect(),
    }))
}

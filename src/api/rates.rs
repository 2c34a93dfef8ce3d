use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{CommissionRate, Decimal};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRateBody {
    pub rate: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDto {
    pub level: i64,
    pub rate: String,
}

pub async fn list_rates(State(state): State<AppState>) -> Result<Json<Vec<RateDto>>, AppError> {
    let rates = state.repo.list_rates().await?;
    Ok(Json(
        rates
            .iter()
            .map(|r| RateDto {
                level: r.level,
                rate: r.rate.to_canonical_string(),
            })
            .collect(),
    ))
}

pub async fn put_rate(
    Path(level): Path<i64>,
    State(state): State<AppState>,
    Json(body): Json<PutRateBody>,
) -> Result<Json<RateDto>, AppError> {
    if level < 0 {
        return Err(AppError::BadRequest("level must be >= 0".into()));
    }

    let rate = Decimal::from_str(&body.rate)
        .map_err(|_| AppError::BadRequest("Invalid rate".into()))?;
    if rate.is_negative() || rate > Decimal::one() {
        return Err(AppError::BadRequest("rate must be within [0, 1]".into()));
    }

    state.repo.upsert_rate(&CommissionRate { level, rate }).await?;

    Ok(Json(RateDto {
        level,
        rate: rate.to_canonical_string(),
    }))
}

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::api::AppState;
use crate::domain::{Decimal, Package, PackageId};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackageBody {
    pub id: String,
    pub name: String,
    pub price: String,
    pub point_value: String,
    /// Omit for the unlimited top tier.
    pub max_milestone: Option<String>,
    pub active_days: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDto {
    pub id: String,
    pub name: String,
    pub price: String,
    pub point_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_milestone: Option<String>,
    pub active_days: i64,
}

impl PackageDto {
    fn from_domain(pkg: &Package) -> Self {
        PackageDto {
            id: pkg.id.as_str().to_string(),
            name: pkg.name.clone(),
            price: pkg.price.to_canonical_string(),
            point_value: pkg.point_value.to_canonical_string(),
            max_milestone: pkg.max_milestone.map(|m| m.to_canonical_string()),
            active_days: pkg.active_days,
        }
    }
}

pub async fn list_packages(
    State(state): State<AppState>,
) -> Result<Json<Vec<PackageDto>>, AppError> {
    let packages = state.repo.list_packages().await?;
    Ok(Json(packages.iter().map(PackageDto::from_domain).collect()))
}

pub async fn create_package(
    State(state): State<AppState>,
    Json(body): Json<CreatePackageBody>,
) -> Result<Json<PackageDto>, AppError> {
    let price = Decimal::from_str(&body.price)
        .map_err(|_| AppError::BadRequest("Invalid price".into()))?;
    let point_value = Decimal::from_str(&body.point_value)
        .map_err(|_| AppError::BadRequest("Invalid pointValue".into()))?;
    let max_milestone = body
        .max_milestone
        .as_deref()
        .map(Decimal::from_str)
        .transpose()
        .map_err(|_| AppError::BadRequest("Invalid maxMilestone".into()))?;

    if body.active_days <= 0 {
        return Err(AppError::BadRequest("activeDays must be positive".into()));
    }

    let package = Package {
        id: PackageId::new(body.id),
        name: body.name,
        price,
        point_value,
        max_milestone,
        active_days: body.active_days,
    };
    state.repo.insert_package(&package).await?;

    Ok(Json(PackageDto::from_domain(&package)))
}

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::domain::{Activity, MemberId};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDto {
    pub id: i64,
    pub activity_type: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    pub seen: bool,
    pub created_at_ms: i64,
}

impl ActivityDto {
    fn from_domain(activity: &Activity) -> Self {
        ActivityDto {
            id: activity.id,
            activity_type: activity.activity_type.clone(),
            title: activity.title.clone(),
            description: activity.description.clone(),
            transaction_id: activity.transaction_id,
            seen: activity.seen,
            created_at_ms: activity.created_at_ms.as_i64(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitiesResponse {
    pub member_id: String,
    pub activities: Vec<ActivityDto>,
}

pub async fn get_activities(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ActivitiesResponse>, AppError> {
    let member_id = MemberId::new(id);
    if state.repo.get_member(&member_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "member {} not found",
            member_id
        )));
    }

    let activities = state.repo.activities_for_member(&member_id).await?;

    Ok(Json(ActivitiesResponse {
        member_id: member_id.as_str().to_string(),
        activities: activities.iter().map(ActivityDto::from_domain).collect(),
    }))
}

pub async fn mark_seen(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.repo.mark_activity_seen(id).await? {
        return Err(AppError::NotFound(format!("activity {} not found", id)));
    }
    Ok(Json(serde_json::json!({"seen": true})))
}

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::catalog::Badge;
use super::domain::{ActivityHistory, BadgeCategory, BadgeTier, UserId, UserStats};
use super::facade::ProgressionSnapshot;
use super::ledger::LedgerChange;
use super::service::{EvaluationReport, ProgressionService};
use super::store::{BadgeRecord, BadgeStore};
use crate::error::AppError;

/// Router builder exposing catalog, ledger, and benefit endpoints.
pub fn progression_router<S>(service: Arc<ProgressionService<S>>) -> Router
where
    S: BadgeStore + 'static,
{
    Router::new()
        .route("/api/v1/badges", get(catalog_handler::<S>))
        .route(
            "/api/v1/gillers/:user_id/badges",
            get(badges_handler::<S>),
        )
        .route(
            "/api/v1/gillers/:user_id/badges/:badge_id",
            put(award_handler::<S>).delete(revoke_handler::<S>),
        )
        .route(
            "/api/v1/gillers/:user_id/evaluations",
            post(evaluate_handler::<S>),
        )
        .route(
            "/api/v1/gillers/:user_id/benefits",
            get(benefits_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CatalogQuery {
    #[serde(default)]
    pub(crate) category: Option<BadgeCategory>,
    #[serde(default)]
    pub(crate) tier: Option<BadgeTier>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CatalogResponse {
    pub(crate) total: usize,
    pub(crate) badges: Vec<Badge>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct EvaluationRequest {
    #[serde(default)]
    pub(crate) stats: UserStats,
    #[serde(default)]
    pub(crate) history: ActivityHistory,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BenefitsQuery {
    #[serde(default)]
    pub(crate) completed_deliveries: u32,
}

pub(crate) async fn catalog_handler<S>(
    State(service): State<Arc<ProgressionService<S>>>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogResponse>
where
    S: BadgeStore + 'static,
{
    let badges: Vec<Badge> = service
        .catalog()
        .iter()
        .filter(|badge| query.category.map_or(true, |category| badge.category == category))
        .filter(|badge| query.tier.map_or(true, |tier| badge.tier == tier))
        .cloned()
        .collect();

    Json(CatalogResponse {
        total: badges.len(),
        badges,
    })
}

pub(crate) async fn badges_handler<S>(
    State(service): State<Arc<ProgressionService<S>>>,
    Path(user_id): Path<String>,
) -> Result<Json<BadgeRecord>, AppError>
where
    S: BadgeStore + 'static,
{
    let record = service.badges(&UserId(user_id))?;
    Ok(Json(record))
}

pub(crate) async fn award_handler<S>(
    State(service): State<Arc<ProgressionService<S>>>,
    Path((user_id, badge_id)): Path<(String, String)>,
) -> Result<Json<LedgerChange>, AppError>
where
    S: BadgeStore + 'static,
{
    let change = service.award(&UserId(user_id), &badge_id)?;
    Ok(Json(change))
}

pub(crate) async fn revoke_handler<S>(
    State(service): State<Arc<ProgressionService<S>>>,
    Path((user_id, badge_id)): Path<(String, String)>,
) -> Result<Json<LedgerChange>, AppError>
where
    S: BadgeStore + 'static,
{
    let change = service.revoke(&UserId(user_id), &badge_id)?;
    Ok(Json(change))
}

pub(crate) async fn evaluate_handler<S>(
    State(service): State<Arc<ProgressionService<S>>>,
    Path(user_id): Path<String>,
    Json(request): Json<EvaluationRequest>,
) -> Result<Json<EvaluationReport>, AppError>
where
    S: BadgeStore + 'static,
{
    let report = service.evaluate(&UserId(user_id), &request.stats, &request.history)?;
    Ok(Json(report))
}

pub(crate) async fn benefits_handler<S>(
    State(service): State<Arc<ProgressionService<S>>>,
    Path(user_id): Path<String>,
    Query(query): Query<BenefitsQuery>,
) -> Result<Json<ProgressionSnapshot>, AppError>
where
    S: BadgeStore + 'static,
{
    let snapshot = service.benefits_for(&UserId(user_id), query.completed_deliveries)?;
    Ok(Json(snapshot))
}

use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use crate::{app_state::AppState, errors::AppError};

#[get("/api/history")]
pub async fn list_history(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let snapshots = state.roadmap_service.history().await?;
    Ok(HttpResponse::Ok().json(snapshots))
}

#[post("/api/history/{id}/restore")]
pub async fn restore_snapshot(
    state: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let view = state.roadmap_service.restore(&id).await?;
    Ok(HttpResponse::Ok().json(view))
}

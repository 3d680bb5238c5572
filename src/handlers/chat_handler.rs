use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{request::ChatRequest, response::ApiResponse},
};

#[post("/api/chat")]
pub async fn send_chat_message(
    state: web::Data<AppState>,
    request: web::Json<ChatRequest>,
) -> Result<HttpResponse, AppError> {
    let reply = state.roadmap_service.chat(request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reply))
}

#[post("/api/chat/apply")]
pub async fn apply_revision(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let view = state.roadmap_service.apply_revision().await?;
    Ok(HttpResponse::Ok().json(ApiResponse {
        data: view,
        message: "Revision applied".to_string(),
    }))
}

#[post("/api/chat/reject")]
pub async fn reject_revision(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let messages = state.roadmap_service.reject_revision().await?;
    Ok(HttpResponse::Ok().json(ApiResponse {
        data: messages,
        message: "Revision discarded".to_string(),
    }))
}

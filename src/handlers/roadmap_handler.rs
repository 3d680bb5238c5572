use actix_web::{get, http::header, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::request::{GenerateRoadmapRequest, UpdateSettingsRequest},
};

#[get("/api/session")]
pub async fn get_session(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let view = state.roadmap_service.session_view().await?;
    Ok(HttpResponse::Ok().json(view))
}

/// Starts generation in the background; poll `GET /api/roadmap` for progress.
#[post("/api/roadmap/generate")]
pub async fn generate_roadmap(
    state: web::Data<AppState>,
    request: web::Json<GenerateRoadmapRequest>,
) -> Result<HttpResponse, AppError> {
    let started = state
        .roadmap_service
        .start_generation(request.into_inner())
        .await?;

    let service = state.roadmap_service.clone();
    tokio::spawn(async move {
        // failures are recorded on the session as last_error
        let _ = service.run_generation().await;
    });

    Ok(HttpResponse::Accepted().json(started))
}

#[get("/api/roadmap")]
pub async fn get_roadmap(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.roadmap_service.roadmap_view().await)
}

#[get("/api/roadmap/download")]
pub async fn download_roadmap(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let export = state.roadmap_service.export_text().await?;
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ))
        .body(export.content))
}

#[put("/api/settings")]
pub async fn update_settings(
    state: web::Data<AppState>,
    request: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse, AppError> {
    let settings = state
        .roadmap_service
        .update_settings(request.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        handlers::configure,
        models::dto::response::RoadmapView,
        test_utils::test_helpers::{assert_error_status, assert_success_status},
    };
    use actix_web::{http::StatusCode, test, App};

    fn demo_state() -> AppState {
        AppState::new(Config::test_config()).unwrap()
    }

    #[actix_web::test]
    async fn test_generate_runs_in_background() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(demo_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/roadmap/generate")
            .set_json(serde_json::json!({ "idea": "Millet snacks" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::ACCEPTED);

        let mut view: Option<RoadmapView> = None;
        for _ in 0..50 {
            let req = test::TestRequest::get().uri("/api/roadmap").to_request();
            let current: RoadmapView = test::call_and_read_body_json(&app, req).await;
            if !current.loading {
                view = Some(current);
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        let view = view.expect("generation finished");
        assert_eq!(view.completed_sections.len(), 7);
        assert_eq!(view.idea, "Millet snacks");
    }

    #[actix_web::test]
    async fn test_generate_rejects_blank_idea() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(demo_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/roadmap/generate")
            .set_json(serde_json::json!({ "idea": "   " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_download() {
        let state = demo_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/roadmap/download").to_request();
        let resp = test::call_service(&app, req).await;
        assert_error_status(resp.status());

        state
            .roadmap_service
            .generate(GenerateRoadmapRequest {
                idea: "Bamboo bottles".to_string(),
            })
            .await
            .unwrap();

        let req = test::TestRequest::get().uri("/api/roadmap/download").to_request();
        let resp = test::call_service(&app, req).await;
        assert_success_status(resp.status());
        let disposition = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"roadmap-"));

        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("BUSINESS ROADMAP\nIdea: Bamboo bottles"));
    }

    #[actix_web::test]
    async fn test_update_settings() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(demo_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/api/settings")
            .set_json(serde_json::json!({ "research_mode": "fast" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::put()
            .uri("/api/settings")
            .set_json(serde_json::json!({ "research_mode": "fast", "mock_mode": false }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["research_mode"], "fast");
        assert_eq!(body["mock_mode"], false);
    }
}

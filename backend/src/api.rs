use crate::db;
use crate::errors::ApiError;
use crate::models::*;
use crate::proofs;
use crate::state::AppState;
use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use zk_prover::types::CircuitInput;

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/submit-basic-info", post(submit_basic_info))
        .route("/api/update-medical-record/:record_id", post(update_medical_record))
        .layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/retrieve/:record_id", get(retrieve_record))
        .route("/api/verify/:record_id", get(verify_record))
        .route("/api/public-record/:record_id", get(public_record))
        .merge(protected_routes)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // In production, this should be a strong secret from environment.
    let expected_key = std::env::var("API_KEY").unwrap_or_else(|_| "dev-secret-key".to_string());

    if let Some(provided_key) = headers.get("X-API-KEY") {
        if provided_key == expected_key.as_str() {
            return Ok(next.run(request).await);
        }
    }

    tracing::warn!("unauthorized access attempt");
    Err(StatusCode::UNAUTHORIZED)
}

async fn submit_basic_info(
    State(state): State<AppState>,
    Json(req): Json<SubmitBasicInfoRequest>,
) -> Result<Json<SubmitBasicInfoResponse>, ApiError> {
    let input = req.to_circuit_input().map_err(ApiError::BadRequest)?;
    let record_id = new_record_id();

    let paths = state.record_paths(&record_id);
    proofs::write_input(&paths, &input).await?;

    db::insert_record(&state.db, &record_id, &input).await?;
    db::append_access(&state.db, &record_id, None, "CREATED", None).await?;

    tracing::info!(%record_id, "record created");

    Ok(Json(SubmitBasicInfoResponse {
        message: "Basic info submitted successfully".to_string(),
        update_url: format!("/api/update-medical-record/{record_id}"),
        record_id,
    }))
}

async fn update_medical_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
    Json(req): Json<UpdateRecordRequest>,
) -> Result<Json<UpdateRecordResponse>, ApiError> {
    if !is_valid_record_id(&record_id) {
        return Err(ApiError::NotFound("record not found".to_string()));
    }

    let Some((_, _, _, mut input)) = db::get_record(&state.db, &record_id).await? else {
        return Err(ApiError::NotFound("record not found".to_string()));
    };

    req.apply(&mut input).map_err(ApiError::BadRequest)?;

    let paths = state.record_paths(&record_id);
    proofs::write_input(&paths, &input).await?;
    db::update_record_input(&state.db, &record_id, &input, RecordStatus::ProofRequested).await?;

    // Proof generation is synchronous: the clinician gets the verify URL only
    // once the proof exists.
    proofs::generate_record_proof(&state, &record_id).await?;

    db::append_access(&state.db, &record_id, Some(input.doctor_id as i64), "UPDATED", None).await?;

    Ok(Json(UpdateRecordResponse {
        message: "Medical record updated successfully".to_string(),
        verify_url: format!("/api/verify/{record_id}"),
    }))
}

async fn retrieve_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    if !is_valid_record_id(&record_id) {
        return Err(ApiError::NotFound("record not found".to_string()));
    }

    if let Some((_, _, status, input)) = db::get_record(&state.db, &record_id).await? {
        return Ok(Json(RetrieveResponse {
            record_id,
            status: RecordStatus::parse(&status),
            data: input,
        }));
    }

    // Store miss: fall back to the on-disk working copy.
    let input_path = state.record_paths(&record_id).input();
    let Ok(text) = tokio::fs::read_to_string(&input_path).await else {
        return Err(ApiError::NotFound("record not found".to_string()));
    };
    let input: CircuitInput = serde_json::from_str(&text).map_err(|_| ApiError::Internal)?;

    Ok(Json(RetrieveResponse {
        record_id,
        status: None,
        data: input,
    }))
}

async fn verify_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    if !is_valid_record_id(&record_id) {
        return Err(ApiError::NotFound("record not found".to_string()));
    }

    let known = db::get_record(&state.db, &record_id).await?.is_some()
        || state.record_paths(&record_id).dir.exists();
    if !known {
        return Err(ApiError::NotFound("record not found".to_string()));
    }

    let valid = proofs::verify_record_proof(&state, &record_id).await?;

    db::append_access(&state.db, &record_id, None, "VERIFIED", Some(valid)).await?;

    Ok(Json(VerifyResponse { valid, record_id }))
}

async fn public_record(
    State(state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<Json<PublicRecordResponse>, ApiError> {
    if !is_valid_record_id(&record_id) {
        return Err(ApiError::NotFound("record not found".to_string()));
    }

    let Some((_, last_modified, _, input)) = db::get_record(&state.db, &record_id).await? else {
        return Err(ApiError::NotFound("record not found".to_string()));
    };

    Ok(Json(PublicRecordResponse {
        public_info: PublicInfo {
            department: input.public_department_id,
            admission_year: input.public_admission_year,
            last_modified,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zk_prover::artifacts::CircuitArtifacts;

    async fn test_state() -> AppState {
        let db = db::connect_in_memory().await;
        let dir = std::env::temp_dir().join(format!("records-test-{}", new_record_id()));
        std::fs::create_dir_all(&dir).unwrap();
        // No circuit artifacts: tests never reach the external tools.
        AppState::new(db, dir.clone(), CircuitArtifacts::new(dir.join("circuit")))
    }

    fn submit_req() -> SubmitBasicInfoRequest {
        SubmitBasicInfoRequest {
            patient_age: 47,
            department: "CARDIOLOGY".to_string(),
            admission_date: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn submit_then_retrieve() {
        let state = test_state().await;

        let Json(created) = submit_basic_info(State(state.clone()), Json(submit_req()))
            .await
            .unwrap();
        assert!(is_valid_record_id(&created.record_id));
        assert_eq!(
            created.update_url,
            format!("/api/update-medical-record/{}", created.record_id)
        );

        // Working copy exists on disk.
        assert!(state.record_paths(&created.record_id).input().exists());

        let Json(fetched) = retrieve_record(State(state.clone()), Path(created.record_id.clone()))
            .await
            .unwrap();
        assert_eq!(fetched.status, Some(RecordStatus::Pending));
        assert_eq!(fetched.data.department_id, 1);
        assert_eq!(fetched.data.public_admission_year, 2023);
        assert_eq!(fetched.data.condition_severity, 0);
    }

    #[tokio::test]
    async fn submit_rejects_unknown_department() {
        let state = test_state().await;

        let mut req = submit_req();
        req.department = "RADIOLOGY".to_string();

        let err = submit_basic_info(State(state), Json(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn retrieve_unknown_record_is_not_found() {
        let state = test_state().await;

        let err = retrieve_record(State(state), Path("0123456789abcdef".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn retrieve_falls_back_to_disk() {
        let state = test_state().await;

        // A record directory without a store row, as after a store wipe.
        let record_id = new_record_id();
        let paths = state.record_paths(&record_id);
        let input = CircuitInput::initial(60, 2, 1_600_000_000, 2020);
        proofs::write_input(&paths, &input).await.unwrap();

        let Json(fetched) = retrieve_record(State(state), Path(record_id)).await.unwrap();
        assert_eq!(fetched.status, None);
        assert_eq!(fetched.data.department_id, 2);
    }

    #[tokio::test]
    async fn path_traversal_ids_are_not_found() {
        let state = test_state().await;

        let err = retrieve_record(State(state.clone()), Path("../etc".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = verify_record(State(state), Path("..".to_string())).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_unknown_record_is_not_found() {
        let state = test_state().await;

        let req = UpdateRecordRequest {
            severity: "MILD".to_string(),
            discharge_date: 1_700_600_000,
            doctor_id: "DR-7".to_string(),
            treatment_code: 3,
        };

        let err = update_medical_record(State(state), Path("0123456789abcdef".to_string()), Json(req))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn verify_before_proof_generation_is_not_found() {
        let state = test_state().await;

        let Json(created) = submit_basic_info(State(state.clone()), Json(submit_req()))
            .await
            .unwrap();

        // Record exists but has no proof artifacts yet, in store or on disk.
        let err = verify_record(State(state), Path(created.record_id)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn public_record_exposes_only_public_fields() {
        let state = test_state().await;

        let Json(created) = submit_basic_info(State(state.clone()), Json(submit_req()))
            .await
            .unwrap();

        let Json(resp) = public_record(State(state), Path(created.record_id)).await.unwrap();
        assert_eq!(resp.public_info.department, 1);
        assert_eq!(resp.public_info.admission_year, 2023);
    }
}

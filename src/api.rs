// Seed Journal - REST API with Axum
//
// JSON routes over any `PlantingStore`. Dates are accepted either as
// nanoseconds since the epoch or as "YYYY-MM-DD" strings.

use crate::entry::{PlantingDraft, PlantingEntry, PlantingId};
use crate::error::{RegistryError, ValidationError};
use crate::registry::PlantingStore;
use crate::time::Time;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;

pub type SharedStore = Arc<Mutex<Box<dyn PlantingStore + Send>>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
}

impl AppState {
    pub fn new(store: Box<dyn PlantingStore + Send>) -> Self {
        AppState {
            store: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn PlantingStore + Send>>, ApiError> {
        self.store.lock().map_err(|_| ApiError::Unavailable)
    }
}

// ============================================================================
// Responses
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationError>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            errors: Vec::new(),
        }
    }
}

/// Entry as rendered to clients, with derived germination fields
#[derive(Serialize, Deserialize, Debug)]
pub struct PlantingView {
    pub id: PlantingId,
    pub name: String,
    pub soil_type: String,
    pub seed_start_date: Time,
    pub planted_on: String,
    pub daily_light_hours: f64,
    pub germination_date: Option<Time>,
    pub germinated_on: Option<String>,
    pub germinated: bool,
    pub days_to_germinate: Option<i64>,
}

impl From<PlantingEntry> for PlantingView {
    fn from(entry: PlantingEntry) -> Self {
        Self {
            germinated: entry.is_germinated(),
            days_to_germinate: entry.days_to_germinate(),
            planted_on: entry.seed_start_date.to_date_string(),
            germinated_on: entry.germination_date.map(Time::to_date_string),
            id: entry.id,
            name: entry.name,
            soil_type: entry.soil_type,
            seed_start_date: entry.seed_start_date,
            daily_light_hours: entry.daily_light_hours,
            germination_date: entry.germination_date,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct CreatedResponse {
    pub id: PlantingId,
}

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    /// Only entries with exactly this soil type
    pub soil: Option<String>,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    BadRequest(String),
    /// A previous request panicked while holding the store
    Unavailable,
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError::Registry(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Registry(RegistryError::Validation(errors)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid planting entry".to_string(),
                errors,
            ),
            ApiError::Registry(err @ RegistryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string(), Vec::new())
            }
            ApiError::Registry(err @ RegistryError::Storage(_)) => {
                tracing::error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), Vec::new())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, Vec::new()),
            ApiError::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "planting store unavailable".to_string(),
                Vec::new(),
            ),
        };

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
            errors,
        };
        (status, Json(body)).into_response()
    }
}

/// JSON that is not an object, or not JSON at all
fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

fn parse_id(path: Result<Path<u64>, PathRejection>) -> Result<PlantingId, ApiError> {
    path.map(|Path(id)| PlantingId(id))
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn text_field(
    body: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) -> String {
    match body.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            errors.push(ValidationError::new(field, "Required field is missing"));
            String::new()
        }
        Some(other) => {
            errors.push(ValidationError::new(field, format!("Must be a string, got {}", other)));
            String::new()
        }
    }
}

fn time_value(value: &Value) -> Result<Time, String> {
    match value {
        Value::String(s) => Time::parse_date(s).map_err(|e| e.to_string()),
        Value::Number(n) => n
            .as_i64()
            .map(Time::from_nanos)
            .ok_or_else(|| format!("{} is not a whole number of nanoseconds", n)),
        other => Err(format!("Expected a YYYY-MM-DD date or nanoseconds, got {}", other)),
    }
}

/// Convert a request body field by field so each bad value names its field
fn draft_from_json(body: &Value) -> Result<PlantingDraft, ApiError> {
    let body = body
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Expected a JSON object".to_string()))?;
    let mut errors = Vec::new();

    let name = text_field(body, "name", &mut errors);
    let soil_type = text_field(body, "soil_type", &mut errors);

    let seed_start_date = match body.get("seed_start_date") {
        Some(Value::Null) | None => {
            errors.push(ValidationError::new("seed_start_date", "Required field is missing"));
            None
        }
        Some(value) => time_value(value)
            .map_err(|message| errors.push(ValidationError::new("seed_start_date", message)))
            .ok(),
    };

    let daily_light_hours = match body.get("daily_light_hours") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Null) | None => {
            errors.push(ValidationError::new("daily_light_hours", "Required field is missing"));
            None
        }
        Some(other) => {
            errors.push(ValidationError::new(
                "daily_light_hours",
                format!("Must be a number, got {}", other),
            ));
            None
        }
    };

    let germination_date = match body.get("germination_date") {
        Some(Value::Null) | None => None,
        Some(value) => time_value(value)
            .map_err(|message| errors.push(ValidationError::new("germination_date", message)))
            .ok(),
    };

    match (seed_start_date, daily_light_hours) {
        (Some(seed_start_date), Some(daily_light_hours)) if errors.is_empty() => Ok(PlantingDraft {
            name,
            soil_type,
            seed_start_date,
            daily_light_hours,
            germination_date,
        }),
        _ => Err(RegistryError::Validation(errors).into()),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/plantings - All entries sorted by name, optionally one soil type
async fn list_plantings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.lock()?;

    let entries = match query.soil.as_deref() {
        Some(soil) => store.list_by_soil_type(soil)?,
        None => store.list_sorted_by_name()?,
    };

    let response: Vec<PlantingView> = entries.into_iter().map(PlantingView::from).collect();
    Ok(Json(ApiResponse::ok(response)))
}

/// POST /api/plantings - Create entry
async fn create_planting(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(bad_body)?;
    let draft = draft_from_json(&body)?;
    let id = state.lock()?.create(draft)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(CreatedResponse { id }))))
}

/// GET /api/plantings/:id - One entry
async fn get_planting(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(path)?;
    let entry = state.lock()?.get(id)?;
    Ok(Json(ApiResponse::ok(PlantingView::from(entry))))
}

/// PUT /api/plantings/:id - Replace every field of an entry
async fn update_planting(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(path)?;
    let Json(body) = body.map_err(bad_body)?;
    let mut store = state.lock()?;

    // Unknown id is reported ahead of bad fields
    let draft = match draft_from_json(&body) {
        Ok(draft) => draft,
        Err(err) => {
            store.get(id)?;
            return Err(err);
        }
    };
    store.update(id, draft)?;

    let entry = store.get(id)?;
    Ok(Json(ApiResponse::ok(PlantingView::from(entry))))
}

/// DELETE /api/plantings/:id - Remove entry
async fn delete_planting(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(path)?;
    state.lock()?.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/soil-types - Distinct soil types for filtering
async fn soil_types(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let soils = state.lock()?.soil_types()?;
    Ok(Json(ApiResponse::ok(soils)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/plantings", get(list_plantings).post(create_planting))
        .route(
            "/plantings/:id",
            get(get_planting).put(update_planting).delete(delete_planting),
        )
        .route("/soil-types", get(soil_types))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PlantingRegistry;
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use serde_json::json;
    use tower::ServiceExt;

    const PLANTINGS: &str = "/api/plantings";

    fn app() -> Router {
        router(AppState::new(Box::new(PlantingRegistry::new())))
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(text) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(text))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        send_raw(app, method, uri, body.map(|json| json.to_string())).await
    }

    fn planting(name: &str, soil: &str) -> Value {
        json!({
            "name": name,
            "soil_type": soil,
            "seed_start_date": "2026-03-01",
            "daily_light_hours": 14.0,
            "germination_date": null
        })
    }

    fn error_fields(body: &Value) -> Vec<&str> {
        body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect()
    }

    fn names(body: &Value) -> Vec<&str> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_create_get_and_list_sorted() {
        let app = app();

        let basil = planting("Basil", "Potting mix");
        let (status, body) = send(&app, Method::POST, PLANTINGS, Some(basil)).await;
        assert_eq!(status, StatusCode::CREATED);
        let basil_id = body["data"]["id"].as_u64().unwrap();

        let mut arugula = planting("Arugula", "Garden soil");
        arugula["germination_date"] = json!("2026-03-06");
        let (status, _) = send(&app, Method::POST, PLANTINGS, Some(arugula)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, Method::GET, PLANTINGS, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(names(&body), vec!["Arugula", "Basil"]);
        assert_eq!(body["data"][0]["days_to_germinate"], 5);
        assert_eq!(body["data"][0]["germinated"], true);
        assert_eq!(body["data"][1]["germinated"], false);

        let uri = format!("{}/{}", PLANTINGS, basil_id);
        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["planted_on"], "2026-03-01");
        assert_eq!(body["data"]["soil_type"], "Potting mix");
    }

    #[tokio::test]
    async fn test_nanosecond_dates_accepted() {
        let mut epoch = planting("Basil", "Loam");
        epoch["seed_start_date"] = json!(0);

        let (status, body) = send(&app(), Method::POST, PLANTINGS, Some(epoch)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["id"], 1);
    }

    #[tokio::test]
    async fn test_validation_errors_are_field_level() {
        let mut bad = planting("", "Loam");
        bad["daily_light_hours"] = json!(25);

        let (status, body) = send(&app(), Method::POST, PLANTINGS, Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(error_fields(&body), vec!["name", "daily_light_hours"]);
    }

    #[tokio::test]
    async fn test_malformed_date_is_field_error() {
        let app = app();

        let mut bad = planting("Basil", "Loam");
        bad["seed_start_date"] = json!("2026-13-01");
        let (status, body) = send(&app, Method::POST, PLANTINGS, Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&body), vec!["seed_start_date"]);
        assert!(body["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("2026-13-01"));

        let mut bad = planting("Basil", "Loam");
        bad["germination_date"] = json!("March 1st");
        let (status, body) = send(&app, Method::POST, PLANTINGS, Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&body), vec!["germination_date"]);

        let (_, body) = send(&app, Method::GET, PLANTINGS, None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_date_is_field_error() {
        let mut bad = planting("Basil", "Loam");
        bad["seed_start_date"] = json!("2500-01-01");

        let (status, body) = send(&app(), Method::POST, PLANTINGS, Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&body), vec!["seed_start_date"]);
        assert!(body["errors"][0]["message"]
            .as_str()
            .unwrap()
            .contains("outside the representable"));
    }

    #[tokio::test]
    async fn test_wrong_types_and_missing_fields_are_field_errors() {
        let body = json!({
            "name": 7,
            "seed_start_date": true,
            "daily_light_hours": "lots"
        });

        let (status, body) = send(&app(), Method::POST, PLANTINGS, Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            error_fields(&body),
            vec!["name", "soil_type", "seed_start_date", "daily_light_hours"]
        );
    }

    #[tokio::test]
    async fn test_body_that_is_not_json_is_bad_request() {
        let app = app();

        let body = Some("{not json".to_string());
        let (status, body) = send_raw(&app, Method::POST, PLANTINGS, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body.get("errors").is_none());

        let (status, _) = send(&app, Method::POST, PLANTINGS, Some(json!([1, 2]))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_numeric_id_keeps_json_envelope() {
        let app = app();

        let (status, body) = send(&app, Method::GET, "/api/plantings/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("abc"));

        let kale = Some(planting("Kale", "Loam"));
        let (status, body) = send(&app, Method::PUT, "/api/plantings/abc", kale).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, body) = send(&app, Method::DELETE, "/api/plantings/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let app = app();
        let kale = Some(planting("Kale", "Loam"));
        let (_, body) = send(&app, Method::POST, PLANTINGS, kale).await;
        let uri = format!("{}/{}", PLANTINGS, body["data"]["id"]);

        let mut changed = planting("Lacinato Kale", "Loam");
        changed["germination_date"] = json!("2026-03-04");
        let (status, body) = send(&app, Method::PUT, &uri, Some(changed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Lacinato Kale");
        assert_eq!(body["data"]["days_to_germinate"], 3);

        let mut bad = planting("Kale", "Loam");
        bad["seed_start_date"] = json!("2026-02-30");
        let (status, body) = send(&app, Method::PUT, &uri, Some(bad)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_fields(&body), vec!["seed_start_date"]);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let app = app();
        let uri = "/api/plantings/99";

        let (status, _) = send(&app, Method::PUT, uri, Some(planting("Kale", "Loam"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Unknown id wins over a malformed field
        let mut bad = planting("Kale", "Loam");
        bad["seed_start_date"] = json!("never");
        let (status, _) = send(&app, Method::PUT, uri, Some(bad)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = send(&app, Method::GET, PLANTINGS, None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soil_types_and_filter() {
        let app = app();
        let seeds = [
            ("Zinnia", "Potting mix"),
            ("Cosmos", "Garden soil"),
            ("Aster", "Potting mix"),
        ];
        for (name, soil) in seeds {
            send(&app, Method::POST, PLANTINGS, Some(planting(name, soil))).await;
        }

        let (_, body) = send(&app, Method::GET, "/api/soil-types", None).await;
        assert_eq!(body["data"], json!(["Garden soil", "Potting mix"]));

        let uri = "/api/plantings?soil=Potting%20mix";
        let (_, body) = send(&app, Method::GET, uri, None).await;
        assert_eq!(names(&body), vec!["Aster", "Zinnia"]);
    }
}

//! HTTP surface of the editor backend.
//!
//! Six JSON endpoints translating requests into calls on the parser,
//! formatter, tree builder and file store. The handlers hold no logic of
//! their own beyond required-field checks and error-to-response mapping;
//! wire shapes are fixed by the front end and spelled out field by field
//! below.

use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{ConfigError, ServiceError, StoreError};
use crate::formatter;
use crate::parser::XmlDocument;
use crate::store::FileStore;
use crate::tree::{TreeNode, build_tree};

/// State shared by all handlers. The store is the only stateful collaborator.
#[derive(Clone)]
pub struct AppState {
    pub store: FileStore,
}

impl AppState {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlContentRequest {
    pub xml_content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub xml_content: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub is_valid: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatResponse {
    pub success: bool,
    pub formatted_xml: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub success: bool,
    pub tree_structure: TreeNode,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
}

#[derive(Debug, Serialize)]
pub struct FilesResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub success: bool,
    pub xml_content: String,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Handler failure: a `ServiceError` rendered as the generic
/// `{success: false, message}` body with its mapped status code.
#[derive(Debug)]
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            message: self.0.to_string(),
        };
        (self.0.status(), Json(body)).into_response()
    }
}

/// Build the application router with CORS restricted to the configured
/// origin.
pub fn router(state: AppState, config: &ServerConfig) -> Result<Router, ConfigError> {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin()?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Ok(Router::new()
        .route("/api/xml/validate", post(validate_xml))
        .route("/api/xml/format", post(format_xml))
        .route("/api/xml/parse", post(parse_xml))
        .route("/api/xml/save", post(save_xml))
        .route("/api/xml/files", get(list_files))
        .route("/api/xml/load/{file_name}", get(load_file))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// POST /api/xml/validate — a malformed document is an answer, not an
/// error, so both outcomes are 200.
async fn validate_xml(
    Json(request): Json<XmlContentRequest>,
) -> (StatusCode, Json<ValidateResponse>) {
    let Some(xml_content) = request.xml_content else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidateResponse {
                is_valid: false,
                message: "XML content is required".to_string(),
            }),
        );
    };

    match XmlDocument::parse(&xml_content) {
        Ok(_) => (
            StatusCode::OK,
            Json(ValidateResponse {
                is_valid: true,
                message: "XML is valid".to_string(),
            }),
        ),
        Err(error) => (
            StatusCode::OK,
            Json(ValidateResponse {
                is_valid: false,
                message: ServiceError::Parse(error).to_string(),
            }),
        ),
    }
}

/// POST /api/xml/format
async fn format_xml(
    Json(request): Json<XmlContentRequest>,
) -> Result<Json<FormatResponse>, ApiError> {
    let xml_content = request
        .xml_content
        .ok_or(ServiceError::MissingField("XML content is required"))?;
    let formatted_xml = formatter::format(&xml_content).map_err(ServiceError::Parse)?;
    Ok(Json(FormatResponse {
        success: true,
        formatted_xml,
        message: "XML formatted successfully".to_string(),
    }))
}

/// POST /api/xml/parse
async fn parse_xml(
    Json(request): Json<XmlContentRequest>,
) -> Result<Json<ParseResponse>, ApiError> {
    let xml_content = request
        .xml_content
        .ok_or(ServiceError::MissingField("XML content is required"))?;
    let document = XmlDocument::parse(&xml_content).map_err(ServiceError::Parse)?;
    let tree_structure = build_tree(document.root());
    Ok(Json(ParseResponse {
        success: true,
        tree_structure,
        message: "XML parsed successfully".to_string(),
    }))
}

/// POST /api/xml/save
async fn save_xml(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, ApiError> {
    let file_name = request.file_name.filter(|name| !name.is_empty());
    let (Some(xml_content), Some(file_name)) = (request.xml_content, file_name) else {
        return Err(ServiceError::MissingField("XML content and filename are required").into());
    };

    let path = state
        .store
        .save(&file_name, &xml_content)
        .await
        .map_err(ServiceError::Save)?;
    Ok(Json(SaveResponse {
        success: true,
        message: format!("File saved successfully: {file_name}"),
        file_path: path.to_string_lossy().into_owned(),
    }))
}

/// GET /api/xml/files
async fn list_files(State(state): State<AppState>) -> Result<Json<FilesResponse>, ApiError> {
    let files = state.store.list().await.map_err(ServiceError::List)?;
    Ok(Json(FilesResponse { files }))
}

/// GET /api/xml/load/{file_name}
async fn load_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Json<LoadResponse>, ApiError> {
    match state.store.load(&file_name).await {
        Ok(xml_content) => Ok(Json(LoadResponse {
            success: true,
            xml_content,
            file_name,
        })),
        Err(StoreError::NotFound) => Err(ServiceError::NotFound.into()),
        Err(error) => Err(ServiceError::Load(error).into()),
    }
}

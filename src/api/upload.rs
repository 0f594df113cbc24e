use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::extract::{Multipart, State};
use axum::Json;
use uuid::Uuid;

use super::{bad_request, internal, llm_error, ApiError};
use crate::config::Config;
use crate::models::{AnalyzeRequest, AnalyzeResponse, UploadResponse};
use crate::state::AppState;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Lower-cased extension of `path` if it is an accepted image type.
pub fn image_extension(path: &Path) -> Result<String, ApiError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if matches!(ext.as_str(), "heic" | "heif") {
        return Err(bad_request(
            "HEIC/HEIF images are not supported, convert to JPEG first",
        ));
    }
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(bad_request(format!(
            "File type not allowed. Allowed types: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }
    Ok(ext)
}

/// Extension for the stored file, taken from the content rather than the name.
fn sniffed_extension(bytes: &[u8]) -> Result<&'static str, ApiError> {
    let kind = match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => kind,
        _ => return Err(bad_request("Uploaded file is not an image")),
    };
    match kind.extension() {
        "heic" | "heif" => Err(bad_request(
            "HEIC/HEIF images are not supported, convert to JPEG first",
        )),
        ext if ALLOWED_EXTENSIONS.contains(&ext) => Ok(ext),
        other => Err(bad_request(format!(
            "Image type {other} not allowed. Allowed types: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))),
    }
}

/// Resolve a client-supplied image path to a file inside the images directory.
///
/// Relative paths are taken relative to the images directory.
pub fn resolve_image_path(config: &Config, raw: &str) -> Result<PathBuf, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(bad_request("image_path is required"));
    }

    let requested = Path::new(raw);
    let candidate = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        config.images_dir().join(requested)
    };

    if !candidate.exists() {
        return Err(bad_request("Image file not found at the specified path"));
    }
    if !candidate.is_file() {
        return Err(bad_request("The specified path is not a file"));
    }
    image_extension(&candidate)?;

    let images_dir = config
        .images_dir()
        .canonicalize()
        .context("Failed to resolve images directory")
        .map_err(internal)?;
    let resolved = candidate
        .canonicalize()
        .map_err(|e| bad_request(format!("Invalid image path: {e}")))?;
    if !resolved.starts_with(&images_dir) {
        return Err(bad_request("Image must be inside the upload directory"));
    }
    Ok(resolved)
}

/// POST /api/upload - Store an image from the multipart field `file`
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        image_extension(Path::new(&original))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| (e.status(), e.body_text()))?;
        let ext = sniffed_extension(&bytes)?;

        let images_dir = state
            .config
            .images_dir()
            .canonicalize()
            .context("Failed to resolve images directory")
            .map_err(internal)?;
        let filename = format!("{}.{ext}", Uuid::new_v4());
        let file_path = images_dir.join(&filename);
        tokio::fs::write(&file_path, &bytes)
            .await
            .with_context(|| format!("Failed to save {}", file_path.display()))
            .map_err(internal)?;

        tracing::info!("Stored upload {original:?} as {filename} ({} bytes)", bytes.len());
        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            filename,
            file_path: file_path.display().to_string(),
        }));
    }

    Err(bad_request("Multipart field 'file' is required"))
}

/// POST /api/analyze - Tag an uploaded image without saving it
pub async fn analyze_image(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let path = resolve_image_path(&state.config, &req.image_path)?;
    let tags = state.tagger.extract(&path).await.map_err(llm_error)?;

    Ok(Json(AnalyzeResponse {
        tags,
        image_path: path.display().to_string(),
    }))
}

// Owner-scoped hotel endpoints

use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::config::UploadConfig;
use crate::core::error::{HotelError, ValidationErrors};
use crate::core::state::AppState;
use crate::images::pipeline::ImageFile;
use crate::models::hotel::{Hotel, HotelId};
use crate::security::session::AuthenticatedUser;
use crate::validation::hotel_form::{base_field_name, HotelFormFields};

const IMAGE_FILES_FIELD: &str = "imageFiles";
const IMAGE_URLS_FIELD: &str = "imageUrls";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A fully read multipart hotel form
struct HotelForm {
    fields: HotelFormFields,
    retained_image_urls: Vec<String>,
    files: Vec<ImageFile>,
}

async fn read_hotel_form(mut multipart: Multipart, limits: &UploadConfig) -> Result<HotelForm, HotelError> {
    let mut form = HotelForm {
        fields: HotelFormFields::new(),
        retained_image_urls: Vec::new(),
        files: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HotelError::MalformedForm(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match base_field_name(&name) {
            IMAGE_FILES_FIELD => {
                let mime_type = field.content_type().unwrap_or(DEFAULT_MIME_TYPE).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| HotelError::MalformedForm(e.body_text()))?;

                // an empty file input still sends a part
                if bytes.is_empty() {
                    continue;
                }

                if bytes.len() > limits.max_file_size {
                    return Err(ValidationErrors::single(
                        IMAGE_FILES_FIELD,
                        &format!("Each image must be at most {} bytes", limits.max_file_size),
                    )
                    .into());
                }

                form.files.push(ImageFile::new(bytes, &mime_type));
            }
            IMAGE_URLS_FIELD => {
                let url = field
                    .text()
                    .await
                    .map_err(|e| HotelError::MalformedForm(e.body_text()))?;
                let url = url.trim();
                if !url.is_empty() {
                    form.retained_image_urls.push(url.to_string());
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| HotelError::MalformedForm(e.body_text()))?;
                form.fields.push(&name, value);
            }
        }
    }

    debug!(
        files = form.files.len(),
        retained = form.retained_image_urls.len(),
        "Hotel form read"
    );
    Ok(form)
}

/// Unparseable ids are reported the same way as unknown ones
fn parse_hotel_id(raw: &str) -> Result<HotelId, HotelError> {
    Uuid::parse_str(raw).map_err(|_| HotelError::NotFound)
}

/// POST /api/my-hotels
pub async fn create_hotel_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    multipart: Multipart,
) -> Result<Response, HotelError> {
    let limits = &state.config.uploads;
    let form = read_hotel_form(multipart, limits).await?;
    let details = form.fields.validate()?;

    if form.files.is_empty() || form.files.len() > limits.max_files {
        return Err(ValidationErrors::single(
            IMAGE_FILES_FIELD,
            &format!("Between 1 and {} images are required", limits.max_files),
        )
        .into());
    }

    let hotel = state
        .hotel_manager
        .create_hotel(user.user_id, details, form.files)
        .await?;

    Ok((StatusCode::CREATED, Json(Hotel::clone(&hotel))).into_response())
}

/// GET /api/my-hotels
pub async fn list_hotels_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<Vec<Hotel>> {
    let hotels = state
        .hotel_manager
        .list_hotels_by_owner(user.user_id)
        .iter()
        .map(|hotel| Hotel::clone(hotel))
        .collect();

    Json(hotels)
}

/// GET /api/my-hotels/{hotel_id}
pub async fn get_hotel_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(hotel_id): Path<String>,
) -> Result<Json<Hotel>, HotelError> {
    let hotel_id = parse_hotel_id(&hotel_id)?;
    let hotel = state
        .hotel_manager
        .get_hotel_by_owner_and_id(user.user_id, hotel_id)?;

    Ok(Json(Hotel::clone(&hotel)))
}

/// PUT /api/my-hotels/{hotel_id}
pub async fn update_hotel_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(hotel_id): Path<String>,
    multipart: Multipart,
) -> Result<Response, HotelError> {
    let hotel_id = parse_hotel_id(&hotel_id)?;
    let form = read_hotel_form(multipart, &state.config.uploads).await?;
    let details = form.fields.validate()?;

    let hotel = state
        .hotel_manager
        .update_hotel(
            user.user_id,
            hotel_id,
            details,
            form.retained_image_urls,
            form.files,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(Hotel::clone(&hotel))).into_response())
}

//! Route handlers.

use std::sync::Arc;

use axum::{
    extract::{Multipart, RawForm, State},
    response::{Html, Redirect},
};
use percent_encoding::percent_decode_str;
use photostore_bus::BusMessage;
use photostore_core::content_type::{content_type_of, is_allowed};
use photostore_core::keys::{object_key, thumbnail_key};
use photostore_core::AppError;

use crate::error::HttpAppError;
use crate::html::{self, PhotoView};
use crate::state::AppState;

/// Number of photos shown on the listing page.
const LISTING_LIMIT: i64 = 10;

/// Multipart field carrying the uploaded file.
const PHOTO_FIELD: &str = "input_photo";

pub async fn index() -> Html<String> {
    Html(html::render_index())
}

async fn listing(state: &AppState, error: Option<&str>) -> Result<Html<String>, HttpAppError> {
    let photos = state.photos.latest(LISTING_LIMIT).await?;
    let views: Vec<PhotoView> = photos
        .into_iter()
        .map(|photo| {
            let url = state.storage.public_url(&photo.filename);
            let thumbnail_url = state.storage.public_url(&thumbnail_key(&photo.filename));
            PhotoView {
                photo,
                url,
                thumbnail_url,
            }
        })
        .collect();
    Ok(Html(html::render_photos(&views, error)))
}

pub async fn photos(State(state): State<Arc<AppState>>) -> Result<Html<String>, HttpAppError> {
    listing(&state, None).await
}

/// Pull the photo field out of the multipart body.
///
/// Returns `Ok(None)` when the field is absent or empty; multipart decoding
/// failures surface as invalid input.
async fn read_photo_field(
    multipart: &mut Multipart,
) -> Result<Option<(String, Vec<u8>)>, HttpAppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("failed to read upload: {e}")))?;
        if filename.is_empty() || data.is_empty() {
            return Ok(None);
        }
        return Ok(Some((filename, data.to_vec())));
    }
    Ok(None)
}

#[tracing::instrument(skip(state, multipart), fields(operation = "upload_photo"))]
pub async fn post_photo(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Html<String>, HttpAppError> {
    let Some((original_filename, data)) = read_photo_field(&mut multipart).await? else {
        return listing(&state, Some("No file")).await;
    };
    if !is_allowed(&original_filename) {
        return listing(&state, Some("Invalid file name")).await;
    }

    let key = object_key(&original_filename);
    let content_type = content_type_of(&key).ok_or_else(|| {
        AppError::Internal(format!("no content type for generated key {key}"))
    })?;

    // Ordered side effects: blob first, then the record, then the event.
    // Consumers assume the record exists when the event arrives.
    state
        .storage
        .upload(&key, content_type, data)
        .await
        .map_err(AppError::from)?;
    state.photos.insert(&key).await?;
    state
        .publisher
        .publish(&state.ingress_topic, BusMessage::new(key.clone()))
        .await
        .map_err(AppError::from)?;

    tracing::info!(key = %key, "Uploaded photo");
    listing(&state, None).await
}

/// The delete form posts the record id as the sole form key.
fn parse_record_id(body: &str) -> Option<i64> {
    let first_pair = body.split('&').next()?;
    let raw_key = first_pair.split('=').next()?;
    percent_decode_str(raw_key)
        .decode_utf8()
        .ok()?
        .parse()
        .ok()
}

#[tracing::instrument(skip(state, form), fields(operation = "delete_photo"))]
pub async fn delete_photo(
    State(state): State<Arc<AppState>>,
    RawForm(form): RawForm,
) -> Result<Redirect, HttpAppError> {
    let body = String::from_utf8_lossy(&form);
    let Some(id) = parse_record_id(&body) else {
        return Err(AppError::InvalidInput("missing record id".to_string()).into());
    };

    if let Some(photo) = state.photos.get(id).await? {
        // Best-effort blob cleanup: a thumbnail may never have been created.
        for key in [photo.filename.clone(), thumbnail_key(&photo.filename)] {
            if let Err(e) = state.storage.delete(&key).await {
                tracing::debug!(key = %key, error = %e, "Ignoring blob delete failure");
            }
        }
        state.photos.delete(id).await?;
        tracing::info!(id, key = %photo.filename, "Deleted photo");
    }

    Ok(Redirect::to("/photos"))
}

#[cfg(test)]
mod tests {
    use super::parse_record_id;

    #[test]
    fn record_id_is_the_form_key() {
        assert_eq!(parse_record_id("5="), Some(5));
        assert_eq!(parse_record_id("5"), Some(5));
        assert_eq!(parse_record_id("17=&other=1"), Some(17));
        assert_eq!(parse_record_id("abc="), None);
        assert_eq!(parse_record_id(""), None);
    }
}

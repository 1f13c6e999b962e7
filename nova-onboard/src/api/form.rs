//! Registration form extractor
//!
//! The form posts `multipart/form-data` when a photo is attached and JSON
//! otherwise; both end up as a [`RegistrationRequest`].

use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{StatusCode, header};
use axum::Json;
use shared::error::{AppError, ErrorCode};
use shared::models::RegistrationPayload;

use crate::media::PhotoUpload;
use crate::registration::RegistrationRequest;

pub struct RegistrationForm(pub RegistrationRequest);

impl<S> FromRequest<S> for RegistrationForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|ct| ct.split(';').next())
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::invalid_request(e.body_text()))?;
            return read_multipart(multipart).await.map(RegistrationForm);
        }

        let Json(payload) = Json::<RegistrationPayload>::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(e.body_text()))?;
        Ok(RegistrationForm(payload.into()))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<RegistrationRequest, AppError> {
    let mut request = RegistrationRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty, unnamed part when no file was chosen
            if bytes.is_empty() && filename.as_deref().is_none_or(str::is_empty) {
                continue;
            }
            request.photo = Some(PhotoUpload {
                bytes: bytes.to_vec(),
                filename,
                content_type,
            });
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        let payload = &mut request.payload;
        match name.as_str() {
            "nom" => payload.nom = value,
            "prenom" => payload.prenom = value,
            "poste" => payload.poste = value,
            "dateNaissance" => payload.date_naissance = value,
            "pin" => payload.pin = value,
            "confirmPin" => payload.confirm_pin = value,
            "email" => payload.email = Some(value),
            "telephone" => payload.telephone = Some(value),
            _ => {}
        }
    }

    Ok(request)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(ErrorCode::FileTooLarge)
    } else {
        AppError::invalid_request(format!("Multipart error: {}", e.body_text()))
    }
}

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::Instrument;

use crate::domain::{ArtifactReference, Upload};
use crate::infrastructure::observability::RequestId;
use crate::presentation::state::AppState;

const GENERIC_FAILURE: &str = "Dubbing failed";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DubResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dubbed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dubbed_file: Option<String>,
}

#[derive(Serialize)]
pub struct DubErrorResponse {
    pub success: bool,
    pub error: String,
}

impl DubResponse {
    fn from_reference(reference: ArtifactReference) -> Self {
        match reference {
            ArtifactReference::Url(url) => Self {
                success: true,
                dubbed_url: Some(url),
                dubbed_file: None,
            },
            ArtifactReference::File(name) => Self {
                success: true,
                dubbed_url: None,
                dubbed_file: Some(name),
            },
        }
    }
}

struct DubForm {
    upload: Option<Upload>,
    from_lang: String,
    to_lang: String,
}

fn failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(DubErrorResponse {
            success: false,
            error: GENERIC_FAILURE.to_string(),
        }),
    )
        .into_response()
}

async fn read_form(multipart: &mut Multipart) -> Result<DubForm, String> {
    let mut form = DubForm {
        upload: None,
        from_lang: String::new(),
        to_lang: String::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("multipart: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| format!("file field: {}", e))?;
                form.upload = Some(Upload::new(filename, content_type.as_deref(), data));
            }
            "fromLang" => {
                form.from_lang = field.text().await.map_err(|e| format!("fromLang: {}", e))?;
            }
            "toLang" => {
                form.to_lang = field.text().await.map_err(|e| format!("toLang: {}", e))?;
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown form field");
            }
        }
    }

    Ok(form)
}

#[tracing::instrument(skip(state, multipart))]
pub async fn dub_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::error!(error = %rejection, "Dub request is not multipart");
            return failure();
        }
    };

    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read dub request");
            return failure();
        }
    };

    let Some(upload) = form.upload else {
        tracing::warn!("Dub request with no file");
        return failure();
    };

    tracing::debug!(
        filename = %upload.filename,
        bytes = upload.size_bytes(),
        from_lang = %form.from_lang,
        to_lang = %form.to_lang,
        "Dub request received"
    );

    // The pipeline outlives a disconnected client so persist, retention and
    // staged-upload cleanup always run.
    let service = Arc::clone(&state.dubbing_service);
    let DubForm {
        from_lang, to_lang, ..
    } = form;
    let pipeline = tokio::spawn(
        async move {
            service
                .handle_dub_request(upload, &from_lang, &to_lang)
                .await
        }
        .in_current_span(),
    );

    match pipeline.await {
        Ok(Ok(outcome)) => (
            StatusCode::OK,
            Json(DubResponse::from_reference(outcome.artifact.reference)),
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Dubbing failed");
            failure()
        }
        Err(e) => {
            tracing::error!(error = %e, "Dubbing task aborted");
            failure()
        }
    }
}

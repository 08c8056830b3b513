//! Document upload endpoint

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, ApiErrorType, UploadResponse};
use crate::domain::ingestion::SourceDocument;

/// Multipart field carrying the uploaded files
const FILES_FIELD: &str = "files";

/// `POST /upload_documents` - extract, chunk, embed and index PDF/DOCX files
pub async fn upload_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart field"))?
    {
        if field.name() != Some(FILES_FIELD) {
            debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, &format!("Failed to read file '{}'", filename)))?;

        documents.push(SourceDocument::new(bytes, filename));
    }

    if documents.is_empty() {
        return Err(ApiError::bad_request("No files uploaded."));
    }

    info!(files = documents.len(), "Received document upload");

    let report = state
        .with_deadline(state.ingestion.ingest(documents))
        .await?;

    Ok(Json(UploadResponse::from(report)))
}

/// Keep the rejection's status so oversized bodies still answer 413
fn multipart_error(error: MultipartError, context: &str) -> ApiError {
    ApiError::new(
        error.status(),
        ApiErrorType::InvalidRequestError,
        format!("{}: {}", context, error.body_text()),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::api::router::create_router;
    use crate::api::state::test_support::test_state;
    use crate::infrastructure::ingestion::extractors::{docx_with_pages, pdf_with_pages};

    const BOUNDARY: &str = "rag-test-boundary";

    fn multipart_body(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, filename, bytes) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    field, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload(uri: &str, body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .header("content-length", body.len())
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_upload_indexes_documents() {
        let app = create_router(test_state("ok"), 1024 * 1024);
        let pdf = pdf_with_pages(&["Refund policy page one"]);
        let docx = docx_with_pages(&["Alpha", "Beta", "Gamma"]);

        let response = app
            .oneshot(upload(
                "/upload_documents/",
                multipart_body(&[("files", "policy.pdf", pdf.as_slice()), ("files", "notes.docx", docx.as_slice())]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["chunks_indexed"], 4);
        assert_eq!(json["documents_indexed"], 2);
        assert_eq!(
            json["message"],
            "Successfully uploaded and indexed 4 document chunks."
        );
    }

    #[tokio::test]
    async fn test_upload_without_files() {
        let app = create_router(test_state("ok"), 1024 * 1024);

        let response = app
            .oneshot(upload(
                "/upload_documents",
                multipart_body(&[("other", "a.pdf", &b"x"[..])]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "No files uploaded.");
    }

    #[tokio::test]
    async fn test_upload_all_rejected_lists_reasons() {
        let app = create_router(test_state("ok"), 1024 * 1024);

        let response = app
            .oneshot(upload(
                "/upload_documents",
                multipart_body(&[("files", "notes.txt", &b"plain"[..]), ("files", "broken.pdf", &b"nope"[..])]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "empty_batch");
        assert_eq!(json["error"]["skipped"][0]["category"], "input");
        assert_eq!(json["error"]["skipped"][1]["category"], "extraction");
    }

    #[tokio::test]
    async fn test_upload_over_limit_rejected() {
        let app = create_router(test_state("ok"), 64);
        let big = vec![b'a'; 4096];

        let response = app
            .oneshot(upload(
                "/upload_documents",
                multipart_body(&[("files", "big.pdf", big.as_slice())]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

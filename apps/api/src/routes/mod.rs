pub mod health;
pub mod ui;

use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};

use crate::extraction::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(ui::upload_page))
        .route("/health", get(health::health_handler))
        // Batch API
        .route("/api/v1/batches", post(handlers::handle_create_batch))
        .route("/api/v1/batches/:id", get(handlers::handle_get_batch))
        .route(
            "/api/v1/batches/:id/download",
            get(handlers::handle_download),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::extraction::archive::tests::{corrupt, stored_zip_bytes, zip_bytes};
    use crate::extraction::extractor::tests::StubExtractor;
    use crate::extraction::pipeline::PipelineSettings;
    use crate::extraction::reader::tests::{docx_bytes, pdf_bytes};
    use crate::extraction::schema::RESUME_FIELDS;
    use crate::extraction::store::BatchStore;

    const BOUNDARY: &str = "resumelens-test-boundary";

    fn test_config() -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            llm_api_url: "http://localhost:1".to_string(),
            port: 0,
            rust_log: "info".to_string(),
            document_timeout_secs: 5,
            emit_partial_records: false,
            max_retained_batches: 8,
            max_upload_bytes: 10 * 1024 * 1024,
            max_archive_member_bytes: 1024 * 1024,
            scratch_dir: None,
        }
    }

    fn test_router() -> Router {
        let stub = StubExtractor::default()
            .with("ALICE", json!({"fullname": "Alice", "skills": ["Python", "SQL"], "ats_score": 82}))
            .with("BOB", json!({"fullname": "Bob", "ats_score": 64}));
        let config = test_config();
        let state = AppState {
            extractor: Arc::new(stub),
            fields: RESUME_FIELDS,
            settings: Arc::new(PipelineSettings::default()),
            batches: BatchStore::new(config.max_retained_batches),
            config,
        };
        build_router(state)
    }

    fn multipart(files: &[(&str, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, contents) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/v1/batches")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    /// Polls the batch until it leaves `processing`.
    async fn wait_for(router: &Router, batch_id: &str) -> Value {
        for _ in 0..200 {
            let report = json_body(send(router, get(&format!("/api/v1/batches/{batch_id}"))).await).await;
            if report["status"] != "processing" {
                return report;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("batch {batch_id} never finished");
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router();
        let response = send(&router, get("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_page() {
        let router = test_router();
        let response = send(&router, get("/")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("ResumeLens"));
    }

    #[tokio::test]
    async fn test_no_files_awaits_input() {
        let router = test_router();
        // Browsers send one file part with an empty filename when nothing is selected.
        let response = send(&router, multipart(&[("", b"")])).await;
        assert_eq!(response.status(), StatusCode::OK);
        let report = json_body(response).await;
        assert_eq!(report["status"], "awaiting_input");
        assert!(report["batch_id"].is_null());
        assert!(report["download_url"].is_null());
    }

    #[tokio::test]
    async fn test_good_and_corrupt_documents_yield_one_row() {
        let router = test_router();
        let alice = pdf_bytes(&[&["ALICE", "Data engineer"]]);
        let response = send(
            &router,
            multipart(&[("alice.pdf", &alice), ("corrupted.docx", b"garbage")]),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let started = json_body(response).await;
        assert_eq!(started["status"], "processing");
        let batch_id = started["batch_id"].as_str().unwrap().to_string();

        let report = wait_for(&router, &batch_id).await;
        assert_eq!(report["status"], "done");
        assert_eq!(report["record_count"], 1);
        assert_eq!(report["skipped"][0]["file_name"], "corrupted.docx");
        assert_eq!(report["skipped"][0]["reason"], "unreadable");

        let download_url = report["download_url"].as_str().unwrap().to_string();
        let response = send(&router, get(&download_url)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"ResumeLens.csv\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_ref());
        let headers = reader.headers().unwrap().clone();
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);

        let col = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(&rows[0][col("file_name")], "alice.pdf");
        assert_eq!(&rows[0][col("ats_score")], "82");
        assert_eq!(&rows[0][col("skills")], "Python, SQL");
    }

    #[tokio::test]
    async fn test_zip_with_readme_yields_one_row() {
        let router = test_router();
        let bob = docx_bytes(&["BOB", "Go developer"]);
        let archive = zip_bytes(&[("bob.docx", &bob), ("readme.txt", b"read me")]);

        let started = json_body(send(&router, multipart(&[("resumes.zip", &archive)])).await).await;
        let batch_id = started["batch_id"].as_str().unwrap().to_string();

        let report = wait_for(&router, &batch_id).await;
        assert_eq!(report["status"], "done");
        assert_eq!(report["record_count"], 1);
        assert_eq!(report["documents_seen"], 1);
        assert!(report["skipped"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zip_of_pdfs_yields_one_row_each() {
        let router = test_router();
        let alice = pdf_bytes(&[&["ALICE", "Data engineer"], &["Education", "TU Berlin"]]);
        let bob = pdf_bytes(&[&["BOB", "Go developer"]]);
        let archive = zip_bytes(&[("alice.pdf", &alice), ("bob.pdf", &bob)]);

        let started = json_body(send(&router, multipart(&[("resumes.zip", &archive)])).await).await;
        let batch_id = started["batch_id"].as_str().unwrap().to_string();

        let report = wait_for(&router, &batch_id).await;
        assert_eq!(report["status"], "done");
        assert_eq!(report["record_count"], 2);
        assert!(report["skipped"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_zip_with_corrupt_readme_still_yields_record() {
        let router = test_router();
        let bob = docx_bytes(&["BOB", "Go developer"]);
        let mut archive =
            stored_zip_bytes(&[("bob.docx", &bob), ("readme.txt", b"README-BODY-0123456789")]);
        corrupt(&mut archive, b"README-BODY");

        let started = json_body(send(&router, multipart(&[("resumes.zip", &archive)])).await).await;
        let batch_id = started["batch_id"].as_str().unwrap().to_string();

        let report = wait_for(&router, &batch_id).await;
        assert_eq!(report["status"], "done");
        assert_eq!(report["record_count"], 1);
    }

    #[tokio::test]
    async fn test_batch_without_records_is_empty() {
        let router = test_router();
        let started = json_body(send(&router, multipart(&[("notes.txt", b"hello")])).await).await;
        let batch_id = started["batch_id"].as_str().unwrap().to_string();

        let report = wait_for(&router, &batch_id).await;
        assert_eq!(report["status"], "empty");
        assert!(report["download_url"].is_null());

        let response = send(&router, get(&format!("/api/v1/batches/{batch_id}/download"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_batch_is_not_found() {
        let router = test_router();
        let id = uuid::Uuid::new_v4();
        let response = send(&router, get(&format!("/api/v1/batches/{id}"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }
}

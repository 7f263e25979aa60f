//! 원격 인스피레이션 저장소 HTTP 클라이언트.
//!
//! `RemoteInspirationStore` 포트 구현. `apikey` + Bearer 헤더 자동 주입, 재시도 로직.
//!
//! - 미리보기: `PUT {base}/storage/v1/object/{bucket}/{owner}/{id}.webp`
//! - 행: `{base}/rest/v1/{table}` (`owner_id=eq.`, `id=eq.` 필터)

use async_trait::async_trait;
use atelier_core::config::RemoteConfig;
use atelier_core::error::CoreError;
use atelier_core::models::inspiration::{CaptureMetadata, Inspiration};
use atelier_core::ports::remote_store::{RemoteInspirationStore, RemoteUpload};
use reqwest::header::{HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// 기본 재시도 횟수
const DEFAULT_MAX_RETRIES: u32 = 2;

/// 재시도 대기 상한
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Retry-After 헤더가 없을 때의 기본 대기 (초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 재시도 가능한 에러인지 판별
fn is_retryable(error: &CoreError) -> bool {
    matches!(
        error,
        CoreError::RemoteUnavailable(_) | CoreError::RateLimit { .. }
    )
}

/// 원격 테이블 행 (로컬 전용 필드 제외)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InspirationRow {
    id: String,
    owner_id: String,
    original_file_name: String,
    #[serde(default)]
    preview_ref: Option<String>,
    #[serde(default)]
    color_palette: Vec<String>,
    #[serde(default)]
    metadata: CaptureMetadata,
    created_at: i64,
}

impl InspirationRow {
    fn from_upload(upload: &RemoteUpload, preview_ref: &str) -> Self {
        Self {
            id: upload.record_id.clone(),
            owner_id: upload.owner_id.clone(),
            original_file_name: upload.file_name.clone(),
            preview_ref: Some(preview_ref.to_string()),
            color_palette: upload.color_palette.clone(),
            metadata: upload.metadata.clone(),
            created_at: upload.created_at,
        }
    }
}

impl From<InspirationRow> for Inspiration {
    fn from(row: InspirationRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            original_file_name: row.original_file_name,
            preview_ref: row.preview_ref,
            color_palette: row.color_palette,
            metadata: row.metadata,
            created_at: row.created_at,
            local_preview_path: None,
        }
    }
}

/// 원격 저장소 HTTP 클라이언트 — `RemoteInspirationStore` 포트 구현
pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    table: String,
    bucket: String,
    max_retries: u32,
    initial_backoff: Duration,
}

// API 키는 출력하지 않음
impl fmt::Debug for HttpRemoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRemoteStore")
            .field("base_url", &self.base_url.as_str())
            .field("table", &self.table)
            .field("bucket", &self.bucket)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff", &self.initial_backoff)
            .finish_non_exhaustive()
    }
}

impl HttpRemoteStore {
    /// 새 원격 저장소 클라이언트 생성
    pub fn new(config: &RemoteConfig) -> Result<Self, CoreError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CoreError::Config(format!("잘못된 원격 주소 '{}': {e}", config.base_url)))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| {
                CoreError::RemoteUnavailable(format!("HTTP 클라이언트 빌드 실패: {e}"))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            table: config.table.clone(),
            bucket: config.bucket.clone(),
            max_retries: config.max_retries,
            initial_backoff: Duration::from_secs(1),
        })
    }

    /// 재시도 횟수 설정
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// 첫 재시도 대기 시간 설정
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// 기본 주소 뒤에 경로 세그먼트 추가 (세그먼트별 퍼센트 인코딩)
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CoreError::Config(format!("기본 주소로 쓸 수 없는 URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn object_url(&self, owner_id: &str, record_id: &str) -> Result<Url, CoreError> {
        let object = format!("{record_id}.webp");
        self.endpoint(&["storage", "v1", "object", &self.bucket, owner_id, &object])
    }

    /// 공개 미리보기 URL (행의 `preview_ref`로 저장)
    fn public_url(&self, owner_id: &str, record_id: &str) -> Result<Url, CoreError> {
        let object = format!("{record_id}.webp");
        self.endpoint(&[
            "storage", "v1", "object", "public", &self.bucket, owner_id, &object,
        ])
    }

    /// 테이블 URL + `column=eq.value` 필터
    fn table_url(&self, filters: &[(&str, &str)]) -> Result<Url, CoreError> {
        let mut url = self.endpoint(&["rest", "v1", &self.table])?;
        if !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (column, value) in filters {
                pairs.append_pair(column, &format!("eq.{value}"));
            }
        }
        Ok(url)
    }

    /// 인증 헤더가 포함된 요청 빌더 반환
    fn authorized_request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// 응답 상태 코드 확인 및 에러 매핑
    async fn check_response(
        &self,
        resp: reqwest::Response,
    ) -> Result<reqwest::Response, CoreError> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let status_code = status.as_u16();
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let path = resp.url().path().to_string();
        let text = resp.text().await.unwrap_or_else(|e| {
            warn!("응답 본문 읽기 실패: {e}");
            String::new()
        });

        match status_code {
            401 | 403 => Err(CoreError::Auth(format!("인증 실패 ({status}): {text}"))),
            404 => Err(CoreError::NotFound {
                resource_type: "RemoteResource".to_string(),
                id: path,
            }),
            429 => Err(CoreError::RateLimit {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            }),
            500..=599 => Err(CoreError::RemoteUnavailable(format!(
                "서버 에러 ({status}): {text}"
            ))),
            _ => Err(CoreError::RemoteUnavailable(format!(
                "예상치 못한 응답 ({status}): {text}"
            ))),
        }
    }

    /// 재시도가 포함된 요청 실행
    ///
    /// exponential backoff: 1s → 2s → 4s (최대 30s)
    async fn execute_with_retry<F, Fut, T>(&self, operation: F) -> Result<T, CoreError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut delay = self.initial_backoff;
        let mut attempt = 0;

        loop {
            let error = match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if !is_retryable(&error) || attempt >= self.max_retries {
                return Err(error);
            }

            // RateLimit의 경우 서버 지정 대기 시간 사용
            if let CoreError::RateLimit { retry_after_secs } = &error {
                delay = Duration::from_secs(*retry_after_secs).min(MAX_BACKOFF);
            }

            warn!(
                "요청 실패 (시도 {}/{}): {error}, {delay:?} 후 재시도",
                attempt + 1,
                self.max_retries + 1
            );

            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(MAX_BACKOFF);
            attempt += 1;
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response, CoreError> {
        let resp = request
            .send()
            .await
            .map_err(|e| CoreError::RemoteUnavailable(format!("{what} 요청 실패: {e}")))?;
        self.check_response(resp).await
    }
}

#[async_trait]
impl RemoteInspirationStore for HttpRemoteStore {
    async fn upload(&self, upload: &RemoteUpload) -> Result<String, CoreError> {
        debug!(
            "미리보기 업로드: id={}, owner={}, {}bytes",
            upload.record_id,
            upload.owner_id,
            upload.preview_bytes.len()
        );

        let object_url = self.object_url(&upload.owner_id, &upload.record_id)?;
        self.execute_with_retry(|| async {
            let req = self
                .authorized_request(reqwest::Method::PUT, object_url.clone())
                .header(CONTENT_TYPE, HeaderValue::from_static("image/webp"))
                .header("x-upsert", "true")
                .body(upload.preview_bytes.clone());
            self.send(req, "미리보기 업로드").await?;
            Ok(())
        })
        .await?;

        let preview_ref = self
            .public_url(&upload.owner_id, &upload.record_id)?
            .to_string();
        let row = InspirationRow::from_upload(upload, &preview_ref);
        let table_url = self.table_url(&[])?;

        self.execute_with_retry(|| async {
            let req = self
                .authorized_request(reqwest::Method::POST, table_url.clone())
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(&[&row]);
            self.send(req, "행 저장").await?;
            Ok(())
        })
        .await?;

        debug!("원격 업로드 완료: {preview_ref}");
        Ok(preview_ref)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Inspiration>, CoreError> {
        debug!("원격 목록 조회: owner={owner_id}");

        let mut url = self.table_url(&[("owner_id", owner_id)])?;
        url.query_pairs_mut().append_pair("order", "created_at.desc");

        let rows: Vec<InspirationRow> = self
            .execute_with_retry(|| async {
                let req = self.authorized_request(reqwest::Method::GET, url.clone());
                let resp = self.send(req, "목록 조회").await?;
                resp.json().await.map_err(|e| {
                    CoreError::RemoteUnavailable(format!("목록 응답 파싱 실패: {e}"))
                })
            })
            .await?;

        debug!("원격 목록 {}건", rows.len());
        Ok(rows.into_iter().map(Inspiration::from).collect())
    }

    async fn delete_by_id(&self, id: &str, owner_id: &str) -> Result<(), CoreError> {
        debug!("원격 삭제: id={id}, owner={owner_id}");

        let url = self.table_url(&[("id", id), ("owner_id", owner_id)])?;
        self.execute_with_retry(|| async {
            let req = self.authorized_request(reqwest::Method::DELETE, url.clone());
            self.send(req, "행 삭제").await?;
            Ok(())
        })
        .await?;

        // 미리보기 오브젝트 삭제는 best-effort
        let object_url = self.object_url(owner_id, id)?;
        let req = self.authorized_request(reqwest::Method::DELETE, object_url);
        match self.send(req, "미리보기 삭제").await {
            Ok(_) | Err(CoreError::NotFound { .. }) => {}
            Err(e) => warn!("원격 미리보기 삭제 실패 (무시): id={id}, {e}"),
        }

        Ok(())
    }

    async fn update_metadata(
        &self,
        id: &str,
        owner_id: &str,
        metadata: &CaptureMetadata,
    ) -> Result<(), CoreError> {
        debug!("원격 메타데이터 갱신: id={id}");

        let url = self.table_url(&[("id", id), ("owner_id", owner_id)])?;
        let body = serde_json::json!({ "metadata": metadata });
        self.execute_with_retry(|| async {
            let req = self
                .authorized_request(reqwest::Method::PATCH, url.clone())
                .header("Prefer", "return=minimal")
                .json(&body);
            self.send(req, "메타데이터 갱신").await?;
            Ok(())
        })
        .await
    }
}

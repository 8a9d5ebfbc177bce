use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use url::Url;
use super::errors::{ClientError, Result};
use super::sse::event_stream;
use super::transfer::{CountingStream, TransferCallback};
use super::traits::{ReportStream, VideoService};
use super::types::{ApiResponse, ProgressReport, UploadId, UploadReceipt, VideoId, VideoQuality};

const READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// 形如 http://host:port/jazz
    pub base_url: String,
    /// 整体请求超时, 上传不设超时所以缺省 None
    pub timeout: Option<Duration>,
    pub tcp_nodelay: bool,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/jazz".to_string(),
            timeout: None,
            tcp_nodelay: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(ApiClientConfig {
            base_url: base_url.to_string(),
            ..ApiClientConfig::default()
        })
    }

    pub fn with_config(config: ApiClientConfig) -> Result<Self> {
        let mut builder = Client::builder().tcp_nodelay(config.tcp_nodelay);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        // 先行校验, 后面的 endpoint 拼接都建立在合法 base 上
        Url::parse(&config.base_url)?;

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
    }

    /// 转码完成后的缩略图地址, 仅拼接不校验可达性
    pub fn thumbnail_url(&self, video_id: &VideoId) -> Result<Url> {
        self.endpoint(&format!("video/api/thumbnail/{video_id}"))
    }

    /// 查询各质量档的转码状态
    pub async fn video_qualities(&self, video_id: &VideoId) -> Result<Vec<VideoQuality>> {
        let url = self.endpoint(&format!("video/api/qualities/{video_id}"))?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::server_error(
                status.as_u16(),
                "Failed to fetch video qualities",
            ));
        }

        let envelope: ApiResponse<Vec<VideoQuality>> = response.json().await?;
        envelope.into_data()
    }

    fn guess_mime(file_name: &str) -> &'static str {
        match Path::new(file_name).extension().and_then(|ext| ext.to_str()) {
            Some("mp4" | "m4v") => "video/mp4",
            Some("webm") => "video/webm",
            Some("mkv") => "video/x-matroska",
            Some("mov") => "video/quicktime",
            _ => "application/octet-stream",
        }
    }
}

#[async_trait]
impl VideoService for ApiClient {
    async fn upload_video(
        &self,
        file_path: &Path,
        progress: Option<TransferCallback>,
    ) -> Result<UploadReceipt> {
        let metadata = tokio::fs::metadata(file_path).await?;
        if !metadata.is_file() {
            return Err(ClientError::ParamError("Not a file".to_string()));
        }

        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::ParamError("Can't read filename".to_string()))?
            .to_string();
        let file_size = metadata.len();

        let file = File::open(file_path).await?;
        let reader = ReaderStream::with_capacity(file, READ_BUFFER_SIZE);
        let body = match progress {
            Some(callback) => {
                Body::wrap_stream(CountingStream::new(reader, file_size, callback))
            }
            None => Body::wrap_stream(reader),
        };

        let part = Part::stream_with_length(body, file_size)
            .file_name(file_name.clone())
            .mime_str(Self::guess_mime(&file_name))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.endpoint("video/api/upload")?)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::server_error(
                status.as_u16(),
                "Upload request failed",
            ));
        }

        let envelope: ApiResponse<UploadReceipt> = response.json().await?;
        envelope.into_data()
    }

    async fn subscribe_progress(&self, upload_id: &UploadId) -> Result<ReportStream> {
        let url = self.endpoint(&format!("progress/sse/{upload_id}"))?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::server_error(
                status.as_u16(),
                "Failed to open progress stream",
            ));
        }

        let reports = event_stream(response).map(|item| match item {
            Ok(event) => {
                serde_json::from_str::<ProgressReport>(&event.data).map_err(ClientError::from)
            }
            Err(err) => Err(ClientError::EventStreamError(err.to_string())),
        });

        Ok(Box::pin(reports))
    }

    async fn fetch_progress(&self, upload_id: &UploadId) -> Result<ProgressReport> {
        let url = self.endpoint(&format!("video/api/progress/{upload_id}"))?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::server_error(
                status.as_u16(),
                "Failed to fetch progress",
            ));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_path() {
        let client = ApiClient::new("http://localhost:8080/jazz/").unwrap();
        let url = client.endpoint("video/api/upload").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/jazz/video/api/upload");
    }

    #[test]
    fn thumbnail_url_follows_convention() {
        let client = ApiClient::new("http://localhost:8080/jazz").unwrap();
        let url = client.thumbnail_url(&VideoId::new("v1")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/jazz/video/api/thumbnail/v1"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }

    #[test]
    fn mime_guess_covers_common_containers() {
        assert_eq!(ApiClient::guess_mime("movie.mp4"), "video/mp4");
        assert_eq!(ApiClient::guess_mime("movie.webm"), "video/webm");
        assert_eq!(ApiClient::guess_mime("movie.bin"), "application/octet-stream");
    }
}

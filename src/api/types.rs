use serde::{Deserialize, Serialize};
use super::errors::{ClientError, Result};

/// 服务端分配的上传标识（不透明字符串）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UploadId(String);

impl UploadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UploadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 转码产物的资源标识, 只在 COMPLETED 报告里出现
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 服务端处理状态
///
/// 服务端还会上报 UPLOADING / PROCESSING / THUMBNAIL 这几个中间态，
/// 统一归入 Running（均为非终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    /// 等待处理
    Pending,
    /// 处理中
    #[serde(alias = "UPLOADING", alias = "PROCESSING", alias = "THUMBNAIL")]
    Running,
    /// 已完成
    Completed,
    /// 失败
    Failed,
}

impl ProcessingStatus {
    /// COMPLETED / FAILED 之后不会再有新的进度报告
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// 单条进度报告, 后到的覆盖先到的
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub progress_percentage: u8,
    pub message: String,
    pub status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<VideoId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<UploadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_bytes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_bytes: Option<u64>,
}

impl ProgressReport {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// 通用响应包装
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 解开包装；success = false 或缺少 data 都视为失败
    pub fn into_data(self) -> Result<T> {
        if !self.success {
            return Err(ClientError::Rejected(
                self.message.unwrap_or_else(|| "Request rejected".to_string()),
            ));
        }

        self.data
            .ok_or_else(|| ClientError::internal_error("Response has no data field"))
    }
}

/// 上传已受理
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub upload_id: UploadId,
    #[serde(default)]
    pub video: Option<VideoSummary>,
}

/// 随上传响应附带的资源摘要
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    pub uuid: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// 单个质量档的转码记录
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuality {
    pub quality: String,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub bitrate: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    pub status: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_progress_report() {
        let json = r#"{"progressPercentage":50,"message":"Transcoding...","status":"RUNNING"}"#;
        let report: ProgressReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.progress_percentage, 50);
        assert_eq!(report.status, ProcessingStatus::Running);
        assert!(report.video_id.is_none());
        assert!(!report.is_terminal());
    }

    #[test]
    fn parse_completed_report_with_video_id() {
        let json = r#"{"progressPercentage":100,"message":"Done","status":"COMPLETED","videoId":"v1"}"#;
        let report: ProgressReport = serde_json::from_str(json).unwrap();
        assert!(report.is_terminal());
        assert_eq!(report.video_id, Some(VideoId::new("v1")));
    }

    #[test]
    fn legacy_statuses_map_to_running() {
        for status in ["UPLOADING", "PROCESSING", "THUMBNAIL"] {
            let json = format!(
                r#"{{"progressPercentage":10,"message":"...","status":"{status}"}}"#
            );
            let report: ProgressReport = serde_json::from_str(&json).unwrap();
            assert_eq!(report.status, ProcessingStatus::Running);
            assert!(!report.is_terminal());
        }
    }

    #[test]
    fn parse_report_with_server_extras() {
        let json = r#"{
            "uploadId": "abc",
            "fileName": "movie.mp4",
            "totalBytes": 2048,
            "uploadedBytes": 1024,
            "progressPercentage": 50,
            "message": "Uploading... 50% (1024/2048 bytes)",
            "status": "UPLOADING"
        }"#;
        let report: ProgressReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.upload_id, Some(UploadId::new("abc")));
        assert_eq!(report.total_bytes, Some(2048));
        assert_eq!(report.uploaded_bytes, Some(1024));
    }

    #[test]
    fn envelope_success_unwraps_data() {
        let json = r#"{"success":true,"message":"ok","data":{"uploadId":"abc"}}"#;
        let response: ApiResponse<UploadReceipt> = serde_json::from_str(json).unwrap();
        let receipt = response.into_data().unwrap();
        assert_eq!(receipt.upload_id, UploadId::new("abc"));
    }

    #[test]
    fn envelope_failure_carries_server_message() {
        let json = r#"{"success":false,"message":"too large"}"#;
        let response: ApiResponse<UploadReceipt> = serde_json::from_str(json).unwrap();
        match response.into_data() {
            Err(ClientError::Rejected(message)) => assert!(message.contains("too large")),
            other => panic!("Expected Rejected, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn envelope_missing_data_is_internal_error() {
        let json = r#"{"success":true,"message":"ok"}"#;
        let response: ApiResponse<UploadReceipt> = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_data(),
            Err(ClientError::InternalError(_))
        ));
    }
}

use std::path::Path;
use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use super::errors::Result;
use super::transfer::TransferCallback;
use super::types::{ProgressReport, UploadId, UploadReceipt};

/// 进度报告流（推送通道解析后的形态）
pub type ReportStream = Pin<Box<dyn Stream<Item = Result<ProgressReport>> + Send>>;

/// 视频服务传输层 - 会话控制器只通过这个接口访问后端
#[async_trait]
pub trait VideoService: Send + Sync + 'static {
    /// 提交一个本地文件, 单次 multipart POST, 不重试不分片
    async fn upload_video(
        &self,
        file_path: &Path,
        progress: Option<TransferCallback>,
    ) -> Result<UploadReceipt>;

    /// 打开按 uploadId 订阅的推送通道
    async fn subscribe_progress(&self, upload_id: &UploadId) -> Result<ReportStream>;

    /// 轮询一次当前进度
    async fn fetch_progress(&self, upload_id: &UploadId) -> Result<ProgressReport>;
}

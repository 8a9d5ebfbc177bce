use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::api::{UploadId, VideoId};
use super::types::{SessionId, SessionPhase};

/// 一次上传会话的完整记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    pub id: SessionId,
    pub file_path: PathBuf,
    /// 服务端受理后分配
    pub upload_id: Option<UploadId>,
    /// COMPLETED 报告携带
    pub video_id: Option<VideoId>,
    pub phase: SessionPhase,
    pub last_percentage: u8,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub error: Option<String>,
}

impl UploadSession {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            id: SessionId::new(),
            file_path,
            upload_id: None,
            video_id: None,
            phase: SessionPhase::Open,
            last_percentage: 0,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, SessionPhase::Terminal | SessionPhase::Disposed)
    }
}

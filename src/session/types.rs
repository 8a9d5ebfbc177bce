use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;
use crate::api::{ProgressReport, Result, TransferProgress, VideoId};
use super::session::UploadSession;

/// 会话标识, 客户端本地生成
///
/// 用于区分前后两次上传: 旧会话拆除后迟到的消息带着旧 id, 直接丢弃
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 会话生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SessionPhase {
    /// 已创建（上传请求进行中）
    Open,
    /// 推送通道已建立
    Pushing,
    /// 推送失效, 轮询中
    Polling,
    /// 终态（COMPLETED / FAILED）
    Terminal,
    /// 通道与定时器均已回收
    Disposed,
}

/// 监视器对外的增量更新
#[derive(Debug, Clone)]
pub enum MonitorUpdate {
    /// 推送通道已打开
    Subscribed,
    /// 推送失效, 已切换到轮询
    FellBack {
        reason: String,
    },
    /// 最新进度报告
    Report(ProgressReport),
}

/// 监视器退出原因
#[derive(Debug, Clone)]
pub enum MonitorOutcome {
    /// COMPLETED; videoId 缺失时不触发播放
    Completed {
        video_id: Option<VideoId>,
        report: ProgressReport,
    },
    /// FAILED
    Failed {
        message: String,
    },
    /// 被上层取消
    Cancelled,
}

/// 会话事件
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// 会话已创建
    SessionOpened {
        session_id: SessionId,
    },
    /// 生命周期阶段变更
    PhaseChanged {
        session_id: SessionId,
        old_phase: SessionPhase,
        new_phase: SessionPhase,
    },
    /// 本地传输进度（请求体发送）
    TransferProgress {
        session_id: SessionId,
        progress: TransferProgress,
    },
    /// 服务端进度报告
    Report {
        session_id: SessionId,
        report: ProgressReport,
    },
    /// 处理完成
    Completed {
        session_id: SessionId,
        video_id: Option<VideoId>,
    },
    /// 播放器已绑定清单
    PlaybackStarted {
        session_id: SessionId,
        video_id: VideoId,
        manifest: Url,
    },
    /// 上传或处理失败
    Failed {
        session_id: SessionId,
        message: String,
    },
}

/// 控制器命令
pub enum ControllerCommand {
    /// 开始新的上传会话; 已有会话先被拆除
    StartUpload {
        file_path: PathBuf,
        reply: oneshot::Sender<Result<SessionId>>,
    },

    /// 当前会话快照
    GetSession {
        reply: oneshot::Sender<Option<UploadSession>>,
    },

    /// 显式终止当前会话
    Abort {
        reply: oneshot::Sender<Result<()>>,
    },
}

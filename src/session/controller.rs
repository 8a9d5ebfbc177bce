use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use crate::api::{ClientError, Result, VideoService};
use crate::playback::{ManifestTemplate, MediaPlayer};
use super::monitor::MonitorConfig;
use super::session::UploadSession;
use super::types::{ControllerCommand, SessionEvent, SessionId};
use super::worker::ControllerWorker;

/// 会话控制器配置
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub monitor: MonitorConfig,
    pub manifest: ManifestTemplate,
    pub autoplay: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            manifest: ManifestTemplate::default(),
            autoplay: true,
        }
    }
}

/// 会话控制器 - 唯一持有会话状态的地方
///
/// 上传、进度通道、播放器实例都挂在当前会话下;
/// 新会话开始前旧会话一定先被拆除
#[derive(Clone)]
pub struct SessionController {
    command_tx: mpsc::Sender<ControllerCommand>,
    event_tx: broadcast::Sender<SessionEvent>,
}

/// 控制器句柄 - 包含控制器和工作任务
pub struct SessionControllerHandle {
    pub controller: SessionController,
    pub worker_handle: JoinHandle<()>,
}

impl SessionControllerHandle {
    pub async fn shutdown(self) -> Result<()> {
        drop(self.controller);
        self.worker_handle
            .await
            .map_err(|err| ClientError::InternalError(format!("Worker panic: {}", err)))
    }
}

impl SessionController {
    pub fn new(
        service: Arc<dyn VideoService>,
        player: Box<dyn MediaPlayer>,
        config: SessionConfig,
    ) -> SessionControllerHandle {
        let (command_tx, command_rx) = mpsc::channel(100);
        // 最大缓存 256 个事件
        let (event_tx, _) = broadcast::channel(256);

        let worker_handle = tokio::spawn(ControllerWorker::run(
            service,
            player,
            config,
            command_rx,
            event_tx.clone(),
        ));

        let controller = Self {
            command_tx,
            event_tx,
        };

        SessionControllerHandle {
            controller,
            worker_handle,
        }
    }

    /// Start a new upload session
    pub async fn start_upload(&self, file_path: PathBuf) -> Result<SessionId> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ControllerCommand::StartUpload {
                file_path,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ClientError::internal_error("Controller shut down"))?;

        reply_rx
            .await
            .map_err(|err| ClientError::internal_error(err.to_string()))?
    }

    /// Current session snapshot
    pub async fn session(&self) -> Result<Option<UploadSession>> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ControllerCommand::GetSession { reply: reply_tx })
            .await
            .map_err(|_| ClientError::internal_error("Controller shut down"))?;

        reply_rx
            .await
            .map_err(|err| ClientError::internal_error(err.to_string()))
    }

    /// Abort the active session
    pub async fn abort(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(ControllerCommand::Abort { reply: reply_tx })
            .await
            .map_err(|_| ClientError::internal_error("Controller shut down"))?;

        reply_rx
            .await
            .map_err(|err| ClientError::internal_error(err.to_string()))?
    }

    /// 订阅会话事件
    ///
    /// 注意：
    /// - 接收速度跟不上时可能丢失事件（lagged error）
    /// - 每个订阅者都会收到完整的事件副本
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }
}

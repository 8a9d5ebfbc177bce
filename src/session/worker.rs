use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use crate::api::{TransferCallback, TransferProgress, UploadId, VideoService};
use crate::playback::{MediaPlayer, PlaybackInitializer};
use super::controller::SessionConfig;
use super::monitor::{MonitorConfig, ProgressMonitor};
use super::session::UploadSession;
use super::types::{ControllerCommand, MonitorOutcome, MonitorUpdate, SessionEvent, SessionId, SessionPhase};

/// 会话任务向控制器上报的内部消息
pub(crate) enum SessionMessage {
    Transfer(TransferProgress),
    Accepted { upload_id: UploadId },
    UploadFailed { error: String },
    Monitor(MonitorUpdate),
    MonitorDone(MonitorOutcome),
}

struct ActiveSession {
    session_id: SessionId,
    cancellation_token: CancellationToken,
}

pub(crate) struct ControllerWorker {
    service: Arc<dyn VideoService>,
    playback: PlaybackInitializer,
    config: SessionConfig,
    session: Option<UploadSession>,
    active: Option<ActiveSession>,
    event_tx: broadcast::Sender<SessionEvent>,
    msg_tx: mpsc::UnboundedSender<(SessionId, SessionMessage)>,
}

impl ControllerWorker {
    pub(crate) async fn run(
        service: Arc<dyn VideoService>,
        player: Box<dyn MediaPlayer>,
        config: SessionConfig,
        mut command_rx: mpsc::Receiver<ControllerCommand>,
        event_tx: broadcast::Sender<SessionEvent>,
    ) {
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let playback = PlaybackInitializer::new(player, config.manifest.clone())
            .with_autoplay(config.autoplay);

        let mut worker = Self {
            service,
            playback,
            config,
            session: None,
            active: None,
            event_tx,
            msg_tx,
        };

        // 主事件循环, 命令与会话消息交错处理
        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(command) => worker.handle_command(command),
                    // 所有控制器句柄已释放
                    None => break,
                },
                Some((session_id, message)) = msg_rx.recv() => {
                    worker.handle_message(session_id, message).await;
                }
            }
        }

        worker.teardown_active();
        let _ = worker.playback.stop().await;
    }

    fn handle_command(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::StartUpload { file_path, reply } => {
                let session_id = self.start_upload(file_path);
                let _ = reply.send(Ok(session_id));
            }
            ControllerCommand::GetSession { reply } => {
                let _ = reply.send(self.session.clone());
            }
            ControllerCommand::Abort { reply } => {
                match &self.active {
                    Some(active) => {
                        active.cancellation_token.cancel();
                        let _ = reply.send(Ok(()));
                    }
                    None => {
                        let _ = reply.send(Err(crate::api::ClientError::ParamError(
                            "No active session".to_string(),
                        )));
                    }
                }
            }
        }
    }

    fn start_upload(&mut self, file_path: PathBuf) -> SessionId {
        // 先拆上一个会话, 同一时刻至多一条进度通道
        self.teardown_active();

        let session = UploadSession::new(file_path.clone());
        let session_id = session.id;
        self.session = Some(session);
        let _ = self.event_tx.send(SessionEvent::SessionOpened { session_id });

        // 会话任务的生命周期由 token 控制, 结果走消息通道回来
        let cancellation_token = CancellationToken::new();
        tokio::spawn(run_session(
            self.service.clone(),
            self.config.monitor.clone(),
            session_id,
            file_path,
            cancellation_token.clone(),
            self.msg_tx.clone(),
        ));

        self.active = Some(ActiveSession {
            session_id,
            cancellation_token,
        });

        session_id
    }

    async fn handle_message(&mut self, session_id: SessionId, message: SessionMessage) {
        // 旧会话拆除后迟到的消息直接丢弃
        if self.session.as_ref().map(|session| session.id) != Some(session_id) {
            debug!(%session_id, "dropping message from stale session");
            return;
        }

        match message {
            SessionMessage::Transfer(progress) => {
                let _ = self.event_tx.send(SessionEvent::TransferProgress {
                    session_id,
                    progress,
                });
            }
            SessionMessage::Accepted { upload_id } => {
                info!(%session_id, %upload_id, "upload accepted");
                if let Some(session) = self.session.as_mut() {
                    session.upload_id = Some(upload_id);
                    session.started_at = Some(chrono::Utc::now());
                }
            }
            SessionMessage::UploadFailed { error } => {
                if let Some(session) = self.session.as_mut() {
                    session.error = Some(error.clone());
                    session.completed_at = Some(chrono::Utc::now());
                }
                self.set_phase(SessionPhase::Terminal);
                let _ = self.event_tx.send(SessionEvent::Failed {
                    session_id,
                    message: error,
                });
                self.set_phase(SessionPhase::Disposed);
                self.active = None;
            }
            SessionMessage::Monitor(MonitorUpdate::Subscribed) => {
                self.set_phase(SessionPhase::Pushing);
            }
            SessionMessage::Monitor(MonitorUpdate::FellBack { reason }) => {
                debug!(%session_id, %reason, "switched to polling");
                self.set_phase(SessionPhase::Polling);
            }
            SessionMessage::Monitor(MonitorUpdate::Report(report)) => {
                if let Some(session) = self.session.as_mut() {
                    session.last_percentage = report.progress_percentage;
                }
                let _ = self.event_tx.send(SessionEvent::Report { session_id, report });
            }
            SessionMessage::MonitorDone(outcome) => {
                self.finish(session_id, outcome).await;
            }
        }
    }

    async fn finish(&mut self, session_id: SessionId, outcome: MonitorOutcome) {
        match outcome {
            MonitorOutcome::Completed { video_id, .. } => {
                if let Some(session) = self.session.as_mut() {
                    session.video_id = video_id.clone();
                    session.completed_at = Some(chrono::Utc::now());
                }
                self.set_phase(SessionPhase::Terminal);
                let _ = self.event_tx.send(SessionEvent::Completed {
                    session_id,
                    video_id: video_id.clone(),
                });

                // videoId 缺失的完成报告不触发播放
                if let Some(video_id) = video_id {
                    match self.playback.start(&video_id).await {
                        Ok(manifest) => {
                            info!(%video_id, %manifest, "playback initialized");
                            let _ = self.event_tx.send(SessionEvent::PlaybackStarted {
                                session_id,
                                video_id,
                                manifest,
                            });
                        }
                        Err(err) => {
                            let _ = self.event_tx.send(SessionEvent::Failed {
                                session_id,
                                message: format!("Playback init failed: {err}"),
                            });
                        }
                    }
                }
            }
            MonitorOutcome::Failed { message } => {
                if let Some(session) = self.session.as_mut() {
                    session.error = Some(message.clone());
                    session.completed_at = Some(chrono::Utc::now());
                }
                self.set_phase(SessionPhase::Terminal);
                let _ = self.event_tx.send(SessionEvent::Failed {
                    session_id,
                    message,
                });
            }
            MonitorOutcome::Cancelled => {
                debug!(%session_id, "session cancelled");
            }
        }

        self.set_phase(SessionPhase::Disposed);
        self.active = None;
    }

    fn set_phase(&mut self, new_phase: SessionPhase) {
        if let Some(session) = self.session.as_mut() {
            if session.phase == new_phase {
                return;
            }

            let old_phase = session.phase;
            session.phase = new_phase;
            let _ = self.event_tx.send(SessionEvent::PhaseChanged {
                session_id: session.id,
                old_phase,
                new_phase,
            });
        }
    }

    fn teardown_active(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(session_id = %active.session_id, "tearing down previous session");
            active.cancellation_token.cancel();
        }
        self.set_phase(SessionPhase::Disposed);
    }
}

/// 单个会话的后台任务: 上传 → 监视 → 终态
async fn run_session(
    service: Arc<dyn VideoService>,
    monitor_config: MonitorConfig,
    session_id: SessionId,
    file_path: PathBuf,
    cancellation_token: CancellationToken,
    msg_tx: mpsc::UnboundedSender<(SessionId, SessionMessage)>,
) {
    let transfer_tx = msg_tx.clone();
    let callback: TransferCallback = Arc::new(move |progress| {
        let _ = transfer_tx.send((session_id, SessionMessage::Transfer(progress)));
    });

    let upload = service.upload_video(&file_path, Some(callback));
    let receipt = tokio::select! {
        result = upload => match result {
            Ok(receipt) => receipt,
            Err(err) => {
                let _ = msg_tx.send((
                    session_id,
                    SessionMessage::UploadFailed { error: err.to_string() },
                ));
                return;
            }
        },
        _ = cancellation_token.cancelled() => {
            let _ = msg_tx.send((session_id, SessionMessage::MonitorDone(MonitorOutcome::Cancelled)));
            return;
        }
    };

    let upload_id = receipt.upload_id.clone();
    let _ = msg_tx.send((
        session_id,
        SessionMessage::Accepted { upload_id: upload_id.clone() },
    ));

    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let forward = tokio::spawn({
        let msg_tx = msg_tx.clone();
        async move {
            while let Some(update) = update_rx.recv().await {
                let _ = msg_tx.send((session_id, SessionMessage::Monitor(update)));
            }
        }
    });

    let outcome = ProgressMonitor::new(service, upload_id, update_tx, cancellation_token)
        .with_config(monitor_config)
        .run()
        .await;

    // 先等更新转发完, 保证终态消息排在最后
    let _ = forward.await;
    let _ = msg_tx.send((session_id, SessionMessage::MonitorDone(outcome)));
}

use std::sync::Arc;
use std::time::Duration;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use crate::api::{ProcessingStatus, ProgressReport, ReportStream, UploadId, VideoService};
use super::types::{MonitorOutcome, MonitorUpdate};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// 轮询间隔
    pub poll_interval: Duration,
    /// 推送通道静默超过该时长则放弃推送, 改走轮询
    pub idle_timeout: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            idle_timeout: None,
        }
    }
}

/// 进度监视器 - 两态状态机
///
/// 先订阅推送通道; 订阅失败、流中途出错、静默超时或未见终态就关闭时,
/// 降级为固定间隔轮询。收到第一条 COMPLETED / FAILED 报告即退出,
/// 所有退出路径都会释放通道与定时器。
pub struct ProgressMonitor {
    service: Arc<dyn VideoService>,
    upload_id: UploadId,
    config: MonitorConfig,
    updates: mpsc::UnboundedSender<MonitorUpdate>,
    cancellation_token: CancellationToken,
}

impl ProgressMonitor {
    pub fn new(
        service: Arc<dyn VideoService>,
        upload_id: UploadId,
        updates: mpsc::UnboundedSender<MonitorUpdate>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            service,
            upload_id,
            config: MonitorConfig::default(),
            updates,
            cancellation_token,
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    pub async fn run(self) -> MonitorOutcome {
        let token = self.cancellation_token.clone();

        tokio::select! {
            outcome = self.watch() => outcome,
            _ = token.cancelled() => MonitorOutcome::Cancelled,
        }
    }

    async fn watch(&self) -> MonitorOutcome {
        match self.service.subscribe_progress(&self.upload_id).await {
            Ok(stream) => {
                let _ = self.updates.send(MonitorUpdate::Subscribed);
                if let Some(outcome) = self.follow_push(stream).await {
                    return outcome;
                }
                // 推送通道已在 follow_push 返回前随 stream 一起释放
            }
            Err(err) => {
                self.fall_back(&err.to_string());
            }
        }

        self.poll_loop().await
    }

    /// 消费推送通道; 终态返回 Some, 需要降级时返回 None
    async fn follow_push(&self, mut stream: ReportStream) -> Option<MonitorOutcome> {
        loop {
            let next = match self.config.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                    Ok(item) => item,
                    Err(_) => {
                        self.fall_back("push channel idle");
                        return None;
                    }
                },
                None => stream.next().await,
            };

            match next {
                Some(Ok(report)) => {
                    if let Some(outcome) = self.forward(report) {
                        return Some(outcome);
                    }
                }
                Some(Err(err)) => {
                    self.fall_back(&err.to_string());
                    return None;
                }
                None => {
                    self.fall_back("push channel closed before terminal status");
                    return None;
                }
            }
        }
    }

    async fn poll_loop(&self) -> MonitorOutcome {
        let period = self.config.poll_interval;
        let mut ticker =
            tokio::time::interval_at(tokio::time::Instant::now() + period, period);

        loop {
            ticker.tick().await;

            match self.service.fetch_progress(&self.upload_id).await {
                Ok(report) => {
                    if let Some(outcome) = self.forward(report) {
                        return outcome;
                    }
                }
                Err(err) => {
                    // 失败的轮询直接跳过, 下个周期重试
                    debug!(upload_id = %self.upload_id, error = %err, "poll failed");
                }
            }
        }
    }

    fn fall_back(&self, reason: &str) {
        warn!(upload_id = %self.upload_id, reason, "push channel unavailable, falling back to polling");
        let _ = self.updates.send(MonitorUpdate::FellBack {
            reason: reason.to_string(),
        });
    }

    fn forward(&self, report: ProgressReport) -> Option<MonitorOutcome> {
        let status = report.status;
        let video_id = report.video_id.clone();
        let message = report.message.clone();

        let _ = self.updates.send(MonitorUpdate::Report(report.clone()));

        match status {
            ProcessingStatus::Completed => Some(MonitorOutcome::Completed { video_id, report }),
            ProcessingStatus::Failed => Some(MonitorOutcome::Failed { message }),
            _ => None,
        }
    }
}

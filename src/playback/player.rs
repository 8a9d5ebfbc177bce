use async_trait::async_trait;
use tokio::process::{Child, Command};
use url::Url;
use crate::api::{Result, VideoId};
use super::manifest::ManifestTemplate;

/// 自适应流播放器的外部接口
#[async_trait]
pub trait MediaPlayer: Send {
    /// 绑定清单地址并开始播放
    async fn initialize(&mut self, manifest: &Url, autoplay: bool) -> Result<()>;

    /// 释放当前播放实例
    async fn reset(&mut self) -> Result<()>;
}

/// 播放引导器
///
/// 只由完成报告触发; 重新引导前先拆掉上一个播放实例
pub struct PlaybackInitializer {
    template: ManifestTemplate,
    player: Box<dyn MediaPlayer>,
    autoplay: bool,
    active: bool,
}

impl PlaybackInitializer {
    pub fn new(player: Box<dyn MediaPlayer>, template: ManifestTemplate) -> Self {
        Self {
            template,
            player,
            autoplay: true,
            active: false,
        }
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    /// 由 videoId 推导清单地址并启动播放, 返回实际使用的地址
    pub async fn start(&mut self, video_id: &VideoId) -> Result<Url> {
        let manifest = self.template.manifest_url(video_id)?;

        if self.active {
            self.player.reset().await?;
            self.active = false;
        }

        self.player.initialize(&manifest, self.autoplay).await?;
        self.active = true;

        Ok(manifest)
    }

    pub async fn stop(&mut self) -> Result<()> {
        if self.active {
            self.player.reset().await?;
            self.active = false;
        }

        Ok(())
    }
}

/// 把清单地址交给外部播放器进程 (mpv / ffplay 等)
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            child: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

#[async_trait]
impl MediaPlayer for CommandPlayer {
    async fn initialize(&mut self, manifest: &Url, autoplay: bool) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if !autoplay {
            command.arg("--pause");
        }
        command.arg(manifest.as_str());
        command.kill_on_drop(true);

        self.child = Some(command.spawn()?);
        Ok(())
    }

    async fn reset(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            // 进程可能已经自己退出了
            let _ = child.kill().await;
        }

        Ok(())
    }
}

//! 命令行入口的配置, 读取工作目录下的 config.toml

use std::fs;
use std::time::Duration;
use serde::Deserialize;
use crate::api::ApiClientConfig;
use crate::playback::{ManifestTemplate, QualityLabel};
use crate::session::{MonitorConfig, SessionConfig};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    /// API 基地址, 形如 http://host:port/jazz
    pub api_base: String,
    pub poll_interval_secs: u64,
    /// 推送通道静默超时, 不设则一直等
    pub idle_timeout_secs: Option<u64>,
    /// 对象存储网关
    pub stream_host: String,
    pub stream_port: u16,
    pub quality: QualityLabel,
    /// 外部播放器命令
    pub player: String,
    pub player_args: Vec<String>,
    pub autoplay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080/jazz".to_string(),
            poll_interval_secs: 2,
            idle_timeout_secs: None,
            stream_host: "localhost".to_string(),
            stream_port: 9000,
            quality: QualityLabel::default(),
            player: "mpv".to_string(),
            player_args: Vec::new(),
            autoplay: true,
        }
    }
}

impl Config {
    /// config.toml 缺失时回退到默认值, 格式错误直接失败
    pub fn load() -> Config {
        match fs::read_to_string("config.toml") {
            Ok(raw) => toml::from_str(&raw).expect("Can't load config.toml"),
            Err(_) => Config::default(),
        }
    }

    pub fn api_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            base_url: self.api_base.clone(),
            ..ApiClientConfig::default()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            monitor: MonitorConfig {
                poll_interval: Duration::from_secs(self.poll_interval_secs),
                idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
            },
            manifest: ManifestTemplate {
                scheme: "http".to_string(),
                host: self.stream_host.clone(),
                port: self.stream_port,
                quality: self.quality,
            },
            autoplay: self.autoplay,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_backend_conventions() {
        let config = Config::default();
        assert_eq!(config.api_base, "http://localhost:8080/jazz");
        assert_eq!(config.poll_interval_secs, 2);
        assert_eq!(config.stream_port, 9000);
        assert_eq!(config.quality, QualityLabel::Q360p);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config =
            toml::from_str("api_base = \"http://media:8080/jazz\"\nquality = \"q720p\"").unwrap();
        assert_eq!(config.api_base, "http://media:8080/jazz");
        assert_eq!(config.quality, QualityLabel::Q720p);
        assert_eq!(config.poll_interval_secs, 2);
    }

    #[test]
    fn session_config_carries_manifest_template() {
        let config = Config::default();
        let session = config.session_config();
        assert_eq!(session.manifest.host, "localhost");
        assert_eq!(session.manifest.port, 9000);
        assert_eq!(session.monitor.poll_interval, Duration::from_secs(2));
        assert!(session.autoplay);
    }
}

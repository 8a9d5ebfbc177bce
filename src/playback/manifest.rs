use serde::{Deserialize, Serialize};
use url::Url;
use crate::api::{Result, VideoId};

/// 转码输出的质量档标签, 对应对象存储的 bucket 前缀 videos-{label}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    Q360p,
    Q480p,
    Q720p,
    Q1080p,
}

impl Default for QualityLabel {
    fn default() -> Self {
        // 目前固定 360p, 暂无选档逻辑
        Self::Q360p
    }
}

impl std::fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Q360p => "q360p",
            Self::Q480p => "q480p",
            Self::Q720p => "q720p",
            Self::Q1080p => "q1080p",
        };
        write!(f, "{label}")
    }
}

/// DASH 清单地址模板
///
/// http://{host}:{port}/videos-{quality}/videos/{video_id}/dash/manifest.mpd
/// 只做字符串拼接, 不校验目标可达性
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ManifestTemplate {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub quality: QualityLabel,
}

impl Default for ManifestTemplate {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 9000,
            quality: QualityLabel::default(),
        }
    }
}

impl ManifestTemplate {
    pub fn manifest_url(&self, video_id: &VideoId) -> Result<Url> {
        let url = format!(
            "{}://{}:{}/videos-{}/videos/{}/dash/manifest.mpd",
            self.scheme, self.host, self.port, self.quality, video_id
        );

        Ok(Url::parse(&url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_matches_convention() {
        let template = ManifestTemplate::default();
        let url = template.manifest_url(&VideoId::new("v1")).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/videos-q360p/videos/v1/dash/manifest.mpd"
        );
    }

    #[test]
    fn substitutes_host_port_and_quality() {
        let template = ManifestTemplate {
            scheme: "http".to_string(),
            host: "media.internal".to_string(),
            port: 9100,
            quality: QualityLabel::Q720p,
        };
        let url = template
            .manifest_url(&VideoId::new("5f0c"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://media.internal:9100/videos-q720p/videos/5f0c/dash/manifest.mpd"
        );
    }

    #[test]
    fn quality_labels_render_lowercase() {
        assert_eq!(QualityLabel::Q360p.to_string(), "q360p");
        assert_eq!(QualityLabel::Q1080p.to_string(), "q1080p");
    }
}

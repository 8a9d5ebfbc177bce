pub mod api;
pub mod config;
pub mod playback;
pub mod session;
pub mod view;

// 重新导出核心类型
pub use api::{
    ApiClient,
    ApiClientConfig,
    ClientError,
    ProcessingStatus,
    ProgressReport,
    Result,
    TransferProgress,
    UploadId,
    UploadReceipt,
    VideoId,
    VideoService,
};

pub use session::{
    MonitorConfig,
    MonitorOutcome,
    MonitorUpdate,
    ProgressMonitor,
    SessionConfig,
    SessionController,
    SessionControllerHandle,
    SessionEvent,
    SessionId,
    SessionPhase,
    UploadSession,
};

pub use playback::{
    CommandPlayer,
    ManifestTemplate,
    MediaPlayer,
    PlaybackInitializer,
    QualityLabel,
};

pub use view::{ProgressView, TerminalView};

mod client;
mod errors;
mod sse;
mod traits;
mod transfer;
mod types;

pub use client::{ApiClient, ApiClientConfig};
pub use errors::{ClientError, Result};
pub use sse::{SseDecoder, SseEvent, event_stream};
pub use traits::{ReportStream, VideoService};
pub use transfer::{CountingStream, TransferCallback, TransferProgress};
pub use types::{
    ApiResponse,
    ProcessingStatus,
    ProgressReport,
    UploadId,
    UploadReceipt,
    VideoId,
    VideoQuality,
    VideoSummary,
};

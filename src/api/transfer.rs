use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use bytes::Bytes;
use futures::Stream;
use pin_project_lite::pin_project;

/// 本地传输进度（请求体已发送的字节）
#[derive(Debug, Clone, Copy)]
pub struct TransferProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
    pub percentage: f64,
}

pub type TransferCallback = Arc<dyn Fn(TransferProgress) + Send + Sync>;

pin_project! {
    /// 包装请求体流, 统计流过的字节并回调进度
    pub struct CountingStream<S> {
        #[pin]
        inner: S,
        bytes_sent: u64,
        total_bytes: u64,
        callback: TransferCallback,
        last_emit: Option<Instant>,
        emit_interval: Duration,
    }
}

impl<S> CountingStream<S> {
    pub fn new(inner: S, total_bytes: u64, callback: TransferCallback) -> Self {
        Self {
            inner,
            bytes_sent: 0,
            total_bytes,
            callback,
            last_emit: None,
            emit_interval: Duration::from_millis(500),
        }
    }

    pub fn with_emit_interval(mut self, interval: Duration) -> Self {
        self.emit_interval = interval;
        self
    }
}

impl<S> Stream for CountingStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>>,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                *this.bytes_sent += chunk.len() as u64;

                let finished = *this.bytes_sent >= *this.total_bytes;
                let due = this
                    .last_emit
                    .map(|at| at.elapsed() >= *this.emit_interval)
                    .unwrap_or(true);

                // 末尾必报一次, 其余按间隔节流
                if finished || due {
                    let percentage = if *this.total_bytes > 0 {
                        (*this.bytes_sent as f64 / *this.total_bytes as f64) * 100.0
                    } else {
                        0.0
                    };

                    (this.callback.as_ref())(TransferProgress {
                        bytes_sent: *this.bytes_sent,
                        total_bytes: *this.total_bytes,
                        percentage,
                    });

                    *this.last_emit = Some(Instant::now());
                }

                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn counts_bytes_and_reports_completion() {
        let seen: Arc<Mutex<Vec<TransferProgress>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: TransferCallback = Arc::new(move |progress| {
            sink.lock().unwrap().push(progress);
        });

        let chunks = vec![
            Ok(Bytes::from_static(b"aaaa")),
            Ok(Bytes::from_static(b"bbbb")),
        ];
        let mut stream = CountingStream::new(futures::stream::iter(chunks), 8, callback)
            .with_emit_interval(Duration::ZERO);

        while stream.next().await.is_some() {}

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].bytes_sent, 4);
        assert_eq!(seen[1].bytes_sent, 8);
        assert!((seen[1].percentage - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn chunks_pass_through_unchanged() {
        let callback: TransferCallback = Arc::new(|_| {});
        let chunks = vec![Ok(Bytes::from_static(b"payload"))];
        let mut stream = CountingStream::new(futures::stream::iter(chunks), 7, callback);

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"payload");
        assert!(stream.next().await.is_none());
    }
}

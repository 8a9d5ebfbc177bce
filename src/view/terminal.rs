use std::io::{Stdout, Write, stdout};
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use url::Url;
use crate::api::{ProgressReport, Result, TransferProgress, VideoId};

/// 进度展示 - 最新报告到可见输出的无状态投影
pub trait ProgressView: Send {
    /// 本地传输进度
    fn render_transfer(&mut self, progress: &TransferProgress) -> Result<()>;

    /// 服务端进度报告（进度条 + 百分比 + 状态文本）
    fn render_report(&mut self, report: &ProgressReport) -> Result<()>;

    /// 成功面板
    fn show_success(&mut self, video_id: &VideoId, thumbnail: Option<&Url>) -> Result<()>;

    /// 错误面板
    fn show_error(&mut self, title: &str, message: &str) -> Result<()>;
}

pub struct TerminalView {
    out: Stdout,
    bar_width: usize,
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            out: stdout(),
            bar_width: 30,
        }
    }

    fn render_line(&mut self, line: &str) -> Result<()> {
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line),
        )?;
        self.out.flush()?;
        Ok(())
    }
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressView for TerminalView {
    fn render_transfer(&mut self, progress: &TransferProgress) -> Result<()> {
        let line = format!(
            "Sending {}/{} bytes ({:.0}%)",
            progress.bytes_sent, progress.total_bytes, progress.percentage
        );
        self.render_line(&line)
    }

    fn render_report(&mut self, report: &ProgressReport) -> Result<()> {
        let percentage = report.progress_percentage.min(100) as usize;
        let filled = self.bar_width * percentage / 100;
        let bar = format!(
            "{}{}",
            "#".repeat(filled),
            "-".repeat(self.bar_width - filled)
        );
        let line = format!("[{bar}] {percentage:>3}% {}", report.message);
        self.render_line(&line)
    }

    fn show_success(&mut self, video_id: &VideoId, thumbnail: Option<&Url>) -> Result<()> {
        queue!(
            self.out,
            Print("\n"),
            SetForegroundColor(Color::Green),
            Print("Upload Completed\n"),
            ResetColor,
            Print(format!("Video ID: {video_id}\n")),
        )?;

        if let Some(thumbnail) = thumbnail {
            queue!(self.out, Print(format!("Thumbnail: {thumbnail}\n")))?;
        }

        self.out.flush()?;
        Ok(())
    }

    fn show_error(&mut self, title: &str, message: &str) -> Result<()> {
        queue!(
            self.out,
            Print("\n"),
            SetForegroundColor(Color::Red),
            Print(format!("{title}: {message}\n")),
            ResetColor,
        )?;
        self.out.flush()?;
        Ok(())
    }
}

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use reel::config::Config;
use reel::{
    ApiClient, CommandPlayer, ProgressView, SessionController, SessionEvent, SessionPhase,
    TerminalView,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let file_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("Usage: reel <video-file>")?;

    let config = Config::load();
    let client = Arc::new(ApiClient::with_config(config.api_config())?);
    let player = Box::new(
        CommandPlayer::new(&config.player).with_args(config.player_args.clone()),
    );

    let handle = SessionController::new(client.clone(), player, config.session_config());
    let mut events = handle.controller.subscribe_events();
    handle.controller.start_upload(file_path).await?;

    let mut view = TerminalView::new();
    loop {
        match events.recv().await {
            Ok(SessionEvent::TransferProgress { progress, .. }) => {
                view.render_transfer(&progress)?;
            }
            Ok(SessionEvent::Report { report, .. }) => {
                view.render_report(&report)?;
            }
            Ok(SessionEvent::Completed { video_id: Some(video_id), .. }) => {
                let thumbnail = client.thumbnail_url(&video_id).ok();
                view.show_success(&video_id, thumbnail.as_ref())?;

                if let Ok(qualities) = client.video_qualities(&video_id).await {
                    for quality in qualities {
                        println!("  {:<10} {}", quality.quality, quality.status);
                    }
                }
            }
            Ok(SessionEvent::PlaybackStarted { manifest, .. }) => {
                println!("Streaming from {manifest}");
            }
            Ok(SessionEvent::Failed { message, .. }) => {
                view.show_error("Upload failed", &message)?;
            }
            Ok(SessionEvent::PhaseChanged { new_phase: SessionPhase::Disposed, .. }) => break,
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }

    handle.shutdown().await?;
    Ok(())
}

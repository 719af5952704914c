use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

use playhead::config::Config;
use playhead::models::{
    ContentId, ContentRef, DownloadRecord, DownloadState, PlaylistEntry, StreamInfo, StreamKind,
    VideoId,
};
use playhead::playback::PlaybackCoordinator;
use playhead::player::simulated::SimulatedPlayer;
use playhead::services::ProgressService;
use playhead::services::memory::{
    MemoryPlaylistRepository, MemoryProgressService, MemoryStreamService,
};

/// Media length of each demo episode.
const EPISODE_LENGTH: Duration = Duration::from_secs(30);

/// One real tick advances one second of media time, so the whole three-part
/// playlist plays out in a couple of real seconds.
const CLOCK_TICK: Duration = Duration::from_millis(20);

fn episode(id: &str, video_id: Option<&str>, downloaded: bool) -> PlaylistEntry {
    PlaylistEntry {
        content: ContentRef {
            id: ContentId::new(id),
            video_id: video_id.map(VideoId::new),
            title: format!("Episode {id}"),
            duration: EPISODE_LENGTH,
        },
        progress: None,
        download: downloaded.then(|| DownloadRecord {
            state: DownloadState::Complete,
            local_path: Some(format!("/downloads/{id}.mp4").into()),
            fraction: 1.0,
        }),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "playhead=debug".to_string()),
        )
        .init();

    info!("Starting playhead demo session");
    let config = Config::load()?;

    // A three-part playlist: the first episode is already downloaded, the
    // other two resolve to network streams.
    let repository = Arc::new(MemoryPlaylistRepository::new());
    repository
        .insert(
            ContentId::new("ep1"),
            vec![
                episode("ep1", None, true),
                episode("ep2", Some("video-ep2"), false),
                episode("ep3", Some("video-ep3"), false),
            ],
        )
        .await;

    let streams = Arc::new(MemoryStreamService::new());
    for id in ["ep2", "ep3"] {
        streams
            .insert(
                VideoId::new(format!("video-{id}")),
                StreamInfo {
                    kind: StreamKind::Stream,
                    url: Url::parse(&format!("https://cdn.example.com/{id}/master.m3u8"))?,
                },
            )
            .await;
    }

    let progress = Arc::new(MemoryProgressService::new());
    for id in ["ep1", "ep2", "ep3"] {
        progress
            .register_duration(ContentId::new(id), EPISODE_LENGTH)
            .await;
    }

    let player = SimulatedPlayer::spawn(EPISODE_LENGTH, CLOCK_TICK);

    let (handle, coordinator) = PlaybackCoordinator::with_tuning(
        ContentId::new("ep1"),
        repository,
        streams,
        Arc::clone(&progress) as Arc<dyn ProgressService>,
        player.clone(),
        config.playback.report_interval(),
        config.playback.lookahead_threshold(),
    );
    tokio::spawn(coordinator.run());

    handle.reload();
    let mut status = handle.watch_status();
    status
        .wait_for(|s| {
            use playhead::playback::ControllerState::*;
            matches!(s.state, HasData | Failed)
        })
        .await?;
    info!(status = ?handle.status(), "initial load settled");

    // Let the playlist play out.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let last = progress.record(&ContentId::new("ep3")).await;
        if last.map(|r| r.finished).unwrap_or(false) {
            break;
        }
        if tokio::time::Instant::now() > deadline {
            info!("giving up waiting for the playlist to finish");
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    for id in ["ep1", "ep2", "ep3"] {
        if let Some(record) = progress.record(&ContentId::new(id)).await {
            info!(
                content_id = id,
                elapsed = ?record.elapsed,
                proportion = record.proportion,
                finished = record.finished,
                "final tracked progress"
            );
        }
    }
    let started = progress.started_items().await;
    info!(?started, "playback start notifications");
    info!(status = ?handle.status(), "final coordinator status");

    handle.shutdown();
    Ok(())
}

//! FFmpeg binary downloader - streams each asset to disk with cumulative progress

use crate::error::{ExtenderError, Result};
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const RELEASE_BASE_URL: &str = "https://github.com/afkarxyz/FFmpeg-Xfade-GUI/releases/download/XfadeGUI";

/// Folder (under the app data dir) that receives `bin/<asset>`.
pub const TOOLS_DIR_NAME: &str = "FFmpeg";

/// A file to fetch and the name it is saved under.
#[derive(Debug, Clone)]
pub struct RemoteAsset {
    pub file_name: String,
    pub url: String,
}

impl RemoteAsset {
    pub fn new(file_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            url: url.into(),
        }
    }
}

/// The fixed ffmpeg/ffprobe pair, in download order.
pub fn ffmpeg_assets() -> Vec<RemoteAsset> {
    ["ffmpeg.exe", "ffprobe.exe"]
        .into_iter()
        .map(|name| RemoteAsset::new(name, format!("{}/{}", RELEASE_BASE_URL, name)))
        .collect()
}

/// Overall percentage after `downloaded` of `total_bytes` of asset `index`.
pub fn overall_percent(index: usize, total_assets: usize, downloaded: u64, total_bytes: u64) -> u32 {
    if total_assets == 0 || total_bytes == 0 {
        return 0;
    }
    let share = 100.0 / total_assets as f64;
    let base = index as f64 / total_assets as f64 * 100.0;
    let file = downloaded.min(total_bytes) as f64 / total_bytes as f64 * share;
    ((base + file).floor() as u32).min(100)
}

/// Download every asset into `<tools_root>/bin`, in order. Stops at the first
/// failure. `on_progress` only sees increasing values. Returns the bin dir.
pub async fn download_assets(
    client: &Client,
    tools_root: &Path,
    assets: &[RemoteAsset],
    on_progress: impl Fn(u32),
) -> Result<PathBuf> {
    let bin_dir = tools_root.join("bin");
    tokio::fs::create_dir_all(&bin_dir).await?;

    let mut last_percent = None;
    let mut report = |percent: u32| {
        if last_percent.map_or(true, |last| percent > last) {
            last_percent = Some(percent);
            on_progress(percent);
        }
    };

    for (index, asset) in assets.iter().enumerate() {
        let destination = bin_dir.join(&asset.file_name);
        log::info!("Downloading {} -> {}", asset.url, destination.display());

        let result = download_one(client, asset, &destination, |downloaded, total_bytes| {
            report(overall_percent(index, assets.len(), downloaded, total_bytes));
        })
        .await;

        if let Err(e) = result {
            log::error!("Download of {} failed: {}", asset.file_name, e);
            let _ = tokio::fs::remove_file(&destination).await;
            return Err(e);
        }
    }

    Ok(bin_dir)
}

async fn download_one(
    client: &Client,
    asset: &RemoteAsset,
    destination: &Path,
    mut on_chunk: impl FnMut(u64, u64),
) -> Result<()> {
    let response = client.get(&asset.url).send().await?.error_for_status()?;

    // Without a length there is nothing to report against; write in one go
    let total_bytes = match response.content_length() {
        Some(len) if len > 0 => len,
        _ => {
            let body = response.bytes().await?;
            tokio::fs::write(destination, &body).await?;
            return Ok(());
        }
    };

    let mut file = File::create(destination).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;
        on_chunk(downloaded, total_bytes);
    }
    file.flush().await?;

    if downloaded != total_bytes {
        return Err(ExtenderError::IncompleteDownload {
            file: asset.file_name.clone(),
            received: downloaded,
            expected: total_bytes,
        });
    }
    Ok(())
}

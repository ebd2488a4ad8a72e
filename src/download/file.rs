use std::path::Path;

use indicatif::ProgressBar;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::error::DownloadError;
use super::paths::part_path;
use crate::telegram::MediaDownload;

/// Stream a media transfer into `download_path` via a `.part` file.
///
/// The bar advances by each chunk's length. On completion the `.part` file is
/// renamed to the final path; on any failure (transfer error, disk error, empty
/// result or shutdown) it is removed so no partial file is left behind.
/// Returns the number of bytes written.
pub async fn fetch_to_file<D>(
    download: &mut D,
    download_path: &Path,
    progress: &ProgressBar,
    shutdown: &CancellationToken,
) -> Result<u64, DownloadError>
where
    D: MediaDownload + ?Sized,
{
    let part = part_path(download_path);
    match attempt_download(download, download_path, &part, progress, shutdown).await {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let _ = fs::remove_file(&part).await;
            Err(e)
        }
    }
}

async fn attempt_download<D>(
    download: &mut D,
    download_path: &Path,
    part: &Path,
    progress: &ProgressBar,
    shutdown: &CancellationToken,
) -> Result<u64, DownloadError>
where
    D: MediaDownload + ?Sized,
{
    let path_str = download_path.display().to_string();

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(part)
        .await?;

    let mut bytes_written: u64 = 0;
    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                return Err(DownloadError::Interrupted(path_str));
            }
            next = download.next_chunk() => next,
        };
        let chunk = match next {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(source) => {
                tracing::debug!(bytes_so_far = bytes_written, "transfer error for {}", path_str);
                return Err(DownloadError::Transfer {
                    source,
                    path: path_str,
                });
            }
        };
        file.write_all(&chunk).await?;
        bytes_written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }
    file.flush().await?;
    drop(file);

    if bytes_written == 0 {
        return Err(DownloadError::EmptyFile(path_str));
    }

    fs::rename(part, download_path).await?;
    Ok(bytes_written)
}

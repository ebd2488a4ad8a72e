//! Download engine: a single sequential pass over a channel's history.
//!
//! Each message is classified, named, checked against the ignore list and
//! the local directory, and fetched only when the file is absent. The file's
//! existence is the only state consulted, so re-running against an unchanged
//! channel downloads nothing.

pub mod audio;
pub mod error;
pub mod file;
pub mod ignore;
pub mod paths;

use std::fs::FileTimes;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio_util::sync::CancellationToken;

use self::ignore::IgnoreList;
use crate::telegram::{ChannelHistory, ChannelMessage};

/// Subset of application config consumed by the download engine.
/// Decoupled from CLI parsing so the engine can be tested independently.
#[derive(Debug)]
pub struct DownloadConfig {
    pub(crate) ignore_list: PathBuf,
    pub(crate) skip_created_before: Option<DateTime<Utc>>,
    pub(crate) skip_created_after: Option<DateTime<Utc>>,
    pub(crate) dry_run: bool,
    pub(crate) no_progress_bar: bool,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub downloaded: usize,
    pub skipped: usize,
    pub ignored: usize,
    pub filtered: usize,
    pub errors: usize,
    pub interrupted: bool,
}

impl DownloadSummary {
    /// Files present in the channel directory that this run accounted for.
    pub fn total_in_directory(&self) -> usize {
        self.downloaded + self.skipped
    }

    pub fn log(&self, directory: &Path, dry_run: bool, elapsed: Duration) {
        for line in self.report_lines(directory, dry_run, elapsed) {
            tracing::info!("{}", line);
        }
    }

    fn report_lines(&self, directory: &Path, dry_run: bool, elapsed: Duration) -> Vec<String> {
        let mut lines = Vec::with_capacity(10);
        if dry_run {
            lines.push("── Dry Run Summary ──".to_string());
            lines.push(format!("  would download:             {}", self.downloaded));
        } else {
            lines.push("── Download Summary ──".to_string());
            lines.push(format!("  downloaded:                 {}", self.downloaded));
        }
        lines.push(format!("  skipped (already exists):   {}", self.skipped));
        lines.push(format!("  ignored (in ignore list):   {}", self.ignored));
        lines.push(format!("  filtered (outside dates):   {}", self.filtered));
        lines.push(format!("  errors:                     {}", self.errors));
        if !dry_run {
            lines.push(format!(
                "  total files in directory:   {}",
                self.total_in_directory()
            ));
        }
        lines.push(format!("  destination: {}", directory.display()));
        lines.push(format!("  elapsed: {}", format_duration(elapsed)));
        if self.interrupted {
            lines.push("  (interrupted before the end of the history)".to_string());
        }
        lines
    }
}

/// What the scan decided to do with one message.
#[derive(Debug, PartialEq, Eq)]
enum Plan {
    /// No attachment, or an attachment that is not audio.
    NotAudio,
    /// Posted outside the configured date window.
    Filtered,
    Ignored { filename: String, entry: String },
    Exists { filename: String },
    Fetch(DownloadTask),
}

/// A file that needs fetching.
#[derive(Debug, PartialEq, Eq)]
struct DownloadTask {
    message_id: i32,
    filename: String,
    download_path: PathBuf,
    date: DateTime<Utc>,
    size: Option<u64>,
}

/// Classify a message and decide whether it needs downloading.
fn plan_message<M>(
    msg: &ChannelMessage<M>,
    channel_dir: &Path,
    ignore: &IgnoreList,
    config: &DownloadConfig,
) -> Plan {
    let Some(attachment) = &msg.attachment else {
        return Plan::NotAudio;
    };
    if msg.media.is_none() {
        return Plan::NotAudio;
    }
    let Some(raw_name) = audio::audio_filename(msg.id, attachment) else {
        return Plan::NotAudio;
    };

    if let Some(before) = &config.skip_created_before {
        if msg.date < *before {
            return Plan::Filtered;
        }
    }
    if let Some(after) = &config.skip_created_after {
        if msg.date > *after {
            return Plan::Filtered;
        }
    }

    let filename = paths::item_filename(&raw_name, msg.id);

    if let Some(entry) = ignore.matched(&filename) {
        return Plan::Ignored {
            entry: entry.to_string(),
            filename,
        };
    }

    let download_path = channel_dir.join(&filename);
    if download_path.exists() {
        return Plan::Exists { filename };
    }

    Plan::Fetch(DownloadTask {
        message_id: msg.id,
        filename,
        download_path,
        date: msg.date,
        size: attachment.size,
    })
}

/// Progress display: an overall bar counting messages plus a transient byte
/// bar per file.
///
/// Hidden when the user passed `--no-progress-bar` or stdout is not a TTY
/// (e.g. piped output, cron jobs).
struct ScanProgress {
    multi: MultiProgress,
    messages: ProgressBar,
    enabled: bool,
}

impl ScanProgress {
    fn new(no_progress_bar: bool, total: Option<u64>) -> Self {
        let enabled = !no_progress_bar && std::io::stdout().is_terminal();
        let multi = if enabled {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        let messages = match total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::with_template(
                    "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} messages {msg}",
                ) {
                    pb.set_style(style.progress_chars("=> "));
                }
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                if let Ok(style) =
                    ProgressStyle::with_template("[{elapsed_precise}] {spinner} {pos} messages {msg}")
                {
                    pb.set_style(style);
                }
                pb
            }
        };
        let messages = multi.add(messages);
        Self {
            multi,
            messages,
            enabled,
        }
    }

    fn transfer_bar(&self, size: Option<u64>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let pb = match size {
            Some(size) => ProgressBar::new(size),
            None => ProgressBar::new_spinner(),
        };
        if let Ok(style) = ProgressStyle::with_template(
            "  [{bar:40.green/white}] {bytes}/{total_bytes} ({bytes_per_sec}) {wide_msg}",
        ) {
            pb.set_style(style.progress_chars("=> "));
        }
        self.multi.add(pb)
    }

    /// Run `f` with the bars cleared so log lines are not garbled.
    fn suspend<F: FnOnce()>(&self, f: F) {
        self.multi.suspend(f);
    }

    fn finish(&self) {
        self.messages.finish_and_clear();
    }
}

/// Scan `history` and download every audio attachment missing from
/// `channel_dir`.
///
/// Per-item failures are counted and the scan continues. A failure to read
/// the history itself ends the scan with an error after the partial summary
/// has been logged.
pub async fn download_channel<H>(
    history: &mut H,
    channel_dir: &Path,
    config: &DownloadConfig,
    shutdown_token: CancellationToken,
) -> Result<DownloadSummary>
where
    H: ChannelHistory,
{
    let started = Instant::now();

    if !config.dry_run {
        tokio::fs::create_dir_all(channel_dir)
            .await
            .with_context(|| format!("Failed to create {}", channel_dir.display()))?;
    }
    tracing::info!("Download directory: {}", channel_dir.display());

    let ignore = IgnoreList::load_or_create(&config.ignore_list, !config.dry_run).await;

    let progress = ScanProgress::new(config.no_progress_bar, history.total().await);
    let mut summary = DownloadSummary::default();

    loop {
        let next = tokio::select! {
            biased;
            () = shutdown_token.cancelled() => {
                progress.suspend(|| tracing::info!("Download interrupted by user"));
                summary.interrupted = true;
                break;
            }
            next = history.next_message() => next,
        };
        let msg = match next {
            Ok(Some(msg)) => msg,
            Ok(None) => break,
            Err(e) => {
                progress.finish();
                tracing::error!("Failed to read channel history: {}", e);
                summary.log(channel_dir, config.dry_run, started.elapsed());
                return Err(e).context("Message enumeration stopped");
            }
        };
        progress.messages.inc(1);

        match plan_message(&msg, channel_dir, &ignore, config) {
            Plan::NotAudio => {}
            Plan::Filtered => {
                tracing::debug!(message_id = msg.id, "Outside date window");
                summary.filtered += 1;
            }
            Plan::Ignored { filename, entry } => {
                progress.suspend(|| tracing::info!("Skipping (in ignore list): {}", entry));
                tracing::debug!(message_id = msg.id, %filename, "ignored");
                summary.ignored += 1;
            }
            Plan::Exists { filename } => {
                progress.suspend(|| tracing::info!("Skipping (already exists): {}", filename));
                summary.skipped += 1;
            }
            Plan::Fetch(task) => {
                if config.dry_run {
                    progress.suspend(|| {
                        tracing::info!("[DRY RUN] Would download {}", task.download_path.display())
                    });
                    summary.downloaded += 1;
                    continue;
                }
                let Some(media) = msg.media.as_ref() else {
                    continue;
                };

                progress.messages.set_message(task.filename.clone());
                progress.suspend(|| tracing::info!("Downloading: {}", task.filename));
                tracing::debug!(
                    message_id = task.message_id,
                    size_bytes = ?task.size,
                    path = %task.download_path.display(),
                    "downloading",
                );

                let bar = progress.transfer_bar(task.size);
                let mut transfer = history.download(media);
                let result =
                    file::fetch_to_file(&mut transfer, &task.download_path, &bar, &shutdown_token)
                        .await;
                bar.finish_and_clear();

                match result {
                    Ok(bytes) => {
                        stamp_mtime(&task).await;
                        progress.suspend(|| {
                            tracing::info!("Downloaded: {} ({} bytes)", task.filename, bytes)
                        });
                        summary.downloaded += 1;
                    }
                    Err(e) if e.is_interrupted() => {
                        progress.suspend(|| {
                            tracing::info!("Download interrupted by user: {}", task.filename)
                        });
                        summary.interrupted = true;
                        break;
                    }
                    Err(e) => {
                        progress.suspend(|| tracing::error!("Error downloading {}: {}", task.filename, e));
                        summary.errors += 1;
                    }
                }
            }
        }
    }

    progress.finish();
    summary.log(channel_dir, config.dry_run, started.elapsed());
    Ok(summary)
}

/// Give the file the message's timestamp; failure only warrants a warning.
async fn stamp_mtime(task: &DownloadTask) {
    let path = task.download_path.clone();
    let ts = task.date.timestamp();
    match tokio::task::spawn_blocking(move || set_file_mtime(&path, ts)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(
            "Could not set mtime on {}: {}",
            task.download_path.display(),
            e
        ),
        Err(e) => tracing::warn!("mtime task panicked: {}", e),
    }
}

fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {:02}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Set the modification and access times of a file to the given Unix
/// timestamp. Dates before 1970 are clamped to the epoch.
fn set_file_mtime(path: &Path, timestamp: i64) -> std::io::Result<()> {
    let time = if timestamp >= 0 {
        UNIX_EPOCH + Duration::from_secs(timestamp as u64)
    } else {
        UNIX_EPOCH
            .checked_sub(Duration::from_secs(timestamp.unsigned_abs()))
            .unwrap_or(SystemTime::UNIX_EPOCH)
    };
    let times = FileTimes::new().set_modified(time).set_accessed(time);
    let file = std::fs::File::options().write(true).open(path)?;
    file.set_times(times)?;
    Ok(())
}

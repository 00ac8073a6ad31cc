//! ffmpeg post-processing
//!
//! Transcodes placed videos into seekable mp4 and optionally extracts an
//! mp3 audio track. One ffmpeg child runs at a time; `shutdown` kills it so
//! a cancelled run does not leave an orphan encoder churning.

use ebms_common::media;
use ebms_common::{Error, MediaKind, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

/// mp4 files larger than this are re-encoded anyway; eBird uploads cap out
/// around this size.
const MAX_MP4_BYTES: u64 = 1000 * 1024 * 1024;

/// Suffix marking an already-transcoded output.
const TRANSCODE_SUFFIX: &str = "_s";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct Transcoder {
    active: Mutex<Option<Child>>,
}

impl Transcoder {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// Whether a placed file needs transcoding: any non-mp4 video, or an
    /// mp4 over the size cap. Outputs of a previous run (`_s` stem suffix)
    /// are never re-transcoded.
    pub fn should_transcode(&self, path: &Path) -> bool {
        if MediaKind::from_path(path) != Some(MediaKind::Video) {
            return false;
        }
        let Some(stem) = media::file_stem(path) else {
            return false;
        };
        if stem.ends_with(TRANSCODE_SUFFIX) {
            return false;
        }
        if media::file_extension(path).as_deref() != Some("mp4") {
            return true;
        }
        match std::fs::metadata(path) {
            Ok(m) => m.len() > MAX_MP4_BYTES,
            Err(_) => false,
        }
    }

    /// Transcode `input` to `<stem>_s.mp4` alongside it. The original is
    /// kept. Skips (returning the existing path) when the output already
    /// exists.
    pub fn transcode(&self, input: &Path) -> Result<PathBuf> {
        let output = sibling(input, TRANSCODE_SUFFIX, "mp4")?;
        if output.exists() {
            tracing::debug!(output = %output.display(), "Transcode output exists, skipping");
            return Ok(output);
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-threads")
            .arg("1")
            .arg("-i")
            .arg(input)
            .arg("-map_metadata")
            .arg("0")
            .arg("-c:v")
            .arg("libx264")
            .arg("-threads")
            .arg("2")
            .arg("-crf")
            .arg("22")
            .arg("-preset")
            .arg("medium")
            .arg("-c:a")
            .arg("copy")
            .arg(&output);

        self.run(cmd, input, &output)?;
        Ok(output)
    }

    /// Extract the audio track of `input` to `<stem>.mp3` alongside it.
    pub fn extract_audio(&self, input: &Path) -> Result<PathBuf> {
        let output = sibling(input, "", "mp3")?;
        if output.exists() {
            tracing::debug!(output = %output.display(), "Audio output exists, skipping");
            return Ok(output);
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-i")
            .arg(input)
            .arg("-vn")
            .arg("-c:a")
            .arg("mp3")
            .arg("-b:a")
            .arg("192k")
            .arg("-map_metadata")
            .arg("0")
            .arg(&output);

        self.run(cmd, input, &output)?;
        Ok(output)
    }

    /// Kill the active ffmpeg child, if any.
    pub fn shutdown(&self) {
        if let Ok(mut guard) = self.active.lock() {
            if let Some(child) = guard.as_mut() {
                tracing::info!("Killing active ffmpeg process");
                let _ = child.kill();
                let _ = child.wait();
            }
            *guard = None;
        }
    }

    fn run(&self, mut cmd: Command, input: &Path, output: &Path) -> Result<()> {
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            "Running ffmpeg"
        );

        let child = cmd.spawn().map_err(|e| {
            Error::Ffmpeg(format!("failed to start ffmpeg for {}: {e}", input.display()))
        })?;

        {
            let mut guard = self
                .active
                .lock()
                .map_err(|_| Error::Ffmpeg("transcoder lock poisoned".to_string()))?;
            *guard = Some(child);
        }

        // Poll instead of blocking in wait() so shutdown() can take the
        // lock and kill the child.
        loop {
            let status = {
                let mut guard = self
                    .active
                    .lock()
                    .map_err(|_| Error::Ffmpeg("transcoder lock poisoned".to_string()))?;
                match guard.as_mut() {
                    Some(child) => child.try_wait().map_err(Error::Io)?,
                    // shutdown() cleared the slot
                    None => {
                        return Err(Error::Ffmpeg(format!(
                            "ffmpeg cancelled for {}",
                            input.display()
                        )));
                    }
                }
            };

            match status {
                Some(status) => {
                    if let Ok(mut guard) = self.active.lock() {
                        *guard = None;
                    }
                    if status.success() {
                        return Ok(());
                    }
                    // Don't leave a truncated output behind
                    let _ = std::fs::remove_file(output);
                    return Err(Error::Ffmpeg(format!(
                        "ffmpeg exited with {status} for {}",
                        input.display()
                    )));
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        }
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Transcoder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// `<stem><suffix>.<ext>` next to `input`.
fn sibling(input: &Path, suffix: &str, ext: &str) -> Result<PathBuf> {
    let stem = media::file_stem(input).ok_or_else(|| {
        Error::InvalidInput(format!("no file stem: {}", input.display()))
    })?;
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    Ok(parent.join(format!("{stem}{suffix}.{ext}")))
}

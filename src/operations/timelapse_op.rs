use crate::config_loader::MasterConfig;
use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use log::{debug, info, warn};
use opencv::{core as opencv_core, imgcodecs, prelude::*, videoio};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub async fn handle_timelapse_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let op_start_time = Instant::now();

    let image_dir = PathBuf::from(
        args.get_one::<String>("images")
            .context("Missing required 'images' argument")?,
    );
    let output_file = args
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| format!("timelapse.{}", master_config.app_settings.video_format));
    let fps = args
        .get_one::<f64>("fps")
        .copied()
        .unwrap_or(master_config.app_settings.video_fps);
    let extension = args
        .get_one::<String>("extension")
        .cloned()
        .unwrap_or_else(|| ".jpg".to_string());

    if fps <= 0.0 {
        bail!("Frame rate must be positive, got {}", fps);
    }

    info!(
        "🎞️ Building timelapse from '{}' (*{}) at {} fps -> {}",
        image_dir.display(),
        extension,
        fps,
        output_file
    );

    let frames = collect_image_files(&image_dir, &extension)
        .with_context(|| format!("Failed to scan image directory '{}'", image_dir.display()))?;
    if frames.is_empty() {
        bail!(
            "No images with extension '{}' found in '{}'",
            extension,
            image_dir.display()
        );
    }
    info!("Found {} image(s). Encoding...", frames.len());

    let codec = master_config.app_settings.video_codec.clone();
    let output_path = PathBuf::from(&output_file);
    let written = tokio::task::spawn_blocking(move || encode_timelapse(&frames, &output_path, fps, &codec))
        .await
        .context("Timelapse encoding task panicked")??;

    info!(
        "✅ Timelapse saved to {} ({} frames written) in {:?}",
        output_file,
        written,
        op_start_time.elapsed()
    );
    Ok(())
}

/// Regular files in `dir` with the given extension (case-insensitive), in
/// natural order so `img_2` sorts before `img_10`.
fn collect_image_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("'{}' is not a directory", dir.display());
    }
    let wanted = extension.to_ascii_lowercase();
    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory '{}'", dir.display()))?
    {
        let entry = entry.with_context(|| format!("Failed to read an entry of '{}'", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.to_ascii_lowercase().ends_with(&wanted) {
            names.push(name.to_string());
        }
    }
    names.sort_by(|a, b| natord::compare(a, b));
    Ok(names.into_iter().map(|n| dir.join(n)).collect())
}

/// Blocking OpenCV work: decode each frame and append it to the output
/// container. Video dimensions are fixed by the first frame; unreadable
/// frames are skipped with a warning, matching the poller's attitude that
/// one bad image should not sink the batch.
fn encode_timelapse(frames: &[PathBuf], output_path: &Path, fps: f64, codec: &str) -> Result<usize> {
    let first = frames.first().context("No frames to encode")?;
    let first_frame = imgcodecs::imread(
        first.to_str().context("Input image path is not valid UTF-8")?,
        imgcodecs::IMREAD_COLOR,
    )
    .with_context(|| format!("OpenCV: failed to read first image '{}'", first.display()))?;
    if first_frame.empty() {
        bail!("Could not decode the first image '{}'", first.display());
    }
    let size = first_frame.size().context("OpenCV: failed to query first frame dimensions")?;
    info!("Video dimensions (WxH): {}x{}", size.width, size.height);

    let fourcc = fourcc_for_codec(codec)?;
    let mut writer = videoio::VideoWriter::new(
        output_path.to_str().context("Output path is not valid UTF-8")?,
        fourcc,
        fps,
        opencv_core::Size::new(size.width, size.height),
        true,
    )
    .context("OpenCV: failed to construct VideoWriter")?;
    if !videoio::VideoWriter::is_opened(&writer)? {
        bail!(
            "Failed to open VideoWriter for '{}'. Check codec compatibility and the output path.",
            output_path.display()
        );
    }

    let mut written = 0usize;
    for (idx, frame_path) in frames.iter().enumerate() {
        let frame_path_str = match frame_path.to_str() {
            Some(s) => s,
            None => {
                warn!("👻 Skipping image with non-UTF-8 path: {}", frame_path.display());
                continue;
            }
        };
        let frame = match imgcodecs::imread(frame_path_str, imgcodecs::IMREAD_COLOR) {
            Ok(f) if !f.empty() => f,
            Ok(_) => {
                warn!("👻 Skipping unreadable image: {}", frame_path.display());
                continue;
            }
            Err(e) => {
                warn!("👻 Skipping image '{}' (decode error: {})", frame_path.display(), e);
                continue;
            }
        };
        writer
            .write(&frame)
            .with_context(|| format!("OpenCV: write failed for frame '{}'", frame_path.display()))?;
        written += 1;
        if (idx + 1) % 100 == 0 {
            debug!("  Wrote {} / {} frames", idx + 1, frames.len());
        }
    }

    // Dropping the writer releases the output file.
    Ok(written)
}

fn fourcc_for_codec(codec: &str) -> Result<i32> {
    let fourcc_str = match codec.to_lowercase().as_str() {
        "mjpg" | "mjpeg" => "MJPG",
        "xvid" => "XVID",
        "mp4v" => "mp4v",
        "h264" | "avc1" => "avc1",
        other => {
            warn!("⚠️ Unsupported video_codec '{}', defaulting to mp4v.", other);
            "mp4v"
        }
    };
    let fourcc = videoio::VideoWriter::fourcc(
        fourcc_str.chars().next().unwrap_or('m'),
        fourcc_str.chars().nth(1).unwrap_or('p'),
        fourcc_str.chars().nth(2).unwrap_or('4'),
        fourcc_str.chars().nth(3).unwrap_or('v'),
    )?;
    Ok(fourcc)
}

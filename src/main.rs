use anyhow::{bail, Context, Result};
use clap::Parser;
use livecap::{CameraSession, CropRect, DeviceConfig, DeviceSelector, GenericBackend};
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input webcam device index
    #[arg(short, long, default_value_t = 0)]
    device: u32,

    /// Capture resolution as WIDTHxHEIGHT
    #[arg(long)]
    resolution: Option<String>,

    /// Target frames per second
    #[arg(long)]
    fps: Option<f64>,

    /// Auto-exposure mode value (driver-specific)
    #[arg(long)]
    auto_exposure: Option<f64>,

    /// Exposure time in microseconds
    #[arg(long)]
    exposure: Option<f64>,

    /// Gain value
    #[arg(long)]
    gain: Option<f64>,

    /// Clockwise rotation in degrees
    #[arg(long)]
    rotate: Option<f64>,

    /// Crop rectangle as LEFT,RIGHT,TOP,BOTTOM
    #[arg(long)]
    crop: Option<String>,

    /// Number of frames to capture (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Save the last captured frame to this path
    #[arg(long)]
    snapshot: Option<String>,

    /// Scale factor applied to the snapshot
    #[arg(long, default_value_t = 1.0)]
    display_scale: f64,

    /// List available devices and options, then exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    if args.list {
        for (option, values) in GenericBackend::discover() {
            println!("{option}: {values:?}");
        }
        return Ok(());
    }

    let config = build_config(&args)?;

    tracing::info!("livecap starting on device {}", args.device);
    if let Some((width, height)) = config.effective_size() {
        tracing::info!("Effective frame size: {}x{}", width, height);
    }
    if let Some(fps) = config.target_fps {
        tracing::info!("Target FPS: {}", fps);
    }

    let session =
        CameraSession::open_generic(config).context("Failed to open capture session")?;

    run_preview(session, &args)
}

fn build_config(args: &Args) -> Result<DeviceConfig> {
    let resolution = args
        .resolution
        .as_deref()
        .map(parse_resolution)
        .transpose()?;
    let crop = args.crop.as_deref().map(parse_crop).transpose()?;

    Ok(DeviceConfig {
        device: DeviceSelector::Index(args.device),
        resolution,
        auto_exposure: args.auto_exposure,
        exposure: args.exposure,
        gain: args.gain,
        rotation_degrees: args.rotate,
        crop,
        target_fps: args.fps,
        display_enabled: args.snapshot.is_some(),
        display_scale: args.display_scale,
    })
}

fn parse_resolution(value: &str) -> Result<(u32, u32)> {
    let Some((width, height)) = value.split_once('x') else {
        bail!("resolution must look like 1280x720");
    };
    Ok((width.parse()?, height.parse()?))
}

fn parse_crop(value: &str) -> Result<CropRect> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<_, _>>()
        .context("crop must look like LEFT,RIGHT,TOP,BOTTOM")?;
    if parts.len() != 4 {
        bail!("crop must have exactly four components");
    }
    if parts[0] >= parts[1] || parts[2] >= parts[3] {
        bail!("crop rectangle is empty");
    }
    Ok(CropRect::new(parts[0], parts[1], parts[2], parts[3]))
}

fn run_preview(mut session: CameraSession, args: &Args) -> Result<()> {
    let mut frame_count = 0u64;
    let mut last_frame = None;
    let loop_start = Instant::now();

    tracing::info!("Starting capture loop");
    if args.frames == 0 {
        tracing::info!("Press Ctrl+C to stop");
    }

    while args.frames == 0 || frame_count < args.frames {
        let (frame, timestamp) = session
            .next_frame()
            .context("Failed to capture frame")?;
        frame_count += 1;

        if frame_count % 30 == 0 {
            let elapsed = loop_start.elapsed().as_secs_f64();
            tracing::info!(
                "Frame {}: {}x{}x{}, t={:.3}s, fps={:.1}",
                frame_count,
                frame.height(),
                frame.width(),
                frame.channels(),
                timestamp,
                frame_count as f64 / elapsed
            );
        }

        last_frame = Some(frame);
    }

    if let (Some(path), Some(frame)) = (&args.snapshot, &last_frame) {
        let config = session.config();
        if config.display_enabled {
            let mut image = frame.to_image();
            if config.display_scale != 1.0 {
                let width = (image.width() as f64 * config.display_scale).round() as u32;
                let height = (image.height() as f64 * config.display_scale).round() as u32;
                image = image.resize(width, height, image::imageops::FilterType::Lanczos3);
            }
            image
                .save(path)
                .with_context(|| format!("Failed to save snapshot to {path}"))?;
            tracing::info!("Snapshot saved to {}", path);
        }
    }

    session.close();
    tracing::info!("Captured {} frames", frame_count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_resolution_strings() {
        assert_eq!(parse_resolution("1280x720").unwrap(), (1280, 720));
        assert!(parse_resolution("1280").is_err());
        assert!(parse_resolution("axb").is_err());
    }

    #[test]
    fn parses_crop_strings() {
        let crop = parse_crop("10, 110, 20, 100").unwrap();
        assert_eq!(crop, CropRect::new(10, 110, 20, 100));
        assert!(parse_crop("10,110,20").is_err());
        assert!(parse_crop("110,10,20,100").is_err());
    }
}

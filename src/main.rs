use clap::Parser;
use std::path::{Path, PathBuf};

use clickcrop::snapshot;
use clickcrop::{
    ClientConfig, Detection, ImageSource, PointerPos, RenderedRect, SessionHost, SessionState,
    SubmissionClient,
};

#[derive(Parser)]
#[command(name = "clickcrop")]
#[command(about = "Crop objects out of an image by pointing at them")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Click position "X,Y" on the rendered image; repeat to pick several
    /// points on the same image
    #[arg(long = "click", value_name = "X,Y", required = true)]
    clicks: Vec<String>,

    /// Rendered size "WxH" the click positions refer to (defaults to the
    /// image's native size)
    #[arg(long, value_name = "WxH")]
    viewport: Option<String>,

    /// Crop service endpoint (overrides CROP_SERVICE_URL)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Save returned crops into this directory
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Cli::parse();

    if args.verbose {
        println!("Loading image: {:?}", args.image_path);
    }

    let source = ImageSource::open(&args.image_path)?;
    let (width, height) = source.dimensions();

    if args.verbose {
        println!(
            "Image loaded: {}x{} ({} bytes)\n",
            width,
            height,
            source.byte_len()
        );
    }

    let viewport = match &args.viewport {
        Some(raw) => parse_viewport(raw)?,
        None => (width as f64, height as f64),
    };
    let rect = RenderedRect::at_origin(viewport.0, viewport.1);

    let mut config = ClientConfig::from_env();
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if args.verbose {
        println!("Submitting to {}\n", config.endpoint);
    }

    let mut host = SessionHost::new(SubmissionClient::new(config)?);
    host.load_image(source);

    let mut saved = 0usize;
    for (i, raw) in args.clicks.iter().enumerate() {
        let pointer = parse_click(raw)?;
        if !rect.contains(pointer) {
            eprintln!(
                "Skipping click {} at ({}, {}): outside the {}x{} viewport",
                i + 1,
                pointer.x,
                pointer.y,
                viewport.0,
                viewport.1
            );
            continue;
        }

        host.toggle_selection();
        let state = host.click(pointer, rect).await?;
        let seconds = host.response_seconds().unwrap_or(0.0);

        match state {
            SessionState::ResultsReady => {
                println!(
                    "Click {}: {} crops in {:.2} seconds",
                    i + 1,
                    host.detections().len(),
                    seconds
                );
                if let Some(dir) = &args.out_dir {
                    saved += save_crops(dir, host.detections(), saved)?;
                }
            }
            SessionState::ResultsEmpty => {
                println!("Click {}: no crops returned ({:.2} seconds)", i + 1, seconds);
                println!("Selection on this image is disabled; load a new image to continue.");
                break;
            }
            other => {
                println!("Click {} ignored (session {:?})", i + 1, other);
            }
        }
    }

    if let Some(dir) = &args.out_dir {
        println!("\nSaved {} crops to {}", saved, dir.display());
    }

    Ok(())
}

/// Parse "X,Y" into a pointer position.
fn parse_click(raw: &str) -> anyhow::Result<PointerPos> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Invalid click '{raw}', expected X,Y"))?;
    Ok(PointerPos {
        x: x.trim().parse()?,
        y: y.trim().parse()?,
    })
}

/// Parse "WxH" into rendered viewport dimensions.
fn parse_viewport(raw: &str) -> anyhow::Result<(f64, f64)> {
    let (w, h) = raw
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("Invalid viewport '{raw}', expected WxH"))?;
    let width: f64 = w.trim().parse()?;
    let height: f64 = h.trim().parse()?;
    if width <= 0.0 || height <= 0.0 {
        anyhow::bail!("Viewport dimensions must be positive");
    }
    Ok((width, height))
}

/// Save detections as numbered image files, returning how many were written.
fn save_crops(dir: &Path, detections: &[Detection], offset: usize) -> anyhow::Result<usize> {
    std::fs::create_dir_all(dir)?;
    for (i, detection) in detections.iter().enumerate() {
        let (mime, bytes) = snapshot::data_uri_bytes(&detection.image)?;
        let ext = match mime.as_str() {
            "image/png" => "png",
            _ => "jpg",
        };
        let path = dir.join(format!("crop_{:02}.{}", offset + i + 1, ext));
        std::fs::write(&path, &bytes)?;
        println!("  Saved {} ({} bytes)", path.display(), bytes.len());
    }
    Ok(detections.len())
}

//! Minimal end-to-end run against a live crop service.
//!
//! Builds a small test card in memory, selects a point on it, and prints
//! what the service sends back. Point CROP_SERVICE_URL at the service
//! first; the default is http://localhost:5000/api/crop.

use clickcrop::{
    ClientConfig, ImageSource, PointerPos, RenderedRect, SessionHost, SubmissionClient,
};
use image::{ImageBuffer, Rgb};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A two-tone test card; any decodable image works the same way.
    let card = ImageBuffer::from_fn(64, 64, |x, _| {
        if x < 32 {
            Rgb([220u8, 60u8, 60u8])
        } else {
            Rgb([60u8, 60u8, 220u8])
        }
    });
    let mut png = Vec::new();
    card.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;

    let mut source = ImageSource::from_bytes(png);
    source.decode()?;

    let client = SubmissionClient::new(ClientConfig::from_env())?;
    println!("Submitting to {}", client.endpoint());

    let mut host = SessionHost::new(client);
    host.load_image(source);
    host.toggle_selection();

    let state = host
        .click(
            PointerPos { x: 16.0, y: 32.0 },
            RenderedRect::at_origin(64.0, 64.0),
        )
        .await?;

    println!("Session resolved to {:?}", state);
    println!("Detections: {}", host.detections().len());
    for (i, detection) in host.detections().iter().enumerate() {
        println!("  {}: {} chars", i + 1, detection.image.len());
    }
    if let Some(seconds) = host.response_seconds() {
        println!("Round trip: {:.2} seconds", seconds);
    }

    Ok(())
}

use anyhow::Result;
use base64::{Engine as _, engine::general_purpose};
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;

/// JPEG quality used when re-encoding the snapshot for submission.
pub const SNAPSHOT_JPEG_QUALITY: u8 = 80;

/// Re-encode an image at native resolution into a self-contained
/// `data:image/jpeg;base64,` URI.
///
/// The snapshot depends only on the decoded pixel content, not on how the
/// upload was originally encoded, so any decodable input format produces
/// the same kind of payload. The RGB surface is allocated fresh on every
/// call and dropped once encoded.
pub fn encode_snapshot(image: &DynamicImage) -> Result<String> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, SNAPSHOT_JPEG_QUALITY)
        .encode(&rgb, width, height, image::ColorType::Rgb8.into())
        .map_err(|e| anyhow::anyhow!("Failed to encode snapshot: {e}"))?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(&jpeg)
    ))
}

/// Split a data URI into its mime type and decoded payload bytes.
pub fn data_uri_bytes(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| anyhow::anyhow!("Not a data URI"))?;
    let marker = rest
        .find(";base64,")
        .ok_or_else(|| anyhow::anyhow!("Missing base64 marker in data URI"))?;

    let mime = rest[..marker].to_string();
    let bytes = general_purpose::STANDARD
        .decode(&rest[marker + ";base64,".len()..])
        .map_err(|e| anyhow::anyhow!("Invalid base64 payload: {e}"))?;

    Ok((mime, bytes))
}

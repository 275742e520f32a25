use clickcrop::{ImageSource, SelectionSession};
use image::{ImageBuffer, Rgb};

/// Encoded PNG bytes of a solid red image with the given size.
pub fn test_image_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |_, _| Rgb([255u8, 0u8, 0u8]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

/// A decoded ImageSource with the given native size.
pub fn test_source(width: u32, height: u32) -> ImageSource {
    let mut source = ImageSource::from_bytes(test_image_bytes(width, height));
    source.decode().expect("Failed to decode test image");
    source
}

/// A session holding an 800x600 image, already armed for selection.
pub fn armed_session() -> SelectionSession {
    let mut session = SelectionSession::new();
    assert!(session.load_image(test_source(800, 600)));
    assert!(session.toggle_selection());
    session
}

//! Fixtures shared by unit tests.

/// A minimal flattened PSD: 8-bit RGB, no layers, raw (uncompressed) image
/// data filled with a single colour.
pub fn psd_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let mut b = Vec::new();

    // File header.
    b.extend_from_slice(b"8BPS");
    b.extend_from_slice(&1u16.to_be_bytes());
    b.extend_from_slice(&[0u8; 6]);
    b.extend_from_slice(&3u16.to_be_bytes());
    b.extend_from_slice(&height.to_be_bytes());
    b.extend_from_slice(&width.to_be_bytes());
    b.extend_from_slice(&8u16.to_be_bytes());
    b.extend_from_slice(&3u16.to_be_bytes());

    // Colour mode data and image resources: empty.
    b.extend_from_slice(&0u32.to_be_bytes());
    b.extend_from_slice(&0u32.to_be_bytes());

    // Layer and mask information: zero layers, no global mask.
    b.extend_from_slice(&10u32.to_be_bytes());
    b.extend_from_slice(&2u32.to_be_bytes());
    b.extend_from_slice(&0i16.to_be_bytes());
    b.extend_from_slice(&0u32.to_be_bytes());

    // Merged image data, planar R, G, B.
    b.extend_from_slice(&0u16.to_be_bytes());
    let plane = (width * height) as usize;
    for channel in rgb {
        b.extend(std::iter::repeat_n(channel, plane));
    }

    b
}

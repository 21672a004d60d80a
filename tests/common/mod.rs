use std::fs;
use std::path::Path;

pub fn jpeg_bytes(width: u16, height: u16, datetime: Option<&str>) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];

    if let Some(dt) = datetime {
        assert_eq!(dt.len(), 19, "EXIF datetime must be 'YYYY:MM:DD HH:MM:SS'");
        // APP1 Exif segment: TIFF header (little endian) + one IFD0 entry
        // holding the DateTime tag as a 20-byte ASCII value.
        bytes.extend_from_slice(&[0xFF, 0xE1, 0x00, 0x36]);
        bytes.extend_from_slice(b"Exif\0\0");
        bytes.extend_from_slice(b"II\x2A\x00");
        bytes.extend_from_slice(&8u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&0x0132u16.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&20u32.to_le_bytes());
        bytes.extend_from_slice(&26u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(dt.as_bytes());
        bytes.push(0);
    }

    // SOF0 frame header, single grayscale component.
    bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08]);
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&[0x01, 0x01, 0x11, 0x00]);

    bytes.extend_from_slice(&[0xFF, 0xD9]);
    bytes
}

pub fn write_jpeg(path: &Path, width: u16, height: u16) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, jpeg_bytes(width, height, None)).expect("write jpeg file");
}

pub fn write_jpeg_with_datetime(path: &Path, width: u16, height: u16, datetime: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, jpeg_bytes(width, height, Some(datetime))).expect("write jpeg file");
}

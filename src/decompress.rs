//! Transport decompression for repository databases
//!
//! Mirrors pacman sync databases in the wild: `.db` files are xz, zstd or
//! gzip compressed (or, rarely, plain text). The codec is detected from
//! magic bytes so callers never have to trust the file extension.
//!
//! This sits outside the parser on purpose: [`crate::db::Database`] only
//! ever consumes a complete decompressed text buffer.

use std::io::Read;

use flate2::read::GzDecoder;
use xz2::read::XzDecoder;

use crate::Result;

/// Compression codec of a raw database buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Gzip,
    Xz,
    Zstd,
    /// No recognized magic; treated as already-decompressed text.
    Plain,
}

impl Codec {
    /// Detect the codec from the buffer's magic bytes.
    pub fn detect(data: &[u8]) -> Codec {
        if data.starts_with(&[0x1f, 0x8b]) {
            Codec::Gzip
        } else if data.starts_with(&[0xfd, b'7', b'z', b'X', b'Z', 0x00]) {
            Codec::Xz
        } else if data.starts_with(&[0x28, 0xb5, 0x2f, 0xfd]) {
            Codec::Zstd
        } else {
            Codec::Plain
        }
    }
}

/// Inflate a raw database buffer into UTF-8 text.
pub fn decompress_to_string(data: &[u8]) -> Result<String> {
    let mut text = String::new();
    match Codec::detect(data) {
        Codec::Gzip => {
            GzDecoder::new(data).read_to_string(&mut text)?;
        }
        Codec::Xz => {
            XzDecoder::new(data).read_to_string(&mut text)?;
        }
        Codec::Zstd => {
            zstd::stream::read::Decoder::new(data)?.read_to_string(&mut text)?;
        }
        Codec::Plain => {
            text = String::from_utf8(data.to_vec())?;
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "%NAME%\nlinux66\n";

    #[test]
    fn test_detect_magic_bytes() {
        assert_eq!(Codec::detect(&[0x1f, 0x8b, 0x08]), Codec::Gzip);
        assert_eq!(
            Codec::detect(&[0xfd, b'7', b'z', b'X', b'Z', 0x00, 0x00]),
            Codec::Xz
        );
        assert_eq!(Codec::detect(&[0x28, 0xb5, 0x2f, 0xfd, 0x01]), Codec::Zstd);
        assert_eq!(Codec::detect(b"%FILENAME%"), Codec::Plain);
        assert_eq!(Codec::detect(&[]), Codec::Plain);
    }

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(decompress_to_string(TEXT.as_bytes()).unwrap(), TEXT);
    }

    #[test]
    fn test_plain_rejects_invalid_utf8() {
        assert!(decompress_to_string(&[b'a', 0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_xz_inflation() {
        let mut compressed = Vec::new();
        xz2::read::XzEncoder::new(TEXT.as_bytes(), 6)
            .read_to_end(&mut compressed)
            .unwrap();
        assert_eq!(Codec::detect(&compressed), Codec::Xz);
        assert_eq!(decompress_to_string(&compressed).unwrap(), TEXT);
    }

    #[test]
    fn test_zstd_inflation() {
        let compressed = zstd::stream::encode_all(TEXT.as_bytes(), 0).unwrap();
        assert_eq!(Codec::detect(&compressed), Codec::Zstd);
        assert_eq!(decompress_to_string(&compressed).unwrap(), TEXT);
    }

    #[test]
    fn test_gzip_inflation() {
        let mut compressed = Vec::new();
        flate2::read::GzEncoder::new(TEXT.as_bytes(), flate2::Compression::default())
            .read_to_end(&mut compressed)
            .unwrap();
        assert_eq!(Codec::detect(&compressed), Codec::Gzip);
        assert_eq!(decompress_to_string(&compressed).unwrap(), TEXT);
    }
}

//! ROM image loading and validation.
//!
//! Images are loaded verbatim into the memory image at setup and are
//! immutable thereafter (their pages are tagged ROM). Known VIC-20 part
//! numbers carry CRC-32 checksums; validation can be skipped for patched
//! or development images.

use std::path::Path;

// ---------------------------------------------------------------------------
// CRC-32 (private)
// ---------------------------------------------------------------------------

/// CRC-32 lookup table (reflected polynomial 0xEDB88320).
/// Same algorithm as MAME, ZIP, PNG, and Ethernet.
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

/// Compute the CRC-32 checksum of a byte slice.
fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    crc ^ 0xFFFF_FFFF
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading a ROM image.
#[derive(Debug)]
pub enum RomLoadError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    Io(std::io::Error),

    /// ROM file size does not match the expected size.
    SizeMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    /// CRC32 checksum does not match any known revision.
    ChecksumMismatch { file: String, actual: u32 },
}

impl std::fmt::Display for RomLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::SizeMismatch {
                file,
                expected,
                actual,
            } => write!(f, "ROM {file}: expected {expected} bytes, got {actual}"),
            Self::ChecksumMismatch { file, actual } => {
                write!(f, "ROM {file}: CRC32 0x{actual:08X} matches no known revision")
            }
        }
    }
}

impl std::error::Error for RomLoadError {}

impl From<std::io::Error> for RomLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// ROM image definitions
// ---------------------------------------------------------------------------

/// Describes one loadable ROM image: expected size and the CRC-32 values
/// of the known good revisions.
pub struct RomImage {
    /// Part-number name used in diagnostics (e.g. "kernal.901486-07").
    pub name: &'static str,
    pub size: usize,
    pub crc32: &'static [u32],
}

/// KERNAL, 8 KiB at 0xE000. NTSC 901486-06 and PAL 901486-07 revisions.
pub static KERNAL_ROM: RomImage = RomImage {
    name: "kernal.901486-06/07",
    size: 0x2000,
    crc32: &[0xe5e7_c174, 0x4be0_7cb4],
};

/// BASIC, 8 KiB at 0xC000.
pub static BASIC_ROM: RomImage = RomImage {
    name: "basic.901486-01",
    size: 0x2000,
    crc32: &[0xdb4c_43c1],
};

/// Character generator, 4 KiB at 0x8000.
pub static CHAR_ROM: RomImage = RomImage {
    name: "characters.901460-03",
    size: 0x1000,
    crc32: &[0x83e0_32a6],
};

impl RomImage {
    /// Load and validate an image from a file.
    ///
    /// Size mismatches are always fatal; an unknown checksum is fatal
    /// unless `skip_checksum` is set, in which case it is only logged.
    pub fn load(&self, path: &Path, skip_checksum: bool) -> Result<Vec<u8>, RomLoadError> {
        let data = std::fs::read(path)?;

        if data.len() != self.size {
            return Err(RomLoadError::SizeMismatch {
                file: self.name.to_string(),
                expected: self.size,
                actual: data.len(),
            });
        }

        let actual = crc32(&data);
        if !self.crc32.contains(&actual) {
            if skip_checksum {
                log::warn!("{}: CRC32 0x{actual:08X} matches no known revision", self.name);
            } else {
                return Err(RomLoadError::ChecksumMismatch {
                    file: self.name.to_string(),
                    actual,
                });
            }
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_matches_reference_vector() {
        // The classic "123456789" check value.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn crc32_of_empty_input_is_zero() {
        assert_eq!(crc32(b""), 0);
    }
}

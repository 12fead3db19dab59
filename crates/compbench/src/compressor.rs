//! Wire compressors negotiated with the server.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::BenchError;

/// A wire compression mode.
///
/// `None` is the uncompressed baseline every other mode is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compressor {
    /// No compression (baseline).
    None,
    /// Snappy.
    Snappy,
    /// zlib.
    Zlib,
    /// Zstandard.
    Zstd,
}

impl Compressor {
    /// Every supported compressor, baseline first.
    pub const ALL: [Compressor; 4] = [
        Compressor::None,
        Compressor::Snappy,
        Compressor::Zlib,
        Compressor::Zstd,
    ];

    /// Name used in reports and connection strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Compressor::None => "none",
            Compressor::Snappy => "snappy",
            Compressor::Zlib => "zlib",
            Compressor::Zstd => "zstd",
        }
    }

    /// Value of the `compressors` URI option, if any.
    pub fn uri_option(&self) -> Option<&'static str> {
        match self {
            Compressor::None => None,
            other => Some(other.as_str()),
        }
    }

    /// Whether this is the uncompressed baseline.
    pub fn is_baseline(&self) -> bool {
        matches!(self, Compressor::None)
    }
}

impl fmt::Display for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compressor {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Compressor::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| {
                BenchError::InvalidConfig(format!(
                    "unknown compressor '{}' (expected one of: none, snappy, zlib, zstd)",
                    name
                ))
            })
    }
}

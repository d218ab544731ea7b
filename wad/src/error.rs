use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong reading an archive or decoding one of its lumps.
///
/// The structural variants (`BadMagic`, `TruncatedHeader`, `BadDirectoryOffset`,
/// `TruncatedDirectory`, `LumpOutOfBounds`) abort the whole archive. A
/// `SizeMismatch` only concerns the one lump being decoded.
#[derive(Debug, Error)]
pub enum WadError {
    #[error("could not read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported WAD type {:?}", String::from_utf8_lossy(.0))]
    BadMagic([u8; 4]),
    #[error("WAD header truncated, {len} bytes available")]
    TruncatedHeader { len: usize },
    #[error("directory offset {offset} is outside of the {len} byte archive")]
    BadDirectoryOffset { offset: i64, len: usize },
    #[error("directory of {count} entries at {offset} does not fit in {len} bytes")]
    TruncatedDirectory { count: i64, offset: usize, len: usize },
    #[error("lump {name} at {position} with size {size} is outside of the {data_len} byte data region")]
    LumpOutOfBounds {
        name: String,
        position: i64,
        size: i64,
        data_len: usize,
    },
    #[error("{record} lump is {len} bytes, not a multiple of the {record_size} byte record")]
    SizeMismatch {
        record: &'static str,
        len: usize,
        record_size: usize,
    },
}

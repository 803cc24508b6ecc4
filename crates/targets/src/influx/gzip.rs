//! Gzip request bodies into reusable buffers

use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Compress `payload` into `out`, replacing its contents
pub fn compress_into(payload: &[u8], out: &mut Vec<u8>) -> io::Result<()> {
    out.clear();
    let mut encoder = GzEncoder::new(out, Compression::default());
    encoder.write_all(payload)?;
    encoder.finish()?;
    Ok(())
}

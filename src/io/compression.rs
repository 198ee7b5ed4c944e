//! Transparent gzip support for the dataset readers and table writers.
//!
//! Readers detect gzip by extension (`.gz`, `.gzip`) and fall back to the
//! `1f 8b` magic bytes, so a compressed file with a plain name still reads.
//! Writers only look at the extension. Without the `compression-gzip`
//! feature both directions are buffered pass-throughs.

use anyhow::{Context, Result};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "compression-gzip")]
use flate2::{Compression, read::MultiGzDecoder, write::GzEncoder};

const GZIP_EXTENSIONS: [&str; 2] = [".gz", ".gzip"];
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Codec chosen for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Plain,
    Gzip,
}

impl Codec {
    /// Codec implied by the file name. Case-insensitive.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let name = path.as_ref().to_string_lossy().to_lowercase();
        if GZIP_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            Self::Gzip
        } else {
            Self::Plain
        }
    }

    /// Peek at the stream head without consuming it.
    fn sniff<R: BufRead>(reader: &mut R) -> io::Result<Self> {
        let head = reader.fill_buf()?;
        Ok(if head.starts_with(&GZIP_MAGIC) {
            Self::Gzip
        } else {
            Self::Plain
        })
    }
}

/// Wrap `reader` with decompression when `path_hint` or the stream header
/// says it is gzip.
///
/// # Errors
/// If the stream cannot be peeked, or it is gzip and the feature is off.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    let path_hint = path_hint.as_ref();
    let mut buffered = BufReader::new(reader);
    let codec = match Codec::from_path(path_hint) {
        Codec::Gzip => Codec::Gzip,
        Codec::Plain => Codec::sniff(&mut buffered)
            .with_context(|| format!("peek header of {}", path_hint.display()))?,
    };
    match codec {
        Codec::Plain => Ok(Box::new(buffered)),
        #[cfg(feature = "compression-gzip")]
        Codec::Gzip => Ok(Box::new(BufReader::new(MultiGzDecoder::new(buffered)))),
        #[cfg(not(feature = "compression-gzip"))]
        Codec::Gzip => anyhow::bail!(
            "{} is gzip-compressed; enable the `compression-gzip` feature",
            path_hint.display()
        ),
    }
}

/// Writer that compresses when the target name asks for it.
///
/// Call [`CompressedWriter::finish`] when done: it flushes the buffer and
/// writes the gzip trailer, surfacing any error that `Drop` would swallow.
pub enum CompressedWriter<W: Write> {
    Plain(BufWriter<W>),
    #[cfg(feature = "compression-gzip")]
    Gzip(GzEncoder<BufWriter<W>>),
}

impl<W: Write> CompressedWriter<W> {
    pub fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut w) => w.flush(),
            #[cfg(feature = "compression-gzip")]
            Self::Gzip(enc) => enc.finish()?.flush(),
        }
    }
}

impl<W: Write> Write for CompressedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            #[cfg(feature = "compression-gzip")]
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            #[cfg(feature = "compression-gzip")]
            Self::Gzip(w) => w.flush(),
        }
    }
}

/// Wrap `writer` with gzip compression when `path_hint` ends in `.gz`.
///
/// # Errors
/// If the name asks for gzip and the feature is off.
pub fn auto_detect_writer<W: Write>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<CompressedWriter<W>> {
    let buffered = BufWriter::new(writer);
    match Codec::from_path(&path_hint) {
        Codec::Plain => Ok(CompressedWriter::Plain(buffered)),
        #[cfg(feature = "compression-gzip")]
        Codec::Gzip => Ok(CompressedWriter::Gzip(GzEncoder::new(
            buffered,
            Compression::default(),
        ))),
        #[cfg(not(feature = "compression-gzip"))]
        Codec::Gzip => anyhow::bail!(
            "{} asks for gzip output; enable the `compression-gzip` feature",
            path_hint.as_ref().display()
        ),
    }
}

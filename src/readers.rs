//! Input line source
//!
//! Opens the log file as a buffered line reader with transparent
//! decompression. Gzip (1F 8B 08) and zstd (28 B5 2F FD) are detected by
//! magic bytes, so a renamed `.gz` still decompresses and a `.gz`-named
//! plain file still reads.

use anyhow::{anyhow, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Chain, Cursor, Read};
use std::path::Path;

type ChainReader = Chain<Cursor<Vec<u8>>, File>;

/// Buffered reader over a log file, decompressing if needed
pub enum LogReader {
    Gzip(BufReader<MultiGzDecoder<ChainReader>>),
    Zstd(BufReader<zstd::Decoder<'static, BufReader<ChainReader>>>),
    Plain(BufReader<ChainReader>),
    Stdin(BufReader<io::Stdin>),
}

impl std::fmt::Debug for LogReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogReader::Gzip(_) => f.write_str("LogReader::Gzip"),
            LogReader::Zstd(_) => f.write_str("LogReader::Zstd"),
            LogReader::Plain(_) => f.write_str("LogReader::Plain"),
            LogReader::Stdin(_) => f.write_str("LogReader::Stdin"),
        }
    }
}

impl LogReader {
    /// Open a log file with compression auto-detection, or stdin when no
    /// path is given.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(LogReader::Stdin(BufReader::new(io::stdin())));
        };

        let file = File::open(path)
            .map_err(|e| anyhow!("Could not open the file {}: {}", path.display(), e))?;
        detect_compression(file)
            .map_err(|e| anyhow!("Failed to detect compression format: {}", e))
    }
}

/// Peek at the first bytes to pick the right decoder, then put them back
/// in front with a cursor chain.
fn detect_compression(mut file: File) -> io::Result<LogReader> {
    let mut head = [0u8; 4];
    let n = file.read(&mut head)?;

    let prefix = Cursor::new(head[..n].to_vec());
    let chained = prefix.chain(file);

    let is_gzip = n >= 3 && head[0] == 0x1F && head[1] == 0x8B && head[2] == 0x08;
    let is_zstd =
        n >= 4 && head[0] == 0x28 && head[1] == 0xB5 && head[2] == 0x2F && head[3] == 0xFD;

    if is_gzip {
        let decoder = MultiGzDecoder::new(chained);
        Ok(LogReader::Gzip(BufReader::new(decoder)))
    } else if is_zstd {
        let decoder = zstd::Decoder::new(chained)?;
        Ok(LogReader::Zstd(BufReader::new(decoder)))
    } else {
        Ok(LogReader::Plain(BufReader::new(chained)))
    }
}

impl Read for LogReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            LogReader::Gzip(reader) => reader.read(buf),
            LogReader::Zstd(reader) => reader.read(buf),
            LogReader::Plain(reader) => reader.read(buf),
            LogReader::Stdin(reader) => reader.read(buf),
        }
    }
}

impl BufRead for LogReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            LogReader::Gzip(reader) => reader.fill_buf(),
            LogReader::Zstd(reader) => reader.fill_buf(),
            LogReader::Plain(reader) => reader.fill_buf(),
            LogReader::Stdin(reader) => reader.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            LogReader::Gzip(reader) => reader.consume(amt),
            LogReader::Zstd(reader) => reader.consume(amt),
            LogReader::Plain(reader) => reader.consume(amt),
            LogReader::Stdin(reader) => reader.consume(amt),
        }
    }
}

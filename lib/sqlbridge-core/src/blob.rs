//!
//! Blob Streams
//!
//! A blob is a byte stream with a read cursor. `available` reports how many
//! bytes the current segment can hand out, `get` copies bytes and advances
//! the cursor, `reset` repositions it. A reader keeps calling `get` until
//! `available` reports zero; the bytes returned in total equal the blob
//! length.
//!
//! Two sources exist: an in-memory buffer split into fixed segments
//! (seekable, shareable between copies) and a single-pass stream over any
//! `std::io::Read`.
//!

use std::io::{ErrorKind, Read};
use std::sync::Arc;

use crate::error::{Result, SqlError};
use crate::status::{INVALID_OPERATION, SQL_SYSTEM_ERROR};

pub const DEFAULT_SEGMENT_SIZE: usize = 4096;

/// Backing store of a blob value.
pub trait BlobSource: Send {
    fn available(&mut self) -> Result<usize>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn seek(&mut self, pos: u64) -> Result<()>;
    /// Independent cursor over the same bytes, if the source can provide one.
    fn fork(&self) -> Option<Box<dyn BlobSource>>;
    /// Entire contents when they are already resident.
    fn contents(&self) -> Option<&[u8]>;
}

pub struct Blob {
    source: Box<dyn BlobSource>,
}

impl std::fmt::Debug for Blob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl Blob {
    pub fn from_source(source: Box<dyn BlobSource>) -> Self {
        Self { source }
    }

    pub fn from_bytes(data: impl Into<Arc<[u8]>>, segment_size: usize) -> Self {
        Self::from_source(Box::new(BufferBlob::new(data.into(), segment_size)))
    }

    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self::from_source(Box::new(ReaderBlob::new(reader, DEFAULT_SEGMENT_SIZE)))
    }

    pub fn available(&mut self) -> Result<usize> {
        self.source.available()
    }

    /// Copy up to `buf.len()` bytes. Fewer bytes are returned only at the
    /// end of the stream.
    pub fn get(&mut self, buf: &mut [u8]) -> Result<usize> {
        self.source.read(buf)
    }

    pub fn reset(&mut self, pos: u64) -> Result<()> {
        self.source.seek(pos)
    }

    pub fn len(&self) -> Option<usize> {
        self.source.contents().map(<[u8]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    pub fn contents(&self) -> Option<&[u8]> {
        self.source.contents()
    }

    /// Drain the rest of the stream from the current cursor.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut chunk = vec![0u8; DEFAULT_SEGMENT_SIZE];
        loop {
            let n = self.get(&mut chunk)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend_from_slice(&chunk[..n]);
        }
    }

    pub fn try_clone(&self) -> Result<Blob> {
        self.source
            .fork()
            .map(Blob::from_source)
            .ok_or_else(|| SqlError::fault(INVALID_OPERATION, "streaming blob cannot be copied"))
    }
}

pub struct BufferBlob {
    data: Arc<[u8]>,
    pos: usize,
    segment_size: usize,
}

impl BufferBlob {
    pub fn new(data: Arc<[u8]>, segment_size: usize) -> Self {
        Self {
            data,
            pos: 0,
            segment_size: segment_size.max(1),
        }
    }
}

impl BlobSource for BufferBlob {
    fn available(&mut self) -> Result<usize> {
        let remaining = self.data.len() - self.pos;
        let in_segment = self.segment_size - self.pos % self.segment_size;
        Ok(remaining.min(in_segment))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        let len = self.data.len();
        match usize::try_from(pos) {
            Ok(pos) if pos <= len => {
                self.pos = pos;
                Ok(())
            }
            _ => Err(SqlError::OutOfRange {
                index: usize::try_from(pos).unwrap_or(usize::MAX),
                len,
            }),
        }
    }

    fn fork(&self) -> Option<Box<dyn BlobSource>> {
        Some(Box::new(BufferBlob::new(self.data.clone(), self.segment_size)))
    }

    fn contents(&self) -> Option<&[u8]> {
        Some(&self.data)
    }
}

/// Single-pass stream. Bytes are pulled from the reader one chunk at a
/// time; `available` reports what is left of the current chunk.
pub struct ReaderBlob<R> {
    reader: R,
    chunk: Vec<u8>,
    start: usize,
    consumed: u64,
    chunk_size: usize,
    eof: bool,
}

impl<R: Read + Send> ReaderBlob<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk: Vec::new(),
            start: 0,
            consumed: 0,
            chunk_size: chunk_size.max(1),
            eof: false,
        }
    }

    fn fill(&mut self) -> Result<()> {
        self.chunk.resize(self.chunk_size, 0);
        let n = loop {
            match self.reader.read(&mut self.chunk) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(SqlError::fault(SQL_SYSTEM_ERROR, e.to_string())),
            }
        };
        self.chunk.truncate(n);
        self.start = 0;
        self.eof = n == 0;
        Ok(())
    }
}

impl<R: Read + Send> BlobSource for ReaderBlob<R> {
    fn available(&mut self) -> Result<usize> {
        if self.start == self.chunk.len() && !self.eof {
            self.fill()?;
        }
        Ok(self.chunk.len() - self.start)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            let avail = self.available()?;
            if avail == 0 {
                break;
            }
            let n = avail.min(buf.len() - written);
            buf[written..written + n].copy_from_slice(&self.chunk[self.start..self.start + n]);
            self.start += n;
            written += n;
        }
        self.consumed += written as u64;
        Ok(written)
    }

    fn seek(&mut self, pos: u64) -> Result<()> {
        if pos == self.consumed {
            return Ok(());
        }
        Err(SqlError::fault(
            INVALID_OPERATION,
            "blob stream is not seekable",
        ))
    }

    fn fork(&self) -> Option<Box<dyn BlobSource>> {
        None
    }

    fn contents(&self) -> Option<&[u8]> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(blob: &mut Blob, cap: usize) -> (usize, Vec<u8>) {
        let mut total = 0;
        let mut out = Vec::new();
        let mut buf = vec![0u8; cap];
        while blob.available().unwrap() > 0 {
            let n = blob.get(&mut buf).unwrap();
            total += n;
            out.extend_from_slice(&buf[..n]);
        }
        (total, out)
    }

    #[test]
    fn test_segmented_cursor_reads_everything() {
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut blob = Blob::from_bytes(data.clone(), 4096);
        assert_eq!(blob.available().unwrap(), 4096);

        let (total, out) = drain(&mut blob, 1000);
        assert_eq!(total, 10_000);
        assert_eq!(out, data);
        assert_eq!(blob.available().unwrap(), 0);
        assert_eq!(blob.get(&mut [0u8; 8]).unwrap(), 0);
    }

    #[test]
    fn test_available_tracks_segment_boundary() {
        let mut blob = Blob::from_bytes(vec![1u8; 10], 4);
        let mut buf = [0u8; 3];
        assert_eq!(blob.available().unwrap(), 4);
        blob.get(&mut buf).unwrap();
        assert_eq!(blob.available().unwrap(), 1);
        blob.get(&mut buf).unwrap();
        assert_eq!(blob.available().unwrap(), 2);
    }

    #[test]
    fn test_reset_rereads_from_start() {
        let mut blob = Blob::from_bytes(b"hello world".to_vec(), 4);
        let (_, first) = drain(&mut blob, 5);
        blob.reset(0).unwrap();
        let (_, second) = drain(&mut blob, 3);
        assert_eq!(first, second);

        blob.reset(6).unwrap();
        assert_eq!(blob.read_to_end().unwrap(), b"world");
        assert!(blob.reset(12).is_err());
    }

    #[test]
    fn test_short_read_only_at_end() {
        let mut blob = Blob::from_bytes(vec![7u8; 10], 3);
        let mut buf = [0u8; 8];
        assert_eq!(blob.get(&mut buf).unwrap(), 8);
        assert_eq!(blob.get(&mut buf).unwrap(), 2);
    }

    #[test]
    fn test_reader_blob_is_single_pass() {
        let data = vec![9u8; 5000];
        let mut blob = Blob::from_reader(std::io::Cursor::new(data.clone()));
        assert_eq!(blob.len(), None);
        assert!(blob.try_clone().is_err());
        blob.reset(0).unwrap();

        let (total, out) = drain(&mut blob, 777);
        assert_eq!(total, 5000);
        assert_eq!(out, data);

        let err = blob.reset(0).unwrap_err();
        assert_eq!(err.status(), INVALID_OPERATION);
    }

    #[test]
    fn test_clone_has_independent_cursor() {
        let mut blob = Blob::from_bytes(b"abcdef".to_vec(), 2);
        let mut buf = [0u8; 4];
        blob.get(&mut buf).unwrap();
        let mut copy = blob.try_clone().unwrap();
        assert_eq!(copy.read_to_end().unwrap(), b"abcdef");
        assert_eq!(blob.read_to_end().unwrap(), b"ef");
    }
}

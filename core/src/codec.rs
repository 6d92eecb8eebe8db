//! Fixed-width posting records: a 4-byte big-endian document id followed by a
//! 2-byte big-endian term frequency.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};
use crate::index::{Posting, PostingLocation};

pub const RECORD_SIZE: usize = 6;
pub const TF_MASK: u32 = (1 << 16) - 1;

/// Segment size used by [`SegmentWriter`] when none is given; a multiple of
/// [`RECORD_SIZE`] so records never straddle two segments.
pub const DEFAULT_SEGMENT_BYTES: u64 = 1_999_998;

/// Encodes postings as 6-byte records. Frequencies above 65535 are truncated
/// to their low 16 bits.
pub fn encode_postings(postings: &[Posting]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(postings.len() * RECORD_SIZE);
    for p in postings {
        // writes into a Vec cannot fail
        let _ = buf.write_u32::<BigEndian>(p.doc_id);
        let _ = buf.write_u16::<BigEndian>((p.tf & TF_MASK) as u16);
    }
    buf
}

/// Decodes whole records from `bytes`; a trailing partial record is ignored,
/// so callers compare the returned length against what they expected.
pub fn decode_postings(bytes: &[u8]) -> Vec<Posting> {
    let n = bytes.len() / RECORD_SIZE;
    let mut out = Vec::with_capacity(n);
    let mut cur = Cursor::new(&bytes[..n * RECORD_SIZE]);
    for _ in 0..n {
        let (Ok(doc_id), Ok(tf)) = (cur.read_u32::<BigEndian>(), cur.read_u16::<BigEndian>()) else {
            break;
        };
        out.push(Posting::new(doc_id, tf as u32));
    }
    out
}

/// Appends encoded posting lists to numbered segment files (`000.bin`,
/// `001.bin`, ...) in one directory, opening a new segment whenever the
/// current one reaches `max_segment_bytes`. A list that does not fit is split,
/// and every piece gets its own [`PostingLocation`].
pub struct SegmentWriter {
    dir: PathBuf,
    max_segment_bytes: u64,
    next_index: usize,
    current: Option<OpenSegment>,
}

struct OpenSegment {
    name: String,
    path: PathBuf,
    writer: BufWriter<File>,
    len: u64,
}

impl SegmentWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self::with_segment_size(dir, DEFAULT_SEGMENT_BYTES)
    }

    pub fn with_segment_size<P: AsRef<Path>>(dir: P, max_segment_bytes: u64) -> Self {
        // round down to whole records, never below one record
        let records = (max_segment_bytes / RECORD_SIZE as u64).max(1);
        Self {
            dir: dir.as_ref().to_path_buf(),
            max_segment_bytes: records * RECORD_SIZE as u64,
            next_index: 0,
            current: None,
        }
    }

    pub fn append(&mut self, postings: &[Posting]) -> Result<Vec<PostingLocation>> {
        let bytes = encode_postings(postings);
        let mut locations = Vec::new();
        let max = self.max_segment_bytes;
        let mut rest = &bytes[..];
        while !rest.is_empty() {
            let seg = self.writable_segment()?;
            let room = (max - seg.len) as usize;
            let take = room.min(rest.len());
            locations.push(PostingLocation { segment: seg.name.clone(), offset: seg.len });
            seg.writer
                .write_all(&rest[..take])
                .map_err(|e| SearchError::io(&seg.path, e))?;
            seg.len += take as u64;
            rest = &rest[take..];
        }
        Ok(locations)
    }

    pub fn finish(mut self) -> Result<()> {
        if let Some(mut seg) = self.current.take() {
            seg.writer.flush().map_err(|e| SearchError::io(&seg.path, e))?;
        }
        Ok(())
    }

    fn writable_segment(&mut self) -> Result<&mut OpenSegment> {
        if let Some(mut seg) = self.current.take() {
            if seg.len < self.max_segment_bytes {
                return Ok(self.current.insert(seg));
            }
            seg.writer.flush().map_err(|e| SearchError::io(&seg.path, e))?;
        }
        let name = format!("{:03}.bin", self.next_index);
        self.next_index += 1;
        let path = self.dir.join(&name);
        let file = File::create(&path).map_err(|e| SearchError::io(&path, e))?;
        Ok(self.current.insert(OpenSegment { name, path, writer: BufWriter::new(file), len: 0 }))
    }
}

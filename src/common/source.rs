use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;

use crate::common::error::Result;

/// Random-access byte source read through positional, stateless reads.
///
/// `read_at` fills `buf` with bytes starting at absolute `offset` and returns
/// how many were copied. `Ok(0)` for a non-empty buffer means the offset is at
/// or past the end of the data; any smaller positive count is a short read and
/// the caller may ask again from the new offset.
///
/// No implementation keeps a cursor, so independent handles never interfere.
pub trait ByteSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

impl ByteSource for [u8] {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = match usize::try_from(offset) {
            Ok(start) if start < self.len() => start,
            _ => return Ok(0),
        };
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl ByteSource for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.as_slice().read_at(offset, buf)
    }
}

/// Reads ignore the cursor position entirely.
impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.get_ref().as_ref().read_at(offset, buf)
    }
}

impl ByteSource for Mmap {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        <[u8] as ByteSource>::read_at(self, offset, buf)
    }
}

impl ByteSource for File {
    #[cfg(unix)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    // seek_read moves the handle's cursor, but the result never depends on it.
    #[cfg(windows)]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }

    // No positional read here: seek then read, so a handle shared across
    // threads needs outside synchronisation.
    #[cfg(not(any(unix, windows)))]
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::io::{Read, Seek, SeekFrom};

        let mut file = self;
        file.seek(SeekFrom::Start(offset))?;
        file.read(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &S {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Arc<S> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }
}

/// Fill as much of `buf` as the source has, starting at `offset`.
///
/// Short reads are retried; the returned count is smaller than `buf.len()` only
/// when the source ran out of data.
pub fn read_full_at<S: ByteSource + ?Sized>(
    source: &S,
    offset: u64,
    buf: &mut [u8],
) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read_at(offset + filled as u64, &mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

const REGION_CHUNK: usize = 64 * 1024;

/// Read up to `len` bytes starting at `offset` into a new buffer.
///
/// The buffer grows chunk by chunk, so a bogus length on a short source never
/// allocates more than the source can deliver. A result shorter than `len`
/// means the source ended first.
pub fn read_region<S: ByteSource + ?Sized>(
    source: &S,
    offset: u64,
    len: usize,
) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(len.min(REGION_CHUNK));
    while data.len() < len {
        let start = data.len();
        let want = (len - start).min(REGION_CHUNK);
        data.resize(start + want, 0);
        let n = read_full_at(source, offset + start as u64, &mut data[start..])?;
        data.truncate(start + n);
        if n < want {
            break;
        }
    }
    Ok(data)
}

/// Memory-map a file read-only for use as a [`ByteSource`].
pub fn map_file<P: AsRef<Path>>(path: P) -> Result<Mmap> {
    let file = File::open(path)?;
    // SAFETY: the map is read-only; callers must not truncate the file while it is mapped.
    let map = unsafe { Mmap::map(&file)? };
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Hands out at most `chunk` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl ByteSource for Trickle<'_> {
        fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(self.chunk);
            self.data.read_at(offset, &mut buf[..len])
        }
    }

    #[test]
    fn slice_reads_are_positional() {
        let data = b"0123456789".to_vec();
        let mut buf = [0u8; 4];
        assert_eq!(data.read_at(3, &mut buf).unwrap(), 4);
        assert_eq!(&buf, b"3456");
        assert_eq!(data.read_at(8, &mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"89");
        assert_eq!(data.read_at(10, &mut buf).unwrap(), 0);
        assert_eq!(data.read_at(u64::MAX, &mut buf).unwrap(), 0);
    }

    #[test]
    fn cursor_position_is_ignored() {
        let mut cursor = Cursor::new(b"abcdef".to_vec());
        cursor.set_position(5);
        let mut buf = [0u8; 3];
        assert_eq!(cursor.read_at(0, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn read_full_at_retries_short_reads() {
        let source = Trickle { data: b"abcdefghij", chunk: 3 };
        let mut buf = [0u8; 8];
        assert_eq!(read_full_at(&source, 1, &mut buf).unwrap(), 8);
        assert_eq!(&buf, b"bcdefghi");

        let mut buf = [0u8; 8];
        assert_eq!(read_full_at(&source, 6, &mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"ghij");
    }

    #[test]
    fn region_stops_at_end_of_source() {
        let data = vec![7u8; 100];
        assert_eq!(read_region(&data, 10, 50).unwrap().len(), 50);
        assert_eq!(read_region(&data, 10, 1 << 27).unwrap().len(), 90);
        assert!(read_region(&data, 200, 10).unwrap().is_empty());

        let big = vec![1u8; REGION_CHUNK * 2 + 5];
        let source = Trickle { data: &big, chunk: 1000 };
        assert_eq!(read_region(&source, 0, big.len()).unwrap(), big);
    }

    #[test]
    fn file_and_map_agree() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ID3 positional").unwrap();
        file.flush().unwrap();

        let handle = File::open(file.path()).unwrap();
        let map = map_file(file.path()).unwrap();

        let mut a = [0u8; 10];
        let mut b = [0u8; 10];
        assert_eq!(read_full_at(&handle, 4, &mut a).unwrap(), 10);
        assert_eq!(read_full_at(&map, 4, &mut b).unwrap(), 10);
        assert_eq!(a, b);
        assert_eq!(&a, b"positional");
    }
}

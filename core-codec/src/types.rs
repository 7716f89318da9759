//! Per-invocation data: the borrowed input buffer and the ordered output.

use bytes::{Bytes, BytesMut};

/// Caller-owned input for a single invocation.
///
/// `declared_len` is the length the caller claims the buffer has. Callers
/// crossing a foreign boundary pass both separately, and a mismatch is
/// rejected before the backend is called.
#[derive(Debug, Clone, Copy)]
pub struct MediaBuffer<'a> {
    data: &'a [u8],
    declared_len: usize,
}

impl<'a> MediaBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            declared_len: data.len(),
        }
    }

    pub fn with_declared_len(data: &'a [u8], declared_len: usize) -> Self {
        Self { data, declared_len }
    }

    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn declared_len(&self) -> usize {
        self.declared_len
    }
}

impl<'a> From<&'a [u8]> for MediaBuffer<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl<'a> From<&'a Vec<u8>> for MediaBuffer<'a> {
    fn from(data: &'a Vec<u8>) -> Self {
        Self::new(data.as_slice())
    }
}

/// Ordered chunks produced by one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkStream {
    chunks: Vec<Bytes>,
}

impl ChunkStream {
    pub fn new(chunks: Vec<Bytes>) -> Self {
        Self { chunks }
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Sum of all chunk lengths.
    pub fn total_bytes(&self) -> usize {
        self.chunks.iter().map(Bytes::len).sum()
    }

    pub fn chunks(&self) -> &[Bytes] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bytes> {
        self.chunks.iter()
    }

    pub fn into_chunks(self) -> Vec<Bytes> {
        self.chunks
    }

    /// Joins all chunks, in order, into one buffer.
    pub fn concat(&self) -> Bytes {
        match self.chunks.as_slice() {
            [] => Bytes::new(),
            [single] => single.clone(),
            chunks => {
                let mut out = BytesMut::with_capacity(self.total_bytes());
                for chunk in chunks {
                    out.extend_from_slice(chunk);
                }
                out.freeze()
            }
        }
    }
}

impl From<Vec<Bytes>> for ChunkStream {
    fn from(chunks: Vec<Bytes>) -> Self {
        Self::new(chunks)
    }
}

impl IntoIterator for ChunkStream {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChunkStream {
    type Item = &'a Bytes;
    type IntoIter = std::slice::Iter<'a, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_preserves_order() {
        let stream = ChunkStream::new(vec![
            Bytes::from_static(b"ab"),
            Bytes::from_static(b"c"),
            Bytes::from_static(b"def"),
        ]);
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.total_bytes(), 6);
        assert_eq!(stream.concat(), Bytes::from_static(b"abcdef"));
    }

    #[test]
    fn test_concat_empty_and_single() {
        assert!(ChunkStream::default().concat().is_empty());

        let single = ChunkStream::new(vec![Bytes::from_static(b"frame")]);
        assert_eq!(single.concat(), Bytes::from_static(b"frame"));
    }

    #[test]
    fn test_media_buffer_lengths() {
        let data = [1u8, 2, 3];
        let buffer = MediaBuffer::from(&data[..]);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.declared_len(), 3);

        let lying = MediaBuffer::with_declared_len(&data, 8);
        assert_eq!(lying.len(), 3);
        assert_eq!(lying.declared_len(), 8);
    }
}

//! Fixed-capacity ring buffer for captured process output.
//!
//! Holds the most recently written bytes up to a capacity fixed at
//! construction. Once full, new writes overwrite the oldest bytes. The
//! buffer never reallocates, so a subprocess can emit arbitrary amounts of
//! output without growing memory use.

/// Circular byte buffer retaining the newest `capacity` bytes written.
#[derive(Debug)]
pub struct RingBuffer {
    buf: Box<[u8]>,
    /// Index of the oldest retained byte.
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// Create a buffer retaining at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Append bytes, overwriting the oldest bytes once full.
    pub fn write(&mut self, data: &[u8]) {
        let cap = self.buf.len();
        if cap == 0 || data.is_empty() {
            return;
        }

        // A write at least as large as the buffer replaces it wholesale.
        if data.len() >= cap {
            self.buf.copy_from_slice(&data[data.len() - cap..]);
            self.head = 0;
            self.len = cap;
            return;
        }

        let tail = (self.head + self.len) % cap;
        let first = data.len().min(cap - tail);
        self.buf[tail..tail + first].copy_from_slice(&data[..first]);
        let rest = data.len() - first;
        if rest > 0 {
            self.buf[..rest].copy_from_slice(&data[first..]);
        }

        if self.len + data.len() > cap {
            self.head = (tail + data.len()) % cap;
            self.len = cap;
        } else {
            self.len += data.len();
        }
    }

    /// Number of bytes currently retained.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing has been retained.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Maximum number of bytes retained.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Current contents, oldest byte first.
    pub fn to_vec(&self) -> Vec<u8> {
        let cap = self.buf.len();
        let mut out = Vec::with_capacity(self.len);
        if self.len == 0 {
            return out;
        }
        let first = self.len.min(cap - self.head);
        out.extend_from_slice(&self.buf[self.head..self.head + first]);
        out.extend_from_slice(&self.buf[..self.len - first]);
        out
    }

    /// Consume the buffer, yielding its contents oldest byte first.
    pub fn into_vec(self) -> Vec<u8> {
        self.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip_below_capacity() {
        let mut ring = RingBuffer::new(16);
        ring.write(b"hello");
        ring.write(b" world");
        assert_eq!(ring.len(), 11);
        assert_eq!(ring.to_vec(), b"hello world".to_vec());
    }

    #[test]
    fn test_overwrites_oldest_when_full() {
        let mut ring = RingBuffer::new(8);
        ring.write(b"abcdefgh");
        assert_eq!(ring.to_vec(), b"abcdefgh".to_vec());
        ring.write(b"123");
        assert_eq!(ring.len(), 8);
        assert_eq!(ring.to_vec(), b"defgh123".to_vec());
    }

    #[test]
    fn test_wrap_around_in_small_pieces() {
        let mut ring = RingBuffer::new(4);
        for chunk in [&b"ab"[..], b"cd", b"ef", b"g"] {
            ring.write(chunk);
        }
        assert_eq!(ring.to_vec(), b"defg".to_vec());
    }

    #[test]
    fn test_single_write_larger_than_capacity() {
        let mut ring = RingBuffer::new(4);
        ring.write(b"0123456789");
        assert_eq!(ring.to_vec(), b"6789".to_vec());
    }

    #[test]
    fn test_many_writes_keep_only_newest_capacity_bytes() {
        let mut ring = RingBuffer::new(10);
        let mut expected = Vec::new();
        for i in 0..100u8 {
            ring.write(&[i]);
            expected.push(i);
        }
        assert_eq!(ring.to_vec(), expected[90..].to_vec());
    }

    #[test]
    fn test_empty_and_zero_capacity() {
        let ring = RingBuffer::new(8);
        assert!(ring.is_empty());
        assert_eq!(ring.to_vec(), Vec::<u8>::new());

        let mut zero = RingBuffer::new(0);
        zero.write(b"dropped");
        assert!(zero.is_empty());
        assert_eq!(zero.into_vec(), Vec::<u8>::new());
    }
}

//! A writer that duplicates every write to two destinations.

use std::io::{self, Write};

/// Writes each buffer in full to `first`, then to `second`.
///
/// Both destinations observe the same byte sequence in the same order. A
/// failure on either side fails the whole write.
pub struct FanoutWriter<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> FanoutWriter<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for FanoutWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn both_destinations_see_identical_bytes() {
        let mut terminal = Vec::new();
        let mut buffer = Vec::new();
        {
            let mut writer = FanoutWriter::new(&mut terminal, &mut buffer);
            writer.write_all(b"Hel").unwrap();
            writer.write_all(b"lo").unwrap();
            writer.write_all("—ünïcode".as_bytes()).unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(terminal, buffer);
        assert_eq!(String::from_utf8(buffer).unwrap(), "Hello—ünïcode");
    }

    #[test]
    fn failure_on_either_side_fails_the_write() {
        let mut buffer = Vec::new();
        let mut writer = FanoutWriter::new(FailingWriter, &mut buffer);
        assert!(writer.write_all(b"x").is_err());

        let mut terminal = Vec::new();
        let mut writer = FanoutWriter::new(&mut terminal, FailingWriter);
        assert!(writer.write_all(b"x").is_err());
        let (terminal, _) = writer.into_inner();
        assert_eq!(terminal.as_slice(), b"x");
    }
}

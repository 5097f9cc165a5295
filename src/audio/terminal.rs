use super::{AudioError, PlaybackStrategy, SoundId};
use std::io::{self, Write};

const BEL: &[u8] = b"\x07";

/// Rings the terminal bell. Sound selection has no effect here.
pub struct BellStrategy<W: Write + Send> {
    out: W,
}

impl BellStrategy<io::Stderr> {
    pub fn stderr() -> Self {
        BellStrategy { out: io::stderr() }
    }
}

impl<W: Write + Send> BellStrategy<W> {
    pub fn new(out: W) -> Self {
        BellStrategy { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> PlaybackStrategy for BellStrategy<W> {
    fn name(&self) -> &str {
        "bell"
    }

    fn play(&mut self, _sound: SoundId) -> Result<(), AudioError> {
        self.out.write_all(BEL)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Last resort: always "succeeds" so a session can run without sound.
#[derive(Debug, Default)]
pub struct SilentStrategy;

impl PlaybackStrategy for SilentStrategy {
    fn name(&self) -> &str {
        "silent"
    }

    fn play(&mut self, _sound: SoundId) -> Result<(), AudioError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_bell_writes_bel_byte() {
        let mut bell = BellStrategy::new(Vec::new());
        bell.play(SoundId::default()).unwrap();
        bell.play(SoundId::default()).unwrap();
        assert_eq!(bell.into_inner(), b"\x07\x07".to_vec());
    }

    #[test]
    fn test_bell_reports_write_errors() {
        let mut bell = BellStrategy::new(BrokenPipe);
        assert!(matches!(
            bell.play(SoundId::default()),
            Err(AudioError::Io(_))
        ));
    }

    #[test]
    fn test_silent_always_succeeds() {
        assert!(SilentStrategy.play(SoundId::default()).is_ok());
    }
}

use lofty::file::AudioFile;
use lofty::probe::Probe;

/// Probe an uploaded audio payload for its playback duration. Failures are
/// expected for exotic encodings and simply yield `None`.
pub fn duration_ms(bytes: &[u8]) -> Option<i64> {
    let mut cursor = std::io::Cursor::new(bytes);
    let probe = Probe::new(&mut cursor).guess_file_type().ok()?;
    let tagged_file = probe.read().ok()?;
    let properties = tagged_file.properties();
    Some(properties.duration().as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_input_yields_none() {
        assert_eq!(duration_ms(b"definitely not audio"), None);
        assert_eq!(duration_ms(&[]), None);
    }
}

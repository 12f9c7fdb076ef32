use anyhow::{Result, anyhow};
use std::path::Path;

/// Sanitizes a filename to prevent path traversal and header injection.
/// Returns the sanitized filename or an error if the name is unusable.
pub fn sanitize_filename(filename: &str) -> Result<String> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");

    if name.is_empty() {
        return Err(anyhow!("Filename cannot be empty"));
    }

    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
    }

    // Allow most Unicode, block path separators and reserved characters
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control()
                || c == '/'
                || c == '\\'
                || c == ':'
                || c == '*'
                || c == '?'
                || c == '"'
                || c == '<'
                || c == '>'
                || c == '|'
                || c == ';'
            {
                '_'
            } else {
                c
            }
        })
        .collect();

    // Limit length safely for UTF-8
    let sanitized = if sanitized.len() > 255 {
        let mut end = 255;
        while !sanitized.is_char_boundary(end) {
            end -= 1;
        }
        sanitized[..end].to_string()
    } else {
        sanitized
    };

    if sanitized.starts_with('.') {
        return Err(anyhow!("Hidden files (starting with '.') are not allowed"));
    }

    Ok(sanitized)
}

/// Resolve the effective MIME type of an upload: the client-provided type
/// when specific, otherwise content sniffing, otherwise the file extension.
pub fn resolve_mime(
    declared: Option<&str>,
    data: &[u8],
    filename: &str,
) -> String {
    let declared = declared
        .map(|s| s.split(';').next().unwrap_or("").trim().to_lowercase())
        .filter(|s| !s.is_empty() && s != "application/octet-stream" && s != "application/stream");

    if let Some(mime) = declared {
        return mime;
    }

    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }

    let extension = filename.split('.').next_back().unwrap_or("").to_lowercase();
    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/x-m4a",
        "aif" | "aiff" => "audio/aiff",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Validates a MIME type against the configured audio allow-list.
pub fn validate_audio_mime(mime: &str, allowed: &[String]) -> Result<()> {
    if allowed.iter().any(|a| a == mime) {
        return Ok(());
    }
    Err(anyhow!(
        "MIME type '{}' is not allowed. Only audio uploads are permitted.",
        mime
    ))
}

/// Validates upload size against the configured maximum.
pub fn validate_file_size(size: usize, max_size: usize) -> Result<()> {
    if size > max_size {
        return Err(anyhow!(
            "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
            size,
            max_size,
            max_size / 1024 / 1024
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(sanitize_filename("dir/track.mp3").unwrap(), "track.mp3");
    }

    #[test]
    fn test_sanitize_replaces_reserved_chars() {
        assert_eq!(sanitize_filename("a:b*c.mp3").unwrap(), "a_b_c.mp3");
    }

    #[test]
    fn test_sanitize_rejects_empty_and_hidden() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename(".env").is_err());
    }

    #[test]
    fn test_resolve_mime_prefers_declared() {
        assert_eq!(
            resolve_mime(Some("audio/flac; charset=binary"), b"", "x.mp3"),
            "audio/flac"
        );
    }

    #[test]
    fn test_resolve_mime_falls_back_to_extension() {
        assert_eq!(resolve_mime(None, b"not-a-real-header", "track.MP3"), "audio/mpeg");
    }

    #[test]
    fn test_validate_audio_mime() {
        let allowed = vec!["audio/mpeg".to_string()];
        assert!(validate_audio_mime("audio/mpeg", &allowed).is_ok());
        assert!(validate_audio_mime("video/mp4", &allowed).is_err());
    }

    #[test]
    fn test_validate_file_size() {
        assert!(validate_file_size(10, 100).is_ok());
        assert!(validate_file_size(101, 100).is_err());
    }
}

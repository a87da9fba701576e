//! Panic isolation and UTF-8 safe string helpers.
//!
//! Overlay text is free-form user input (notes, reminders), so previews must
//! never slice through a multi-byte character, and teardown of a single
//! overlay must never take the whole manager down.

/// Snap a byte position to the nearest valid UTF-8 character boundary.
/// If `byte_pos` is already on a boundary, returns it unchanged.
/// Otherwise walks backward (up to 3 bytes) to find the boundary.
pub fn snap_to_char_boundary(s: &str, byte_pos: usize) -> usize {
    let len = s.len();
    if byte_pos >= len {
        return len;
    }
    if s.is_char_boundary(byte_pos) {
        return byte_pos;
    }
    // Walk backward up to 3 bytes (max UTF-8 char width)
    for offset in 1..=3 {
        let pos = byte_pos.saturating_sub(offset);
        if s.is_char_boundary(pos) {
            return pos;
        }
    }
    0
}

/// Safe string slice from start to `byte_pos`.
pub fn safe_slice_to(s: &str, byte_pos: usize) -> &str {
    let pos = snap_to_char_boundary(s, byte_pos);
    &s[..pos]
}

/// First line of `s`, cut to at most `max_bytes` with an ellipsis when
/// anything was dropped.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    let cut = safe_slice_to(first_line, max_bytes);
    if cut.len() < first_line.len() || s.lines().nth(1).is_some() {
        format!("{}…", cut)
    } else {
        cut.to_string()
    }
}

/// Run a closure, catching any panic. Returns the panic message as the
/// error so callers can show it to the user.
pub fn catch_panic<T>(f: impl FnOnce() -> T) -> Result<T, String> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::error!(%message, "caught panic");
        message
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_ascii() {
        let s = "hello";
        assert_eq!(snap_to_char_boundary(s, 0), 0);
        assert_eq!(snap_to_char_boundary(s, 3), 3);
        assert_eq!(snap_to_char_boundary(s, 100), 5);
    }

    #[test]
    fn test_snap_cjk() {
        // '中' is 3 bytes in UTF-8
        let s = "中文";
        assert_eq!(snap_to_char_boundary(s, 1), 0);
        assert_eq!(snap_to_char_boundary(s, 3), 3);
        assert_eq!(snap_to_char_boundary(s, 4), 3);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("buy milk", 20), "buy milk");
        assert_eq!(preview("buy milk", 3), "buy…");
        assert_eq!(preview("line one\nline two", 20), "line one…");
        assert_eq!(preview("", 10), "");
        // mid-char cut snaps back instead of panicking
        assert_eq!(preview("café au lait", 4), "caf…");
    }

    #[test]
    fn test_catch_panic() {
        assert_eq!(catch_panic(|| 7), Ok(7));
        let err = catch_panic(|| -> u32 { panic!("teardown failed") }).unwrap_err();
        assert_eq!(err, "teardown failed");
        let err = catch_panic(|| -> u32 { panic!("code {}", 3) }).unwrap_err();
        assert_eq!(err, "code 3");
    }
}

//! Path normalization.

use std::borrow::Cow;

/// Collapse every run of `/` into a single `/`.
///
/// Doubled separators are a common trick to slip past start-anchored
/// signatures (`//admin`). Returns the input unchanged when it has no runs.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(ch);
    }
    Cow::Owned(out)
}

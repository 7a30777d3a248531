use chrono::Utc;

/// Normalize an uploaded filename into a storage-safe name.
///
/// Runs of whitespace become `-`, anything outside `[A-Za-z0-9._-]` is dropped,
/// runs of `-` collapse, and the result is lower-cased. When nothing usable is
/// left (or no name was supplied) a `file-{millis}` name is synthesized.
///
/// The output always matches `^[a-z0-9._-]+$` and sanitizing it again returns
/// it unchanged.
pub fn sanitize_filename(raw: Option<&str>) -> String {
    let cleaned = raw.map(clean).unwrap_or_default();
    if cleaned.is_empty() {
        format!("file-{}", Utc::now().timestamp_millis())
    } else {
        cleaned
    }
}

fn clean(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_whitespace = false;

    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                push_dash(&mut out);
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;

        if c == '-' {
            push_dash(&mut out);
        } else if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            out.push(c.to_ascii_lowercase());
        }
    }

    out
}

fn push_dash(out: &mut String) {
    if !out.ends_with('-') {
        out.push('-');
    }
}

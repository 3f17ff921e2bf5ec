//! Name and Value Normalization
//!
//! PowerDNS keys record sets by absolute, dot-terminated owner names and
//! expects TXT content in quoted presentation format. Records must pass
//! through [`normalize_records`] before they are grouped.

use crate::types::Record;

/// Longest character-string a single TXT segment may hold
const TXT_SEGMENT_MAX: usize = 255;

/// Return `zone` with exactly one trailing dot
pub fn canonical_zone(zone: &str) -> String {
    format!("{}.", zone.trim_end_matches('.'))
}

/// Convert a possibly relative owner name into an absolute one
///
/// `""` and `"@"` refer to the zone apex. A name that already ends in a
/// dot is taken as absolute. An empty zone or `"."` is the root.
pub fn absolute_name(name: &str, zone: &str) -> String {
    let zone = canonical_zone(zone);
    match name {
        "" | "@" => zone,
        n if n.ends_with('.') => n.to_string(),
        n if zone == "." => format!("{}.", n),
        n => format!("{}.{}", n, zone),
    }
}

/// Convert an absolute owner name back into one relative to `zone`
///
/// Names compare case-insensitively, as DNS names do.
pub fn relative_name(fqdn: &str, zone: &str) -> String {
    let zone = canonical_zone(zone);
    let fqdn = if fqdn.ends_with('.') {
        fqdn.to_string()
    } else {
        format!("{}.", fqdn)
    };

    if fqdn.eq_ignore_ascii_case(&zone) {
        return "@".to_string();
    }

    if zone == "." {
        return fqdn.trim_end_matches('.').to_string();
    }

    // Suffix match must fall on a label boundary
    let split = fqdn.len().saturating_sub(zone.len());
    match (fqdn.get(..split), fqdn.get(split..)) {
        (Some(prefix), Some(suffix))
            if prefix.ends_with('.') && suffix.eq_ignore_ascii_case(&zone) =>
        {
            prefix.trim_end_matches('.').to_string()
        }
        _ => fqdn,
    }
}

/// Bring a raw TXT value into quoted presentation format
///
/// Values that are already quoted pass through. Anything else has `\` and
/// `"` escaped and is split into quoted segments of at most 255 bytes.
pub fn sanitize_txt(value: &str) -> String {
    if is_quoted(value) {
        return value.to_string();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    for ch in value.chars() {
        let escaped = match ch {
            '"' => "\\\"".to_string(),
            '\\' => "\\\\".to_string(),
            c => c.to_string(),
        };
        // An escape sequence never straddles two segments
        if current.len() + escaped.len() > TXT_SEGMENT_MAX {
            segments.push(std::mem::take(&mut current));
        }
        current.push_str(&escaped);
    }
    segments.push(current);

    segments
        .iter()
        .map(|s| format!("\"{}\"", s))
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if `value` is a sequence of one or more complete quoted strings
fn is_quoted(value: &str) -> bool {
    let mut chars = value.chars().peekable();
    let mut segments = 0;

    loop {
        while chars.peek() == Some(&' ') {
            chars.next();
        }
        match chars.next() {
            None => return segments > 0,
            Some('"') => {}
            Some(_) => return false,
        }
        loop {
            match chars.next() {
                None => return false,
                Some('\\') => {
                    if chars.next().is_none() {
                        return false;
                    }
                }
                Some('"') => break,
                Some(_) => {}
            }
        }
        segments += 1;
        // Segments must be separated by whitespace
        if !matches!(chars.peek(), None | Some(' ')) {
            return false;
        }
    }
}

/// Absolutize names and sanitize TXT values for `zone`
pub fn normalize_records(zone: &str, records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .map(|r| {
            let value = if r.record_type.eq_ignore_ascii_case("TXT") {
                sanitize_txt(&r.value)
            } else {
                r.value.clone()
            };
            Record {
                name: absolute_name(&r.name, zone),
                record_type: r.record_type.clone(),
                value,
                ttl: r.ttl,
            }
        })
        .collect()
}

use std::borrow::Cow;

use super::config::UniqConfig;

/// Drop the first `n` fields. A field is a run of whitespace followed by a
/// run of non-whitespace; running out of line early leaves an empty slice.
#[inline]
pub fn skip_fields(line: &[u8], n: usize) -> &[u8] {
    let len = line.len();
    let mut start = 0;

    for _ in 0..n {
        if start == len {
            break;
        }
        while start < len && line[start].is_ascii_whitespace() {
            start += 1;
        }
        while start < len && !line[start].is_ascii_whitespace() {
            start += 1;
        }
    }

    &line[start..]
}

/// Drop the first `n` bytes, or everything if the line is shorter.
#[inline]
pub fn skip_chars(line: &[u8], n: usize) -> &[u8] {
    &line[n.min(line.len())..]
}

/// Fold to lowercase. Valid UTF-8 is folded per Unicode rules; anything else
/// falls back to ASCII folding so arbitrary bytes still compare stably.
fn fold_case(slice: &[u8]) -> Cow<'_, [u8]> {
    if slice.is_ascii() {
        if slice.iter().any(u8::is_ascii_uppercase) {
            Cow::Owned(slice.to_ascii_lowercase())
        } else {
            Cow::Borrowed(slice)
        }
    } else {
        match std::str::from_utf8(slice) {
            Ok(s) => Cow::Owned(s.to_lowercase().into_bytes()),
            Err(_) => Cow::Owned(slice.to_ascii_lowercase()),
        }
    }
}

/// Derive the comparison key for a line (terminator already stripped).
///
/// Order is fixed: fields are skipped first, then characters, then the
/// result is cut to `check_chars` and finally case-folded with -i.
/// The key is only ever compared, never written.
pub fn comparison_key<'a>(line: &'a [u8], config: &UniqConfig) -> Cow<'a, [u8]> {
    if config.compares_whole_line() {
        return Cow::Borrowed(line);
    }

    let mut slice = skip_chars(skip_fields(line, config.skip_fields), config.skip_chars);

    if let Some(w) = config.check_chars {
        if w < slice.len() {
            slice = &slice[..w];
        }
    }

    if config.ignore_case {
        fold_case(slice)
    } else {
        Cow::Borrowed(slice)
    }
}

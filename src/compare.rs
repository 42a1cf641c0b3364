//! Output normalization and the match decision.
//!
//! `Text` trims whatever whitespace surrounds the output. `Bytes` is strict:
//! only a single trailing `\n` is dropped, so `"42\n\n"` or `"42\r\n"` do not
//! match `42`. Under both policies the failure sentinel `-` matches an empty
//! output as well as a literal `-`.

use std::borrow::Cow;

use crate::config::Compare;
use crate::parser::Expected;

impl Compare {
    pub fn normalize<'a>(self, stdout: &'a [u8]) -> Cow<'a, [u8]> {
        match self {
            Compare::Text => match String::from_utf8_lossy(stdout) {
                Cow::Borrowed(s) => Cow::Borrowed(s.trim().as_bytes()),
                Cow::Owned(s) => Cow::Owned(s.trim().as_bytes().to_vec()),
            },
            Compare::Bytes => Cow::Borrowed(stdout.strip_suffix(b"\n").unwrap_or(stdout)),
        }
    }
}

/// Whether already-normalized output satisfies `expected`.
pub fn matches(expected: &Expected, actual: &[u8]) -> bool {
    if expected.is_failure() && actual.is_empty() {
        return true;
    }
    expected.as_str().as_bytes() == actual
}

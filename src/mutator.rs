use crate::error::EncodeError;
use crate::writer::JsonWriter;

/// Rewrites scope and parameter key names before they hit the output.
///
/// Two forms exist so implementations can avoid allocation where the
/// rewritten key is a view into the original (`supports_slice` +
/// `slice`), and fall back to copying into a caller-provided buffer
/// otherwise (`try_mutate`).
pub trait KeyNameMutator {
    /// True when `slice` can produce the mutated key as a subslice of
    /// the original text.
    fn supports_slice(&self) -> bool {
        false
    }

    /// Borrowed form of the mutation. Only called when
    /// `supports_slice` returns true.
    fn slice<'a>(&self, key: &'a str) -> &'a str {
        key
    }

    /// Writes the mutated key into `buf` as UTF-8 and returns the byte
    /// count, or `None` when `buf` is too small. The caller retries
    /// with a doubled buffer on `None`.
    fn try_mutate(&self, key: &str, buf: &mut [u8]) -> Option<usize>;
}

/// Keeps only the text after the last `.` separator, so
/// `MyApp.Services.UserId` becomes `UserId`. Slice-capable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LastSegment;

impl KeyNameMutator for LastSegment {
    fn supports_slice(&self) -> bool {
        true
    }

    fn slice<'a>(&self, key: &'a str) -> &'a str {
        key.rsplit('.').next().unwrap_or(key)
    }

    fn try_mutate(&self, key: &str, buf: &mut [u8]) -> Option<usize> {
        let segment = self.slice(key).as_bytes();
        buf.get_mut(..segment.len())?.copy_from_slice(segment);
        Some(segment.len())
    }
}

/// Lower-cases the first character of the key. Only ASCII characters
/// change, keeping the byte length stable.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowerFirstChar;

impl KeyNameMutator for LowerFirstChar {
    fn try_mutate(&self, key: &str, buf: &mut [u8]) -> Option<usize> {
        copy_with_first_char(key, buf, false)
    }
}

/// Upper-cases the first character of the key. ASCII only.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpperFirstChar;

impl KeyNameMutator for UpperFirstChar {
    fn try_mutate(&self, key: &str, buf: &mut [u8]) -> Option<usize> {
        copy_with_first_char(key, buf, true)
    }
}

fn copy_with_first_char(key: &str, buf: &mut [u8], upper: bool) -> Option<usize> {
    let out = buf.get_mut(..key.len())?;
    out.copy_from_slice(key.as_bytes());
    if let Some(first) = out.first_mut() {
        if first.is_ascii() {
            *first = if upper { first.to_ascii_uppercase() } else { first.to_ascii_lowercase() };
        }
    }
    Some(key.len())
}

/// Reusable scratch size for the copy path. Larger attempts allocate a
/// fresh buffer for that attempt only.
pub(crate) const KEY_SCRATCH_LEN: usize = 256;

/// Writes `key` as a member key, routed through `mutator` when one is
/// configured. Copy mutators get a buffer sized to the key, doubled on
/// every too-small signal until the mutation fits.
pub(crate) fn write_key(
    json: &mut JsonWriter<'_>,
    key: &str,
    mutator: Option<&dyn KeyNameMutator>,
    scratch: &mut [u8; KEY_SCRATCH_LEN],
) -> Result<(), EncodeError> {
    let Some(mutator) = mutator else {
        return json.key(key);
    };
    if mutator.supports_slice() {
        return json.key(mutator.slice(key));
    }

    let mut size = key.len().max(1);
    loop {
        if size <= KEY_SCRATCH_LEN {
            if let Some(n) = mutator.try_mutate(key, &mut scratch[..size]) {
                return json.key(&String::from_utf8_lossy(&scratch[..n]));
            }
        } else {
            let mut buf = vec![0u8; size];
            if let Some(n) = mutator.try_mutate(key, &mut buf) {
                return json.key(&String::from_utf8_lossy(&buf[..n]));
            }
        }
        size *= 2;
    }
}

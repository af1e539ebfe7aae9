use std::io;

use serde::Serialize;

use crate::error::EncodeError;
use crate::names::JsonText;

/// Byte-oriented output used by the encoder.
///
/// Implementations hand out writable regions and are told how much of
/// each region was actually used. The encoder never flushes; whatever
/// owns the writer decides where committed bytes ultimately go.
pub trait BufferWriter {
    /// Returns a writable region of at least one byte, preferably
    /// `size_hint` bytes. May return a larger region.
    fn request(&mut self, size_hint: usize) -> io::Result<&mut [u8]>;

    /// Marks the first `written` bytes of the last requested region as
    /// used. Must follow a `request` call.
    fn commit(&mut self, written: usize);
}

/// Growable in-memory [`BufferWriter`] backed by a `Vec<u8>`.
///
/// `clear` drops the content but keeps the allocation, so one instance
/// can serve many records without reallocating.
#[derive(Debug, Default)]
pub struct VecWriter {
    buf: Vec<u8>,
    len: usize,
}

const MIN_REGION: usize = 64;

impl VecWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl BufferWriter for VecWriter {
    fn request(&mut self, size_hint: usize) -> io::Result<&mut [u8]> {
        let need = self.len + size_hint.max(MIN_REGION);
        if self.buf.len() < need {
            self.buf.resize(need, 0);
        }
        Ok(&mut self.buf[self.len..])
    }

    fn commit(&mut self, written: usize) {
        self.len += written;
    }
}

/// `io::Write` view over a [`BufferWriter`] so `serde_json` can
/// serialize values straight into it, keeping the byte count current.
struct CountingWrite<'w> {
    out: &'w mut dyn BufferWriter,
    written: &'w mut usize,
}

impl io::Write for CountingWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let region = self.out.request(buf.len())?;
        if region.is_empty() {
            return Err(io::ErrorKind::WriteZero.into());
        }
        let n = region.len().min(buf.len());
        region[..n].copy_from_slice(&buf[..n]);
        self.out.commit(n);
        *self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Low-level JSON emitter over a [`BufferWriter`].
///
/// Tracks comma placement per open object; keys and values are
/// separate calls so pre-encoded names, mutated names and serialized
/// values all share one path. The additional-fields hook receives this
/// type directly, so key/value methods are public. Keys are not
/// deduplicated; writing a key twice produces a duplicate member.
pub struct JsonWriter<'a> {
    out: &'a mut dyn BufferWriter,
    written: usize,
    // one entry per open object: true once it has a member
    members: Vec<bool>,
}

impl<'a> JsonWriter<'a> {
    pub(crate) fn new(out: &'a mut dyn BufferWriter) -> Self {
        Self { out, written: 0, members: Vec::new() }
    }

    /// Bytes committed so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn finish(self) -> usize {
        self.written
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        let mut rest = bytes;
        while !rest.is_empty() {
            let region = self.out.request(rest.len())?;
            if region.is_empty() {
                return Err(EncodeError::Writer(io::ErrorKind::WriteZero.into()));
            }
            let n = region.len().min(rest.len());
            region[..n].copy_from_slice(&rest[..n]);
            self.out.commit(n);
            self.written += n;
            rest = &rest[n..];
        }
        Ok(())
    }

    /// Starts an object in value position.
    pub fn begin_object(&mut self) -> Result<(), EncodeError> {
        self.write_raw(b"{")?;
        self.members.push(false);
        Ok(())
    }

    /// Closes the innermost open object.
    pub fn end_object(&mut self) -> Result<(), EncodeError> {
        self.members.pop();
        self.write_raw(b"}")
    }

    fn member_separator(&mut self) -> Result<(), EncodeError> {
        let needs_comma = match self.members.last_mut() {
            Some(has_member) => std::mem::replace(has_member, true),
            None => false,
        };
        if needs_comma {
            self.write_raw(b",")?;
        }
        Ok(())
    }

    /// Writes a member key, escaping it.
    pub fn key(&mut self, name: &str) -> Result<(), EncodeError> {
        self.member_separator()?;
        self.serialize(&name)?;
        self.write_raw(b":")
    }

    /// Writes a pre-encoded member key.
    pub fn key_encoded(&mut self, name: &JsonText) -> Result<(), EncodeError> {
        self.member_separator()?;
        self.write_raw(name.as_bytes())?;
        self.write_raw(b":")
    }

    /// Serializes `value` in value position. Must follow a key call
    /// inside an object.
    pub fn value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.serialize(value)
    }

    /// Writes a pre-encoded token in value position.
    pub fn value_encoded(&mut self, value: &JsonText) -> Result<(), EncodeError> {
        self.write_raw(value.as_bytes())
    }

    pub fn string_value(&mut self, value: &str) -> Result<(), EncodeError> {
        self.serialize(&value)
    }

    pub fn null_value(&mut self) -> Result<(), EncodeError> {
        self.write_raw(b"null")
    }

    /// Convenience for hooks: key plus serialized value in one call.
    pub fn entry<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), EncodeError> {
        self.key(name)?;
        self.value(value)
    }

    fn serialize<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        let sink = CountingWrite { out: &mut *self.out, written: &mut self.written };
        serde_json::to_writer(sink, value).map_err(EncodeError::from_json)
    }
}

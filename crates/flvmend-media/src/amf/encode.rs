//! AMF0 encoder.

use super::{marker, Value};
use crate::{Error, Result};
use bytes::BufMut;

/// Append-style AMF0 encoder.
///
/// Encoding is deterministic: mapping pairs are written in their stored
/// order, and a `Number` always costs 1 + 8 bytes. The metadata
/// synthesizer relies on this when it measures a document once and then
/// patches only numeric array elements.
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    /// Create an empty encoder.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Append one value.
    pub fn encode(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Number(n) => {
                self.buf.put_u8(marker::NUMBER);
                self.buf.put_f64(*n);
            }
            Value::Boolean(b) => {
                self.buf.put_u8(marker::BOOLEAN);
                self.buf.put_u8(u8::from(*b));
            }
            Value::String(s) => {
                if s.len() <= u16::MAX as usize {
                    self.buf.put_u8(marker::STRING);
                    self.buf.put_u16(s.len() as u16);
                } else if s.len() <= u32::MAX as usize {
                    self.buf.put_u8(marker::LONG_STRING);
                    self.buf.put_u32(s.len() as u32);
                } else {
                    return Err(Error::unsupported("string exceeds AMF0 long-string limit"));
                }
                self.buf.put_slice(s.as_bytes());
            }
            Value::Object(pairs) => {
                self.buf.put_u8(marker::OBJECT);
                self.put_pairs(pairs)?;
            }
            Value::EcmaArray(pairs) => {
                self.buf.put_u8(marker::ECMA_ARRAY);
                self.buf.put_u32(pairs.len() as u32);
                self.put_pairs(pairs)?;
            }
            Value::StrictArray(items) => {
                if items.len() > u32::MAX as usize {
                    return Err(Error::unsupported("strict array exceeds u32 length"));
                }
                self.buf.put_u8(marker::STRICT_ARRAY);
                self.buf.put_u32(items.len() as u32);
                for item in items {
                    self.encode(item)?;
                }
            }
            Value::Date { unix_ms, timezone } => {
                self.buf.put_u8(marker::DATE);
                self.buf.put_f64(*unix_ms);
                self.buf.put_i16(*timezone);
            }
            Value::Null => self.buf.put_u8(marker::NULL),
            Value::Undefined => self.buf.put_u8(marker::UNDEFINED),
        }
        Ok(())
    }

    /// Finish and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn put_pairs(&mut self, pairs: &[(String, Value)]) -> Result<()> {
        for (key, value) in pairs {
            if key.len() > u16::MAX as usize {
                return Err(Error::unsupported("mapping key exceeds u16 length"));
            }
            self.buf.put_u16(key.len() as u16);
            self.buf.put_slice(key.as_bytes());
            self.encode(value)?;
        }
        // Terminator: empty key + end marker.
        self.buf.put_u16(0);
        self.buf.put_u8(marker::OBJECT_END);
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a single value to a fresh buffer.
pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    let mut enc = Encoder::new();
    enc.encode(value)?;
    Ok(enc.into_bytes())
}

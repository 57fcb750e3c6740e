//! AMF0 decoder.

use super::{marker, Value};
use crate::{Error, Result};
use bytes::Buf;

/// Stateful AMF0 cursor over a byte slice.
///
/// Each [`Decoder::decode_next`] call consumes one top-level value; a
/// script tag body is typically the event-name string followed by the
/// event's value.
pub struct Decoder<'a> {
    buf: &'a [u8],
    consumed: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, consumed: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Decode the next top-level value.
    pub fn decode_next(&mut self) -> Result<Value> {
        let m = self.take_u8()?;
        match m {
            marker::NUMBER => Ok(Value::Number(self.take_f64()?)),
            marker::BOOLEAN => Ok(Value::Boolean(self.take_u8()? != 0)),
            marker::STRING => Ok(Value::String(self.take_short_string()?)),
            marker::LONG_STRING => {
                let len = self.take_u32()? as usize;
                Ok(Value::String(self.take_utf8(len)?))
            }
            marker::OBJECT => Ok(Value::Object(self.take_pairs()?)),
            marker::ECMA_ARRAY => {
                // The count is advisory; encoders routinely write 0. The
                // terminator is authoritative.
                let _count = self.take_u32()?;
                Ok(Value::EcmaArray(self.take_pairs()?))
            }
            marker::STRICT_ARRAY => {
                let count = self.take_u32()? as usize;
                // Every element costs at least a marker byte.
                if count > self.remaining() {
                    return Err(Error::invalid_amf(format!(
                        "strict array claims {} elements with {} bytes left",
                        count,
                        self.remaining()
                    )));
                }
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.decode_next()?);
                }
                Ok(Value::StrictArray(items))
            }
            marker::DATE => {
                let unix_ms = self.take_f64()?;
                let timezone = self.take_i16()?;
                Ok(Value::Date { unix_ms, timezone })
            }
            marker::NULL => Ok(Value::Null),
            marker::UNDEFINED => Ok(Value::Undefined),
            other => Err(Error::UnknownMarker {
                marker: other,
                at: self.consumed - 1,
            }),
        }
    }

    /// Key/value pairs terminated by an empty key + end marker.
    fn take_pairs(&mut self) -> Result<Vec<(String, Value)>> {
        let mut pairs = Vec::new();
        loop {
            let key = self.take_short_string()?;
            if key.is_empty() {
                let end = self.take_u8()?;
                if end != marker::OBJECT_END {
                    return Err(Error::invalid_amf(format!(
                        "expected object end marker, found 0x{:02x}",
                        end
                    )));
                }
                return Ok(pairs);
            }
            let value = self.decode_next()?;
            pairs.push((key, value));
        }
    }

    fn take_short_string(&mut self) -> Result<String> {
        let len = self.take_u16()? as usize;
        self.take_utf8(len)
    }

    fn take_utf8(&mut self, len: usize) -> Result<String> {
        self.need(len)?;
        let bytes = self.buf[..len].to_vec();
        self.buf.advance(len);
        self.consumed += len;
        String::from_utf8(bytes).map_err(|e| Error::invalid_amf(format!("bad UTF-8 string: {}", e)))
    }

    fn take_u8(&mut self) -> Result<u8> {
        self.need(1)?;
        self.consumed += 1;
        Ok(self.buf.get_u8())
    }

    fn take_u16(&mut self) -> Result<u16> {
        self.need(2)?;
        self.consumed += 2;
        Ok(self.buf.get_u16())
    }

    fn take_i16(&mut self) -> Result<i16> {
        self.need(2)?;
        self.consumed += 2;
        Ok(self.buf.get_i16())
    }

    fn take_u32(&mut self) -> Result<u32> {
        self.need(4)?;
        self.consumed += 4;
        Ok(self.buf.get_u32())
    }

    fn take_f64(&mut self) -> Result<f64> {
        self.need(8)?;
        self.consumed += 8;
        Ok(self.buf.get_f64())
    }

    fn need(&self, n: usize) -> Result<()> {
        if self.buf.remaining() < n {
            return Err(Error::BufferUnderflow {
                need: n,
                have: self.buf.remaining(),
            });
        }
        Ok(())
    }
}

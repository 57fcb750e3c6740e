//! AMF0 value model, decoder, and encoder.
//!
//! Only the value kinds that appear in FLV script tags are modeled:
//! numbers, booleans, strings, dates, strict arrays, and the two wire
//! forms of a keyed mapping (object and ECMA array). Mappings preserve
//! insertion order, so encoding is deterministic.

mod decode;
mod encode;
mod value;

pub use decode::Decoder;
pub use encode::{encode_value, Encoder};
pub use value::Value;

/// AMF0 type markers.
pub(crate) mod marker {
    pub const NUMBER: u8 = 0x00;
    pub const BOOLEAN: u8 = 0x01;
    pub const STRING: u8 = 0x02;
    pub const OBJECT: u8 = 0x03;
    pub const NULL: u8 = 0x05;
    pub const UNDEFINED: u8 = 0x06;
    pub const ECMA_ARRAY: u8 = 0x08;
    pub const OBJECT_END: u8 = 0x09;
    pub const STRICT_ARRAY: u8 = 0x0A;
    pub const DATE: u8 = 0x0B;
    pub const LONG_STRING: u8 = 0x0C;
}

//! Value payloads: boolean, number (tagged), and string (with FSST
//! compression flag). Encoding per §4.3 "Payload encodings".

use std::io::{Read, Write};
use std::sync::Arc;

use crate::error::{NodeError, Result};
use crate::varint::{decode_signed, read_signed_at, write_signed};

/// Construction of FSST symbol tables is out of scope for the node layer
/// (§1); this trait is the reference-only contract a bound page exposes so
/// a proxy can decompress a string payload it did not itself compress.
pub trait FsstSymbolTable: Send + Sync {
    fn decode(&self, compressed: &[u8]) -> Vec<u8>;
}

/// Identity table for callers with no real FSST table wired up yet — every
/// byte is passed through unchanged. Never set `isCompressed=1` against
/// this table outside of tests; it does not actually implement FSST.
#[derive(Debug, Default)]
pub struct IdentitySymbolTable;

impl FsstSymbolTable for IdentitySymbolTable {
    fn decode(&self, compressed: &[u8]) -> Vec<u8> {
        compressed.to_vec()
    }
}

// ── Number payload ──────────────────────────────────────────────────

/// Tagged number value. Encoding picks the narrowest faithful tag.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    BigDecimal { scale: i32, unscaled: Vec<u8> },
    BigInteger(Vec<u8>),
}

impl NumberValue {
    fn type_tag(&self) -> u8 {
        match self {
            NumberValue::Int(_) => 0,
            NumberValue::Long(_) => 1,
            NumberValue::Float(_) => 2,
            NumberValue::Double(_) => 3,
            NumberValue::BigDecimal { .. } => 4,
            NumberValue::BigInteger(_) => 5,
        }
    }

    pub fn encode<W: Write>(&self, sink: &mut W) -> Result<usize> {
        let mut n = 1;
        sink.write_all(&[self.type_tag()])?;
        match self {
            NumberValue::Int(v) => n += write_signed(sink, *v)?,
            NumberValue::Long(v) => {
                n += crate::varint::write_signed_long(sink, *v)?;
            }
            NumberValue::Float(v) => {
                sink.write_all(&v.to_bits().to_le_bytes())?;
                n += 4;
            }
            NumberValue::Double(v) => {
                sink.write_all(&v.to_bits().to_le_bytes())?;
                n += 8;
            }
            NumberValue::BigDecimal { scale, unscaled } => {
                n += write_signed(sink, *scale)?;
                n += write_signed(sink, unscaled.len() as i32)?;
                sink.write_all(unscaled)?;
                n += unscaled.len();
            }
            NumberValue::BigInteger(bytes) => {
                n += write_signed(sink, bytes.len() as i32)?;
                sink.write_all(bytes)?;
                n += bytes.len();
            }
        }
        Ok(n)
    }

    pub fn decode<R: Read>(source: &mut R) -> Result<Self> {
        let mut tag_buf = [0u8; 1];
        source.read_exact(&mut tag_buf)?;
        match tag_buf[0] {
            0 => Ok(NumberValue::Int(decode_signed(source)?)),
            1 => Ok(NumberValue::Long(crate::varint::decode_signed_long(
                source,
            )?)),
            2 => {
                let mut buf = [0u8; 4];
                source.read_exact(&mut buf)?;
                Ok(NumberValue::Float(f32::from_bits(u32::from_le_bytes(buf))))
            }
            3 => {
                let mut buf = [0u8; 8];
                source.read_exact(&mut buf)?;
                Ok(NumberValue::Double(f64::from_bits(u64::from_le_bytes(buf))))
            }
            4 => {
                let scale = decode_signed(source)?;
                let len = decode_signed(source)? as usize;
                let mut unscaled = vec![0u8; len];
                source.read_exact(&mut unscaled)?;
                Ok(NumberValue::BigDecimal { scale, unscaled })
            }
            5 => {
                let len = decode_signed(source)? as usize;
                let mut bytes = vec![0u8; len];
                source.read_exact(&mut bytes)?;
                Ok(NumberValue::BigInteger(bytes))
            }
            other => Err(NodeError::UnknownNumberType(other)),
        }
    }

    /// Encoded byte width, used by the serializer to size the payload and
    /// by the in-place width check (§4.5) when the payload is a fixed-shape
    /// numeric kind (Int/Long/Float/Double never change width across
    /// same-variant updates; BigDecimal/BigInteger generally do).
    pub fn encoded_width(&self) -> usize {
        let mut buf = Vec::new();
        self.encode(&mut buf).expect("in-memory sink is infallible");
        buf.len()
    }
}

// ── String payload ──────────────────────────────────────────────────

/// String payload: a compression flag plus either raw UTF-8 bytes or
/// FSST-encoded bytes. The symbol table (when compressed) is owned by the
/// enclosing page, never stored per record.
#[derive(Debug, Clone, PartialEq)]
pub struct StringPayload {
    pub compressed: bool,
    pub bytes: Vec<u8>,
}

impl StringPayload {
    pub fn plain(s: impl Into<Vec<u8>>) -> Self {
        Self {
            compressed: false,
            bytes: s.into(),
        }
    }

    pub fn encode<W: Write>(&self, sink: &mut W) -> Result<usize> {
        let mut n = 1;
        sink.write_all(&[self.compressed as u8])?;
        n += write_signed(sink, self.bytes.len() as i32)?;
        sink.write_all(&self.bytes)?;
        n += self.bytes.len();
        Ok(n)
    }

    pub fn decode<R: Read>(source: &mut R) -> Result<Self> {
        let mut flag = [0u8; 1];
        source.read_exact(&mut flag)?;
        let len = decode_signed(source)? as usize;
        let mut bytes = vec![0u8; len];
        source.read_exact(&mut bytes)?;
        Ok(Self {
            compressed: flag[0] != 0,
            bytes,
        })
    }

    /// Decompress using the page's FSST table if `compressed`; otherwise the
    /// raw bytes already are the logical value.
    pub fn resolve(&self, table: Option<&Arc<dyn FsstSymbolTable>>) -> Vec<u8> {
        if self.compressed {
            match table {
                Some(t) => t.decode(&self.bytes),
                None => self.bytes.clone(),
            }
        } else {
            self.bytes.clone()
        }
    }

    pub fn encoded_width(&self) -> usize {
        1 + crate::varint::compute_signed_encoded_width(self.bytes.len() as i32)
            + self.bytes.len()
    }
}

// ── Node payload (the kind-specific field in the record, §4.3) ────────

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Boolean(bool),
    Null,
    Number(NumberValue),
    String(StringPayload),
}

impl NodeValue {
    pub fn encode<W: Write>(&self, sink: &mut W) -> Result<usize> {
        match self {
            NodeValue::Boolean(b) => {
                sink.write_all(&[*b as u8])?;
                Ok(1)
            }
            NodeValue::Null => Ok(0),
            NodeValue::Number(n) => n.encode(sink),
            NodeValue::String(s) => s.encode(sink),
        }
    }

    pub fn encoded_width(&self) -> usize {
        match self {
            NodeValue::Boolean(_) => 1,
            NodeValue::Null => 0,
            NodeValue::Number(n) => n.encoded_width(),
            NodeValue::String(s) => s.encoded_width(),
        }
    }
}

/// Random-access width of a boolean payload at `offset` (always 1).
pub fn boolean_payload_width(_segment: &[u8], _offset: usize) -> usize {
    1
}

/// Random-access width of a number payload at `offset`, without allocating.
pub fn number_payload_width(segment: &[u8], offset: usize) -> Result<usize> {
    let tag = *segment
        .get(offset)
        .ok_or(NodeError::TruncatedRecord {
            offset,
            expected: 1,
        })?;
    let body_start = offset + 1;
    let width = match tag {
        0 => crate::varint::read_signed_varint_width(segment, body_start)?,
        1 => crate::varint::read_delta_encoded_width(segment, body_start)?,
        2 => 4,
        3 => 8,
        4 => {
            let (_, scale_w) = read_signed_at(segment, body_start)?;
            let (len, len_w) = read_signed_at(segment, body_start + scale_w)?;
            scale_w + len_w + len as usize
        }
        5 => {
            let (len, len_w) = read_signed_at(segment, body_start)?;
            len_w + len as usize
        }
        other => return Err(NodeError::UnknownNumberType(other)),
    };
    Ok(1 + width)
}

/*
    Copyright (C) 2025 fieryhenry

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use binrw::{BinRead, BinReaderExt};
use log::warn;

use crate::error::{Error, Result};
use crate::stream::ByteCursor;
use crate::string_pool::StringPool;
use crate::table::ResId;

/// The wire form of a typed value record: `{ size, res0, type, data }`.
/// Records larger than 8 bytes carry forward-compat trailing bytes that the
/// reader discards.
#[derive(Debug, PartialEq, Clone, Copy, BinRead)]
pub struct RawValue {
    /// Number of bytes in this structure.
    pub size: u16,
    /// Always set to 0.
    pub res0: u8,
    pub data: RawValueData,
}

impl RawValue {
    /// Read one record, skipping any declared trailing bytes.
    pub fn read(cursor: &mut ByteCursor, strict: bool) -> Result<Self> {
        let pos = cursor.pos();
        let value: RawValue = cursor
            .inner_mut()
            .read_le()
            .map_err(|e| Error::malformed(pos, e))?;

        if value.size < 8 {
            if strict {
                return Err(Error::malformed(
                    pos,
                    format!("value record declares {} bytes, expected at least 8", value.size),
                ));
            }
            warn!("value record at {pos:#x} declares {} bytes", value.size);
        } else if value.size > 8 {
            cursor.skip(value.size as u64 - 8);
        }

        Ok(value)
    }
}

/// The `data` word of a value record, interpreted according to the type
/// byte that precedes it.
#[derive(Debug, PartialEq, Clone, Copy, BinRead)]
pub enum RawValueData {
    /// 0 means undefined, 1 means explicitly empty.
    #[br(magic(0x00u8))]
    Null(u32),
    /// A reference to another resource table entry.
    #[br(magic(0x01u8))]
    Reference(u32),
    /// An attribute resource identifier.
    #[br(magic(0x02u8))]
    Attribute(u32),
    /// An index into the containing table's value string pool.
    #[br(magic(0x03u8))]
    String(u32),
    /// A single-precision floating point number.
    #[br(magic(0x04u8))]
    Float(f32),
    /// A complex number encoding a dimension value, such as "100in".
    #[br(magic(0x05u8))]
    Dimension(u32),
    /// A complex number encoding a fraction of a container.
    #[br(magic(0x06u8))]
    Fraction(u32),
    /// A reference that must be resolved through the dynamic package map
    /// before use.
    #[br(magic(0x07u8))]
    DynamicReference(u32),
    /// An attribute identifier that must be resolved dynamically.
    #[br(magic(0x08u8))]
    DynamicAttribute(u32),
    /// A raw integer of the form n..n.
    #[br(magic(0x10u8))]
    IntDec(u32),
    /// A raw integer of the form 0xn..n.
    #[br(magic(0x11u8))]
    IntHex(u32),
    /// 0 or non-zero, for "false" or "true".
    #[br(magic(0x12u8))]
    IntBoolean(u32),
    /// #aarrggbb
    #[br(magic(0x1cu8))]
    ColorArgb8(u32),
    /// #rrggbb
    #[br(magic(0x1du8))]
    ColorRgb8(u32),
    /// #argb
    #[br(magic(0x1eu8))]
    ColorArgb4(u32),
    /// #rgb
    #[br(magic(0x1fu8))]
    ColorRgb4(u32),
    /// Forward compat: keep unknown type codes as raw words.
    Unknown { data_type: u8, data: u32 },
}

const RADIX_MULTS: [f32; 4] = [
    1.0 / (1 << 8) as f32,
    1.0 / (1 << 15) as f32,
    1.0 / (1 << 23) as f32,
    1.0 / (1u64 << 31) as f32,
];

/// Split a packed complex word into its float magnitude: a signed 24-bit
/// mantissa scaled by the radix selected in bits 4-5.
pub fn complex_to_f32(data: u32) -> f32 {
    let mantissa = (data & 0xffff_ff00) as i32;
    mantissa as f32 * RADIX_MULTS[((data >> 4) & 0x3) as usize]
}

pub fn dimension_unit(data: u32) -> &'static str {
    match data & 0xf {
        0 => "px",
        1 => "dip",
        2 => "sp",
        3 => "pt",
        4 => "in",
        5 => "mm",
        _ => "px",
    }
}

pub fn fraction_unit(data: u32) -> &'static str {
    match data & 0xf {
        0 => "%",
        _ => "%p",
    }
}

/// Format a float the way the resource compiler prints it back: always with
/// a decimal point.
pub fn format_float(value: f32) -> String {
    format!("{value:?}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Argb8(u32),
    Rgb8(u32),
    Argb4(u32),
    Rgb4(u32),
}

impl Color {
    pub fn format(&self) -> String {
        match self {
            Color::Argb8(v) => format!("#{v:08x}"),
            Color::Rgb8(v) => format!("#{:06x}", v & 0x00ff_ffff),
            Color::Argb4(v) => format!(
                "#{:x}{:x}{:x}{:x}",
                (v >> 28) & 0xf,
                (v >> 20) & 0xf,
                (v >> 12) & 0xf,
                (v >> 4) & 0xf
            ),
            Color::Rgb4(v) => {
                format!("#{:x}{:x}{:x}", (v >> 20) & 0xf, (v >> 12) & 0xf, (v >> 4) & 0xf)
            }
        }
    }
}

/// A style span resolved against the pool: the tag string plus the
/// character range it wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub tag: String,
    pub first_char: u32,
    pub last_char: u32,
}

/// One name/value pair of a complex (bag) entry.
pub type BagItem = (ResId, Value);

/// A compound value: style, array or plurals. Child order is preserved from
/// the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Bag {
    pub parent: ResId,
    pub items: Vec<BagItem>,
}

/// The decoded, semantic form of a resource value. The emitter dispatches
/// exhaustively over this.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Empty,
    Reference(ResId),
    Attribute(ResId),
    String(String),
    StyledString {
        text: String,
        spans: Vec<ResolvedSpan>,
    },
    /// A pool string naming a file inside the package, emitted as a file
    /// rather than a values entry.
    FileRef(String),
    Float(f32),
    Dimension(u32),
    Fraction(u32),
    IntDec(i32),
    IntHex(u32),
    Bool(bool),
    Color(Color),
    /// Unknown type code carried through untouched.
    Raw { data_type: u8, data: u32 },
    Bag(Bag),
}

impl Value {
    /// Decode a wire record against the table's value string pool.
    pub fn from_raw(raw: &RawValue, pool: &StringPool, strict: bool) -> Result<Value> {
        Ok(match raw.data {
            RawValueData::Null(0) => Value::Null,
            RawValueData::Null(_) => Value::Empty,
            RawValueData::Reference(id) | RawValueData::DynamicReference(id) => {
                Value::Reference(ResId(id))
            }
            RawValueData::Attribute(id) | RawValueData::DynamicAttribute(id) => {
                Value::Attribute(ResId(id))
            }
            RawValueData::String(index) => {
                let text = pool.get_checked(index, strict)?.to_owned();
                let spans = pool.spans(index);
                if !spans.is_empty() {
                    let spans = spans
                        .iter()
                        .map(|s| {
                            Ok(ResolvedSpan {
                                tag: pool.get_checked(s.name, strict)?.to_owned(),
                                first_char: s.first_char,
                                last_char: s.last_char,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Value::StyledString { text, spans }
                } else if is_file_path(&text) {
                    Value::FileRef(text)
                } else {
                    Value::String(text)
                }
            }
            RawValueData::Float(f) => Value::Float(f),
            RawValueData::Dimension(d) => Value::Dimension(d),
            RawValueData::Fraction(d) => Value::Fraction(d),
            RawValueData::IntDec(v) => Value::IntDec(v as i32),
            RawValueData::IntHex(v) => Value::IntHex(v),
            RawValueData::IntBoolean(v) => Value::Bool(v != 0),
            RawValueData::ColorArgb8(v) => Value::Color(Color::Argb8(v)),
            RawValueData::ColorRgb8(v) => Value::Color(Color::Rgb8(v)),
            RawValueData::ColorArgb4(v) => Value::Color(Color::Argb4(v)),
            RawValueData::ColorRgb4(v) => Value::Color(Color::Rgb4(v)),
            RawValueData::Unknown { data_type, data } => Value::Raw { data_type, data },
        })
    }

    /// Values emitted as files under `res/` rather than inside a values
    /// document.
    pub fn is_file(&self) -> bool {
        matches!(self, Value::FileRef(_))
    }
}

fn is_file_path(text: &str) -> bool {
    text.starts_with("res/") || text.starts_with("r/") || text.starts_with("R/")
}

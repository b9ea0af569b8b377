use log::warn;

use crate::error::{Error, Result};
use crate::stream::{ByteCursor, ChunkHeader};

/// If set, the string index is sorted by the string values.
pub const FLAG_SORTED: u32 = 1 << 0;
/// String pool is encoded in UTF-8.
pub const FLAG_UTF8: u32 = 1 << 8;

/// End marker for a span array.
const SPAN_END: u32 = 0xffff_ffff;

/// A span of style information associated with a string in the pool. The
/// name references the pool string naming the XML tag that defined it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleSpan {
    pub name: u32,
    /// The first character in the string that this span applies to.
    pub first_char: u32,
    /// The last character in the string that this span applies to.
    pub last_char: u32,
}

/// A set of strings that can be referenced by index.
///
/// The chunk data is an array of offsets into the pool, relative to
/// `strings_start`; at `strings_start` the UTF-8 or UTF-16 strings are
/// concatenated. A non-zero style count adds a second offset array into a
/// style table at `styles_start`, where each entry is an array of spans
/// terminated by 0xffffffff.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringPool {
    flags: u32,
    strings: Vec<String>,
    styles: Vec<Vec<StyleSpan>>,
}

impl StringPool {
    /// Parse a string pool chunk. The cursor must be positioned right after
    /// the generic chunk header of `header`; it is left at the chunk end.
    pub fn parse(cursor: &mut ByteCursor, header: &ChunkHeader, strict: bool) -> Result<Self> {
        let string_count = cursor.read_u32()?;
        let style_count = cursor.read_u32()?;
        let flags = cursor.read_u32()?;
        let strings_start = cursor.read_u32()?;
        let styles_start = cursor.read_u32()?;

        let available = header.end().saturating_sub(cursor.pos());
        if (string_count as u64 + style_count as u64) * 4 > available {
            return Err(Error::TruncatedChunk {
                pos: header.start,
                declared: (string_count as u64 + style_count as u64) * 4,
                available,
            });
        }

        let mut string_offsets = Vec::with_capacity(string_count as usize);
        for _ in 0..string_count {
            string_offsets.push(cursor.read_u32()?);
        }
        let mut style_offsets = Vec::with_capacity(style_count as usize);
        for _ in 0..style_count {
            style_offsets.push(cursor.read_u32()?);
        }

        let utf8 = flags & FLAG_UTF8 != 0;
        let data_base = header.start + strings_start as u64;

        let mut strings = Vec::with_capacity(string_count as usize);
        for offset in string_offsets {
            cursor.seek_to(data_base + offset as u64);
            let string = if utf8 {
                read_utf8_entry(cursor, strict)?
            } else {
                read_utf16_entry(cursor, strict)?
            };
            strings.push(string);
        }

        let mut styles = Vec::with_capacity(style_offsets.len());
        let style_base = header.start + styles_start as u64;
        for offset in style_offsets {
            cursor.seek_to(style_base + offset as u64);
            styles.push(read_span_array(cursor)?);
        }

        cursor.seek_to(header.end());
        Ok(Self {
            flags,
            strings,
            styles,
        })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn is_utf8(&self) -> bool {
        self.flags & FLAG_UTF8 != 0
    }

    pub fn is_sorted(&self) -> bool {
        self.flags & FLAG_SORTED != 0
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(|s| s.as_str())
    }

    /// Lookup with the strict/lenient contract: out-of-range indices return
    /// the sentinel empty string, or fail in strict mode.
    pub fn get_checked(&self, index: u32, strict: bool) -> Result<&str> {
        match self.strings.get(index as usize) {
            Some(s) => Ok(s),
            None if strict => Err(Error::StringPoolIndexOutOfRange {
                index,
                count: self.strings.len() as u32,
            }),
            None => Ok(""),
        }
    }

    /// Style spans attached to the string at `index`, empty when the string
    /// carries no inline markup.
    pub fn spans(&self, index: u32) -> &[StyleSpan] {
        self.styles
            .get(index as usize)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}

/// UTF-8 entries carry two u8 lengths (character count, then byte count),
/// each extended to two bytes when the high bit is set, and a trailing null.
fn read_utf8_entry(cursor: &mut ByteCursor, strict: bool) -> Result<String> {
    let char_len = read_len8(cursor)?;
    let byte_len = read_len8(cursor)?;

    let pos = cursor.pos();
    let data = cursor.read_bytes(byte_len as usize)?;
    let string = match String::from_utf8(data) {
        Ok(s) => s,
        Err(e) if strict => return Err(Error::malformed(pos, e)),
        Err(e) => {
            warn!("invalid utf-8 string at {pos:#x}, replacing bad sequences");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let decoded_chars = string.chars().count() as u32;
    if decoded_chars != char_len {
        if strict {
            return Err(Error::malformed(
                pos,
                format!("string declares {char_len} characters but decodes to {decoded_chars}"),
            ));
        }
        warn!("string at {pos:#x} declares {char_len} characters, decoded {decoded_chars}");
    }

    Ok(string)
}

/// UTF-16 entries carry a u16 length, extended to two u16s when the high
/// bit is set, and a trailing u16 null.
fn read_utf16_entry(cursor: &mut ByteCursor, strict: bool) -> Result<String> {
    let len = read_len16(cursor)?;

    let pos = cursor.pos();
    let mut units = Vec::with_capacity(len as usize);
    for _ in 0..len {
        units.push(cursor.read_u16()?);
    }

    match String::from_utf16(&units) {
        Ok(s) => Ok(s),
        Err(e) if strict => Err(Error::malformed(pos, e)),
        Err(_) => {
            warn!("invalid utf-16 string at {pos:#x}, replacing bad sequences");
            Ok(String::from_utf16_lossy(&units))
        }
    }
}

fn read_len8(cursor: &mut ByteCursor) -> Result<u32> {
    let first = cursor.read_u8()?;
    if first & 0x80 == 0 {
        return Ok(first as u32);
    }
    let second = cursor.read_u8()?;
    Ok((((first as u32) & 0x7f) << 8) | second as u32)
}

fn read_len16(cursor: &mut ByteCursor) -> Result<u32> {
    let first = cursor.read_u16()?;
    if first & 0x8000 == 0 {
        return Ok(first as u32);
    }
    let second = cursor.read_u16()?;
    Ok((((first as u32) & 0x7fff) << 16) | second as u32)
}

fn read_span_array(cursor: &mut ByteCursor) -> Result<Vec<StyleSpan>> {
    let mut spans = Vec::new();
    loop {
        let name = cursor.read_u32()?;
        if name == SPAN_END {
            return Ok(spans);
        }
        spans.push(StyleSpan {
            name,
            first_char: cursor.read_u32()?,
            last_char: cursor.read_u32()?,
        });
    }
}

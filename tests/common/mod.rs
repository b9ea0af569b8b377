#![allow(dead_code)]

//! Byte-level builders assembling small resource tables for decoder tests.

pub struct Buf {
    data: Vec<u8>,
}

impl Buf {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn u8(&mut self, v: u8) {
        self.data.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn u32(&mut self, v: u32) {
        self.data.extend_from_slice(&v.to_le_bytes());
    }

    pub fn bytes(&mut self, b: &[u8]) {
        self.data.extend_from_slice(b);
    }

    pub fn pad4(&mut self) {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

fn push_len8(buf: &mut Buf, len: usize) {
    if len >= 0x80 {
        buf.u8(0x80 | (len >> 8) as u8);
        buf.u8((len & 0xff) as u8);
    } else {
        buf.u8(len as u8);
    }
}

fn push_len16(buf: &mut Buf, len: usize) {
    if len >= 0x8000 {
        buf.u16(0x8000 | (len >> 16) as u16);
        buf.u16((len & 0xffff) as u16);
    } else {
        buf.u16(len as u16);
    }
}

/// Build a complete string pool chunk. `styles` attach span arrays to the
/// first `styles.len()` strings; each span is `(name_index, first, last)`.
pub fn string_pool(strings: &[&str], utf8: bool, styles: &[Vec<(u32, u32, u32)>]) -> Vec<u8> {
    let mut data = Buf::new();
    let mut offsets = Vec::new();
    for s in strings {
        offsets.push(data.len() as u32);
        if utf8 {
            push_len8(&mut data, s.chars().count());
            push_len8(&mut data, s.len());
            data.bytes(s.as_bytes());
            data.u8(0);
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            push_len16(&mut data, units.len());
            for u in units {
                data.u16(u);
            }
            data.u16(0);
        }
    }
    data.pad4();

    let mut style_data = Buf::new();
    let mut style_offsets = Vec::new();
    for spans in styles {
        style_offsets.push(style_data.len() as u32);
        for (name, first, last) in spans {
            style_data.u32(*name);
            style_data.u32(*first);
            style_data.u32(*last);
        }
        style_data.u32(0xffff_ffff);
    }
    style_data.pad4();

    let strings_start = 28 + 4 * (strings.len() + styles.len()) as u32;
    let styles_start = if styles.is_empty() {
        0
    } else {
        strings_start + data.len() as u32
    };
    let size = strings_start + data.len() as u32 + style_data.len() as u32;

    let mut out = Buf::new();
    out.u16(0x0001);
    out.u16(28);
    out.u32(size);
    out.u32(strings.len() as u32);
    out.u32(styles.len() as u32);
    out.u32(if utf8 { 0x100 } else { 0 });
    out.u32(strings_start);
    out.u32(styles_start);
    for off in offsets {
        out.u32(off);
    }
    for off in style_offsets {
        out.u32(off);
    }
    out.bytes(data.as_slice());
    out.bytes(style_data.as_slice());
    out.into_vec()
}

/// A 28-byte all-zero (default) config block.
pub fn config_default() -> Vec<u8> {
    let mut out = Buf::new();
    out.u32(28);
    out.bytes(&[0; 24]);
    out.into_vec()
}

/// A 28-byte config selecting a two-letter language.
pub fn config_lang(lang: &str) -> Vec<u8> {
    let mut out = Buf::new();
    out.u32(28);
    out.u32(0); // mcc/mnc
    out.bytes(lang.as_bytes()); // language
    out.u16(0); // region
    out.bytes(&[0; 16]);
    out.into_vec()
}

pub fn type_spec_chunk(id: u8, flags: &[u32]) -> Vec<u8> {
    let mut out = Buf::new();
    out.u16(0x0202);
    out.u16(16);
    out.u32(16 + 4 * flags.len() as u32);
    out.u8(id);
    out.u8(0);
    out.u16(0);
    out.u32(flags.len() as u32);
    for f in flags {
        out.u32(*f);
    }
    out.into_vec()
}

pub enum TestValue {
    Simple(u8, u32),
    Bag {
        parent: u32,
        items: Vec<(u32, u8, u32)>,
    },
}

pub struct TestEntry {
    pub index: u16,
    pub key: u32,
    pub value: TestValue,
}

impl TestEntry {
    pub fn simple(index: u16, key: u32, data_type: u8, data: u32) -> Self {
        Self {
            index,
            key,
            value: TestValue::Simple(data_type, data),
        }
    }
}

/// Build a type chunk. For sparse chunks (`flags & 0x1`) `entry_count`
/// must equal `entries.len()`.
pub fn type_chunk(
    id: u8,
    flags: u8,
    entry_count: u32,
    config: &[u8],
    entries: &[TestEntry],
) -> Vec<u8> {
    let sparse = flags & 0x1 != 0;

    let mut bodies = Buf::new();
    let mut body_offsets = Vec::new();
    for e in entries {
        body_offsets.push((e.index, bodies.len() as u32));
        match &e.value {
            TestValue::Simple(data_type, data) => {
                bodies.u16(8);
                bodies.u16(0);
                bodies.u32(e.key);
                bodies.u16(8);
                bodies.u8(0);
                bodies.u8(*data_type);
                bodies.u32(*data);
            }
            TestValue::Bag { parent, items } => {
                bodies.u16(16);
                bodies.u16(0x0001);
                bodies.u32(e.key);
                bodies.u32(*parent);
                bodies.u32(items.len() as u32);
                for (name, data_type, data) in items {
                    bodies.u32(*name);
                    bodies.u16(8);
                    bodies.u8(0);
                    bodies.u8(*data_type);
                    bodies.u32(*data);
                }
            }
        }
    }

    let header_size = 20 + config.len() as u16;
    let table_len = if sparse {
        entries.len() as u32 * 4
    } else {
        entry_count * 4
    };
    let entries_start = header_size as u32 + table_len;
    let size = entries_start + bodies.len() as u32;

    let mut out = Buf::new();
    out.u16(0x0201);
    out.u16(header_size);
    out.u32(size);
    out.u8(id);
    out.u8(flags);
    out.u16(0);
    out.u32(entry_count);
    out.u32(entries_start);
    out.bytes(config);
    if sparse {
        for (index, offset) in &body_offsets {
            out.u16(*index);
            out.u16((*offset / 4) as u16);
        }
    } else {
        for i in 0..entry_count as u16 {
            match body_offsets.iter().find(|(index, _)| *index == i) {
                Some((_, offset)) => out.u32(*offset),
                None => out.u32(0xffff_ffff),
            }
        }
    }
    out.bytes(bodies.as_slice());
    out.into_vec()
}

pub fn package_chunk(
    id: u32,
    name: &str,
    type_pool: &[u8],
    key_pool: &[u8],
    inner: &[&[u8]],
) -> Vec<u8> {
    let type_off = 288u32;
    let key_off = type_off + type_pool.len() as u32;
    let inner_len: usize = inner.iter().map(|c| c.len()).sum();
    let size = key_off + key_pool.len() as u32 + inner_len as u32;

    let mut out = Buf::new();
    out.u16(0x0200);
    out.u16(288);
    out.u32(size);
    out.u32(id);
    let mut units: Vec<u16> = name.encode_utf16().collect();
    units.resize(128, 0);
    for u in units {
        out.u16(u);
    }
    out.u32(type_off);
    out.u32(0); // last_public_type
    out.u32(key_off);
    out.u32(0); // last_public_key
    out.u32(0); // type_id_offset
    out.bytes(type_pool);
    out.bytes(key_pool);
    for c in inner {
        out.bytes(c);
    }
    out.into_vec()
}

pub fn table_chunk(global_pool: &[u8], packages: &[&[u8]]) -> Vec<u8> {
    let package_len: usize = packages.iter().map(|p| p.len()).sum();
    let size = 12 + global_pool.len() + package_len;

    let mut out = Buf::new();
    out.u16(0x0002);
    out.u16(12);
    out.u32(size as u32);
    out.u32(packages.len() as u32);
    out.bytes(global_pool);
    for p in packages {
        out.bytes(p);
    }
    out.into_vec()
}

/// A one-package table: `com.example` with a single `string/app_name`
/// entry valued "Hello" in the default config.
pub fn minimal_table() -> Vec<u8> {
    let global = string_pool(&["Hello"], true, &[]);
    let type_pool = string_pool(&["string"], true, &[]);
    let key_pool = string_pool(&["app_name"], true, &[]);
    let spec = type_spec_chunk(1, &[0]);
    let entries = [TestEntry::simple(0, 0, 0x03, 0)];
    let typ = type_chunk(1, 0, 1, &config_default(), &entries);
    let pkg = package_chunk(0x7f, "com.example", &type_pool, &key_pool, &[&spec, &typ]);
    table_chunk(&global, &[&pkg])
}

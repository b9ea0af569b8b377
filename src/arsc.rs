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

use std::collections::HashSet;

use log::{info, warn};

use crate::config::ConfigFlags;
use crate::error::{Error, Result};
use crate::res_value::{Bag, RawValue, Value};
use crate::stream::{
    ByteCursor, ChunkHeader, RES_NULL_TYPE, RES_STRING_POOL_TYPE, RES_TABLE_LIBRARY_TYPE,
    RES_TABLE_OVERLAYABLE_POLICY_TYPE, RES_TABLE_OVERLAYABLE_TYPE, RES_TABLE_PACKAGE_TYPE,
    RES_TABLE_STAGED_ALIAS_TYPE, RES_TABLE_TYPE, RES_TABLE_TYPE_SPEC_TYPE, RES_TABLE_TYPE_TYPE,
};
use crate::string_pool::StringPool;
use crate::table::{
    LibraryEntry, Overlayable, OverlayablePolicy, ResId, ResPackage, ResResource, ResSpec,
    ResTable, ResTypeSpec, SpecOrigin, StagedAliasEntry,
};
use crate::DecodeOptions;

/// If set, this is a complex entry holding a set of name/value mappings.
pub const ENTRY_FLAG_COMPLEX: u16 = 0x0001;
/// If set, this resource has been declared public.
pub const ENTRY_FLAG_PUBLIC: u16 = 0x0002;
/// If set, this is a weak resource that may be overridden during linking.
pub const ENTRY_FLAG_WEAK: u16 = 0x0004;
/// If set, this is a compact entry with the value encoded inline.
pub const ENTRY_FLAG_COMPACT: u16 = 0x0008;

/// Type chunk encodes only present entries as (index, offset) pairs.
pub const TYPE_FLAG_SPARSE: u8 = 0x01;
/// Type chunk offsets are 16-bit, multiplied by 4.
pub const TYPE_FLAG_OFFSET16: u8 = 0x02;

const NO_ENTRY: u32 = 0xffff_ffff;
const NO_ENTRY16: u16 = 0xffff;

/// One type-spec flags region in the raw bytes: `count` u32 words starting
/// at `offset`. Surfaced for the publicizer, which patches these words in
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagsOffset {
    pub offset: u64,
    pub count: u32,
}

/// The result of one decode pass.
#[derive(Debug)]
pub struct ArscData {
    pub table: ResTable,
    pub flags_offsets: Vec<FlagsOffset>,
    /// Set when a cooperative cancel stopped the walk early (lenient mode).
    pub incomplete: bool,
    /// First error recovered from in lenient mode.
    pub first_error: Option<Error>,
}

impl ArscData {
    pub fn main_package(&self) -> Option<&ResPackage> {
        self.table.list_main_packages().first().copied()
    }
}

pub struct ArscDecoder;

impl ArscDecoder {
    /// Decode a full `resources.arsc` image.
    pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<ArscData> {
        Self::decode_cancellable(data, options, || false)
    }

    /// Decode with a cancellation predicate polled between chunks. On
    /// cancel, strict mode fails with `Cancelled` and lenient mode returns
    /// the partial table flagged incomplete.
    pub fn decode_cancellable(
        data: &[u8],
        options: &DecodeOptions,
        poll: impl Fn() -> bool,
    ) -> Result<ArscData> {
        Decoder {
            cursor: ByteCursor::new(data),
            options: *options,
            poll: &poll,
            flags_offsets: Vec::new(),
            first_error: None,
            incomplete: false,
        }
        .run()
    }
}

/// Decode a second arsc (a framework package) into an existing table as a
/// non-main package. Fails when the selected package does not carry the
/// expected id.
pub fn load_framework(
    table: &mut ResTable,
    data: &[u8],
    expected_id: u8,
    options: &DecodeOptions,
) -> Result<()> {
    info!("loading framework resource table for id {expected_id:#04x}");
    let decoded = ArscDecoder::decode(data, options)?;
    let pkg = decoded.table.into_main_package().ok_or(Error::NoPackages)?;
    if pkg.id != expected_id {
        return Err(Error::UnsupportedFeature {
            what: format!("expected package id {expected_id:#04x}, got {:#04x}", pkg.id),
        });
    }
    table.add_package(pkg, false)
}

struct Decoder<'a, 'p> {
    cursor: ByteCursor<'a>,
    options: DecodeOptions,
    poll: &'p dyn Fn() -> bool,
    flags_offsets: Vec<FlagsOffset>,
    first_error: Option<Error>,
    incomplete: bool,
}

impl Decoder<'_, '_> {
    fn strict(&self) -> bool {
        self.options.strict()
    }

    /// Keep going in lenient mode: log and remember the first failure.
    fn recover(&mut self, err: Error) {
        warn!("recovered from decode error: {err}");
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }

    /// Poll the cancellation predicate at a chunk boundary.
    fn cancelled(&mut self) -> Result<bool> {
        if !(self.poll)() {
            return Ok(false);
        }
        if self.strict() {
            return Err(Error::Cancelled);
        }
        warn!("decode cancelled, returning partial table");
        self.incomplete = true;
        Ok(true)
    }

    fn run(mut self) -> Result<ArscData> {
        let header = self.cursor.read_chunk_header()?;
        if header.type_id != RES_TABLE_TYPE {
            return Err(Error::UnknownChunkType {
                pos: header.start,
                type_id: header.type_id,
            });
        }
        let package_count = self.cursor.read_u32()?;
        self.cursor.seek_to(header.data_start());

        let mut global_pool = StringPool::default();
        let mut packages: Vec<ResPackage> = Vec::new();

        while self.cursor.pos() + 8 <= header.end() {
            if self.cancelled()? {
                break;
            }
            self.cursor.align4(self.strict())?;

            let chunk = match self.cursor.read_chunk_header() {
                Ok(chunk) => chunk,
                Err(err) if self.strict() => return Err(err),
                Err(err) => {
                    // No trustworthy size to skip by.
                    self.recover(err);
                    break;
                }
            };

            match chunk.type_id {
                RES_STRING_POOL_TYPE => {
                    let strict = self.strict();
                    match StringPool::parse(&mut self.cursor, &chunk, strict) {
                        Ok(pool) => global_pool = pool,
                        Err(err) if self.strict() => return Err(err),
                        Err(err) => self.recover(err),
                    }
                }
                RES_TABLE_PACKAGE_TYPE => {
                    match self.read_package(&chunk, &global_pool) {
                        Ok(pkg) => packages.push(pkg),
                        Err(err @ Error::DuplicateResource { .. }) => return Err(err),
                        Err(err) if self.strict() => return Err(err),
                        Err(err) => self.recover(err),
                    }
                }
                RES_NULL_TYPE => {}
                type_id => {
                    let err = Error::UnknownChunkType {
                        pos: chunk.start,
                        type_id,
                    };
                    if self.strict() {
                        return Err(err);
                    }
                    self.recover(err);
                }
            }
            self.cursor.seek_to(chunk.end());
        }

        if packages.len() != package_count as usize {
            warn!(
                "table declares {package_count} packages, decoded {}",
                packages.len()
            );
        }
        if packages.is_empty() && self.strict() {
            return Err(Error::NoPackages);
        }

        let main = select_main_package(&packages);
        let mut table = ResTable::new();
        table.analysis_mode = self.options.analysis_mode;
        for (index, pkg) in packages.into_iter().enumerate() {
            let is_main = Some(index) == main;
            match table.add_package(pkg, is_main) {
                Ok(()) => {}
                Err(err) if self.strict() => return Err(err),
                Err(err) => self.recover(err),
            }
        }

        Ok(ArscData {
            table,
            flags_offsets: self.flags_offsets,
            incomplete: self.incomplete,
            first_error: self.first_error,
        })
    }

    fn read_package(&mut self, chunk: &ChunkHeader, global_pool: &StringPool) -> Result<ResPackage> {
        let id32 = self.cursor.read_u32()?;
        let name = self.cursor.read_utf16_fixed(128)?;
        let type_strings = self.cursor.read_u32()?;
        let _last_public_type = self.cursor.read_u32()?;
        let key_strings = self.cursor.read_u32()?;
        let _last_public_key = self.cursor.read_u32()?;
        // Old tables end the header here.
        let type_id_offset = if chunk.header_size >= 288 {
            self.cursor.read_u32()?
        } else {
            0
        };

        if !self.options.shared_library && id32 != 0x7f && id32 != 0x01 {
            warn!("package \"{name}\" has non-standard id {id32:#x}");
        }

        let type_pool = self.read_pool_at(chunk, type_strings)?;
        let after_type_pool = self.cursor.pos();
        let key_pool = self.read_pool_at(chunk, key_strings)?;
        let after_key_pool = self.cursor.pos();

        let mut pkg = ResPackage::new(id32 as u8, name);
        let mut dense_types: HashSet<u8> = HashSet::new();

        // Inner chunks follow the two pools, whichever comes last.
        let resume = after_type_pool
            .max(after_key_pool)
            .max(chunk.data_start());
        self.cursor.seek_to(resume);

        while self.cursor.pos() + 8 <= chunk.end() {
            if self.cancelled()? {
                break;
            }
            self.cursor.align4(self.strict())?;

            let sub = match self.cursor.read_chunk_header() {
                Ok(sub) => sub,
                Err(err) if self.strict() => return Err(err),
                Err(err) => {
                    self.recover(err);
                    break;
                }
            };

            let result = match sub.type_id {
                RES_TABLE_TYPE_SPEC_TYPE => {
                    self.read_type_spec(&mut pkg, &sub, &type_pool, type_id_offset)
                }
                RES_TABLE_TYPE_TYPE => self.read_type(
                    &mut pkg,
                    &sub,
                    &type_pool,
                    &key_pool,
                    global_pool,
                    type_id_offset,
                    &mut dense_types,
                ),
                RES_TABLE_LIBRARY_TYPE => self.read_library(&mut pkg, &sub),
                RES_TABLE_STAGED_ALIAS_TYPE => self.read_staged_alias(&mut pkg, &sub),
                RES_TABLE_OVERLAYABLE_TYPE => self.read_overlayable(&mut pkg, &sub),
                RES_TABLE_OVERLAYABLE_POLICY_TYPE => {
                    warn!("overlayable policy chunk outside an overlayable at {:#x}", sub.start);
                    Ok(())
                }
                RES_NULL_TYPE => Ok(()),
                type_id => Err(Error::UnknownChunkType {
                    pos: sub.start,
                    type_id,
                }),
            };
            match result {
                Ok(()) => {}
                Err(err @ Error::DuplicateResource { .. }) => return Err(err),
                Err(err) if self.strict() => return Err(err),
                Err(err) => self.recover(err),
            }
            self.cursor.seek_to(sub.end());
        }

        self.synthesize_missing(&mut pkg, &dense_types);
        Ok(pkg)
    }

    fn read_pool_at(&mut self, chunk: &ChunkHeader, offset: u32) -> Result<StringPool> {
        if offset == 0 {
            return Ok(StringPool::default());
        }
        self.cursor.seek_to(chunk.start + offset as u64);
        let pool_chunk = self.cursor.read_chunk_header()?;
        if pool_chunk.type_id != RES_STRING_POOL_TYPE {
            return Err(Error::UnknownChunkType {
                pos: pool_chunk.start,
                type_id: pool_chunk.type_id,
            });
        }
        let strict = self.strict();
        StringPool::parse(&mut self.cursor, &pool_chunk, strict)
    }

    fn read_type_spec(
        &mut self,
        pkg: &mut ResPackage,
        chunk: &ChunkHeader,
        type_pool: &StringPool,
        type_id_offset: u32,
    ) -> Result<()> {
        let id = self.cursor.read_u8()?;
        if id == 0 {
            return Err(Error::UnknownTypeId { type_id: 0 });
        }
        let _res0 = self.cursor.read_u8()?;
        let _types_count = self.cursor.read_u16()?;
        let entry_count = self.cursor.read_u32()?;

        let available = chunk.end().saturating_sub(chunk.data_start());
        if entry_count as u64 * 4 > available {
            return Err(Error::TruncatedChunk {
                pos: chunk.start,
                declared: entry_count as u64 * 4,
                available,
            });
        }

        self.cursor.seek_to(chunk.data_start());
        self.flags_offsets.push(FlagsOffset {
            offset: self.cursor.pos(),
            count: entry_count,
        });

        let mut flags = Vec::with_capacity(entry_count as usize);
        for _ in 0..entry_count {
            flags.push(self.cursor.read_u32()?);
        }

        match pkg.type_spec_mut(id) {
            Some(existing) => existing.merge_flags(&flags),
            None => {
                let name = self.type_name(type_pool, id, type_id_offset)?;
                pkg.add_type_spec(ResTypeSpec::new(id, name, flags));
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn read_type(
        &mut self,
        pkg: &mut ResPackage,
        chunk: &ChunkHeader,
        type_pool: &StringPool,
        key_pool: &StringPool,
        global_pool: &StringPool,
        type_id_offset: u32,
        dense_types: &mut HashSet<u8>,
    ) -> Result<()> {
        let id = self.cursor.read_u8()?;
        if id == 0 {
            return Err(Error::UnknownTypeId { type_id: 0 });
        }
        let flags = self.cursor.read_u8()?;
        let _reserved = self.cursor.read_u16()?;
        let entry_count = self.cursor.read_u32()?;
        let entries_start = self.cursor.read_u32()?;
        let config = ConfigFlags::parse(&mut self.cursor, chunk.end())?;

        let sparse = flags & TYPE_FLAG_SPARSE != 0;
        let offset16 = flags & TYPE_FLAG_OFFSET16 != 0;
        if sparse && !self.options.sparse_resources {
            warn!("sparse type chunk at {:#x} without the sparse_resources hint", chunk.start);
        }

        let index_width: u64 = if sparse {
            4
        } else if offset16 {
            2
        } else {
            4
        };
        let available = chunk.end().saturating_sub(chunk.data_start());
        if entry_count as u64 * index_width > available {
            return Err(Error::TruncatedChunk {
                pos: chunk.start,
                declared: entry_count as u64 * index_width,
                available,
            });
        }

        if pkg.type_spec(id).is_none() {
            if self.strict() {
                return Err(Error::UnknownTypeId { type_id: id });
            }
            warn!("type chunk for id {id:#04x} without a type spec, creating one");
            let name = self.type_name(type_pool, id, type_id_offset)?;
            pkg.add_type_spec(ResTypeSpec::new(id, name, vec![0; entry_count as usize]));
        }

        self.cursor.seek_to(chunk.data_start());
        let mut present: Vec<(u16, u32)> = Vec::new();
        if sparse {
            for _ in 0..entry_count {
                let index = self.cursor.read_u16()?;
                let offset = self.cursor.read_u16()?;
                present.push((index, offset as u32 * 4));
            }
        } else {
            dense_types.insert(id);
            for index in 0..entry_count {
                if offset16 {
                    let offset = self.cursor.read_u16()?;
                    if offset != NO_ENTRY16 {
                        present.push((index as u16, offset as u32 * 4));
                    }
                } else {
                    let offset = self.cursor.read_u32()?;
                    if offset != NO_ENTRY {
                        present.push((index as u16, offset));
                    }
                }
            }
        }

        let entries_base = chunk.start + entries_start as u64;
        for (index, offset) in present {
            let authoritative = pkg
                .type_spec(id)
                .map(|t| t.entry_count())
                .unwrap_or(entry_count);
            if index as u32 >= authoritative {
                let err = Error::UnknownResourceId {
                    id: ResId::new(pkg.id, id, index),
                };
                if self.strict() {
                    return Err(err);
                }
                self.recover(err);
                continue;
            }
            self.cursor.seek_to(entries_base + offset as u64);
            match self.read_entry(pkg, id, index, &config, key_pool, global_pool) {
                Ok(()) => {}
                // Fatal in both modes unless the caller opted into overwrite.
                Err(err @ Error::DuplicateResource { .. }) => return Err(err),
                Err(err) if self.strict() => return Err(err),
                Err(err) => self.recover(err),
            }
        }
        Ok(())
    }

    fn read_entry(
        &mut self,
        pkg: &mut ResPackage,
        type_id: u8,
        entry_index: u16,
        config: &ConfigFlags,
        key_pool: &StringPool,
        global_pool: &StringPool,
    ) -> Result<()> {
        let entry_start = self.cursor.pos();
        let size = self.cursor.read_u16()?;
        let entry_flags = self.cursor.read_u16()?;

        if entry_flags & ENTRY_FLAG_COMPACT != 0 {
            let err = Error::UnsupportedFeature {
                what: format!("compact entry at {entry_start:#x}"),
            };
            if self.strict() {
                return Err(err);
            }
            self.recover(err);
            return Ok(());
        }

        let key_index = self.cursor.read_u32()?;
        let key_name = match key_pool.get_checked(key_index, true) {
            Ok(name) => name.to_owned(),
            Err(err) if self.strict() => return Err(err),
            Err(err) => {
                self.recover(err);
                String::new()
            }
        };

        let res_id = ResId::new(pkg.id, type_id, entry_index);
        let value = if entry_flags & ENTRY_FLAG_COMPLEX != 0 {
            let parent = self.cursor.read_u32()?;
            let count = self.cursor.read_u32()?;
            if size as u64 > 16 {
                self.cursor.seek_to(entry_start + size as u64);
            }
            if count as u64 * 12 > self.cursor.remaining() {
                return Err(Error::TruncatedChunk {
                    pos: entry_start,
                    declared: count as u64 * 12,
                    available: self.cursor.remaining(),
                });
            }
            let mut items = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let item_name = self.cursor.read_u32()?;
                let strict = self.strict();
                let raw = RawValue::read(&mut self.cursor, strict)?;
                let value = Value::from_raw(&raw, global_pool, strict)?;
                items.push((ResId(item_name), value));
            }
            Value::Bag(Bag {
                parent: ResId(parent),
                items,
            })
        } else {
            if size as u64 > 8 {
                self.cursor.seek_to(entry_start + size as u64);
            }
            let strict = self.strict();
            let raw = RawValue::read(&mut self.cursor, strict)?;
            Value::from_raw(&raw, global_pool, strict)?
        };

        let type_spec = pkg
            .type_spec_mut(type_id)
            .ok_or(Error::UnknownTypeId { type_id })?;
        if type_spec.spec(entry_index).is_none() {
            let (name, origin) = if key_name.is_empty() {
                (format!("APKTOOL_DUMMYVAL_{res_id}"), SpecOrigin::Anonymous)
            } else if type_spec.has_spec_named(&key_name) {
                (
                    format!("APKTOOL_DUPLICATE_{}_{}", type_spec.name, res_id),
                    SpecOrigin::Duplicate,
                )
            } else {
                (key_name, SpecOrigin::Decoded)
            };
            type_spec.add_spec(ResSpec::new(res_id, name, origin));
        }

        let spec = type_spec
            .spec_mut(entry_index)
            .ok_or(Error::UnknownResourceId { id: res_id })?;
        spec.add_resource(
            ResResource {
                config: config.clone(),
                value,
            },
            self.options.overwrite,
        )
    }

    fn read_library(&mut self, pkg: &mut ResPackage, chunk: &ChunkHeader) -> Result<()> {
        let count = self.cursor.read_u32()?;
        let available = chunk.end().saturating_sub(self.cursor.pos());
        if count as u64 * 260 > available {
            return Err(Error::TruncatedChunk {
                pos: chunk.start,
                declared: count as u64 * 260,
                available,
            });
        }
        for _ in 0..count {
            let package_id = self.cursor.read_u32()?;
            let package_name = self.cursor.read_utf16_fixed(128)?;
            pkg.libraries.push(LibraryEntry {
                package_id,
                package_name,
            });
        }
        Ok(())
    }

    fn read_staged_alias(&mut self, pkg: &mut ResPackage, chunk: &ChunkHeader) -> Result<()> {
        let count = self.cursor.read_u32()?;
        let available = chunk.end().saturating_sub(self.cursor.pos());
        if count as u64 * 8 > available {
            return Err(Error::TruncatedChunk {
                pos: chunk.start,
                declared: count as u64 * 8,
                available,
            });
        }
        for _ in 0..count {
            let staged_id = ResId(self.cursor.read_u32()?);
            let finalized_id = ResId(self.cursor.read_u32()?);
            pkg.staged_aliases.push(StagedAliasEntry {
                staged_id,
                finalized_id,
            });
        }
        Ok(())
    }

    fn read_overlayable(&mut self, pkg: &mut ResPackage, chunk: &ChunkHeader) -> Result<()> {
        let name = self.cursor.read_utf16_fixed(256)?;
        let actor = self.cursor.read_utf16_fixed(256)?;
        let mut overlayable = Overlayable {
            name,
            actor,
            policies: Vec::new(),
        };

        self.cursor.seek_to(chunk.data_start());
        while self.cursor.pos() + 8 <= chunk.end() {
            let sub = self.cursor.read_chunk_header()?;
            if sub.type_id == RES_TABLE_OVERLAYABLE_POLICY_TYPE {
                let flags = self.cursor.read_u32()?;
                let count = self.cursor.read_u32()?;
                let available = sub.end().saturating_sub(self.cursor.pos());
                if count as u64 * 4 > available {
                    return Err(Error::TruncatedChunk {
                        pos: sub.start,
                        declared: count as u64 * 4,
                        available,
                    });
                }
                let mut ids = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    ids.push(ResId(self.cursor.read_u32()?));
                }
                overlayable.policies.push(OverlayablePolicy { flags, ids });
            } else {
                warn!("unexpected chunk {:#06x} inside overlayable", sub.type_id);
            }
            self.cursor.seek_to(sub.end());
        }

        pkg.overlayables.push(overlayable);
        Ok(())
    }

    fn type_name(&mut self, type_pool: &StringPool, id: u8, type_id_offset: u32) -> Result<String> {
        let index = (id as u32).wrapping_sub(1).wrapping_sub(type_id_offset);
        match type_pool.get_checked(index, true) {
            Ok(name) if !name.is_empty() => Ok(name.to_owned()),
            Ok(_) => Ok(format!("type{id:02x}")),
            Err(err) if self.strict() => Err(err),
            Err(err) => {
                self.recover(err);
                Ok(format!("type{id:02x}"))
            }
        }
    }

    /// Entry indices covered by a dense type's flags array but present in
    /// no chunk keep their numeric identity through a synthesized spec.
    /// Sparse-only types list their entries explicitly, so absence there is
    /// intentional.
    fn synthesize_missing(&mut self, pkg: &mut ResPackage, dense_types: &HashSet<u8>) {
        let pkg_id = pkg.id;
        for type_id in dense_types {
            let Some(type_spec) = pkg.type_spec_mut(*type_id) else {
                continue;
            };
            let count = type_spec.entry_count().min(u16::MAX as u32) as u16;
            for index in 0..count {
                if type_spec.spec(index).is_some() {
                    continue;
                }
                let res_id = ResId::new(pkg_id, *type_id, index);
                let mut spec = ResSpec::new(
                    res_id,
                    format!("APKTOOL_DUMMY_{res_id}"),
                    SpecOrigin::Dummy,
                );
                let _ = spec.add_resource(
                    ResResource {
                        config: ConfigFlags::default(),
                        value: Value::Bool(false),
                    },
                    false,
                );
                type_spec.add_spec(spec);
            }
        }
    }
}

/// Pick the package emitters should treat as "main". Two-package tables
/// headed by a framework vendor package skip it; anything else falls
/// through to the most-specs rule, with the first package as the final
/// fallback.
fn select_main_package(packages: &[ResPackage]) -> Option<usize> {
    match packages.len() {
        0 => None,
        1 => Some(0),
        2 if packages[0].name == "android" => {
            warn!("skipping \"android\" package group");
            Some(1)
        }
        2 if packages[0].name == "com.htc" => {
            warn!("skipping \"com.htc\" package group");
            Some(1)
        }
        _ => {
            let mut best = None;
            let mut most = 0usize;
            for (index, pkg) in packages.iter().enumerate() {
                if pkg.spec_count() > most && !pkg.name.eq_ignore_ascii_case("android") {
                    most = pkg.spec_count();
                    best = Some(index);
                }
            }
            Some(best.unwrap_or(0))
        }
    }
}

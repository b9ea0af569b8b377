use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

use crate::config::ConfigFlags;
use crate::error::{Error, Result};
use crate::res_value::Value;

/// A reference to a unique entry in a resource table. The value is
/// structured as 0xpptteeee, where pp is the package id, tt the type id in
/// that package, and eeee the entry id in that type. Package and type ids
/// start at 1; 0 is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ResId(pub u32);

impl ResId {
    pub fn new(package: u8, type_id: u8, entry: u16) -> Self {
        Self(((package as u32) << 24) | ((type_id as u32) << 16) | entry as u32)
    }

    pub fn package_id(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn type_id(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn entry_id(self) -> u16 {
        self.0 as u16
    }
}

impl Display for ResId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl From<u32> for ResId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// How a spec entered the table. Synthetic specs keep their numeric
/// identity but are flagged so emitters can treat them differently from
/// decoded ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecOrigin {
    Decoded,
    /// Entry index covered by a type-spec flags array but present in no
    /// type chunk.
    Dummy,
    /// Entry decoded with an empty name.
    Anonymous,
    /// Entry decoded with a name already taken within its type.
    Duplicate,
}

/// One configured value of a spec.
#[derive(Debug, Clone, PartialEq)]
pub struct ResResource {
    pub config: ConfigFlags,
    pub value: Value,
}

/// The logical identity of a named resource: one id, one name, zero or more
/// per-configuration values. The configuration map preserves insertion
/// order for deterministic emission.
#[derive(Debug, Clone, PartialEq)]
pub struct ResSpec {
    pub id: ResId,
    name: String,
    pub origin: SpecOrigin,
    configured: Vec<ResResource>,
}

impl ResSpec {
    pub fn new(id: ResId, name: String, origin: SpecOrigin) -> Self {
        Self {
            id,
            name,
            origin,
            configured: Vec::new(),
        }
    }

    /// Display name. Double quotes are replaced by `q` at lookup time only;
    /// the stored name is untouched.
    pub fn name(&self) -> Cow<'_, str> {
        if self.name.contains('"') {
            Cow::Owned(self.name.replace('"', "q"))
        } else {
            Cow::Borrowed(&self.name)
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin != SpecOrigin::Decoded
    }

    pub fn resources(&self) -> &[ResResource] {
        &self.configured
    }

    pub fn resource(&self, config: &ConfigFlags) -> Option<&ResResource> {
        self.configured.iter().find(|r| &r.config == config)
    }

    pub fn default_resource(&self) -> Option<&ResResource> {
        self.resource(&ConfigFlags::default())
    }

    pub fn has_default_resource(&self) -> bool {
        self.default_resource().is_some()
    }

    /// At most one resource per distinct config unless `overwrite` is set.
    pub fn add_resource(&mut self, res: ResResource, overwrite: bool) -> Result<()> {
        if let Some(existing) = self.configured.iter_mut().find(|r| r.config == res.config) {
            if !overwrite {
                return Err(Error::DuplicateResource {
                    spec: format!("{} {}", self.id, self.name),
                    config: res.config.to_string(),
                });
            }
            *existing = res;
            return Ok(());
        }
        self.configured.push(res);
        Ok(())
    }
}

/// All specs sharing a resource type within a package. The flags array
/// carries the per-entry configuration-change masks; `entry_count` is
/// authoritative and indices outside it are invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct ResTypeSpec {
    pub id: u8,
    pub name: String,
    flags: Vec<u32>,
    specs: BTreeMap<u16, ResSpec>,
    names: HashSet<String>,
}

impl ResTypeSpec {
    pub fn new(id: u8, name: String, flags: Vec<u32>) -> Self {
        Self {
            id,
            name,
            flags,
            specs: BTreeMap::new(),
            names: HashSet::new(),
        }
    }

    pub fn entry_count(&self) -> u32 {
        self.flags.len() as u32
    }

    pub fn flags(&self) -> &[u32] {
        &self.flags
    }

    /// Subsequent type-spec chunks for the same id merge their flags in.
    pub fn merge_flags(&mut self, flags: &[u32]) {
        if flags.len() > self.flags.len() {
            self.flags.resize(flags.len(), 0);
        }
        for (slot, extra) in self.flags.iter_mut().zip(flags) {
            *slot |= extra;
        }
    }

    pub fn has_spec_named(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn spec(&self, entry: u16) -> Option<&ResSpec> {
        self.specs.get(&entry)
    }

    pub fn spec_mut(&mut self, entry: u16) -> Option<&mut ResSpec> {
        self.specs.get_mut(&entry)
    }

    pub fn add_spec(&mut self, spec: ResSpec) -> &mut ResSpec {
        let entry = spec.id.entry_id();
        self.names.insert(spec.name.clone());
        self.specs.entry(entry).or_insert(spec)
    }

    /// Specs in ascending entry order.
    pub fn specs(&self) -> impl Iterator<Item = &ResSpec> {
        self.specs.values()
    }

    pub fn spec_count(&self) -> usize {
        self.specs.len()
    }
}

/// Shared-library package-id to package-name entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub package_id: u32,
    pub package_name: String,
}

/// A staged (non-finalized) resource id mapped to its finalized id.
/// Recorded for later emission; not part of the spec graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedAliasEntry {
    pub staged_id: ResId,
    pub finalized_id: ResId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayablePolicy {
    pub flags: u32,
    pub ids: Vec<ResId>,
}

/// A set of resources that may be overlaid, with the policies protecting
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlayable {
    pub name: String,
    pub actor: String,
    pub policies: Vec<OverlayablePolicy>,
}

/// A synthesized grouping of all in-XML resources of one type under one
/// configuration, mapping onto a single `values*/*.xml` output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesFile {
    pub type_id: u8,
    pub type_name: String,
    pub config: ConfigFlags,
    /// Contained resources, each reachable from its spec.
    pub entries: Vec<ResId>,
}

impl ValuesFile {
    /// Output path relative to the res/ directory, e.g.
    /// `values-fr/strings.xml`.
    pub fn path(&self) -> String {
        let mut bucket = self.type_name.clone();
        if !bucket.ends_with('s') {
            bucket.push('s');
        }
        format!("values{}/{}.xml", self.config.qualifiers(), bucket)
    }
}

/// A namespace of resources identified by an 8-bit id; typically 0x01 for
/// the framework and 0x7f for applications.
#[derive(Debug, Clone, PartialEq)]
pub struct ResPackage {
    pub id: u8,
    pub name: String,
    type_specs: BTreeMap<u8, ResTypeSpec>,
    pub libraries: Vec<LibraryEntry>,
    pub staged_aliases: Vec<StagedAliasEntry>,
    pub overlayables: Vec<Overlayable>,
}

impl ResPackage {
    pub fn new(id: u8, name: String) -> Self {
        Self {
            id,
            name,
            type_specs: BTreeMap::new(),
            libraries: Vec::new(),
            staged_aliases: Vec::new(),
            overlayables: Vec::new(),
        }
    }

    pub fn type_spec(&self, id: u8) -> Option<&ResTypeSpec> {
        self.type_specs.get(&id)
    }

    pub fn type_spec_mut(&mut self, id: u8) -> Option<&mut ResTypeSpec> {
        self.type_specs.get_mut(&id)
    }

    pub fn add_type_spec(&mut self, spec: ResTypeSpec) -> &mut ResTypeSpec {
        self.type_specs.entry(spec.id).or_insert(spec)
    }

    /// Type specs in ascending type-id order.
    pub fn type_specs(&self) -> impl Iterator<Item = &ResTypeSpec> {
        self.type_specs.values()
    }

    pub fn spec(&self, id: ResId) -> Option<&ResSpec> {
        self.type_specs.get(&id.type_id())?.spec(id.entry_id())
    }

    /// Total number of specs across all types.
    pub fn spec_count(&self) -> usize {
        self.type_specs.values().map(|t| t.spec_count()).sum()
    }

    /// All specs in ascending numeric id order.
    pub fn specs(&self) -> impl Iterator<Item = &ResSpec> {
        self.type_specs.values().flat_map(|t| t.specs())
    }

    /// Group the package's in-XML resources by (type, config). Dummy specs
    /// and file references are left out; grouping preserves first-seen
    /// order.
    pub fn values_files(&self) -> Vec<ValuesFile> {
        let mut files: Vec<ValuesFile> = Vec::new();
        for type_spec in self.type_specs.values() {
            for spec in type_spec.specs() {
                if spec.origin == SpecOrigin::Dummy {
                    continue;
                }
                for res in spec.resources() {
                    if res.value.is_file() {
                        continue;
                    }
                    let found = files
                        .iter_mut()
                        .find(|f| f.type_id == type_spec.id && f.config == res.config);
                    match found {
                        Some(file) => file.entries.push(spec.id),
                        None => files.push(ValuesFile {
                            type_id: type_spec.id,
                            type_name: type_spec.name.clone(),
                            config: res.config.clone(),
                            entries: vec![spec.id],
                        }),
                    }
                }
            }
        }
        files
    }

    /// Resources whose value names a file inside the package, for a file
    /// decoder to extract.
    pub fn file_resources(&self) -> Vec<(&ResSpec, &ResResource, &str)> {
        let mut out = Vec::new();
        for spec in self.specs() {
            for res in spec.resources() {
                if let Value::FileRef(path) = &res.value {
                    out.push((spec, res, path.as_str()));
                }
            }
        }
        out
    }
}

/// The in-memory resource table: packages keyed by id, with a marked set of
/// "main" packages used by emitters and a current-package slot consulted by
/// attribute decoders during binary XML passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResTable {
    packages: Vec<ResPackage>,
    main_ids: Vec<u8>,
    current_package: Option<u8>,
    pub analysis_mode: bool,
}

impl ResTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, package: ResPackage, main: bool) -> Result<()> {
        if self.packages.iter().any(|p| p.id == package.id) {
            return Err(Error::UnsupportedFeature {
                what: format!("duplicate package id {:#04x}", package.id),
            });
        }
        if main {
            self.main_ids.push(package.id);
        }
        self.packages.push(package);
        Ok(())
    }

    pub fn packages(&self) -> &[ResPackage] {
        &self.packages
    }

    pub fn package_by_id(&self, id: u8) -> Option<&ResPackage> {
        self.packages.iter().find(|p| p.id == id)
    }

    pub fn package_by_name(&self, name: &str) -> Option<&ResPackage> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Main packages in insertion order.
    pub fn list_main_packages(&self) -> Vec<&ResPackage> {
        self.main_ids
            .iter()
            .filter_map(|id| self.package_by_id(*id))
            .collect()
    }

    /// Consume the table, yielding its first main package.
    pub fn into_main_package(mut self) -> Option<ResPackage> {
        let id = self.main_ids.first().copied()?;
        let index = self.packages.iter().position(|p| p.id == id)?;
        Some(self.packages.swap_remove(index))
    }

    /// Select the package whose key and type pools are consulted when
    /// resolving references in binary XML.
    pub fn set_current_package(&mut self, id: u8) -> Result<()> {
        if self.package_by_id(id).is_none() {
            return Err(Error::UnknownResourceId {
                id: ResId::new(id, 0, 0),
            });
        }
        self.current_package = Some(id);
        Ok(())
    }

    pub fn current_package(&self) -> Option<&ResPackage> {
        self.current_package.and_then(|id| self.package_by_id(id))
    }

    /// Resolve a resource id to its owning spec.
    pub fn spec(&self, id: ResId) -> Result<&ResSpec> {
        self.package_by_id(id.package_id())
            .and_then(|p| p.spec(id))
            .ok_or(Error::UnknownResourceId { id })
    }
}

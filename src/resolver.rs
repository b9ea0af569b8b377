use crate::error::Error;
use crate::res_value::Value;
use crate::table::{ResId, ResPackage, ResSpec, ResTable};

/// Depth cap when following reference chains, so cyclic references resolve
/// to an explicit unresolved result instead of looping.
pub const MAX_REFERENCE_DEPTH: usize = 20;

/// Outcome of an id lookup: the owning spec, or the raw id when nothing in
/// the table claims it.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    Spec(&'a ResSpec),
    Unresolved(ResId),
}

/// Resolve a single id without following anything.
pub fn resolve_id(table: &ResTable, id: ResId) -> Resolution<'_> {
    match table.spec(id) {
        Ok(spec) => Resolution::Spec(spec),
        Err(_) => Resolution::Unresolved(id),
    }
}

/// Follow reference- and attribute-valued specs until a concrete value is
/// reached. Cycles are cut by the depth cap.
pub fn resolve_reference_chain(table: &ResTable, id: ResId) -> Resolution<'_> {
    let mut current = id;
    for _ in 0..MAX_REFERENCE_DEPTH {
        let spec = match table.spec(current) {
            Ok(spec) => spec,
            Err(_) => return Resolution::Unresolved(current),
        };
        match spec.default_resource().map(|r| &r.value) {
            Some(Value::Reference(next)) | Some(Value::Attribute(next)) => current = *next,
            _ => return Resolution::Spec(spec),
        }
    }
    Resolution::Unresolved(current)
}

/// Read-only projection of the table used while decoding attribute values
/// in binary XML and while emitting values documents. Holds the mutable
/// current-package slot per session; it is never shared across sessions.
pub struct RefDecoder<'a> {
    table: &'a ResTable,
    current: Option<u8>,
    first_error: Option<Error>,
}

impl<'a> RefDecoder<'a> {
    pub fn new(table: &'a ResTable) -> Self {
        Self {
            table,
            current: table.current_package().map(|p| p.id),
            first_error: None,
        }
    }

    /// Select the package whose namespace is implicit in emitted names.
    pub fn set_current_package(&mut self, id: u8) {
        self.current = Some(id);
    }

    pub fn current_package(&self) -> Option<&'a ResPackage> {
        self.current.and_then(|id| self.table.package_by_id(id))
    }

    /// First non-fatal error observed during this pass.
    pub fn first_error(&self) -> Option<&Error> {
        self.first_error.as_ref()
    }

    pub fn take_first_error(&mut self) -> Option<Error> {
        self.first_error.take()
    }

    pub(crate) fn record(&mut self, err: Error) {
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }

    /// Symbolic form of a reference: `@pkg:type/name`, or `?pkg:type/name`
    /// for attribute references. Falls back to the hex id when the target
    /// is unknown, recording the failure.
    pub fn decode_reference(&mut self, id: ResId, attribute: bool) -> String {
        let sigil = if attribute { '?' } else { '@' };
        if id.0 == 0 {
            return "@null".to_owned();
        }
        match self.lookup(id) {
            Some((package, type_name, name)) => {
                if self.is_current(id.package_id()) {
                    format!("{sigil}{type_name}/{name}")
                } else {
                    format!("{sigil}{package}:{type_name}/{name}")
                }
            }
            None => {
                self.record(Error::UnknownResourceId { id });
                format!("{sigil}{id}")
            }
        }
    }

    /// Attribute name form used inside bags: `[pkg:]name` without sigil or
    /// type. `None` when the id is unknown; the failure is recorded.
    pub fn decode_attr_name(&mut self, id: ResId) -> Option<String> {
        match self.lookup(id) {
            Some((package, _, name)) => {
                if self.is_current(id.package_id()) {
                    Some(name)
                } else {
                    Some(format!("{package}:{name}"))
                }
            }
            None => {
                self.record(Error::UnknownResourceId { id });
                None
            }
        }
    }

    fn is_current(&self, package_id: u8) -> bool {
        self.current == Some(package_id)
    }

    fn lookup(&self, id: ResId) -> Option<(String, String, String)> {
        let package = self.table.package_by_id(id.package_id())?;
        let type_spec = package.type_spec(id.type_id())?;
        let spec = type_spec.spec(id.entry_id())?;
        Some((
            package.name.clone(),
            type_spec.name.clone(),
            spec.name().into_owned(),
        ))
    }
}

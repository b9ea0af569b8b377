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

use std::fs;
use std::io::Write;
use std::path::Path;

use log::warn;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

use crate::error::{Error, Result};
use crate::res_value::{
    complex_to_f32, dimension_unit, format_float, fraction_unit, Bag, ResolvedSpan, Value,
};
use crate::resolver::RefDecoder;
use crate::table::{ResPackage, ResTable, SpecOrigin, ValuesFile};

#[cfg(windows)]
const LINE_SEPARATOR: &str = "\r\n";
#[cfg(not(windows))]
const LINE_SEPARATOR: &str = "\n";

/// Bag keys carrying attribute meta-data.
const ATTR_TYPE: u32 = 0x0100_0000;
const ATTR_MIN: u32 = 0x0100_0001;
const ATTR_MAX: u32 = 0x0100_0002;
const ATTR_L10N: u32 = 0x0100_0003;

/// Bag keys selecting plural quantities.
const QUANTITIES: [(u32, &str); 6] = [
    (0x0100_0004, "other"),
    (0x0100_0005, "zero"),
    (0x0100_0006, "one"),
    (0x0100_0007, "two"),
    (0x0100_0008, "few"),
    (0x0100_0009, "many"),
];

const FORMAT_FLAGS: [(u32, &str); 8] = [
    (0x01, "reference"),
    (0x02, "string"),
    (0x04, "integer"),
    (0x08, "boolean"),
    (0x10, "color"),
    (0x20, "float"),
    (0x40, "dimension"),
    (0x80, "fraction"),
];
const FORMAT_ANY: u32 = 0xffff;
const FORMAT_ENUM: u32 = 0x0001_0000;
const FORMAT_FLAGS_BIT: u32 = 0x0002_0000;

fn make_writer<W: Write>(sink: W) -> EventWriter<W> {
    EmitterConfig::new()
        .perform_indent(true)
        .indent_string("    ")
        .line_separator(LINE_SEPARATOR)
        .write_document_declaration(true)
        .pad_self_closing(false)
        .create_writer(sink)
}

fn wrap(err: xml::writer::Error) -> Error {
    Error::malformed(0, err.to_string())
}

/// Emit `values/public.xml`: every spec of the package, in ascending
/// numeric id order.
pub fn write_public_xml<W: Write>(pkg: &ResPackage, sink: &mut W) -> Result<()> {
    let mut writer = make_writer(sink);
    writer
        .write(XmlEvent::start_element("resources"))
        .map_err(wrap)?;

    for type_spec in pkg.type_specs() {
        for spec in type_spec.specs() {
            let name = spec.name();
            let id = spec.id.to_string();
            writer
                .write(
                    XmlEvent::start_element("public")
                        .attr("type", &type_spec.name)
                        .attr("name", &name)
                        .attr("id", &id),
                )
                .map_err(wrap)?;
            writer.write(XmlEvent::end_element()).map_err(wrap)?;
        }
    }

    writer.write(XmlEvent::end_element()).map_err(wrap)?;
    Ok(())
}

/// Emit one `values*/*.xml` document. Resources appear in declaration
/// order; synthetic dummy specs are skipped.
pub fn write_values_file<W: Write>(
    refs: &mut RefDecoder,
    pkg: &ResPackage,
    file: &ValuesFile,
    sink: &mut W,
) -> Result<()> {
    let mut writer = make_writer(sink);
    writer
        .write(XmlEvent::start_element("resources"))
        .map_err(wrap)?;

    for id in &file.entries {
        let Some(spec) = pkg.spec(*id) else {
            continue;
        };
        if spec.origin == SpecOrigin::Dummy {
            continue;
        }
        let Some(res) = spec.resource(&file.config) else {
            continue;
        };
        serialize_resource(&mut writer, refs, &file.type_name, &spec.name(), &res.value)?;
    }

    writer.write(XmlEvent::end_element()).map_err(wrap)?;
    Ok(())
}

/// Write the whole `res/values*` tree for every main package. Surfaces the
/// first reference-decode error after all files are written, so a caller
/// can signal a non-zero exit without losing output.
pub fn export(table: &ResTable, out_dir: &Path) -> Result<()> {
    let res_dir = out_dir.join("res");
    let mut first_error = None;

    for pkg in table.list_main_packages() {
        let mut refs = RefDecoder::new(table);
        refs.set_current_package(pkg.id);

        let values_dir = res_dir.join("values");
        fs::create_dir_all(&values_dir).map_err(|e| Error::io(0, e))?;
        let mut sink = fs::File::create(values_dir.join("public.xml")).map_err(|e| Error::io(0, e))?;
        write_public_xml(pkg, &mut sink)?;

        for file in pkg.values_files() {
            let path = res_dir.join(file.path());
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(0, e))?;
            }
            let mut sink = fs::File::create(&path).map_err(|e| Error::io(0, e))?;
            write_values_file(&mut refs, pkg, &file, &mut sink)?;
        }

        if first_error.is_none() {
            first_error = refs.take_first_error();
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn serialize_resource<W: Write>(
    writer: &mut EventWriter<W>,
    refs: &mut RefDecoder,
    type_name: &str,
    name: &str,
    value: &Value,
) -> Result<()> {
    match value {
        Value::Bag(bag) => match type_name {
            "array" => write_array(writer, refs, name, bag),
            "plurals" => write_plurals(writer, refs, name, bag),
            "attr" | "^attr-private" => write_attr(writer, refs, name, bag),
            _ => write_style(writer, refs, name, bag),
        },
        _ => write_scalar(writer, refs, type_name, name, value),
    }
}

fn write_scalar<W: Write>(
    writer: &mut EventWriter<W>,
    refs: &mut RefDecoder,
    type_name: &str,
    name: &str,
    value: &Value,
) -> Result<()> {
    let dedicated = matches!(
        type_name,
        "string" | "color" | "dimen" | "fraction" | "integer" | "bool"
    );

    if dedicated {
        writer
            .write(XmlEvent::start_element(type_name).attr("name", name))
            .map_err(wrap)?;
        write_value_body(writer, refs, value)?;
    } else {
        writer
            .write(
                XmlEvent::start_element("item")
                    .attr("type", type_name)
                    .attr("name", name),
            )
            .map_err(wrap)?;
        // Id entries carry a placeholder boolean that has no textual form.
        if type_name != "id" {
            write_value_body(writer, refs, value)?;
        }
    }
    writer.write(XmlEvent::end_element()).map_err(wrap)?;
    Ok(())
}

fn write_value_body<W: Write>(
    writer: &mut EventWriter<W>,
    refs: &mut RefDecoder,
    value: &Value,
) -> Result<()> {
    if let Value::StyledString { text, spans } = value {
        return write_styled(writer, text, spans);
    }
    if let Some(text) = scalar_text(refs, value) {
        if !text.is_empty() {
            writer.write(XmlEvent::characters(&text)).map_err(wrap)?;
        }
    }
    Ok(())
}

fn scalar_text(refs: &mut RefDecoder, value: &Value) -> Option<String> {
    Some(match value {
        Value::Null => "@null".to_owned(),
        Value::Empty => "@empty".to_owned(),
        Value::Reference(id) => refs.decode_reference(*id, false),
        Value::Attribute(id) => refs.decode_reference(*id, true),
        Value::String(s) => s.clone(),
        Value::FileRef(p) => p.clone(),
        Value::Float(f) => format_float(*f),
        Value::Dimension(d) => format!("{}{}", format_float(complex_to_f32(*d)), dimension_unit(*d)),
        Value::Fraction(d) => format!(
            "{}{}",
            format_float(complex_to_f32(*d) * 100.0),
            fraction_unit(*d)
        ),
        Value::IntDec(v) => v.to_string(),
        Value::IntHex(v) => format!("0x{v:08x}"),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_owned(),
        Value::Color(c) => c.format(),
        Value::Raw { data, .. } => format!("0x{data:08x}"),
        Value::StyledString { .. } | Value::Bag(_) => return None,
    })
}

/// Reconstruct inline markup: each span becomes a nested element wrapping
/// its character range. Spans are sorted outermost-first; ranges that
/// overlap without nesting are dropped.
fn write_styled<W: Write>(
    writer: &mut EventWriter<W>,
    text: &str,
    spans: &[ResolvedSpan],
) -> Result<()> {
    let chars: Vec<char> = text.chars().collect();
    let mut order: Vec<&ResolvedSpan> = spans.iter().collect();
    order.sort_by(|a, b| {
        a.first_char
            .cmp(&b.first_char)
            .then(b.last_char.cmp(&a.last_char))
    });
    write_styled_segment(writer, &chars, 0, chars.len(), &order)
}

fn write_styled_segment<W: Write>(
    writer: &mut EventWriter<W>,
    chars: &[char],
    start: usize,
    end: usize,
    spans: &[&ResolvedSpan],
) -> Result<()> {
    let mut pos = start;
    let mut index = 0;

    while index < spans.len() {
        let span = spans[index];
        let span_start = span.first_char as usize;
        let span_end = ((span.last_char as usize) + 1).min(end);
        if span_start < pos || span_start >= end {
            warn!("dropping out-of-order style span <{}>", span.tag);
            index += 1;
            continue;
        }

        if span_start > pos {
            let leading: String = chars[pos..span_start].iter().collect();
            writer.write(XmlEvent::characters(&leading)).map_err(wrap)?;
        }

        let mut nested_end = index + 1;
        while nested_end < spans.len() && (spans[nested_end].first_char as usize) < span_end {
            nested_end += 1;
        }

        let (tag, attrs) = parse_span_tag(&span.tag);
        let mut builder = XmlEvent::start_element(tag);
        for (key, val) in &attrs {
            builder = builder.attr(key.as_str(), val);
        }
        writer.write(builder).map_err(wrap)?;
        write_styled_segment(writer, chars, span_start, span_end, &spans[index + 1..nested_end])?;
        writer.write(XmlEvent::end_element()).map_err(wrap)?;

        pos = span_end;
        index = nested_end;
    }

    if pos < end {
        let trailing: String = chars[pos..end].iter().collect();
        writer.write(XmlEvent::characters(&trailing)).map_err(wrap)?;
    }
    Ok(())
}

/// Span tags may carry `;key=value` attribute suffixes, e.g.
/// `a;href=http://example.com`.
fn parse_span_tag(tag: &str) -> (&str, Vec<(String, String)>) {
    let mut parts = tag.split(';');
    let name = parts.next().unwrap_or(tag);
    let attrs = parts
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
    (name, attrs)
}

fn write_style<W: Write>(
    writer: &mut EventWriter<W>,
    refs: &mut RefDecoder,
    name: &str,
    bag: &Bag,
) -> Result<()> {
    let parent = if bag.parent.0 != 0 {
        Some(refs.decode_reference(bag.parent, false))
    } else {
        None
    };

    let mut start = XmlEvent::start_element("style").attr("name", name);
    if let Some(parent) = parent.as_deref() {
        start = start.attr("parent", parent);
    }
    writer.write(start).map_err(wrap)?;

    for (attr_id, value) in &bag.items {
        let Some(item_name) = refs.decode_attr_name(*attr_id) else {
            warn!("skipping style item with unknown attribute {attr_id}");
            continue;
        };
        writer
            .write(XmlEvent::start_element("item").attr("name", &item_name))
            .map_err(wrap)?;
        write_value_body(writer, refs, value)?;
        writer.write(XmlEvent::end_element()).map_err(wrap)?;
    }

    writer.write(XmlEvent::end_element()).map_err(wrap)?;
    Ok(())
}

fn write_array<W: Write>(
    writer: &mut EventWriter<W>,
    refs: &mut RefDecoder,
    name: &str,
    bag: &Bag,
) -> Result<()> {
    let all_strings = bag
        .items
        .iter()
        .all(|(_, v)| matches!(v, Value::String(_) | Value::StyledString { .. }));
    let all_ints = bag
        .items
        .iter()
        .all(|(_, v)| matches!(v, Value::IntDec(_) | Value::IntHex(_)));

    let element = if bag.items.is_empty() {
        "array"
    } else if all_strings {
        "string-array"
    } else if all_ints {
        "integer-array"
    } else {
        "array"
    };

    writer
        .write(XmlEvent::start_element(element).attr("name", name))
        .map_err(wrap)?;
    for (_, value) in &bag.items {
        writer.write(XmlEvent::start_element("item")).map_err(wrap)?;
        write_value_body(writer, refs, value)?;
        writer.write(XmlEvent::end_element()).map_err(wrap)?;
    }
    writer.write(XmlEvent::end_element()).map_err(wrap)?;
    Ok(())
}

fn write_plurals<W: Write>(
    writer: &mut EventWriter<W>,
    refs: &mut RefDecoder,
    name: &str,
    bag: &Bag,
) -> Result<()> {
    writer
        .write(XmlEvent::start_element("plurals").attr("name", name))
        .map_err(wrap)?;

    for (key, value) in &bag.items {
        let Some((_, quantity)) = QUANTITIES.iter().find(|(id, _)| *id == key.0) else {
            warn!("skipping plurals item with unknown quantity key {key}");
            continue;
        };
        writer
            .write(XmlEvent::start_element("item").attr("quantity", quantity))
            .map_err(wrap)?;
        write_value_body(writer, refs, value)?;
        writer.write(XmlEvent::end_element()).map_err(wrap)?;
    }

    writer.write(XmlEvent::end_element()).map_err(wrap)?;
    Ok(())
}

fn value_as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::IntDec(v) => Some(*v as u32),
        Value::IntHex(v) => Some(*v),
        Value::Raw { data, .. } => Some(*data),
        Value::Bool(b) => Some(*b as u32),
        _ => None,
    }
}

fn write_attr<W: Write>(
    writer: &mut EventWriter<W>,
    refs: &mut RefDecoder,
    name: &str,
    bag: &Bag,
) -> Result<()> {
    let mut type_mask: Option<u32> = None;
    let mut min = None;
    let mut max = None;
    let mut children: Vec<(&crate::table::ResId, &Value)> = Vec::new();

    for (key, value) in &bag.items {
        match key.0 {
            ATTR_TYPE => type_mask = value_as_u32(value),
            ATTR_MIN => min = value_as_u32(value),
            ATTR_MAX => max = value_as_u32(value),
            ATTR_L10N => {}
            _ => children.push((key, value)),
        }
    }

    let format = type_mask.and_then(|mask| {
        let scalar = mask & FORMAT_ANY;
        if scalar == 0 || scalar == FORMAT_ANY {
            return None;
        }
        let names: Vec<&str> = FORMAT_FLAGS
            .iter()
            .filter(|(bit, _)| scalar & bit != 0)
            .map(|(_, n)| *n)
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(names.join("|"))
        }
    });
    let min_text = min.map(|v| v.to_string());
    let max_text = max.map(|v| v.to_string());

    let mut start = XmlEvent::start_element("attr").attr("name", name);
    if let Some(format) = format.as_deref() {
        start = start.attr("format", format);
    }
    if let Some(min) = min_text.as_deref() {
        start = start.attr("min", min);
    }
    if let Some(max) = max_text.as_deref() {
        start = start.attr("max", max);
    }
    writer.write(start).map_err(wrap)?;

    let child_element = match type_mask {
        Some(mask) if mask & FORMAT_FLAGS_BIT != 0 => "flag",
        Some(mask) if mask & FORMAT_ENUM != 0 => "enum",
        _ => "enum",
    };

    for (key, value) in children {
        let Some(child_name) = refs.decode_attr_name(*key) else {
            warn!("skipping attr child with unknown id {key}");
            continue;
        };
        let child_value = match value {
            Value::IntHex(v) => format!("0x{v:08x}"),
            other => value_as_u32(other).map(|v| v.to_string()).unwrap_or_default(),
        };
        writer
            .write(
                XmlEvent::start_element(child_element)
                    .attr("name", &child_name)
                    .attr("value", &child_value),
            )
            .map_err(wrap)?;
        writer.write(XmlEvent::end_element()).map_err(wrap)?;
    }

    writer.write(XmlEvent::end_element()).map_err(wrap)?;
    Ok(())
}

//! XLSX sheet reader.
//!
//! Reads cell values of one worksheet out of an Office Open XML workbook:
//! the sheet is looked up by name in `xl/workbook.xml`, resolved to its part
//! through `xl/_rels/workbook.xml.rels`, and shared strings are taken from
//! `xl/sharedStrings.xml`. Styles, formulas and everything else are ignored;
//! a formula cell yields its cached value.

use super::Sheet;
use crate::error::SheetError;
use crate::models::CellValue;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Read the sheet called `sheet_name` from an xlsx file.
pub fn read_xlsx_file<P: AsRef<Path>>(path: P, sheet_name: &str) -> Result<Sheet, SheetError> {
    let file = File::open(path)?;
    read_xlsx(file, sheet_name)
}

/// Read the sheet called `sheet_name` from an xlsx archive.
pub fn read_xlsx<R: Read + Seek>(reader: R, sheet_name: &str) -> Result<Sheet, SheetError> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let shared_strings = read_shared_strings(&mut archive)?;
    let sheets = read_workbook_xml(&mut archive)?;
    let rels = read_workbook_rels(&mut archive)?;

    let (_, r_id) = sheets
        .iter()
        .find(|(name, _)| name == sheet_name)
        .ok_or_else(|| SheetError::UnknownSheet(sheet_name.to_string()))?;
    let path = rels
        .get(r_id)
        .ok_or_else(|| SheetError::MissingPart(format!("worksheet for relationship {r_id}")))?;

    log::info!("Reading sheet {sheet_name:?} from {path}");
    read_worksheet(&mut archive, path, sheet_name, &shared_strings)
}

/// Read the shared strings table
fn read_shared_strings<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<Vec<String>, SheetError> {
    let mut strings = Vec::new();

    let file = match archive.by_name("xl/sharedStrings.xml") {
        Ok(f) => f,
        Err(_) => return Ok(strings), // No shared strings is valid
    };

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(false);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"si" => {
                    strings.push(decode_excel_escapes(&current));
                    current.clear();
                    in_si = false;
                }
                b"t" => in_t = false,
                _ => {}
            },
            Event::Text(e) if in_t => current.push_str(&e.unescape()?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Sheet names and their relationship ids, in workbook order.
fn read_workbook_xml<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<Vec<(String, String)>, SheetError> {
    let file = archive
        .by_name("xl/workbook.xml")
        .map_err(|_| SheetError::MissingPart("xl/workbook.xml".into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                let mut name = None;
                let mut r_id = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"name" => name = Some(attr.unescape_value()?.to_string()),
                        b"r:id" => r_id = Some(attr.unescape_value()?.to_string()),
                        _ => {}
                    }
                }
                if let (Some(name), Some(r_id)) = (name, r_id) {
                    sheets.push((name, r_id));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Relationship id to worksheet part path.
fn read_workbook_rels<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> Result<HashMap<String, String>, SheetError> {
    let file = archive
        .by_name("xl/_rels/workbook.xml.rels")
        .map_err(|_| SheetError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                let mut rel_type = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(attr.unescape_value()?.to_string()),
                        b"Target" => target = Some(attr.unescape_value()?.to_string()),
                        b"Type" => rel_type = Some(attr.unescape_value()?.to_string()),
                        _ => {}
                    }
                }
                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    if rel_type.ends_with("/worksheet") {
                        // Target is relative to xl/
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{target}"),
                        };
                        rels.insert(id, full_path);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

fn read_worksheet<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    path: &str,
    sheet_name: &str,
    shared_strings: &[String],
) -> Result<Sheet, SheetError> {
    let file = archive
        .by_name(path)
        .map_err(|_| SheetError::MissingPart(path.to_string()))?;

    let mut xml_reader = Reader::from_reader(BufReader::new(file));
    xml_reader.trim_text(false);

    let mut sheet = Sheet::new(sheet_name);
    let mut buf = Vec::new();

    let mut cell_ref: Option<String> = None;
    let mut cell_type: Option<String> = None;
    let mut value = String::new();
    let mut in_cell = false;
    let mut in_value = false;

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"c" => {
                    in_cell = true;
                    cell_ref = None;
                    cell_type = None;
                    value.clear();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => cell_ref = Some(attr.unescape_value()?.to_string()),
                            b"t" => cell_type = Some(attr.unescape_value()?.to_string()),
                            _ => {}
                        }
                    }
                }
                // <v> holds the value, <is><t> an inline string
                b"v" | b"t" if in_cell => in_value = true,
                _ => {}
            },
            Event::Text(e) if in_value => value.push_str(&e.unescape()?),
            Event::End(e) => match e.name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    in_cell = false;
                    let reference = cell_ref
                        .take()
                        .ok_or_else(|| SheetError::Parse(format!("cell without reference in {path}")))?;
                    let (row, column) = parse_cell_ref(&reference)?;
                    if let Some(cell) =
                        cell_value(cell_type.as_deref(), value.trim(), shared_strings)?
                    {
                        sheet.set_cell(row, column, cell);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    log::debug!(
        "read_worksheet({path}) rows={} columns={}",
        sheet.max_row(),
        sheet.max_column()
    );
    Ok(sheet)
}

fn cell_value(
    cell_type: Option<&str>,
    value: &str,
    shared_strings: &[String],
) -> Result<Option<CellValue>, SheetError> {
    if value.is_empty() {
        return Ok(None);
    }
    let cell = match cell_type {
        Some("s") => {
            let idx: usize = value
                .parse()
                .map_err(|_| SheetError::Parse(format!("Invalid shared string index: {value}")))?;
            let s = shared_strings.get(idx).ok_or_else(|| {
                SheetError::Parse(format!("Shared string index {idx} out of bounds"))
            })?;
            CellValue::Text(s.clone())
        }
        Some("b") => CellValue::Text(if value == "1" { "TRUE" } else { "FALSE" }.to_string()),
        None | Some("n") => match value.parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(value.to_string()),
        },
        Some("str") | Some("inlineStr") => CellValue::Text(decode_excel_escapes(value)),
        // e and anything unknown
        Some(_) => CellValue::Text(value.to_string()),
    };
    Ok(Some(cell))
}

/// Last column a worksheet can hold (`XFD`).
pub const MAX_COLUMN: usize = 16_384;
/// Last row a worksheet can hold.
pub const MAX_ROW: usize = 1_048_576;

/// `B7` to 1-based (row 7, column 2).
pub fn parse_cell_ref(reference: &str) -> Result<(usize, usize), SheetError> {
    let invalid = || SheetError::Parse(format!("Invalid cell reference {reference:?}"));

    let split = reference
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(invalid());
    }

    let mut column = 0usize;
    for b in letters.bytes() {
        column = column * 26 + (b.to_ascii_uppercase() - b'A' + 1) as usize;
        if column > MAX_COLUMN {
            return Err(invalid());
        }
    }
    let row: usize = digits.parse().map_err(|_| invalid())?;
    if row == 0 || row > MAX_ROW {
        return Err(invalid());
    }
    Ok((row, column))
}

/// 1-based column number to letters: 1 is `A`, 27 is `AA`.
pub fn column_letters(column: usize) -> String {
    let mut letters = Vec::new();
    let mut n = column;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// Decode Excel's `_xHHHH_` escapes (`_x000D_` is a carriage return).
///
/// Anything that is not a complete escape is kept as written.
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

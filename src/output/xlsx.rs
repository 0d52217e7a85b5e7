//! XLSX output of a processed sheet.
//!
//! Writes a single-sheet workbook: numbers as `<v>` values, text as inline
//! strings. Styles are a bare default so spreadsheet applications open it.

use crate::error::SheetError;
use crate::input::{column_letters, Sheet};
use crate::models::CellValue;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
    <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
    <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
    <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
    <cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
    <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

/// Write the sheet to an xlsx file at `path`.
pub fn write_xlsx_file<P: AsRef<Path>>(sheet: &Sheet, path: P) -> Result<(), SheetError> {
    let file = File::create(path)?;
    write_xlsx(sheet, file)
}

/// Write the sheet as a one-sheet workbook.
pub fn write_xlsx<W: Write + Seek>(sheet: &Sheet, writer: W) -> Result<(), SheetError> {
    let mut zip = zip::ZipWriter::new(writer);

    write_part(&mut zip, "[Content_Types].xml", CONTENT_TYPES)?;
    write_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
    write_part(&mut zip, "xl/workbook.xml", &workbook_xml(&sheet.name))?;
    write_part(&mut zip, "xl/_rels/workbook.xml.rels", WORKBOOK_RELS)?;
    write_part(&mut zip, "xl/styles.xml", STYLES)?;
    write_part(&mut zip, "xl/worksheets/sheet1.xml", &worksheet_xml(sheet))?;

    zip.finish()?;
    Ok(())
}

fn write_part<W: Write + Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    content: &str,
) -> Result<(), SheetError> {
    zip.start_file(name, SimpleFileOptions::default())?;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="{}" sheetId="1" r:id="rId1"/>
    </sheets>
</workbook>"#,
        escape_xml(sheet_name)
    )
}

fn worksheet_xml(sheet: &Sheet) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>"#,
    );

    for (i, row) in sheet.rows().enumerate() {
        let cells: Vec<(usize, &CellValue)> = row
            .iter()
            .enumerate()
            .filter_map(|(j, cell)| cell.as_ref().map(|c| (j + 1, c)))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let row_number = i + 1;
        content.push_str(&format!("\n        <row r=\"{row_number}\">"));
        for (column, cell) in cells {
            let cell_ref = format!("{}{row_number}", column_letters(column));
            match cell {
                CellValue::Number(n) => {
                    content.push_str(&format!("\n            <c r=\"{cell_ref}\"><v>{n}</v></c>"));
                }
                CellValue::Text(s) => {
                    content.push_str(&format!(
                        "\n            <c r=\"{cell_ref}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                        escape_xml(&encode_excel_escapes(s))
                    ));
                }
            }
        }
        content.push_str("\n        </row>");
    }

    content.push_str("\n    </sheetData>\n</worksheet>");
    content
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Control characters XML cannot carry become `_xHHHH_`, and a literal
/// `_xHHHH_` gets its underscore escaped so it reads back unchanged.
fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
            result.push_str(&format!("_x{:04X}_", c as u32));
        } else if c == '_' && looks_like_escape(&s[i..]) {
            result.push_str("_x005F_");
        } else {
            result.push(c);
        }
    }
    result
}

fn looks_like_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(|b| b.is_ascii_hexdigit())
        && bytes[6] == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::read_xlsx;
    use std::io::Cursor;

    fn round_trip(sheet: &Sheet) -> Sheet {
        let mut out = Cursor::new(Vec::new());
        write_xlsx(sheet, &mut out).unwrap();
        read_xlsx(Cursor::new(out.into_inner()), &sheet.name).unwrap()
    }

    #[test]
    fn test_write_xlsx_round_trip() {
        let mut sheet = Sheet::new("Members");
        sheet.set_cell(1, 1, CellValue::from("Example & Sons <Ltd>"));
        sheet.set_cell(1, 4, CellValue::Number(131111008042.0));
        sheet.set_cell(1, 5, CellValue::from("131.111.8.42/32"));
        sheet.set_cell(3, 28, CellValue::from(" 10.0.0.0/23,10.1.0.0/16 "));
        sheet.set_cell(3, 2, CellValue::Number(1.5));

        let back = round_trip(&sheet);
        assert_eq!(back.max_row(), 3);
        assert_eq!(back.cell_text(1, 1).as_deref(), Some("Example & Sons <Ltd>"));
        assert_eq!(back.cell(1, 4), Some(&CellValue::Number(131111008042.0)));
        assert_eq!(back.cell_text(1, 5).as_deref(), Some("131.111.8.42/32"));
        assert_eq!(back.cell(2, 1), None);
        assert_eq!(back.cell(3, 2), Some(&CellValue::Number(1.5)));
        // reader trims cell text
        assert_eq!(
            back.cell_text(3, 28).as_deref(),
            Some("10.0.0.0/23,10.1.0.0/16")
        );
    }

    #[test]
    fn test_write_xlsx_sheet_name_escaped() {
        let sheet = Sheet::new("R&D \"IPs\"");
        let back = round_trip(&sheet);
        assert_eq!(back.name, "R&D \"IPs\"");
        assert_eq!(back.max_row(), 0);
    }

    #[test]
    fn test_encode_excel_escapes() {
        assert_eq!(encode_excel_escapes("a\u{1}b"), "a_x0001_b");
        assert_eq!(encode_excel_escapes("_x000D_"), "_x005F_x000D_");
        assert_eq!(encode_excel_escapes("snake_case"), "snake_case");
        assert_eq!(encode_excel_escapes("line\nbreak"), "line\nbreak");
    }

    #[test]
    fn test_escapes_survive_round_trip() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set_cell(1, 1, CellValue::from("keep _x000D_ literal"));
        sheet.set_cell(1, 2, CellValue::from("bell\u{7}"));
        let back = round_trip(&sheet);
        assert_eq!(back.cell_text(1, 1).as_deref(), Some("keep _x000D_ literal"));
        assert_eq!(back.cell_text(1, 2).as_deref(), Some("bell\u{7}"));
    }
}

//! Test fixtures: in-memory sheets and minimal xlsx packages.
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Sheet;
use quick_xml::escape::escape;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn kind_of(value: &str) -> CellType {
    if value.trim().parse::<f64>().is_ok() {
        CellType::Number
    } else {
        CellType::InlineString
    }
}

/// Puts a single value into a sheet, typed as a number when it parses as one.
pub(crate) fn put(sheet: &mut Sheet, row: usize, col: usize, value: &str) {
    if !value.is_empty() {
        sheet.push(Cell::new(row, col, kind_of(value), value));
    }
}

/// Builds a sheet from rows of cell texts; empty strings leave the cell blank.
pub(crate) fn sheet(name: &str, rows: Vec<Vec<&str>>) -> Sheet {
    let mut sheet = Sheet::new(name);
    for (row, values) in rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            put(&mut sheet, row, col, value);
        }
    }
    sheet
}

/// Writes an xlsx package with one worksheet per entry. Text goes to the
/// shared string table, numbers are written as plain values.
pub(crate) fn write_workbook(path: &Path, sheets: &[(&str, Vec<Vec<&str>>)]) {
    let mut shared_strings = Vec::<String>::new();
    let mut worksheets = Vec::new();

    for (name, rows) in sheets {
        let mut xml = String::new();
        for (row, values) in rows.iter().enumerate() {
            xml.push_str(&format!(r#"<row r="{}">"#, row + 1));
            for (col, value) in values.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let reference = index_to_reference(row, col);
                match kind_of(value) {
                    CellType::Number => xml.push_str(&format!(r#"<c r="{reference}"><v>{value}</v></c>"#)),
                    _ => {
                        xml.push_str(&format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, shared_strings.len()));
                        shared_strings.push(value.to_string());
                    }
                }
            }
            xml.push_str("</row>");
        }
        worksheets.push((*name, xml));
    }
    write_package(path, &worksheets, &shared_strings);
}

/// Writes an xlsx package from the raw `<sheetData>` content of each worksheet.
pub(crate) fn write_package(path: &Path, sheets: &[(&str, String)], shared_strings: &[String]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();

    for (index, (_, sheet_data)) in sheets.iter().enumerate() {
        let xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#);
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }

    let mut workbook = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#);
    let mut relationships = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    for (index, (name, _)) in sheets.iter().enumerate() {
        let id = index + 1;
        workbook.push_str(&format!(r#"<sheet name="{}" sheetId="{id}" r:id="rId{id}"/>"#, escape(*name)));
        relationships.push_str(&format!(r#"<Relationship Id="rId{id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{id}.xml"/>"#));
    }
    let strings_id = sheets.len() + 1;
    relationships.push_str(&format!(r#"<Relationship Id="rId{strings_id}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#));
    workbook.push_str("</sheets></workbook>");
    relationships.push_str("</Relationships>");

    let mut strings = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#, shared_strings.len());
    for value in shared_strings {
        strings.push_str(&format!("<si><t>{}</t></si>", escape(value.as_str())));
    }
    strings.push_str("</sst>");

    for (name, content) in [
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", relationships),
        ("xl/sharedStrings.xml", strings),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

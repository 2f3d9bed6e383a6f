#![allow(dead_code)]

use std::io::Write;

/// One worksheet of a generated workbook. `rows: None` declares the sheet in
/// the workbook but leaves its part out of the archive, so it cannot be read.
pub struct SheetSpec<'a> {
    pub name: &'a str,
    pub rows: Option<Vec<Vec<&'a str>>>,
}

pub fn sheet<'a>(name: &'a str, rows: Vec<Vec<&'a str>>) -> SheetSpec<'a> {
    SheetSpec {
        name,
        rows: Some(rows),
    }
}

pub fn broken_sheet(name: &str) -> SheetSpec<'_> {
    SheetSpec { name, rows: None }
}

/// Builds a minimal .xlsx (ZIP) with the given sheets in declared order.
/// Cells that parse as numbers are stored as numbers, the rest as inline strings.
pub fn build_xlsx(sheets: &[SheetSpec<'_>]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let opts = zip::write::SimpleFileOptions::default();

        let mut overrides = String::new();
        let mut sheet_entries = String::new();
        let mut rels = String::new();
        for (idx, spec) in sheets.iter().enumerate() {
            let n = idx + 1;
            overrides.push_str(&format!(
                "<Override PartName=\"/xl/worksheets/sheet{n}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>"
            ));
            sheet_entries.push_str(&format!(
                "<sheet name=\"{}\" sheetId=\"{n}\" r:id=\"rId{n}\"/>",
                escape(spec.name)
            ));
            rels.push_str(&format!(
                "<Relationship Id=\"rId{n}\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet{n}.xml\"/>"
            ));
        }

        zip.start_file("[Content_Types].xml", opts).unwrap();
        write!(
            zip,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>\
<Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
{overrides}</Types>"
        )
        .unwrap();

        zip.start_file("_rels/.rels", opts).unwrap();
        write!(
            zip,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
<Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" Target=\"xl/workbook.xml\"/>\
</Relationships>"
        )
        .unwrap();

        zip.start_file("xl/workbook.xml", opts).unwrap();
        write!(
            zip,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" \
xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\">\
<sheets>{sheet_entries}</sheets></workbook>"
        )
        .unwrap();

        zip.start_file("xl/_rels/workbook.xml.rels", opts).unwrap();
        write!(
            zip,
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
{rels}</Relationships>"
        )
        .unwrap();

        for (idx, spec) in sheets.iter().enumerate() {
            let Some(rows) = &spec.rows else { continue };
            zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), opts)
                .unwrap();
            zip.write_all(worksheet_xml(rows).as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

fn worksheet_xml(rows: &[Vec<&str>]) -> String {
    let mut data = String::new();
    for (r, row) in rows.iter().enumerate() {
        let r = r + 1;
        data.push_str(&format!("<row r=\"{r}\">"));
        for (c, value) in row.iter().enumerate() {
            let cell_ref = format!("{}{}", (b'A' + c as u8) as char, r);
            if value.is_empty() {
                continue;
            }
            if value.parse::<f64>().is_ok() {
                data.push_str(&format!("<c r=\"{cell_ref}\"><v>{value}</v></c>"));
            } else {
                data.push_str(&format!(
                    "<c r=\"{cell_ref}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    escape(value)
                ));
            }
        }
        data.push_str("</row>");
    }
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
<worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\">\
<sheetData>{data}</sheetData></worksheet>"
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Two-sheet quarterly workbook used across tests.
pub fn quarterly_workbook() -> Vec<u8> {
    build_xlsx(&[
        sheet(
            "Q1",
            vec![vec!["Metric", "Value"], vec!["Revenue", "500000"]],
        ),
        sheet(
            "Q2",
            vec![vec!["Metric", "Value"], vec!["Revenue", "650000"]],
        ),
    ])
}

/// Single-page PDF whose page has an empty content stream (no text at all).
pub fn blank_page_pdf() -> Vec<u8> {
    pdf_with_pages(&[""])
}

/// PDF with one page per entry. A non-empty entry is drawn as a single line
/// of Helvetica text; an empty entry gives a page with an empty content stream.
/// Builds the body first, then an xref with correct byte offsets.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let page_count = pages.len();
    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();

    let mut out = Vec::new();
    let mut offsets = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    offsets.push(out.len());
    out.extend_from_slice(b"1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj\n");
    offsets.push(out.len());
    out.extend_from_slice(
        format!(
            "2 0 obj << /Type /Pages /Kids [{}] /Count {} >> endobj\n",
            kids.join(" "),
            page_count
        )
        .as_bytes(),
    );
    offsets.push(out.len());
    out.extend_from_slice(
        b"3 0 obj << /Type /Font /Subtype /Type1 /BaseFont /Helvetica >> endobj\n",
    );
    for (i, text) in pages.iter().enumerate() {
        let page_id = 4 + 2 * i;
        let content_id = page_id + 1;
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "{page_id} 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
/Contents {content_id} 0 R /Resources << /Font << /F1 3 0 R >> >> >> endobj\n"
            )
            .as_bytes(),
        );
        let stream = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 100 700 Td ({}) Tj ET", text)
        };
        offsets.push(out.len());
        out.extend_from_slice(
            format!(
                "{content_id} 0 obj << /Length {} >> stream\n{}\nendstream endobj\n",
                stream.len(),
                stream
            )
            .as_bytes(),
        );
    }

    let size = offsets.len() + 1;
    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", size).as_bytes());
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(format!("trailer << /Size {} /Root 1 0 R >>\nstartxref\n", size).as_bytes());
    out.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    out.extend_from_slice(b"%%EOF\n");
    out
}

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

/// Three-row CSV with one categorical and one numeric column.
pub fn write_scores_csv(path: &Path) {
    fs::write(path, "name,score\nalice,10\nbob,20\ncarol,30\n").unwrap();
}

/// Windows-1252 encoded CSV; the pipeline re-encodes it as UTF-8.
pub fn write_latin1_csv(path: &Path) {
    fs::write(path, b"name,city\nJos\xe9,Par\xeds\n").unwrap();
}

/// DOCX with two paragraphs (one carrying a European-formatted number)
/// and a three-row table.
pub fn write_docx(path: &Path) {
    use docx_rs::*;

    fn cell(content: &str) -> TableCell {
        TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(content)))
    }

    let docx = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Quarterly summary")))
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Total: 1.234,56 units")))
        .add_table(Table::new(vec![
            TableRow::new(vec![cell("item"), cell("qty")]),
            TableRow::new(vec![cell("bolts"), cell("4")]),
            TableRow::new(vec![cell("nuts"), cell("6")]),
        ]));

    let mut buffer = Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).expect("Failed to pack DOCX");
    fs::write(path, buffer.into_inner()).expect("Failed to write DOCX fixture");
}

/// Starts with the OOXML zip magic but carries no document parts.
pub fn write_corrupt_docx(path: &Path) {
    fs::write(path, b"PK\x03\x04garbage bytes, not a document").unwrap();
}

/// Workbook with sheets `north` (alpha=10, beta=30) and `south`
/// (gamma=5, delta=15), assembled part by part.
pub fn write_two_sheet_xlsx(path: &Path) {
    write_xlsx_parts(path, SHEET_NORTH_XML, SHEET_SOUTH_XML);
}

/// Like `write_two_sheet_xlsx`, but the `south` worksheet part is
/// truncated mid-element and cannot be parsed.
pub fn write_xlsx_with_broken_sheet(path: &Path) {
    write_xlsx_parts(path, SHEET_NORTH_XML, BROKEN_SHEET_XML);
}

fn write_xlsx_parts(path: &Path, sheet1_xml: &str, sheet2_xml: &str) {
    use zip::write::{ExtendedFileOptions, FileOptions};
    use zip::CompressionMethod;

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options: FileOptions<ExtendedFileOptions> = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        zip.start_file("[Content_Types].xml", options.clone())
            .unwrap();
        zip.write_all(CONTENT_TYPES_XLSX.as_bytes()).unwrap();

        zip.add_directory("_rels", options.clone()).unwrap();
        zip.start_file("_rels/.rels", options.clone()).unwrap();
        zip.write_all(ROOT_RELS_XLSX.as_bytes()).unwrap();

        zip.add_directory("xl", options.clone()).unwrap();
        zip.start_file("xl/workbook.xml", options.clone()).unwrap();
        zip.write_all(WORKBOOK_XML.as_bytes()).unwrap();

        zip.add_directory("xl/_rels", options.clone()).unwrap();
        zip.start_file("xl/_rels/workbook.xml.rels", options.clone())
            .unwrap();
        zip.write_all(WORKBOOK_RELS.as_bytes()).unwrap();

        zip.add_directory("xl/worksheets", options.clone()).unwrap();
        zip.start_file("xl/worksheets/sheet1.xml", options.clone())
            .unwrap();
        zip.write_all(sheet1_xml.as_bytes()).unwrap();

        zip.start_file("xl/worksheets/sheet2.xml", options.clone())
            .unwrap();
        zip.write_all(sheet2_xml.as_bytes()).unwrap();

        zip.start_file("xl/sharedStrings.xml", options.clone())
            .unwrap();
        zip.write_all(SHARED_STRINGS_XML.as_bytes()).unwrap();

        zip.finish().unwrap();
    }

    fs::write(path, buffer.into_inner()).expect("Failed to write XLSX fixture");
}

const CONTENT_TYPES_XLSX: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
    <Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
</Types>"#;

const ROOT_RELS_XLSX: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

const WORKBOOK_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets>
        <sheet name="north" sheetId="1" r:id="rId1"/>
        <sheet name="south" sheetId="2" r:id="rId2"/>
    </sheets>
</workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

const SHEET_NORTH_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>
        <row r="1">
            <c r="A1" t="s"><v>0</v></c>
            <c r="B1" t="s"><v>1</v></c>
        </row>
        <row r="2">
            <c r="A2" t="s"><v>2</v></c>
            <c r="B2"><v>10</v></c>
        </row>
        <row r="3">
            <c r="A3" t="s"><v>3</v></c>
            <c r="B3"><v>30</v></c>
        </row>
    </sheetData>
</worksheet>"#;

const SHEET_SOUTH_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>
        <row r="1">
            <c r="A1" t="s"><v>0</v></c>
            <c r="B1" t="s"><v>1</v></c>
        </row>
        <row r="2">
            <c r="A2" t="s"><v>4</v></c>
            <c r="B2"><v>5</v></c>
        </row>
        <row r="3">
            <c r="A3" t="s"><v>5</v></c>
            <c r="B3"><v>15</v></c>
        </row>
    </sheetData>
</worksheet>"#;

const BROKEN_SHEET_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <sheetData>
        <row r="1"><c r="A1" t="s"#;

const SHARED_STRINGS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="8" uniqueCount="6">
    <si><t>label</t></si>
    <si><t>value</t></si>
    <si><t>alpha</t></si>
    <si><t>beta</t></si>
    <si><t>gamma</t></si>
    <si><t>delta</t></si>
</sst>"#;

/// Single-page PDF with one Helvetica text line per entry, built by hand
/// so the byte offsets in the cross-reference table stay correct.
pub fn write_pdf(path: &Path, lines: &[&str]) {
    let mut content = String::from("BT\n/F1 12 Tf\n");
    let mut y = 720;
    for line in lines {
        content.push_str(&format!(
            "1 0 0 1 72 {} Tm ({}) Tj\n",
            y,
            escape_pdf_text(line)
        ));
        y -= 16;
    }
    content.push_str("ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            content.len(),
            content
        ),
    ];

    let mut pdf: Vec<u8> = Vec::new();
    pdf.extend_from_slice(b"%PDF-1.4\n");

    let mut offsets = Vec::new();
    for (index, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", index + 1, object).as_bytes());
    }

    let xref_offset = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for offset in &offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );

    fs::write(path, pdf).expect("Failed to write PDF fixture");
}

fn escape_pdf_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Reads a pipeline CSV, asserting the UTF-8 BOM and stripping it.
pub fn read_output_csv(path: &Path) -> String {
    let bytes = fs::read(path).unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    assert!(
        bytes.starts_with(b"\xef\xbb\xbf"),
        "missing UTF-8 BOM in {}",
        path.display()
    );
    String::from_utf8(bytes[3..].to_vec()).unwrap()
}

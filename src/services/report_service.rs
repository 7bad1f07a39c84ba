//! Exportación de reportes
//!
//! Proyecta la lista filtrada en una tabla fija de seis columnas y la
//! codifica como PDF (lopdf) o como planilla XLSX (rust_xlsxwriter).
//! Ambas salidas son funciones puras de la secuencia de entrada.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::models::vehicle::VehicleRecord;
use crate::utils::errors::{export_error, AppResult};

pub const REPORT_TITLE: &str = "Relatório de Veículos Cadastrados";
pub const REPORT_HEADERS: [&str; 6] = ["Placa", "Modelo", "Cor", "Proprietário", "Setor", "Ramal"];
pub const SHEET_NAME: &str = "Veículos";
pub const PDF_FILE_NAME: &str = "veiculos-cadastrados.pdf";
pub const XLSX_FILE_NAME: &str = "veiculos-cadastrados.xlsx";

/// Una fila del reporte, en el orden de `REPORT_HEADERS`
pub type ReportRow = [String; 6];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Spreadsheet,
}

impl ReportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => PDF_FILE_NAME,
            ReportFormat::Spreadsheet => XLSX_FILE_NAME,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "PDF",
            ReportFormat::Spreadsheet => "Excel",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "xlsx" | "excel" | "planilha" => Ok(ReportFormat::Spreadsheet),
            _ => Err(format!("Formato de exportação desconhecido: {}", s)),
        }
    }
}

/// Proyección compartida por ambos formatos; campos ausentes quedan vacíos
pub fn report_rows(records: &[VehicleRecord]) -> Vec<ReportRow> {
    let text = |field: &Option<String>| field.clone().unwrap_or_default();
    records
        .iter()
        .map(|v| {
            [
                text(&v.plate),
                text(&v.model),
                text(&v.color),
                text(&v.owner_name),
                text(&v.department),
                text(&v.extension),
            ]
        })
        .collect()
}

// Geometría A4 en puntos
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_X: i64 = 40;
const TITLE_Y: i64 = 805;
const FIRST_TABLE_TOP: i64 = 780;
const NEXT_TABLE_TOP: i64 = 800;
const BOTTOM_MARGIN: i64 = 40;
const ROW_HEIGHT: i64 = 18;
const TEXT_OFFSET_Y: i64 = 12;
const LINE_HEIGHT: i64 = 11;
const CELL_PADDING: i64 = 4;
const COLUMN_WIDTHS: [i64; 6] = [70, 90, 75, 130, 90, 60];
const TITLE_FONT_SIZE: i64 = 16;
const CELL_FONT_SIZE: i64 = 9;

/// PDF tabular con título, encabezado coloreado y filas alternadas
pub fn to_pdf_bytes(records: &[VehicleRecord]) -> AppResult<Vec<u8>> {
    let rows = report_rows(records);
    let pages = layout_pages(&rows);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| export_error("PDF", e))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| export_error("PDF", e))?;
    Ok(buffer)
}

/// Planilla con una hoja "Veículos": encabezado en negrita y una fila por registro
pub fn to_spreadsheet_bytes(records: &[VehicleRecord]) -> AppResult<Vec<u8>> {
    let rows = report_rows(records);
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(SHEET_NAME)
        .map_err(|e| export_error("XLSX", e))?;

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| export_error("XLSX", e))?;
        worksheet
            .set_column_width(col as u16, COLUMN_WIDTHS[col] as f64 / 5.0)
            .map_err(|e| export_error("XLSX", e))?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_number = index as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_number, col as u16, value.as_str())
                .map_err(|e| export_error("XLSX", e))?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| export_error("XLSX", e))
}

/// Escribir el archivo en `dir` con su nombre fijo y devolver la ruta
pub fn export_report(
    dir: &Path,
    format: ReportFormat,
    records: &[VehicleRecord],
) -> AppResult<PathBuf> {
    let bytes = match format {
        ReportFormat::Pdf => to_pdf_bytes(records)?,
        ReportFormat::Spreadsheet => to_spreadsheet_bytes(records)?,
    };
    fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name());
    fs::write(&path, bytes)?;
    info!(
        "📄 Reporte {} exportado: {} ({} registros)",
        format.label(),
        path.display(),
        records.len()
    );
    Ok(path)
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Reparte título, encabezados y filas en páginas. Cada celda se parte en
/// líneas que caben en su columna y la fila crece con la celda más alta.
fn layout_pages(rows: &[ReportRow]) -> Vec<Vec<Operation>> {
    let mut pages = Vec::new();
    let mut ops = Vec::new();
    let header = wrap_row(REPORT_HEADERS.iter().copied());

    push_text(&mut ops, "F2", TITLE_FONT_SIZE, MARGIN_X, TITLE_Y, REPORT_TITLE);
    let mut top = FIRST_TABLE_TOP;
    top -= push_header(&mut ops, top, &header);

    for (index, row) in rows.iter().enumerate() {
        let cells = wrap_row(row.iter().map(String::as_str));
        let height = row_height(&cells);
        if top - height < BOTTOM_MARGIN {
            pages.push(std::mem::take(&mut ops));
            top = NEXT_TABLE_TOP;
            top -= push_header(&mut ops, top, &header);
        }
        if index % 2 == 1 {
            push_rect(&mut ops, top - height, height, [0.94, 0.94, 0.94]);
        }
        push_row(&mut ops, "F1", top, &cells);
        top -= height;
    }

    pages.push(ops);
    pages
}

/// Devuelve la altura ocupada
fn push_header(ops: &mut Vec<Operation>, top: i64, header: &[Vec<String>]) -> i64 {
    let height = row_height(header);
    push_rect(ops, top - height, height, [0.0, 0.478, 0.8]);
    ops.push(fill_color([1.0, 1.0, 1.0]));
    push_row(ops, "F2", top, header);
    ops.push(fill_color([0.0, 0.0, 0.0]));
    height
}

fn push_row(ops: &mut Vec<Operation>, font: &str, top: i64, cells: &[Vec<String>]) {
    let mut x = MARGIN_X;
    for (lines, width) in cells.iter().zip(COLUMN_WIDTHS) {
        for (line_index, line) in lines.iter().enumerate() {
            let y = top - TEXT_OFFSET_Y - line_index as i64 * LINE_HEIGHT;
            push_text(ops, font, CELL_FONT_SIZE, x + CELL_PADDING, y, line);
        }
        x += width;
    }
}

fn wrap_row<'a>(cells: impl Iterator<Item = &'a str>) -> Vec<Vec<String>> {
    cells
        .zip(COLUMN_WIDTHS)
        .map(|(cell, width)| wrap_text(cell, (width - 2 * CELL_PADDING) as f32, CELL_FONT_SIZE as f32))
        .collect()
}

fn row_height(cells: &[Vec<String>]) -> i64 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1) as i64;
    ROW_HEIGHT + (lines - 1) * LINE_HEIGHT
}

/// Corta por palabras; una palabra más ancha que la columna se corta por caracteres
fn wrap_text(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for ch in word.chars() {
            current.push(ch);
            if current.chars().count() > 1 && text_width(&current, size) > max_width {
                current.pop();
                lines.push(std::mem::replace(&mut current, ch.to_string()));
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Ancho en puntos con las métricas de Helvetica
fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(helvetica_width).sum();
    units as f32 * size / 1000.0
}

/// Anchos AFM de Helvetica en milésimas de em. Fuera de ASCII se usa el de
/// la letra base más ancha posible.
fn helvetica_width(ch: char) -> u32 {
    match ch {
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | '[' | '\\' | ']' | 'I' | 'f' | 't' => 278,
        'i' | 'j' | 'l' => 222,
        '\'' => 191,
        '"' => 355,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '*' => 389,
        '^' => 469,
        'J' => 500,
        'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        '|' => 260,
        '{' | '}' => 334,
        '+' | '<' | '=' | '>' | '~' => 584,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        'L' => 556,
        c if c.is_ascii() => 556,
        c if c.is_uppercase() => 778,
        _ => 556,
    }
}

fn push_rect(ops: &mut Vec<Operation>, bottom: i64, height: i64, rgb: [f32; 3]) {
    let table_width: i64 = COLUMN_WIDTHS.iter().sum();
    ops.push(Operation::new("q", vec![]));
    ops.push(fill_color(rgb));
    ops.push(Operation::new(
        "re",
        vec![
            Object::Integer(MARGIN_X),
            Object::Integer(bottom),
            Object::Integer(table_width),
            Object::Integer(height),
        ],
    ));
    ops.push(Operation::new("f", vec![]));
    ops.push(Operation::new("Q", vec![]));
}

fn push_text(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
    ));
    ops.push(Operation::new("Td", vec![Object::Integer(x), Object::Integer(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}

fn fill_color(rgb: [f32; 3]) -> Operation {
    Operation::new("rg", rgb.iter().map(|c| Object::Real(*c)).collect())
}

/// Las fuentes estándar usan WinAnsi; sin esto los acentos se rompen
fn win_ansi(text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    bytes.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn sample() -> Vec<VehicleRecord> {
        vec![VehicleRecord {
            id: None,
            plate: Some("ABC1234".to_string()),
            model: Some("Civic".to_string()),
            color: Some("Preto".to_string()),
            owner_name: Some("Ana".to_string()),
            department: Some("TI".to_string()),
            extension: Some("1234".to_string()),
        }]
    }

    fn many(count: usize) -> Vec<VehicleRecord> {
        (0..count)
            .map(|i| VehicleRecord {
                plate: Some(format!("AAA{:04}", i)),
                ..Default::default()
            })
            .collect()
    }

    fn zip_entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        content
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_report_rows_fixed_column_order() {
        let rows = report_rows(&sample());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].join(" | "), "ABC1234 | Civic | Preto | Ana | TI | 1234");
    }

    #[test]
    fn test_report_rows_keep_input_order_and_blank_missing() {
        let mut records = many(2);
        records.reverse();
        let rows = report_rows(&records);
        assert_eq!(rows[0][0], "AAA0001");
        assert_eq!(rows[1][0], "AAA0000");
        assert_eq!(rows[0][3], "");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("pdf".parse::<ReportFormat>().unwrap(), ReportFormat::Pdf);
        assert_eq!("Excel".parse::<ReportFormat>().unwrap(), ReportFormat::Spreadsheet);
        assert!("csv".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::Spreadsheet.file_name(), "veiculos-cadastrados.xlsx");
    }

    #[test]
    fn test_pdf_is_deterministic_and_contains_rows() {
        let first = to_pdf_bytes(&sample()).unwrap();
        let second = to_pdf_bytes(&sample()).unwrap();
        assert!(first.starts_with(b"%PDF-1.5"));
        assert_eq!(first, second);

        for cell in ["ABC1234", "Civic", "Preto", "Ana", "TI", "1234"] {
            assert!(contains(&first, cell.as_bytes()), "falta {}", cell);
        }
        assert!(contains(&first, b"Relat\xf3rio de Ve\xedculos Cadastrados"));
        assert!(contains(&first, b"Propriet\xe1rio"));
    }

    #[test]
    fn test_pdf_paginates_long_lists() {
        let bytes = to_pdf_bytes(&many(120)).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 3);

        let empty = Document::load_mem(&to_pdf_bytes(&[]).unwrap()).unwrap();
        assert_eq!(empty.get_pages().len(), 1);
    }

    /// (x, texto) de cada celda dibujada, sin el título
    fn drawn_cells(bytes: &[u8]) -> Vec<(i64, String)> {
        let doc = Document::load_mem(bytes).unwrap();
        let mut cells = Vec::new();
        for (_, page_id) in doc.get_pages() {
            let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
            let (mut size, mut x) = (0, 0);
            for op in content.operations {
                match (op.operator.as_str(), op.operands.as_slice()) {
                    ("Tf", [_, Object::Integer(s)]) => size = *s,
                    ("Td", [Object::Integer(tx), _]) => x = *tx,
                    ("Tj", [Object::String(raw, _)]) if size == CELL_FONT_SIZE => {
                        let (text, _, _) = encoding_rs::WINDOWS_1252.decode(raw);
                        cells.push((x, text.into_owned()));
                    }
                    _ => {}
                }
            }
        }
        cells
    }

    #[test]
    fn test_long_cells_wrap_inside_their_column() {
        let mut records = sample();
        records[0].owner_name = Some("Maria Aparecida dos Santos Oliveira".to_string());
        records[0].model = Some("Volkswagen-Constellation-24.280".to_string());
        let bytes = to_pdf_bytes(&records).unwrap();

        let mut start = MARGIN_X;
        let columns: Vec<(i64, i64)> = COLUMN_WIDTHS
            .iter()
            .map(|width| {
                let column = (start, start + width);
                start += width;
                column
            })
            .collect();

        let cells = drawn_cells(&bytes);
        for (x, text) in &cells {
            let (_, end) = columns
                .iter()
                .find(|(left, right)| x >= left && x < right)
                .unwrap_or_else(|| panic!("texto fuera de la tabla: {}", text));
            let right = *x as f32 + text_width(text, CELL_FONT_SIZE as f32);
            assert!(right <= *end as f32, "'{}' termina en {} > {}", text, right, end);
        }

        let owner_lines: Vec<&str> = cells
            .iter()
            .filter(|(x, _)| *x == columns[3].0 + CELL_PADDING)
            .map(|(_, text)| text.as_str())
            .filter(|text| *text != "Proprietário")
            .collect();
        assert!(owner_lines.len() > 1);
        assert_eq!(owner_lines.join(" "), "Maria Aparecida dos Santos Oliveira");
    }

    #[test]
    fn test_wrap_text_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("Ana", 100.0, 9.0), vec!["Ana"]);
        assert_eq!(wrap_text("", 100.0, 9.0), vec![""]);
        let pieces = wrap_text("AAAAAAAAAAAAAAAAAAAA", 40.0, 9.0);
        assert!(pieces.len() > 1);
        assert_eq!(pieces.concat(), "AAAAAAAAAAAAAAAAAAAA");
    }

    #[test]
    fn test_spreadsheet_contains_sheet_headers_and_rows() {
        let bytes = to_spreadsheet_bytes(&sample()).unwrap();
        assert!(bytes.starts_with(b"PK"));

        let workbook = zip_entry(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Veículos""#));

        let strings = zip_entry(&bytes, "xl/sharedStrings.xml");
        for cell in REPORT_HEADERS.iter().chain(["ABC1234", "Civic", "Preto", "Ana", "TI", "1234"].iter()) {
            assert!(strings.contains(cell), "falta {}", cell);
        }
    }

    #[test]
    fn test_spreadsheet_content_is_deterministic() {
        let first = to_spreadsheet_bytes(&sample()).unwrap();
        let second = to_spreadsheet_bytes(&sample()).unwrap();
        for entry in ["xl/worksheets/sheet1.xml", "xl/sharedStrings.xml"] {
            assert_eq!(zip_entry(&first, entry), zip_entry(&second, entry));
        }
    }

    #[test]
    fn test_export_report_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_report(dir.path(), ReportFormat::Pdf, &sample()).unwrap();
        assert_eq!(path, dir.path().join("veiculos-cadastrados.pdf"));
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));

        let path = export_report(dir.path(), ReportFormat::Spreadsheet, &sample()).unwrap();
        assert!(path.ends_with("veiculos-cadastrados.xlsx"));
    }
}

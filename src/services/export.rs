//! # 엑셀 내보내기
//!
//! 저장된 수업 계획 하나를 `.xlsx` 바이트로 변환합니다.
//!
//! 시트 구성:
//! 1. 제목 블록: 과목 · 수준 · 단원 · 주제 · 부주제 · 시간 · 세션 수
//! 2. 빈 줄
//! 3. 머리글 행 + 표의 각 행 (고정 열 순서)

use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet, XlsxError};
use serde_json::Value;

use crate::error::AppError;
use crate::models::LessonPlan;

/// xlsx 파일의 MIME 타입
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// (JSON 키, 머리글) — 열 순서
const COLUMNS: [(&str, &str); 7] = [
    ("momento", "Momento"),
    ("actividades", "Actividades"),
    ("tiempo_min", "Tiempo (min)"),
    ("producto", "Producto"),
    ("instrumento", "Instrumento"),
    ("evaluacion_formativa", "Evaluación formativa"),
    ("evaluacion_sumativa", "Evaluación sumativa"),
];

const COLUMN_WIDTHS: [f64; 7] = [22.0, 60.0, 12.0, 28.0, 22.0, 40.0, 14.0];

/// 셀 하나에 들어갈 수 있는 최대 문자 수 (Excel 제한)
pub const MAX_CELL_CHARS: usize = 32_767;

/// 다운로드 파일 이름 (`planeacion_42.xlsx`)
pub fn export_file_name(plan: &LessonPlan) -> String {
    format!("planeacion_{}.xlsx", plan.id)
}

/// 수업 계획을 xlsx 바이트로 렌더링합니다.
pub fn render_plan_xlsx(plan: &LessonPlan) -> Result<Vec<u8>, AppError> {
    write_workbook(plan).map_err(|e| AppError::Internal(format!("xlsx export failed: {}", e)))
}

fn write_workbook(plan: &LessonPlan) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let title = Format::new().set_bold().set_font_size(14);
    let label = Format::new().set_bold();
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xDDEBF7))
        .set_border(FormatBorder::Thin);
    let cell = Format::new().set_text_wrap().set_border(FormatBorder::Thin);

    let sheet = workbook.add_worksheet();
    sheet.set_name("Planeación")?;
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    // ── 제목 블록 ──
    sheet.write_string_with_format(0, 0, "Planeación didáctica", &title)?;

    let duracion = format!("{} minutos", plan.duracion);
    let sesiones = plan.sesiones.map(|s| s.to_string());
    let info: [(&str, Option<&str>); 7] = [
        ("Materia", Some(plan.materia.as_str())),
        ("Nivel", Some(plan.nivel.as_str())),
        ("Unidad", plan.unidad.as_deref()),
        ("Tema", Some(plan.tema.as_str())),
        ("Subtema", plan.subtema.as_deref()),
        ("Duración", Some(duracion.as_str())),
        ("Sesiones", sesiones.as_deref()),
    ];

    let mut row: u32 = 2;
    for (name, value) in info {
        sheet.write_string_with_format(row, 0, name, &label)?;
        sheet.write_string(row, 1, cell_text(value.unwrap_or("-")))?;
        row += 1;
    }

    // ── 표 ──
    row += 1;
    for (col, (_, heading)) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(row, col as u16, *heading, &header)?;
    }
    row += 1;

    let entries = plan.tabla_ia.as_array().map(Vec::as_slice).unwrap_or(&[]);
    for entry in entries {
        for (col, (key, _)) in COLUMNS.iter().enumerate() {
            write_cell(sheet, row, col as u16, entry.get(*key), &cell)?;
        }
        row += 1;
    }

    workbook.save_to_buffer()
}

// 숫자는 숫자 셀로, 나머지는 텍스트로 씁니다. 없는 값은 빈 셀(테두리만)입니다.
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<&Value>,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        Some(Value::Number(n)) => {
            sheet.write_number_with_format(row, col, n.as_f64().unwrap_or_default(), format)?;
        }
        Some(Value::String(s)) => {
            sheet.write_string_with_format(row, col, cell_text(s), format)?;
        }
        Some(Value::Null) | None => {
            sheet.write_blank(row, col, format)?;
        }
        Some(other) => {
            sheet.write_string_with_format(row, col, cell_text(&other.to_string()), format)?;
        }
    }
    Ok(())
}

// 셀 제한을 넘는 문자열은 잘라서 씁니다. 저장된 행은 그대로 둡니다.
fn cell_text(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

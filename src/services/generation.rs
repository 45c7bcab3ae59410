//! # 수업 계획 생성 파이프라인
//!
//! 주제 하나당 순서대로:
//! 1. 프롬프트 생성 (`prompt::build_prompt`)
//! 2. 텍스트 생성 모델 호출 (토큰 사용량 수집)
//! 3. 응답을 JSON 배열로 파싱, 실패하면 `[...]` 부분만 잘라 재시도, 그래도 실패하면 고정 대체 표
//! 4. 저장소에 행 저장
//! 5. 텔레메트리 기록 (실패해도 요청은 계속됩니다)
//!
//! 배치의 모든 행은 하나의 무작위 `batch_id`를 공유합니다.
//! 주제들은 병렬이 아니라 하나씩 차례로 처리됩니다.
//!
//! 실패 규칙: 모델 호출 실패나 저장 실패는 요청 전체를 중단시키고,
//! 모델이 엉뚱한 텍스트를 돌려주는 것은 실패가 아니라 대체 표로 처리됩니다.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::db::PlanStore;
use crate::error::AppError;
use crate::models::*;
use crate::services::llm::{CompletionRequest, TextGenerator, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::services::prompt::{build_prompt, PROMPT_VERSION, SYSTEM_INSTRUCTION};

// 첫 `[`부터 마지막 `]`까지 (탐욕적, 줄바꿈 포함)
static BRACKETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\[.*\]").expect("valid regex"));

/// 모델 출력에서 얻은 표와 그 출처
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTable {
    pub table: Value,
    /// 모델의 JSON을 사용했으면 true, 대체 표를 썼으면 false
    pub json_ok: bool,
    pub error_kind: Option<ErrorKind>,
}

/// 배치 생성 결과
#[derive(Debug)]
pub struct GenerationOutcome {
    pub batch_id: Uuid,
    pub plans: Vec<LessonPlan>,
}

/// 검증된 배치를 처리해 주제마다 한 행씩 저장하고, 저장된 행들을 반환합니다.
pub async fn generate_batch(
    store: &dyn PlanStore,
    model: &dyn TextGenerator,
    user_id: Uuid,
    batch: &GenerationBatch,
) -> Result<GenerationOutcome, AppError> {
    let batch_id = Uuid::new_v4();
    tracing::info!(%batch_id, %user_id, topics = batch.items.len(), "Generating lesson plans");

    let mut plans = Vec::with_capacity(batch.items.len());
    for item in &batch.items {
        let plan = generate_one(store, model, user_id, batch_id, item).await?;
        plans.push(plan);
    }

    Ok(GenerationOutcome { batch_id, plans })
}

async fn generate_one(
    store: &dyn PlanStore,
    model: &dyn TextGenerator,
    user_id: Uuid,
    batch_id: Uuid,
    item: &LessonPlanRequest,
) -> Result<LessonPlan, AppError> {
    let request = CompletionRequest {
        system: SYSTEM_INSTRUCTION.to_string(),
        prompt: build_prompt(item),
        max_tokens: MAX_OUTPUT_TOKENS,
        temperature: TEMPERATURE,
    };

    let completion = model
        .complete(request)
        .await
        .map_err(|e| AppError::Upstream(format!("text generation failed: {}", e)))?;

    let parsed = parse_table(&completion.text, item.duracion);
    if parsed.json_ok {
        for issue in check_table(&parsed.table, item.duracion) {
            tracing::warn!(%batch_id, tema = %item.tema, "Model table kept as returned: {}", issue);
        }
    }

    let plan = store
        .create_plan(&NewLessonPlan {
            user_id,
            batch_id: Some(batch_id),
            materia: item.materia.clone(),
            nivel: item.nivel.clone(),
            unidad: item.unidad.clone(),
            tema: item.tema.clone(),
            subtema: item.subtema.clone(),
            duracion: item.duracion as i32,
            sesiones: item.sesiones.map(|s| s as i32),
            tabla_ia: parsed.table,
        })
        .await?;

    let metric = IaMetric {
        nivel: item.nivel.clone(),
        materia: item.materia.clone(),
        prompt_version: PROMPT_VERSION.to_string(),
        prompt_tokens: saturating_i32(completion.prompt_tokens),
        completion_tokens: saturating_i32(completion.completion_tokens),
        total_tokens: saturating_i32(completion.total_tokens),
        json_ok: parsed.json_ok,
        error_tipo: parsed.error_kind.map(|k| k.as_str().to_string()),
    };
    if let Err(e) = store.record_metric(&metric).await {
        tracing::warn!(%batch_id, plan_id = plan.id, "Failed to record ia_metrics row: {}", e);
    }

    tracing::info!(
        %batch_id,
        plan_id = plan.id,
        total_tokens = completion.total_tokens,
        json_ok = parsed.json_ok,
        "Lesson plan stored"
    );
    Ok(plan)
}

fn saturating_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// 모델의 원시 출력을 표로 해석합니다.
///
/// - 그대로 파싱해 비어 있지 않은 배열이면 그대로 사용
/// - 아니면 `[...]` 부분만 잘라 다시 파싱 (`json_recovered`)
/// - 둘 다 실패하면 고정 대체 표 (`fallback_used`)
pub fn parse_table(raw: &str, duracion: u32) -> ParsedTable {
    if let Some(table) = as_table(raw) {
        return ParsedTable {
            table,
            json_ok: true,
            error_kind: None,
        };
    }
    tracing::warn!(
        error_kind = ErrorKind::InvalidJson.as_str(),
        "Model output is not a JSON array, trying bracket extraction"
    );

    if let Some(table) = BRACKETED_RE.find(raw).and_then(|m| as_table(m.as_str())) {
        return ParsedTable {
            table,
            json_ok: true,
            error_kind: Some(ErrorKind::JsonRecovered),
        };
    }
    tracing::warn!(
        error_kind = ErrorKind::FallbackUsed.as_str(),
        "Model output could not be recovered, using fallback table"
    );

    ParsedTable {
        table: serde_json::to_value(fallback_table(duracion)).unwrap_or(Value::Array(Vec::new())),
        json_ok: false,
        error_kind: Some(ErrorKind::FallbackUsed),
    }
}

// 비어 있지 않은 JSON 배열일 때만 Some
fn as_table(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Array(rows)) if !rows.is_empty() => Some(Value::Array(rows)),
        _ => None,
    }
}

/// 모델 출력을 쓸 수 없을 때 저장하는 고정 3행 표
///
/// 시간 배분은 `{10, duracion - 20, 10}`, 총괄 평가 비중은 `{3, 5, 2}`입니다.
/// 30분 미만 수업은 1/4 · 1/2 · 1/4로 나눠 합계를 유지합니다.
pub fn fallback_table(duracion: u32) -> Vec<TableRow> {
    let (inicio, desarrollo, cierre) = if duracion >= 30 {
        (10, duracion - 20, 10)
    } else {
        let quarter = duracion / 4;
        (quarter, duracion - 2 * quarter, quarter)
    };

    vec![
        TableRow {
            momento: MOMENTS[0].to_string(),
            actividades: "Lluvia de ideas y preguntas detonadoras para recuperar lo que el grupo ya sabe del tema."
                .to_string(),
            tiempo_min: inicio,
            producto: "Lista de ideas previas".to_string(),
            instrumento: "Lista de cotejo".to_string(),
            evaluacion_formativa: "Identifica y expresa conocimientos previos relacionados con el tema."
                .to_string(),
            evaluacion_sumativa: 3,
        },
        TableRow {
            momento: MOMENTS[1].to_string(),
            actividades: "Explicación guiada del tema y actividad práctica en equipos con acompañamiento docente."
                .to_string(),
            tiempo_min: desarrollo,
            producto: "Ejercicio o actividad resuelta".to_string(),
            instrumento: "Rúbrica".to_string(),
            evaluacion_formativa: "Aplica los conceptos del tema en la resolución de la actividad."
                .to_string(),
            evaluacion_sumativa: 5,
        },
        TableRow {
            momento: MOMENTS[2].to_string(),
            actividades: "Puesta en común de resultados y reflexión sobre lo aprendido.".to_string(),
            tiempo_min: cierre,
            producto: "Conclusión individual".to_string(),
            instrumento: "Escala de valoración".to_string(),
            evaluacion_formativa: "Explica con sus palabras lo aprendido en la sesión.".to_string(),
            evaluacion_sumativa: 2,
        },
    ]
}

/// 모델 표의 숫자 규칙(행 수, 시간 합계, 평가 비중 합계)을 확인해 위반 내용을 돌려줍니다.
///
/// 위반이 있어도 표는 수정하지 않습니다. 호출하는 쪽은 로그만 남깁니다.
pub fn check_table(table: &Value, duracion: u32) -> Vec<String> {
    let Some(rows) = table.as_array() else {
        return vec!["table is not an array".to_string()];
    };

    let mut issues = Vec::new();
    if rows.len() != MOMENTS.len() {
        issues.push(format!("expected {} rows, got {}", MOMENTS.len(), rows.len()));
    }

    let minutes: Option<i64> = rows.iter().map(|r| number_field(r, "tiempo_min")).sum();
    match minutes {
        Some(total) if total == i64::from(duracion) => {}
        Some(total) => issues.push(format!("tiempo_min sums to {}, expected {}", total, duracion)),
        None => issues.push("tiempo_min missing or not numeric".to_string()),
    }

    let weights: Option<i64> = rows.iter().map(|r| number_field(r, "evaluacion_sumativa")).sum();
    match weights {
        Some(10) => {}
        Some(total) => issues.push(format!("evaluacion_sumativa sums to {}, expected 10", total)),
        None => issues.push("evaluacion_sumativa missing or not numeric".to_string()),
    }

    issues
}

// 숫자 또는 숫자 문자열 필드를 정수로 읽습니다.
fn number_field(row: &Value, key: &str) -> Option<i64> {
    match row.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

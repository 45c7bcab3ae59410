use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    optional_text, required_text, validate_duration, validate_sessions, Flexible, LessonPlan,
};

/// 한 번의 생성 요청에 담을 수 있는 최대 주제 수
pub const MAX_TOPICS_PER_BATCH: usize = 10;

/// 배치 모드의 주제 한 개: `{ "tema": "...", "duracion": 50 }`
#[derive(Debug, Clone, Deserialize)]
pub struct TopicInput {
    pub tema: Option<String>,
    pub subtema: Option<String>,
    pub duracion: Option<Flexible>,
}

/// `POST /api/planeaciones/generate` 요청 본문
///
/// 두 가지 형태를 받습니다:
/// - 배치 모드: `{materia, nivel, unidad, temas: [{tema, duracion}, ...]}`
/// - 단일 모드: `{materia, nivel, tema, subtema?, duracion, sesiones?}`
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub materia: Option<String>,
    pub nivel: Option<String>,
    pub unidad: Option<Flexible>,
    pub temas: Option<Vec<TopicInput>>,
    pub tema: Option<String>,
    pub subtema: Option<String>,
    pub duracion: Option<Flexible>,
    pub sesiones: Option<Flexible>,
}

/// 검증을 마친 주제 하나에 대한 생성 요청
///
/// 프롬프트 빌더와 생성 파이프라인은 이 타입만 받습니다.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonPlanRequest {
    pub materia: String,
    pub nivel: String,
    pub unidad: Option<String>,
    pub tema: String,
    pub subtema: Option<String>,
    /// 분 단위, 항상 MIN_DURATION_MINUTES 이상
    pub duracion: u32,
    pub sesiones: Option<u32>,
}

/// 검증된 생성 요청 묶음. 단일 모드도 항목 하나짜리 배치입니다.
#[derive(Debug, Clone)]
pub struct GenerationBatch {
    pub items: Vec<LessonPlanRequest>,
}

impl GenerateRequest {
    /// 모든 항목을 검증합니다. 하나라도 잘못되면 외부 호출 전에 배치 전체를 거부합니다.
    pub fn validate(self) -> Result<GenerationBatch, AppError> {
        let materia = required_text("materia", self.materia)?;
        let nivel = required_text("nivel", self.nivel)?;
        let unidad = self.unidad.as_ref().and_then(Flexible::as_text);
        let sesiones = validate_sessions("sesiones", self.sesiones.as_ref())?;

        let items = match self.temas {
            Some(temas) => {
                if temas.is_empty() {
                    return Err(AppError::bad_request("'temas' debe contener al menos un tema"));
                }
                if temas.len() > MAX_TOPICS_PER_BATCH {
                    return Err(AppError::bad_request(format!(
                        "Se permiten como máximo {} temas por solicitud",
                        MAX_TOPICS_PER_BATCH
                    )));
                }

                temas
                    .into_iter()
                    .enumerate()
                    .map(|(i, topic)| {
                        Ok(LessonPlanRequest {
                            materia: materia.clone(),
                            nivel: nivel.clone(),
                            unidad: unidad.clone(),
                            tema: required_text(&format!("temas[{}].tema", i), topic.tema)?,
                            subtema: optional_text(topic.subtema),
                            duracion: validate_duration(
                                &format!("temas[{}].duracion", i),
                                topic.duracion.as_ref(),
                            )?,
                            sesiones,
                        })
                    })
                    .collect::<Result<Vec<_>, AppError>>()?
            }
            None => vec![LessonPlanRequest {
                materia,
                nivel,
                unidad,
                tema: required_text("tema", self.tema)?,
                subtema: optional_text(self.subtema),
                duracion: validate_duration("duracion", self.duracion.as_ref())?,
                sesiones,
            }],
        };

        Ok(GenerationBatch { items })
    }
}

/// 생성 표의 한 행 (교육적 순간 하나)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub momento: String,
    pub actividades: String,
    pub tiempo_min: u32,
    pub producto: String,
    pub instrumento: String,
    pub evaluacion_formativa: String,
    pub evaluacion_sumativa: u32,
}

/// 세 가지 교육적 순간. 표는 항상 이 순서를 따릅니다.
pub const MOMENTS: [&str; 3] = ["Conocimientos previos", "Desarrollo", "Cierre"];

/// `POST /api/planeaciones/generate` 응답 본문
#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub batch_id: Uuid,
    pub total: usize,
    pub planeaciones: Vec<LessonPlan>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn request(body: Value) -> GenerateRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn batch_mode_shares_subject_and_level() {
        let batch = request(json!({
            "materia": "Matemáticas",
            "nivel": "primaria",
            "unidad": 1,
            "temas": [
                {"tema": "Fracciones", "duracion": 50},
                {"tema": "Decimales", "duracion": "45"}
            ]
        }))
        .validate()
        .unwrap();

        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.items[0].unidad.as_deref(), Some("1"));
        assert_eq!(batch.items[1].materia, "Matemáticas");
        assert_eq!(batch.items[1].duracion, 45);
    }

    #[test]
    fn single_mode_keeps_sessions() {
        let batch = request(json!({
            "materia": "Biología",
            "nivel": "Secundaria",
            "tema": "La célula",
            "subtema": "Organelos",
            "duracion": 100,
            "sesiones": 2
        }))
        .validate()
        .unwrap();

        assert_eq!(batch.items.len(), 1);
        let item = &batch.items[0];
        assert_eq!(item.subtema.as_deref(), Some("Organelos"));
        assert_eq!(item.sesiones, Some(2));
        assert!(item.unidad.is_none());
    }

    #[test]
    fn one_bad_topic_rejects_the_whole_batch() {
        let err = request(json!({
            "materia": "Química",
            "nivel": "prepa",
            "temas": [
                {"tema": "Átomos", "duracion": 50},
                {"tema": "Enlaces", "duracion": 5}
            ]
        }))
        .validate()
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("temas[1].duracion")));
    }

    #[test]
    fn empty_or_oversized_topic_lists_are_rejected() {
        assert!(request(json!({"materia": "A", "nivel": "B", "temas": []}))
            .validate()
            .is_err());

        let many: Vec<Value> = (0..=MAX_TOPICS_PER_BATCH)
            .map(|i| json!({"tema": format!("T{}", i), "duracion": 50}))
            .collect();
        assert!(request(json!({"materia": "A", "nivel": "B", "temas": many}))
            .validate()
            .is_err());
    }

    #[test]
    fn missing_level_is_a_client_error() {
        let err = request(json!({"materia": "Arte", "tema": "Color", "duracion": 50}))
            .validate()
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("nivel")));
    }
}

//! # 프롬프트 빌더
//!
//! 검증된 `LessonPlanRequest`를 텍스트 생성 모델에 보낼 지시문 하나로 바꿉니다.
//!
//! - 고정 템플릿: 3개의 교육적 순간으로 이루어진 JSON 배열의 모양과 필드 이름, 시간 합계 규칙
//! - 수준별 배너: `nivel` 문자열을 대소문자 구분 없이 부분 일치시켜 다섯 갈래 중 하나를 고릅니다
//!
//! 순수 함수입니다. 같은 입력이면 항상 같은 문자열을 만듭니다.

use crate::models::{LessonPlanRequest, MOMENTS};

/// 텔레메트리에 기록되는 프롬프트 버전 태그
pub const PROMPT_VERSION: &str = "v3-adaptativo";

/// 모델에 고정으로 전달하는 시스템 지시문
pub const SYSTEM_INSTRUCTION: &str = "Eres un diseñador instruccional experto en educación mexicana. \
Respondes únicamente con JSON válido, sin texto adicional ni bloques de código.";

/// 교육 수준. `classify`의 검사 순서가 곧 우선순위입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationLevel {
    Primaria,
    Secundaria,
    Preparatoria,
    Universidad,
    Other,
}

// (수준, 키워드) 목록. 이 순서대로 검사하고 처음 일치한 수준을 사용합니다.
const LEVEL_PATTERNS: [(EducationLevel, &[&str]); 4] = [
    (EducationLevel::Primaria, &["primaria"]),
    (EducationLevel::Secundaria, &["secundaria"]),
    (EducationLevel::Preparatoria, &["prepa", "preparatoria", "bachiller"]),
    (
        EducationLevel::Universidad,
        &["universidad", "licenciatura", "ingenier", "posgrado"],
    ),
];

impl EducationLevel {
    /// 자유 입력 `nivel`을 분류합니다. 대소문자를 구분하지 않는 부분 문자열 일치입니다.
    pub fn classify(nivel: &str) -> Self {
        let lowered = nivel.to_lowercase();
        LEVEL_PATTERNS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(level, _)| *level)
            .unwrap_or(EducationLevel::Other)
    }

    /// 수준별 문체·활동 지침. `Other`는 입력된 수준을 그대로 되풀이합니다.
    fn banner(&self, nivel: &str) -> String {
        match self {
            EducationLevel::Primaria => "NIVEL PRIMARIA: usa un lenguaje sencillo y lúdico. \
Propón actividades cortas, juegos, material concreto y consignas breves adecuadas para niñas y niños."
                .to_string(),
            EducationLevel::Secundaria => "NIVEL SECUNDARIA: promueve el trabajo colaborativo y el análisis. \
Incluye discusión en equipos, resolución de problemas y preguntas que conecten el tema con la vida cotidiana."
                .to_string(),
            EducationLevel::Preparatoria => "NIVEL PREPARATORIA/BACHILLERATO: usa un registro formal y fomenta el pensamiento crítico. \
Incluye argumentación, análisis de casos y productos que exijan justificar conclusiones."
                .to_string(),
            EducationLevel::Universidad => "NIVEL UNIVERSITARIO: adopta un enfoque académico basado en competencias. \
Incluye revisión de fuentes, aplicación profesional del tema y criterios de evaluación explícitos."
                .to_string(),
            EducationLevel::Other => format!(
                "NIVEL {}: adapta el lenguaje, la complejidad y las actividades al nivel indicado.",
                nivel
            ),
        }
    }
}

/// 생성 모델에 보낼 지시문을 만듭니다.
pub fn build_prompt(req: &LessonPlanRequest) -> String {
    let level = EducationLevel::classify(&req.nivel);

    let subtema = req
        .subtema
        .as_deref()
        .map(|s| format!(", subtema \"{}\"", s))
        .unwrap_or_default();
    let sesiones = req
        .sesiones
        .map(|n| format!(", distribuida en {} sesión(es)", n))
        .unwrap_or_default();
    let unidad = req
        .unidad
        .as_deref()
        .map(|u| format!(" (unidad {})", u))
        .unwrap_or_default();

    format!(
        "Elabora una planeación didáctica para la materia \"{materia}\"{unidad}, nivel \"{nivel}\", \
tema \"{tema}\"{subtema}, con una duración total de {duracion} minutos{sesiones}.\n\
\n\
{banner}\n\
\n\
Devuelve ÚNICAMENTE un arreglo JSON con exactamente 3 objetos, uno por cada momento, en este orden: \
\"{m0}\", \"{m1}\", \"{m2}\".\n\
Cada objeto debe tener exactamente estas claves:\n\
- \"momento\": nombre del momento\n\
- \"actividades\": descripción de las actividades del docente y del alumnado\n\
- \"tiempo_min\": minutos asignados (número entero)\n\
- \"producto\": evidencia o producto de aprendizaje\n\
- \"instrumento\": instrumento de evaluación\n\
- \"evaluacion_formativa\": descriptor de la evaluación formativa\n\
- \"evaluacion_sumativa\": ponderación sumativa (número entero)\n\
\n\
Reglas: la suma de \"tiempo_min\" de los 3 momentos debe ser exactamente {duracion}; \
la suma de \"evaluacion_sumativa\" debe ser exactamente 10.",
        materia = req.materia,
        unidad = unidad,
        nivel = req.nivel,
        tema = req.tema,
        subtema = subtema,
        duracion = req.duracion,
        sesiones = sesiones,
        banner = level.banner(&req.nivel),
        m0 = MOMENTS[0],
        m1 = MOMENTS[1],
        m2 = MOMENTS[2],
    )
}

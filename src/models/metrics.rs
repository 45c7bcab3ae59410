use serde::Serialize;

/// 모델 출력 처리 결과의 종류. `ia_metrics.error_tipo` 컬럼에 문자열로 저장됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 모델 출력이 그대로는 JSON 배열로 파싱되지 않음
    InvalidJson,
    /// `[...]` 부분을 잘라내 복구에 성공
    JsonRecovered,
    /// 복구도 실패해 고정 대체 표를 사용
    FallbackUsed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidJson => "invalid_json",
            ErrorKind::JsonRecovered => "json_recovered",
            ErrorKind::FallbackUsed => "fallback_used",
        }
    }
}

/// AI 호출 텔레메트리 한 건 (`ia_metrics` 테이블)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IaMetric {
    pub nivel: String,
    pub materia: String,
    pub prompt_version: String,
    pub prompt_tokens: i32,
    pub completion_tokens: i32,
    pub total_tokens: i32,
    pub json_ok: bool,
    pub error_tipo: Option<String>,
}

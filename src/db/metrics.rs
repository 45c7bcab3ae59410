use crate::error::AppError;
use crate::models::IaMetric;
use sqlx::PgPool;

/// AI 호출 텔레메트리 한 건을 `ia_metrics` 테이블에 기록합니다.
pub async fn insert_metric(pool: &PgPool, metric: &IaMetric) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO ia_metrics
            (nivel, materia, prompt_version, prompt_tokens, completion_tokens,
             total_tokens, json_ok, error_tipo)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&metric.nivel)
    .bind(&metric.materia)
    .bind(&metric.prompt_version)
    .bind(metric.prompt_tokens)
    .bind(metric.completion_tokens)
    .bind(metric.total_tokens)
    .bind(metric.json_ok)
    .bind(&metric.error_tipo)
    .execute(pool)
    .await?;

    Ok(())
}

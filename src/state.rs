use std::sync::Arc;

use crate::config::Config;
use crate::db::PlanStore;
use crate::services::identity::IdentityProvider;
use crate::services::llm::TextGenerator;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 요청 사이에 바뀌는 값은 없습니다. 모든 필드가 Arc라서 clone 비용이 작습니다.
///
/// 외부 협력자(저장소, 인증 제공자, 생성 모델)는 트레이트 객체로 보관하므로
/// 테스트에서는 메모리 구현을 넣을 수 있습니다.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn PlanStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub model: Arc<dyn TextGenerator>,
}

//! 파이프라인 trait -- 다운스트림 확장 포인트 정의

use crate::error::TelestreamError;
use crate::types::DataContext;

/// 변환이 끝난 레코드를 받는 싱크
///
/// 메시지 큐, HTTP, gRPC 전송기 등 컨슈머 통합은 이 trait을 구현합니다.
/// 파이프라인은 컨슈머 에러를 기록만 하고 처리를 계속합니다.
pub trait Consumer: Send + Sync {
    /// 컨슈머 이름
    fn name(&self) -> &str;

    /// 변환된 레코드를 처리
    fn consume(&self, ctx: &DataContext) -> Result<(), TelestreamError>;
}

//! 파이프라인 에러 타입
//!
//! 변환 코어는 레코드 단위로 실패하지 않으므로, [`PipelineStageError`]는 파이프라인
//! 구성과 비동기 디스패치 루프에서만 발생합니다.
//! `From<PipelineStageError> for TelestreamError` 변환으로 `?` 전파가 가능합니다.

use telestream_core::error::{PipelineError, TelestreamError};
use telestream_core::SpecError;

/// 파이프라인 단계 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineStageError {
    /// 엔진 설정 검증 실패 등 core 에러
    #[error(transparent)]
    Core(#[from] TelestreamError),

    /// 액션 목록 구성 실패
    #[error("action list error: {0}")]
    Actions(#[from] SpecError),

    /// 채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 컨슈머 처리 실패
    #[error("consumer '{consumer}' failed: {reason}")]
    Consumer {
        /// 컨슈머 이름
        consumer: String,
        /// 실패 사유
        reason: String,
    },
}

impl From<PipelineStageError> for TelestreamError {
    fn from(err: PipelineStageError) -> Self {
        match err {
            PipelineStageError::Core(inner) => inner,
            PipelineStageError::Actions(spec) => TelestreamError::Spec(spec),
            PipelineStageError::Channel(reason) => {
                TelestreamError::Pipeline(PipelineError::ChannelSend(reason))
            }
            PipelineStageError::Consumer { consumer, reason } => {
                TelestreamError::Pipeline(PipelineError::Consumer { consumer, reason })
            }
        }
    }
}

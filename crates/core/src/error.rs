//! 에러 타입 -- 도메인별 에러 정의
//!
//! 변환 코어(분할, 분류, 경로 매칭, 액션 실행)는 레코드 단위로 절대 실패하지 않습니다.
//! 여기 정의된 에러는 경계(설정 로딩, 액션 스펙 컴파일, 디스패치 채널)에서만 사용됩니다.

/// telestream 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum TelestreamError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 선택자/액션 스펙 에러
    #[error("spec error: {0}")]
    Spec(#[from] SpecError),

    /// 파이프라인 처리 에러
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 선택자(LocationSpec) 및 액션 스펙 에러
///
/// 액션 엔진은 이 에러를 해당 액션 하나의 no-op으로 강등시킵니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// 키 패턴 정규식 컴파일 실패
    #[error("invalid key pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// 필드 타입 불일치 (예: object가 아닌 `locations`)
    #[error("field '{field}' has wrong type: expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    /// 액션 종류를 결정할 수 없음
    #[error("action kind is ambiguous or missing: {0}")]
    Kind(String),

    /// 필수 필드 누락
    #[error("missing required field '{0}'")]
    MissingField(String),

    /// 쿼리 표현식 컴파일 실패
    #[error("invalid expression: {0}")]
    Expression(String),
}

/// 파이프라인 처리 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 채널 전송 실패
    #[error("channel send failed: {0}")]
    ChannelSend(String),

    /// 컨슈머 처리 실패
    #[error("consumer '{consumer}' failed: {reason}")]
    Consumer { consumer: String, reason: String },
}

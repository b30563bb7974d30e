//! 설정 관리 -- 변환 엔진 런타임 설정
//!
//! [`EngineConfig`]는 프레임 분할, 경로 탐색 제한, 정규식 크기 제한 등
//! 변환 엔진의 조절 값을 담습니다. 액션 목록 자체는 설정 로더가 JSON으로
//! 넘겨주며 이 구조체에 포함되지 않습니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`TELESTREAM_MAX_DEPTH=32` 형식)
//! 2. 설정 파일 (`telestream.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), telestream_core::error::TelestreamError> {
//! use telestream_core::config::EngineConfig;
//!
//! let config = EngineConfig::load("telestream.toml").await?;
//! let config = EngineConfig::parse("separator = \"\\n\"\n[limits]\nmax_depth = 32")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, TelestreamError};

/// 변환 엔진 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 레코드 구분자
    pub separator: String,
    /// 스트림에서 보류할 수 있는 미완성 프레임 최대 크기 (바이트)
    pub max_frame_bytes: usize,
    /// 경로 탐색 제한
    pub limits: TraversalLimits,
    /// 컴파일된 정규식 최대 크기 (바이트)
    pub regex_size_limit: usize,
    /// 비동기 디스패치 채널 용량
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            separator: "\n".to_owned(),
            max_frame_bytes: 1024 * 1024, // 1MB
            limits: TraversalLimits::default(),
            regex_size_limit: 1024 * 1024,
            channel_capacity: 1024,
        }
    }
}

impl EngineConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, TelestreamError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, TelestreamError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TelestreamError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                TelestreamError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, TelestreamError> {
        toml::from_str(toml_str).map_err(|e| {
            TelestreamError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `TELESTREAM_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.separator, "TELESTREAM_SEPARATOR");
        override_usize(&mut self.max_frame_bytes, "TELESTREAM_MAX_FRAME_BYTES");
        override_usize(&mut self.limits.max_depth, "TELESTREAM_MAX_DEPTH");
        override_usize(&mut self.limits.max_nodes, "TELESTREAM_MAX_NODES");
        override_usize(&mut self.regex_size_limit, "TELESTREAM_REGEX_SIZE_LIMIT");
        override_usize(&mut self.channel_capacity, "TELESTREAM_CHANNEL_CAPACITY");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TelestreamError> {
        if self.separator.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "separator".to_owned(),
                reason: "separator must not be empty".to_owned(),
            }
            .into());
        }

        if self.separator.contains(['"', '\'', '\\']) {
            return Err(ConfigError::InvalidValue {
                field: "separator".to_owned(),
                reason: "separator must not contain quote or backslash characters".to_owned(),
            }
            .into());
        }

        if self.max_frame_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_frame_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        self.limits.validate()?;

        if self.regex_size_limit < 1024 {
            return Err(ConfigError::InvalidValue {
                field: "regex_size_limit".to_owned(),
                reason: "must be at least 1024 bytes".to_owned(),
            }
            .into());
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "channel_capacity".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 경로 탐색 제한
///
/// 신뢰할 수 없는 거대 페이로드에 대한 방어선입니다. 깊이 제한을 넘은 가지는
/// "매칭 없음"으로 처리하고, 노드 방문 수 제한을 넘으면 해당 호출의 나머지
/// 탐색을 중단합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalLimits {
    /// 최대 탐색 깊이
    pub max_depth: usize,
    /// 호출당 최대 방문 노드 수
    pub max_nodes: usize,
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 1_000_000,
        }
    }
}

impl TraversalLimits {
    /// 제한값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), TelestreamError> {
        const MAX_DEPTH: usize = 1024;

        if self.max_depth == 0 || self.max_depth > MAX_DEPTH {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_depth".to_owned(),
                reason: format!("must be 1-{MAX_DEPTH}"),
            }
            .into());
        }

        if self.max_nodes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_nodes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = EngineConfig::default();
        assert_eq!(config.separator, "\n");
        assert_eq!(config.limits.max_depth, 64);
        assert!(config.max_frame_bytes > 0);
    }

    #[test]
    fn default_config_passes_validation() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
separator = "\r\n"

[limits]
max_depth = 16
"#;
        let config = EngineConfig::parse(toml).unwrap();
        assert_eq!(config.separator, "\r\n");
        assert_eq!(config.limits.max_depth, 16);
        assert_eq!(config.limits.max_nodes, TraversalLimits::default().max_nodes);
        assert_eq!(config.channel_capacity, 1024);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = EngineConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            TelestreamError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_empty_separator() {
        let config = EngineConfig {
            separator: String::new(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("separator"));
    }

    #[test]
    fn validate_rejects_quote_in_separator() {
        let config = EngineConfig {
            separator: "\"".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_depth() {
        let mut config = EngineConfig::default();
        config.limits.max_depth = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("limits.max_depth"));
    }

    #[test]
    fn validate_rejects_tiny_regex_limit() {
        let config = EngineConfig {
            regex_size_limit: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_usize() {
        let mut config = EngineConfig::default();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TELESTREAM_MAX_DEPTH", "8") };
        config.apply_env_overrides();
        assert_eq!(config.limits.max_depth, 8);
        unsafe { std::env::remove_var("TELESTREAM_MAX_DEPTH") };
    }

    #[test]
    #[serial]
    fn env_override_invalid_keeps_original() {
        let mut config = EngineConfig::default();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TELESTREAM_CHANNEL_CAPACITY", "lots") };
        config.apply_env_overrides();
        assert_eq!(config.channel_capacity, 1024);
        unsafe { std::env::remove_var("TELESTREAM_CHANNEL_CAPACITY") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_TELESTREAM_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = EngineConfig::parse(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = EngineConfig::from_file("/nonexistent/path/telestream.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TelestreamError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}

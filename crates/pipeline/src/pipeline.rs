//! 파이프라인 오케스트레이션 -- 분할/분류/액션 실행/디스패치의 전체 흐름
//!
//! # 내부 아키텍처
//! ```text
//! raw bytes -> mpsc -> FrameAccumulator -> RecordClassifier -> ActionEngine -> Consumer
//!                                                                  ^
//!                                         poll data (DataContext) -+
//! ```
//!
//! 변환 단계는 모두 동기 함수입니다. [`TelemetryPipeline::run`]만 비동기로,
//! 채널에서 원시 버퍼를 받아 처리하고 취소 토큰이나 채널 종료 시 멈춥니다.

use std::sync::Arc;

use bytes::Bytes;
use metrics::counter;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use telestream_core::error::TelestreamError;
use telestream_core::metrics as m;
use telestream_core::{Consumer, DataContext, EngineConfig};

use crate::action::{ActionEngine, ActionSpec};
use crate::classify::RecordClassifier;
use crate::error::PipelineStageError;
use crate::frame::{FrameAccumulator, FrameSplitter};

/// 실행 루프 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// 처리한 프레임 수
    pub frames: u64,
    /// 컨슈머가 수락한 컨텍스트 수
    pub dispatched: u64,
    /// 컨슈머 에러 수
    pub consumer_errors: u64,
}

/// 텔레메트리 변환 파이프라인
///
/// 분류기와 액션 엔진은 불변이므로 `Arc<TelemetryPipeline>`으로 여러 연결/폴링
/// 작업에서 공유할 수 있습니다. 컨텍스트는 호출마다 독점 소유됩니다.
///
/// # 사용 예시
/// ```
/// use serde_json::json;
/// use telestream_pipeline::TelemetryPipeline;
///
/// let pipeline = TelemetryPipeline::builder()
///     .actions_json(json!([{"enable": true, "setTag": {"env": "prod"}}]))
///     .build()
///     .unwrap();
///
/// let contexts = pipeline.process_buffer("lsn_event=\"LSN_ADD\"\n");
/// assert_eq!(contexts.len(), 1);
/// assert_eq!(contexts[0].data.to_value(), json!({"lsn_event": "LSN_ADD", "env": "prod"}));
/// ```
#[derive(Debug)]
pub struct TelemetryPipeline {
    config: EngineConfig,
    classifier: RecordClassifier,
    engine: Arc<ActionEngine>,
}

impl TelemetryPipeline {
    /// 빌더를 생성합니다.
    pub fn builder() -> TelemetryPipelineBuilder {
        TelemetryPipelineBuilder::new()
    }

    /// 엔진 설정
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 액션 엔진
    pub fn engine(&self) -> &ActionEngine {
        &self.engine
    }

    /// 원시 버퍼 입력 채널을 생성합니다 (용량: `channel_capacity`).
    pub fn input_channel(&self) -> (mpsc::Sender<Bytes>, mpsc::Receiver<Bytes>) {
        mpsc::channel(self.config.channel_capacity)
    }

    /// 프레임 하나를 분류하고 액션을 실행합니다.
    pub fn process_frame(&self, frame: &str) -> DataContext {
        let ctx = self.classifier.classify(frame);
        self.process_context(ctx)
    }

    /// 완결된 버퍼를 분할하여 프레임마다 처리합니다.
    ///
    /// 버퍼 끝의 미완성 프레임도 하나의 프레임으로 처리합니다. 스트림의 꼬리
    /// 이월이 필요하면 [`run`](Self::run) 또는 [`FrameAccumulator`]를 사용합니다.
    pub fn process_buffer(&self, buffer: &str) -> Vec<DataContext> {
        FrameSplitter::split(buffer, &self.config.separator)
            .into_iter()
            .map(|frame| self.process_frame(frame))
            .collect()
    }

    /// 구조화된 컨텍스트(폴링 데이터)에 액션을 실행합니다.
    pub fn process_context(&self, mut ctx: DataContext) -> DataContext {
        self.engine.execute(&mut ctx);
        ctx
    }

    /// 채널에서 원시 버퍼를 받아 처리하고 결과를 컨슈머에 전달합니다.
    ///
    /// 취소되거나 송신측이 모두 닫히면 남은 꼬리 프레임을 처리한 뒤 반환합니다.
    /// 컨슈머 에러는 기록만 하고 루프를 계속합니다.
    pub async fn run<C>(
        &self,
        mut rx: mpsc::Receiver<Bytes>,
        consumer: &C,
        cancel: CancellationToken,
    ) -> RunStats
    where
        C: Consumer + ?Sized,
    {
        let mut accumulator =
            FrameAccumulator::new(self.config.separator.clone(), self.config.max_frame_bytes);
        let mut stats = RunStats::default();

        info!(consumer = consumer.name(), "telemetry pipeline started");

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("telemetry pipeline cancelled");
                    break;
                }
                received = rx.recv() => {
                    let Some(chunk) = received else {
                        debug!("input channel closed");
                        break;
                    };
                    for frame in accumulator.push(&chunk) {
                        self.dispatch(&frame, consumer, &mut stats);
                    }
                }
            }
        }

        if let Some(rest) = accumulator.flush() {
            self.dispatch(&rest, consumer, &mut stats);
        }

        info!(
            frames = stats.frames,
            dispatched = stats.dispatched,
            consumer_errors = stats.consumer_errors,
            "telemetry pipeline stopped"
        );
        stats
    }

    fn dispatch<C>(&self, frame: &str, consumer: &C, stats: &mut RunStats)
    where
        C: Consumer + ?Sized,
    {
        stats.frames += 1;
        let ctx = self.process_frame(frame);

        match consumer.consume(&ctx) {
            Ok(()) => {
                stats.dispatched += 1;
                counter!(m::CONTEXTS_DISPATCHED_TOTAL).increment(1);
            }
            Err(e) => {
                stats.consumer_errors += 1;
                let err = PipelineStageError::Consumer {
                    consumer: consumer.name().to_owned(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "consumer rejected context");
                counter!(m::CONSUMER_ERRORS_TOTAL, m::LABEL_CONSUMER => consumer.name().to_owned())
                    .increment(1);
            }
        }
    }
}

/// 파이프라인 빌더
pub struct TelemetryPipelineBuilder {
    config: EngineConfig,
    specs: Vec<ActionSpec>,
    actions_json: Option<Value>,
    classifier: Option<RecordClassifier>,
}

impl TelemetryPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            specs: Vec::new(),
            actions_json: None,
            classifier: None,
        }
    }

    /// 엔진 설정을 지정합니다.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// 역직렬화된 액션 목록을 지정합니다.
    pub fn actions(mut self, specs: Vec<ActionSpec>) -> Self {
        self.specs = specs;
        self.actions_json = None;
        self
    }

    /// JSON 배열 형태의 액션 목록을 지정합니다.
    pub fn actions_json(mut self, actions: Value) -> Self {
        self.actions_json = Some(actions);
        self.specs.clear();
        self
    }

    /// 분류기를 교체합니다 (기본: [`RecordClassifier::new`]).
    pub fn classifier(mut self, classifier: RecordClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// 파이프라인을 빌드합니다.
    ///
    /// 설정 검증에 실패하거나 액션 목록의 최상위가 배열이 아니면 에러입니다.
    /// 개별 액션 오류는 에러가 아니며 해당 액션만 no-op이 됩니다.
    pub fn build(self) -> Result<TelemetryPipeline, PipelineStageError> {
        self.config.validate()?;

        let engine = match &self.actions_json {
            Some(json) => ActionEngine::from_json_with_config(json, &self.config)?,
            None => ActionEngine::with_config(self.specs, &self.config),
        };

        Ok(TelemetryPipeline {
            classifier: self.classifier.unwrap_or_default(),
            engine: Arc::new(engine),
            config: self.config,
        })
    }
}

impl Default for TelemetryPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 컨텍스트를 mpsc 채널로 넘기는 컨슈머
///
/// 외부 디스패처와의 경계입니다. 채널이 가득 차거나 닫히면 에러를 반환합니다.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    name: String,
    tx: mpsc::Sender<DataContext>,
}

impl ChannelConsumer {
    /// 새 채널 컨슈머를 생성합니다.
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<DataContext>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }
}

impl Consumer for ChannelConsumer {
    fn name(&self) -> &str {
        &self.name
    }

    fn consume(&self, ctx: &DataContext) -> Result<(), TelestreamError> {
        self.tx
            .try_send(ctx.clone())
            .map_err(|e| PipelineStageError::Channel(e.to_string()).into())
    }
}

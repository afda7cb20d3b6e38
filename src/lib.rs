//! sconvert - JSON/JSONL TO SERVING FORMAT CONVERTER
//!
//! 대화 학습 데이터(JSON / JSONL / 파트 파일)를 검증하고 서빙 시스템이
//! 소비하는 정규화된 JSONL 포맷으로 변환하는 고성능 CLI 도구입니다.
//! 입력 파일 하나마다 출력 파일 하나를 생성합니다.
//!
//! # 주요 기능
//!
//! - 🔍 **구조 자동 판별**: 단일 JSON 문서 / 레코드 배열 / JSONL을 선행 바이트로 판별
//! - 🌊 **스트리밍 파싱**: 대용량 배열 파일을 전체 적재 없이 요소 단위로 처리
//! - 🚀 **병렬 처리**: Rayon을 활용한 파일 단위 멀티스레드 변환
//! - 🛡️ **레코드 격리**: 잘못된 레코드는 위치/사유만 기록하고 배치는 계속 진행
//! - 🎯 **스키마 선택**: strict(`id`/`conversations`) / legacy(`raw_data.data`) 지원
//! - 📊 **상세 통계**: 파일별 레코드 수, 변환 성공/실패, 입출력 용량 표시
//! - 🎨 **컬러 출력**: 가독성 높은 컬러 터미널 출력
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법 (config.json 또는 data/input → data/output)
//! sconvert -i ./data/input -o ./data/output
//!
//! # 파일당 1000 레코드까지만 변환
//! sconvert -i ./data/input -m 1000
//!
//! # strict 스키마만 허용
//! sconvert -i ./data/input --schema strict
//! ```

pub mod batch;
pub mod cli;
pub mod config;
pub mod detector;
pub mod discovery;
pub mod error;
pub mod processor;
pub mod schema;
pub mod serving;
pub mod stats;

// Re-exports for convenient access
pub use batch::{output_path_for, run_batch};
pub use cli::Args;
pub use config::Config;
pub use detector::{detect, ContentKind, RecordPosition};
pub use discovery::collect_input_files;
pub use error::{Result, SconvertError};
pub use processor::{process_file, FileReport, ProcessOptions, RecordFailure};
pub use schema::{validate, RecordError, SchemaMode, ValidatedRecord};
pub use serving::{to_serving, ServingRecord, ServingTurn};
pub use stats::{format_bytes, BatchSummary};

//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

use crate::schema::SchemaMode;

/// sconvert CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "sconvert",
    author = "YourName <your@email.com>",
    version,
    about = "JSON/JSONL TO SERVING FORMAT CONVERTER - 대화 학습 데이터를 서빙 포맷 JSONL로 변환하는 고성능 CLI 도구",
    long_about = r#"
JSON/JSONL TO SERVING FORMAT CONVERTER
======================================

JSON / JSONL / 파트 파일 형태의 대화 학습 데이터를 검증하고
서빙 시스템이 소비하는 정규화된 JSONL로 변환합니다.
입력 파일 하나마다 출력 파일 하나가 생성됩니다.

특징:
  • 파일 구조 자동 판별 (단일 문서 / 레코드 배열 / JSONL)
  • 대용량 배열 파일 스트리밍 파싱 (전체 적재 없음)
  • 병렬 처리로 대량 파일 고속 변환
  • 잘못된 레코드는 건너뛰고 위치와 사유 보고
  • strict / legacy 두 입력 스키마 지원

예제:
  sconvert -i ./data/input -o ./data/output
  sconvert -i ./data/input -m 1000 --schema strict
  sconvert -i single_file.jsonl -o ./out --verbose
  sconvert -i ./data/input --pattern "*.json.part-*" --dry-run
"#
)]
pub struct Args {
    /// 입력 디렉토리 또는 단일 파일 경로 (기본값: 설정 파일 또는 data/input)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// 출력 디렉토리 경로 (기본값: 설정 파일 또는 data/output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 파일당 유효 레코드 상한
    #[arg(short = 'm', long)]
    pub max_records: Option<usize>,

    /// 배치당 처리할 파일 수 상한
    #[arg(short = 'f', long)]
    pub max_files: Option<usize>,

    /// 허용할 입력 스키마
    #[arg(long, value_enum, default_value_t = SchemaMode::Auto)]
    pub schema: SchemaMode,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "*_SUM_*", "data?.jsonl")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 설정 파일 경로
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 최대 폴더 탐색 깊이
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,
}

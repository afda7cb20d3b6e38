//! 설정 파일 모듈
//!
//! 선택적 `config.json`에서 기본 입출력 경로와 상한 값을 읽습니다.
//! 상대 경로는 설정 파일이 있는 디렉토리를 기준으로 해석하며,
//! CLI 인자가 설정보다, 설정이 내장 기본값보다 우선합니다.

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{Result, SconvertError};

/// 내장 기본 입력 디렉토리
pub const DEFAULT_INPUT_DIR: &str = "data/input";
/// 내장 기본 출력 디렉토리
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// config.json의 내용
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 기본 입력 디렉토리
    pub input_dir: Option<PathBuf>,
    /// 기본 출력 디렉토리
    pub output_dir: Option<PathBuf>,
    /// 파일당 유효 레코드 상한
    pub max_output_records: Option<usize>,
    /// 배치당 파일 수 상한
    pub max_input_files: Option<usize>,
}

impl Config {
    /// 설정 파일 로드
    ///
    /// 파일이 없으면 빈 설정을 반환합니다. 파일이 존재하지만
    /// 읽거나 파싱할 수 없으면 에러입니다.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let file = File::open(path).map_err(|e| SconvertError::ConfigError {
            file: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config: Config =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                SconvertError::ConfigError {
                    file: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.input_dir = config.input_dir.map(|p| resolve_path(base, p));
        config.output_dir = config.output_dir.map(|p| resolve_path(base, p));

        Ok(config)
    }

    /// CLI 인자 → 설정 → 기본값 순서로 입력 디렉토리 결정
    pub fn resolve_input_dir(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.input_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR))
    }

    /// CLI 인자 → 설정 → 기본값 순서로 출력 디렉토리 결정
    pub fn resolve_output_dir(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    /// CLI 인자 → 설정 순서로 파일당 레코드 상한 결정 (기본: 없음)
    pub fn resolve_max_records(&self, cli: Option<usize>) -> Option<usize> {
        cli.or(self.max_output_records)
    }

    /// CLI 인자 → 설정 순서로 파일 수 상한 결정 (기본: 없음)
    pub fn resolve_max_files(&self, cli: Option<usize>) -> Option<usize> {
        cli.or(self.max_input_files)
    }
}

/// 상대 경로를 기준 디렉토리에 대해 해석
fn resolve_path(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

//! 배치 조정 모듈
//!
//! 입력 파일 목록을 워커 풀에 분배하고 파일별 결과를 수집합니다.
//! 워커 사이에 공유되는 가변 상태는 없으며, 집계는 수집이 끝난 뒤
//! [`crate::stats::BatchSummary`]에서 이루어집니다.

use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SconvertError};
use crate::processor::{process_file, FileReport, ProcessOptions};

/// 처리 완료 출력 파일 이름의 접미사
const OUTPUT_SUFFIX: &str = "_processed";

/// 입력 파일 이름에서 출력 파일 이름 유도
///
/// - `X.json` / `X.jsonl` → `X_processed.jsonl`
/// - `X.json.part-N` → `X_processed.part-N.jsonl` (파트 번호 유지)
/// - 그 외 → 전체 이름 + `_processed.jsonl`
pub fn output_file_name(input: &Path) -> String {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("input");

    if let Some(base) = name.find(".json.part-").map(|idx| &name[..idx]) {
        let part = &name[base.len() + ".json.part-".len()..];
        return format!("{}{}.part-{}.jsonl", base, OUTPUT_SUFFIX, part);
    }

    let stem = name
        .strip_suffix(".jsonl")
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(name);
    format!("{}{}.jsonl", stem, OUTPUT_SUFFIX)
}

/// 입력 파일에 대응하는 출력 경로 계산
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    output_dir.join(output_file_name(input))
}

/// 입력 파일들을 워커 풀에서 병렬 변환
///
/// 파일 하나는 워커 하나가 끝까지 처리하며, 한 파일의 실패가
/// 다른 파일의 처리를 취소하지 않습니다. 결과 목록은 입력 목록과
/// 같은 순서로 반환됩니다 (완료 순서와 무관).
///
/// # Arguments
/// * `files` - 입력 파일 경로 목록
/// * `output_dir` - 출력 디렉토리 (없으면 생성)
/// * `options` - 파일 처리 옵션
/// * `on_file_done` - 파일 하나가 끝날 때마다 호출되는 콜백 (진행률 표시용)
pub fn run_batch<F>(
    files: &[PathBuf],
    output_dir: &Path,
    options: &ProcessOptions,
    on_file_done: F,
) -> Result<Vec<FileReport>>
where
    F: Fn(&FileReport) + Sync,
{
    fs::create_dir_all(output_dir).map_err(|e| SconvertError::OutputDirError {
        path: output_dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|input| {
            let output = output_path_for(input, output_dir);
            let report = process_file(input.clone(), output, options);
            on_file_done(&report);
            report
        })
        .collect();

    Ok(reports)
}

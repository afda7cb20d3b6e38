//! 입력 파일 탐색 모듈
//!
//! 입력 디렉토리를 재귀 탐색하여 인식 가능한 형태의 파일
//! (`.json`, `.jsonl`, `.json.part-N`)을 수집합니다.
//! 선택적으로 glob 패턴으로 파일 이름을 필터링합니다.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, SconvertError};

/// 파일 이름이 인식 가능한 입력 형태인지 확인
///
/// # Examples
/// ```
/// use sconvert::discovery::is_candidate_name;
///
/// assert!(is_candidate_name("data.json"));
/// assert!(is_candidate_name("data.JSONL"));
/// assert!(is_candidate_name("corpus.json.part-07"));
/// assert!(!is_candidate_name("notes.txt"));
/// ```
pub fn is_candidate_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".json") || lower.ends_with(".jsonl") {
        return true;
    }
    // 파트 파일: X.json.part-N
    if let Some(rest) = lower
        .find(".json.part-")
        .map(|idx| &lower[idx + ".json.part-".len()..])
    {
        return !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit());
    }
    false
}

/// 입력 경로에서 후보 파일 목록 수집
///
/// 경로가 파일이면 그 파일 하나만 반환하고, 디렉토리이면 재귀 탐색
/// 결과를 정렬하여 반환합니다 (결정적 순서).
///
/// # Arguments
/// * `input` - 입력 파일 또는 디렉토리 경로
/// * `pattern` - 선택적 glob 파일 이름 필터 (예: `"*_SUM_*"`)
/// * `max_depth` - 최대 탐색 깊이 (None이면 무제한)
pub fn collect_input_files(
    input: &Path,
    pattern: Option<&str>,
    max_depth: Option<usize>,
) -> Result<Vec<PathBuf>> {
    if !input.exists() {
        return Err(SconvertError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let compiled = pattern
        .map(|p| {
            Pattern::new(p).map_err(|_| SconvertError::InvalidPattern {
                pattern: p.to_string(),
            })
        })
        .transpose()?;

    let walker = if let Some(max_depth) = max_depth {
        WalkDir::new(input).max_depth(max_depth)
    } else {
        WalkDir::new(input)
    };

    let mut files: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|s| s.to_str())
                .map(|name| {
                    is_candidate_name(name)
                        && compiled.as_ref().map(|p| p.matches(name)).unwrap_or(true)
                })
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();

    Ok(files)
}

//! 파일 스트림 처리 모듈
//!
//! 입력 파일 하나를 구조 판별 → 레코드 반복 → 검증 → 변환 → 증분 쓰기의
//! 순서로 처리합니다. 레코드 하나의 실패는 기록만 남기고 파일 처리를
//! 계속하며, 파일 자체를 열 수 없으면 0/0 결과로 보고합니다.

use memmap2::Mmap;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use crate::detector::{self, ArrayRecords, ContentKind, LineRecords, RecordPosition};
use crate::schema::{validate, RecordError, SchemaMode};
use crate::serving::to_serving;

/// 레코드 단위 실패 기록 (위치 + 사유)
#[derive(Debug, Clone)]
pub struct RecordFailure {
    pub position: RecordPosition,
    pub reason: RecordError,
}

/// 파일 하나의 처리 결과
///
/// 워커가 단독으로 생성하며, 집계는 모든 워커가 끝난 뒤
/// 수집된 결과 목록 위에서만 이루어집니다.
#[derive(Debug)]
pub struct FileReport {
    /// 입력 파일 경로
    pub path: PathBuf,
    /// 출력 파일 경로 (열기에 성공한 경우)
    pub output: Option<PathBuf>,
    /// 판별된 파일 구조
    pub kind: Option<ContentKind>,
    /// 확인한 전체 레코드 수
    pub total: usize,
    /// 변환하여 기록한 레코드 수
    pub valid: usize,
    /// 읽은 바이트
    pub bytes_read: u64,
    /// 쓴 바이트
    pub bytes_written: u64,
    /// 레코드 단위 실패 목록
    pub failures: Vec<RecordFailure>,
    /// 파일 단위 I/O 에러 (열기/쓰기 실패)
    pub io_error: Option<String>,
}

impl FileReport {
    fn new(path: PathBuf, output: PathBuf, kind: ContentKind) -> Self {
        Self {
            path,
            output: Some(output),
            kind: Some(kind),
            total: 0,
            valid: 0,
            bytes_read: 0,
            bytes_written: 0,
            failures: Vec::new(),
            io_error: None,
        }
    }

    /// 파일을 열거나 읽을 수 없을 때의 0/0 결과 생성
    pub fn unreadable(path: PathBuf, reason: String) -> Self {
        Self {
            path,
            output: None,
            kind: None,
            total: 0,
            valid: 0,
            bytes_read: 0,
            bytes_written: 0,
            failures: Vec::new(),
            io_error: Some(reason),
        }
    }

    /// 실패한 레코드 수 반환
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    fn cap_reached(&self, max_records: Option<usize>) -> bool {
        max_records.is_some_and(|max| self.valid >= max)
    }
}

/// 파일 처리 옵션
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// 파일당 유효 레코드 상한 (None이면 무제한)
    pub max_records: Option<usize>,
    /// 허용할 스키마 집합
    pub schema: SchemaMode,
    /// 단일 문서 파일의 메모리 매핑 임계값 (이상이면 mmap 파싱)
    pub mmap_threshold: u64,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            max_records: None,
            schema: SchemaMode::Auto,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        }
    }

    /// 파일당 유효 레코드 상한 설정
    pub fn with_max_records(mut self, max_records: Option<usize>) -> Self {
        self.max_records = max_records;
        self
    }

    /// 허용 스키마 설정
    pub fn with_schema(mut self, schema: SchemaMode) -> Self {
        self.schema = schema;
        self
    }
}

/// 입력 파일 하나를 서빙 포맷 JSONL로 변환
///
/// # Arguments
/// * `input` - 입력 파일 경로
/// * `output` - 출력 파일 경로 (생성/덮어쓰기)
/// * `options` - 처리 옵션
///
/// # Returns
/// 결과와 관계없이 항상 `FileReport` 반환 (실패는 내부에 기록)
pub fn process_file(input: PathBuf, output: PathBuf, options: &ProcessOptions) -> FileReport {
    let file_size = std::fs::metadata(&input).map(|m| m.len()).unwrap_or(0);

    let file = match File::open(&input) {
        Ok(file) => file,
        Err(e) => return FileReport::unreadable(input, format!("열기 실패: {}", e)),
    };

    let mut reader = BufReader::new(file);
    let kind = match detector::detect(&mut reader) {
        Ok(kind) => kind,
        Err(e) => return FileReport::unreadable(input, format!("구조 판별 실패: {}", e)),
    };

    let out_file = match File::create(&output) {
        Ok(file) => file,
        Err(e) => return FileReport::unreadable(input, format!("출력 파일 생성 실패: {}", e)),
    };
    let mut writer = BufWriter::new(out_file);

    let mut report = FileReport::new(input, output, kind);
    report.bytes_read = file_size;

    match kind {
        ContentKind::SingleDocument => {
            let decoded = if file_size >= options.mmap_threshold {
                parse_with_mmap(reader.get_ref())
            } else {
                parse_with_reader(reader)
            };
            consume_record(
                &mut report,
                &mut writer,
                options,
                RecordPosition::Document,
                decoded,
            );
        }
        ContentKind::RecordArray => {
            for (position, decoded) in ArrayRecords::new(reader) {
                if report.cap_reached(options.max_records) {
                    break;
                }
                if !consume_record(&mut report, &mut writer, options, position, decoded) {
                    break;
                }
            }
        }
        ContentKind::JsonLines => {
            for (position, decoded) in LineRecords::new(reader) {
                if report.cap_reached(options.max_records) {
                    break;
                }
                if !consume_record(&mut report, &mut writer, options, position, decoded) {
                    break;
                }
            }
        }
    }

    if let Err(e) = writer.flush() {
        report.io_error = Some(format!("출력 플러시 실패: {}", e));
    }

    report
}

/// 레코드 하나를 검증/변환/기록
///
/// 반환값이 false이면 파일 처리를 중단해야 합니다 (쓰기 실패).
fn consume_record(
    report: &mut FileReport,
    writer: &mut BufWriter<File>,
    options: &ProcessOptions,
    position: RecordPosition,
    decoded: Result<Value, String>,
) -> bool {
    report.total += 1;

    let raw = match decoded {
        Ok(raw) => raw,
        Err(reason) => {
            report.failures.push(RecordFailure {
                position,
                reason: RecordError::Decode { reason },
            });
            return true;
        }
    };

    let validated = match validate(&raw, options.schema) {
        Ok(validated) => validated,
        Err(reason) => {
            report.failures.push(RecordFailure { position, reason });
            return true;
        }
    };

    let line = match serde_json::to_string(&to_serving(validated)) {
        Ok(line) => line,
        Err(e) => {
            report.io_error = Some(format!("직렬화 실패: {}", e));
            return false;
        }
    };

    if let Err(e) = writeln!(writer, "{}", line) {
        report.io_error = Some(format!("쓰기 실패: {}", e));
        return false;
    }

    report.valid += 1;
    report.bytes_written += line.len() as u64 + 1; // +1은 개행
    true
}

/// 버퍼 리더로 단일 문서 파싱
fn parse_with_reader(reader: BufReader<File>) -> Result<Value, String> {
    serde_json::from_reader(reader).map_err(|e| e.to_string())
}

/// 메모리 매핑으로 단일 문서 파싱 (대용량 파일용)
fn parse_with_mmap(file: &File) -> Result<Value, String> {
    let mmap = unsafe { Mmap::map(file).map_err(|e| format!("메모리 매핑 실패: {}", e))? };
    serde_json::from_slice(&mmap).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn legacy_line(text: &str) -> String {
        format!(
            r#"{{"raw_data": {{"data": [{{"role": "user", "text": "{}"}}]}}}}"#,
            text
        )
    }

    #[test]
    fn test_jsonl_mixed_lines() {
        let temp_dir = TempDir::new().unwrap();
        let content = format!("{}\nnot json\n{}\n", legacy_line("a"), legacy_line("b"));
        let input = write_input(temp_dir.path(), "mixed.jsonl", &content);
        let output = temp_dir.path().join("mixed_processed.jsonl");

        let report = process_file(input, output.clone(), &ProcessOptions::new());

        assert_eq!(report.total, 3);
        assert_eq!(report.valid, 2);
        assert_eq!(report.failed(), 1);
        assert!(report.io_error.is_none());

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written.lines().count(), 2);
        for line in written.lines() {
            let value: Value = serde_json::from_str(line).unwrap();
            assert!(value.get("model_control").is_some());
            assert!(value.get("data").is_some());
        }
    }

    #[test]
    fn test_decode_failure_position() {
        let temp_dir = TempDir::new().unwrap();
        let content = format!("{}\n{{broken\n", legacy_line("a"));
        let input = write_input(temp_dir.path(), "bad.jsonl", &content);
        let output = temp_dir.path().join("out.jsonl");

        let report = process_file(input, output, &ProcessOptions::new());

        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].position, RecordPosition::Line(2));
        assert!(matches!(
            report.failures[0].reason,
            RecordError::Decode { .. }
        ));
    }

    #[test]
    fn test_single_document_file() {
        let temp_dir = TempDir::new().unwrap();
        let content =
            "{\n  \"raw_data\": {\n    \"data\": [{\"role\": \"user\", \"text\": \"hi\"}]\n  }\n}\n";
        let input = write_input(temp_dir.path(), "doc.json", content);
        let output = temp_dir.path().join("doc_processed.jsonl");

        let report = process_file(input, output.clone(), &ProcessOptions::new());

        assert_eq!(report.kind, Some(ContentKind::SingleDocument));
        assert_eq!(report.total, 1);
        assert_eq!(report.valid, 1);
        assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_array_file_streams_records() {
        let temp_dir = TempDir::new().unwrap();
        let content = r#"[
            {"raw_data": {"data": [{"role": "user", "text": "a"}]}},
            {"raw_data": {"data": [{"role": "user", "text": "b"}]}}
        ]"#;
        let input = write_input(temp_dir.path(), "array.json", content);
        let output = temp_dir.path().join("array_processed.jsonl");

        let report = process_file(input, output, &ProcessOptions::new());

        assert_eq!(report.kind, Some(ContentKind::RecordArray));
        assert_eq!(report.total, 2);
        assert_eq!(report.valid, 2);
    }

    #[test]
    fn test_max_records_cap() {
        let temp_dir = TempDir::new().unwrap();
        let content = (0..5)
            .map(|i| legacy_line(&i.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let input = write_input(temp_dir.path(), "many.jsonl", &content);
        let output = temp_dir.path().join("out.jsonl");

        let options = ProcessOptions::new().with_max_records(Some(1));
        let report = process_file(input, output.clone(), &options);

        assert_eq!(report.valid, 1);
        assert!(report.total <= 5);
        assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_unreadable_input_yields_zero_report() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("없는파일.jsonl");
        let output = temp_dir.path().join("out.jsonl");

        let report = process_file(input, output.clone(), &ProcessOptions::new());

        assert_eq!(report.total, 0);
        assert_eq!(report.valid, 0);
        assert!(report.io_error.is_some());
        assert!(!output.exists());
    }

    #[test]
    fn test_output_is_truncated_not_appended() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_input(temp_dir.path(), "one.jsonl", &legacy_line("a"));
        let output = temp_dir.path().join("out.jsonl");
        fs::write(&output, "이전 실행의 잔여물\n잔여물 2\n").unwrap();

        let report = process_file(input, output.clone(), &ProcessOptions::new());

        assert_eq!(report.valid, 1);
        assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_schema_errors_recorded_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let content = format!(
            "{}\n{}\n{}\n",
            r#"{"id": 1, "conversations": []}"#,
            r#"{"unrelated": true}"#,
            legacy_line("ok")
        );
        let input = write_input(temp_dir.path(), "schema.jsonl", &content);
        let output = temp_dir.path().join("out.jsonl");

        let report = process_file(input, output, &ProcessOptions::new());

        assert_eq!(report.total, 3);
        assert_eq!(report.valid, 1);
        assert_eq!(report.failed(), 2);
        assert!(matches!(
            report.failures[0].reason,
            RecordError::EmptyTurnList
        ));
        assert!(matches!(
            report.failures[1].reason,
            RecordError::MissingField { .. }
        ));
    }
}

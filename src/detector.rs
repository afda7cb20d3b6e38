//! 파일 구조 판별 모듈
//!
//! 입력 파일이 단일 JSON 문서인지, 레코드 배열인지, JSONL인지를
//! 선행 바이트만으로 판별하고, 배열/줄 단위 레코드를 전체 적재 없이
//! 하나씩 생산하는 두 가지 스트림을 제공합니다.
//!
//! 두 스트림은 동일한 아이템 계약을 따릅니다:
//! `(위치, 디코딩 결과)`의 유한한 지연 시퀀스이며 재시작할 수 없습니다.

use serde_json::Value;
use std::io::{self, BufRead, Read, Seek, SeekFrom};

/// 판별된 파일 구조
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// 파일 전체가 JSON 문서 하나 (레코드 1개)
    SingleDocument,
    /// 최상위 JSON 배열 (요소 단위 스트리밍 파싱)
    RecordArray,
    /// 줄 단위 JSON (JSONL)
    JsonLines,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::SingleDocument => write!(f, "단일 문서"),
            ContentKind::RecordArray => write!(f, "레코드 배열"),
            ContentKind::JsonLines => write!(f, "JSONL"),
        }
    }
}

/// 레코드의 입력 내 위치 (에러 보고용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordPosition {
    /// 문서 전체가 레코드 하나
    Document,
    /// JSONL의 줄 번호 (1부터)
    Line(usize),
    /// 배열의 요소 번호 (1부터)
    Item(usize),
}

impl std::fmt::Display for RecordPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordPosition::Document => write!(f, "문서 본문"),
            RecordPosition::Line(n) => write!(f, "{}번째 줄", n),
            RecordPosition::Item(n) => write!(f, "{}번째 요소", n),
        }
    }
}

/// 레코드 스트림의 아이템: 위치 + 디코딩 결과
pub type RecordItem = (RecordPosition, Result<Value, String>);

/// 선행 바이트로 파일 구조 판별
///
/// 판별 후 리더를 오프셋 0으로 되돌리므로 호출자는 같은 리더로
/// 바로 레코드 스트림을 시작할 수 있습니다.
///
/// - `[` → 레코드 배열
/// - `{` → 첫 줄이 그 자체로 완전한 JSON이면 JSONL, 아니면 단일 문서
/// - 그 외 (빈 파일 포함) → JSONL로 간주하고 줄 단위 검증에 맡김
pub fn detect<R: BufRead + Seek>(reader: &mut R) -> io::Result<ContentKind> {
    let kind = sniff(reader)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(kind)
}

fn sniff<R: BufRead>(reader: &mut R) -> io::Result<ContentKind> {
    let first = loop {
        let mut byte = [0u8; 1];
        if reader.read(&mut byte)? == 0 {
            return Ok(ContentKind::JsonLines);
        }
        if !byte[0].is_ascii_whitespace() {
            break byte[0];
        }
    };

    match first {
        b'[' => Ok(ContentKind::RecordArray),
        b'{' => {
            // 여러 줄짜리 문서의 첫 줄은 그 자체로 파싱되지 않는다
            let mut line = vec![b'{'];
            reader.read_until(b'\n', &mut line)?;
            if serde_json::from_slice::<Value>(&line).is_ok() {
                Ok(ContentKind::JsonLines)
            } else {
                Ok(ContentKind::SingleDocument)
            }
        }
        _ => Ok(ContentKind::JsonLines),
    }
}

/// JSONL 레코드 스트림
///
/// 빈 줄은 구분자로 취급하여 위치 계산에만 반영하고 건너뜁니다.
pub struct LineRecords<R: BufRead> {
    lines: io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> LineRecords<R> {
    /// 새 줄 단위 스트림 생성
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for LineRecords<R> {
    type Item = RecordItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let position = RecordPosition::Line(self.line_no);

            match line {
                Err(e) => return Some((position, Err(format!("줄 읽기 실패: {}", e)))),
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let decoded =
                        serde_json::from_str::<Value>(trimmed).map_err(|e| e.to_string());
                    return Some((position, decoded));
                }
            }
        }
    }
}

/// 최상위 배열의 요소를 전체 적재 없이 하나씩 생산하는 스트림
///
/// 중괄호 깊이와 문자열 리터럴(이스케이프 포함)을 추적하며 요소 경계를
/// 찾고, 요소 하나 분량의 바이트만 메모리에 유지합니다. 구조적 손상은
/// 디코딩 에러 아이템 하나로 보고한 뒤 시퀀스를 종료합니다.
pub struct ArrayRecords<R: BufRead> {
    reader: R,
    index: usize,
    started: bool,
    finished: bool,
}

impl<R: BufRead> ArrayRecords<R> {
    /// 새 배열 요소 스트림 생성
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            index: 0,
            started: false,
            finished: false,
        }
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        let byte = buf[0];
        self.reader.consume(1);
        Ok(Some(byte))
    }

    /// 공백(및 요소 사이 쉼표)을 건너뛰고 다음 유효 바이트 반환
    fn next_significant(&mut self, skip_comma: bool) -> io::Result<Option<u8>> {
        loop {
            match self.next_byte()? {
                None => return Ok(None),
                Some(b) if b.is_ascii_whitespace() => continue,
                Some(b',') if skip_comma => continue,
                Some(b) => return Ok(Some(b)),
            }
        }
    }

    /// 여는 중괄호 이후의 요소 바이트를 경계까지 수집
    fn collect_element(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut element = vec![b'{'];
        let mut depth = 1u32;
        let mut in_string = false;
        let mut escaped = false;

        loop {
            let byte = match self.next_byte()? {
                Some(b) => b,
                None => return Ok(None),
            };
            element.push(byte);

            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                }
                continue;
            }

            match byte {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(Some(element));
                    }
                }
                _ => {}
            }
        }
    }

    fn fail(&mut self, reason: String) -> RecordItem {
        self.finished = true;
        (RecordPosition::Item(self.index + 1), Err(reason))
    }
}

impl<R: BufRead> Iterator for ArrayRecords<R> {
    type Item = RecordItem;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        if !self.started {
            match self.next_significant(false) {
                Err(e) => return Some(self.fail(format!("읽기 실패: {}", e))),
                Ok(None) => {
                    self.finished = true;
                    return None;
                }
                Ok(Some(b'[')) => self.started = true,
                Ok(Some(b)) => {
                    return Some(self.fail(format!("배열 시작 '['가 아님: '{}'", b as char)))
                }
            }
        }

        match self.next_significant(true) {
            Err(e) => Some(self.fail(format!("읽기 실패: {}", e))),
            Ok(None) => Some(self.fail("배열이 닫히기 전에 입력이 끝났습니다".to_string())),
            Ok(Some(b']')) => {
                self.finished = true;
                None
            }
            Ok(Some(b'{')) => {
                let element = match self.collect_element() {
                    Err(e) => return Some(self.fail(format!("읽기 실패: {}", e))),
                    Ok(None) => {
                        return Some(
                            self.fail("요소 중간에 입력이 끝났습니다".to_string()),
                        )
                    }
                    Ok(Some(element)) => element,
                };

                self.index += 1;
                let decoded =
                    serde_json::from_slice::<Value>(&element).map_err(|e| e.to_string());
                Some((RecordPosition::Item(self.index), decoded))
            }
            Ok(Some(b)) => Some(self.fail(format!("객체가 아닌 배열 요소: '{}'", b as char))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn detect_str(content: &str) -> ContentKind {
        let mut cursor = Cursor::new(content.as_bytes().to_vec());
        detect(&mut cursor).unwrap()
    }

    #[test]
    fn test_detect_record_array() {
        assert_eq!(detect_str(r#"[{"a": 1}, {"a": 2}]"#), ContentKind::RecordArray);
        assert_eq!(detect_str("  \n\t[\n{}\n]"), ContentKind::RecordArray);
    }

    #[test]
    fn test_detect_jsonl() {
        assert_eq!(
            detect_str("{\"a\": 1}\n{\"a\": 2}\n"),
            ContentKind::JsonLines
        );
    }

    #[test]
    fn test_detect_single_document() {
        assert_eq!(
            detect_str("{\n  \"a\": 1,\n  \"b\": 2\n}\n"),
            ContentKind::SingleDocument
        );
    }

    #[test]
    fn test_detect_garbage_defaults_to_jsonl() {
        assert_eq!(detect_str("not json at all"), ContentKind::JsonLines);
        assert_eq!(detect_str(""), ContentKind::JsonLines);
    }

    #[test]
    fn test_detect_rewinds_reader() {
        let mut cursor = Cursor::new(b"[{\"a\": 1}]".to_vec());
        detect(&mut cursor).unwrap();
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_line_records_yields_positions() {
        let input = Cursor::new("{\"a\": 1}\n\n{\"a\": 2}\n");
        let items: Vec<_> = LineRecords::new(input).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0, RecordPosition::Line(1));
        assert_eq!(items[1].0, RecordPosition::Line(3));
        assert_eq!(items[1].1.as_ref().unwrap(), &json!({"a": 2}));
    }

    #[test]
    fn test_line_records_contains_bad_line() {
        let input = Cursor::new("{\"a\": 1}\nnot json\n{\"a\": 3}\n");
        let items: Vec<_> = LineRecords::new(input).collect();

        assert_eq!(items.len(), 3);
        assert!(items[0].1.is_ok());
        assert!(items[1].1.is_err());
        assert!(items[2].1.is_ok());
    }

    #[test]
    fn test_array_records_streams_elements() {
        let input = Cursor::new(r#"[{"a": 1}, {"a": 2}, {"a": 3}]"#);
        let items: Vec<_> = ArrayRecords::new(input).collect();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].0, RecordPosition::Item(1));
        assert_eq!(items[2].1.as_ref().unwrap(), &json!({"a": 3}));
    }

    #[test]
    fn test_array_records_handles_nested_and_strings() {
        // 문자열 안의 중괄호/대괄호/이스케이프가 경계로 오인되면 안 된다
        let input = Cursor::new(
            r#"[{"text": "중괄호 } 포함 \" 문자열", "nested": {"deep": [1, 2]}}, {"b": 2}]"#,
        );
        let items: Vec<_> = ArrayRecords::new(input).collect();

        assert_eq!(items.len(), 2);
        assert!(items[0].1.is_ok());
        assert_eq!(
            items[0].1.as_ref().unwrap()["text"],
            json!("중괄호 } 포함 \" 문자열")
        );
    }

    #[test]
    fn test_array_records_empty_array() {
        let input = Cursor::new("[]");
        let items: Vec<_> = ArrayRecords::new(input).collect();
        assert!(items.is_empty());
    }

    #[test]
    fn test_array_records_truncated_input() {
        let input = Cursor::new(r#"[{"a": 1}, {"a": 2"#);
        let items: Vec<_> = ArrayRecords::new(input).collect();

        assert_eq!(items.len(), 2);
        assert!(items[0].1.is_ok());
        assert!(items[1].1.is_err());
    }

    #[test]
    fn test_array_records_non_object_element_is_contained() {
        let input = Cursor::new(r#"[{"a": 1}, 42, {"a": 3}]"#);
        let items: Vec<_> = ArrayRecords::new(input).collect();

        // 스칼라 요소는 구조 에러 하나로 보고되고 시퀀스가 종료된다
        assert_eq!(items.len(), 2);
        assert!(items[0].1.is_ok());
        assert!(items[1].1.is_err());
    }

    #[test]
    fn test_array_records_multiline_elements() {
        let input = Cursor::new("[\n  {\"a\": 1},\n  {\"a\": 2}\n]\n");
        let items: Vec<_> = ArrayRecords::new(input).collect();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|(_, r)| r.is_ok()));
    }
}

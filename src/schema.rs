//! 레코드 스키마 검증 모듈
//!
//! 디코딩된 원본 레코드를 허용 스키마와 대조하여 검증하고,
//! 변환기가 바로 사용할 수 있는 정규화된 형태로 태깅합니다.
//!
//! 허용되는 스키마는 두 가지입니다:
//! - **strict**: 최상위 `id` + `conversations`, 턴은 `from`/`value`
//! - **legacy**: `raw_data.data` (없으면 최상위 `data`), 턴은 `role`/`text` (+선택 `name`)

use clap::ValueEnum;
use serde_json::Value;
use thiserror::Error;

/// 허용할 스키마 집합
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum SchemaMode {
    /// 두 스키마 모두 허용 (strict 우선 판별)
    #[default]
    Auto,
    /// strict 스키마만 허용
    Strict,
    /// legacy 스키마만 허용
    Legacy,
}

impl std::fmt::Display for SchemaMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaMode::Auto => write!(f, "Auto"),
            SchemaMode::Strict => write!(f, "Strict"),
            SchemaMode::Legacy => write!(f, "Legacy"),
        }
    }
}

/// 레코드 단위 실패 사유
///
/// 검증 경계를 넘어 전파되지 않고 항상 태깅된 결과로 변환됩니다.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// 유효한 JSON이 아님
    #[error("JSON 디코딩 실패: {reason}")]
    Decode { reason: String },

    /// 필수 필드 누락 (타입이 다른 경우 포함)
    #[error("필수 필드 누락: {field}")]
    MissingField { field: String },

    /// 턴 목록이 존재하지만 비어 있음
    #[error("턴 목록이 비어 있습니다")]
    EmptyTurnList,

    /// 턴 객체에 필수 필드가 없거나 형식이 잘못됨
    #[error("{index}번째 턴 형식 오류: {reason}")]
    MalformedTurn { index: usize, reason: String },
}

impl RecordError {
    /// 누락 필드 에러 생성 헬퍼
    fn missing(field: &str) -> Self {
        RecordError::MissingField {
            field: field.to_string(),
        }
    }
}

/// strict 스키마의 턴 (`from`/`value`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictTurn {
    pub from: String,
    pub value: String,
}

/// legacy 스키마의 턴 (`role`/`text` + 선택 `name`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTurn {
    pub role: String,
    pub name: Option<String>,
    pub text: String,
}

/// 검증을 통과한 레코드
///
/// 각 변형은 검증 시점에 존재가 보장된 필드만 담으므로
/// 이후 단계에서는 방어적 조회가 필요 없습니다.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidatedRecord {
    /// strict 스키마 레코드
    Strict {
        id: Value,
        turns: Vec<StrictTurn>,
        system_data: Vec<Value>,
    },
    /// legacy 스키마 레코드
    Legacy {
        turns: Vec<LegacyTurn>,
        system_data: Vec<Value>,
    },
}

impl ValidatedRecord {
    /// 턴 수 반환
    pub fn turn_count(&self) -> usize {
        match self {
            ValidatedRecord::Strict { turns, .. } => turns.len(),
            ValidatedRecord::Legacy { turns, .. } => turns.len(),
        }
    }
}

/// 원본 레코드를 허용 스키마와 대조하여 검증
///
/// # Arguments
/// * `raw` - 디코딩된 원본 레코드
/// * `mode` - 허용할 스키마 집합
///
/// # Returns
/// 정규화된 `ValidatedRecord` 또는 사유가 태깅된 `RecordError`
pub fn validate(raw: &Value, mode: SchemaMode) -> Result<ValidatedRecord, RecordError> {
    match mode {
        SchemaMode::Strict => validate_strict(raw),
        SchemaMode::Legacy => validate_legacy(raw),
        SchemaMode::Auto => {
            // id + conversations가 모두 있으면 strict 레코드로 확정한다.
            // 절반만 strict인 레코드는 legacy로 재시도하지 않고 그대로 실패시킨다.
            if raw.get("id").is_some() && raw.get("conversations").is_some() {
                validate_strict(raw)
            } else {
                validate_legacy(raw)
            }
        }
    }
}

/// strict 스키마 검증 (`id` + 비어 있지 않은 `conversations`)
fn validate_strict(raw: &Value) -> Result<ValidatedRecord, RecordError> {
    let id = raw.get("id").ok_or_else(|| RecordError::missing("id"))?;

    let conversations = raw
        .get("conversations")
        .and_then(Value::as_array)
        .ok_or_else(|| RecordError::missing("conversations"))?;

    if conversations.is_empty() {
        return Err(RecordError::EmptyTurnList);
    }

    let mut turns = Vec::with_capacity(conversations.len());
    for (index, turn) in conversations.iter().enumerate() {
        let from = require_str(turn, "from", index)?;
        let value = require_str(turn, "value", index)?;
        turns.push(StrictTurn {
            from: from.to_string(),
            value: value.to_string(),
        });
    }

    Ok(ValidatedRecord::Strict {
        id: id.clone(),
        turns,
        system_data: system_data(raw),
    })
}

/// legacy 스키마 검증 (`raw_data.data`, 없으면 최상위 `data`)
fn validate_legacy(raw: &Value) -> Result<ValidatedRecord, RecordError> {
    let data = raw
        .get("raw_data")
        .and_then(|r| r.get("data"))
        .or_else(|| raw.get("data"))
        .and_then(Value::as_array)
        .ok_or_else(|| RecordError::missing("raw_data.data"))?;

    if data.is_empty() {
        return Err(RecordError::EmptyTurnList);
    }

    let mut turns = Vec::with_capacity(data.len());
    for (index, turn) in data.iter().enumerate() {
        let role = require_str(turn, "role", index)?;
        let text = require_str(turn, "text", index)?;
        let name = turn
            .get("name")
            .and_then(Value::as_str)
            .map(|s| s.to_string());
        turns.push(LegacyTurn {
            role: role.to_string(),
            name,
            text: text.to_string(),
        });
    }

    Ok(ValidatedRecord::Legacy {
        turns,
        system_data: system_data(raw),
    })
}

/// 턴 객체에서 필수 문자열 필드 추출
fn require_str<'a>(turn: &'a Value, field: &str, index: usize) -> Result<&'a str, RecordError> {
    turn.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| RecordError::MalformedTurn {
            index: index + 1,
            reason: format!("문자열 필드 '{}' 누락", field),
        })
}

/// `model_control.system_data`를 그대로 복사 (없으면 빈 시퀀스)
fn system_data(raw: &Value) -> Vec<Value> {
    raw.get("model_control")
        .and_then(|mc| mc.get("system_data"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

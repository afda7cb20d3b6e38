//! 서빙 포맷 변환 모듈
//!
//! 검증을 통과한 레코드를 서빙 시스템이 소비하는 고정 형태로 사영합니다.
//! 순수 함수이며 검증이 필드 존재를 보장하므로 항상 성공합니다.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::ValidatedRecord;

/// 서빙 레코드 (출력 한 줄)
///
/// 최상위 키는 `model_control`과 `data` 두 개뿐이며
/// 필드 선언 순서가 곧 직렬화 키 순서입니다.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServingRecord {
    pub model_control: ModelControl,
    pub data: Vec<ServingTurn>,
}

/// 모델 제어 블록
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelControl {
    /// 입력의 `model_control.system_data`를 그대로 통과 (기본: 빈 시퀀스)
    pub system_data: Vec<Value>,
}

/// 서빙 포맷의 턴 하나
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServingTurn {
    pub role: String,
    pub name: String,
    pub text: String,
}

/// 검증된 레코드를 서빙 레코드로 변환
///
/// 턴 순서는 입력 순서와 정확히 일치하며,
/// `name`이 없는 턴은 빈 문자열로 채워집니다.
pub fn to_serving(record: ValidatedRecord) -> ServingRecord {
    let (turns, system_data) = match record {
        ValidatedRecord::Strict {
            turns, system_data, ..
        } => {
            let turns = turns
                .into_iter()
                .map(|t| ServingTurn {
                    role: t.from,
                    name: String::new(),
                    text: t.value,
                })
                .collect();
            (turns, system_data)
        }
        ValidatedRecord::Legacy { turns, system_data } => {
            let turns = turns
                .into_iter()
                .map(|t| ServingTurn {
                    role: t.role,
                    name: t.name.unwrap_or_default(),
                    text: t.text,
                })
                .collect();
            (turns, system_data)
        }
    };

    ServingRecord {
        model_control: ModelControl { system_data },
        data: turns,
    }
}

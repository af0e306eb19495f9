//! Heal Data Models
//!
//! 서비스 레이어(JSON)와 매핑되는 Rust 데이터 모델

use serde::{Deserialize, Serialize};

/// 의학 용어 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TermType {
    General,
    Condition,
    Prescription,
}

impl Default for TermType {
    fn default() -> Self {
        TermType::General
    }
}

impl TermType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermType::General => "GENERAL",
            TermType::Condition => "CONDITION",
            TermType::Prescription => "PRESCRIPTION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "GENERAL" => Some(TermType::General),
            "CONDITION" => Some(TermType::Condition),
            "PRESCRIPTION" => Some(TermType::Prescription),
            _ => None,
        }
    }
}

/// 채팅 메시지 행 (채팅/룸 서브시스템 소유, 코어는 읽기 전용)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    /// epoch millis
    pub send_time: i64,
    pub text: String,
}

/// 요청 언어로 해석된 용어 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermInfo {
    pub medical_term_id: i64,
    pub medical_term_type: TermType,
    pub name: String,
    pub description: Option<String>,
    pub medical_term_links: Vec<String>,
}

/// 렌더링된 메시지 안의 용어 한 건
///
/// `synonym`은 메시지 본문에서 발견된 표기(번역문 쪽 표기가 있으면 그것을 우선).
/// `term_info`는 용어 해석에 실패한 경우 None으로 격하됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalTermEntry {
    pub id: i64,
    pub synonym: Option<String>,
    pub term_info: Option<TermInfo>,
}

/// 렌더링된 메시지 (주 조회 경로의 응답)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMessage {
    pub message_id: i64,
    pub room_id: i64,
    pub sender_user_id: i64,
    pub timestamp: i64,
    pub content: MessageContent,
}

/// 메시지 본문과 파생 메타데이터
///
/// `text`는 항상 원문 그대로, 해석된 표시용 텍스트는 `metadata.translation`에 담깁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    pub text: String,
    pub metadata: MessageMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    pub translation: String,
    pub medical_terms: Vec<MedicalTermEntry>,
}

/// 용어 링크 캐시 행 (message_term_cache)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermLinkRow {
    pub id: i64,
    pub medical_term_id: i64,
    pub original_synonym_id: Option<i64>,
    pub translated_synonym_id: Option<i64>,
}

/// 링크 생성 응답: 메시지의 전체 주석 집합 + 방금 연결한 용어
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedMessage {
    pub message: LinkedMessageView,
    pub medical_term: Option<TermInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedMessageView {
    pub message_id: i64,
    pub sender_user_id: i64,
    pub send_time: i64,
    pub message: String,
    pub medical_terms: Vec<MedicalTermEntry>,
}

/// 용어 생성 입력
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTerm {
    #[serde(default)]
    pub term_type: TermType,
    pub translation: NewTermTranslation,
    #[serde(default)]
    pub synonyms: Vec<NewSynonym>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTermTranslation {
    pub language_code: String,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSynonym {
    pub synonym: String,
    pub language_code: String,
}

/// 용어 부분 업데이트 입력 (없는 필드는 건드리지 않음)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermUpdate {
    pub term_type: Option<TermType>,
    /// 번역 행의 언어 코드를 이 값으로 변경
    pub language_code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// 검색 결과: 용어 한 건을 전체 번역/동의어와 함께 펼친 형태
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermSearchResult {
    pub term_id: i64,
    pub medical_term_type: TermType,
    pub translations: Vec<TermTranslationRow>,
    pub synonyms: Vec<TermSynonymRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermTranslationRow {
    pub language: String,
    pub default_name: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermSynonymRow {
    pub synonym: String,
    pub language: String,
}

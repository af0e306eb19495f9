//! Heal Core - 의료 채팅 코어 라이브러리
//!
//! 채팅 메시지의 번역 캐시와 의학 용어 링크 캐시를 관리하고,
//! 메시지를 요청 언어 기준으로 렌더링하는 Rust 코어입니다.
//! HTTP/RPC 서비스 레이어가 이 라이브러리를 호출합니다.

pub mod db;
pub mod error;
pub mod models;

/// 용어 번역이 요청 언어에 없을 때 대체로 사용하는 기본 언어
pub const DEFAULT_LANGUAGE: &str = "en";

/// 언어 코드 형식 검사 ("en", "fr", "pt-br" 등)
///
/// 관례적으로 소문자 알파벳 2~3자, 선택적으로 '-' 뒤 지역 서브태그를 허용합니다.
pub fn is_valid_language_code(code: &str) -> bool {
    let mut parts = code.split('-');

    let Some(primary) = parts.next() else {
        return false;
    };
    if !(2..=3).contains(&primary.len())
        || !primary.chars().all(|c| c.is_ascii_lowercase())
    {
        return false;
    }

    for sub in parts {
        if sub.is_empty() || sub.len() > 8 || !sub.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
    }

    true
}

//! Translation Cache
//!
//! 메시지 본문의 (메시지, 언어)별 번역 캐시.
//! 번역 텍스트는 외부 번역 엔진이 만들어 `put_translation`으로 적재합니다.

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::HealError;

impl Database {
    /// 캐시 조회
    ///
    /// `None`은 "아직 번역되지 않음"(캐시 미스)이며 에러가 아닙니다.
    /// 빈 문자열이 저장된 경우는 `Some("")`으로 구분됩니다.
    pub fn get_cached_translation(
        &self,
        message_id: i64,
        language_code: &str,
    ) -> Result<Option<String>, HealError> {
        let text = self
            .conn()
            .prepare(
                "SELECT translated_text FROM message_translation_cache
                 WHERE message_id = ?1 AND language_code = ?2",
            )?
            .query_row(params![message_id, language_code], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(text)
    }

    /// 캐시 업서트
    ///
    /// (message_id, language_code)가 고유 키이므로 같은 쌍에 대한 두 번째
    /// 호출은 행을 늘리지 않고 덮어씁니다. 경쟁 시 마지막 쓰기가 이깁니다.
    pub fn put_translation(
        &self,
        message_id: i64,
        language_code: &str,
        text: &str,
    ) -> Result<(), HealError> {
        if !crate::is_valid_language_code(language_code) {
            return Err(HealError::Validation(format!(
                "invalid language code: '{}'",
                language_code
            )));
        }
        self.require_message(message_id)?;

        self.conn().execute(
            "INSERT INTO message_translation_cache (message_id, language_code, translated_text)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (message_id, language_code) DO UPDATE SET
                 translated_text = excluded.translated_text",
            params![message_id, language_code, text],
        )?;
        Ok(())
    }

    /// 메시지의 캐시 무효화 (메시지 원문이 바뀐 경우 재번역 전 단계)
    pub fn invalidate_translations(&self, message_id: i64) -> Result<usize, HealError> {
        let removed = self.conn().execute(
            "DELETE FROM message_translation_cache WHERE message_id = ?1",
            [message_id],
        )?;
        Ok(removed)
    }
}

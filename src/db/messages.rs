//! Message Renderer
//!
//! 메시지 + 번역 캐시 + 용어 링크 캐시를 하나의 응답으로 합성하는 주 조회 경로

use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use super::{CancelToken, Database};
use crate::error::HealError;
use crate::models::{
    MedicalTermEntry, Message, MessageContent, MessageMetadata, RenderedMessage, TermInfo,
};
use crate::DEFAULT_LANGUAGE;

impl Database {
    /// 메시지 적재 (채팅/룸 서브시스템이 호출하는 유일한 쓰기 진입점)
    pub fn insert_message(&self, room_id: i64, user_id: i64, text: &str) -> Result<i64, HealError> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn().execute(
            "INSERT INTO messages (room_id, user_id, send_time, text) VALUES (?1, ?2, ?3, ?4)",
            params![room_id, user_id, now, text],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// 메시지 1건을 요청 언어 기준으로 렌더링
    ///
    /// 조회는 (룸, 메시지) 쌍으로만 해석합니다. 다른 룸에서 유효한 메시지
    /// id가 이 룸으로 새어 나오면 안 됩니다.
    pub fn get_message(
        &self,
        room_id: i64,
        message_id: i64,
        language_code: &str,
    ) -> Result<RenderedMessage, HealError> {
        self.render_message(room_id, message_id, language_code, &CancelToken::default())
    }

    /// 룸의 메시지를 id 오름차순으로 페이징 렌더링
    ///
    /// 페이지 번호는 1부터 시작하며, 오프셋은 (page_num - 1) * page_size.
    /// 메시지 사이와 용어 조회 사이에서 취소 토큰을 확인합니다.
    pub fn get_chat_messages(
        &self,
        room_id: i64,
        page_num: u32,
        page_size: u32,
        language_code: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<RenderedMessage>, HealError> {
        if page_num < 1 {
            return Err(HealError::Validation(
                "page_num must be 1 or greater".to_string(),
            ));
        }
        let offset = (page_num as i64 - 1) * page_size as i64;

        let mut stmt = self.conn().prepare(
            "SELECT id FROM messages WHERE room_id = ?1 ORDER BY id LIMIT ?2 OFFSET ?3",
        )?;
        let iter = stmt.query_map(params![room_id, page_size as i64, offset], |row| {
            row.get::<_, i64>(0)
        })?;

        let mut ids = Vec::new();
        for id in iter {
            ids.push(id?);
        }

        let mut rendered = Vec::with_capacity(ids.len());
        for id in ids {
            if cancel.is_cancelled() {
                return Err(HealError::Cancelled);
            }
            rendered.push(self.render_message(room_id, id, language_code, cancel)?);
        }
        Ok(rendered)
    }

    fn render_message(
        &self,
        room_id: i64,
        message_id: i64,
        language_code: &str,
        cancel: &CancelToken,
    ) -> Result<RenderedMessage, HealError> {
        let message = self
            .conn()
            .prepare(
                "SELECT id, room_id, user_id, send_time, text
                 FROM messages WHERE id = ?1 AND room_id = ?2",
            )?
            .query_row(params![message_id, room_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    room_id: row.get(1)?,
                    user_id: row.get(2)?,
                    send_time: row.get(3)?,
                    text: row.get(4)?,
                })
            })
            .optional()?
            .ok_or(HealError::MessageNotFound(message_id))?;

        // 표시 텍스트: 캐시 히트면 캐시된 번역, 미스면 원문 그대로.
        // 읽기 경로는 절대 번역을 트리거하지 않는다 (번역은 외부 엔진이
        // put_translation으로 적재하는 쓰기 측 관심사).
        let translation = match self.get_cached_translation(message_id, language_code)? {
            Some(text) => text,
            None => {
                debug!(message_id, language_code, "translation cache miss, falling back to raw text");
                message.text.clone()
            }
        };

        let medical_terms = self.render_term_entries(message_id, language_code, cancel)?;

        Ok(RenderedMessage {
            message_id: message.id,
            room_id: message.room_id,
            sender_user_id: message.user_id,
            timestamp: message.send_time,
            content: MessageContent {
                text: message.text,
                metadata: MessageMetadata {
                    translation,
                    medical_terms,
                },
            },
        })
    }

    /// 메시지의 링크 행 전체를 용어 주석 목록으로 해석 (렌더러와 Link Writer 공용)
    ///
    /// 표시 동의어는 번역 동의어가 있으면 그것, 없으면 원문 동의어.
    /// 용어 하나가 해석에 실패해도 메시지 렌더링 전체를 중단하지 않고
    /// 해당 항목만 격하합니다.
    pub(crate) fn render_term_entries(
        &self,
        message_id: i64,
        language_code: &str,
        cancel: &CancelToken,
    ) -> Result<Vec<MedicalTermEntry>, HealError> {
        let links = self.list_links(message_id)?;

        let mut entries = Vec::with_capacity(links.len());
        for link in links {
            if cancel.is_cancelled() {
                return Err(HealError::Cancelled);
            }

            let display_synonym_id = link.translated_synonym_id.or(link.original_synonym_id);
            let synonym = match display_synonym_id {
                Some(id) => self.synonym_text(id)?,
                None => None,
            };

            entries.push(MedicalTermEntry {
                id: link.medical_term_id,
                synonym,
                term_info: self.resolve_term_info(link.medical_term_id, language_code)?,
            });
        }
        Ok(entries)
    }

    /// 용어 정보를 요청 언어로 해석하되, 번역이 없으면 기본 언어로 가림
    ///
    /// 기본 언어로도 해석되지 않거나 용어 행이 사라진 경우 None으로 격하.
    /// 그 외의 저장소 에러는 그대로 전파합니다.
    pub(crate) fn resolve_term_info(
        &self,
        term_id: i64,
        language_code: &str,
    ) -> Result<Option<TermInfo>, HealError> {
        match self.get_term(term_id, language_code) {
            Ok(info) => Ok(Some(info)),
            Err(HealError::TranslationMissing { .. }) if language_code != DEFAULT_LANGUAGE => {
                match self.get_term(term_id, DEFAULT_LANGUAGE) {
                    Ok(info) => Ok(Some(info)),
                    Err(HealError::TranslationMissing { .. }) | Err(HealError::TermNotFound(_)) => {
                        warn!(term_id, language_code, "term unresolvable, degrading entry");
                        Ok(None)
                    }
                    Err(other) => Err(other),
                }
            }
            Err(HealError::TranslationMissing { .. }) | Err(HealError::TermNotFound(_)) => {
                warn!(term_id, language_code, "term unresolvable, degrading entry");
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }

    /// 메시지 존재 확인 (id 단독 조회, 룸 무관 경로용)
    pub(crate) fn require_message(&self, message_id: i64) -> Result<Message, HealError> {
        self.conn()
            .prepare(
                "SELECT id, room_id, user_id, send_time, text FROM messages WHERE id = ?1",
            )?
            .query_row([message_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    room_id: row.get(1)?,
                    user_id: row.get(2)?,
                    send_time: row.get(3)?,
                    text: row.get(4)?,
                })
            })
            .optional()?
            .ok_or(HealError::MessageNotFound(message_id))
    }

    fn synonym_text(&self, synonym_id: i64) -> Result<Option<String>, HealError> {
        let text = self
            .conn()
            .prepare("SELECT synonym FROM medical_term_synonyms WHERE id = ?1")?
            .query_row([synonym_id], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(text)
    }
}

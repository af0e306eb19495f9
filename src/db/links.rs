//! Term-Link Cache / Link Writer
//!
//! 메시지에서 감지된 의학 용어 언급(링크) 캐시.
//! 링크는 외부 추출 파이프라인(NLP)이 원문/번역문을 훑은 뒤 적재합니다.

use rusqlite::{params, OptionalExtension};

use super::{CancelToken, Database};
use crate::error::HealError;
use crate::models::{LinkedMessage, LinkedMessageView, TermLinkRow};

impl Database {
    /// 메시지의 링크 행 목록 (삽입 순서)
    pub fn list_links(&self, message_id: i64) -> Result<Vec<TermLinkRow>, HealError> {
        let mut stmt = self.conn().prepare(
            "SELECT id, medical_term_id, original_synonym_id, translated_synonym_id
             FROM message_term_cache WHERE message_id = ?1 ORDER BY id",
        )?;
        let iter = stmt.query_map([message_id], |row| {
            Ok(TermLinkRow {
                id: row.get(0)?,
                medical_term_id: row.get(1)?,
                original_synonym_id: row.get(2)?,
                translated_synonym_id: row.get(3)?,
            })
        })?;

        let mut links = Vec::new();
        for link in iter {
            links.push(link?);
        }
        Ok(links)
    }

    /// 링크 행 생성, 새 행의 id 반환
    ///
    /// 중복 제거는 하지 않습니다. 같은 (메시지, 용어) 쌍이라도 언급(스팬)마다
    /// 별도 행이며, 동시 적재되는 두 언급은 둘 다 성공해야 합니다.
    pub fn create_link_row(
        &self,
        message_id: i64,
        term_id: i64,
        original_synonym_id: Option<i64>,
        translated_synonym_id: Option<i64>,
    ) -> Result<i64, HealError> {
        self.require_message(message_id)?;
        self.require_term(term_id)?;
        if let Some(synonym_id) = original_synonym_id {
            self.require_synonym_of_term(synonym_id, term_id)?;
        }
        if let Some(synonym_id) = translated_synonym_id {
            self.require_synonym_of_term(synonym_id, term_id)?;
        }

        self.conn().execute(
            "INSERT INTO message_term_cache
                 (message_id, medical_term_id, original_synonym_id, translated_synonym_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![message_id, term_id, original_synonym_id, translated_synonym_id],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// 번역문에서 발견된 동의어를 기존 링크 행에 기록 (편의형)
    ///
    /// (메시지, 용어) 쌍에 대해 번역 동의어가 비어 있는 행이 정확히 하나일 때만
    /// 성공합니다. 행이 없으면 `LinkNotFound` — 번역문 주석은 원문 주석보다
    /// 먼저 올 수 없습니다. 여러 행이면 `AmbiguousTarget`이며, 이때는 추출
    /// 파이프라인이 행 id를 지정하는 `set_translated_synonym_on_link`를
    /// 사용해야 합니다.
    pub fn set_translated_synonym(
        &self,
        message_id: i64,
        term_id: i64,
        translated_synonym_id: i64,
    ) -> Result<(), HealError> {
        self.require_synonym_of_term(translated_synonym_id, term_id)?;

        let mut stmt = self.conn().prepare(
            "SELECT id FROM message_term_cache
             WHERE message_id = ?1 AND medical_term_id = ?2 AND translated_synonym_id IS NULL
             ORDER BY id",
        )?;
        let iter = stmt.query_map(params![message_id, term_id], |row| row.get::<_, i64>(0))?;

        let mut candidates = Vec::new();
        for id in iter {
            candidates.push(id?);
        }

        match candidates.as_slice() {
            [] => Err(HealError::LinkNotFound {
                message_id,
                term_id,
            }),
            [link_id] => {
                self.conn().execute(
                    "UPDATE message_term_cache SET translated_synonym_id = ?1 WHERE id = ?2",
                    params![translated_synonym_id, link_id],
                )?;
                Ok(())
            }
            _ => Err(HealError::AmbiguousTarget {
                message_id,
                term_id,
                count: candidates.len(),
            }),
        }
    }

    /// 번역 동의어 기록 (행 id 지정형)
    pub fn set_translated_synonym_on_link(
        &self,
        link_id: i64,
        translated_synonym_id: i64,
    ) -> Result<(), HealError> {
        let row = self
            .conn()
            .prepare("SELECT message_id, medical_term_id FROM message_term_cache WHERE id = ?1")?
            .query_row([link_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
            })
            .optional()?;

        let Some((_message_id, term_id)) = row else {
            return Err(HealError::LinkRowNotFound(link_id));
        };
        self.require_synonym_of_term(translated_synonym_id, term_id)?;

        self.conn().execute(
            "UPDATE message_term_cache SET translated_synonym_id = ?1 WHERE id = ?2",
            params![translated_synonym_id, link_id],
        )?;
        Ok(())
    }

    /// 링크 생성 + 메시지 주석 전체 재렌더링 (Link Writer)
    ///
    /// 반환 전에 렌더러와 같은 해석 경로로 메시지의 용어 목록 전체를 다시
    /// 읽어, 동시 적재된 다른 링크 행에 대해서도 최신 상태를 돌려줍니다.
    pub fn create_link(
        &self,
        message_id: i64,
        term_id: i64,
        original_synonym_id: Option<i64>,
        translated_synonym_id: Option<i64>,
        language_code: &str,
    ) -> Result<LinkedMessage, HealError> {
        self.create_link_row(message_id, term_id, original_synonym_id, translated_synonym_id)?;

        let message = self.require_message(message_id)?;
        let medical_terms =
            self.render_term_entries(message_id, language_code, &CancelToken::default())?;
        let medical_term = self.resolve_term_info(term_id, language_code)?;

        Ok(LinkedMessage {
            message: LinkedMessageView {
                message_id: message.id,
                sender_user_id: message.user_id,
                send_time: message.send_time,
                message: message.text,
                medical_terms,
            },
            medical_term,
        })
    }

    /// 동의어 행이 해당 용어 소속인지 확인
    fn require_synonym_of_term(&self, synonym_id: i64, term_id: i64) -> Result<(), HealError> {
        let owner = self
            .conn()
            .prepare("SELECT medical_term_id FROM medical_term_synonyms WHERE id = ?1")?
            .query_row([synonym_id], |row| row.get::<_, i64>(0))
            .optional()?;

        match owner {
            Some(owner_id) if owner_id == term_id => Ok(()),
            Some(owner_id) => Err(HealError::Consistency(format!(
                "synonym {} belongs to term {}, not term {}",
                synonym_id, owner_id, term_id
            ))),
            None => Err(HealError::Consistency(format!(
                "synonym {} does not exist",
                synonym_id
            ))),
        }
    }
}

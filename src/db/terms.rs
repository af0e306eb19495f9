//! Term Store
//!
//! 의학 용어 표준 레코드와 언어별 번역/동의어 관리

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::Database;
use crate::error::HealError;
use crate::models::{
    NewSynonym, NewTerm, NewTermTranslation, TermInfo, TermSearchResult, TermSynonymRow,
    TermTranslationRow, TermUpdate, TermType,
};

impl Database {
    /// 용어 생성 (초기 번역 1건 + 동의어 목록 포함)
    pub fn create_term(&self, term: &NewTerm) -> Result<i64, HealError> {
        if term.translation.name.trim().is_empty() {
            return Err(HealError::Validation(
                "translation name is required".to_string(),
            ));
        }
        validate_language(&term.translation.language_code)?;
        for synonym in &term.synonyms {
            validate_language(&synonym.language_code)?;
        }

        let tx = self.conn().unchecked_transaction()?;

        tx.execute(
            "INSERT INTO medical_terms (term_type) VALUES (?1)",
            [term.term_type.as_str()],
        )?;
        let term_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO medical_term_translations (medical_term_id, language_code, name, description, url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                term_id,
                &term.translation.language_code,
                &term.translation.name,
                &term.translation.description,
                &term.translation.url,
            ],
        )?;

        for synonym in &term.synonyms {
            tx.execute(
                "INSERT INTO medical_term_synonyms (medical_term_id, synonym, language_code)
                 VALUES (?1, ?2, ?3)",
                params![term_id, &synonym.synonym, &synonym.language_code],
            )?;
        }

        tx.commit()?;
        Ok(term_id)
    }

    /// 용어 번역 추가 (같은 언어가 이미 있으면 덮어씀)
    pub fn add_translation(
        &self,
        term_id: i64,
        translation: &NewTermTranslation,
    ) -> Result<(), HealError> {
        if translation.name.trim().is_empty() {
            return Err(HealError::Validation(
                "translation name is required".to_string(),
            ));
        }
        validate_language(&translation.language_code)?;
        self.require_term(term_id)?;

        self.conn().execute(
            "INSERT INTO medical_term_translations (medical_term_id, language_code, name, description, url)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (medical_term_id, language_code) DO UPDATE SET
                 name = excluded.name,
                 description = excluded.description,
                 url = excluded.url",
            params![
                term_id,
                &translation.language_code,
                &translation.name,
                &translation.description,
                &translation.url,
            ],
        )?;
        Ok(())
    }

    /// 용어 동의어 추가
    pub fn add_synonym(&self, term_id: i64, synonym: &NewSynonym) -> Result<i64, HealError> {
        validate_language(&synonym.language_code)?;
        self.require_term(term_id)?;

        self.conn().execute(
            "INSERT INTO medical_term_synonyms (medical_term_id, synonym, language_code)
             VALUES (?1, ?2, ?3)",
            params![term_id, &synonym.synonym, &synonym.language_code],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// 용어 1건을 요청 언어로 조회
    ///
    /// 용어 자체가 없으면 `TermNotFound`, 용어는 있으나 해당 언어 번역 행이
    /// 없으면 `TranslationMissing` — 호출자가 기본 언어로 가릴지, 부분
    /// 데이터로 노출할지 선택할 수 있도록 두 경우를 구분합니다.
    pub fn get_term(&self, term_id: i64, language_code: &str) -> Result<TermInfo, HealError> {
        let term_type = self.require_term(term_id)?;

        let row = self
            .conn()
            .prepare(
                "SELECT name, description, url FROM medical_term_translations
                 WHERE medical_term_id = ?1 AND language_code = ?2",
            )?
            .query_row(params![term_id, language_code], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            })
            .optional()?;

        let Some((name, description, url)) = row else {
            return Err(HealError::TranslationMissing {
                term_id,
                language: language_code.to_string(),
            });
        };

        Ok(TermInfo {
            medical_term_id: term_id,
            medical_term_type: term_type,
            name,
            description,
            medical_term_links: url.into_iter().collect(),
        })
    }

    /// 모든 용어를 요청 언어로 조회
    ///
    /// 해당 언어 번역이 없는 용어는 일관되게 목록에서 제외됩니다.
    pub fn get_all_terms(&self, language_code: &str) -> Result<Vec<TermInfo>, HealError> {
        let mut stmt = self.conn().prepare(
            "SELECT t.id, t.term_type, tr.name, tr.description, tr.url
             FROM medical_terms t
             JOIN medical_term_translations tr ON tr.medical_term_id = t.id
             WHERE tr.language_code = ?1
             ORDER BY t.id",
        )?;

        let iter = stmt.query_map([language_code], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut terms = Vec::new();
        for row in iter {
            let (id, term_type, name, description, url) = row?;
            terms.push(TermInfo {
                medical_term_id: id,
                medical_term_type: parse_term_type(&term_type)?,
                name,
                description,
                medical_term_links: url.into_iter().collect(),
            });
        }
        Ok(terms)
    }

    /// 용어 부분 업데이트
    ///
    /// `language_code`가 가리키는 번역 행에 대해, 입력에 존재하는 필드만 적용.
    pub fn update_term(
        &self,
        term_id: i64,
        language_code: &str,
        update: &TermUpdate,
    ) -> Result<TermInfo, HealError> {
        self.require_term(term_id)?;

        if let Some(new_code) = &update.language_code {
            validate_language(new_code)?;
        }
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(HealError::Validation(
                    "translation name must not be empty".to_string(),
                ));
            }
        }

        let tx = self.conn().unchecked_transaction()?;

        if let Some(term_type) = update.term_type {
            tx.execute(
                "UPDATE medical_terms SET term_type = ?1 WHERE id = ?2",
                params![term_type.as_str(), term_id],
            )?;
        }

        let needs_translation_row = update.language_code.is_some()
            || update.name.is_some()
            || update.description.is_some()
            || update.url.is_some();

        if needs_translation_row {
            let updated = tx.execute(
                "UPDATE medical_term_translations SET
                     language_code = COALESCE(?1, language_code),
                     name = COALESCE(?2, name),
                     description = COALESCE(?3, description),
                     url = COALESCE(?4, url)
                 WHERE medical_term_id = ?5 AND language_code = ?6",
                params![
                    &update.language_code,
                    &update.name,
                    &update.description,
                    &update.url,
                    term_id,
                    language_code,
                ],
            )?;
            if updated == 0 {
                return Err(HealError::TranslationMissing {
                    term_id,
                    language: language_code.to_string(),
                });
            }
        }

        tx.commit()?;

        let effective = update.language_code.as_deref().unwrap_or(language_code);
        self.get_term(term_id, effective)
    }

    /// 용어 삭제 (번역/동의어/링크 캐시 행까지 한 트랜잭션에서 명시적으로 삭제)
    ///
    /// 링크 캐시는 파생 데이터이므로 삭제해도 표준 정보는 손실되지 않습니다.
    pub fn delete_term(&self, term_id: i64) -> Result<(), HealError> {
        self.require_term(term_id)?;

        let tx = self.conn().unchecked_transaction()?;

        let links = tx.execute(
            "DELETE FROM message_term_cache WHERE medical_term_id = ?1",
            [term_id],
        )?;
        let synonyms = tx.execute(
            "DELETE FROM medical_term_synonyms WHERE medical_term_id = ?1",
            [term_id],
        )?;
        let translations = tx.execute(
            "DELETE FROM medical_term_translations WHERE medical_term_id = ?1",
            [term_id],
        )?;
        tx.execute("DELETE FROM medical_terms WHERE id = ?1", [term_id])?;

        tx.commit()?;
        debug!(
            term_id,
            links, synonyms, translations, "deleted term with dependents"
        );
        Ok(())
    }

    /// 용어 검색: 분류 텍스트 또는 동의어(모든 언어)에 대한 부분 문자열 매칭
    ///
    /// SQL LIKE 기반이므로 ASCII 범위에서 대소문자를 구분하지 않습니다.
    /// 각 결과는 전체 번역 행과 전체 동의어 행을 함께 펼쳐 돌려줍니다.
    pub fn search_terms(&self, query: &str) -> Result<Vec<TermSearchResult>, HealError> {
        let pattern = format!("%{}%", query);

        let mut stmt = self.conn().prepare(
            "SELECT DISTINCT t.id, t.term_type
             FROM medical_terms t
             LEFT JOIN medical_term_synonyms s ON s.medical_term_id = t.id
             WHERE t.term_type LIKE ?1 OR s.synonym LIKE ?1
             ORDER BY t.id",
        )?;
        let iter = stmt.query_map([&pattern], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut results = Vec::new();
        for row in iter {
            let (term_id, term_type) = row?;
            results.push(TermSearchResult {
                term_id,
                medical_term_type: parse_term_type(&term_type)?,
                translations: self.term_translations(term_id)?,
                synonyms: self.term_synonyms(term_id)?,
            });
        }
        Ok(results)
    }

    /// 용어의 동의어 행 id 목록 (삽입 순서)
    pub fn synonym_ids(&self, term_id: i64) -> Result<Vec<i64>, HealError> {
        let mut stmt = self.conn().prepare(
            "SELECT id FROM medical_term_synonyms WHERE medical_term_id = ?1 ORDER BY id",
        )?;
        let iter = stmt.query_map([term_id], |row| row.get::<_, i64>(0))?;

        let mut ids = Vec::new();
        for id in iter {
            ids.push(id?);
        }
        Ok(ids)
    }

    /// 용어 존재 확인, 있으면 분류 반환
    pub(crate) fn require_term(&self, term_id: i64) -> Result<TermType, HealError> {
        let term_type = self
            .conn()
            .prepare("SELECT term_type FROM medical_terms WHERE id = ?1")?
            .query_row([term_id], |row| row.get::<_, String>(0))
            .optional()?;

        match term_type {
            Some(t) => parse_term_type(&t),
            None => Err(HealError::TermNotFound(term_id)),
        }
    }

    fn term_translations(&self, term_id: i64) -> Result<Vec<TermTranslationRow>, HealError> {
        let mut stmt = self.conn().prepare(
            "SELECT language_code, name, description, url
             FROM medical_term_translations WHERE medical_term_id = ?1 ORDER BY id",
        )?;
        let iter = stmt.query_map([term_id], |row| {
            Ok(TermTranslationRow {
                language: row.get(0)?,
                default_name: row.get(1)?,
                description: row.get(2)?,
                url: row.get(3)?,
            })
        })?;

        let mut out = Vec::new();
        for row in iter {
            out.push(row?);
        }
        Ok(out)
    }

    fn term_synonyms(&self, term_id: i64) -> Result<Vec<TermSynonymRow>, HealError> {
        let mut stmt = self.conn().prepare(
            "SELECT synonym, language_code
             FROM medical_term_synonyms WHERE medical_term_id = ?1 ORDER BY id",
        )?;
        let iter = stmt.query_map([term_id], |row| {
            Ok(TermSynonymRow {
                synonym: row.get(0)?,
                language: row.get(1)?,
            })
        })?;

        let mut out = Vec::new();
        for row in iter {
            out.push(row?);
        }
        Ok(out)
    }
}

fn validate_language(code: &str) -> Result<(), HealError> {
    if crate::is_valid_language_code(code) {
        Ok(())
    } else {
        Err(HealError::Validation(format!(
            "invalid language code: '{}'",
            code
        )))
    }
}

fn parse_term_type(s: &str) -> Result<TermType, HealError> {
    TermType::parse(s).ok_or_else(|| HealError::Consistency(format!("unknown term type: '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{hypertension_term, test_db};
    use crate::error::HealError;
    use crate::models::{NewSynonym, NewTerm, NewTermTranslation, TermType, TermUpdate};

    #[test]
    fn test_create_and_get_term() {
        let db = test_db();
        let (term_id, _) = hypertension_term(&db);

        let info = db.get_term(term_id, "en").unwrap();
        assert_eq!(info.name, "Hypertension");
        assert_eq!(info.medical_term_type, TermType::Condition);
        assert_eq!(info.medical_term_links.len(), 1);

        // 프랑스어 번역 행에는 url이 없으므로 링크 목록이 빈다
        let info = db.get_term(term_id, "fr").unwrap();
        assert_eq!(info.name, "Hypertension");
        assert!(info.medical_term_links.is_empty());
    }

    #[test]
    fn test_create_term_requires_name() {
        let db = test_db();
        let err = db
            .create_term(&NewTerm {
                term_type: TermType::General,
                translation: NewTermTranslation {
                    language_code: "en".to_string(),
                    name: "  ".to_string(),
                    description: None,
                    url: None,
                },
                synonyms: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, HealError::Validation(_)));
    }

    #[test]
    fn test_get_term_distinguishes_missing_cases() {
        let db = test_db();
        let (term_id, _) = hypertension_term(&db);

        let err = db.get_term(9999, "en").unwrap_err();
        assert!(matches!(err, HealError::TermNotFound(9999)));

        let err = db.get_term(term_id, "de").unwrap_err();
        assert!(matches!(
            err,
            HealError::TranslationMissing { language, .. } if language == "de"
        ));
    }

    #[test]
    fn test_get_all_terms_skips_untranslated() {
        let db = test_db();
        let (hyper_id, _) = hypertension_term(&db);

        // 영어 번역만 있는 용어 하나 추가
        let other_id = db
            .create_term(&NewTerm {
                term_type: TermType::Prescription,
                translation: NewTermTranslation {
                    language_code: "en".to_string(),
                    name: "Amlodipine".to_string(),
                    description: None,
                    url: None,
                },
                synonyms: vec![],
            })
            .unwrap();

        let en = db.get_all_terms("en").unwrap();
        assert_eq!(
            en.iter().map(|t| t.medical_term_id).collect::<Vec<_>>(),
            vec![hyper_id, other_id]
        );

        let fr = db.get_all_terms("fr").unwrap();
        assert_eq!(
            fr.iter().map(|t| t.medical_term_id).collect::<Vec<_>>(),
            vec![hyper_id]
        );
    }

    #[test]
    fn test_update_term_partial_fields() {
        let db = test_db();
        let (term_id, _) = hypertension_term(&db);

        // description만 변경, 나머지는 그대로
        let info = db
            .update_term(
                term_id,
                "en",
                &TermUpdate {
                    description: Some("High arterial pressure".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(info.name, "Hypertension");
        assert_eq!(info.description.as_deref(), Some("High arterial pressure"));
        assert_eq!(info.medical_term_type, TermType::Condition);

        // 분류만 변경해도 번역 행은 필요 없음
        let info = db
            .update_term(
                term_id,
                "en",
                &TermUpdate {
                    term_type: Some(TermType::General),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(info.medical_term_type, TermType::General);
    }

    #[test]
    fn test_update_term_missing_translation_row() {
        let db = test_db();
        let (term_id, _) = hypertension_term(&db);

        let err = db
            .update_term(
                term_id,
                "de",
                &TermUpdate {
                    description: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, HealError::TranslationMissing { .. }));

        let err = db.update_term(404, "en", &TermUpdate::default()).unwrap_err();
        assert!(matches!(err, HealError::TermNotFound(404)));
    }

    #[test]
    fn test_delete_term_cascades() {
        let db = test_db();
        let (term_id, synonym_id) = hypertension_term(&db);

        let message_id = db.insert_message(1, 9, "patient has high blood pressure").unwrap();
        db.create_link_row(message_id, term_id, Some(synonym_id), None)
            .unwrap();

        db.delete_term(term_id).unwrap();

        assert!(matches!(
            db.get_term(term_id, "en").unwrap_err(),
            HealError::TermNotFound(_)
        ));
        assert!(db.list_links(message_id).unwrap().is_empty());
        assert!(db.synonym_ids(term_id).unwrap().is_empty());

        // 메시지 자체는 표준 데이터이므로 남는다
        let rendered = db.get_message(1, message_id, "en").unwrap();
        assert!(rendered.content.metadata.medical_terms.is_empty());
    }

    #[test]
    fn test_search_by_type_and_synonym() {
        let db = test_db();
        let (hyper_id, _) = hypertension_term(&db);

        let aspirin_id = db
            .create_term(&NewTerm {
                term_type: TermType::Prescription,
                translation: NewTermTranslation {
                    language_code: "en".to_string(),
                    name: "Aspirin".to_string(),
                    description: None,
                    url: None,
                },
                synonyms: vec![NewSynonym {
                    synonym: "acetylsalicylic acid".to_string(),
                    language_code: "en".to_string(),
                }],
            })
            .unwrap();

        // 동의어 부분 일치 (대소문자 무시)
        let hits = db.search_terms("Blood Pressure").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].term_id, hyper_id);
        assert_eq!(hits[0].translations.len(), 2);
        assert_eq!(hits[0].synonyms.len(), 1);

        // 분류 텍스트 부분 일치
        let hits = db.search_terms("prescr").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].term_id, aspirin_id);

        assert!(db.search_terms("no such thing").unwrap().is_empty());
    }

    #[test]
    fn test_add_translation_overwrites_same_language() {
        let db = test_db();
        let (term_id, _) = hypertension_term(&db);

        db.add_translation(
            term_id,
            &NewTermTranslation {
                language_code: "fr".to_string(),
                name: "Hypertension artérielle".to_string(),
                description: None,
                url: None,
            },
        )
        .unwrap();

        let info = db.get_term(term_id, "fr").unwrap();
        assert_eq!(info.name, "Hypertension artérielle");
        // 언어당 번역 행은 최대 1개
        assert_eq!(db.search_terms("blood")
            .unwrap()[0]
            .translations
            .iter()
            .filter(|t| t.language == "fr")
            .count(), 1);
    }
}

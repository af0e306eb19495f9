//! Database Module
//!
//! SQLite 데이터베이스 관리

mod links;
mod messages;
mod schema;
mod terms;
mod translation;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::error::HealError;

/// 데이터베이스 상태 (서비스 레이어가 공유 상태로 관리)
pub struct DbState(pub Mutex<Database>);

/// 멀티 행 해석 도중 호출자가 중단을 요청하는 토큰
///
/// 용어 해석 루프는 행 단위 조회 사이마다 토큰을 확인하고,
/// 중단 시 진행 중이던 작업을 버리고 `HealError::Cancelled`를 돌려줍니다.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// 데이터베이스 래퍼
pub struct Database {
    conn: Connection,
}

impl Database {
    /// 새 데이터베이스 연결 생성
    pub fn new(path: &Path) -> Result<Self, HealError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    /// 인메모리 데이터베이스 연결 생성 (테스트 및 임시 캐시용)
    pub fn open_in_memory() -> Result<Self, HealError> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    /// 데이터베이스 스키마 초기화
    pub fn initialize(&self) -> Result<(), HealError> {
        self.conn.execute_batch(schema::CREATE_SCHEMA)?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Database;
    use crate::models::{NewSynonym, NewTerm, NewTermTranslation, TermType};

    /// 초기화된 인메모리 DB
    pub fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    /// §8 예시 데이터: Hypertension 용어 (en/fr 번역 + en 동의어)
    pub fn hypertension_term(db: &Database) -> (i64, i64) {
        let term_id = db
            .create_term(&NewTerm {
                term_type: TermType::Condition,
                translation: NewTermTranslation {
                    language_code: "en".to_string(),
                    name: "Hypertension".to_string(),
                    description: Some("Abnormally high blood pressure".to_string()),
                    url: Some("https://medlineplus.gov/highbloodpressure.html".to_string()),
                },
                synonyms: vec![NewSynonym {
                    synonym: "high blood pressure".to_string(),
                    language_code: "en".to_string(),
                }],
            })
            .unwrap();

        db.add_translation(
            term_id,
            &NewTermTranslation {
                language_code: "fr".to_string(),
                name: "Hypertension".to_string(),
                description: Some("Pression artérielle anormalement élevée".to_string()),
                url: None,
            },
        )
        .unwrap();

        let synonym_id = db.synonym_ids(term_id).unwrap()[0];
        (term_id, synonym_id)
    }
}

//! Database Schema
//!
//! SQLite 테이블 스키마 정의

/// 데이터베이스 스키마 생성 SQL
pub const CREATE_SCHEMA: &str = r#"
-- 채팅 메시지 테이블 (채팅/룸 서브시스템이 적재, 코어는 읽기 전용)
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    room_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    send_time INTEGER NOT NULL,
    text TEXT NOT NULL
);

-- 메시지 인덱스 (룸 단위 페이징은 id 오름차순)
CREATE INDEX IF NOT EXISTS idx_messages_room ON messages(room_id, id);

-- 의학 용어 테이블 (언어 독립 표준 레코드)
CREATE TABLE IF NOT EXISTS medical_terms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    term_type TEXT NOT NULL DEFAULT 'GENERAL'
        CHECK (term_type IN ('GENERAL', 'CONDITION', 'PRESCRIPTION'))
);

-- 용어 번역 테이블 (용어당 언어별 최대 1행)
CREATE TABLE IF NOT EXISTS medical_term_translations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medical_term_id INTEGER NOT NULL,
    language_code TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT,
    url TEXT,
    UNIQUE (medical_term_id, language_code),
    FOREIGN KEY (medical_term_id) REFERENCES medical_terms(id) ON DELETE CASCADE
);

-- 용어 동의어 테이블 (용어당 언어별 여러 행 가능, 고유 키 아님)
CREATE TABLE IF NOT EXISTS medical_term_synonyms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    medical_term_id INTEGER NOT NULL,
    synonym TEXT NOT NULL,
    language_code TEXT NOT NULL,
    FOREIGN KEY (medical_term_id) REFERENCES medical_terms(id) ON DELETE CASCADE
);

-- 동의어 인덱스
CREATE INDEX IF NOT EXISTS idx_synonyms_term ON medical_term_synonyms(medical_term_id);
CREATE INDEX IF NOT EXISTS idx_synonyms_text ON medical_term_synonyms(synonym);

-- 메시지 번역 캐시 (메시지당 언어별 최대 1행, 없음 = 아직 번역 전)
CREATE TABLE IF NOT EXISTS message_translation_cache (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id INTEGER NOT NULL,
    language_code TEXT NOT NULL,
    translated_text TEXT NOT NULL,
    UNIQUE (message_id, language_code),
    FOREIGN KEY (message_id) REFERENCES messages(id) ON DELETE CASCADE
);

-- 메시지-용어 링크 캐시 (메시지 안에서 감지된 용어 언급 1건 = 1행)
CREATE TABLE IF NOT EXISTS message_term_cache (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message_id INTEGER NOT NULL,
    medical_term_id INTEGER NOT NULL,
    original_synonym_id INTEGER,
    translated_synonym_id INTEGER,
    FOREIGN KEY (message_id) REFERENCES messages(id) ON DELETE CASCADE,
    FOREIGN KEY (medical_term_id) REFERENCES medical_terms(id) ON DELETE CASCADE,
    FOREIGN KEY (original_synonym_id) REFERENCES medical_term_synonyms(id),
    FOREIGN KEY (translated_synonym_id) REFERENCES medical_term_synonyms(id)
);

-- 링크 캐시 인덱스
CREATE INDEX IF NOT EXISTS idx_term_cache_message ON message_term_cache(message_id);
CREATE INDEX IF NOT EXISTS idx_term_cache_term ON message_term_cache(medical_term_id);
"#;

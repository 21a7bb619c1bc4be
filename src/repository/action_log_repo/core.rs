use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex};

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

pub(super) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl ActionLogRepository {
    /// 创建新的操作日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 插入操作日志
    ///
    /// # 返回
    /// - `Ok(action_id)`: 成功插入,返回action_id
    /// - `Err(...)`: 数据库错误
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;
        Self::insert_on(&conn, log)
    }

    /// 在事务中插入操作日志（与台账写入同一事务提交）
    pub fn insert_tx(tx: &Transaction, log: &ActionLog) -> RepositoryResult<String> {
        Self::insert_on(tx, log)
    }

    fn insert_on(conn: &Connection, log: &ActionLog) -> RepositoryResult<String> {
        conn.execute(
            r#"
            INSERT INTO action_log (
                action_id, action_type, action_ts, actor, detail, payload_json
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                log.action_id,
                log.action_type.as_str(),
                log.action_ts.format(TS_FORMAT).to_string(),
                log.actor,
                log.detail,
                log.payload_json.as_ref().map(|v| v.to_string()),
            ],
        )?;

        Ok(log.action_id.clone())
    }
}

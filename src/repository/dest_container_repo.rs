// ==========================================
// 仓库库位分配系统 - 目的地→柜号索引仓储
// ==========================================
// 红线: 只增不减 (INSERT OR IGNORE)
// ==========================================

use crate::domain::container_index::{ContainerIndexEntry, DestinationContainerIndex};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Transaction};
use std::sync::{Arc, Mutex};

pub struct DestContainerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DestContainerRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中合并本次导入的关联, 返回新增条数
    pub fn merge_tx(tx: &Transaction, proposal: &[ContainerIndexEntry]) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO dest_container (destination, container_id) VALUES (?1, ?2)",
        )?;
        let mut inserted = 0;
        for entry in proposal {
            inserted += stmt.execute(params![entry.destination, entry.container_id])?;
        }
        Ok(inserted)
    }

    /// 读取完整索引（每个目的地内按首次出现顺序）
    pub fn load_index(&self) -> RepositoryResult<DestinationContainerIndex> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT destination, container_id
            FROM dest_container
            ORDER BY destination, first_seen_at, rowid
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ContainerIndexEntry {
                destination: row.get(0)?,
                container_id: row.get(1)?,
            })
        })?;

        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;

        let mut index = DestinationContainerIndex::new();
        index.merge(&entries);
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(dest: &str, container: &str) -> ContainerIndexEntry {
        ContainerIndexEntry {
            destination: dest.to_string(),
            container_id: container.to_string(),
        }
    }

    #[test]
    fn test_merge_is_additive() {
        let mut conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        {
            let tx = conn.transaction().unwrap();
            let first = [entry("LAX9", "C1"), entry("ONT8", "C1")];
            assert_eq!(DestContainerRepository::merge_tx(&tx, &first).unwrap(), 2);
            let second = [entry("LAX9", "C1"), entry("LAX9", "C2")];
            assert_eq!(DestContainerRepository::merge_tx(&tx, &second).unwrap(), 1);
            tx.commit().unwrap();
        }
        let repo = DestContainerRepository::new(Arc::new(Mutex::new(conn)));

        let index = repo.load_index().unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.containers_for("LAX9"), ["C1".to_string(), "C2".to_string()]);
    }
}

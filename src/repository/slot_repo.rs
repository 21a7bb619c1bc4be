// ==========================================
// 仓库库位分配系统 - 库位台账仓储
// ==========================================
// 职责: slot 表 ↔ Vec<Slot>
// 约定: sort_order 保存台账顺序 (分配同分时取靠前库位, 顺序必须稳定)
// 红线: Repository 不含业务逻辑; 整表写入在一个事务内完成
// ==========================================

use crate::domain::slot::Slot;
use crate::domain::types::SlotCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT slot_id, category, note, pallet_capacity, pallet_occupancy,
           destination_tags, max_destination_tags
    FROM slot
"#;

pub struct SlotRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SlotRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按台账顺序读取全部库位
    pub fn find_all(&self) -> RepositoryResult<Vec<Slot>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY sort_order, slot_id", SELECT_COLUMNS))?;
        let slots = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(slots)
    }

    // ==========================================
    // 事务内操作（由 API 层统一开启/提交事务）
    // ==========================================

    /// 在事务中按台账顺序读取全部库位
    pub fn find_all_tx(tx: &Transaction) -> RepositoryResult<Vec<Slot>> {
        let mut stmt = tx.prepare(&format!("{} ORDER BY sort_order, slot_id", SELECT_COLUMNS))?;
        let slots = stmt
            .query_map([], Self::map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(slots)
    }

    pub fn find_by_id_tx(tx: &Transaction, slot_id: &str) -> RepositoryResult<Option<Slot>> {
        let slot = tx
            .query_row(
                &format!("{} WHERE slot_id = ?1", SELECT_COLUMNS),
                params![slot_id],
                Self::map_row,
            )
            .optional()?;
        Ok(slot)
    }

    /// 在事务中保存整份台账（按传入顺序更新 sort_order）
    pub fn save_all_tx(tx: &Transaction, slots: &[Slot]) -> RepositoryResult<usize> {
        for (order, slot) in slots.iter().enumerate() {
            Self::write_row_tx(tx, slot, order as i64)?;
        }
        Ok(slots.len())
    }

    /// 在事务中以种子数据替换整份台账
    pub fn replace_all_tx(tx: &Transaction, slots: &[Slot]) -> RepositoryResult<usize> {
        tx.execute("DELETE FROM slot", [])?;
        Self::save_all_tx(tx, slots)
    }

    /// 单个库位写入（新库位排在台账末尾）
    ///
    /// # 返回
    /// - true: 新增
    /// - false: 覆盖已有库位
    pub fn upsert_tx(tx: &Transaction, slot: &Slot) -> RepositoryResult<bool> {
        let existing: Option<i64> = tx
            .query_row(
                "SELECT sort_order FROM slot WHERE slot_id = ?1",
                params![slot.id],
                |row| row.get(0),
            )
            .optional()?;
        let order = match existing {
            Some(order) => order,
            None => tx.query_row("SELECT COALESCE(MAX(sort_order) + 1, 0) FROM slot", [], |row| {
                row.get(0)
            })?,
        };
        Self::write_row_tx(tx, slot, order)?;
        Ok(existing.is_none())
    }

    /// 删除库位（管理操作, 引擎从不删除库位）
    pub fn delete_tx(tx: &Transaction, slot_id: &str) -> RepositoryResult<bool> {
        let rows = tx.execute("DELETE FROM slot WHERE slot_id = ?1", params![slot_id])?;
        Ok(rows > 0)
    }

    // ==========================================
    // 私有方法
    // ==========================================

    fn write_row_tx(tx: &Transaction, slot: &Slot, sort_order: i64) -> RepositoryResult<()> {
        let tags_json = serde_json::to_string(&slot.destination_tags)?;
        tx.execute(
            r#"
            INSERT INTO slot (
                slot_id, sort_order, category, note, pallet_capacity,
                pallet_occupancy, destination_tags, max_destination_tags, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, datetime('now'))
            ON CONFLICT(slot_id) DO UPDATE SET
                sort_order = excluded.sort_order,
                category = excluded.category,
                note = excluded.note,
                pallet_capacity = excluded.pallet_capacity,
                pallet_occupancy = excluded.pallet_occupancy,
                destination_tags = excluded.destination_tags,
                max_destination_tags = excluded.max_destination_tags,
                updated_at = excluded.updated_at
            "#,
            params![
                slot.id,
                sort_order,
                slot.category.code(),
                slot.note,
                slot.pallet_capacity,
                slot.pallet_occupancy,
                tags_json,
                slot.max_destination_tags,
            ],
        )?;
        Ok(())
    }

    fn map_row(row: &Row) -> rusqlite::Result<Slot> {
        let slot_id: String = row.get(0)?;
        let category_code: String = row.get(1)?;
        let category = category_code.parse::<SlotCategory>().unwrap_or_else(|e| {
            tracing::warn!(slot_id = %slot_id, "{}, 按 other 处理", e);
            SlotCategory::Other
        });

        let tags_json: String = row.get(5)?;
        let destination_tags: Vec<String> = serde_json::from_str(&tags_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        Ok(Slot {
            id: slot_id,
            category,
            note: row.get(2)?,
            pallet_capacity: row.get(3)?,
            pallet_occupancy: row.get(4)?,
            destination_tags,
            max_destination_tags: row.get(6)?,
        })
    }
}

// ==========================================
// 仓库库位分配系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// 红线: 只接受 config_keys 中登记的键; 写入值必须可解析且使分配参数合法
// ==========================================

use crate::config::allocation_config::AllocationConfig;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const CONSOLIDATE_BONUS: &str = "allocation.consolidate_bonus";
    pub const CLEAN_SLOT_BONUS: &str = "allocation.clean_slot_bonus";
    pub const HIGH_UTILIZATION_THRESHOLD: &str = "allocation.high_utilization_threshold";
    pub const HIGH_UTILIZATION_PENALTY: &str = "allocation.high_utilization_penalty";
    pub const CONTAINER_SCAN_ROWS: &str = "import.container_scan_rows";
    pub const HEADER_SCAN_ROWS: &str = "import.header_scan_rows";

    /// 全部可覆写的键
    pub const ALL: &[&str] = &[
        CONSOLIDATE_BONUS,
        CLEAN_SLOT_BONUS,
        HIGH_UTILIZATION_THRESHOLD,
        HIGH_UTILIZATION_PENALTY,
        CONTAINER_SCAN_ROWS,
        HEADER_SCAN_ROWS,
    ];
}

const UPSERT_SQL: &str = r#"
    INSERT INTO config_kv (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
"#;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 从 config_kv 表读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 在事务中写入配置值（存在则覆盖）, 返回旧值
    ///
    /// 调用方需先经 `validate_entry` 校验
    pub fn set_config_value_tx(
        tx: &Transaction,
        key: &str,
        value: &str,
    ) -> rusqlite::Result<Option<String>> {
        let previous = tx
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        tx.execute(UPSERT_SQL, params![key, value])?;
        tracing::info!("配置已更新: {} = {}", key, value);
        Ok(previous)
    }

    /// 校验一次覆写: 键必须已登记, 值必须可解析, 覆写后分配参数必须合法
    pub fn validate_entry(&self, key: &str, value: &str) -> Result<(), String> {
        let mut candidate = self
            .get_allocation_config()
            .map_err(|e| format!("读取当前参数失败: {}", e))?;
        let raw = value.trim();

        match key {
            config_keys::CONSOLIDATE_BONUS => candidate.consolidate_bonus = parse_value(key, raw)?,
            config_keys::CLEAN_SLOT_BONUS => candidate.clean_slot_bonus = parse_value(key, raw)?,
            config_keys::HIGH_UTILIZATION_THRESHOLD => {
                candidate.high_utilization_threshold = parse_value(key, raw)?
            }
            config_keys::HIGH_UTILIZATION_PENALTY => {
                candidate.high_utilization_penalty = parse_value(key, raw)?
            }
            config_keys::CONTAINER_SCAN_ROWS => {
                candidate.container_scan_rows = parse_value(key, raw)?
            }
            config_keys::HEADER_SCAN_ROWS => candidate.header_scan_rows = parse_value(key, raw)?,
            _ => {
                return Err(format!(
                    "未知配置键: {} (可用: {})",
                    key,
                    config_keys::ALL.join(", ")
                ))
            }
        }

        candidate.validate()
    }

    /// 读取并解析配置值，缺失或解析失败时回退默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy + std::fmt::Display,
    {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    tracing::warn!("配置值无法解析: {}={}, 使用默认值 {}", key, raw, default);
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// 读取分配参数（未配置项使用默认值）
    pub fn get_allocation_config(&self) -> Result<AllocationConfig, Box<dyn Error>> {
        let defaults = AllocationConfig::default();
        let config = AllocationConfig {
            consolidate_bonus: self
                .get_parsed_or(config_keys::CONSOLIDATE_BONUS, defaults.consolidate_bonus)?,
            clean_slot_bonus: self
                .get_parsed_or(config_keys::CLEAN_SLOT_BONUS, defaults.clean_slot_bonus)?,
            high_utilization_threshold: self.get_parsed_or(
                config_keys::HIGH_UTILIZATION_THRESHOLD,
                defaults.high_utilization_threshold,
            )?,
            high_utilization_penalty: self.get_parsed_or(
                config_keys::HIGH_UTILIZATION_PENALTY,
                defaults.high_utilization_penalty,
            )?,
            container_scan_rows: self
                .get_parsed_or(config_keys::CONTAINER_SCAN_ROWS, defaults.container_scan_rows)?,
            header_scan_rows: self
                .get_parsed_or(config_keys::HEADER_SCAN_ROWS, defaults.header_scan_rows)?,
        };

        if let Err(reason) = config.validate() {
            tracing::warn!("分配参数非法 ({}), 回退默认值", reason);
            return Ok(defaults);
        }
        Ok(config)
    }

    /// 已覆写的配置项（按键排序）
    pub fn get_overrides(&self) -> Result<BTreeMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut overrides = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            overrides.insert(key, value);
        }
        Ok(overrides)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, String> {
    raw.parse::<T>()
        .map_err(|_| format!("配置值无法解析: {}={}", key, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_manager() -> (Arc<Mutex<Connection>>, ConfigManager) {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        (conn.clone(), ConfigManager::from_connection(conn))
    }

    fn write(conn: &Arc<Mutex<Connection>>, key: &str, value: &str) -> Option<String> {
        let mut guard = conn.lock().unwrap();
        let tx = guard.transaction().unwrap();
        let previous = ConfigManager::set_config_value_tx(&tx, key, value).unwrap();
        tx.commit().unwrap();
        previous
    }

    #[test]
    fn test_defaults_when_unset() {
        let (_conn, manager) = create_manager();
        let config = manager.get_allocation_config().unwrap();
        assert_eq!(config, AllocationConfig::default());
    }

    #[test]
    fn test_override_and_list() {
        let (conn, manager) = create_manager();
        assert_eq!(write(&conn, config_keys::HIGH_UTILIZATION_PENALTY, "350"), None);
        write(&conn, config_keys::HIGH_UTILIZATION_THRESHOLD, "0.9");
        assert_eq!(
            write(&conn, config_keys::HIGH_UTILIZATION_PENALTY, "300"),
            Some("350".to_string())
        );

        let config = manager.get_allocation_config().unwrap();
        assert_eq!(config.high_utilization_penalty, 300);
        assert_eq!(config.high_utilization_threshold, 0.9);

        let overrides = manager.get_overrides().unwrap();
        let keys: Vec<&str> = overrides.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                config_keys::HIGH_UTILIZATION_PENALTY,
                config_keys::HIGH_UTILIZATION_THRESHOLD
            ]
        );
    }

    #[test]
    fn test_unparsable_value_falls_back() {
        let (conn, manager) = create_manager();
        write(&conn, config_keys::CLEAN_SLOT_BONUS, "lots");
        let config = manager.get_allocation_config().unwrap();
        assert_eq!(config.clean_slot_bonus, 500);
    }

    #[test]
    fn test_validate_entry() {
        let (_conn, manager) = create_manager();
        assert!(manager.validate_entry(config_keys::HEADER_SCAN_ROWS, "5").is_ok());
        assert!(manager
            .validate_entry("allocation.penalty", "100")
            .unwrap_err()
            .contains("未知配置键"));
        assert!(manager
            .validate_entry(config_keys::CLEAN_SLOT_BONUS, "lots")
            .unwrap_err()
            .contains("无法解析"));
        assert!(manager.validate_entry(config_keys::HEADER_SCAN_ROWS, "0").is_err());
        assert!(manager
            .validate_entry(config_keys::HIGH_UTILIZATION_PENALTY, "-5")
            .is_err());
    }
}

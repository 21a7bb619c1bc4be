// ==========================================
// 仓库库位分配系统 - 仓库业务 API
// ==========================================
// 职责: 串联 读取 → 解析 → (加锁) 加载台账 → 引擎 → 落库 → 记日志
// 红线: 解析必须在加载台账之前完成, 解析失败不得改动台账
// 红线: 同一时刻只允许一个台账修改在途 (ledger_guard)
// 红线: 台账写入、柜号索引合并、操作日志在同一事务内提交, 任一失败整体回滚
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AllocationConfig, ConfigManager};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::container_index::DestinationContainerIndex;
use crate::domain::sheet::SheetMatrix;
use crate::domain::shipment::{AnnotatedPlan, InventoryLine, OutboundLine, ShipmentLine};
use crate::domain::slot::{Slot, SlotField};
use crate::engine::{
    InventoryApplier, InventoryApplyReport, LedgerStats, LedgerStatsEngine, OutboundReconciler,
    PlanAnnotator, ReconcileReport, SkippedLine, SlotAllocator,
};
use crate::importer::{
    InventorySheetParser, OutboundSheetParser, PlanExporter, SheetReader, UniversalSheetReader,
    UnloadSheetParser,
};
use crate::repository::{
    ActionLogRepository, DestContainerRepository, RepositoryError, SlotRepository,
};
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::instrument;

// ==========================================
// 响应类型
// ==========================================

/// 卸柜单导入结果
#[derive(Debug, Clone, Serialize)]
pub struct UnloadImportResponse {
    pub action_id: String,
    pub container_id: Option<String>,
    pub header_row_index: usize,
    pub total_lines: usize,
    pub total_pallets: u64,
    pub assigned: usize,
    pub unassigned: usize,
    pub new_container_links: usize,
    pub lines: Vec<ShipmentLine>,
    pub skipped: Vec<SkippedLine>,
    /// 回写建议库位后的原表
    #[serde(skip)]
    pub plan: AnnotatedPlan,
}

/// 出库单导入结果
#[derive(Debug, Clone, Serialize)]
pub struct OutboundImportResponse {
    pub action_id: String,
    pub lines: Vec<OutboundLine>,
    pub report: ReconcileReport,
}

/// 盘点单导入结果
#[derive(Debug, Clone, Serialize)]
pub struct InventoryImportResponse {
    pub action_id: String,
    pub lines: Vec<InventoryLine>,
    pub report: InventoryApplyReport,
}

// ==========================================
// WarehouseApi
// ==========================================
pub struct WarehouseApi {
    conn: Arc<Mutex<Connection>>,
    slot_repo: SlotRepository,
    dest_container_repo: DestContainerRepository,
    action_log_repo: ActionLogRepository,
    config_manager: ConfigManager,
    ledger_guard: Mutex<()>,
}

impl WarehouseApi {
    /// 打开（或创建）数据库并初始化表结构
    pub fn open(db_path: &str) -> ApiResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        crate::db::init_schema(&conn).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let schema_version = crate::db::read_schema_version(&conn)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        tracing::info!(?schema_version, "数据库已就绪: {}", db_path);
        Ok(Self::from_connection(Arc::new(Mutex::new(conn))))
    }

    /// 基于已初始化的共享连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            slot_repo: SlotRepository::new(conn.clone()),
            dest_container_repo: DestContainerRepository::new(conn.clone()),
            action_log_repo: ActionLogRepository::new(conn.clone()),
            config_manager: ConfigManager::from_connection(conn.clone()),
            ledger_guard: Mutex::new(()),
            conn,
        }
    }

    /// 当前生效的分配参数（读取失败时回退默认值）
    pub fn allocation_config(&self) -> AllocationConfig {
        self.config_manager
            .get_allocation_config()
            .unwrap_or_else(|e| {
                tracing::warn!("读取分配参数失败, 使用默认值: {}", e);
                AllocationConfig::default()
            })
    }

    fn lock_ledger(&self) -> ApiResult<std::sync::MutexGuard<'_, ()>> {
        self.ledger_guard
            .lock()
            .map_err(|e| ApiError::InternalError(format!("台账锁获取失败: {}", e)))
    }

    /// 在台账锁 + 单个事务内执行写操作; 闭包返回 Err 时事务回滚
    ///
    /// 闭包内只能调用仓储的 `_tx` 方法（连接锁已被持有）
    fn in_ledger_tx<T>(&self, f: impl FnOnce(&Transaction) -> ApiResult<T>) -> ApiResult<T> {
        let _guard = self.lock_ledger()?;
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        let value = f(&tx)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(value)
    }

    /// 不涉及台账的独立日志
    fn record(&self, log: ActionLog) -> ApiResult<String> {
        Ok(self.action_log_repo.insert(&log)?)
    }

    // ==========================================
    // 台账初始化
    // ==========================================

    /// 读取 JSON 种子文件（库位数组）
    pub fn load_seed_file(path: &Path) -> ApiResult<Vec<Slot>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ApiError::InvalidInput(format!("读取种子文件失败 {}: {}", path.display(), e)))?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidInput(format!("种子文件格式错误: {}", e)))
    }

    /// 以种子数据替换整份台账
    #[instrument(skip(self, slots), fields(slots_count = slots.len()))]
    pub fn seed_slots(&self, slots: &[Slot], actor: &str) -> ApiResult<usize> {
        let mut seen = HashSet::new();
        for slot in slots {
            if slot.id.trim().is_empty() {
                return Err(ApiError::InvalidInput("库位编码不能为空".to_string()));
            }
            if !seen.insert(slot.id.as_str()) {
                return Err(ApiError::InvalidInput(format!("库位编码重复: {}", slot.id)));
            }
        }

        self.in_ledger_tx(|tx| {
            let count = SlotRepository::replace_all_tx(tx, slots)?;
            ActionLogRepository::insert_tx(
                tx,
                &ActionLog::new(
                    ActionType::LedgerSeed,
                    actor,
                    format!("Seeded ledger: {} slots", count),
                ),
            )?;
            Ok(count)
        })
    }

    // ==========================================
    // 卸柜单导入 + 自动分配
    // ==========================================

    pub fn import_unload_file(&self, path: &Path, actor: &str) -> ApiResult<UnloadImportResponse> {
        let matrix = UniversalSheetReader.read_matrix(path)?;
        self.import_unload_matrix(&matrix, actor)
    }

    #[instrument(skip(self, matrix), fields(rows = matrix.len()))]
    pub fn import_unload_matrix(
        &self,
        matrix: &SheetMatrix,
        actor: &str,
    ) -> ApiResult<UnloadImportResponse> {
        let config = self.allocation_config();

        // 1. 解析（失败则直接返回, 台账未触碰）
        let plan = UnloadSheetParser::from_config(&config).parse(matrix)?;

        // 2. 加载 → 分配 → 落库 → 索引 → 日志（同一事务）
        let (result, new_container_links, action_id) = self.in_ledger_tx(|tx| {
            let mut ledger = SlotRepository::find_all_tx(tx)?;
            let result = SlotAllocator::with_config(config).assign(&plan.lines, &mut ledger);
            SlotRepository::save_all_tx(tx, &ledger)?;

            let proposal = DestinationContainerIndex::propose(&result.lines);
            let new_container_links = DestContainerRepository::merge_tx(tx, &proposal)?;

            let detail = format!(
                "Imported Unload Plan: {} rows. Container: {}",
                result.lines.len(),
                plan.container_id.as_deref().unwrap_or("-")
            );
            let log = ActionLog::new(ActionType::UnloadImport, actor, detail).with_payload(json!({
                "container_id": plan.container_id,
                "assigned": result.assigned_count(),
                "unassigned": result.unassigned_count(),
                "total_pallets": plan.total_pallets(),
            }));
            let action_id = ActionLogRepository::insert_tx(tx, &log)?;
            Ok((result, new_container_links, action_id))
        })?;

        // 3. 回写建议库位
        let annotated = PlanAnnotator.annotate(&plan, &result.lines);

        let assigned = result.assigned_count();
        let unassigned = result.unassigned_count();

        Ok(UnloadImportResponse {
            action_id,
            container_id: plan.container_id.clone(),
            header_row_index: plan.header_row_index,
            total_lines: result.lines.len(),
            total_pallets: plan.total_pallets(),
            assigned,
            unassigned,
            new_container_links,
            lines: result.lines,
            skipped: result.skipped,
            plan: annotated,
        })
    }

    /// 导出建议库位计划
    pub fn export_plan_csv(
        &self,
        plan: &AnnotatedPlan,
        path: &Path,
        actor: &str,
    ) -> ApiResult<usize> {
        let rows = PlanExporter.write_csv(plan, path)?;
        self.record(ActionLog::new(
            ActionType::PlanExport,
            actor,
            format!("Exported plan: {} ({} rows)", path.display(), rows),
        ))?;
        Ok(rows)
    }

    // ==========================================
    // 出库单导入 + 扣减
    // ==========================================

    pub fn import_outbound_file(&self, path: &Path, actor: &str) -> ApiResult<OutboundImportResponse> {
        let matrix = UniversalSheetReader.read_matrix(path)?;
        self.import_outbound_matrix(&matrix, actor)
    }

    #[instrument(skip(self, matrix), fields(rows = matrix.len()))]
    pub fn import_outbound_matrix(
        &self,
        matrix: &SheetMatrix,
        actor: &str,
    ) -> ApiResult<OutboundImportResponse> {
        let lines = OutboundSheetParser.parse(matrix)?;

        let (report, action_id) = self.in_ledger_tx(|tx| {
            let mut ledger = SlotRepository::find_all_tx(tx)?;
            let report = OutboundReconciler::new().reconcile(&lines, &mut ledger);
            SlotRepository::save_all_tx(tx, &ledger)?;

            let log = ActionLog::new(
                ActionType::OutboundImport,
                actor,
                format!("Imported Outbound: Deducted {} pallets", report.total_deducted),
            )
            .with_payload(json!({
                "lines": lines.len(),
                "total_deducted": report.total_deducted,
                "shortfalls": report.shortfalls.len(),
            }));
            let action_id = ActionLogRepository::insert_tx(tx, &log)?;
            Ok((report, action_id))
        })?;

        Ok(OutboundImportResponse {
            action_id,
            lines,
            report,
        })
    }

    // ==========================================
    // 盘点单导入（覆盖托盘数）
    // ==========================================

    pub fn import_inventory_file(
        &self,
        path: &Path,
        actor: &str,
    ) -> ApiResult<InventoryImportResponse> {
        let matrix = UniversalSheetReader.read_matrix(path)?;
        self.import_inventory_matrix(&matrix, actor)
    }

    #[instrument(skip(self, matrix), fields(rows = matrix.len()))]
    pub fn import_inventory_matrix(
        &self,
        matrix: &SheetMatrix,
        actor: &str,
    ) -> ApiResult<InventoryImportResponse> {
        let lines = InventorySheetParser.parse(matrix)?;

        let (report, action_id) = self.in_ledger_tx(|tx| {
            let mut ledger = SlotRepository::find_all_tx(tx)?;
            let report = InventoryApplier.apply(&lines, &mut ledger);
            SlotRepository::save_all_tx(tx, &ledger)?;

            let log = ActionLog::new(
                ActionType::InventoryImport,
                actor,
                format!("Inventory Import: Updated {} locations.", report.updated),
            )
            .with_payload(json!({
                "updated": report.updated,
                "unknown_slot_ids": report.unknown_slot_ids,
            }));
            let action_id = ActionLogRepository::insert_tx(tx, &log)?;
            Ok((report, action_id))
        })?;

        Ok(InventoryImportResponse {
            action_id,
            lines,
            report,
        })
    }

    // ==========================================
    // 台账维护
    // ==========================================

    /// 新增或整体覆盖单个库位
    ///
    /// # 返回
    /// - true: 新增（排在台账末尾）
    /// - false: 覆盖已有库位（保持原位置）
    #[instrument(skip(self, slot), fields(slot_id = %slot.id))]
    pub fn upsert_slot(&self, slot: &Slot, actor: &str) -> ApiResult<bool> {
        if slot.id.trim().is_empty() {
            return Err(ApiError::InvalidInput("库位编码不能为空".to_string()));
        }
        let unique: HashSet<&str> = slot.destination_tags.iter().map(String::as_str).collect();
        if unique.len() != slot.destination_tags.len() {
            return Err(ApiError::InvalidInput(format!("库位 {} 目的地重复", slot.id)));
        }

        self.in_ledger_tx(|tx| {
            let added = SlotRepository::upsert_tx(tx, slot)?;
            let detail = if added {
                format!("Added slot: {}", slot.id)
            } else {
                format!("Replaced slot: {}", slot.id)
            };
            let log = ActionLog::new(ActionType::SlotUpsert, actor, detail)
                .with_payload(json!({ "slot": slot, "added": added }));
            ActionLogRepository::insert_tx(tx, &log)?;
            Ok(added)
        })
    }

    /// 修改库位的单个字段, 返回修改后的库位
    #[instrument(skip(self))]
    pub fn update_slot(
        &self,
        slot_id: &str,
        field: SlotField,
        value: &str,
        actor: &str,
    ) -> ApiResult<Slot> {
        self.in_ledger_tx(|tx| {
            let mut slot = SlotRepository::find_by_id_tx(tx, slot_id)?
                .ok_or_else(|| ApiError::NotFound(format!("库位 {} 不存在", slot_id)))?;

            let old_value = field.read(&slot);
            field.write(&mut slot, value).map_err(ApiError::InvalidInput)?;
            let new_value = field.read(&slot);

            SlotRepository::upsert_tx(tx, &slot)?;
            let log = ActionLog::new(
                ActionType::SlotUpdate,
                actor,
                format!("Updated {} {}: {} -> {}", slot.id, field, old_value, new_value),
            )
            .with_payload(json!({
                "slot_id": slot.id,
                "field": field,
                "old": old_value,
                "new": new_value,
            }));
            ActionLogRepository::insert_tx(tx, &log)?;
            Ok(slot)
        })
    }

    /// 删除库位
    #[instrument(skip(self))]
    pub fn delete_slot(&self, slot_id: &str, actor: &str) -> ApiResult<()> {
        self.in_ledger_tx(|tx| {
            if !SlotRepository::delete_tx(tx, slot_id)? {
                return Err(ApiError::NotFound(format!("库位 {} 不存在", slot_id)));
            }
            ActionLogRepository::insert_tx(
                tx,
                &ActionLog::new(
                    ActionType::SlotDelete,
                    actor,
                    format!("Deleted slot: {}", slot_id),
                ),
            )?;
            Ok(())
        })
    }

    /// 记录现场异常（只写日志, 不改台账）
    pub fn log_exception(&self, note: &str, actor: &str) -> ApiResult<String> {
        let note = note.trim();
        if note.is_empty() {
            return Err(ApiError::InvalidInput("异常说明不能为空".to_string()));
        }
        tracing::warn!(actor, "现场异常: {}", note);
        self.record(ActionLog::new(
            ActionType::ExceptionNote,
            actor,
            format!("EXCEPTION LOGGED: {}", note),
        ))
    }

    // ==========================================
    // 分配参数
    // ==========================================

    /// 覆写一项分配参数, 返回覆写后生效的参数
    #[instrument(skip(self))]
    pub fn set_config(&self, key: &str, value: &str, actor: &str) -> ApiResult<AllocationConfig> {
        let value = value.trim();
        self.config_manager
            .validate_entry(key, value)
            .map_err(ApiError::InvalidInput)?;

        self.in_ledger_tx(|tx| {
            let previous = ConfigManager::set_config_value_tx(tx, key, value)
                .map_err(RepositoryError::from)?;
            let log = ActionLog::new(
                ActionType::ConfigUpdate,
                actor,
                format!(
                    "Updated config {}: {} -> {}",
                    key,
                    previous.as_deref().unwrap_or("-"),
                    value
                ),
            );
            ActionLogRepository::insert_tx(tx, &log)?;
            Ok(())
        })?;

        Ok(self.allocation_config())
    }

    /// 已覆写的参数项
    pub fn config_overrides(&self) -> ApiResult<BTreeMap<String, String>> {
        self.config_manager
            .get_overrides()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn list_slots(&self) -> ApiResult<Vec<Slot>> {
        Ok(self.slot_repo.find_all()?)
    }

    pub fn ledger_stats(&self) -> ApiResult<LedgerStats> {
        let ledger = self.slot_repo.find_all()?;
        Ok(LedgerStatsEngine.compute(&ledger))
    }

    pub fn destination_containers(&self) -> ApiResult<DestinationContainerIndex> {
        Ok(self.dest_container_repo.load_index()?)
    }

    pub fn recent_logs(&self, limit: usize) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.list_recent(limit)?)
    }

    pub fn logs_by_type(&self, action_type: ActionType, limit: usize) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_by_type(action_type, limit)?)
    }

    pub fn find_log(&self, action_id: &str) -> ApiResult<ActionLog> {
        self.action_log_repo
            .find_by_id(action_id)?
            .ok_or_else(|| ApiError::NotFound(format!("操作日志 {} 不存在", action_id)))
    }
}

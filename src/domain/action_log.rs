// ==========================================
// 仓库库位分配系统 - 操作日志领域模型
// ==========================================
// 红线: 所有台账写入必须记录
// 用途: 审计追踪 (卸柜/出库/盘点/种子/导出/库位维护/异常/参数)
// ==========================================

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,        // 日志ID (UUID v4)
    pub action_type: ActionType,  // 操作类型
    pub action_ts: NaiveDateTime, // 操作时间 (本地时间)
    pub actor: String,            // 操作人
    pub detail: String,           // 一行摘要
    pub payload_json: Option<JsonValue>, // 结构化结果
}

impl ActionLog {
    /// 以当前时间创建日志
    pub fn new(action_type: ActionType, actor: &str, detail: impl Into<String>) -> Self {
        Self {
            action_id: Uuid::new_v4().to_string(),
            action_type,
            action_ts: Local::now().naive_local(),
            actor: actor.to_string(),
            detail: detail.into(),
            payload_json: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    UnloadImport,    // 卸柜单导入 + 自动分配
    OutboundImport,  // 出库单导入 + 扣减
    InventoryImport, // 盘点覆盖
    LedgerSeed,      // 台账初始化
    PlanExport,      // 导出建议库位计划
    SlotUpsert,      // 新增或整体覆盖库位
    SlotUpdate,      // 修改库位单个字段
    SlotDelete,      // 删除库位
    ExceptionNote,   // 现场异常记录
    ConfigUpdate,    // 分配参数覆写
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::UnloadImport => "UNLOAD_IMPORT",
            ActionType::OutboundImport => "OUTBOUND_IMPORT",
            ActionType::InventoryImport => "INVENTORY_IMPORT",
            ActionType::LedgerSeed => "LEDGER_SEED",
            ActionType::PlanExport => "PLAN_EXPORT",
            ActionType::SlotUpsert => "SLOT_UPSERT",
            ActionType::SlotUpdate => "SLOT_UPDATE",
            ActionType::SlotDelete => "SLOT_DELETE",
            ActionType::ExceptionNote => "EXCEPTION_NOTE",
            ActionType::ConfigUpdate => "CONFIG_UPDATE",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNLOAD_IMPORT" => Ok(ActionType::UnloadImport),
            "OUTBOUND_IMPORT" => Ok(ActionType::OutboundImport),
            "INVENTORY_IMPORT" => Ok(ActionType::InventoryImport),
            "LEDGER_SEED" => Ok(ActionType::LedgerSeed),
            "PLAN_EXPORT" => Ok(ActionType::PlanExport),
            "SLOT_UPSERT" => Ok(ActionType::SlotUpsert),
            "SLOT_UPDATE" => Ok(ActionType::SlotUpdate),
            "SLOT_DELETE" => Ok(ActionType::SlotDelete),
            "EXCEPTION_NOTE" => Ok(ActionType::ExceptionNote),
            "CONFIG_UPDATE" => Ok(ActionType::ConfigUpdate),
            other => Err(format!("未知操作类型: {}", other)),
        }
    }
}

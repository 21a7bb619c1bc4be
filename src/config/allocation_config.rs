// ==========================================
// 仓库库位分配系统 - 分配参数
// ==========================================
// 职责: 评分权重 / 占用率阈值 / 表头扫描窗口
// 默认值与现场规则保持一致, 可经 config_kv 覆写
// ==========================================

use serde::{Deserialize, Serialize};

/// 分配引擎与卸柜单解析器的可调参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// 库位已有相同目的地时加分
    pub consolidate_bonus: i64,
    /// 库位无任何目的地时加分
    pub clean_slot_bonus: i64,
    /// 高占用率阈值（当前占用/上限）
    pub high_utilization_threshold: f64,
    /// 超过阈值时扣分
    pub high_utilization_penalty: i64,
    /// 柜号扫描行数
    pub container_scan_rows: usize,
    /// 表头扫描行数
    pub header_scan_rows: usize,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            consolidate_bonus: 1000,
            clean_slot_bonus: 500,
            high_utilization_threshold: 0.8,
            high_utilization_penalty: 200,
            container_scan_rows: 15,
            header_scan_rows: 30,
        }
    }
}

impl AllocationConfig {
    /// 参数合法性校验
    pub fn validate(&self) -> Result<(), String> {
        if !self.high_utilization_threshold.is_finite() || self.high_utilization_threshold < 0.0 {
            return Err(format!(
                "high_utilization_threshold 非法: {}",
                self.high_utilization_threshold
            ));
        }
        if self.consolidate_bonus < 0 || self.clean_slot_bonus < 0 || self.high_utilization_penalty < 0 {
            return Err("评分权重不能为负数".to_string());
        }
        if self.header_scan_rows == 0 {
            return Err("header_scan_rows 必须大于 0".to_string());
        }
        Ok(())
    }
}

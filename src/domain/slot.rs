// ==========================================
// 仓库库位分配系统 - 库位领域模型
// ==========================================
// 红线: 托盘上限 / 目的地上限两条硬约束
// 用途: 分配引擎与出库扣减共用的库位台账
// ==========================================

use crate::domain::types::SlotCategory;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// Slot - 库位
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    // ===== 主键 =====
    pub id: String, // 库位编码 (如 A01)

    // ===== 分区信息 =====
    pub category: SlotCategory, // 库位类型
    #[serde(default)]
    pub note: String, // 分区备注 (种子数据带入)

    // ===== 托盘约束 =====
    #[serde(default)]
    pub pallet_capacity: Option<u32>, // 托盘上限 (None = 不限)
    #[serde(default)]
    pub pallet_occupancy: u32, // 当前托盘数

    // ===== 目的地约束 =====
    #[serde(default)]
    pub destination_tags: Vec<String>, // 当前目的地 (保持插入顺序)
    #[serde(default)]
    pub max_destination_tags: Option<u32>, // 目的地上限 (None = 按类型默认)
}

impl Slot {
    /// 创建空库位（无上限、无目的地）
    pub fn new(id: impl Into<String>, category: SlotCategory) -> Self {
        Self {
            id: id.into(),
            category,
            note: String::new(),
            pallet_capacity: None,
            pallet_occupancy: 0,
            destination_tags: Vec::new(),
            max_destination_tags: None,
        }
    }

    /// 生效的目的地上限（未设置时按库位类型推导）
    pub fn effective_max_destination_tags(&self) -> u32 {
        self.max_destination_tags
            .unwrap_or_else(|| self.category.default_max_destination_tags())
    }

    /// 是否已承载该目的地（精确匹配）
    pub fn has_destination(&self, destination: &str) -> bool {
        self.destination_tags.iter().any(|t| t == destination)
    }

    /// 是否有目的地标签包含该文本（子串匹配，出库扣减使用）
    pub fn has_destination_containing(&self, destination: &str) -> bool {
        self.destination_tags.iter().any(|t| t.contains(destination))
    }

    /// 追加目的地（已存在则忽略）
    ///
    /// # 返回
    /// - true: 新增
    /// - false: 已存在
    pub fn add_destination(&mut self, destination: &str) -> bool {
        if self.has_destination(destination) {
            return false;
        }
        self.destination_tags.push(destination.to_string());
        true
    }

    /// 目的地数量是否已达上限
    pub fn is_destination_full(&self) -> bool {
        self.destination_tags.len() as u64 >= self.effective_max_destination_tags() as u64
    }

    /// 目的地数量是否已超上限（导入数据可能自带违规）
    pub fn is_over_destination_limit(&self) -> bool {
        self.destination_tags.len() as u64 > self.effective_max_destination_tags() as u64
    }
}

// ==========================================
// SlotField - 库位可维护字段
// ==========================================
// 用途: 台账维护时按字段修改单个库位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotField {
    Category,
    Note,
    Capacity,
    Occupancy,
    Destinations,
    MaxDestinations,
}

impl SlotField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotField::Category => "category",
            SlotField::Note => "note",
            SlotField::Capacity => "capacity",
            SlotField::Occupancy => "occupancy",
            SlotField::Destinations => "destinations",
            SlotField::MaxDestinations => "max_destinations",
        }
    }

    /// 字段当前值的文本形式（未设置记为 "-"）
    pub fn read(&self, slot: &Slot) -> String {
        fn opt(v: Option<u32>) -> String {
            v.map_or_else(|| "-".to_string(), |n| n.to_string())
        }
        match self {
            SlotField::Category => slot.category.to_string(),
            SlotField::Note => slot.note.clone(),
            SlotField::Capacity => opt(slot.pallet_capacity),
            SlotField::Occupancy => slot.pallet_occupancy.to_string(),
            SlotField::Destinations => slot.destination_tags.join(","),
            SlotField::MaxDestinations => opt(slot.max_destination_tags),
        }
    }

    /// 按文本写入字段
    ///
    /// 上限类字段传空或 "-" 表示不限; 目的地按中英文逗号拆分, 去空去重
    pub fn write(&self, slot: &mut Slot, value: &str) -> Result<(), String> {
        let raw = value.trim();
        let optional_limit = |raw: &str| -> Result<Option<u32>, String> {
            if raw.is_empty() || raw == "-" {
                return Ok(None);
            }
            raw.parse::<u32>()
                .map(Some)
                .map_err(|_| format!("{} 需为非负整数: {}", self.as_str(), raw))
        };

        match self {
            SlotField::Category => slot.category = raw.parse::<SlotCategory>()?,
            SlotField::Note => slot.note = raw.to_string(),
            SlotField::Capacity => slot.pallet_capacity = optional_limit(raw)?,
            SlotField::Occupancy => {
                slot.pallet_occupancy = raw
                    .parse::<u32>()
                    .map_err(|_| format!("occupancy 需为非负整数: {}", raw))?
            }
            SlotField::Destinations => {
                slot.destination_tags.clear();
                for tag in raw.split([',', '，']).map(str::trim).filter(|t| !t.is_empty()) {
                    slot.add_destination(tag);
                }
            }
            SlotField::MaxDestinations => slot.max_destination_tags = optional_limit(raw)?,
        }
        Ok(())
    }
}

impl fmt::Display for SlotField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SlotField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "category" => Ok(SlotField::Category),
            "note" => Ok(SlotField::Note),
            "capacity" => Ok(SlotField::Capacity),
            "occupancy" => Ok(SlotField::Occupancy),
            "destinations" => Ok(SlotField::Destinations),
            "max_destinations" => Ok(SlotField::MaxDestinations),
            other => Err(format!("未知库位字段: {}", other)),
        }
    }
}

// ==========================================
// Trait: SlotConstraint
// ==========================================
// 用途: 分配引擎的托盘约束检查接口
pub trait SlotConstraint {
    /// 检查是否可再放入指定托盘数（未设上限恒为 true）
    fn can_add_pallets(&self, pallets: u32) -> bool;

    /// 检查是否超限
    fn is_over_capacity(&self) -> bool;

    /// 剩余托盘位（未设上限返回 None）
    fn remaining_pallets(&self) -> Option<u32>;

    /// 当前占用率（未设上限或上限为 0 返回 None）
    fn utilization_ratio(&self) -> Option<f64>;
}

impl SlotConstraint for Slot {
    fn can_add_pallets(&self, pallets: u32) -> bool {
        match self.pallet_capacity {
            Some(capacity) => self.pallet_occupancy as u64 + pallets as u64 <= capacity as u64,
            None => true,
        }
    }

    fn is_over_capacity(&self) -> bool {
        matches!(self.pallet_capacity, Some(capacity) if self.pallet_occupancy > capacity)
    }

    fn remaining_pallets(&self) -> Option<u32> {
        self.pallet_capacity
            .map(|capacity| capacity.saturating_sub(self.pallet_occupancy))
    }

    fn utilization_ratio(&self) -> Option<f64> {
        match self.pallet_capacity {
            Some(capacity) if capacity > 0 => {
                Some(self.pallet_occupancy as f64 / capacity as f64)
            }
            _ => None,
        }
    }
}

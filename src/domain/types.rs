// ==========================================
// 仓库库位分配系统 - 领域类型定义
// ==========================================
// 职责: 库位类型 / 目的地类别两套封闭枚举
// 红线: 目的地类别只用于判定库位可放性,不落库
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 库位类型 (Slot Category)
// ==========================================
// 序列化格式: 小写编码 (与种子数据/数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotCategory {
    Amz2,      // 亚马逊主区 (最多2个目的地)
    AmzFlex,   // 亚马逊弹性区
    Sehin,     // 希音专属区
    Private,   // 私人/住宅地址
    Mixed,     // 平台/私人混放
    Express,   // FedEx/UPS 快递区
    Buffer,    // 缓冲/偏仓
    HighValue, // 贵品区
    Other,     // 其他/暂存
}

impl SlotCategory {
    /// 全部库位类型（按展示顺序）
    pub const ALL: [SlotCategory; 9] = [
        SlotCategory::Amz2,
        SlotCategory::AmzFlex,
        SlotCategory::Sehin,
        SlotCategory::Private,
        SlotCategory::Mixed,
        SlotCategory::Express,
        SlotCategory::Buffer,
        SlotCategory::HighValue,
        SlotCategory::Other,
    ];

    /// 编码（小写，与序列化一致）
    pub fn code(&self) -> &'static str {
        match self {
            SlotCategory::Amz2 => "amz2",
            SlotCategory::AmzFlex => "amzflex",
            SlotCategory::Sehin => "sehin",
            SlotCategory::Private => "private",
            SlotCategory::Mixed => "mixed",
            SlotCategory::Express => "express",
            SlotCategory::Buffer => "buffer",
            SlotCategory::HighValue => "highvalue",
            SlotCategory::Other => "other",
        }
    }

    /// 未设置目的地上限时的默认值
    ///
    /// # 规则
    /// - mixed / private / other → 3
    /// - 其余 → 2
    pub fn default_max_destination_tags(&self) -> u32 {
        match self {
            SlotCategory::Mixed | SlotCategory::Private | SlotCategory::Other => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for SlotCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        SlotCategory::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| format!("未知库位类型: {}", s))
    }
}

// ==========================================
// 目的地类别 (Destination Category)
// ==========================================
// 由 DestinationClassifier 输出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationCategory {
    Amz,      // 亚马逊仓
    Sehin,    // 希音仓
    Platform, // 平台/货代/暂扣中转
    Private,  // 私人/住宅
    Other,    // 未识别
}

impl DestinationCategory {
    /// 可放置该类别货物的库位类型
    ///
    /// # 兼容表
    /// - amz      → {amz2, amzflex, buffer}
    /// - sehin    → {sehin}
    /// - platform → {mixed, buffer, other}
    /// - private  → {private, mixed}
    /// - other    → {mixed, buffer, other}
    pub fn compatible_slot_categories(&self) -> &'static [SlotCategory] {
        match self {
            DestinationCategory::Amz => {
                &[SlotCategory::Amz2, SlotCategory::AmzFlex, SlotCategory::Buffer]
            }
            DestinationCategory::Sehin => &[SlotCategory::Sehin],
            DestinationCategory::Platform | DestinationCategory::Other => {
                &[SlotCategory::Mixed, SlotCategory::Buffer, SlotCategory::Other]
            }
            DestinationCategory::Private => &[SlotCategory::Private, SlotCategory::Mixed],
        }
    }

    /// 库位类型是否可接收该类别
    pub fn accepts(&self, slot_category: SlotCategory) -> bool {
        self.compatible_slot_categories().contains(&slot_category)
    }
}

impl fmt::Display for DestinationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationCategory::Amz => write!(f, "amz"),
            DestinationCategory::Sehin => write!(f, "sehin"),
            DestinationCategory::Platform => write!(f, "platform"),
            DestinationCategory::Private => write!(f, "private"),
            DestinationCategory::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_category_round_trip_codes() {
        for category in SlotCategory::ALL {
            assert_eq!(category.code().parse::<SlotCategory>().unwrap(), category);
        }
        assert_eq!(" AmzFlex ".parse::<SlotCategory>().unwrap(), SlotCategory::AmzFlex);
        assert!("warehouse".parse::<SlotCategory>().is_err());
    }

    #[test]
    fn test_default_max_destination_tags() {
        assert_eq!(SlotCategory::Mixed.default_max_destination_tags(), 3);
        assert_eq!(SlotCategory::Private.default_max_destination_tags(), 3);
        assert_eq!(SlotCategory::Other.default_max_destination_tags(), 3);
        assert_eq!(SlotCategory::Amz2.default_max_destination_tags(), 2);
        assert_eq!(SlotCategory::HighValue.default_max_destination_tags(), 2);
    }

    #[test]
    fn test_compatibility_table() {
        assert!(DestinationCategory::Amz.accepts(SlotCategory::Buffer));
        assert!(!DestinationCategory::Amz.accepts(SlotCategory::Mixed));
        assert!(DestinationCategory::Sehin.accepts(SlotCategory::Sehin));
        assert!(!DestinationCategory::Sehin.accepts(SlotCategory::Buffer));
        assert!(DestinationCategory::Private.accepts(SlotCategory::Mixed));
        assert!(!DestinationCategory::Private.accepts(SlotCategory::Other));
        assert!(DestinationCategory::Other.accepts(SlotCategory::Other));
        // 快递区/贵品区不接收任何自动分配
        for dest in [
            DestinationCategory::Amz,
            DestinationCategory::Sehin,
            DestinationCategory::Platform,
            DestinationCategory::Private,
            DestinationCategory::Other,
        ] {
            assert!(!dest.accepts(SlotCategory::Express));
            assert!(!dest.accepts(SlotCategory::HighValue));
        }
    }

    #[test]
    fn test_serde_codes() {
        let json = serde_json::to_string(&SlotCategory::HighValue).unwrap();
        assert_eq!(json, "\"highvalue\"");
        let back: DestinationCategory = serde_json::from_str("\"platform\"").unwrap();
        assert_eq!(back, DestinationCategory::Platform);
    }
}

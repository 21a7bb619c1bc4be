// ==========================================
// 仓库库位分配系统 - 目的地分类器
// ==========================================
// 职责: 派送地址原文 → 目的地类别
// 红线: 纯函数、无状态、大小写不敏感、全函数 (兜底 other)
// ==========================================
// 规则表按顺序求值, 首个命中即返回:
// 1. 含 "amazon"                  → amz
// 2. 三字母 + 一位数字 (如 ABC1)  → amz (亚马逊仓代码缩写)
// 3. 含希音关键词                 → sehin
// 4. 含住宅/私人关键词            → private
// 5. 含平台/货代/暂扣中转关键词   → platform
// 6. 其他                         → other
// ==========================================

use crate::domain::types::DestinationCategory;

// ==========================================
// RulePredicate - 规则谓词
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulePredicate {
    /// 小写文本包含任一关键词
    ContainsAny(&'static [&'static str]),
    /// 恰为三个字母 + 一位数字 (亚马逊仓代码)
    FacilityCode,
}

impl RulePredicate {
    /// # 参数
    /// - trimmed: 去空白后的原文
    /// - lower: 去空白后的小写文本
    pub fn matches(&self, trimmed: &str, lower: &str) -> bool {
        match self {
            RulePredicate::ContainsAny(tokens) => tokens.iter().any(|t| lower.contains(t)),
            RulePredicate::FacilityCode => is_facility_code(trimmed),
        }
    }
}

fn is_facility_code(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars.len() == 4
        && chars[..3].iter().all(|c| c.is_ascii_alphabetic())
        && chars[3].is_ascii_digit()
}

// ==========================================
// ClassificationRule - (谓词, 结果) 对
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub predicate: RulePredicate,
    pub category: DestinationCategory,
}

pub const AMAZON_TOKENS: &[&str] = &["amazon"];
pub const SHEIN_TOKENS: &[&str] = &["希音", "shein"];
pub const PRIVATE_TOKENS: &[&str] = &["住宅", "私人", "residential", "private"];
pub const PLATFORM_TOKENS: &[&str] = &[
    "walmart", "wayfair", "tiktok", "4px", "西邮", "fbx", "平台", "暂扣", "中转", "platform",
    "hold", "transit",
];

/// 默认规则表（顺序即优先级）
pub const DEFAULT_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "AMAZON_KEYWORD",
        predicate: RulePredicate::ContainsAny(AMAZON_TOKENS),
        category: DestinationCategory::Amz,
    },
    ClassificationRule {
        name: "AMAZON_FACILITY_CODE",
        predicate: RulePredicate::FacilityCode,
        category: DestinationCategory::Amz,
    },
    ClassificationRule {
        name: "SHEIN_KEYWORD",
        predicate: RulePredicate::ContainsAny(SHEIN_TOKENS),
        category: DestinationCategory::Sehin,
    },
    ClassificationRule {
        name: "PRIVATE_KEYWORD",
        predicate: RulePredicate::ContainsAny(PRIVATE_TOKENS),
        category: DestinationCategory::Private,
    },
    ClassificationRule {
        name: "PLATFORM_KEYWORD",
        predicate: RulePredicate::ContainsAny(PLATFORM_TOKENS),
        category: DestinationCategory::Platform,
    },
];

// ==========================================
// DestinationClassifier
// ==========================================
#[derive(Debug, Clone)]
pub struct DestinationClassifier {
    rules: Vec<ClassificationRule>,
}

impl DestinationClassifier {
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }

    /// 分类
    pub fn classify(&self, destination: &str) -> DestinationCategory {
        self.matching_rule(destination)
            .map(|rule| rule.category)
            .unwrap_or(DestinationCategory::Other)
    }

    /// 返回命中的规则（用于解释分配原因）
    pub fn matching_rule(&self, destination: &str) -> Option<&ClassificationRule> {
        let trimmed = destination.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lower = trimmed.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(trimmed, &lower))
    }
}

impl Default for DestinationClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用默认规则表分类
pub fn classify(destination: &str) -> DestinationCategory {
    DestinationClassifier::new().classify(destination)
}

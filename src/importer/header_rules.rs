// ==========================================
// 仓库库位分配系统 - 表头识别规则表
// ==========================================
// 职责: 用 (匹配方式, 关键词) 列表描述各类表头/标记单元格
// 红线: 规则即数据, 控制流不内嵌关键词
// ==========================================

/// 单元格文本匹配方式（输入已去空白）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenMatch {
    /// 包含（区分大小写, 中文关键词用）
    Contains(&'static str),
    /// 包含（忽略大小写, 关键词需为小写）
    ContainsIgnoreCase(&'static str),
    /// 完全相等（区分大小写）
    Exact(&'static str),
    /// 完全相等（忽略大小写, 关键词需为小写）
    ExactIgnoreCase(&'static str),
}

impl TokenMatch {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            TokenMatch::Contains(token) => text.contains(token),
            TokenMatch::ContainsIgnoreCase(token) => text.to_lowercase().contains(token),
            TokenMatch::Exact(token) => text == *token,
            TokenMatch::ExactIgnoreCase(token) => text.to_lowercase() == *token,
        }
    }
}

/// 一类表头的识别规则（任一匹配即命中）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRule {
    pub name: &'static str,
    pub matchers: &'static [TokenMatch],
}

impl HeaderRule {
    pub fn matches(&self, cell_text: &str) -> bool {
        let text = cell_text.trim();
        !text.is_empty() && self.matchers.iter().any(|m| m.matches(text))
    }

    /// 最左侧命中列
    pub fn find_column(&self, headers: &[String]) -> Option<usize> {
        headers.iter().position(|h| self.matches(h))
    }
}

/// 按规则优先级列出命中列（每条规则取最左侧命中, 无命中的规则跳过）
pub fn find_columns_by_priority(rules: &[HeaderRule], headers: &[String]) -> Vec<usize> {
    rules.iter().filter_map(|rule| rule.find_column(headers)).collect()
}

// ==========================================
// 卸柜单
// ==========================================

/// 柜号标记（柜号 / container / cntr）
pub const CONTAINER_MARKER: HeaderRule = HeaderRule {
    name: "CONTAINER_MARKER",
    matchers: &[
        TokenMatch::Contains("柜号"),
        TokenMatch::ContainsIgnoreCase("container"),
        TokenMatch::ContainsIgnoreCase("cntr"),
    ],
};

/// 表头行判定: 含 "SO" 单元格 (区分大小写) 或含派送地址/目的地
pub const UNLOAD_HEADER_ROW: HeaderRule = HeaderRule {
    name: "UNLOAD_HEADER_ROW",
    matchers: &[
        TokenMatch::Exact("SO"),
        TokenMatch::Contains("派送地址"),
        TokenMatch::Contains("目的地"),
        TokenMatch::ContainsIgnoreCase("delivery address"),
        TokenMatch::ContainsIgnoreCase("destination"),
    ],
};

/// 目的地列
pub const UNLOAD_DESTINATION_COLUMN: HeaderRule = HeaderRule {
    name: "UNLOAD_DESTINATION_COLUMN",
    matchers: &[
        TokenMatch::Contains("派送地址"),
        TokenMatch::Contains("目的地"),
        TokenMatch::ContainsIgnoreCase("delivery address"),
        TokenMatch::ContainsIgnoreCase("destination"),
        TokenMatch::ExactIgnoreCase("dest"),
    ],
};

/// 托盘数列
pub const UNLOAD_PALLET_COLUMN: HeaderRule = HeaderRule {
    name: "UNLOAD_PALLET_COLUMN",
    matchers: &[
        TokenMatch::Contains("PB数量"),
        TokenMatch::Contains("PB数"),
        TokenMatch::Contains("板数"),
        TokenMatch::Contains("托盘"),
        TokenMatch::ContainsIgnoreCase("pallet"),
    ],
};

/// 建议库位列（回写用）
pub const SUGGESTED_LOCATION_COLUMN: HeaderRule = HeaderRule {
    name: "SUGGESTED_LOCATION_COLUMN",
    matchers: &[
        TokenMatch::Contains("建议库位"),
        TokenMatch::ContainsIgnoreCase("suggested location"),
    ],
};

/// 新增建议库位列时使用的表头
pub const SUGGESTED_LOCATION_HEADER: &str = "建议库位";

// ==========================================
// 出库单
// ==========================================

pub const OUTBOUND_DESTINATION_COLUMN: HeaderRule = HeaderRule {
    name: "OUTBOUND_DESTINATION_COLUMN",
    matchers: &[
        TokenMatch::Contains("目的地"),
        TokenMatch::ContainsIgnoreCase("destination"),
        TokenMatch::ExactIgnoreCase("dest"),
    ],
};

pub const OUTBOUND_PALLET_COLUMN: HeaderRule = HeaderRule {
    name: "OUTBOUND_PALLET_COLUMN",
    matchers: &[
        TokenMatch::Contains("托盘"),
        TokenMatch::Contains("板数"),
        TokenMatch::ContainsIgnoreCase("pallet"),
    ],
};

// ==========================================
// 盘点单
// ==========================================

pub const INVENTORY_LOCATION_COLUMN: HeaderRule = HeaderRule {
    name: "INVENTORY_LOCATION_COLUMN",
    matchers: &[TokenMatch::Exact("Location"), TokenMatch::Exact("库位")],
};

/// 盘点数量列（按优先级: Pallets > 托盘 > Quantity > 数量）
pub const INVENTORY_QUANTITY_COLUMNS: &[HeaderRule] = &[
    HeaderRule { name: "INVENTORY_PALLETS", matchers: &[TokenMatch::Exact("Pallets")] },
    HeaderRule { name: "INVENTORY_TUOPAN", matchers: &[TokenMatch::Exact("托盘")] },
    HeaderRule { name: "INVENTORY_QUANTITY", matchers: &[TokenMatch::Exact("Quantity")] },
    HeaderRule { name: "INVENTORY_SHULIANG", matchers: &[TokenMatch::Exact("数量")] },
];

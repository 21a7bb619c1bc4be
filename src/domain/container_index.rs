// ==========================================
// 仓库库位分配系统 - 目的地→柜号索引
// ==========================================
// 用途: 追溯某目的地历史来自哪些柜
// 红线: 只增不减; 不参与分配决策
// ==========================================

use crate::domain::shipment::ShipmentLine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 一次导入观察到的 (目的地, 柜号) 对
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerIndexEntry {
    pub destination: String,
    pub container_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DestinationContainerIndex {
    entries: BTreeMap<String, Vec<String>>,
}

impl DestinationContainerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从本次导入的货物行提出待合并条目（去重, 保持首次出现顺序）
    pub fn propose(lines: &[ShipmentLine]) -> Vec<ContainerIndexEntry> {
        let mut proposal: Vec<ContainerIndexEntry> = Vec::new();
        for line in lines {
            let Some(container_id) = line.container_id.as_deref() else {
                continue;
            };
            if line.destination.is_empty() || container_id.is_empty() {
                continue;
            }
            let exists = proposal
                .iter()
                .any(|e| e.destination == line.destination && e.container_id == container_id);
            if !exists {
                proposal.push(ContainerIndexEntry {
                    destination: line.destination.clone(),
                    container_id: container_id.to_string(),
                });
            }
        }
        proposal
    }

    /// 记录单条关联
    ///
    /// # 返回
    /// - true: 新增
    /// - false: 已存在
    pub fn record(&mut self, destination: &str, container_id: &str) -> bool {
        let containers = self.entries.entry(destination.to_string()).or_default();
        if containers.iter().any(|c| c == container_id) {
            return false;
        }
        containers.push(container_id.to_string());
        true
    }

    /// 合并提案，返回新增条数
    pub fn merge(&mut self, proposal: &[ContainerIndexEntry]) -> usize {
        proposal
            .iter()
            .filter(|e| self.record(&e.destination, &e.container_id))
            .count()
    }

    pub fn containers_for(&self, destination: &str) -> &[String] {
        self.entries
            .get(destination)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

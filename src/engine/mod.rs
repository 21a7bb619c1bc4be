// ==========================================
// 仓库库位分配系统 - 引擎层
// ==========================================
// 职责: 纯内存、同步的业务规则引擎
// 红线: Engine 不读写数据库, 不做文件 I/O; 未分配/未扣足必须输出 reason
// ==========================================

pub mod destination_classifier;
pub mod inventory_applier;
pub mod ledger_stats;
pub mod outbound_reconciler;
pub mod plan_annotator;
pub mod slot_allocator;

// 重导出核心引擎
pub use destination_classifier::{classify, ClassificationRule, DestinationClassifier, RulePredicate};
pub use inventory_applier::{InventoryApplier, InventoryApplyReport};
pub use ledger_stats::{DestinationCount, GroupStats, LedgerStats, LedgerStatsEngine, LoadLevel};
pub use outbound_reconciler::{Deduction, OutboundReconciler, ReconcileReport, Shortfall};
pub use plan_annotator::PlanAnnotator;
pub use slot_allocator::{AllocationResult, CandidateRejection, SkippedLine, SlotAllocator};

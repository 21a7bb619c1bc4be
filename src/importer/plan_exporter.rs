// ==========================================
// 仓库库位分配系统 - 卸柜计划导出
// ==========================================
// 职责: AnnotatedPlan → CSV 文件 (保留原表全部行列)
// ==========================================

use crate::domain::shipment::AnnotatedPlan;
use crate::importer::error::{ImportError, ImportResult};
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;

pub struct PlanExporter;

impl PlanExporter {
    /// 写入 CSV 文件, 返回写出的行数
    pub fn write_csv(&self, plan: &AnnotatedPlan, path: &Path) -> ImportResult<usize> {
        let file = std::fs::File::create(path)?;
        let rows = self.write_to(plan, file)?;
        tracing::info!("卸柜计划已导出: {} ({}行)", path.display(), rows);
        Ok(rows)
    }

    pub fn write_to<W: Write>(&self, plan: &AnnotatedPlan, writer: W) -> ImportResult<usize> {
        let mut csv_writer = WriterBuilder::new().flexible(true).from_writer(writer);

        let mut count = 0;
        for row in plan.matrix.rows() {
            let record: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            csv_writer
                .write_record(&record)
                .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;
            count += 1;
        }
        csv_writer
            .flush()
            .map_err(|e| ImportError::CsvWriteError(e.to_string()))?;
        Ok(count)
    }
}

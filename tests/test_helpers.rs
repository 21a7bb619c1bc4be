// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、库位/表格测试数据生成等功能
// ==========================================
#![allow(dead_code)]

use std::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;
use warehouse_slotting::domain::slot::Slot;
use warehouse_slotting::domain::types::SlotCategory;
use warehouse_slotting::WarehouseApi;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = warehouse_slotting::db::open_sqlite_connection(&db_path)?;
    warehouse_slotting::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 创建基于临时数据库的 WarehouseApi
pub fn create_test_api() -> (NamedTempFile, WarehouseApi) {
    warehouse_slotting::logging::init_test();
    let (temp_file, db_path) = create_test_db().expect("create test db");
    let api = WarehouseApi::open(&db_path).expect("open api");
    (temp_file, api)
}

/// 构造库位
pub fn slot(
    id: &str,
    category: SlotCategory,
    capacity: Option<u32>,
    occupancy: u32,
    tags: &[&str],
) -> Slot {
    let mut s = Slot::new(id, category);
    s.pallet_capacity = capacity;
    s.pallet_occupancy = occupancy;
    s.destination_tags = tags.iter().map(|t| t.to_string()).collect();
    s
}

/// 一份覆盖各类库位的小台账
pub fn sample_ledger() -> Vec<Slot> {
    vec![
        slot("A01", SlotCategory::Amz2, Some(4), 0, &[]),
        slot("A02", SlotCategory::AmzFlex, Some(10), 0, &[]),
        slot("C01", SlotCategory::Sehin, Some(6), 0, &[]),
        slot("P01", SlotCategory::Private, Some(3), 0, &[]),
        slot("M01", SlotCategory::Mixed, Some(8), 0, &[]),
        slot("M02", SlotCategory::Mixed, None, 0, &[]),
        slot("B01", SlotCategory::Buffer, Some(20), 0, &[]),
        slot("X01", SlotCategory::Express, Some(5), 0, &[]),
    ]
}

/// 写入临时 CSV 文件
pub fn write_csv(rows: &[&[&str]]) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".csv")
        .tempfile()
        .expect("create temp csv");
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row.iter()).expect("write record");
    }
    let bytes = writer.into_inner().expect("flush csv");
    file.write_all(&bytes).expect("write csv");
    file.flush().expect("flush file");
    file
}

// ==========================================
// 仓库库位分配系统 - 命令行入口
// ==========================================
// 输出: 命令结果以 JSON 打印到 stdout, 日志写 stderr
// ==========================================

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use warehouse_slotting::db::get_default_db_path;
use warehouse_slotting::{logging, ActionType, Slot, SlotCategory, SlotField, WarehouseApi};

#[derive(Parser, Debug)]
#[command(name = "warehouse-slotting", version, about = "仓库库位分配系统")]
struct Args {
    /// SQLite 数据库路径（默认: WAREHOUSE_SLOTTING_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 操作人（写入操作日志）
    #[arg(long, global = true, default_value = "system")]
    actor: String,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// 以 JSON 种子文件替换库位台账
    Seed { file: PathBuf },
    /// 导入卸柜单并自动分配库位
    Unload {
        sheet: PathBuf,
        /// 导出带建议库位的计划 (CSV)
        #[arg(long)]
        plan_out: Option<PathBuf>,
    },
    /// 导入出库单并扣减托盘
    Outbound { sheet: PathBuf },
    /// 导入盘点单并覆盖托盘数
    Inventory { sheet: PathBuf },
    /// 列出库位台账
    Slots,
    /// 台账统计
    Stats,
    /// 目的地→柜号索引
    Containers,
    /// 库位维护
    Slot {
        #[command(subcommand)]
        cmd: SlotCmd,
    },
    /// 记录现场异常
    Exception { note: String },
    /// 最近操作日志
    Logs {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// 只看某类操作 (如 UNLOAD_IMPORT / SLOT_UPDATE)
        #[arg(long = "type")]
        action_type: Option<String>,
    },
    /// 按 action_id 查看单条日志
    Log { action_id: String },
    /// 分配参数
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand, Debug)]
enum SlotCmd {
    /// 新增库位, 已存在则整体覆盖
    Upsert {
        id: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        capacity: Option<u32>,
        #[arg(long, default_value_t = 0)]
        occupancy: u32,
        /// 目的地, 逗号分隔
        #[arg(long, default_value = "")]
        destinations: String,
        #[arg(long)]
        max_destinations: Option<u32>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// 修改单个字段 (category/note/capacity/occupancy/destinations/max_destinations)
    Update { id: String, field: String, value: String },
    /// 删除库位
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ConfigCmd {
    /// 显示当前生效参数
    Show,
    /// 覆写参数 (config_kv)
    Set { key: String, value: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    let db_path = args.db.clone().unwrap_or_else(get_default_db_path);
    tracing::info!("{} v{} 使用数据库: {}", warehouse_slotting::APP_NAME, warehouse_slotting::VERSION, db_path);

    let api = WarehouseApi::open(&db_path).context("open database")?;
    let actor = args.actor.as_str();

    match args.cmd {
        Cmd::Seed { file } => {
            let slots = WarehouseApi::load_seed_file(&file)?;
            let count = api.seed_slots(&slots, actor)?;
            print_json(&serde_json::json!({ "seeded": count }))?;
        }
        Cmd::Unload { sheet, plan_out } => {
            let resp = api.import_unload_file(&sheet, actor)?;
            if let Some(out) = plan_out {
                api.export_plan_csv(&resp.plan, &out, actor)
                    .with_context(|| format!("export plan to {}", out.display()))?;
            }
            print_json(&resp)?;
        }
        Cmd::Outbound { sheet } => print_json(&api.import_outbound_file(&sheet, actor)?)?,
        Cmd::Inventory { sheet } => print_json(&api.import_inventory_file(&sheet, actor)?)?,
        Cmd::Slots => print_json(&api.list_slots()?)?,
        Cmd::Stats => print_json(&api.ledger_stats()?)?,
        Cmd::Containers => print_json(&api.destination_containers()?)?,
        Cmd::Slot { cmd } => match cmd {
            SlotCmd::Upsert {
                id,
                category,
                capacity,
                occupancy,
                destinations,
                max_destinations,
                note,
            } => {
                let category = category.parse::<SlotCategory>().map_err(anyhow::Error::msg)?;
                let mut slot = Slot::new(id, category);
                slot.pallet_capacity = capacity;
                slot.pallet_occupancy = occupancy;
                slot.max_destination_tags = max_destinations;
                slot.note = note;
                SlotField::Destinations
                    .write(&mut slot, &destinations)
                    .map_err(anyhow::Error::msg)?;
                let added = api.upsert_slot(&slot, actor)?;
                print_json(&serde_json::json!({ "added": added, "slot": slot }))?;
            }
            SlotCmd::Update { id, field, value } => {
                let field = field.parse::<SlotField>().map_err(anyhow::Error::msg)?;
                print_json(&api.update_slot(&id, field, &value, actor)?)?;
            }
            SlotCmd::Delete { id } => {
                api.delete_slot(&id, actor)?;
                print_json(&serde_json::json!({ "deleted": id }))?;
            }
        },
        Cmd::Exception { note } => {
            let action_id = api.log_exception(&note, actor)?;
            print_json(&serde_json::json!({ "action_id": action_id }))?;
        }
        Cmd::Logs { limit, action_type } => match action_type {
            Some(raw) => {
                let action_type = raw
                    .trim()
                    .to_uppercase()
                    .parse::<ActionType>()
                    .map_err(anyhow::Error::msg)?;
                print_json(&api.logs_by_type(action_type, limit)?)?
            }
            None => print_json(&api.recent_logs(limit)?)?,
        },
        Cmd::Log { action_id } => print_json(&api.find_log(&action_id)?)?,
        Cmd::Config { cmd } => match cmd {
            ConfigCmd::Show => print_json(&serde_json::json!({
                "effective": api.allocation_config(),
                "overrides": api.config_overrides()?,
            }))?,
            ConfigCmd::Set { key, value } => print_json(&api.set_config(&key, &value, actor)?)?,
        },
    }

    Ok(())
}

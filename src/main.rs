// ==========================================
// 波次分配系统 - 命令行入口
// ==========================================
// 用法:
//   batch-opt --input packages.xlsx [--config batch.json]
//             [--output Solution.csv] [--summary run.json]
//             [--lp-dir models/] [--verbose] [--log-json]
// ==========================================

use anyhow::Context;
use batch_opt::config::ConfigManager;
use batch_opt::engine::BatchOptPipeline;
use batch_opt::export::{write_solution_csv, ResultProjector, RunSummary};
use batch_opt::importer::PackageRecordImporter;
use batch_opt::solver::MicroLpSolver;
use batch_opt::{logging, APP_NAME, VERSION};
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "batch-opt")]
#[command(author, version, about = "仓库包裹波次分配 - 两阶段整数规划")]
struct Cli {
    /// 包裹明细文件（.xlsx / .xls / .csv）
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// 求解参数 JSON（缺省使用内置默认值）
    #[arg(short, long, value_name = "FILE", env = "BATCH_OPT_CONFIG")]
    config: Option<PathBuf>,

    /// 结果表输出路径
    #[arg(short, long, default_value = "Solution.csv")]
    output: PathBuf,

    /// 运行摘要 JSON 输出路径
    #[arg(long)]
    summary: Option<PathBuf>,

    /// 把两阶段模型写成 LP 文件的目录
    #[arg(long, value_name = "DIR")]
    lp_dir: Option<PathBuf>,

    /// 输出 debug 级别日志
    #[arg(short, long)]
    verbose: bool,

    /// 日志使用 JSON 格式
    #[arg(long)]
    log_json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json(cli.verbose);
    } else {
        logging::init_with_verbosity(cli.verbose);
    }

    tracing::info!("==================================================");
    tracing::info!("{} 版本: {}", APP_NAME, VERSION);
    tracing::info!("==================================================");

    let started_at = Utc::now();
    let config = ConfigManager::load(cli.config.as_deref()).context("加载求解参数失败")?;

    let records = PackageRecordImporter::new()
        .import_file(&cli.input)
        .with_context(|| format!("导入包裹明细失败: {}", cli.input.display()))?;

    let mut pipeline = BatchOptPipeline::new(config.clone(), MicroLpSolver::new());
    if let Some(dir) = &cli.lp_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("创建模型目录失败: {}", dir.display()))?;
        pipeline = pipeline.with_lp_dir(dir);
    }

    let output = pipeline.run(&records).context("波次分配失败")?;

    let rows = ResultProjector::project(&output.catalog, &output.stage2);
    write_solution_csv(&rows, &cli.output)
        .with_context(|| format!("写出结果表失败: {}", cli.output.display()))?;

    if let Some(path) = &cli.summary {
        RunSummary::from_output(started_at, Some(&cli.input), &config, &output, rows.len())
            .write_json(path)
            .with_context(|| format!("写出运行摘要失败: {}", path.display()))?;
    }

    tracing::info!(
        batches_used = output.stage1.used_count(),
        rows = rows.len(),
        output = %cli.output.display(),
        "完成"
    );
    Ok(())
}

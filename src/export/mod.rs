// ==========================================
// 波次分配系统 - 导出层
// ==========================================
// 职责: 阶段二结果 → 报表行 → CSV / 运行摘要 JSON
// 红线: 纯投影,不含任何决策逻辑
// ==========================================

pub mod csv_exporter;
pub mod result_projector;
pub mod run_summary;

use std::path::PathBuf;
use thiserror::Error;

pub use csv_exporter::{write_solution_csv, write_solution_to};
pub use result_projector::{ResultProjector, SolutionRow};
pub use run_summary::{RunSummary, StageSummary};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV 写出失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("文件写出失败 '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON 序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

// ==========================================
// 波次分配系统 - 运行摘要
// ==========================================
// 用途: 每次运行留档（运行 ID / 时间 / 配置 / 目录统计 / 两阶段状态）
// ==========================================

use crate::config::BatchOptConfig;
use crate::domain::CatalogSummary;
use crate::engine::PipelineOutput;
use crate::export::{ExportError, ExportResult};
use crate::solver::SolveStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct StageSummary {
    pub status: SolveStatus,
    pub objective_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: i64,
    pub input_file: Option<String>,
    pub config: BatchOptConfig,
    pub catalog: CatalogSummary,
    pub batches_used: usize,
    pub stage1: StageSummary,
    pub stage2: StageSummary,
    pub solution_rows: usize,
}

impl RunSummary {
    pub fn from_output(
        started_at: DateTime<Utc>,
        input_file: Option<&Path>,
        config: &BatchOptConfig,
        output: &PipelineOutput,
        solution_rows: usize,
    ) -> Self {
        let finished_at = Utc::now();
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at,
            finished_at,
            elapsed_ms: (finished_at - started_at).num_milliseconds(),
            input_file: input_file.map(|p| p.display().to_string()),
            config: config.clone(),
            catalog: output.catalog.summary(),
            batches_used: output.stage1.used_count(),
            stage1: StageSummary {
                status: output.stage1.status(),
                objective_value: output.stage1.objective_value(),
            },
            stage2: StageSummary {
                status: output.stage2.status(),
                objective_value: output.stage2.objective_value(),
            },
            solution_rows,
        }
    }

    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> ExportResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

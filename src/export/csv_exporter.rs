// ==========================================
// 波次分配系统 - 结果表 CSV 写出
// ==========================================
// 列: BatchNo, AreaPattern, Count
// ==========================================

use crate::export::result_projector::SolutionRow;
use crate::export::{ExportError, ExportResult};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn write_solution_csv<P: AsRef<Path>>(rows: &[SolutionRow], path: P) -> ExportResult<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_solution_to(rows, file)?;
    info!(rows = rows.len(), path = %path.display(), "结果表已写出");
    Ok(())
}

/// 写到任意 writer（空结果仍输出表头）
pub fn write_solution_to<W: Write>(rows: &[SolutionRow], writer: W) -> ExportResult<()> {
    let mut wtr = Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record(["BatchNo", "AreaPattern", "Count"])?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows() {
        let rows = vec![SolutionRow {
            batch_no: "波次1".to_string(),
            area_pattern: "(2, 1)".to_string(),
            count: 2,
        }];
        let mut buf = Vec::new();
        write_solution_to(&rows, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "BatchNo,AreaPattern,Count\n波次1,\"(2, 1)\",2\n");
    }

    #[test]
    fn test_empty_rows_still_write_header() {
        let mut buf = Vec::new();
        write_solution_to(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "BatchNo,AreaPattern,Count\n");
    }
}

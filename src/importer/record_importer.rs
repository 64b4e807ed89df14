// ==========================================
// 波次分配系统 - 包裹记录导入器
// ==========================================
// 流程: 文件解析 → 字段映射 → RawPackageRecord 列表
// 红线: 任一行映射失败即整体失败,不返回部分结果
// ==========================================

use crate::domain::RawPackageRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::PackageFieldMapper;
use crate::importer::file_parser::{FileParser, UniversalFileParser};
use std::path::Path;
use tracing::{info, instrument};

pub struct PackageRecordImporter<P = UniversalFileParser>
where
    P: FileParser,
{
    parser: P,
    mapper: PackageFieldMapper,
}

impl PackageRecordImporter<UniversalFileParser> {
    pub fn new() -> Self {
        Self::with_parser(UniversalFileParser)
    }
}

impl Default for PackageRecordImporter<UniversalFileParser> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> PackageRecordImporter<P>
where
    P: FileParser,
{
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            mapper: PackageFieldMapper,
        }
    }

    #[instrument(skip_all, fields(path = %file_path.as_ref().display()))]
    pub fn import_file<Q: AsRef<Path>>(&self, file_path: Q) -> ImportResult<Vec<RawPackageRecord>> {
        let path = file_path.as_ref();
        let rows = self.parser.parse_to_raw_rows(path)?;
        if rows.is_empty() {
            return Err(ImportError::EmptyInput(path.display().to_string()));
        }

        let records = rows
            .iter()
            .map(|row| self.mapper.map_row(row))
            .collect::<ImportResult<Vec<_>>>()?;

        info!(rows = records.len(), "包裹记录导入完成");
        Ok(records)
    }
}

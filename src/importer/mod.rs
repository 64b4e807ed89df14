// ==========================================
// 波次分配系统 - 导入层
// ==========================================
// 职责: 外部文件 → 原始包裹记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod record_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{PackageFieldMapper, FIELD_LOCATION, FIELD_PACKAGE_NO, FIELD_QUANTITY};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use record_importer::PackageRecordImporter;

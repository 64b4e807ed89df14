// ==========================================
// 包裹记录导入集成测试
// ==========================================
// 测试目标: CSV 导入、列别名、行号、错误定位
// ==========================================

use batch_opt::importer::{ImportError, PackageRecordImporter};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_import_standard_csv() {
    let file = csv_file(&[
        "pakage_no,qty,area",
        "P1,2,W1-A1",
        "P1,1,W2-B1",
        "P2,3,W1-A2",
    ]);

    let records = PackageRecordImporter::new().import_file(file.path()).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].package_no, "P1");
    assert_eq!(records[1].location_code, "W2-B1");
    assert_eq!(records[2].quantity, 3);
    assert_eq!(records[2].row_number, 4);
}

#[test]
fn test_import_chinese_headers_and_extra_columns() {
    let file = csv_file(&["包裹号,数量,库区,备注", "P9,4.0,W3-C1,加急"]);

    let records = PackageRecordImporter::new().import_file(file.path()).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].package_no, "P9");
    assert_eq!(records[0].quantity, 4);
    assert_eq!(records[0].location_code, "W3-C1");
}

#[test]
fn test_bad_quantity_reports_row() {
    let file = csv_file(&["pakage_no,qty,area", "P1,2,W1-A1", "P2,abc,W1-A1"]);

    let err = PackageRecordImporter::new().import_file(file.path()).unwrap_err();
    assert!(matches!(
        err,
        ImportError::TypeConversionError { row: 3, ref field, .. } if field == "qty"
    ));
}

#[test]
fn test_header_only_file_is_empty_input() {
    let file = csv_file(&["pakage_no,qty,area"]);

    let err = PackageRecordImporter::new().import_file(file.path()).unwrap_err();
    assert!(matches!(err, ImportError::EmptyInput(_)));
}

#[test]
fn test_missing_file_reported() {
    let err = PackageRecordImporter::new()
        .import_file("/nonexistent/packages.csv")
        .unwrap_err();
    assert!(matches!(err, ImportError::FileNotFound(_)));
}

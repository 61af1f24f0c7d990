// ==========================================
// 小微企业 ERP - 表格交换层（导入 / 导出）
// ==========================================
// 职责: 外部表格 ↔ 库存/台账数据
// 支持: CSV, Excel (.xlsx/.xls，仅导入)
// ==========================================

pub mod error;
pub mod exporter;
pub mod field_mapper;
pub mod file_parser;
pub mod inventory_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use exporter::{CsvExporter, CsvExporterHandle, DataExporter, ExportSummary};
pub use field_mapper::{BomImportRow, FieldMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};
pub use inventory_importer::{InventoryImportSummary, InventoryImporter, InventoryImporterImpl};

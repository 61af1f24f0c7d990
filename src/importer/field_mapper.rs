// ==========================================
// 小微企业 ERP - 字段映射器实现
// ==========================================
// 职责: 表头 → 标准字段映射 + 类型转换
// 宽松策略:
// - 数值列缺失/为空 → 0
// - measurement 非法 → discrete
// - 表头大小写、空格、下划线不敏感（"Min Stock" = "min_stock"）
// ==========================================

use crate::db::{parse_ledger_datetime, DATE_FORMAT};
use crate::domain::product::ProductDraft;
use crate::domain::types::{Measurement, ProductKind};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::NaiveDate;

/// BOM 导入行（按名称引用产品，落库时解析为 id）
#[derive(Debug, Clone, PartialEq)]
pub struct BomImportRow {
    pub row_number: usize,
    pub parent_name: String,
    pub child_name: String,
    pub quantity: f64,
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

pub struct FieldMapper;

impl FieldMapper {
    /// 按别名查找字段（返回非空的 trim 后文本）
    fn get_string(&self, row: &RawRecord, aliases: &[&str]) -> Option<String> {
        for (header, value) in row {
            let normalized = normalize_header(header);
            if aliases.iter().any(|a| *a == normalized) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }

    fn parse_f64(&self, row: &RawRecord, aliases: &[&str], row_number: usize) -> ImportResult<f64> {
        match self.get_string(row, aliases) {
            None => Ok(0.0),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ImportError::FieldMappingError {
                    row: row_number,
                    message: format!("{} 不是有效数字: {}", aliases[0], raw),
                }),
        }
    }

    fn parse_date(
        &self,
        row: &RawRecord,
        aliases: &[&str],
        row_number: usize,
    ) -> ImportResult<Option<NaiveDate>> {
        let Some(raw) = self.get_string(row, aliases) else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .ok()
            .or_else(|| parse_ledger_datetime(&raw).map(|dt| dt.date()))
            .map(Some)
            .ok_or_else(|| ImportError::DateFormatError {
                row: row_number,
                field: aliases[0].to_string(),
                value: raw,
            })
    }

    /// 原始行 → ProductDraft
    pub fn map_to_product(&self, row: &RawRecord, row_number: usize) -> ImportResult<ProductDraft> {
        let name = self
            .get_string(row, &["name", "product", "productname"])
            .ok_or_else(|| ImportError::FieldMappingError {
                row: row_number,
                message: "产品名称为空".to_string(),
            })?;

        let kind_raw = self
            .get_string(row, &["type", "kind", "producttype"])
            .ok_or_else(|| ImportError::FieldMappingError {
                row: row_number,
                message: format!("产品 {} 缺少类别", name),
            })?;
        let kind = kind_raw
            .parse::<ProductKind>()
            .map_err(|message| ImportError::FieldMappingError {
                row: row_number,
                message,
            })?;

        let measurement_raw = self.get_string(row, &["measurement", "stockunittype", "unittype"]);

        let draft = ProductDraft {
            sku: self.get_string(row, &["sku"]),
            name,
            kind,
            stock: self.parse_f64(row, &["stock"], row_number)?,
            min_stock: self.parse_f64(row, &["minstock"], row_number)?,
            unit_cost: self.parse_f64(row, &["unitcost", "cost"], row_number)?,
            additional_cost: self.parse_f64(row, &["additionalcost"], row_number)?,
            measurement: Measurement::parse_lenient(measurement_raw.as_deref()),
            unit_weight: self.parse_f64(row, &["unitweight", "weight"], row_number)?,
            supplier: self.get_string(row, &["supplier"]),
            purchase_date: self.parse_date(row, &["purchasedate"], row_number)?,
            exit_date: self.parse_date(row, &["exitdate"], row_number)?,
        }
        .normalized();

        draft
            .validate()
            .map_err(|message| ImportError::FieldMappingError {
                row: row_number,
                message,
            })?;
        Ok(draft)
    }

    /// 原始行 → BomImportRow（缺少父件/子件名称时返回 None，由调用方计入跳过数）
    pub fn map_to_bom_row(&self, row: &RawRecord, row_number: usize) -> Option<BomImportRow> {
        let parent_name = self.get_string(row, &["parentproduct", "parent"])?;
        let child_name = self.get_string(row, &["childcomponent", "child", "component"])?;
        let quantity = self
            .get_string(row, &["quantity", "qty"])
            .and_then(|q| q.parse::<f64>().ok())
            .unwrap_or(0.0);

        Some(BomImportRow {
            row_number,
            parent_name,
            child_name,
            quantity,
        })
    }
}

// ==========================================
// 小微企业 ERP - 库存批量导入（整体替换）
// ==========================================
// 流程:
// 1. 文件读取与解析（CSV / Excel）
// 2. 字段映射与类型转换（任一产品行失败 → 整体中止，库内不变）
// 3. 单事务落库: 清空产品（BOM 级联删除，销售保留）→ 写入产品 → 按名称解析 BOM
//    （无法解析、用量无效、重复、成环的 BOM 行跳过并计数）
// 解析与落库在阻塞线程执行（spawn_blocking）
// ==========================================

use crate::domain::product::ProductDraft;
use crate::engine::bom_graph::BomGraph;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{BomImportRow, FieldMapper};
use crate::importer::file_parser::UniversalFileParser;
use crate::repository::bom_repo::BomRepository;
use crate::repository::error::RepositoryError;
use crate::repository::product_repo::ProductRepository;
use async_trait::async_trait;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// 表头占第 1 行，数据从第 2 行开始
const FIRST_DATA_ROW: usize = 2;

/// 导入汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryImportSummary {
    pub products_replaced: usize,
    pub products_imported: usize,
    pub bom_imported: usize,
    pub bom_skipped: usize,
}

// ==========================================
// InventoryImporter Trait
// ==========================================
#[async_trait]
pub trait InventoryImporter: Send + Sync {
    /// 以文件内容整体替换产品与 BOM
    ///
    /// # 参数
    /// - products_file: 产品文件（.csv / .xlsx / .xls）
    /// - bom_file: 可选 BOM 文件（列: Parent Product / Child Component / Quantity）
    async fn import_inventory(
        &self,
        products_file: PathBuf,
        bom_file: Option<PathBuf>,
    ) -> ImportResult<InventoryImportSummary>;
}

// ==========================================
// InventoryImporterImpl
// ==========================================
pub struct InventoryImporterImpl {
    conn: Arc<Mutex<Connection>>,
}

impl InventoryImporterImpl {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 阶段 1-2: 解析产品文件
    fn load_products(path: &Path) -> ImportResult<Vec<ProductDraft>> {
        let records = UniversalFileParser.parse(path)?;
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| FieldMapper.map_to_product(record, idx + FIRST_DATA_ROW))
            .collect()
    }

    /// 阶段 1-2: 解析 BOM 文件（缺列的行计入跳过数）
    fn load_bom(path: &Path) -> ImportResult<(Vec<BomImportRow>, usize)> {
        let records = UniversalFileParser.parse(path)?;
        let mut rows = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for (idx, record) in records.iter().enumerate() {
            match FieldMapper.map_to_bom_row(record, idx + FIRST_DATA_ROW) {
                Some(row) => rows.push(row),
                None => skipped += 1,
            }
        }
        Ok((rows, skipped))
    }

    /// 阶段 3: 单事务整体替换
    fn replace_all(
        conn: &Connection,
        products: &[ProductDraft],
        bom_rows: &[BomImportRow],
    ) -> ImportResult<InventoryImportSummary> {
        let tx = conn.unchecked_transaction()?;

        let products_replaced = ProductRepository::delete_all_tx(&tx)?;

        let mut ids_by_name: HashMap<String, i64> = HashMap::with_capacity(products.len());
        for (idx, draft) in products.iter().enumerate() {
            let id = ProductRepository::insert_tx(&tx, draft).map_err(|e| match e {
                RepositoryError::UniqueConstraintViolation(message) => {
                    ImportError::DuplicateProduct {
                        row: idx + FIRST_DATA_ROW,
                        message: format!("{}: {}", draft.name, message),
                    }
                }
                other => ImportError::Repository(other),
            })?;
            ids_by_name.insert(draft.name.clone(), id);
        }

        let mut bom_imported = 0;
        let mut bom_skipped = 0;
        let mut seen_pairs: HashSet<(i64, i64)> = HashSet::with_capacity(bom_rows.len());
        for row in bom_rows {
            let resolved = (
                ids_by_name.get(&row.parent_name),
                ids_by_name.get(&row.child_name),
            );
            let (Some(&parent_id), Some(&child_id)) = resolved else {
                tracing::warn!(row = row.row_number, parent = %row.parent_name, child = %row.child_name, "BOM 行无法解析产品，跳过");
                bom_skipped += 1;
                continue;
            };
            if !row.quantity.is_finite() || row.quantity <= 0.0 {
                tracing::warn!(row = row.row_number, quantity = row.quantity, "BOM 用量无效，跳过");
                bom_skipped += 1;
                continue;
            }
            if seen_pairs.contains(&(parent_id, child_id)) {
                tracing::warn!(row = row.row_number, parent = %row.parent_name, child = %row.child_name, "BOM 行重复，跳过");
                bom_skipped += 1;
                continue;
            }
            let cyclic = parent_id == child_id
                || BomGraph::reaches_tx(&tx, child_id, parent_id)?;
            if cyclic {
                tracing::warn!(row = row.row_number, "BOM 行会形成环，跳过");
                bom_skipped += 1;
                continue;
            }

            BomRepository::insert_edge_tx(&tx, parent_id, child_id, row.quantity)?;
            seen_pairs.insert((parent_id, child_id));
            bom_imported += 1;
        }

        tx.commit()?;

        Ok(InventoryImportSummary {
            products_replaced,
            products_imported: products.len(),
            bom_imported,
            bom_skipped,
        })
    }

    /// 同步入口（在阻塞线程中调用）
    pub fn import_blocking(
        conn: &Arc<Mutex<Connection>>,
        products_file: &Path,
        bom_file: Option<&Path>,
    ) -> ImportResult<InventoryImportSummary> {
        let products = Self::load_products(products_file)?;
        let (bom_rows, unmapped) = match bom_file {
            Some(path) => Self::load_bom(path)?,
            None => (Vec::new(), 0),
        };

        let guard = conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let mut summary = Self::replace_all(&guard, &products, &bom_rows)?;
        summary.bom_skipped += unmapped;
        Ok(summary)
    }
}

#[async_trait]
impl InventoryImporter for InventoryImporterImpl {
    async fn import_inventory(
        &self,
        products_file: PathBuf,
        bom_file: Option<PathBuf>,
    ) -> ImportResult<InventoryImportSummary> {
        tracing::info!(products = %products_file.display(), "开始导入库存");
        let conn = self.conn.clone();

        let result = tokio::task::spawn_blocking(move || {
            Self::import_blocking(&conn, &products_file, bom_file.as_deref())
        })
        .await
        .map_err(|e| ImportError::TaskJoinError(e.to_string()))?;

        match &result {
            Ok(summary) => tracing::info!(
                products = summary.products_imported,
                bom = summary.bom_imported,
                skipped = summary.bom_skipped,
                "库存导入完成"
            ),
            Err(e) => tracing::error!(error = %e, "库存导入失败，数据未变更"),
        }
        result
    }
}

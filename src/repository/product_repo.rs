// ==========================================
// 小微企业 ERP - 产品数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化
// ==========================================

use crate::db::{row_optional_date, DATE_FORMAT};
use crate::domain::product::{Product, ProductDraft};
use crate::domain::types::{Measurement, ProductKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// 产品查询列（顺序与 map_product_row 对齐）
pub(crate) const PRODUCT_COLUMNS: &str = "id, sku, name, kind, stock, min_stock, unit_cost, \
     additional_cost, measurement, unit_weight, supplier, purchase_date, exit_date";

/// 行 → Product
pub(crate) fn map_product_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Product> {
    map_product_row_at(row, 0)
}

/// 行 → Product（产品列从 base 开始，供 JOIN 查询复用）
pub(crate) fn map_product_row_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Product> {
    let kind_raw: String = row.get(base + 3)?;
    let kind = kind_raw.parse::<ProductKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(base + 3, Type::Text, e.into())
    })?;
    let measurement_raw: Option<String> = row.get(base + 8)?;

    Ok(Product {
        id: row.get(base)?,
        sku: row.get(base + 1)?,
        name: row.get(base + 2)?,
        kind,
        stock: row.get(base + 4)?,
        min_stock: row.get(base + 5)?,
        unit_cost: row.get::<_, Option<f64>>(base + 6)?.unwrap_or(0.0),
        additional_cost: row.get::<_, Option<f64>>(base + 7)?.unwrap_or(0.0),
        measurement: Measurement::parse_lenient(measurement_raw.as_deref()),
        unit_weight: row.get::<_, Option<f64>>(base + 9)?.unwrap_or(0.0),
        supplier: row.get(base + 10)?,
        purchase_date: row_optional_date(row, base + 11)?,
        exit_date: row_optional_date(row, base + 12)?,
    })
}

// ==========================================
// ProductRepository - 产品仓储
// ==========================================
/// 产品仓储
/// 职责: 管理 products 表的 CRUD 与相对库存调整
pub struct ProductRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProductRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增产品，返回新 id
    ///
    /// name 或 sku 冲突时返回 UniqueConstraintViolation
    pub fn insert(&self, draft: &ProductDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_tx(&conn, draft)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 全部产品（按名称升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM products ORDER BY name ASC", PRODUCT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_product_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 按类别查询（按名称升序）
    pub fn list_by_kind(&self, kind: ProductKind) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM products WHERE kind = ?1 ORDER BY name ASC",
            PRODUCT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![kind.as_str()], map_product_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 低于补货阈值的产品
    pub fn list_below_min_stock(&self) -> RepositoryResult<Vec<Product>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM products WHERE stock < min_stock ORDER BY name ASC",
            PRODUCT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_product_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 整体覆盖更新
    pub fn update(&self, id: i64, draft: &ProductDraft) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            r#"
            UPDATE products SET
                sku = ?1, name = ?2, kind = ?3, stock = ?4, min_stock = ?5,
                unit_cost = ?6, additional_cost = ?7, measurement = ?8, unit_weight = ?9,
                supplier = ?10, purchase_date = ?11, exit_date = ?12
            WHERE id = ?13
            "#,
            params![
                draft.sku,
                draft.name,
                draft.kind.as_str(),
                draft.stock,
                draft.min_stock,
                draft.unit_cost,
                draft.additional_cost,
                draft.measurement.as_str(),
                draft.unit_weight,
                draft.supplier,
                draft.purchase_date.map(|d| d.format(DATE_FORMAT).to_string()),
                draft.exit_date.map(|d| d.format(DATE_FORMAT).to_string()),
                id,
            ],
        )?;

        if affected == 0 {
            return Err(RepositoryError::not_found("Product", id));
        }
        Ok(())
    }

    /// 删除产品（外键级联删除其作为父件/子件的 BOM 边）
    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Product", id));
        }
        Ok(())
    }

    /// 相对调整库存（delta 可正可负，不做下限检查）
    pub fn adjust_stock(&self, id: i64, delta: f64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::adjust_stock_tx(&conn, id, delta)
    }

    // ==========================================
    // 事务内复用（由引擎在同一事务中调用）
    // ==========================================

    pub(crate) fn insert_tx(conn: &Connection, draft: &ProductDraft) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO products (
                sku, name, kind, stock, min_stock, unit_cost, additional_cost,
                measurement, unit_weight, supplier, purchase_date, exit_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                draft.sku,
                draft.name,
                draft.kind.as_str(),
                draft.stock,
                draft.min_stock,
                draft.unit_cost,
                draft.additional_cost,
                draft.measurement.as_str(),
                draft.unit_weight,
                draft.supplier,
                draft.purchase_date.map(|d| d.format(DATE_FORMAT).to_string()),
                draft.exit_date.map(|d| d.format(DATE_FORMAT).to_string()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub(crate) fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_product_row).optional()?)
    }

    /// 清空产品表（BOM 边级联删除，销售保留且 product_id 置空）
    pub(crate) fn delete_all_tx(conn: &Connection) -> RepositoryResult<usize> {
        Ok(conn.execute("DELETE FROM products", [])?)
    }

    pub(crate) fn adjust_stock_tx(conn: &Connection, id: i64, delta: f64) -> RepositoryResult<()> {
        let affected = conn.execute(
            "UPDATE products SET stock = stock + ?1 WHERE id = ?2",
            params![delta, id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Product", id));
        }
        Ok(())
    }
}

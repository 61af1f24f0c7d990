// ==========================================
// 小微企业 ERP - 销售数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 库存联动与收入镜像由 engine::sales_ledger 在同一事务中编排
// ==========================================

use crate::db::{row_datetime, LEDGER_DATETIME_FORMAT};
use crate::domain::ledger::{Sale, SaleDraft};
use crate::domain::types::ReportPeriod;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

const SALE_COLUMNS: &str = "id, product_id, product_name, quantity, unit_price, total_amount, date";

fn map_sale_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Sale> {
    Ok(Sale {
        id: row.get(0)?,
        product_id: row.get(1)?,
        product_name: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: row.get(4)?,
        total_amount: row.get(5)?,
        date: row_datetime(row, 6)?,
    })
}

/// 销售仓储
pub struct SaleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SaleRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Sale>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// 全部销售（时间倒序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Sale>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM sales ORDER BY date DESC, id DESC", SALE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_sale_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 最近 N 条销售
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<Sale>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM sales ORDER BY date DESC, id DESC LIMIT ?1",
            SALE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit as i64], map_sale_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 当前周期（今日/本周/本月/本年）的销售；None 返回全部
    pub fn list_by_period(&self, period: Option<ReportPeriod>) -> RepositoryResult<Vec<Sale>> {
        let Some(period) = period else {
            return self.list_all();
        };

        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM sales \
             WHERE strftime(?1, date) = strftime(?1, 'now', 'localtime') \
             ORDER BY date DESC, id DESC",
            SALE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![period.strftime_format()], map_sale_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ==========================================
    // 事务内复用
    // ==========================================

    pub(crate) fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<Sale>> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
        Ok(conn.query_row(&sql, params![id], map_sale_row).optional()?)
    }

    pub(crate) fn insert_tx(
        conn: &Connection,
        draft: &SaleDraft,
        date: &NaiveDateTime,
    ) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO sales (product_id, product_name, quantity, unit_price, total_amount, date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                draft.product_id,
                draft.product_name,
                draft.quantity,
                draft.unit_price,
                draft.total_amount(),
                date.format(LEDGER_DATETIME_FORMAT).to_string(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub(crate) fn update_tx(
        conn: &Connection,
        id: i64,
        draft: &SaleDraft,
        date: &NaiveDateTime,
    ) -> RepositoryResult<()> {
        let affected = conn.execute(
            r#"
            UPDATE sales
            SET product_id = ?1, product_name = ?2, quantity = ?3, unit_price = ?4,
                total_amount = ?5, date = ?6
            WHERE id = ?7
            "#,
            params![
                draft.product_id,
                draft.product_name,
                draft.quantity,
                draft.unit_price,
                draft.total_amount(),
                date.format(LEDGER_DATETIME_FORMAT).to_string(),
                id,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Sale", id));
        }
        Ok(())
    }

    pub(crate) fn delete_tx(conn: &Connection, id: i64) -> RepositoryResult<()> {
        let affected = conn.execute("DELETE FROM sales WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Sale", id));
        }
        Ok(())
    }
}

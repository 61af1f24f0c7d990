// ==========================================
// 小微企业 ERP - 收入 / 成本数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 销售镜像收入通过 source_sale_id 关联；
// 无关联键的历史数据按 描述前缀 + 日期 兜底匹配
// ==========================================

use crate::db::{now_ledger_timestamp, row_datetime, LEDGER_DATETIME_FORMAT};
use crate::domain::ledger::{Cost, EntryDraft, Revenue};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

fn format_date(date: Option<&NaiveDateTime>) -> String {
    date.map(|d| d.format(LEDGER_DATETIME_FORMAT).to_string())
        .unwrap_or_else(now_ledger_timestamp)
}

fn map_revenue_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Revenue> {
    Ok(Revenue {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        date: row_datetime(row, 3)?,
        source_sale_id: row.get(4)?,
    })
}

fn map_cost_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Cost> {
    Ok(Cost {
        id: row.get(0)?,
        description: row.get(1)?,
        amount: row.get(2)?,
        category: row
            .get::<_, Option<String>>(3)?
            .unwrap_or_else(|| crate::domain::ledger::DEFAULT_COST_CATEGORY.to_string()),
        date: row_datetime(row, 4)?,
    })
}

// ==========================================
// RevenueRepository - 收入仓储
// ==========================================
pub struct RevenueRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RevenueRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 直接录入收入（非销售来源）
    pub fn insert(&self, draft: &EntryDraft) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let date = format_date(draft.date.as_ref());
        Self::insert_tx(&conn, draft.description.as_deref(), draft.amount, &date, None)
    }

    /// 修改收入；date 为空时保留原日期
    pub fn update(&self, id: i64, draft: &EntryDraft) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = match draft.date {
            Some(date) => conn.execute(
                "UPDATE revenue SET description = ?1, amount = ?2, date = ?3 WHERE id = ?4",
                params![
                    draft.description,
                    draft.amount,
                    date.format(LEDGER_DATETIME_FORMAT).to_string(),
                    id
                ],
            )?,
            None => conn.execute(
                "UPDATE revenue SET description = ?1, amount = ?2 WHERE id = ?3",
                params![draft.description, draft.amount, id],
            )?,
        };
        if affected == 0 {
            return Err(RepositoryError::not_found("Revenue", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        Self::delete_tx(&conn, id)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Revenue>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT id, description, amount, date, source_sale_id FROM revenue WHERE id = ?1",
                params![id],
                map_revenue_row,
            )
            .optional()?)
    }

    /// 收入列表（时间倒序；limit 为空返回全部）
    pub fn list(&self, limit: Option<usize>) -> RepositoryResult<Vec<Revenue>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, description, amount, date, source_sale_id FROM revenue \
             ORDER BY date DESC, id DESC LIMIT ?1",
        )?;
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = stmt.query_map(params![limit], map_revenue_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ==========================================
    // 事务内复用
    // ==========================================

    pub(crate) fn insert_tx(
        conn: &Connection,
        description: Option<&str>,
        amount: f64,
        date: &str,
        source_sale_id: Option<i64>,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO revenue (description, amount, date, source_sale_id) VALUES (?1, ?2, ?3, ?4)",
            params![description, amount, date, source_sale_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 查找销售对应的镜像收入
    ///
    /// 1. 优先 source_sale_id 精确匹配
    /// 2. 兜底: 无关联键的历史收入，描述前缀 + 日期（+ 金额，如提供）匹配，仅取一条
    pub(crate) fn find_for_sale_tx(
        conn: &Connection,
        sale_id: i64,
        legacy_prefix: &str,
        sale_date: &str,
        amount: Option<f64>,
    ) -> RepositoryResult<Option<i64>> {
        let linked: Option<i64> = conn
            .query_row(
                "SELECT id FROM revenue WHERE source_sale_id = ?1 ORDER BY id LIMIT 1",
                params![sale_id],
                |row| row.get(0),
            )
            .optional()?;
        if linked.is_some() {
            return Ok(linked);
        }

        let legacy: Option<i64> = conn
            .query_row(
                r#"
                SELECT id FROM revenue
                WHERE source_sale_id IS NULL
                  AND substr(description, 1, length(?1)) = ?1
                  AND date = ?2
                  AND (?3 IS NULL OR abs(amount - ?3) < 1e-9)
                ORDER BY id
                LIMIT 1
                "#,
                params![legacy_prefix, sale_date, amount],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = legacy {
            tracing::warn!(sale_id, revenue_id = id, "销售镜像收入按历史描述匹配");
        }
        Ok(legacy)
    }

    /// 改写销售镜像收入（同时补齐关联键）
    pub(crate) fn relink_tx(
        conn: &Connection,
        id: i64,
        sale_id: i64,
        description: &str,
        amount: f64,
        date: &str,
    ) -> RepositoryResult<()> {
        conn.execute(
            "UPDATE revenue SET description = ?1, amount = ?2, date = ?3, source_sale_id = ?4 WHERE id = ?5",
            params![description, amount, date, sale_id, id],
        )?;
        Ok(())
    }

    pub(crate) fn delete_tx(conn: &Connection, id: i64) -> RepositoryResult<()> {
        let affected = conn.execute("DELETE FROM revenue WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Revenue", id));
        }
        Ok(())
    }
}

// ==========================================
// CostRepository - 成本仓储
// ==========================================
pub struct CostRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CostRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, draft: &EntryDraft, category: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO costs (description, amount, category, date) VALUES (?1, ?2, ?3, ?4)",
            params![
                draft.description,
                draft.amount,
                category,
                format_date(draft.date.as_ref())
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 修改成本；date 为空时保留原日期
    pub fn update(&self, id: i64, draft: &EntryDraft, category: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = match draft.date {
            Some(date) => conn.execute(
                "UPDATE costs SET description = ?1, amount = ?2, category = ?3, date = ?4 WHERE id = ?5",
                params![
                    draft.description,
                    draft.amount,
                    category,
                    date.format(LEDGER_DATETIME_FORMAT).to_string(),
                    id
                ],
            )?,
            None => conn.execute(
                "UPDATE costs SET description = ?1, amount = ?2, category = ?3 WHERE id = ?4",
                params![draft.description, draft.amount, category, id],
            )?,
        };
        if affected == 0 {
            return Err(RepositoryError::not_found("Cost", id));
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM costs WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("Cost", id));
        }
        Ok(())
    }

    /// 成本列表（时间倒序；limit 为空返回全部）
    pub fn list(&self, limit: Option<usize>) -> RepositoryResult<Vec<Cost>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, description, amount, category, date FROM costs \
             ORDER BY date DESC, id DESC LIMIT ?1",
        )?;
        let limit = limit.map(|l| l as i64).unwrap_or(-1);
        let rows = stmt.query_map(params![limit], map_cost_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

// ==========================================
// 小微企业 ERP - BOM 数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（环检测/数量校验在 engine::bom_graph）
// 端点存在性由外键保证
// ==========================================

use crate::domain::bom::{BomComponent, BomEdge, BomEdgeView};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::product_repo::{map_product_row_at, PRODUCT_COLUMNS};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

/// BOM 仓储
pub struct BomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl BomRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 删除一条 BOM 边
    pub fn delete_edge(&self, edge_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM bom_edges WHERE id = ?1", params![edge_id])?;
        if affected == 0 {
            return Err(RepositoryError::not_found("BomEdge", edge_id));
        }
        Ok(())
    }

    /// 父件的 BOM 列表（带子件名称）
    pub fn list_for_parent(&self, parent_id: i64) -> RepositoryResult<Vec<BomEdgeView>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT b.id, p.id, p.name, b.quantity
            FROM bom_edges b
            JOIN products p ON b.child_product_id = p.id
            WHERE b.parent_product_id = ?1
            ORDER BY b.id
            "#,
        )?;
        let rows = stmt.query_map(params![parent_id], |row| {
            Ok(BomEdgeView {
                bom_id: row.get(0)?,
                child_product_id: row.get(1)?,
                child_product_name: row.get(2)?,
                quantity: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 全部 BOM 边（导出用）
    pub fn list_all(&self) -> RepositoryResult<Vec<BomEdge>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, parent_product_id, child_product_id, quantity FROM bom_edges ORDER BY id",
        )?;
        let rows = stmt.query_map([], map_edge_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ==========================================
    // 事务内复用
    // ==========================================

    pub(crate) fn insert_edge_tx(
        conn: &Connection,
        parent_id: i64,
        child_id: i64,
        quantity: f64,
    ) -> RepositoryResult<i64> {
        conn.execute(
            "INSERT INTO bom_edges (parent_product_id, child_product_id, quantity) VALUES (?1, ?2, ?3)",
            params![parent_id, child_id, quantity],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub(crate) fn list_components_tx(
        conn: &Connection,
        parent_id: i64,
    ) -> RepositoryResult<Vec<BomComponent>> {
        let product_columns = PRODUCT_COLUMNS
            .split(',')
            .map(|c| format!("p.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            r#"
            SELECT b.id, b.parent_product_id, b.child_product_id, b.quantity, {}
            FROM bom_edges b
            JOIN products p ON b.child_product_id = p.id
            WHERE b.parent_product_id = ?1
            ORDER BY b.id
            "#,
            product_columns
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![parent_id], |row| {
            Ok(BomComponent {
                edge: map_edge_row(row)?,
                child: map_product_row_at(row, 4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 子件 id 列表（环检测遍历用）
    pub(crate) fn child_ids_tx(conn: &Connection, parent_id: i64) -> RepositoryResult<Vec<i64>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT child_product_id FROM bom_edges WHERE parent_product_id = ?1",
        )?;
        let rows = stmt.query_map(params![parent_id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn map_edge_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BomEdge> {
    Ok(BomEdge {
        id: row.get(0)?,
        parent_product_id: row.get(1)?,
        child_product_id: row.get(2)?,
        quantity: row.get(3)?,
    })
}

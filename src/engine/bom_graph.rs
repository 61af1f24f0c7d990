// ==========================================
// 小微企业 ERP - BOM 图引擎
// ==========================================
// 职责: BOM 边维护（数量校验 + 环检测）与成本卷积
// 红线: Engine 不拼 SQL，数据访问走 BomRepository / ProductRepository
// 范围: 评估只看一层 parent → child；环检测遍历全部可达子件
// ==========================================

use crate::domain::bom::{BomEdgeView, CostBreakdown};
use crate::engine::cost_rollup::CostCalculator;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::bom_repo::BomRepository;
use crate::repository::error::RepositoryError;
use crate::repository::product_repo::ProductRepository;
use rusqlite::Connection;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;

// ==========================================
// BomGraph - BOM 图
// ==========================================
pub struct BomGraph {
    conn: Arc<Mutex<Connection>>,
    bom_repo: BomRepository,
}

impl BomGraph {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let bom_repo = BomRepository::from_connection(conn.clone());
        Self { conn, bom_repo }
    }

    fn get_conn(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    /// 新增 BOM 边
    ///
    /// # 规则
    /// - quantity 必须为有限正数
    /// - 父件/子件必须存在
    /// - 不允许自引用，也不允许子件经由其 BOM 回到父件
    /// - 同一父件下子件唯一，重复时由唯一索引拒绝（ConstraintViolation）
    #[instrument(skip(self))]
    pub fn add_edge(&self, parent_id: i64, child_id: i64, quantity: f64) -> EngineResult<i64> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(EngineError::ValidationError(format!(
                "BOM 用量必须大于 0: {}",
                quantity
            )));
        }
        if parent_id == child_id {
            return Err(EngineError::CycleDetected {
                parent_id,
                child_id,
            });
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        for id in [parent_id, child_id] {
            if ProductRepository::find_by_id_tx(&tx, id)?.is_none() {
                return Err(EngineError::not_found("Product", id));
            }
        }

        if Self::reaches_tx(&tx, child_id, parent_id)? {
            tracing::warn!(parent_id, child_id, "拒绝成环的 BOM 边");
            return Err(EngineError::CycleDetected {
                parent_id,
                child_id,
            });
        }

        let edge_id = BomRepository::insert_edge_tx(&tx, parent_id, child_id, quantity)?;
        tx.commit()?;

        tracing::info!(edge_id, parent_id, child_id, quantity, "BOM 边已新增");
        Ok(edge_id)
    }

    /// 从 start 出发沿 parent → child 方向能否到达 target
    pub(crate) fn reaches_tx(conn: &Connection, start: i64, target: i64) -> EngineResult<bool> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::from([start]);

        while let Some(node) = queue.pop_front() {
            if node == target {
                return Ok(true);
            }
            if !visited.insert(node) {
                continue;
            }
            for child in BomRepository::child_ids_tx(conn, node)? {
                if !visited.contains(&child) {
                    queue.push_back(child);
                }
            }
        }
        Ok(false)
    }

    /// 删除 BOM 边
    pub fn remove_edge(&self, edge_id: i64) -> EngineResult<()> {
        self.bom_repo.delete_edge(edge_id)?;
        tracing::info!(edge_id, "BOM 边已删除");
        Ok(())
    }

    /// 父件 BOM 列表
    pub fn list_edges_for_parent(&self, parent_id: i64) -> EngineResult<Vec<BomEdgeView>> {
        Ok(self.bom_repo.list_for_parent(parent_id)?)
    }

    /// 成本卷积（不回写）
    #[instrument(skip(self))]
    pub fn calculate_cost(&self, parent_id: i64) -> EngineResult<CostBreakdown> {
        let conn = self.get_conn()?;
        let parent = ProductRepository::find_by_id_tx(&conn, parent_id)?
            .ok_or_else(|| EngineError::not_found("Product", parent_id))?;
        let components = BomRepository::list_components_tx(&conn, parent_id)?;
        drop(conn);

        let breakdown = CostCalculator::calculate(&parent, &components);
        tracing::debug!(
            parent_id,
            calculated_cost = breakdown.calculated_cost,
            components = breakdown.components.len(),
            "成本卷积完成"
        );
        Ok(breakdown)
    }
}

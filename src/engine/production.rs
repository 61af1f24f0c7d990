// ==========================================
// 小微企业 ERP - 生产引擎
// ==========================================
// 职责: 产能查询 + 原子化执行生产
// 红线:
// - 执行时在事务内重新计算产能，不信任调用方之前的查询结果
// - 子件扣减与父件入库同一事务提交，失败整体回滚
// ==========================================

use crate::domain::bom::{CapacityReport, ConsumedComponent, ProductionResult};
use crate::engine::capacity::{CapacityCalculator, CAPACITY_EPSILON};
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::bom_repo::BomRepository;
use crate::repository::error::RepositoryError;
use crate::repository::product_repo::ProductRepository;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;

// ==========================================
// ProductionEngine - 生产引擎
// ==========================================
pub struct ProductionEngine {
    conn: Arc<Mutex<Connection>>,
}

impl ProductionEngine {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    fn capacity_tx(conn: &Connection, parent_id: i64) -> EngineResult<CapacityReport> {
        let parent = ProductRepository::find_by_id_tx(conn, parent_id)?
            .ok_or_else(|| EngineError::not_found("Product", parent_id))?;
        let components = BomRepository::list_components_tx(conn, parent_id)?;
        Ok(CapacityCalculator::calculate(&parent, &components))
    }

    /// 最大可生产数量
    #[instrument(skip(self))]
    pub fn max_producible(&self, parent_id: i64) -> EngineResult<CapacityReport> {
        let conn = self.get_conn()?;
        let report = Self::capacity_tx(&conn, parent_id)?;
        tracing::debug!(parent_id, can_produce = report.can_produce, "产能查询完成");
        Ok(report)
    }

    /// 执行生产
    ///
    /// # 流程（单事务）
    /// 1) 校验数量为有限正数
    /// 2) 父件存在、BOM 非空（无配方拒绝生产）
    /// 3) 重新计算产能，quantity 超出则 InsufficientStock
    /// 4) 每条边扣减 子件库存 -= 用量 × quantity
    /// 5) 父件库存 += quantity
    ///
    /// 配方检查先于产能检查：无 BOM 的产品即使请求量超过现有库存，
    /// 也返回 NoBillOfMaterials 而不是 InsufficientStock
    #[instrument(skip(self))]
    pub fn produce(&self, parent_id: i64, quantity: f64) -> EngineResult<ProductionResult> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(EngineError::ValidationError(format!(
                "生产数量必须大于 0: {}",
                quantity
            )));
        }

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let parent = ProductRepository::find_by_id_tx(&tx, parent_id)?
            .ok_or_else(|| EngineError::not_found("Product", parent_id))?;
        let components = BomRepository::list_components_tx(&tx, parent_id)?;
        if components.is_empty() {
            return Err(EngineError::NoBillOfMaterials {
                product_id: parent_id,
            });
        }

        let report = CapacityCalculator::calculate(&parent, &components);
        if quantity > report.can_produce + CAPACITY_EPSILON {
            tracing::warn!(
                parent_id,
                requested = quantity,
                available = report.can_produce,
                "库存不足，拒绝生产"
            );
            return Err(EngineError::InsufficientStock {
                product_id: parent_id,
                requested: quantity,
                available: report.can_produce,
            });
        }

        let mut consumed = Vec::with_capacity(components.len());
        for component in &components {
            let amount = component.edge.quantity * quantity;
            ProductRepository::adjust_stock_tx(&tx, component.child.id, -amount)?;
            consumed.push(ConsumedComponent {
                child_id: component.child.id,
                child_name: component.child.name.clone(),
                quantity: amount,
            });
        }
        ProductRepository::adjust_stock_tx(&tx, parent_id, quantity)?;

        tx.commit()?;

        tracing::info!(
            parent_id,
            quantity,
            components = consumed.len(),
            "生产已执行"
        );
        Ok(ProductionResult {
            product_id: parent_id,
            product_name: parent.name,
            quantity,
            consumed,
        })
    }
}

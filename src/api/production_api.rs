// ==========================================
// 小微企业 ERP - 生产 API
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::bom::{CapacityReport, ProductionResult};
use crate::engine::production::ProductionEngine;

pub struct ProductionApi {
    engine: Arc<ProductionEngine>,
}

impl ProductionApi {
    pub fn new(engine: Arc<ProductionEngine>) -> Self {
        Self { engine }
    }

    pub fn max_producible(&self, parent_id: i64) -> ApiResult<CapacityReport> {
        Ok(self.engine.max_producible(parent_id)?)
    }

    /// 执行生产（产能在事务内重新校验）
    pub fn produce(&self, parent_id: i64, quantity: f64) -> ApiResult<ProductionResult> {
        Ok(self.engine.produce(parent_id, quantity)?)
    }
}

// ==========================================
// 小微企业 ERP - 物料清单 API
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::bom::{BomEdgeView, CostBreakdown};
use crate::engine::bom_graph::BomGraph;

pub struct BomApi {
    bom_graph: Arc<BomGraph>,
}

impl BomApi {
    pub fn new(bom_graph: Arc<BomGraph>) -> Self {
        Self { bom_graph }
    }

    /// 新增 BOM 边，返回边 id
    pub fn add_edge(&self, parent_id: i64, child_id: i64, quantity: f64) -> ApiResult<i64> {
        Ok(self.bom_graph.add_edge(parent_id, child_id, quantity)?)
    }

    pub fn remove_edge(&self, edge_id: i64) -> ApiResult<()> {
        Ok(self.bom_graph.remove_edge(edge_id)?)
    }

    pub fn list_edges_for_parent(&self, parent_id: i64) -> ApiResult<Vec<BomEdgeView>> {
        Ok(self.bom_graph.list_edges_for_parent(parent_id)?)
    }

    /// 成本汇总（只计算，不回写 unit_cost）
    pub fn calculate_cost(&self, parent_id: i64) -> ApiResult<CostBreakdown> {
        Ok(self.bom_graph.calculate_cost(parent_id)?)
    }
}

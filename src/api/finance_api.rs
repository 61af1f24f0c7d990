// ==========================================
// 小微企业 ERP - 收入 / 成本 API
// ==========================================
// 直接录入的收入与成本；销售产生的镜像收入也可在此查看
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::parse_ledger_date;
use crate::config::ConfigManager;
use crate::domain::ledger::{Cost, EntryDraft, Revenue};
use crate::repository::finance_repo::{CostRepository, RevenueRepository};

/// 收入录入字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryInput {
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<String>,
}

/// 成本录入字段（category 为空时取配置的默认类别）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostInput {
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// 收入 + 成本组合视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinanceEntries {
    pub revenue: Vec<Revenue>,
    pub costs: Vec<Cost>,
}

fn to_draft(description: Option<String>, amount: f64, date: Option<&str>) -> ApiResult<EntryDraft> {
    let draft = EntryDraft {
        description: description
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        amount,
        date: parse_ledger_date("date", date)?,
    };
    draft.validate().map_err(ApiError::ValidationError)?;
    Ok(draft)
}

pub struct FinanceApi {
    revenue_repo: Arc<RevenueRepository>,
    cost_repo: Arc<CostRepository>,
    config: Arc<ConfigManager>,
}

impl FinanceApi {
    pub fn new(
        revenue_repo: Arc<RevenueRepository>,
        cost_repo: Arc<CostRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            revenue_repo,
            cost_repo,
            config,
        }
    }

    fn resolve_limit(&self, limit: Option<usize>) -> ApiResult<usize> {
        match limit {
            Some(limit) => Ok(limit),
            None => Ok(self.config.recent_entries_limit()?),
        }
    }

    fn resolve_category(&self, category: Option<String>) -> ApiResult<String> {
        match category.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            Some(category) => Ok(category),
            None => Ok(self.config.default_cost_category()?),
        }
    }

    // ==========================================
    // 收入
    // ==========================================

    pub fn add_revenue(&self, input: EntryInput) -> ApiResult<i64> {
        let draft = to_draft(input.description, input.amount, input.date.as_deref())?;
        let id = self.revenue_repo.insert(&draft)?;
        info!(revenue_id = id, amount = draft.amount, "收入已登记");
        Ok(id)
    }

    pub fn update_revenue(&self, id: i64, input: EntryInput) -> ApiResult<()> {
        let draft = to_draft(input.description, input.amount, input.date.as_deref())?;
        self.revenue_repo.update(id, &draft)?;
        info!(revenue_id = id, "收入已修改");
        Ok(())
    }

    pub fn delete_revenue(&self, id: i64) -> ApiResult<()> {
        self.revenue_repo.delete(id)?;
        info!(revenue_id = id, "收入已删除");
        Ok(())
    }

    pub fn list_recent_revenue(&self, limit: Option<usize>) -> ApiResult<Vec<Revenue>> {
        let limit = self.resolve_limit(limit)?;
        Ok(self.revenue_repo.list(Some(limit))?)
    }

    pub fn list_all_revenue(&self) -> ApiResult<Vec<Revenue>> {
        Ok(self.revenue_repo.list(None)?)
    }

    // ==========================================
    // 成本
    // ==========================================

    pub fn add_cost(&self, input: CostInput) -> ApiResult<i64> {
        let category = self.resolve_category(input.category)?;
        let draft = to_draft(input.description, input.amount, input.date.as_deref())?;
        let id = self.cost_repo.insert(&draft, &category)?;
        info!(cost_id = id, amount = draft.amount, category = %category, "成本已登记");
        Ok(id)
    }

    pub fn update_cost(&self, id: i64, input: CostInput) -> ApiResult<()> {
        let category = self.resolve_category(input.category)?;
        let draft = to_draft(input.description, input.amount, input.date.as_deref())?;
        self.cost_repo.update(id, &draft, &category)?;
        info!(cost_id = id, "成本已修改");
        Ok(())
    }

    pub fn delete_cost(&self, id: i64) -> ApiResult<()> {
        self.cost_repo.delete(id)?;
        info!(cost_id = id, "成本已删除");
        Ok(())
    }

    pub fn list_recent_costs(&self, limit: Option<usize>) -> ApiResult<Vec<Cost>> {
        let limit = self.resolve_limit(limit)?;
        Ok(self.cost_repo.list(Some(limit))?)
    }

    pub fn list_all_costs(&self) -> ApiResult<Vec<Cost>> {
        Ok(self.cost_repo.list(None)?)
    }

    // ==========================================
    // 组合视图
    // ==========================================

    pub fn recent_finances(&self, limit: Option<usize>) -> ApiResult<FinanceEntries> {
        Ok(FinanceEntries {
            revenue: self.list_recent_revenue(limit)?,
            costs: self.list_recent_costs(limit)?,
        })
    }

    pub fn all_finances(&self) -> ApiResult<FinanceEntries> {
        Ok(FinanceEntries {
            revenue: self.list_all_revenue()?,
            costs: self.list_all_costs()?,
        })
    }
}

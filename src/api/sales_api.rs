// ==========================================
// 小微企业 ERP - 销售 API
// ==========================================
// 职责: 销售录入/修改/删除（库存与镜像收入由 SalesLedger 同事务维护）
// product_name 为空时取产品当前名称作为快照
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::error::ApiResult;
use crate::api::input::parse_ledger_date;
use crate::config::ConfigManager;
use crate::domain::ledger::{BatchSaleResult, Sale, SaleDraft};
use crate::domain::types::ReportPeriod;
use crate::engine::sales_ledger::SalesLedger;
use crate::repository::product_repo::ProductRepository;

/// 前端录入的销售字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaleInput {
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub date: Option<String>,
}

pub struct SalesApi {
    ledger: Arc<SalesLedger>,
    product_repo: Arc<ProductRepository>,
    config: Arc<ConfigManager>,
}

impl SalesApi {
    pub fn new(
        ledger: Arc<SalesLedger>,
        product_repo: Arc<ProductRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            ledger,
            product_repo,
            config,
        }
    }

    /// 输入 → SaleDraft
    ///
    /// 产品不存在时保留空名称，由台账在扣库存时报告 NotFound
    fn to_draft(&self, input: SaleInput) -> ApiResult<SaleDraft> {
        let date = parse_ledger_date("date", input.date.as_deref())?;
        let product_name = match input
            .product_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
        {
            Some(name) => name,
            None => self
                .product_repo
                .find_by_id(input.product_id)?
                .map(|p| p.name)
                .unwrap_or_default(),
        };

        Ok(SaleDraft {
            product_id: input.product_id,
            product_name,
            quantity: input.quantity,
            unit_price: input.unit_price,
            date,
        })
    }

    pub fn add_sale(&self, input: SaleInput) -> ApiResult<Sale> {
        let draft = self.to_draft(input)?;
        Ok(self.ledger.add_sale(&draft)?)
    }

    /// 批量销售（全有或全无）
    pub fn add_multiple_sales(&self, inputs: Vec<SaleInput>) -> ApiResult<BatchSaleResult> {
        let drafts = inputs
            .into_iter()
            .map(|input| self.to_draft(input))
            .collect::<ApiResult<Vec<_>>>()?;
        Ok(self.ledger.add_multiple_sales(&drafts)?)
    }

    pub fn update_sale(&self, sale_id: i64, input: SaleInput) -> ApiResult<Sale> {
        let draft = self.to_draft(input)?;
        Ok(self.ledger.update_sale(sale_id, &draft)?)
    }

    pub fn delete_sale(&self, sale_id: i64) -> ApiResult<()> {
        Ok(self.ledger.delete_sale(sale_id)?)
    }

    pub fn get_sale(&self, sale_id: i64) -> ApiResult<Sale> {
        Ok(self.ledger.get_sale(sale_id)?)
    }

    pub fn list_sales(&self) -> ApiResult<Vec<Sale>> {
        Ok(self.ledger.list_sales()?)
    }

    /// 最近销售；limit 为空时取配置 recent_entries_limit
    pub fn list_recent_sales(&self, limit: Option<usize>) -> ApiResult<Vec<Sale>> {
        let limit = match limit {
            Some(limit) => limit,
            None => self.config.recent_entries_limit()?,
        };
        Ok(self.ledger.list_recent_sales(limit)?)
    }

    /// 按当前周期查询（day/week/month/year），无法识别的周期返回全部
    pub fn list_sales_by_period(&self, period: &str) -> ApiResult<Vec<Sale>> {
        let parsed = ReportPeriod::parse(period);
        if parsed.is_none() {
            debug!(period, "未知周期，返回全部销售");
        }
        Ok(self.ledger.list_sales_by_period(parsed)?)
    }
}

// ==========================================
// 小微企业 ERP - 库存 API
// ==========================================
// 职责: 产品增删改查 + 相对库存调整
// 读取时附带派生字段 total_weight
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{parse_calendar_date, parse_kind};
use crate::domain::product::{ProductDraft, ProductView};
use crate::domain::types::Measurement;
use crate::repository::error::RepositoryError;
use crate::repository::product_repo::ProductRepository;

// ==========================================
// ProductInput - 前端录入的产品字段
// ==========================================
/// measurement 非法或缺失时按 discrete 处理（宽松策略，不报错）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub stock: f64,
    #[serde(default)]
    pub min_stock: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub additional_cost: f64,
    #[serde(default)]
    pub measurement: Option<String>,
    #[serde(default)]
    pub unit_weight: f64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub exit_date: Option<String>,
}

impl ProductInput {
    pub fn into_draft(self) -> ApiResult<ProductDraft> {
        let draft = ProductDraft {
            sku: self.sku,
            name: self.name,
            kind: parse_kind(&self.kind)?,
            stock: self.stock,
            min_stock: self.min_stock,
            unit_cost: self.unit_cost,
            additional_cost: self.additional_cost,
            measurement: Measurement::parse_lenient(self.measurement.as_deref()),
            unit_weight: self.unit_weight,
            supplier: self.supplier,
            purchase_date: parse_calendar_date("purchase_date", self.purchase_date.as_deref())?,
            exit_date: parse_calendar_date("exit_date", self.exit_date.as_deref())?,
        }
        .normalized();
        draft.validate().map_err(ApiError::ValidationError)?;
        Ok(draft)
    }
}

// ==========================================
// InventoryApi - 库存 API
// ==========================================
pub struct InventoryApi {
    product_repo: Arc<ProductRepository>,
}

impl InventoryApi {
    pub fn new(product_repo: Arc<ProductRepository>) -> Self {
        Self { product_repo }
    }

    /// 新增产品，返回新 id（名称/SKU 重复 → ConstraintViolation）
    pub fn create_product(&self, input: ProductInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.product_repo.insert(&draft)?;
        info!(product_id = id, name = %draft.name, kind = %draft.kind, "产品已创建");
        Ok(id)
    }

    pub fn get_product(&self, id: i64) -> ApiResult<ProductView> {
        let product = self
            .product_repo
            .find_by_id(id)?
            .ok_or_else(|| RepositoryError::not_found("Product", id))?;
        Ok(product.into())
    }

    /// 全部产品（按名称升序）
    pub fn list_products(&self) -> ApiResult<Vec<ProductView>> {
        let products = self.product_repo.list_all()?;
        debug!(count = products.len(), "查询产品列表");
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    pub fn list_products_by_kind(&self, kind: &str) -> ApiResult<Vec<ProductView>> {
        let kind = parse_kind(kind)?;
        let products = self.product_repo.list_by_kind(kind)?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// 低于安全库存的产品（补货提醒）
    pub fn list_below_min_stock(&self) -> ApiResult<Vec<ProductView>> {
        let products = self.product_repo.list_below_min_stock()?;
        Ok(products.into_iter().map(ProductView::from).collect())
    }

    /// 整体覆盖更新
    pub fn update_product(&self, id: i64, input: ProductInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        self.product_repo.update(id, &draft)?;
        info!(product_id = id, "产品已更新");
        Ok(())
    }

    /// 删除产品（BOM 边级联删除）
    pub fn delete_product(&self, id: i64) -> ApiResult<()> {
        self.product_repo.delete(id)?;
        info!(product_id = id, "产品已删除");
        Ok(())
    }

    /// 相对调整库存（允许结果为负）
    pub fn adjust_stock(&self, id: i64, delta: f64) -> ApiResult<ProductView> {
        if !delta.is_finite() {
            return Err(ApiError::ValidationError(format!(
                "库存调整量必须是有效数字: {}",
                delta
            )));
        }
        self.product_repo.adjust_stock(id, delta)?;
        let view = self.get_product(id)?;
        if view.product.stock < 0.0 {
            tracing::warn!(product_id = id, stock = view.product.stock, "库存为负");
        }
        info!(product_id = id, delta, "库存已调整");
        Ok(view)
    }
}

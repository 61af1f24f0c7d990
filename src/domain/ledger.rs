// ==========================================
// 小微企业 ERP - 销售 / 收入 / 成本台账模型
// ==========================================
// 对齐: sales / revenue / costs 表
// 销售创建时同步生成一条镜像收入（revenue.source_sale_id）
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 默认成本分类
pub const DEFAULT_COST_CATEGORY: &str = "Other";

// ==========================================
// Sale - 销售记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    /// 产品被删除后置空（销售记录保留）
    pub product_id: Option<i64>,
    /// 创建时的产品名称快照，不随改名同步
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_amount: f64,
    pub date: NaiveDateTime,
}

/// 新增/修改销售的输入（日期已解析）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleDraft {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub date: Option<NaiveDateTime>,
}

impl SaleDraft {
    pub fn total_amount(&self) -> f64 {
        self.quantity * self.unit_price
    }

    /// 镜像收入描述
    pub fn revenue_description(&self) -> String {
        sale_revenue_description(&self.product_name, self.quantity)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(format!("销售数量必须大于 0: {}", self.quantity));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(format!("单价必须是非负数字: {}", self.unit_price));
        }
        Ok(())
    }
}

/// 销售镜像收入的描述格式
pub fn sale_revenue_description(product_name: &str, quantity: f64) -> String {
    format!("Sale: {} x{}", product_name, quantity)
}

/// 旧数据匹配用前缀（无 source_sale_id 的历史收入）
pub fn sale_revenue_prefix(product_name: &str) -> String {
    format!("Sale: {} x", product_name)
}

/// 批量销售结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSaleResult {
    pub count: usize,
    pub total_revenue: f64,
}

// ==========================================
// Revenue / Cost
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub id: i64,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDateTime,
    pub source_sale_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub id: i64,
    pub description: Option<String>,
    pub amount: f64,
    pub category: String,
    pub date: NaiveDateTime,
}

/// 收入/成本新增或修改的输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub description: Option<String>,
    pub amount: f64,
    pub date: Option<NaiveDateTime>,
}

impl EntryDraft {
    pub fn validate(&self) -> Result<(), String> {
        if !self.amount.is_finite() {
            return Err("金额必须是有效数字".to_string());
        }
        Ok(())
    }
}

// ==========================================
// 小微企业 ERP - 报表读侧仓储
// ==========================================
// 纯聚合查询，只读
// ==========================================

use crate::domain::report::{
    round2, CostCategoryTotal, FinancialMetrics, FinancialSummary, InventoryValuation,
    StaleProduct, TopProductByProfit, TopProductBySales,
};
use crate::domain::types::{ProductKind, ReportPeriod};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

fn parse_kind(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<ProductKind> {
    let raw: String = row.get(idx)?;
    raw.parse::<ProductKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// 报表仓储
pub struct ReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReportRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn totals_by_bucket(
        conn: &Connection,
        table: &str,
        period: ReportPeriod,
    ) -> RepositoryResult<BTreeMap<String, f64>> {
        let sql = format!(
            "SELECT strftime(?1, date) AS bucket, SUM(amount) FROM {} \
             WHERE bucket IS NOT NULL GROUP BY bucket ORDER BY bucket",
            table
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![period.strftime_format()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?.unwrap_or(0.0)))
        })?;
        Ok(rows.collect::<Result<BTreeMap<_, _>, _>>()?)
    }

    /// 按周期分桶的收入/成本/利润
    pub fn financial_summary(&self, period: ReportPeriod) -> RepositoryResult<FinancialSummary> {
        let conn = self.get_conn()?;
        let revenue = Self::totals_by_bucket(&conn, "revenue", period)?;
        let costs = Self::totals_by_bucket(&conn, "costs", period)?;

        let mut labels: Vec<String> = revenue.keys().chain(costs.keys()).cloned().collect();
        labels.sort();
        labels.dedup();

        let mut summary = FinancialSummary::default();
        for label in labels {
            let r = revenue.get(&label).copied().unwrap_or(0.0);
            let c = costs.get(&label).copied().unwrap_or(0.0);
            summary.revenue.push(r);
            summary.costs.push(c);
            summary.profit.push(r - c);
            summary.labels.push(label);
        }
        Ok(summary)
    }

    /// 销量 Top N（按数量）
    pub fn top_products_by_sales(&self, limit: usize) -> RepositoryResult<Vec<TopProductBySales>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT product_name, SUM(quantity) AS total_quantity, SUM(total_amount)
            FROM sales
            GROUP BY product_name
            ORDER BY total_quantity DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(TopProductBySales {
                product_name: row.get(0)?,
                total_quantity: row.get(1)?,
                total_revenue: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 利润 Top N（(售价 - 当前单位成本) × 数量）
    pub fn top_products_by_profitability(
        &self,
        limit: usize,
    ) -> RepositoryResult<Vec<TopProductByProfit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                s.product_name,
                s.product_id,
                SUM(s.quantity),
                SUM(s.total_amount),
                p.unit_cost,
                SUM((s.unit_price - COALESCE(p.unit_cost, 0)) * s.quantity) AS total_profit
            FROM sales s
            LEFT JOIN products p ON s.product_id = p.id
            GROUP BY s.product_name, s.product_id, p.unit_cost
            ORDER BY total_profit DESC
            LIMIT ?1
            "#,
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(TopProductByProfit {
                product_name: row.get(0)?,
                product_id: row.get(1)?,
                total_quantity: row.get(2)?,
                total_revenue: row.get(3)?,
                unit_cost: row.get(4)?,
                total_profit: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 成本分类汇总
    pub fn cost_breakdown_by_category(&self) -> RepositoryResult<Vec<CostCategoryTotal>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT COALESCE(category, 'Other') AS cat, SUM(amount) AS total
            FROM costs
            GROUP BY cat
            ORDER BY total DESC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CostCategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 最近 N 天无销售的成品/半成品
    pub fn products_without_movement(&self, days: u32) -> RepositoryResult<Vec<StaleProduct>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.id, p.name, p.kind, p.stock, p.unit_cost, p.stock * p.unit_cost
            FROM products p
            WHERE p.id NOT IN (
                SELECT DISTINCT product_id FROM sales
                WHERE product_id IS NOT NULL
                  AND date >= datetime('now', 'localtime', '-' || ?1 || ' days')
            )
            AND p.kind IN ('final', 'intermediate')
            ORDER BY p.name
            "#,
        )?;
        let rows = stmt.query_map(params![days], |row| {
            Ok(StaleProduct {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: parse_kind(row, 2)?,
                stock: row.get(3)?,
                unit_cost: row.get(4)?,
                total_value: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 按产品类别估值
    pub fn inventory_valuation_by_kind(&self) -> RepositoryResult<Vec<InventoryValuation>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT kind, COUNT(*), SUM(stock * unit_cost) AS total_value, SUM(stock)
            FROM products
            GROUP BY kind
            ORDER BY total_value DESC
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(InventoryValuation {
                kind: parse_kind(row, 0)?,
                product_count: row.get(1)?,
                total_value: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
                total_quantity: row.get::<_, Option<f64>>(3)?.unwrap_or(0.0),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 本月财务指标
    pub fn financial_metrics_current_month(&self) -> RepositoryResult<FinancialMetrics> {
        let conn = self.get_conn()?;
        const THIS_MONTH: &str = "strftime('%Y-%m', date) = strftime('%Y-%m', 'now', 'localtime')";

        let (sales_count, total_sales, avg_ticket): (i64, Option<f64>, Option<f64>) = conn
            .query_row(
                &format!(
                    "SELECT COUNT(*), SUM(total_amount), AVG(total_amount) FROM sales WHERE {}",
                    THIS_MONTH
                ),
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;
        let total_revenue: Option<f64> = conn.query_row(
            &format!("SELECT SUM(amount) FROM revenue WHERE {}", THIS_MONTH),
            [],
            |row| row.get(0),
        )?;
        let total_costs: Option<f64> = conn.query_row(
            &format!("SELECT SUM(amount) FROM costs WHERE {}", THIS_MONTH),
            [],
            |row| row.get(0),
        )?;

        let total_revenue = total_revenue.unwrap_or(0.0);
        let total_costs = total_costs.unwrap_or(0.0);
        let profit = total_revenue - total_costs;
        let profit_margin = if total_revenue > 0.0 {
            profit / total_revenue * 100.0
        } else {
            0.0
        };

        Ok(FinancialMetrics {
            sales_count,
            total_sales: total_sales.unwrap_or(0.0),
            avg_ticket: avg_ticket.unwrap_or(0.0),
            total_revenue,
            total_costs,
            profit,
            profit_margin: round2(profit_margin),
        })
    }
}

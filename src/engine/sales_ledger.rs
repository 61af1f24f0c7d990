// ==========================================
// 小微企业 ERP - 销售台账引擎
// ==========================================
// 职责: 销售记录 ↔ 库存扣减 ↔ 镜像收入 三者同事务维护
// 红线:
// - 销售新增/修改/删除与库存、收入同一事务提交
// - 批量销售全有或全无
// - 不检查库存是否充足（负库存由调用方避免）
// ==========================================

use crate::db::LEDGER_DATETIME_FORMAT;
use crate::domain::ledger::{sale_revenue_prefix, BatchSaleResult, Sale, SaleDraft};
use crate::domain::types::ReportPeriod;
use crate::engine::error::{EngineError, EngineResult};
use crate::repository::error::RepositoryError;
use crate::repository::finance_repo::RevenueRepository;
use crate::repository::product_repo::ProductRepository;
use crate::repository::sale_repo::SaleRepository;
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::instrument;

// ==========================================
// SalesLedger - 销售台账
// ==========================================
pub struct SalesLedger {
    conn: Arc<Mutex<Connection>>,
    sale_repo: SaleRepository,
}

impl SalesLedger {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        let sale_repo = SaleRepository::from_connection(conn.clone());
        Self { conn, sale_repo }
    }

    fn get_conn(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()).into())
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// 单条销售写入（调用方持有事务）
    ///
    /// 扣库存 → 写销售 → 写镜像收入；库存扣减失败（产品不存在）时什么都不写
    fn add_sale_tx(conn: &Connection, draft: &SaleDraft, default_date: &NaiveDateTime) -> EngineResult<i64> {
        draft.validate().map_err(EngineError::ValidationError)?;

        let date = draft.date.unwrap_or(*default_date);
        let date_text = date.format(LEDGER_DATETIME_FORMAT).to_string();

        ProductRepository::adjust_stock_tx(conn, draft.product_id, -draft.quantity)?;
        let sale_id = SaleRepository::insert_tx(conn, draft, &date)?;
        RevenueRepository::insert_tx(
            conn,
            Some(&draft.revenue_description()),
            draft.total_amount(),
            &date_text,
            Some(sale_id),
        )?;
        Ok(sale_id)
    }

    /// 新增销售
    #[instrument(skip(self, draft), fields(product_id = draft.product_id, quantity = draft.quantity))]
    pub fn add_sale(&self, draft: &SaleDraft) -> EngineResult<Sale> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let sale_id = Self::add_sale_tx(&tx, draft, &Self::now())?;
        let sale = SaleRepository::find_by_id_tx(&tx, sale_id)?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))?;
        tx.commit()?;

        tracing::info!(sale_id, total = sale.total_amount, "销售已登记");
        Ok(sale)
    }

    /// 批量新增销售（单事务，全有或全无）
    #[instrument(skip(self, drafts), fields(count = drafts.len()))]
    pub fn add_multiple_sales(&self, drafts: &[SaleDraft]) -> EngineResult<BatchSaleResult> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let now = Self::now();

        let mut total_revenue = 0.0;
        for (index, draft) in drafts.iter().enumerate() {
            if let Err(e) = Self::add_sale_tx(&tx, draft, &now) {
                tracing::error!(index, error = %e, "批量销售失败，整体回滚");
                return Err(EngineError::BatchAborted {
                    index,
                    reason: e.to_string(),
                });
            }
            total_revenue += draft.total_amount();
        }
        tx.commit()?;

        tracing::info!(count = drafts.len(), total_revenue, "批量销售已登记");
        Ok(BatchSaleResult {
            count: drafts.len(),
            total_revenue,
        })
    }

    /// 修改销售
    ///
    /// # 库存
    /// - 产品不变: 只应用数量差 (new - old)
    /// - 产品变更: 旧产品回补旧数量，新产品扣减新数量
    ///
    /// # 收入
    /// 同步改写镜像收入（描述/金额/日期）；找不到镜像收入时不做处理
    #[instrument(skip(self, draft))]
    pub fn update_sale(&self, sale_id: i64, draft: &SaleDraft) -> EngineResult<Sale> {
        draft.validate().map_err(EngineError::ValidationError)?;

        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let old = SaleRepository::find_by_id_tx(&tx, sale_id)?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))?;

        if old.product_id == Some(draft.product_id) {
            let diff = draft.quantity - old.quantity;
            if diff != 0.0 {
                ProductRepository::adjust_stock_tx(&tx, draft.product_id, -diff)?;
            }
        } else {
            if let Some(old_product_id) = old.product_id {
                ProductRepository::adjust_stock_tx(&tx, old_product_id, old.quantity)?;
            }
            ProductRepository::adjust_stock_tx(&tx, draft.product_id, -draft.quantity)?;
        }

        let date = draft.date.unwrap_or(old.date);
        let old_date_text = old.date.format(LEDGER_DATETIME_FORMAT).to_string();
        let date_text = date.format(LEDGER_DATETIME_FORMAT).to_string();

        let revenue_id = RevenueRepository::find_for_sale_tx(
            &tx,
            sale_id,
            &sale_revenue_prefix(&old.product_name),
            &old_date_text,
            Some(old.total_amount),
        )?;
        match revenue_id {
            Some(revenue_id) => RevenueRepository::relink_tx(
                &tx,
                revenue_id,
                sale_id,
                &draft.revenue_description(),
                draft.total_amount(),
                &date_text,
            )?,
            None => tracing::warn!(sale_id, "未找到销售对应的收入记录，跳过同步"),
        }

        SaleRepository::update_tx(&tx, sale_id, draft, &date)?;
        let sale = SaleRepository::find_by_id_tx(&tx, sale_id)?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))?;
        tx.commit()?;

        tracing::info!(sale_id, quantity = sale.quantity, "销售已修改");
        Ok(sale)
    }

    /// 删除销售：回补库存 → 删除镜像收入 → 删除销售
    #[instrument(skip(self))]
    pub fn delete_sale(&self, sale_id: i64) -> EngineResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let old = SaleRepository::find_by_id_tx(&tx, sale_id)?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))?;

        match old.product_id {
            Some(product_id) => ProductRepository::adjust_stock_tx(&tx, product_id, old.quantity)?,
            None => tracing::warn!(sale_id, "销售关联产品已删除，不回补库存"),
        }

        let revenue_id = RevenueRepository::find_for_sale_tx(
            &tx,
            sale_id,
            &sale_revenue_prefix(&old.product_name),
            &old.date.format(LEDGER_DATETIME_FORMAT).to_string(),
            Some(old.total_amount),
        )?;
        match revenue_id {
            Some(revenue_id) => RevenueRepository::delete_tx(&tx, revenue_id)?,
            None => tracing::warn!(sale_id, "未找到销售对应的收入记录"),
        }

        SaleRepository::delete_tx(&tx, sale_id)?;
        tx.commit()?;

        tracing::info!(sale_id, "销售已删除");
        Ok(())
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_sale(&self, sale_id: i64) -> EngineResult<Sale> {
        self.sale_repo
            .find_by_id(sale_id)?
            .ok_or_else(|| EngineError::not_found("Sale", sale_id))
    }

    pub fn list_sales(&self) -> EngineResult<Vec<Sale>> {
        Ok(self.sale_repo.list_all()?)
    }

    pub fn list_recent_sales(&self, limit: usize) -> EngineResult<Vec<Sale>> {
        Ok(self.sale_repo.list_recent(limit)?)
    }

    pub fn list_sales_by_period(&self, period: Option<ReportPeriod>) -> EngineResult<Vec<Sale>> {
        Ok(self.sale_repo.list_by_period(period)?)
    }
}

// ==========================================
// 小微企业 ERP - SQLite 连接初始化与建库
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键必须每个连接开启）
// - 统一 busy_timeout
// - 建表 + 幂等加列迁移（已存在的列视为 no-op）
// ==========================================

use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 4;

/// 台账时间戳格式（与 SQLite CURRENT_TIMESTAMP 一致）
pub const LEDGER_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 日期格式（采购日期/出库日期）
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启，BOM 级联删除与销售 SET NULL 依赖它
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存数据库（测试 / 临时会话）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表并执行幂等迁移
///
/// 可以在任意版本的旧库上重复调用：
/// - 表不存在则创建
/// - 旧库缺少的列通过 add_column_if_missing 补齐
/// - 非法的 measurement 值统一归一为 discrete
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL CHECK(kind IN ('final', 'intermediate', 'component', 'other')),
            stock REAL NOT NULL DEFAULT 0,
            min_stock REAL NOT NULL DEFAULT 0,
            unit_cost REAL NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS bom_edges (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            parent_product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            child_product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            quantity REAL NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS sales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER REFERENCES products(id) ON DELETE SET NULL,
            product_name TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit_price REAL NOT NULL,
            total_amount REAL NOT NULL,
            date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS revenue (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT,
            amount REAL NOT NULL,
            date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS costs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT,
            amount REAL NOT NULL,
            date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    // ===== v2: 产品扩展字段 =====
    add_column_if_missing(conn, "products", "additional_cost", "REAL NOT NULL DEFAULT 0")?;
    add_column_if_missing(conn, "products", "measurement", "TEXT NOT NULL DEFAULT 'discrete'")?;
    add_column_if_missing(conn, "products", "unit_weight", "REAL NOT NULL DEFAULT 0")?;
    add_column_if_missing(conn, "products", "supplier", "TEXT")?;
    add_column_if_missing(conn, "products", "purchase_date", "TEXT")?;
    add_column_if_missing(conn, "products", "exit_date", "TEXT")?;
    add_column_if_missing(conn, "costs", "category", "TEXT DEFAULT 'Other'")?;

    // ===== v3: 销售 → 收入显式关联 =====
    add_column_if_missing(
        conn,
        "revenue",
        "source_sale_id",
        "INTEGER REFERENCES sales(id) ON DELETE SET NULL",
    )?;

    // ===== v4: 同一父件下子件唯一 =====
    merge_duplicate_bom_edges(conn)?;

    conn.execute_batch(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_products_sku ON products(sku);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_bom_parent_child
            ON bom_edges(parent_product_id, child_product_id);
        CREATE INDEX IF NOT EXISTS idx_bom_parent ON bom_edges(parent_product_id);
        CREATE INDEX IF NOT EXISTS idx_bom_child ON bom_edges(child_product_id);
        CREATE INDEX IF NOT EXISTS idx_sales_date ON sales(date);
        CREATE INDEX IF NOT EXISTS idx_revenue_source_sale ON revenue(source_sale_id);

        UPDATE products SET measurement = 'discrete'
        WHERE measurement IS NULL OR measurement NOT IN ('discrete', 'mass');
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 合并旧库中重复的 (父件, 子件) BOM 边：用量累加到 id 最小的一条，其余删除
///
/// 重复边共用同一份子件库存，保留多条会让产能按每条边分别计算
pub fn merge_duplicate_bom_edges(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        UPDATE bom_edges
        SET quantity = (
            SELECT SUM(b.quantity) FROM bom_edges b
            WHERE b.parent_product_id = bom_edges.parent_product_id
              AND b.child_product_id = bom_edges.child_product_id
        )
        WHERE id IN (
            SELECT MIN(id) FROM bom_edges
            GROUP BY parent_product_id, child_product_id
            HAVING COUNT(*) > 1
        )
        "#,
        [],
    )?;
    let removed = conn.execute(
        r#"
        DELETE FROM bom_edges
        WHERE id NOT IN (
            SELECT MIN(id) FROM bom_edges GROUP BY parent_product_id, child_product_id
        )
        "#,
        [],
    )?;
    if removed > 0 {
        tracing::warn!(removed, "schema 迁移: 合并重复 BOM 边");
    }
    Ok(removed)
}

/// 列不存在时追加；已存在则不做任何事（幂等）
///
/// # 返回
/// - Ok(true): 本次新增了该列
/// - Ok(false): 列已存在
pub fn add_column_if_missing(
    conn: &Connection,
    table: &str,
    column: &str,
    decl: &str,
) -> rusqlite::Result<bool> {
    if column_exists(conn, table, column)? {
        return Ok(false);
    }

    tracing::info!(table, column, "schema 迁移: 新增列");
    conn.execute_batch(&format!("ALTER TABLE {} ADD COLUMN {} {};", table, column, decl))?;
    Ok(true)
}

/// 检查列是否存在（PRAGMA table_info）
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> rusqlite::Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

// ==========================================
// 日期读写辅助
// ==========================================

/// 当前本地时间（台账格式）
pub fn now_ledger_timestamp() -> String {
    Local::now().naive_local().format(LEDGER_DATETIME_FORMAT).to_string()
}

/// 解析台账时间文本（兼容仅日期 / 带 T / 带小数秒）
pub fn parse_ledger_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, LEDGER_DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// 从行中读取台账时间列
pub fn row_datetime(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    parse_ledger_datetime(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("无法解析时间: {}", raw).into(),
        )
    })
}

/// 从行中读取可空日期列（无法解析的旧数据按空值处理）
pub fn row_optional_date(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    Ok(raw.and_then(|s| {
        let s = s.trim().to_string();
        NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .ok()
            .or_else(|| parse_ledger_datetime(&s).map(|dt| dt.date()))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
        assert!(column_exists(&conn, "revenue", "source_sale_id").unwrap());
    }

    #[test]
    fn test_add_existing_column_is_noop() {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let added = add_column_if_missing(&conn, "products", "unit_weight", "REAL DEFAULT 0").unwrap();
        assert!(!added);
    }

    #[test]
    fn test_legacy_table_gets_new_columns() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sku TEXT,
                name TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                stock REAL NOT NULL DEFAULT 0,
                min_stock REAL NOT NULL DEFAULT 0,
                unit_cost REAL NOT NULL DEFAULT 0
            );
            INSERT INTO products (name, kind) VALUES ('Legacy', 'final');
            "#,
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        let measurement: String = conn
            .query_row("SELECT measurement FROM products WHERE name = 'Legacy'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(measurement, "discrete");
    }

    #[test]
    fn test_duplicate_bom_edges_are_merged() {
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sku TEXT,
                name TEXT NOT NULL UNIQUE,
                kind TEXT NOT NULL,
                stock REAL NOT NULL DEFAULT 0,
                min_stock REAL NOT NULL DEFAULT 0,
                unit_cost REAL NOT NULL DEFAULT 0
            );
            CREATE TABLE bom_edges (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                child_product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                quantity REAL NOT NULL DEFAULT 1
            );
            INSERT INTO products (name, kind) VALUES ('Kit', 'final'), ('Bolt', 'component');
            INSERT INTO bom_edges (parent_product_id, child_product_id, quantity)
            VALUES (1, 2, 4), (1, 2, 3);
            "#,
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        let (count, quantity): (i64, f64) = conn
            .query_row("SELECT COUNT(*), SUM(quantity) FROM bom_edges", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(quantity, 7.0);

        let dup = conn.execute(
            "INSERT INTO bom_edges (parent_product_id, child_product_id, quantity) VALUES (1, 2, 1)",
            [],
        );
        assert!(dup.is_err());
    }

    #[test]
    fn test_parse_ledger_datetime_variants() {
        assert!(parse_ledger_datetime("2025-03-01 10:20:30").is_some());
        assert!(parse_ledger_datetime("2025-03-01T10:20:30").is_some());
        assert!(parse_ledger_datetime("2025-03-01").is_some());
        assert!(parse_ledger_datetime("01/03/2025").is_none());
    }
}

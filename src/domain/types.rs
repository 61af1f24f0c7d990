// ==========================================
// 小微企业 ERP - 领域类型定义
// ==========================================
// 产品类别 / 计量方式 / 报表周期
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 产品类别 (Product Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Final,        // 可销售成品
    Intermediate, // 半成品（内部生产/消耗）
    Component,    // 原材料
    Other,        // 非库存费用占位
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Final => "final",
            ProductKind::Intermediate => "intermediate",
            ProductKind::Component => "component",
            ProductKind::Other => "other",
        }
    }
}

impl fmt::Display for ProductKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductKind {
    type Err = String;

    /// 兼容旧库别名: hijo/padre/otro
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "final" => Ok(ProductKind::Final),
            "intermediate" | "padre" => Ok(ProductKind::Intermediate),
            "component" | "hijo" => Ok(ProductKind::Component),
            "other" | "otro" => Ok(ProductKind::Other),
            other => Err(format!("未知产品类别: {}", other)),
        }
    }
}

// ==========================================
// 计量方式 (Measurement)
// ==========================================
// discrete: 按件计数；mass: 按克计数
// 宽松策略: 任何非法/缺失输入一律视为 discrete，不报错
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    #[default]
    Discrete,
    Mass,
}

impl Measurement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Measurement::Discrete => "discrete",
            Measurement::Mass => "mass",
        }
    }

    /// 宽松解析（旧库别名 units/grams；其它一律 Discrete）
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()) {
            Some(s) if s == "mass" || s == "grams" => Measurement::Mass,
            _ => Measurement::Discrete,
        }
    }

    /// 计量单位名称（用于提示信息）
    pub fn unit_label(&self) -> &'static str {
        match self {
            Measurement::Discrete => "units",
            Measurement::Mass => "grams",
        }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 报表周期 (Report Period)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl ReportPeriod {
    /// 严格解析；未知周期返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "day" => Some(ReportPeriod::Day),
            "week" => Some(ReportPeriod::Week),
            "month" => Some(ReportPeriod::Month),
            "year" => Some(ReportPeriod::Year),
            _ => None,
        }
    }

    /// 未知周期回退为 month
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "day",
            ReportPeriod::Week => "week",
            ReportPeriod::Month => "month",
            ReportPeriod::Year => "year",
        }
    }

    pub fn parse_lenient(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }

    /// SQLite strftime 分桶格式
    pub fn strftime_format(&self) -> &'static str {
        match self {
            ReportPeriod::Day => "%Y-%m-%d",
            ReportPeriod::Week => "%Y-W%W",
            ReportPeriod::Month => "%Y-%m",
            ReportPeriod::Year => "%Y",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_accepts_legacy_aliases() {
        assert_eq!("hijo".parse::<ProductKind>().unwrap(), ProductKind::Component);
        assert_eq!("padre".parse::<ProductKind>().unwrap(), ProductKind::Intermediate);
        assert_eq!(" Final ".parse::<ProductKind>().unwrap(), ProductKind::Final);
        assert!("gadget".parse::<ProductKind>().is_err());
    }

    #[test]
    fn test_measurement_defaults_to_discrete() {
        assert_eq!(Measurement::parse_lenient(Some("mass")), Measurement::Mass);
        assert_eq!(Measurement::parse_lenient(Some("grams")), Measurement::Mass);
        assert_eq!(Measurement::parse_lenient(Some("litres")), Measurement::Discrete);
        assert_eq!(Measurement::parse_lenient(None), Measurement::Discrete);
    }

    #[test]
    fn test_period_fallback() {
        assert_eq!(ReportPeriod::parse_lenient("week"), ReportPeriod::Week);
        assert_eq!(ReportPeriod::parse_lenient("quarter"), ReportPeriod::Month);
        assert_eq!(ReportPeriod::parse("quarter"), None);
        assert_eq!(ReportPeriod::parse(" YEAR "), Some(ReportPeriod::Year));
    }
}

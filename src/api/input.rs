// ==========================================
// 小微企业 ERP - 边界输入解析
// ==========================================
// 前端传入的都是字符串/标量，这里统一转换为领域类型
// 日期: YYYY-MM-DD 或 YYYY-MM-DD HH:MM:SS，空串视为未填写
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::db::{parse_ledger_datetime, DATE_FORMAT};
use crate::domain::types::ProductKind;
use chrono::{NaiveDate, NaiveDateTime};

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// 解析台账时间（销售/收入/成本）
pub fn parse_ledger_date(field: &str, raw: Option<&str>) -> ApiResult<Option<NaiveDateTime>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(s) => parse_ledger_datetime(s).map(Some).ok_or_else(|| {
            ApiError::ValidationError(format!(
                "{} 日期格式错误: {}（期望 YYYY-MM-DD 或 YYYY-MM-DD HH:MM:SS）",
                field, s
            ))
        }),
    }
}

/// 解析日历日期（采购日期/出库日期）
pub fn parse_calendar_date(field: &str, raw: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .ok()
            .or_else(|| parse_ledger_datetime(s).map(|dt| dt.date()))
            .map(Some)
            .ok_or_else(|| {
                ApiError::ValidationError(format!(
                    "{} 日期格式错误: {}（期望 YYYY-MM-DD）",
                    field, s
                ))
            }),
    }
}

/// 解析产品类别（接受旧别名）
pub fn parse_kind(raw: &str) -> ApiResult<ProductKind> {
    raw.parse::<ProductKind>().map_err(ApiError::ValidationError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dates_are_none() {
        assert_eq!(parse_ledger_date("date", None).unwrap(), None);
        assert_eq!(parse_ledger_date("date", Some("  ")).unwrap(), None);
        assert_eq!(parse_calendar_date("purchase_date", Some("")).unwrap(), None);
    }

    #[test]
    fn test_ledger_date_accepts_both_forms() {
        let day = parse_ledger_date("date", Some("2024-03-01")).unwrap().unwrap();
        assert_eq!(day.to_string(), "2024-03-01 00:00:00");

        let full = parse_ledger_date("date", Some("2024-03-01 14:30:00"))
            .unwrap()
            .unwrap();
        assert_eq!(full.to_string(), "2024-03-01 14:30:00");
    }

    #[test]
    fn test_bad_input_is_validation_error() {
        let err = parse_ledger_date("date", Some("01/03/2024")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = parse_calendar_date("exit_date", Some("soon")).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err = parse_kind("gadget").unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(parse_kind("hijo").unwrap(), ProductKind::Component);
    }
}

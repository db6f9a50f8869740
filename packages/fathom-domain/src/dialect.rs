/// Shape facts the row-bound decision depends on, derived from the statement
/// text by the SQL gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementShape {
	/// Contains an aggregate function or a grouping clause.
	pub aggregated: bool,
	/// Carries an explicit ORDER BY.
	pub ordered: bool,
	/// Already carries a native row-limiting clause.
	pub bounded: bool,
}

/// How a target dialect bounds the row count of a statement.
pub trait DialectPolicy
where
	Self: Send + Sync,
{
	fn apply_row_bound(&self, sql: &str, shape: StatementShape, limit: u32) -> String;
}

/// Legacy dialect whose only bounding primitive is a post-hoc positional
/// filter (`ROWNUM`). Every unbounded statement is wrapped in a subquery and
/// the bound applied outside it: sharing a scope with ORDER BY would filter
/// before sorting, and appending to the text directly would attach the bound
/// to only the last arm of a set operation.
pub struct LegacyRowFilter;
impl DialectPolicy for LegacyRowFilter {
	fn apply_row_bound(&self, sql: &str, shape: StatementShape, limit: u32) -> String {
		if shape.bounded || shape.aggregated {
			return sql.to_string();
		}

		format!("SELECT * FROM ({sql}) WHERE ROWNUM <= {limit}")
	}
}

/// Modern dialects bound with a trailing `FETCH FIRST n ROWS ONLY`, which is
/// valid after an ORDER BY at the same scope.
pub struct FetchFirst;
impl DialectPolicy for FetchFirst {
	fn apply_row_bound(&self, sql: &str, shape: StatementShape, limit: u32) -> String {
		if shape.bounded || shape.aggregated {
			return sql.to_string();
		}

		format!("{sql} FETCH FIRST {limit} ROWS ONLY")
	}
}

pub fn policy_for(dialect: &str) -> Option<Box<dyn DialectPolicy>> {
	match dialect {
		"legacy-rownum" => Some(Box::new(LegacyRowFilter)),
		"fetch-first" => Some(Box::new(FetchFirst)),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn shape(aggregated: bool, ordered: bool, bounded: bool) -> StatementShape {
		StatementShape { aggregated, ordered, bounded }
	}

	#[test]
	fn legacy_wraps_ordered_statements() {
		let sql = "SELECT ORDER_NO FROM VW_SALES_FLAT ORDER BY NET_AMOUNT DESC";
		let out = LegacyRowFilter.apply_row_bound(sql, shape(false, true, false), 5);
		assert_eq!(out, format!("SELECT * FROM ({sql}) WHERE ROWNUM <= 5"));
	}

	#[test]
	fn legacy_wraps_plain_statements() {
		let out = LegacyRowFilter.apply_row_bound(
			"SELECT ORDER_NO FROM VW_SALES_FLAT",
			shape(false, false, false),
			10,
		);
		assert_eq!(out, "SELECT * FROM (SELECT ORDER_NO FROM VW_SALES_FLAT) WHERE ROWNUM <= 10");
	}

	#[test]
	fn legacy_wraps_set_operations_as_a_whole() {
		let sql = "SELECT INVOICE_NO FROM VW_AR_OPEN_ITEMS WHERE OPEN_BALANCE > 0 \
			UNION SELECT ORDER_NO FROM VW_SALES_FLAT";
		let out = LegacyRowFilter.apply_row_bound(sql, shape(false, false, false), 50);
		assert_eq!(out, format!("SELECT * FROM ({sql}) WHERE ROWNUM <= 50"));
	}

	#[test]
	fn legacy_leaves_aggregates_and_bounded_untouched() {
		let agg = "SELECT SUM(NET_AMOUNT) FROM VW_SALES_FLAT";
		assert_eq!(LegacyRowFilter.apply_row_bound(agg, shape(true, false, false), 10), agg);

		let bounded = "SELECT * FROM (SELECT ORDER_NO FROM VW_SALES_FLAT) WHERE ROWNUM <= 3";
		assert_eq!(
			LegacyRowFilter.apply_row_bound(bounded, shape(false, false, true), 10),
			bounded
		);
	}

	#[test]
	fn legacy_leaves_ordered_aggregates_untouched() {
		let sql = "SELECT REGION, SUM(NET_AMOUNT) FROM VW_SALES_FLAT GROUP BY REGION ORDER BY 2";
		assert_eq!(LegacyRowFilter.apply_row_bound(sql, shape(true, true, false), 10), sql);
	}

	#[test]
	fn legacy_leaves_ordered_bounded_statements_untouched() {
		let sql = "SELECT * FROM (SELECT ORDER_NO FROM VW_SALES_FLAT ORDER BY ORDER_NO) WHERE ROWNUM <= 3";
		assert_eq!(LegacyRowFilter.apply_row_bound(sql, shape(false, true, true), 10), sql);
	}

	#[test]
	fn fetch_first_appends_after_order_by() {
		let out = FetchFirst.apply_row_bound(
			"SELECT ORDER_NO FROM VW_SALES_FLAT ORDER BY SALE_DATE",
			shape(false, true, false),
			7,
		);
		assert_eq!(out, "SELECT ORDER_NO FROM VW_SALES_FLAT ORDER BY SALE_DATE FETCH FIRST 7 ROWS ONLY");
	}

	#[test]
	fn unknown_dialect_has_no_policy() {
		assert!(policy_for("tsql").is_none());
		assert!(policy_for("legacy-rownum").is_some());
		assert!(policy_for("fetch-first").is_some());
	}
}

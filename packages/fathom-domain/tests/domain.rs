use fathom_domain::{
	catalog::Catalog,
	cipher::ContentCipher,
	clearance::{self, CallerContext},
	dialect::{FetchFirst, LegacyRowFilter, policy_for},
	sensitivity::{Classifier, Sensitivity},
	sqlgate::{self, Rejection},
};

fn caller(clearance: &str) -> CallerContext {
	CallerContext {
		id: "u-42".to_string(),
		display_name: Some("Ana".to_string()),
		clearance: clearance.to_string(),
		enabled: true,
		admin: false,
		department: Some("finance".to_string()),
	}
}

#[test]
fn classification_feeds_authorization() {
	let classifier = Classifier::new();
	let c = classifier.classify("Which customer name has the largest overdue balance?");

	assert_eq!(c.tier, Sensitivity::High);
	assert!(!clearance::authorize(c.tier, Some(&caller("medium"))));
	assert!(clearance::authorize(c.tier, Some(&caller("high"))));
}

#[test]
fn aggregate_questions_stay_open() {
	let classifier = Classifier::new();
	let c = classifier.classify("Total sales by region this month");

	assert_eq!(c.tier, Sensitivity::Low);
	assert!(clearance::authorize(c.tier, None));
}

#[test]
fn unmatched_question_defaults_to_medium() {
	let classifier = Classifier::new();
	let c = classifier.classify("tell me something interesting");

	assert_eq!(c.tier, Sensitivity::Medium);
	assert!(c.confidence < 0.5);
	assert!(!clearance::authorize(c.tier, None));
}

#[test]
fn legacy_dialect_wraps_ordered_queries() {
	let catalog = Catalog::standard();
	let sql = "SELECT ORDER_NO, NET_AMOUNT FROM REPORTING.VW_SALES_FLAT ORDER BY NET_AMOUNT DESC";
	let validated = sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50).unwrap();

	assert_eq!(validated.as_sql(), format!("SELECT * FROM ({sql}) WHERE ROWNUM <= 50"));
}

#[test]
fn legacy_dialect_wraps_filtered_queries() {
	let catalog = Catalog::standard();
	let sql = "SELECT INVOICE_NO FROM VW_AR_OPEN_ITEMS WHERE OPEN_BALANCE > 0";
	let validated = sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50).unwrap();

	assert_eq!(validated.as_sql(), format!("SELECT * FROM ({sql}) WHERE ROWNUM <= 50"));
}

#[test]
fn legacy_dialect_wraps_plain_queries() {
	let catalog = Catalog::standard();
	let sql = "SELECT INVOICE_NO FROM VW_AR_OPEN_ITEMS";
	let validated = sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50).unwrap();

	assert_eq!(validated.as_sql(), format!("SELECT * FROM ({sql}) WHERE ROWNUM <= 50"));
}

#[test]
fn legacy_dialect_bounds_every_arm_of_a_union() {
	let catalog = Catalog::standard();
	let sql = "SELECT INVOICE_NO FROM VW_AR_OPEN_ITEMS WHERE OPEN_BALANCE > 0 \
		UNION SELECT ORDER_NO FROM VW_SALES_FLAT";
	let validated = sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50).unwrap();

	// The bound must cover the whole set operation, not attach to the last
	// arm as a dangling AND.
	assert_eq!(validated.as_sql(), format!("SELECT * FROM ({sql}) WHERE ROWNUM <= 50"));
	assert!(!validated.as_sql().contains("FLAT AND ROWNUM"));
}

#[test]
fn aggregates_are_never_row_bounded() {
	let catalog = Catalog::standard();
	let sql = "SELECT REGION, SUM(NET_AMOUNT) FROM VW_SALES_FLAT GROUP BY REGION";

	for dialect in ["legacy-rownum", "fetch-first"] {
		let policy = policy_for(dialect).unwrap();
		let validated = sqlgate::validate(sql, &catalog, policy.as_ref(), 50).unwrap();

		assert_eq!(validated.as_sql(), sql, "dialect {dialect} altered an aggregate");
	}
}

#[test]
fn already_bounded_queries_pass_through() {
	let catalog = Catalog::standard();
	let sql = "SELECT * FROM (SELECT ORDER_NO FROM VW_SALES_FLAT) WHERE ROWNUM <= 5";
	let validated = sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50).unwrap();

	assert_eq!(validated.as_sql(), sql);
}

#[test]
fn fetch_first_dialect_appends_after_order_by() {
	let catalog = Catalog::standard();
	let sql = "SELECT ORDER_NO FROM VW_SALES_FLAT ORDER BY SALE_DATE DESC";
	let validated = sqlgate::validate(sql, &catalog, &FetchFirst, 25).unwrap();

	assert_eq!(validated.as_sql(), format!("{sql} FETCH FIRST 25 ROWS ONLY"));
}

#[test]
fn rejects_writes_and_ddl() {
	let catalog = Catalog::standard();

	for sql in [
		"UPDATE VW_SALES_FLAT SET NET_AMOUNT = 0",
		"DELETE FROM VW_SALES_FLAT",
		"DROP TABLE VW_SALES_FLAT",
	] {
		match sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50) {
			Err(Rejection::NotReadOnly | Rejection::ForbiddenKeyword(_)) => {},
			other => panic!("{sql} produced {other:?}"),
		}
	}
}

#[test]
fn rejects_chained_statements() {
	let catalog = Catalog::standard();
	let sql = "SELECT ORDER_NO FROM VW_SALES_FLAT; DELETE FROM VW_SALES_FLAT";

	assert_eq!(
		sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50),
		Err(Rejection::MultipleStatements)
	);
}

#[test]
fn rejects_database_links_and_select_into() {
	let catalog = Catalog::standard();

	assert_eq!(
		sqlgate::validate(
			"SELECT ORDER_NO FROM VW_SALES_FLAT@REMOTE",
			&catalog,
			&LegacyRowFilter,
			50
		),
		Err(Rejection::DatabaseLink)
	);
	assert_eq!(
		sqlgate::validate(
			"SELECT ORDER_NO INTO V_ORDER FROM VW_SALES_FLAT",
			&catalog,
			&LegacyRowFilter,
			50
		),
		Err(Rejection::SelectInto)
	);
}

#[test]
fn rejects_procedural_blocks_but_allows_case() {
	let catalog = Catalog::standard();

	assert!(matches!(
		sqlgate::validate("SELECT 1 FROM VW_SALES_FLAT BEGIN NULL", &catalog, &LegacyRowFilter, 50),
		Err(Rejection::ForbiddenKeyword(_))
	));
	assert!(
		sqlgate::validate(
			"SELECT CASE WHEN NET_AMOUNT > 0 THEN 1 ELSE 0 END FROM VW_SALES_FLAT",
			&catalog,
			&LegacyRowFilter,
			50
		)
		.is_ok()
	);
}

#[test]
fn rejects_objects_outside_the_catalog() {
	let catalog = Catalog::standard();

	assert_eq!(
		sqlgate::validate("SELECT * FROM ALL_USERS", &catalog, &LegacyRowFilter, 50),
		Err(Rejection::ObjectNotAllowed("ALL_USERS".to_string()))
	);
	// Subquery targets are checked too; only the parenthetical internals
	// collapse away after they pass.
	assert_eq!(
		sqlgate::validate(
			"SELECT * FROM (SELECT ORDER_NO FROM VW_SALES_FLAT) A JOIN HR.EMPLOYEES B ON 1 = 1",
			&catalog,
			&LegacyRowFilter,
			50
		),
		Err(Rejection::ObjectNotAllowed("HR.EMPLOYEES".to_string()))
	);
}

#[test]
fn keywords_inside_literals_do_not_reject() {
	let catalog = Catalog::standard();
	let sql = "SELECT ORDER_NO FROM VW_SALES_FLAT WHERE REGION = 'SP - DELETE ZONE'";

	assert!(sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50).is_ok());
}

#[test]
fn comments_are_stripped_before_analysis() {
	let catalog = Catalog::standard();
	let sql = "SELECT ORDER_NO -- top orders\nFROM VW_SALES_FLAT /* read only */";
	let validated = sqlgate::validate(sql, &catalog, &LegacyRowFilter, 50).unwrap();

	assert!(!validated.as_sql().contains("--"));
	assert!(validated.as_sql().ends_with("WHERE ROWNUM <= 50"));
}

#[test]
fn empty_statement_is_rejected() {
	let catalog = Catalog::standard();

	assert_eq!(
		sqlgate::validate("   ", &catalog, &LegacyRowFilter, 50),
		Err(Rejection::Empty)
	);
	assert_eq!(
		sqlgate::validate("-- nothing here", &catalog, &LegacyRowFilter, 50),
		Err(Rejection::Empty)
	);
}

#[test]
fn cipher_round_trip_survives_transport_encoding() {
	let cipher = ContentCipher::new(&[3_u8; 32]).unwrap();
	let sealed = cipher.encrypt("refund policy: 30 days").unwrap();

	assert!(sealed.len() > 28);
	assert_eq!(cipher.decrypt(&sealed).unwrap(), "refund policy: 30 days");
}

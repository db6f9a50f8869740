//! Static description of the queryable warehouse views. The catalog is the
//! single source for both the generator prompt and the validator allow-list.

pub struct ColumnDef {
	pub name: &'static str,
	pub sql_type: &'static str,
	pub description: &'static str,
	pub notes: Option<&'static str>,
}

pub struct ViewDef {
	pub schema: &'static str,
	pub name: &'static str,
	pub description: &'static str,
	pub columns: &'static [ColumnDef],
}
impl ViewDef {
	pub fn qualified_name(&self) -> String {
		format!("{}.{}", self.schema, self.name)
	}
}

pub struct Catalog {
	views: &'static [ViewDef],
}

const SALES_COLUMNS: &[ColumnDef] = &[
	ColumnDef {
		name: "ORDER_NO",
		sql_type: "NUMBER",
		description: "Sales order number",
		notes: None,
	},
	ColumnDef {
		name: "CUSTOMER_NAME",
		sql_type: "VARCHAR2",
		description: "Full customer name",
		notes: Some("Filter with UPPER(CUSTOMER_NAME) LIKE '%VALUE%'"),
	},
	ColumnDef {
		name: "SALES_REP",
		sql_type: "VARCHAR2",
		description: "Full name of the commercial representative",
		notes: Some("Filter with UPPER(SALES_REP) LIKE '%VALUE%'"),
	},
	ColumnDef {
		name: "NET_AMOUNT",
		sql_type: "NUMBER",
		description: "Net sale amount after discounts",
		notes: None,
	},
	ColumnDef {
		name: "GROSS_AMOUNT",
		sql_type: "NUMBER",
		description: "Gross sale amount before discounts",
		notes: None,
	},
	ColumnDef {
		name: "SALE_DATE",
		sql_type: "DATE",
		description: "Date the sale was entered",
		notes: Some("Use TRUNC() when comparing dates"),
	},
	ColumnDef {
		name: "REGION",
		sql_type: "VARCHAR2",
		description: "Commercial region, formatted 'STATE - NAME details'",
		notes: Some("Filter with UPPER(REGION) LIKE 'SP - %', never '%SP%'"),
	},
	ColumnDef {
		name: "CUSTOMER_TAX_ID",
		sql_type: "VARCHAR2",
		description: "Customer tax identification number",
		notes: None,
	},
	ColumnDef {
		name: "COMPANY",
		sql_type: "VARCHAR2",
		description: "Selling company unit",
		notes: None,
	},
];

const PAYABLES_COLUMNS: &[ColumnDef] = &[
	ColumnDef {
		name: "VOUCHER_NO",
		sql_type: "NUMBER",
		description: "Payable voucher number",
		notes: None,
	},
	ColumnDef {
		name: "SUPPLIER_NAME",
		sql_type: "VARCHAR2",
		description: "Full supplier name",
		notes: Some("Filter with UPPER(SUPPLIER_NAME) LIKE '%VALUE%'"),
	},
	ColumnDef {
		name: "OPEN_BALANCE",
		sql_type: "NUMBER",
		description: "Remaining amount to pay",
		notes: Some("Open items have OPEN_BALANCE > 0"),
	},
	ColumnDef {
		name: "DUE_DATE",
		sql_type: "DATE",
		description: "Payment due date",
		notes: Some("Use TRUNC() when comparing dates"),
	},
	ColumnDef {
		name: "EXPENSE_GROUP",
		sql_type: "VARCHAR2",
		description: "Expense group label",
		notes: None,
	},
	ColumnDef {
		name: "EXPENSE_SUBGROUP",
		sql_type: "VARCHAR2",
		description: "Expense subgroup label",
		notes: None,
	},
];

const RECEIVABLES_COLUMNS: &[ColumnDef] = &[
	ColumnDef {
		name: "INVOICE_NO",
		sql_type: "NUMBER",
		description: "Receivable invoice number",
		notes: None,
	},
	ColumnDef {
		name: "CUSTOMER_NAME",
		sql_type: "VARCHAR2",
		description: "Full customer name",
		notes: Some("Filter with UPPER(CUSTOMER_NAME) LIKE '%VALUE%'"),
	},
	ColumnDef {
		name: "OPEN_BALANCE",
		sql_type: "NUMBER",
		description: "Remaining amount to collect",
		notes: Some("Open items have OPEN_BALANCE > 0"),
	},
	ColumnDef {
		name: "DUE_DATE",
		sql_type: "DATE",
		description: "Collection due date",
		notes: Some("Use TRUNC() when comparing dates"),
	},
];

const VIEWS: &[ViewDef] = &[
	ViewDef {
		schema: "REPORTING",
		name: "VW_SALES_FLAT",
		description: "Flattened sales orders for the last 730 days",
		columns: SALES_COLUMNS,
	},
	ViewDef {
		schema: "REPORTING",
		name: "VW_AP_OPEN_ITEMS",
		description: "Accounts-payable vouchers, open and settled",
		columns: PAYABLES_COLUMNS,
	},
	ViewDef {
		schema: "REPORTING",
		name: "VW_AR_OPEN_ITEMS",
		description: "Accounts-receivable invoices, open and settled",
		columns: RECEIVABLES_COLUMNS,
	},
];

impl Catalog {
	pub fn standard() -> Self {
		Self { views: VIEWS }
	}

	pub fn views(&self) -> &[ViewDef] {
		self.views
	}

	/// True when the referenced object is one of the catalog views, bare or
	/// schema-qualified.
	pub fn is_allowed(&self, object: &str) -> bool {
		let upper = object.trim().to_uppercase();

		self.views.iter().any(|view| {
			upper == view.name
				|| upper == view.qualified_name()
				|| upper.ends_with(&format!(".{}", view.name))
		})
	}

	/// Renders the catalog as plain text for the generator prompt.
	pub fn render_for_prompt(&self) -> String {
		let mut out = String::new();

		for view in self.views {
			out.push_str(&format!("VIEW {} - {}\n", view.qualified_name(), view.description));

			for column in view.columns {
				out.push_str(&format!(
					"  {} ({}): {}",
					column.name, column.sql_type, column.description
				));

				if let Some(notes) = column.notes {
					out.push_str(&format!(". {notes}"));
				}

				out.push('\n');
			}

			out.push('\n');
		}

		out
	}
}

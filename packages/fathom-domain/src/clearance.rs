use serde::{Deserialize, Serialize};

use crate::sensitivity::Sensitivity;

// The permission store hands clearance over as free text; parsing degrades to
// the lowest tier rather than failing the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerContext {
	pub id: String,
	pub display_name: Option<String>,
	pub clearance: String,
	pub enabled: bool,
	pub admin: bool,
	pub department: Option<String>,
}
impl CallerContext {
	pub fn clearance_tier(&self) -> Sensitivity {
		Sensitivity::parse(&self.clearance).unwrap_or(Sensitivity::Low)
	}
}

/// Ordered-tier comparison. No caller context authorizes only the lowest
/// tier; disabled callers are treated the same as absent context.
pub fn authorize(required: Sensitivity, caller: Option<&CallerContext>) -> bool {
	let Some(caller) = caller else {
		return required == Sensitivity::Low;
	};

	if !caller.enabled {
		return required == Sensitivity::Low;
	}

	caller.clearance_tier().rank() >= required.rank()
}

pub fn denial_message(required: Sensitivity) -> &'static str {
	match required {
		Sensitivity::Low => "This question requires basic data access.",
		Sensitivity::Medium => "This question requires access to transactional data.",
		Sensitivity::High => "This question requires access to sensitive personal data.",
	}
}

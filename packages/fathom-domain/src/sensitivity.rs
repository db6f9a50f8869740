use regex::Regex;
use serde::{Deserialize, Serialize};

/// Data-sensitivity tier of a question, ordered from least to most exposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
	/// Aggregated or public figures.
	Low,
	/// Transactional records without personal identifiers.
	Medium,
	/// Personal data: names, contacts, tax ids.
	High,
}
impl Sensitivity {
	pub fn rank(self) -> u8 {
		match self {
			Self::Low => 0,
			Self::Medium => 1,
			Self::High => 2,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_lowercase().as_str() {
			"low" => Some(Self::Low),
			"medium" => Some(Self::Medium),
			"high" => Some(Self::High),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
	pub tier: Sensitivity,
	pub confidence: f32,
	pub rationale: String,
}
impl Classification {
	pub fn is_sensitive(&self) -> bool {
		matches!(self.tier, Sensitivity::Medium | Sensitivity::High)
	}
}

struct RuleTier {
	tier: Sensitivity,
	base_confidence: f32,
	confidence_cap: f32,
	rationale: &'static str,
	patterns: Vec<Regex>,
}

/// Pattern-based sensitivity classifier. Rules are ordered most restrictive
/// first; the first tier with at least one match wins.
pub struct Classifier {
	tiers: Vec<RuleTier>,
}

const HIGH_PATTERNS: &[&str] = &[
	r"\bcustomer\s+name\b",
	r"\bcustomer\s+[A-Za-z]\w+",
	r"\bwho\s+(bought|purchased|sold|paid)\b",
	r"\bperson\b",
	r"\bcontact\b",
	r"\bphone\b",
	r"\be-?mail\b",
	r"\btax\s+id\b",
	r"\bsupplier\s+name\b",
	r"\bsupplier\s+[A-Za-z]\w+",
	r"\brepresentative\s+name\b",
	r"\baddress\b",
];

const MEDIUM_PATTERNS: &[&str] = &[
	r"\border\s+\d+",
	r"\border\s+number\b",
	r"\binvoice\b",
	r"\bvoucher\b",
	r"\b(net|gross|total)\s+(amount|value)\b",
	r"\btransaction\b",
	r"\bpayment\b",
	r"\bpayables?\b",
	r"\breceivables?\b",
	r"\bdue\s+(date|today|this)\b",
	r"\b(fall|falls|falling)\s+due\b",
	r"\boverdue\b",
	r"\bopen\s+(items?|balance)\b",
	r"\boutstanding\s+balance\b",
	r"\bexpenses?\b",
	r"\bexpense\s+(group|subgroup)\b",
	r"\bsuppliers\b",
];

const LOW_PATTERNS: &[&str] = &[
	r"\btotal\s+sales\b",
	r"\branking\b",
	r"\baggregated?\b",
	r"\baverage\b",
	r"\bsum\b",
	r"\bcount\b",
	r"\breport\b",
	r"\bstatistics?\b",
	r"\bregion\b",
];

impl Classifier {
	pub fn new() -> Self {
		Self {
			tiers: vec![
				RuleTier {
					tier: Sensitivity::High,
					base_confidence: 0.7,
					confidence_cap: 1.0,
					rationale: "personal data identifiers",
					patterns: compile(HIGH_PATTERNS),
				},
				RuleTier {
					tier: Sensitivity::Medium,
					base_confidence: 0.6,
					confidence_cap: 0.95,
					rationale: "transactional data",
					patterns: compile(MEDIUM_PATTERNS),
				},
				RuleTier {
					tier: Sensitivity::Low,
					base_confidence: 0.5,
					confidence_cap: 0.9,
					rationale: "aggregated or public data",
					patterns: compile(LOW_PATTERNS),
				},
			],
		}
	}

	pub fn classify(&self, question: &str) -> Classification {
		if question.trim().is_empty() {
			// Ambiguous input is treated as sensitive, never as public.
			return Classification {
				tier: Sensitivity::Medium,
				confidence: 0.3,
				rationale: "empty question, defaulting to medium".to_string(),
			};
		}

		let lowered = question.to_lowercase();

		for rule in &self.tiers {
			let matches = rule.patterns.iter().filter(|p| p.is_match(&lowered)).count();

			if matches > 0 {
				let confidence = (rule.base_confidence + matches as f32 * 0.1)
					.min(rule.confidence_cap);

				return Classification {
					tier: rule.tier,
					confidence,
					rationale: format!("{} ({matches} match(es))", rule.rationale),
				};
			}
		}

		Classification {
			tier: Sensitivity::Medium,
			confidence: 0.4,
			rationale: "no clear pattern match, defaulting to medium".to_string(),
		}
	}
}
impl Default for Classifier {
	fn default() -> Self {
		Self::new()
	}
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
	patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn personal_identifiers_classify_high() {
		let classifier = Classifier::new();
		let c = classifier.classify("What is the phone and email of customer Acme?");
		assert_eq!(c.tier, Sensitivity::High);
		assert!(c.confidence >= 0.7);
	}

	#[test]
	fn transactional_terms_classify_medium() {
		let classifier = Classifier::new();
		let c = classifier.classify("Which payables fall due on the 24th?");
		assert_eq!(c.tier, Sensitivity::Medium);
	}

	#[test]
	fn aggregates_classify_low() {
		let classifier = Classifier::new();
		let c = classifier.classify("Total sales by region this month");
		assert_eq!(c.tier, Sensitivity::Low);
	}

	#[test]
	fn high_wins_over_medium_when_both_match() {
		let classifier = Classifier::new();
		let c = classifier.classify("Which customer name has the largest overdue invoice?");
		assert_eq!(c.tier, Sensitivity::High);
	}

	#[test]
	fn unmatched_question_defaults_to_medium() {
		let classifier = Classifier::new();
		let c = classifier.classify("tell me something interesting");
		assert_eq!(c.tier, Sensitivity::Medium);
		assert!(c.confidence < 0.5);
	}

	#[test]
	fn empty_question_defaults_to_medium() {
		let classifier = Classifier::new();
		let c = classifier.classify("   ");
		assert_eq!(c.tier, Sensitivity::Medium);
		assert!((c.confidence - 0.3).abs() < f32::EPSILON);
	}

	#[test]
	fn confidence_scales_with_match_count() {
		let classifier = Classifier::new();
		let one = classifier.classify("overdue items");
		let many = classifier.classify("overdue payables with open balance and due date");
		assert!(many.confidence > one.confidence);
	}
}

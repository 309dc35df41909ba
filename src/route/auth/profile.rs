use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::Serialize;

use super::{model::CoffeeProfile, Error};

pub const MAX_ANSWER_LENGTH: usize = 500;

/// The four fixed groups of coffee profile questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
	Basics,
	Personality,
	Taste,
	Vibe,
}

impl Category {
	pub const ALL: [Self; 4] = [Self::Basics, Self::Personality, Self::Taste, Self::Vibe];

	pub fn name(self) -> &'static str {
		match self {
			Self::Basics => "basics",
			Self::Personality => "personality",
			Self::Taste => "taste",
			Self::Vibe => "vibe",
		}
	}
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct Question {
	pub category: Category,
	/// The key answers are stored under.
	pub key: &'static str,
	pub prompt: &'static str,
}

const fn question(category: Category, key: &'static str, prompt: &'static str) -> Question {
	Question {
		category,
		key,
		prompt,
	}
}

pub const QUESTIONS: &[Question] = &[
	question(Category::Basics, "usual_order", "What do you usually order?"),
	question(Category::Basics, "cups_per_day", "How many cups a day?"),
	question(Category::Basics, "home_brew", "How do you brew at home?"),
	question(Category::Personality, "morning_or_night", "Morning person or night owl?"),
	question(Category::Personality, "cafe_activity", "What do you do at a cafe?"),
	question(Category::Personality, "ideal_company", "Who do you bring along?"),
	question(Category::Taste, "roast", "Light, medium or dark roast?"),
	question(Category::Taste, "milk", "Milk of choice?"),
	question(Category::Taste, "sweetness", "How sweet do you take it?"),
	question(Category::Taste, "origin", "Favourite bean origin?"),
	question(Category::Vibe, "atmosphere", "Busy and buzzing or quiet corner?"),
	question(Category::Vibe, "music", "What should be playing?"),
	question(Category::Vibe, "dream_cafe", "Describe your dream cafe."),
];

fn is_known(category: Category, key: &str) -> bool {
	QUESTIONS
		.iter()
		.any(|question| question.category == category && question.key == key)
}

impl CoffeeProfile {
	fn answers_mut(&mut self, category: Category) -> &mut BTreeMap<String, String> {
		match category {
			Category::Basics => &mut self.basics,
			Category::Personality => &mut self.personality,
			Category::Taste => &mut self.taste,
			Category::Vibe => &mut self.vibe,
		}
	}

	/// Trims every answer and drops blank ones, rejecting answers to unknown
	/// questions and answers that are too long.
	pub fn normalize(mut self) -> Result<Self, Error> {
		for category in Category::ALL {
			let answers = std::mem::take(self.answers_mut(category));
			let mut kept = BTreeMap::new();

			for (key, answer) in answers {
				if !is_known(category, &key) {
					return Err(Error::UnknownQuestion {
						category: category.name(),
						key,
					});
				}

				let answer = answer.trim();

				if answer.chars().count() > MAX_ANSWER_LENGTH {
					return Err(Error::AnswerTooLong(key));
				}

				if !answer.is_empty() {
					kept.insert(key, answer.to_owned());
				}
			}

			*self.answers_mut(category) = kept;
		}

		Ok(self)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn profile(category: Category, key: &str, answer: &str) -> CoffeeProfile {
		let mut profile = CoffeeProfile::default();
		profile
			.answers_mut(category)
			.insert(key.into(), answer.into());
		profile
	}

	#[test]
	fn test_catalog_covers_every_category() {
		for category in Category::ALL {
			assert!(QUESTIONS.iter().any(|q| q.category == category));
		}
	}

	#[test]
	fn test_normalize_trims_and_drops_blank() {
		let mut input = profile(Category::Taste, "roast", "  dark  ");
		input.basics.insert("usual_order".into(), "   ".into());

		let profile = input.normalize().unwrap();

		assert_eq!(profile.taste["roast"], "dark");
		assert!(profile.basics.is_empty());
	}

	#[test]
	fn test_normalize_rejects_unknown_question() {
		// a known key in the wrong category is still unknown
		let result = profile(Category::Vibe, "roast", "dark").normalize();

		assert!(matches!(
			result,
			Err(Error::UnknownQuestion { category: "vibe", .. })
		));
	}

	#[test]
	fn test_normalize_rejects_long_answer() {
		let answer = "a".repeat(MAX_ANSWER_LENGTH + 1);
		let result = profile(Category::Vibe, "music", &answer).normalize();

		assert!(matches!(result, Err(Error::AnswerTooLong(key)) if key == "music"));
	}
}

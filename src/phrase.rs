// Short query prefixes mapped to the phrase handed to the date parser.
const ABBREVIATIONS: [(&str, &str); 10] = [
	("tod", "Today"),
	("tom", "Tomorrow"),
	("yes", "Yesterday"),
	("mon", "Monday"),
	("tue", "Tuesday"),
	("wed", "Wednesday"),
	("thu", "Thursday"),
	("fri", "Friday"),
	("sat", "Saturday"),
	("sun", "Sunday"),
];

/// Rewrite a query whose first three characters name a day into its canonical
/// phrase ("tod" -> "Today", "monday" -> "Monday"). Anything else passes through.
pub fn normalize(query: &str) -> String {
	let lower = query.to_lowercase();
	for (prefix, phrase) in ABBREVIATIONS {
		if lower.starts_with(prefix) {
			return phrase.to_string();
		}
	}
	query.to_string()
}

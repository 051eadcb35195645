use chrono::{Datelike, Days, Local, Months, NaiveDate, Weekday};

use crate::host::DateParser;

/// Natural-language day recognition anchored at a reference day.
///
/// Understands `today`, `tomorrow`, `yesterday`, weekday names (closest
/// occurrence, with `this`/`next`/`last`), `next week`, `in 3 days`,
/// `2 weeks ago` and ISO dates. Whole phrase only; no match means `None`.
#[derive(Debug, Clone, Copy)]
pub struct NaturalDates {
	today: NaiveDate,
}

impl NaturalDates {
	pub fn new(today: NaiveDate) -> Self {
		Self { today }
	}

	pub fn local() -> Self {
		Self::new(Local::now().date_naive())
	}
}

impl DateParser for NaturalDates {
	fn parse(&self, phrase: &str) -> Option<NaiveDate> {
		let lower = phrase.trim().to_lowercase();
		let words: Vec<&str> = lower.split_whitespace().collect();
		let today = self.today;
		match words.as_slice() {
			[] => None,
			["today"] | ["now"] => Some(today),
			["tomorrow"] => today.succ_opt(),
			["yesterday"] => today.pred_opt(),
			[single] => parse_weekday(single).map(|wd| closest_weekday(today, wd)).or_else(|| parse_iso(single)),
			["this", day] => parse_weekday(day).map(|wd| closest_weekday(today, wd)),
			["next", "week"] => today.checked_add_days(Days::new(7)),
			["last", "week"] => today.checked_sub_days(Days::new(7)),
			["next", "month"] => today.checked_add_months(Months::new(1)),
			["last", "month"] => today.checked_sub_months(Months::new(1)),
			["next", day] => parse_weekday(day).map(|wd| {
				let ahead = days_forward(today, wd);
				today + Days::new(if ahead == 0 { 7 } else { ahead })
			}),
			["last", day] => parse_weekday(day).map(|wd| {
				let back = days_backward(today, wd);
				today - Days::new(if back == 0 { 7 } else { back })
			}),
			["in", n, unit] => offset(today, n, unit, true),
			[n, unit, "ago"] => offset(today, n, unit, false),
			_ => None,
		}
	}
}

fn parse_weekday(word: &str) -> Option<Weekday> {
	match word {
		"mon" | "monday" => Some(Weekday::Mon),
		"tue" | "tues" | "tuesday" => Some(Weekday::Tue),
		"wed" | "wednesday" => Some(Weekday::Wed),
		"thu" | "thurs" | "thursday" => Some(Weekday::Thu),
		"fri" | "friday" => Some(Weekday::Fri),
		"sat" | "saturday" => Some(Weekday::Sat),
		"sun" | "sunday" => Some(Weekday::Sun),
		_ => None,
	}
}

fn parse_iso(word: &str) -> Option<NaiveDate> {
	NaiveDate::parse_from_str(word, "%Y-%m-%d")
		.or_else(|_| NaiveDate::parse_from_str(word, "%Y/%m/%d"))
		.ok()
}

fn days_forward(from: NaiveDate, wd: Weekday) -> u64 {
	let diff = wd.num_days_from_monday() as i64 - from.weekday().num_days_from_monday() as i64;
	diff.rem_euclid(7) as u64
}

fn days_backward(from: NaiveDate, wd: Weekday) -> u64 {
	(7 - days_forward(from, wd)) % 7
}

// Whichever occurrence is nearer; the same weekday means today.
fn closest_weekday(from: NaiveDate, wd: Weekday) -> NaiveDate {
	let ahead = days_forward(from, wd);
	let back = days_backward(from, wd);
	if ahead <= back { from + Days::new(ahead) } else { from - Days::new(back) }
}

fn offset(from: NaiveDate, amount: &str, unit: &str, forward: bool) -> Option<NaiveDate> {
	let n: u32 = match amount {
		"a" | "an" | "one" => 1,
		other => other.parse().ok()?,
	};
	match unit.trim_end_matches('s') {
		"day" => {
			let d = Days::new(n as u64);
			if forward { from.checked_add_days(d) } else { from.checked_sub_days(d) }
		}
		"week" => {
			let d = Days::new(n as u64 * 7);
			if forward { from.checked_add_days(d) } else { from.checked_sub_days(d) }
		}
		"month" => {
			let m = Months::new(n);
			if forward { from.checked_add_months(m) } else { from.checked_sub_months(m) }
		}
		_ => None,
	}
}

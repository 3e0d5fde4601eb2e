use time::{Date, Duration, Month};

use super::repo_types::Contact;

/// Days after today still counted as upcoming (inclusive).
pub const WINDOW_DAYS: i64 = 7;

/// The birthday's month/day placed in `year`. Feb 29 falls back to Feb 28.
fn in_year(birthday: Date, year: i32) -> Date {
    Date::from_calendar_date(year, birthday.month(), birthday.day())
        .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
        .unwrap_or(birthday)
}

/// First anniversary of `birthday` on or after `today`.
pub fn next_occurrence(birthday: Date, today: Date) -> Date {
    let this_year = in_year(birthday, today.year());
    if this_year >= today {
        this_year
    } else {
        in_year(birthday, today.year() + 1)
    }
}

/// Contacts whose next birthday is within `[today, today + WINDOW_DAYS]`,
/// soonest first.
pub fn upcoming(contacts: Vec<Contact>, today: Date) -> Vec<Contact> {
    let end = today + Duration::days(WINDOW_DAYS);
    let mut hits: Vec<(Date, Contact)> = contacts
        .into_iter()
        .map(|c| (next_occurrence(c.birthday, today), c))
        .filter(|(next, _)| *next <= end)
        .collect();
    hits.sort_by_key(|(next, _)| *next);
    hits.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use uuid::Uuid;

    fn contact(name: &str, birthday: Date) -> Contact {
        Contact {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            first_name: name.into(),
            last_name: "Test".into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555".into(),
            birthday,
            additional_info: None,
        }
    }

    fn names(cs: &[Contact]) -> Vec<&str> {
        cs.iter().map(|c| c.first_name.as_str()).collect()
    }

    #[test]
    fn next_occurrence_this_year_or_next() {
        let today = date!(2025 - 06 - 15);
        assert_eq!(next_occurrence(date!(1990 - 06 - 20), today), date!(2025 - 06 - 20));
        assert_eq!(next_occurrence(date!(1990 - 06 - 15), today), date!(2025 - 06 - 15));
        assert_eq!(next_occurrence(date!(1990 - 06 - 14), today), date!(2026 - 06 - 14));
    }

    #[test]
    fn leap_day_birthdays_move_to_feb_28() {
        assert_eq!(
            next_occurrence(date!(2000 - 02 - 29), date!(2025 - 02 - 01)),
            date!(2025 - 02 - 28)
        );
        assert_eq!(
            next_occurrence(date!(2000 - 02 - 29), date!(2028 - 02 - 01)),
            date!(2028 - 02 - 29)
        );
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let today = date!(2025 - 06 - 15);
        let cs = vec![
            contact("Yesterday", date!(1980 - 06 - 14)),
            contact("Today", date!(1980 - 06 - 15)),
            contact("Seventh", date!(1980 - 06 - 22)),
            contact("Eighth", date!(1980 - 06 - 23)),
        ];
        assert_eq!(names(&upcoming(cs, today)), vec!["Today", "Seventh"]);
    }

    #[test]
    fn window_wraps_into_next_year() {
        let today = date!(2025 - 12 - 28);
        let cs = vec![
            contact("NewYear", date!(1991 - 01 - 02)),
            contact("Passed", date!(1991 - 12 - 27)),
            contact("Eve", date!(1991 - 12 - 31)),
            contact("TooLate", date!(1991 - 01 - 05)),
        ];
        assert_eq!(names(&upcoming(cs, today)), vec!["Eve", "NewYear"]);
    }

    #[test]
    fn birth_year_does_not_matter() {
        let today = date!(2025 - 03 - 01);
        let cs = vec![
            contact("Old", date!(1925 - 03 - 03)),
            contact("Young", date!(2024 - 03 - 02)),
        ];
        assert_eq!(names(&upcoming(cs, today)), vec!["Young", "Old"]);
    }
}

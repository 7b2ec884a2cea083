use anyhow::Result;
use bulletin_types::models::{Client, PublicMessage, long_date};
use chrono::{Duration, Local};
use tracing::info;

use crate::Database;

/// (id, title, addressed_to, valid_until, content, client email, client name, days from today)
const DEMO: &[(i64, &str, &str, &str, &str, &str, &str, i64)] = &[
    (
        1,
        "Book Launch Event",
        "All book lovers (you will receive one sample copy of the book for free)",
        "Event will be held on 26th of Feb, 2021",
        "A bit about me:I am an author,blogger,speaker and lover of conscious creation.I spent decades becoming masterful at consciously creating a life I love,and now my mission is to teach others.My first book, The Map – To Our Responsive UniverseYou will be able to gather the contact information from all those who download your gift.",
        "test@gmail.com",
        "Renie Sen",
        0,
    ),
    (2, "Sample message title 1", "ABC", "21th of March, 2021", "Some message content", "test5@gmail.com", "Random test", 5),
    (3, "Sample message title 2", "DEF", "17th of July, 2021", "Some message content", "test2@gmail.com", "Fun test", 0),
    (4, "Sample message title 3", "GHI", "19th of Nov, 2021", "Some message content", "test3@gmail.com", "Cool test", 0),
    (5, "Sample message title 5", "JKL", "2nd of March, 2021", "Some message content", "test5@gmail.com", "Demo test", 0),
    (6, "Sample message title 5", "XYZ", "12th of March, 2021", "Some message content", "test1@gmail.com", "Some test", 0),
];

/// The six demo messages with fixed ids 1..=6, each owning a fresh client.
pub fn demo_messages() -> Vec<PublicMessage> {
    let today = Local::now();
    DEMO.iter()
        .map(|&(id, title, addressed_to, valid_until, content, email, name, days)| PublicMessage {
            message_id: id,
            title: title.to_string(),
            message_content: content.to_string(),
            addressed_to: Some(addressed_to.to_string()),
            client: Some(Client {
                client_id: 0,
                full_name: Some(name.to_string()),
                email_id: Some(email.to_string()),
            }),
            posted_on: Some(long_date(&(today + Duration::days(days)))),
            valid_until: Some(valid_until.to_string()),
        })
        .collect()
}

impl Database {
    /// Loads the demo messages into an empty store. Returns how many were
    /// inserted; a store that already holds messages is left untouched.
    pub fn seed_demo(&self) -> Result<usize> {
        if self.count_messages()? > 0 {
            info!("Store already holds messages, skipping demo seed");
            return Ok(0);
        }

        let inserted = self.insert_messages(&demo_messages())?;
        info!("Seeded {} demo public messages", inserted.len());
        Ok(inserted.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_demo_once() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.seed_demo().unwrap(), 6);
        assert_eq!(db.seed_demo().unwrap(), 0);
        assert_eq!(db.count_messages().unwrap(), 6);

        let first = db.find_message(1).unwrap().unwrap();
        assert_eq!(first.title, "Book Launch Event");
        assert_eq!(
            first.client.and_then(|c| c.full_name).as_deref(),
            Some("Renie Sen")
        );
    }
}

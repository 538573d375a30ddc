use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCard {
    pub word: String,
    pub forbidden_hints: Vec<String>,
    pub category: String,
    pub set: String,
}

impl WordCard {
    pub fn new(word: &str, forbidden_hints: &[&str], category: &str, set: &str) -> Self {
        WordCard {
            word: word.to_string(),
            forbidden_hints: forbidden_hints.iter().map(|h| h.to_string()).collect(),
            category: category.to_string(),
            set: set.to_string(),
        }
    }

    pub fn matches(&self, filter: &CardFilter) -> bool {
        filter.categories.contains(&self.category) && self.set == filter.set
    }

    pub fn describe(&self) -> String {
        format!(
            "{} [{}] - do not say: {}",
            self.word,
            self.category,
            self.forbidden_hints.iter().join(", ")
        )
    }
}

/// Which cards may be drawn: any of the categories, from exactly one set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardFilter {
    pub categories: BTreeSet<String>,
    pub set: String,
}

impl CardFilter {
    pub fn new<I, S>(categories: I, set: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CardFilter {
            categories: categories.into_iter().map(Into::into).collect(),
            set: set.to_string(),
        }
    }
}

pub const STARTER_SET: &str = "Set One";

pub fn starter_deck() -> Vec<WordCard> {
    vec![
        WordCard::new(
            "Basketball",
            &["Hoop", "Court", "Dribble", "NBA"],
            "Sports",
            STARTER_SET,
        ),
        WordCard::new(
            "Goalkeeper",
            &["Net", "Save", "Football", "Gloves"],
            "Sports",
            STARTER_SET,
        ),
        WordCard::new(
            "Computer",
            &["Screen", "Keyboard", "Mouse", "Internet"],
            "Technology",
            STARTER_SET,
        ),
        WordCard::new(
            "Smartphone",
            &["Call", "Apps", "Touch", "Battery"],
            "Technology",
            STARTER_SET,
        ),
        WordCard::new(
            "Pizza",
            &["Cheese", "Dough", "Tomato", "Slice"],
            "Food",
            STARTER_SET,
        ),
        WordCard::new(
            "Pancake",
            &["Syrup", "Breakfast", "Flip", "Batter"],
            "Food",
            STARTER_SET,
        ),
        WordCard::new(
            "Elephant",
            &["Trunk", "Tusk", "Grey", "Africa"],
            "Animals",
            STARTER_SET,
        ),
        WordCard::new(
            "Penguin",
            &["Ice", "Bird", "Waddle", "Antarctica"],
            "Animals",
            STARTER_SET,
        ),
    ]
}

pub fn categories(deck: &[WordCard]) -> BTreeSet<String> {
    deck.iter().map(|c| c.category.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::{categories, starter_deck, CardFilter, WordCard, STARTER_SET};

    #[test]
    fn matches_should_require_category_and_set() {
        let card = WordCard::new("Pizza", &["Cheese"], "Food", "Set One");

        assert!(card.matches(&CardFilter::new(["Food", "Animals"], "Set One")));
        assert!(!card.matches(&CardFilter::new(["Animals"], "Set One")));
        assert!(!card.matches(&CardFilter::new(["Food"], "Set Two")));
    }

    #[test]
    fn describe_should_list_forbidden_hints() {
        let card = WordCard::new("Pizza", &["Cheese", "Slice"], "Food", "Set One");

        assert_eq!(card.describe(), "Pizza [Food] - do not say: Cheese, Slice");
    }

    #[test]
    fn starter_deck_should_cover_every_category_in_one_set() {
        let deck = starter_deck();

        assert!(deck.iter().all(|c| c.set == STARTER_SET));
        assert_eq!(categories(&deck).len(), 4);
    }
}

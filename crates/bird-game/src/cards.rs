//! Cards, the deck, and dealing.
//!
//! The deck has four colors of fourteen cards each plus a single Rook:
//! 57 cards. Each of the four seats gets 13 and the remaining 5 form the
//! widow.

use std::cmp::Reverse;
use std::fmt;

use bird_protocol::SEATS;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Cards dealt to each seat.
pub const HAND_SIZE: usize = 13;

/// Cards set aside face down.
pub const WIDOW_SIZE: usize = 5;

/// Cards in a full deck.
pub const DECK_SIZE: usize = 4 * 14 + 1;

/// Highest legal bid.
pub const MAX_BID: u32 = 200;

/// Bonus for the partnership that takes the final trick.
pub const LAST_TRICK_BONUS: u32 = 20;

/// Card points plus the last-trick bonus. Every finished game splits
/// exactly this many points between the two partnerships.
pub const POINT_POOL: u32 = 200;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Black,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Black];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Black => "black",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single card.
///
/// Colored cards carry a value from 1 to 14. The Rook has no color and
/// value 0; it belongs to whatever color is trump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub color: Option<Color>,
    pub value: u8,
}

impl Card {
    /// The Rook.
    pub const ROOK: Card = Card {
        color: None,
        value: 0,
    };

    /// A colored card.
    pub const fn new(color: Color, value: u8) -> Self {
        Self {
            color: Some(color),
            value,
        }
    }

    pub fn is_rook(&self) -> bool {
        self.color.is_none()
    }

    /// Strength within a suit. The 1 outranks the 14; the Rook outranks
    /// everything.
    pub fn rank(&self) -> u8 {
        match (self.color, self.value) {
            (None, _) => 16,
            (Some(_), 1) => 15,
            (Some(_), v) => v,
        }
    }

    /// Counting value of the card when captured.
    pub fn points(&self) -> u32 {
        if self.is_rook() {
            return 20;
        }
        match self.value {
            1 => 15,
            10 | 14 => 10,
            5 => 5,
            _ => 0,
        }
    }

    /// The suit this card belongs to for following and winning tricks.
    /// The Rook takes the trump color; before trump is named it has none.
    pub fn suit(&self, trump: Option<Color>) -> Option<Color> {
        self.color.or(trump)
    }

    /// Returns `true` if this is a real card of the deck.
    pub fn is_valid(&self) -> bool {
        match self.color {
            None => self.value == 0,
            Some(_) => (1..=14).contains(&self.value),
        }
    }

    fn sort_key(&self) -> (u8, Reverse<u8>) {
        let color = self.color.map_or(4, |c| c as u8);
        (color, Reverse(self.rank()))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            None => f.write_str("rook"),
            Some(color) => write!(f, "{color} {}", self.value),
        }
    }
}

// ---------------------------------------------------------------------------
// Deck
// ---------------------------------------------------------------------------

/// Every card in the deck, unshuffled.
pub fn deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(DECK_SIZE);
    for color in Color::ALL {
        for value in 1..=14 {
            cards.push(Card::new(color, value));
        }
    }
    cards.push(Card::ROOK);
    cards
}

/// The result of dealing a shuffled deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: [Vec<Card>; SEATS],
    pub widow: Vec<Card>,
}

/// Shuffles a fresh deck and deals it. Hands come back sorted.
pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> Deal {
    let mut cards = deck();
    cards.shuffle(rng);

    let widow = cards.split_off(SEATS * HAND_SIZE);
    let mut chunks = cards.chunks(HAND_SIZE).map(|c| {
        let mut hand = c.to_vec();
        sort_hand(&mut hand);
        hand
    });
    let hands = std::array::from_fn(|_| chunks.next().unwrap_or_default());

    Deal { hands, widow }
}

/// Sorts a hand by color, highest rank first, with the Rook last.
pub fn sort_hand(hand: &mut [Card]) {
    hand.sort_by_key(Card::sort_key);
}

/// Removes every card in `cards` from `from`, counting duplicates.
///
/// All or nothing: returns the first card that is missing and leaves
/// `from` untouched if any is.
pub fn take_cards(from: &mut Vec<Card>, cards: &[Card]) -> Result<(), Card> {
    let mut remaining = from.clone();
    for card in cards {
        match remaining.iter().position(|c| c == card) {
            Some(i) => {
                remaining.remove(i);
            }
            None => return Err(*card),
        }
    }
    *from = remaining;
    Ok(())
}

/// Sum of card points.
pub fn count_points(cards: &[Card]) -> u32 {
    cards.iter().map(Card::points).sum()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_deck_has_57_distinct_valid_cards() {
        let cards = deck();
        assert_eq!(cards.len(), DECK_SIZE);
        assert_eq!(cards.iter().collect::<HashSet<_>>().len(), DECK_SIZE);
        assert!(cards.iter().all(Card::is_valid));
    }

    #[test]
    fn test_card_points_plus_bonus_make_the_pool() {
        assert_eq!(count_points(&deck()), 180);
        assert_eq!(count_points(&deck()) + LAST_TRICK_BONUS, POINT_POOL);
    }

    #[test]
    fn test_rank_one_beats_fourteen_and_rook_beats_all() {
        let one = Card::new(Color::Red, 1);
        let fourteen = Card::new(Color::Red, 14);
        assert!(one.rank() > fourteen.rank());
        assert!(Card::ROOK.rank() > one.rank());
    }

    #[test]
    fn test_rook_suit_follows_trump() {
        assert_eq!(Card::ROOK.suit(Some(Color::Green)), Some(Color::Green));
        assert_eq!(Card::ROOK.suit(None), None);
        assert_eq!(Card::new(Color::Red, 3).suit(Some(Color::Green)), Some(Color::Red));
    }

    #[test]
    fn test_is_valid_rejects_out_of_range_values() {
        assert!(!Card::new(Color::Red, 0).is_valid());
        assert!(!Card::new(Color::Red, 15).is_valid());
        assert!(!Card { color: None, value: 3 }.is_valid());
    }

    #[test]
    fn test_deal_covers_whole_deck_with_sorted_hands() {
        let mut rng = StdRng::seed_from_u64(7);
        let Deal { hands, widow } = deal(&mut rng);

        assert_eq!(widow.len(), WIDOW_SIZE);
        let mut all: Vec<Card> = widow.clone();
        for hand in &hands {
            assert_eq!(hand.len(), HAND_SIZE);
            let mut sorted = hand.clone();
            sort_hand(&mut sorted);
            assert_eq!(&sorted, hand);
            all.extend(hand);
        }
        assert_eq!(all.iter().collect::<HashSet<_>>().len(), DECK_SIZE);
    }

    #[test]
    fn test_sort_hand_orders_color_then_rank_with_rook_last() {
        let mut hand = vec![
            Card::ROOK,
            Card::new(Color::Black, 2),
            Card::new(Color::Red, 5),
            Card::new(Color::Red, 1),
            Card::new(Color::Red, 14),
        ];
        sort_hand(&mut hand);
        assert_eq!(
            hand,
            vec![
                Card::new(Color::Red, 1),
                Card::new(Color::Red, 14),
                Card::new(Color::Red, 5),
                Card::new(Color::Black, 2),
                Card::ROOK,
            ]
        );
    }

    #[test]
    fn test_take_cards_is_all_or_nothing() {
        let mut hand = vec![Card::new(Color::Red, 5), Card::ROOK];
        let missing = Card::new(Color::Green, 9);

        assert_eq!(take_cards(&mut hand, &[Card::ROOK, missing]), Err(missing));
        assert_eq!(hand.len(), 2);

        take_cards(&mut hand, &[Card::ROOK]).unwrap();
        assert_eq!(hand, vec![Card::new(Color::Red, 5)]);
    }

    #[test]
    fn test_take_cards_counts_duplicates() {
        let mut hand = vec![Card::ROOK];
        assert!(take_cards(&mut hand, &[Card::ROOK, Card::ROOK]).is_err());
    }

    #[test]
    fn test_card_json_shape() {
        let json = serde_json::to_string(&Card::new(Color::Yellow, 10)).unwrap();
        assert_eq!(json, r#"{"color":"yellow","value":10}"#);
        let rook: Card = serde_json::from_str(r#"{"color":null,"value":0}"#).unwrap();
        assert!(rook.is_rook());
    }
}

//! Trick play.
//!
//! A game starts in the exchange step: the bid winner swaps cards with the
//! widow and names trump. After that the bid winner leads the first trick
//! and play runs clockwise. Each trick is collected into the winning
//! partnership's pile; the final trick also takes the widow.

use bird_protocol::{RoomId, SEATS, Viewer};
use bird_room::Room;
use serde::{Deserialize, Serialize};

use crate::cards::{self, Card, Color, LAST_TRICK_BONUS, WIDOW_SIZE};
use crate::view::GameView;
use crate::{BidRoom, RulesError};

/// Partnership that seat `seat` plays for: seats 0 and 2 are team 0,
/// seats 1 and 3 are team 1.
pub fn team_of(seat: usize) -> usize {
    seat % 2
}

/// Final tally of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Seats 0 and 2.
    pub team_a: u32,
    /// Seats 1 and 3.
    pub team_b: u32,
    /// Whether the bid winner's partnership reached its bid.
    pub bid_made: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRoom {
    pub id: RoomId,
    pub players: [String; SEATS],
    pub hands: [Vec<Card>; SEATS],
    pub discarded: [Vec<Card>; 2],
    pub widow: Vec<Card>,
    pub table: Vec<Card>,
    pub leader: usize,
    pub current_player: usize,
    /// `None` until the bid winner names trump.
    pub trump: Option<Color>,
    pub bid: u32,
    pub bid_winner: usize,
    pub last_trick: Option<usize>,
    pub done: bool,
}

impl GameRoom {
    /// Starts the exchange step for the winner of `bidding`.
    pub(crate) fn from_bidding(bidding: BidRoom) -> Self {
        let winner = bidding.current_bidder;
        Self {
            id: bidding.id,
            players: bidding.players,
            hands: bidding.hands,
            discarded: Default::default(),
            widow: bidding.widow,
            table: Vec::new(),
            leader: winner,
            current_player: winner,
            trump: None,
            bid: bidding.bid,
            bid_winner: winner,
            last_trick: None,
            done: false,
        }
    }

    /// `true` while the bid winner may still exchange and name trump.
    pub fn in_exchange(&self) -> bool {
        !self.done && self.trump.is_none()
    }

    fn check_exchange(&self, seat: usize) -> Result<(), RulesError> {
        if self.done {
            return Err(RulesError::GameFinished);
        }
        if self.trump.is_some() {
            return Err(RulesError::NotExchangePhase);
        }
        if seat != self.bid_winner {
            return Err(RulesError::NotBidWinner);
        }
        Ok(())
    }

    /// Moves `to_widow` from the bid winner's hand into the widow and
    /// `from_widow` the other way. Both lists must be the same length.
    pub fn exchange_with_widow(
        &mut self,
        seat: usize,
        to_widow: &[Card],
        from_widow: &[Card],
    ) -> Result<(), RulesError> {
        self.check_exchange(seat)?;
        if to_widow.len() != from_widow.len() {
            return Err(RulesError::InvalidExchange(format!(
                "giving {} cards but taking {}",
                to_widow.len(),
                from_widow.len()
            )));
        }
        if to_widow.len() > WIDOW_SIZE {
            return Err(RulesError::InvalidExchange(format!(
                "at most {WIDOW_SIZE} cards can be exchanged"
            )));
        }

        let mut hand = self.hands[seat].clone();
        let mut widow = self.widow.clone();
        cards::take_cards(&mut hand, to_widow).map_err(RulesError::CardNotHeld)?;
        cards::take_cards(&mut widow, from_widow).map_err(RulesError::CardNotInWidow)?;
        hand.extend_from_slice(from_widow);
        widow.extend_from_slice(to_widow);
        cards::sort_hand(&mut hand);

        self.hands[seat] = hand;
        self.widow = widow;
        Ok(())
    }

    /// Names trump and ends the exchange step.
    pub fn declare_trump(&mut self, seat: usize, color: Color) -> Result<(), RulesError> {
        self.check_exchange(seat)?;
        self.trump = Some(color);
        tracing::debug!(room_id = %self.id, %color, "trump declared");
        Ok(())
    }

    /// The suit of the trick in progress, if a card has been led.
    pub fn led_suit(&self) -> Option<Color> {
        self.table.first().and_then(|c| c.suit(self.trump))
    }

    fn check_turn(&self, seat: usize) -> Result<(), RulesError> {
        if self.done {
            return Err(RulesError::GameFinished);
        }
        if self.trump.is_none() {
            return Err(RulesError::NotPlayPhase);
        }
        if self.table.len() == SEATS {
            return Err(RulesError::TrickComplete);
        }
        if seat != self.current_player {
            return Err(RulesError::NotYourTurn {
                expected: self.current_player,
            });
        }
        Ok(())
    }

    /// Cards `seat` may play right now. Empty when it is not their turn.
    pub fn legal_cards(&self, seat: usize) -> Vec<Card> {
        if self.check_turn(seat).is_err() {
            return Vec::new();
        }
        let hand = &self.hands[seat];
        let following: Vec<Card> = match self.led_suit() {
            Some(led) => hand
                .iter()
                .copied()
                .filter(|c| c.suit(self.trump) == Some(led))
                .collect(),
            None => Vec::new(),
        };
        if following.is_empty() {
            hand.clone()
        } else {
            following
        }
    }

    /// Plays `card` from `seat`'s hand onto the table.
    ///
    /// A seat holding a card of the led suit must play one.
    pub fn play_card(&mut self, seat: usize, card: Card) -> Result<(), RulesError> {
        self.check_turn(seat)?;
        let hand = &self.hands[seat];
        let Some(pos) = hand.iter().position(|c| *c == card) else {
            return Err(RulesError::CardNotHeld(card));
        };
        if let Some(led) = self.led_suit() {
            let can_follow = hand.iter().any(|c| c.suit(self.trump) == Some(led));
            if can_follow && card.suit(self.trump) != Some(led) {
                return Err(RulesError::MustFollowSuit(led));
            }
        }

        self.hands[seat].remove(pos);
        self.table.push(card);
        self.current_player = (seat + 1) % SEATS;
        Ok(())
    }

    /// Index into `table` of the card that takes the trick.
    fn winning_play(&self) -> usize {
        let led = self.led_suit();
        let strength = |card: &Card| -> (u8, u8) {
            let suit = card.suit(self.trump);
            if card.is_rook() {
                (3, 0)
            } else if suit.is_some() && suit == self.trump {
                (2, card.rank())
            } else if suit == led {
                (1, card.rank())
            } else {
                (0, 0)
            }
        };
        self.table
            .iter()
            .enumerate()
            .max_by_key(|&(_, card)| strength(card))
            .map_or(0, |(i, _)| i)
    }

    /// Collects a full trick, returning the winning seat, who leads next.
    ///
    /// After the last trick the widow goes to the same pile and the game
    /// is over.
    pub fn finish_trick(&mut self) -> Result<usize, RulesError> {
        if self.done {
            return Err(RulesError::GameFinished);
        }
        if self.table.len() != SEATS {
            return Err(RulesError::TrickIncomplete);
        }

        let winner = (self.leader + self.winning_play()) % SEATS;
        let pile = team_of(winner);
        let trick: Vec<Card> = self.table.drain(..).collect();
        self.discarded[pile].extend(trick);
        self.leader = winner;
        self.current_player = winner;

        if self.hands.iter().all(Vec::is_empty) {
            let widow: Vec<Card> = self.widow.drain(..).collect();
            self.discarded[pile].extend(widow);
            self.last_trick = Some(winner);
            self.done = true;
            tracing::debug!(room_id = %self.id, winner, "final trick taken");
        }
        Ok(winner)
    }

    /// Points per partnership. Only available once the game is over.
    pub fn score(&self) -> Result<Score, RulesError> {
        if !self.done {
            return Err(RulesError::GameNotFinished);
        }
        let mut totals = [0u32; 2];
        for (team, pile) in self.discarded.iter().enumerate() {
            totals[team] = cards::count_points(pile);
        }
        if let Some(last) = self.last_trick {
            totals[team_of(last)] += LAST_TRICK_BONUS;
        }
        Ok(Score {
            team_a: totals[0],
            team_b: totals[1],
            bid_made: totals[team_of(self.bid_winner)] >= self.bid,
        })
    }
}

impl Room for GameRoom {
    type View = GameView;

    fn id(&self) -> &RoomId {
        &self.id
    }

    fn players(&self) -> &[String] {
        &self.players
    }

    fn visible(&self, viewer: Viewer) -> GameView {
        GameView::project(self, viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(color: Color, value: u8) -> Card {
        Card::new(color, value)
    }

    /// A game in the play phase with hand-picked hands.
    fn game(hands: [Vec<Card>; SEATS], trump: Color) -> GameRoom {
        let bidding = BidRoom {
            id: RoomId::parse("G1").unwrap(),
            players: ["a", "b", "c", "d"].map(String::from),
            hands,
            widow: vec![c(Color::Green, 5), c(Color::Green, 6)],
            passed: [true, true, true, false],
            current_bidder: 3,
            bid: 100,
            done: true,
        };
        let mut g = bidding.into_game().unwrap();
        g.declare_trump(3, trump).unwrap();
        g.leader = 0;
        g.current_player = 0;
        g
    }

    #[test]
    fn test_from_bidding_starts_exchange_with_bid_winner() {
        let g = game(Default::default(), Color::Red);
        assert_eq!(g.bid_winner, 3);
        assert_eq!(g.bid, 100);

        let mut fresh = GameRoom { trump: None, ..g };
        fresh.leader = 3;
        fresh.current_player = 3;
        assert!(fresh.in_exchange());
        assert_eq!(fresh.play_card(3, c(Color::Red, 1)), Err(RulesError::NotPlayPhase));
    }

    #[test]
    fn test_rook_wins_trick_regardless_of_trump() {
        let mut g = game(
            [
                vec![c(Color::Red, 5), c(Color::Green, 2)],
                vec![c(Color::Red, 10), c(Color::Green, 3)],
                vec![c(Color::Black, 3), c(Color::Green, 4)],
                vec![Card::ROOK, c(Color::Green, 7)],
            ],
            Color::Black,
        );
        g.play_card(0, c(Color::Red, 5)).unwrap();
        g.play_card(1, c(Color::Red, 10)).unwrap();
        g.play_card(2, c(Color::Black, 3)).unwrap();
        g.play_card(3, Card::ROOK).unwrap();

        assert_eq!(g.finish_trick().unwrap(), 3);
        assert_eq!(g.discarded[1].len(), 4);
        assert_eq!(g.current_player, 3);
    }

    #[test]
    fn test_highest_trump_beats_led_suit() {
        let mut g = game(
            [
                vec![c(Color::Red, 1), c(Color::Red, 2)],
                vec![c(Color::Yellow, 2), c(Color::Yellow, 3)],
                vec![c(Color::Yellow, 9), c(Color::Yellow, 4)],
                vec![c(Color::Green, 14), c(Color::Green, 2)],
            ],
            Color::Yellow,
        );
        g.play_card(0, c(Color::Red, 1)).unwrap();
        g.play_card(1, c(Color::Yellow, 2)).unwrap();
        g.play_card(2, c(Color::Yellow, 9)).unwrap();
        g.play_card(3, c(Color::Green, 14)).unwrap();

        assert_eq!(g.finish_trick().unwrap(), 2);
        assert!(!g.done);
    }

    #[test]
    fn test_highest_led_card_wins_without_trump() {
        let mut g = game(
            [
                vec![c(Color::Red, 9), c(Color::Red, 2)],
                vec![c(Color::Red, 1), c(Color::Red, 3)],
                vec![c(Color::Green, 14), c(Color::Green, 4)],
                vec![c(Color::Red, 14), c(Color::Red, 4)],
            ],
            Color::Black,
        );
        // Seat 2 cannot follow red, so any card is legal.
        g.play_card(0, c(Color::Red, 9)).unwrap();
        g.play_card(1, c(Color::Red, 1)).unwrap();
        g.play_card(2, c(Color::Green, 14)).unwrap();
        g.play_card(3, c(Color::Red, 14)).unwrap();

        assert_eq!(g.finish_trick().unwrap(), 1, "the 1 outranks the 14");
    }

    #[test]
    fn test_must_follow_suit_when_able() {
        let mut g = game(
            [
                vec![c(Color::Red, 9)],
                vec![c(Color::Red, 3), c(Color::Green, 2)],
                vec![],
                vec![],
            ],
            Color::Black,
        );
        g.play_card(0, c(Color::Red, 9)).unwrap();
        let before = g.clone();

        assert_eq!(
            g.play_card(1, c(Color::Green, 2)),
            Err(RulesError::MustFollowSuit(Color::Red))
        );
        assert_eq!(g, before);
        assert_eq!(g.legal_cards(1), vec![c(Color::Red, 3)]);
    }

    #[test]
    fn test_rook_counts_as_trump_when_following() {
        let mut g = game(
            [vec![c(Color::Green, 9)], vec![Card::ROOK, c(Color::Red, 4)], vec![], vec![]],
            Color::Green,
        );
        g.play_card(0, c(Color::Green, 9)).unwrap();
        assert_eq!(g.legal_cards(1), vec![Card::ROOK]);
    }

    #[test]
    fn test_play_out_of_turn_fails() {
        let mut g = game([vec![c(Color::Red, 9)], vec![c(Color::Red, 3)], vec![], vec![]], Color::Black);
        assert_eq!(
            g.play_card(1, c(Color::Red, 3)),
            Err(RulesError::NotYourTurn { expected: 0 })
        );
        assert!(g.legal_cards(1).is_empty());
    }

    #[test]
    fn test_play_card_not_held_fails() {
        let mut g = game([vec![c(Color::Red, 9)], vec![], vec![], vec![]], Color::Black);
        assert_eq!(
            g.play_card(0, c(Color::Red, 8)),
            Err(RulesError::CardNotHeld(c(Color::Red, 8)))
        );
    }

    #[test]
    fn test_play_on_complete_trick_fails_until_collected() {
        let mut g = game(
            [
                vec![c(Color::Red, 2), c(Color::Red, 6)],
                vec![c(Color::Red, 3), c(Color::Red, 7)],
                vec![c(Color::Red, 4), c(Color::Red, 8)],
                vec![c(Color::Red, 5), c(Color::Red, 9)],
            ],
            Color::Black,
        );
        for (seat, v) in [(0, 2), (1, 3), (2, 4), (3, 5)] {
            g.play_card(seat, c(Color::Red, v)).unwrap();
        }
        assert_eq!(g.play_card(0, c(Color::Red, 6)), Err(RulesError::TrickComplete));
        assert_eq!(g.finish_trick().unwrap(), 3);
        assert!(g.play_card(3, c(Color::Red, 9)).is_ok());
    }

    #[test]
    fn test_finish_incomplete_trick_fails() {
        let mut g = game([vec![c(Color::Red, 2)], vec![], vec![], vec![]], Color::Black);
        g.play_card(0, c(Color::Red, 2)).unwrap();
        assert_eq!(g.finish_trick(), Err(RulesError::TrickIncomplete));
    }

    #[test]
    fn test_final_trick_takes_widow_and_ends_game() {
        let mut g = game(
            [
                vec![c(Color::Red, 1)],
                vec![c(Color::Red, 14)],
                vec![c(Color::Red, 10)],
                vec![c(Color::Red, 5)],
            ],
            Color::Black,
        );
        for (seat, v) in [(0, 1), (1, 14), (2, 10), (3, 5)] {
            g.play_card(seat, c(Color::Red, v)).unwrap();
        }
        assert_eq!(g.finish_trick().unwrap(), 0);

        assert!(g.done);
        assert_eq!(g.last_trick, Some(0));
        assert!(g.widow.is_empty());
        assert_eq!(g.discarded[0].len(), 6);

        // 15 + 10 + 10 + 5 in the trick, 5 in the widow, 20 for the last trick.
        let score = g.score().unwrap();
        assert_eq!(score.team_a, 65);
        assert_eq!(score.team_b, 0);
        assert!(!score.bid_made, "seat 3 bid 100 and team B took nothing");
        assert_eq!(g.finish_trick(), Err(RulesError::GameFinished));
    }

    #[test]
    fn test_score_before_end_fails_without_change() {
        let g = game([vec![c(Color::Red, 2)], vec![], vec![], vec![]], Color::Black);
        let before = g.clone();
        assert_eq!(g.score(), Err(RulesError::GameNotFinished));
        assert_eq!(g, before);
    }

    // =====================================================================
    // Exchange
    // =====================================================================

    fn exchanging() -> GameRoom {
        let g = game(
            [vec![], vec![], vec![], vec![c(Color::Red, 2), c(Color::Red, 3)]],
            Color::Black,
        );
        GameRoom {
            trump: None,
            leader: 3,
            current_player: 3,
            ..g
        }
    }

    #[test]
    fn test_exchange_swaps_cards_with_widow() {
        let mut g = exchanging();
        g.exchange_with_widow(3, &[c(Color::Red, 2)], &[c(Color::Green, 5)])
            .unwrap();
        assert_eq!(g.hands[3], vec![c(Color::Red, 3), c(Color::Green, 5)]);
        assert_eq!(g.widow, vec![c(Color::Green, 6), c(Color::Red, 2)]);
    }

    #[test]
    fn test_exchange_by_other_seat_fails() {
        let mut g = exchanging();
        assert_eq!(g.exchange_with_widow(1, &[], &[]), Err(RulesError::NotBidWinner));
        assert_eq!(g.declare_trump(0, Color::Red), Err(RulesError::NotBidWinner));
    }

    #[test]
    fn test_exchange_uneven_counts_fails() {
        let mut g = exchanging();
        let result = g.exchange_with_widow(3, &[c(Color::Red, 2)], &[]);
        assert!(matches!(result, Err(RulesError::InvalidExchange(_))));
    }

    #[test]
    fn test_exchange_card_not_in_widow_fails_without_change() {
        let mut g = exchanging();
        let before = g.clone();
        assert_eq!(
            g.exchange_with_widow(3, &[c(Color::Red, 2)], &[c(Color::Black, 1)]),
            Err(RulesError::CardNotInWidow(c(Color::Black, 1)))
        );
        assert_eq!(g, before);
    }

    #[test]
    fn test_exchange_after_trump_fails() {
        let mut g = exchanging();
        g.declare_trump(3, Color::Red).unwrap();
        assert_eq!(g.exchange_with_widow(3, &[], &[]), Err(RulesError::NotExchangePhase));
        assert_eq!(g.declare_trump(3, Color::Green), Err(RulesError::NotExchangePhase));
        assert!(!g.in_exchange());
    }
}

//! Per-viewer projections of bidding and game rooms.
//!
//! A seated player sees their own hand and only card counts for everyone
//! else. The widow stays hidden from every seat, except from the bid
//! winner while they are exchanging with it. An admin viewer sees the
//! whole table.

use bird_protocol::{RoomId, SEATS, Viewer};
use serde::Serialize;

use crate::{BidRoom, Card, Color, GameRoom};

fn hand_sizes(hands: &[Vec<Card>; SEATS]) -> [usize; SEATS] {
    std::array::from_fn(|seat| hands[seat].len())
}

fn own_hand(hands: &[Vec<Card>; SEATS], viewer: Viewer) -> Vec<Card> {
    viewer
        .seat()
        .and_then(|seat| hands.get(seat))
        .cloned()
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// BidView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    pub id: RoomId,
    pub players: [String; SEATS],
    /// The viewer's seat; absent for admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<usize>,
    pub hand: Vec<Card>,
    pub hand_sizes: [usize; SEATS],
    pub passed: [bool; SEATS],
    pub current_bidder: usize,
    pub bid: u32,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hands: Option<[Vec<Card>; SEATS]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widow: Option<Vec<Card>>,
}

impl BidView {
    pub fn project(room: &BidRoom, viewer: Viewer) -> Self {
        let admin = viewer.is_admin();
        Self {
            id: room.id.clone(),
            players: room.players.clone(),
            seat: viewer.seat(),
            hand: own_hand(&room.hands, viewer),
            hand_sizes: hand_sizes(&room.hands),
            passed: room.passed,
            current_bidder: room.current_bidder,
            bid: room.bid,
            done: room.done,
            hands: admin.then(|| room.hands.clone()),
            widow: admin.then(|| room.widow.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// GameView
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub id: RoomId,
    pub players: [String; SEATS],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<usize>,
    pub hand: Vec<Card>,
    pub hand_sizes: [usize; SEATS],
    pub table: Vec<Card>,
    pub leader: usize,
    pub current_player: usize,
    pub trump: Option<Color>,
    pub bid: u32,
    pub bid_winner: usize,
    pub done: bool,
    pub discard_sizes: [usize; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widow: Option<Vec<Card>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hands: Option<[Vec<Card>; SEATS]>,
}

impl GameView {
    pub fn project(room: &GameRoom, viewer: Viewer) -> Self {
        let admin = viewer.is_admin();
        let exchanging = room.in_exchange() && viewer.seat() == Some(room.bid_winner);
        Self {
            id: room.id.clone(),
            players: room.players.clone(),
            seat: viewer.seat(),
            hand: own_hand(&room.hands, viewer),
            hand_sizes: hand_sizes(&room.hands),
            table: room.table.clone(),
            leader: room.leader,
            current_player: room.current_player,
            trump: room.trump,
            bid: room.bid,
            bid_winner: room.bid_winner,
            done: room.done,
            discard_sizes: [room.discarded[0].len(), room.discarded[1].len()],
            widow: (admin || exchanging).then(|| room.widow.clone()),
            hands: admin.then(|| room.hands.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use bird_room::Room;

    use super::*;

    fn bidding() -> BidRoom {
        let hands = [
            vec![Card::new(Color::Red, 1)],
            vec![Card::new(Color::Red, 2), Card::new(Color::Red, 3)],
            vec![],
            vec![Card::ROOK],
        ];
        BidRoom::with_hands(
            RoomId::parse("V1").unwrap(),
            ["a", "b", "c", "d"].map(String::from),
            hands,
            vec![Card::new(Color::Black, 5)],
        )
    }

    fn finished_bidding() -> BidRoom {
        let mut room = bidding();
        for p in ["a", "b", "c"] {
            room.process_bid(p, 0).unwrap();
        }
        room
    }

    #[test]
    fn test_bid_view_shows_own_hand_and_counts_only() {
        let view = bidding().visible(Viewer::Seat(1));
        assert_eq!(view.hand, vec![Card::new(Color::Red, 2), Card::new(Color::Red, 3)]);
        assert_eq!(view.hand_sizes, [1, 2, 0, 1]);
        assert_eq!(view.seat, Some(1));
        assert_eq!(view.hands, None);
        assert_eq!(view.widow, None);
    }

    #[test]
    fn test_bid_view_json_never_carries_widow_for_seats() {
        let json = serde_json::to_value(bidding().visible(Viewer::Seat(0))).unwrap();
        assert!(json.get("widow").is_none());
        assert!(json.get("hands").is_none());
        assert_eq!(json["currentBidder"], 0);
        assert_eq!(json["handSizes"][1], 2);
    }

    #[test]
    fn test_bid_view_admin_sees_everything() {
        let view = bidding().visible(Viewer::Admin);
        assert!(view.hand.is_empty());
        assert_eq!(view.seat, None);
        assert_eq!(view.hands.unwrap()[3], vec![Card::ROOK]);
        assert_eq!(view.widow, Some(vec![Card::new(Color::Black, 5)]));
    }

    #[test]
    fn test_game_view_widow_only_for_bid_winner_during_exchange() {
        let game = finished_bidding().into_game().unwrap();
        assert_eq!(game.bid_winner, 3);

        assert!(game.visible(Viewer::Seat(3)).widow.is_some());
        assert!(game.visible(Viewer::Seat(0)).widow.is_none());

        let mut game = game;
        game.declare_trump(3, Color::Red).unwrap();
        assert!(game.visible(Viewer::Seat(3)).widow.is_none());
        assert!(game.visible(Viewer::Admin).widow.is_some());
    }

    #[test]
    fn test_game_view_hides_other_hands() {
        let game = finished_bidding().into_game().unwrap();
        let view = game.visible(Viewer::Seat(0));
        assert_eq!(view.hand, vec![Card::new(Color::Red, 1)]);
        assert_eq!(view.hands, None);
        assert_eq!(view.hand_sizes, [1, 2, 0, 1]);
        assert_eq!(view.discard_sizes, [0, 0]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["bidWinner"], 3);
        assert!(json["trump"].is_null());
    }
}

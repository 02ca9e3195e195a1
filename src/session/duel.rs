//! Local 1v1 round resolution: both players attempt the same word in turn;
//! correctness wins outright, speed breaks a correct-correct tie, and a
//! double miss is a draw.

#[derive(Clone, Debug)]
pub struct DuelAttempt {
    pub input: String,
    pub seconds: f64,
    pub is_correct: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuelWinner {
    Player1,
    Player2,
    Draw,
}

pub fn resolve_round(p1: &DuelAttempt, p2: &DuelAttempt) -> DuelWinner {
    match (p1.is_correct, p2.is_correct) {
        (true, false) => DuelWinner::Player1,
        (false, true) => DuelWinner::Player2,
        (true, true) => {
            if p1.seconds < p2.seconds {
                DuelWinner::Player1
            } else {
                DuelWinner::Player2
            }
        }
        (false, false) => DuelWinner::Draw,
    }
}

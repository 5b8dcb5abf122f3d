use std::boxed::Box;

use log::{info, warn};
use rand::rngs::SmallRng;

use crate::board::Board;
use crate::client::GameClient;
use crate::common::Outcome;
use crate::player::Player;
use crate::session::Role;
use crate::transport::Transport;

/// Result of a game from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// One seat of a game: a strategy, its own board, and the enemy view it
/// builds from relayed outcomes.
pub struct PlayerNode {
    player: Box<dyn Player>,
    own: Board,
    enemy: Board,
    client: GameClient,
    status: GameStatus,
    shots: usize,
}

impl PlayerNode {
    pub fn new(player: Box<dyn Player>, transport: Box<dyn Transport>) -> Self {
        Self {
            player,
            own: Board::new(),
            enemy: Board::new(),
            client: GameClient::new(transport),
            status: GameStatus::InProgress,
            shots: 0,
        }
    }

    /// Log in as `name`, play until the game ends, then log out.
    pub async fn run(&mut self, rng: &mut SmallRng, name: &str) -> anyhow::Result<GameStatus> {
        self.player
            .place_ships(rng, &mut self.own)
            .map_err(|e| anyhow::anyhow!(e))?;
        let seat = self.client.login(name).await?;
        info!("{} seated at {}", name, seat);

        let mut role = Role::opening(seat);
        while self.status == GameStatus::InProgress {
            match role {
                Role::Attacker => {
                    let target = self.player.select_target(rng, &self.enemy);
                    let outcome = self.client.attack(target).await?;
                    self.shots += 1;
                    self.enemy.record_outcome(target, outcome);
                    self.player.handle_attack_result(target, outcome);
                    if outcome == Outcome::SunkAndWon {
                        self.status = GameStatus::Won;
                    }
                }
                Role::Defender => {
                    let (at, outcome) = self.client.defend(&mut self.own).await?;
                    self.player.handle_incoming_attack(at, outcome);
                    if outcome == Outcome::SunkAndWon {
                        self.status = GameStatus::Lost;
                    }
                }
            }
            role = role.swapped();
        }
        info!("{} finished: {:?} after {} shots", name, self.status, self.shots);

        if let Err(e) = self.client.logout(name).await {
            warn!("{} could not log out: {}", name, e);
        }
        Ok(self.status)
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn own_board(&self) -> &Board {
        &self.own
    }

    pub fn enemy_view(&self) -> &Board {
        &self.enemy
    }

    /// Number of attacks this player has made.
    pub fn shots(&self) -> usize {
        self.shots
    }
}

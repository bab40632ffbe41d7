use std::{cmp::Ordering, mem, time::Duration};

use duotris_bot::BotController;
use duotris_engine::{COLS, InputError, PieceSeed, PlayerSession, RotationDirection, SessionEvent};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::{SimulationConfig, SimulationError};

/// Seed stream of the garbage hole generator; player `i` uses stream `i`.
const GARBAGE_STREAM: u64 = 2;

/// A human input for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate(RotationDirection),
    HardDrop,
    Hold,
}

/// A [`SessionEvent`] tagged with the player it happened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize)]
#[display("player {player}: {event}")]
pub struct MatchEvent {
    pub player: usize,
    #[serde(flatten)]
    pub event: SessionEvent,
}

/// Result of a two-player match once both sessions are over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    #[display("player {player} wins")]
    Winner { player: usize },
    #[display("tie")]
    Tie,
}

#[derive(Debug)]
struct Player {
    session: PlayerSession,
    bot: Option<BotController>,
}

/// One match: the player sessions, their bots, and the garbage exchange between them.
///
/// Every source of randomness is derived from the match seed, so a match replays exactly
/// from its seed and the sequence of ticks and commands.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    seed: PieceSeed,
    players: Vec<Player>,
    garbage_rng: Pcg32,
    events: Vec<MatchEvent>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, seed: PieceSeed) -> Result<Self, SimulationError> {
        config.validate()?;
        let players = create_players(&config, seed);
        Ok(Self {
            config,
            seed,
            players,
            garbage_rng: garbage_rng(seed),
            events: vec![],
        })
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn session(&self, player: usize) -> Option<&PlayerSession> {
        self.players.get(player).map(|p| &p.session)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &PlayerSession> + '_ {
        self.players.iter().map(|p| &p.session)
    }

    /// The bot driving `player`, if that player is bot-controlled.
    #[must_use]
    pub fn bot(&self, player: usize) -> Option<&BotController> {
        self.players.get(player)?.bot.as_ref()
    }

    /// Removes and returns the queued events of all players, in the order they happened.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        mem::take(&mut self.events)
    }

    /// Starts every session that is still waiting to start.
    pub fn start(&mut self) -> Result<(), SimulationError> {
        let mut started = false;
        for player in &mut self.players {
            started |= player.session.start().is_ok();
        }
        self.dispatch_events();
        if !started {
            return Err(InputError::Inactive.into());
        }
        Ok(())
    }

    /// Pauses every playing session, or resumes the paused ones when none is playing.
    pub fn toggle_pause(&mut self) -> Result<(), SimulationError> {
        let pause = self.sessions().any(|s| s.state().is_playing());
        let mut toggled = false;
        for player in &mut self.players {
            let state = player.session.state();
            if (pause && state.is_playing()) || (!pause && state.is_paused()) {
                toggled |= player.session.toggle_pause().is_ok();
            }
        }
        if !toggled {
            return Err(InputError::Inactive.into());
        }
        Ok(())
    }

    /// Discards every session and bot and sets the match up again from `seed`.
    pub fn reset(&mut self, seed: PieceSeed) {
        self.seed = seed;
        self.players = create_players(&self.config, seed);
        self.garbage_rng = garbage_rng(seed);
        self.events.clear();
    }

    /// Advances the match by `delta`.
    ///
    /// All sessions move first, then the bots act on the resulting state. Garbage from
    /// locks in either phase reaches the opponent before the tick returns.
    pub fn tick(&mut self, delta: Duration) {
        for player in &mut self.players {
            player.session.advance(delta);
        }
        self.dispatch_events();

        for player in &mut self.players {
            if let Some(bot) = &mut player.bot {
                bot.tick(&mut player.session, delta);
            }
        }
        self.dispatch_events();
    }

    /// Applies a human input to `player`'s session.
    pub fn command(&mut self, player: usize, command: Command) -> Result<(), SimulationError> {
        let session = &mut self
            .players
            .get_mut(player)
            .ok_or(SimulationError::UnknownPlayer { player })?
            .session;
        match command {
            Command::MoveLeft => session.try_move_left(),
            Command::MoveRight => session.try_move_right(),
            Command::SoftDrop => session.try_soft_drop(),
            Command::Rotate(direction) => session.try_rotate(direction),
            Command::HardDrop => session.hard_drop(),
            Command::Hold => session.try_hold(),
        }?;
        self.dispatch_events();
        Ok(())
    }

    /// True once no session can make progress any more.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sessions().all(|s| s.state().is_game_over())
    }

    /// Winner of a two-player match, decided by score once both players topped out.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        let [first, second] = self.players.as_slice() else {
            return None;
        };
        if !self.is_finished() {
            return None;
        }
        let outcome = match first.session.stats().score().cmp(&second.session.stats().score()) {
            Ordering::Greater => Outcome::Winner { player: 0 },
            Ordering::Less => Outcome::Winner { player: 1 },
            Ordering::Equal => Outcome::Tie,
        };
        Some(outcome)
    }

    /// Smallest clear that sends garbage, or `None` when this match has no garbage.
    fn garbage_threshold(&self) -> Option<usize> {
        let garbage = self.config.garbage?;
        (self.players.len() == 2).then_some(garbage.min_clear_lines)
    }

    /// Moves session events into the match queue and sends garbage for large clears.
    ///
    /// Receiving garbage does not lock anything, so one extra pass always settles it.
    fn dispatch_events(&mut self) {
        let threshold = self.garbage_threshold();
        loop {
            let mut attacks = vec![];
            for (index, player) in self.players.iter_mut().enumerate() {
                for event in player.session.drain_events() {
                    if let (Some(threshold), SessionEvent::PieceLocked { cleared_lines, .. }) =
                        (threshold, event)
                        && cleared_lines >= threshold
                    {
                        attacks.push((1 - index, cleared_lines));
                    }
                    self.events.push(MatchEvent {
                        player: index,
                        event,
                    });
                }
            }
            if attacks.is_empty() {
                break;
            }
            for (target, lines) in attacks {
                self.send_garbage(target, lines);
            }
        }
    }

    fn send_garbage(&mut self, target: usize, lines: usize) {
        let Some(player) = self.players.get_mut(target) else {
            return;
        };
        if !player.session.state().is_playing() {
            return;
        }
        let holes: Vec<usize> = (0..lines)
            .map(|_| self.garbage_rng.random_range(0..COLS))
            .collect();
        player.session.receive_garbage(&holes);
    }
}

fn create_players(config: &SimulationConfig, seed: PieceSeed) -> Vec<Player> {
    config
        .players
        .iter()
        .zip(0..)
        .map(|(controller, stream)| Player {
            session: PlayerSession::new(config.engine.clone(), seed.derive(stream)),
            bot: controller
                .is_bot()
                .then(|| BotController::new(config.bot.clone())),
        })
        .collect()
}

fn garbage_rng(seed: PieceSeed) -> Pcg32 {
    Pcg32::from_seed(seed.derive(GARBAGE_STREAM).to_bytes())
}

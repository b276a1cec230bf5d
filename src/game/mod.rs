//! The core Go logic.

/// A structure that maintains the board's arrangement of stones and properties derived from the
/// arrangement.
pub mod board;

/// The valid board sizes and their star points.
pub mod board_size;

/// The error kinds of the engine.
pub mod error;

/// A generic matrix for holding per-intersection state.
pub mod matrix;

/// A play or pass and its capture record.
pub mod moves;

/// Black or White.
pub mod player;

/// Connected regions of intersections and the partition maintaining them.
pub mod region;

/// The rule selections of a game.
pub mod rules;

/// Explicit stone placements and removals of a game-tree node.
pub mod setup;

/// White, Empty, or Black.
pub mod state;

/// A structure for storing the x and y coordinates of a board intersection.
pub mod vertex;

/// Per-board random tables for incremental position hashing.
pub mod zobrist;

use serde::{Deserialize, Serialize};

use crate::events::{Event, EventQueue};
use crate::game::board::Board;
use crate::game::board_size::BoardSize;
use crate::game::error::{Error, IllegalMoveReason, IllegalSetup, IllegalSetupReason};
use crate::game::moves::{Move, MAX_MOVE_NUMBER};
use crate::game::player::Player;
use crate::game::region::{RegionId, StoneGroupState};
use crate::game::rules::Rules;
use crate::game::setup::Setup;
use crate::game::state::State;
use crate::game::vertex::Vertex;
use crate::oracle::DeadStoneOracle;
use crate::tree::model::NodeModel;
use crate::tree::node::{Node, NodeId};

/// The lifecycle state of a game.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    /// Moves may be played.
    HasStarted,
    /// A two-computer game is suspended.
    IsPaused,
    /// The game is over; see the reason for which rule ended it.
    HasEnded,
}

/// Which rule or action ended the game.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameHasEndedReason {
    /// Two consecutive passes under the two-pass settling rule.
    TwoPasses,
    /// Three consecutive passes under the three-pass settling rule.
    ThreePasses,
    /// Four consecutive passes under the four-pass rule.
    FourPasses,
    /// The named player resigned.
    Resignation(Player),
}

/// Who operates the two sides; pausing is only meaningful between two computer players.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum GameType {
    /// Two people at one board.
    #[default]
    HumanVsHuman,
    /// A person against the computer.
    HumanVsComputer,
    /// The computer against itself.
    ComputerVsComputer,
}

/// This structure includes everything needed for playing real Go games.
///
/// The game owns the board, the game tree, and the rule selections, answers legality queries,
/// and drives the state machine. Mutating operations either complete or leave no partial change
/// behind.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    rules: Rules,
    game_type: GameType,
    komi: f64,
    handicap: Vec<Vertex>,
    tree: NodeModel,
    board_position: usize,
    game_state: GameState,
    reason_ended: Option<GameHasEndedReason>,
    zobrist_after_handicap: u64,
    events: EventQueue,
}

impl Game {
    /// Returns a new game on `board` with the given rules, handicap, komi, and optional
    /// first-mover override.
    pub fn new(
        board: Board,
        rules: Rules,
        handicap: Vec<Vertex>,
        komi: f64,
        setup_first_move_color: Option<Player>,
    ) -> Result<Self, Error> {
        board.zobrist().matches_board(board.size())?;
        let mut game = Game {
            board,
            rules,
            game_type: GameType::default(),
            komi,
            handicap: Vec::new(),
            tree: NodeModel::new(),
            board_position: 0,
            game_state: GameState::HasStarted,
            reason_ended: None,
            zobrist_after_handicap: 0,
            events: EventQueue::new(),
        };
        if !handicap.is_empty() {
            game.set_handicap_points(handicap)?;
        }
        if setup_first_move_color.is_some() {
            game.change_setup_first_move_color(setup_first_move_color)?;
        }
        game.events = EventQueue::new();
        Ok(game)
    }

    /// Returns a new game on an empty board of `size` under default rules.
    pub fn with_board_size(size: usize) -> Result<Self, Error> {
        let size = BoardSize::try_from(size)?;
        let rules = Rules::default();
        let komi = rules.default_komi();
        Game::new(Board::with_size(size), rules, Vec::new(), komi, None)
    }

    /// Returns a shared reference to the game board.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The rule selections of this game.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Who operates the two sides.
    #[must_use]
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    /// Declares who operates the two sides.
    pub fn set_game_type(&mut self, game_type: GameType) {
        self.game_type = game_type;
    }

    /// The score handicap.
    #[must_use]
    pub fn komi(&self) -> f64 {
        self.komi
    }

    /// Changes the score handicap.
    pub fn set_komi(&mut self, komi: f64) {
        self.komi = komi;
    }

    /// The handicap stones placed before play.
    #[must_use]
    pub fn handicap_points(&self) -> &[Vertex] {
        &self.handicap
    }

    /// The lifecycle state of the game.
    #[must_use]
    pub fn state(&self) -> GameState {
        self.game_state
    }

    /// Which rule or action ended the game, once it has ended.
    #[must_use]
    pub fn reason_for_game_has_ended(&self) -> Option<GameHasEndedReason> {
        self.reason_ended
    }

    /// The game tree and the current variation through it.
    #[must_use]
    pub fn node_model(&self) -> &NodeModel {
        &self.tree
    }

    /// The nodes of the current variation, root first.
    #[must_use]
    pub fn current_variation(&self) -> &[NodeId] {
        self.tree.current_variation()
    }

    /// The index of the board position the board currently shows.
    #[must_use]
    pub fn current_board_position(&self) -> usize {
        self.board_position
    }

    /// The number of board positions of the current variation.
    #[must_use]
    pub fn number_of_board_positions(&self) -> usize {
        self.tree.current_variation().len()
    }

    /// The hash of the position holding exactly the handicap stones.
    #[must_use]
    pub fn zobrist_after_handicap(&self) -> u64 {
        self.zobrist_after_handicap
    }

    /// Removes and returns every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// The color making the next move at the current board position.
    ///
    /// After a move it is the opponent of the mover. Before any move the setup override wins if
    /// present; otherwise White moves first exactly when handicap stones are on the board.
    #[must_use]
    pub fn next_move_color(&self) -> Player {
        let position = self.position_node();
        if let Some(recent) = self.tree.node_with_most_recent_move(position) {
            if let Some(mov) = self.tree.node(recent).ok().and_then(|node| node.mov()) {
                return mov.player.opponent();
            }
        }
        if let Some(color) = self.setup_first_move_color() {
            return color;
        }
        if self.handicap.is_empty() {
            Player::Black
        } else {
            Player::White
        }
    }

    // ------------------------------------------------------------------------------------------
    // Playing
    // ------------------------------------------------------------------------------------------

    /// Plays a stone of the side to move at `vertex`.
    pub fn play(&mut self, vertex: Vertex) -> Result<(), Error> {
        self.ensure_in_progress("play")?;
        let player = self.next_move_color();
        if let Some(reason) = self.check_move(vertex, player)? {
            return Err(Error::MoveIllegal(reason));
        }
        let number = self.next_move_number();
        self.commit_node(Node::with_move(Move::play(player, vertex, number)))?;
        Ok(())
    }

    /// Passes for the side to move, ending the game when a pass rule triggers.
    pub fn pass(&mut self) -> Result<(), Error> {
        self.ensure_in_progress("pass")?;
        let player = self.next_move_color();
        if let Some(reason) = self.check_pass(player) {
            return Err(Error::MoveIllegal(reason));
        }
        let number = self.next_move_number();
        self.commit_node(Node::with_move(Move::pass(player, number)))?;
        self.apply_pass_termination();
        Ok(())
    }

    /// The side to move resigns, ending the game.
    pub fn resign(&mut self) -> Result<(), Error> {
        self.ensure_in_progress("resign")?;
        self.end_game(GameHasEndedReason::Resignation(self.next_move_color()));
        Ok(())
    }

    /// Suspends a two-computer game.
    pub fn pause(&mut self) -> Result<(), Error> {
        if self.game_state != GameState::HasStarted {
            return Err(Error::StateInvalid("pause requires a started game".to_owned()));
        }
        if self.game_type != GameType::ComputerVsComputer {
            return Err(Error::StateInvalid(
                "only a two-computer game can pause".to_owned(),
            ));
        }
        self.game_state = GameState::IsPaused;
        self.events.push(Event::GameStateDidChange);
        Ok(())
    }

    /// Resumes a suspended two-computer game.
    pub fn resume(&mut self) -> Result<(), Error> {
        if self.game_state != GameState::IsPaused {
            return Err(Error::StateInvalid("resume requires a paused game".to_owned()));
        }
        if self.game_type != GameType::ComputerVsComputer {
            return Err(Error::StateInvalid(
                "only a two-computer game can resume".to_owned(),
            ));
        }
        self.game_state = GameState::HasStarted;
        self.events.push(Event::GameStateDidChange);
        Ok(())
    }

    /// Moves an ended game back into progress, e.g. to settle a life-and-death dispute.
    pub fn revert_state_from_ended_to_in_progress(&mut self) -> Result<(), Error> {
        if self.game_state != GameState::HasEnded {
            return Err(Error::StateInvalid("the game has not ended".to_owned()));
        }
        self.game_state = if self.game_type == GameType::ComputerVsComputer {
            GameState::IsPaused
        } else {
            GameState::HasStarted
        };
        self.reason_ended = None;
        self.events.push(Event::GameStateDidChange);
        Ok(())
    }

    // ------------------------------------------------------------------------------------------
    // Legality
    // ------------------------------------------------------------------------------------------

    /// Tests a hypothetical play without mutating anything. `None` means the move is legal.
    pub fn check_move(
        &self,
        vertex: Vertex,
        player: Player,
    ) -> Result<Option<IllegalMoveReason>, Error> {
        if self.board.state_at(vertex)? != State::Empty {
            return Ok(Some(IllegalMoveReason::IntersectionOccupied));
        }
        if self.most_recent_move_number() >= MAX_MOVE_NUMBER {
            return Ok(Some(IllegalMoveReason::TooManyMoves));
        }

        let partition = self.board.partition();
        let opposing = State::from(player.opponent());
        let friendly = State::from(player);
        let mut has_empty_neighbor = false;
        let mut friendly_max_liberties = 0;
        let mut any_friendly = false;
        let mut seen: Vec<RegionId> = Vec::new();
        let mut captured: Vec<Vertex> = Vec::new();
        for neighbor in self.board.neighbors(vertex) {
            let state = partition.state_at(neighbor);
            if state == State::Empty {
                has_empty_neighbor = true;
                continue;
            }
            let id = partition.region_id_at(neighbor);
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            let liberties = partition.liberties(id)?;
            if state == friendly {
                any_friendly = true;
                friendly_max_liberties = friendly_max_liberties.max(liberties);
            } else if state == opposing && liberties == 1 {
                captured.extend_from_slice(partition.region(id)?.points());
            }
        }

        let simple_ko_possible = if has_empty_neighbor {
            false
        } else if any_friendly && friendly_max_liberties > 1 {
            false
        } else if !captured.is_empty() {
            !any_friendly
        } else {
            return Ok(Some(IllegalMoveReason::Suicide));
        };
        self.check_ko(vertex, player, captured, simple_ko_possible)
    }

    /// Tests a hypothetical pass. `None` means the pass is legal.
    #[must_use]
    pub fn check_pass(&self, _player: Player) -> Option<IllegalMoveReason> {
        if self.most_recent_move_number() >= MAX_MOVE_NUMBER {
            Some(IllegalMoveReason::TooManyMoves)
        } else {
            None
        }
    }

    /// Runs the ko and superko comparisons of a hypothetical move.
    fn check_ko(
        &self,
        vertex: Vertex,
        player: Player,
        captured: Vec<Vertex>,
        simple_ko_possible: bool,
    ) -> Result<Option<IllegalMoveReason>, Error> {
        if !simple_ko_possible && !self.rules.ko_rule.is_superko() {
            return Ok(None);
        }
        let zobrist = self.board.zobrist();
        let position = self.position_node();
        let parent_hash = self.tree.node(position)?.zobrist();
        let mut hypothetical = Move::play(player, vertex, 0);
        hypothetical.captured = captured;
        let hash = zobrist.hash_for_move(parent_hash, &hypothetical)?;

        let recent = self.tree.node_with_most_recent_move(position);
        let previous = recent
            .and_then(|node| self.tree.node(node).ok())
            .and_then(Node::parent)
            .and_then(|parent| self.tree.node_with_most_recent_move(parent));
        let hash_before_opponents_move = match previous {
            Some(node) => self.tree.node(node)?.zobrist(),
            None => self.zobrist_after_handicap,
        };
        if simple_ko_possible && hash == hash_before_opponents_move {
            return Ok(Some(IllegalMoveReason::SimpleKo));
        }
        if !self.rules.ko_rule.is_superko() {
            return Ok(None);
        }

        let situational = self.rules.ko_rule == crate::game::rules::KoRule::SuperkoSituational;
        let mut ancestor = previous;
        while let Some(node) = ancestor {
            let node_ref = self.tree.node(node)?;
            let mover = node_ref.mov().map(|mov| mov.player);
            if (!situational || mover == Some(player)) && node_ref.zobrist() == hash {
                return Ok(Some(IllegalMoveReason::Superko));
            }
            ancestor = node_ref
                .parent()
                .and_then(|parent| self.tree.node_with_most_recent_move(parent));
        }
        let first_mover = self.first_move_color_of_variation().unwrap_or(player);
        if (!situational || first_mover == player) && hash == self.zobrist_after_handicap {
            return Ok(Some(IllegalMoveReason::Superko));
        }
        Ok(None)
    }

    // ------------------------------------------------------------------------------------------
    // Board setup
    // ------------------------------------------------------------------------------------------

    /// Tests a hypothetical setup change of `vertex` to `target` without mutating anything.
    /// `None` means the change is legal.
    ///
    /// Setup is only defined before any move was played.
    pub fn check_setup_stone(
        &self,
        vertex: Vertex,
        target: State,
    ) -> Result<Option<IllegalSetup>, Error> {
        self.ensure_no_moves("test a setup change")?;
        let current = self.board.state_at(vertex)?;
        if target == current || target == State::Empty {
            // Removing a stone never creates suicide, and a no-change is trivially fine.
            return Ok(None);
        }
        let partition = self.board.partition();
        let color = target.player().expect("target checked to be a stone");

        if current.is_stone() {
            // Recoloring: the stone leaves its group, which may strand a sub-group of it.
            let region = partition.region_id_at(vertex);
            if let Some(subgroup) =
                partition.connecting_stone_suicidal_subgroup(region, vertex)?
            {
                let reason = if subgroup.len() == partition.region(region)?.size() - 1 {
                    IllegalSetupReason::SuicideOpposingStoneGroup
                } else {
                    IllegalSetupReason::SuicideOpposingColorSubgroup
                };
                return Ok(Some(IllegalSetup { reason, point: subgroup[0] }));
            }
            // The recolored stone must live: an own liberty, or any friendly neighbor group
            // (a group that keeps its liberties when the stone changes sides).
            for neighbor in self.board.neighbors(vertex) {
                if partition.state_at(neighbor) == State::Empty {
                    return Ok(None);
                }
                if partition.state_at(neighbor) == target {
                    let id = partition.region_id_at(neighbor);
                    if partition.liberties(id)? >= 1 {
                        return Ok(None);
                    }
                }
            }
            return Ok(Some(IllegalSetup {
                reason: IllegalSetupReason::SuicideSetupStone,
                point: vertex,
            }));
        }

        // Placing on an empty intersection: it must not capture, then it must live.
        let opposing = State::from(color.opponent());
        let mut seen: Vec<RegionId> = Vec::new();
        for neighbor in self.board.neighbors(vertex) {
            if partition.state_at(neighbor) != opposing {
                continue;
            }
            let id = partition.region_id_at(neighbor);
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            if partition.liberties(id)? == 1 {
                let region = partition.region(id)?;
                let reason = if region.size() == 1 {
                    IllegalSetupReason::SuicideOpposingStone
                } else {
                    IllegalSetupReason::SuicideOpposingStoneGroup
                };
                return Ok(Some(IllegalSetup { reason, point: region.points()[0] }));
            }
        }
        let mut friendly_in_atari: Option<Vertex> = None;
        for neighbor in self.board.neighbors(vertex) {
            if partition.state_at(neighbor) == State::Empty {
                return Ok(None);
            }
            if partition.state_at(neighbor) == target {
                let id = partition.region_id_at(neighbor);
                if partition.liberties(id)? > 1 {
                    return Ok(None);
                }
                if friendly_in_atari.is_none() {
                    friendly_in_atari = Some(partition.region(id)?.points()[0]);
                }
            }
        }
        Ok(Some(match friendly_in_atari {
            Some(point) => IllegalSetup {
                reason: IllegalSetupReason::SuicideFriendlyStoneGroup,
                point,
            },
            None => IllegalSetup {
                reason: IllegalSetupReason::SuicideSetupStone,
                point: vertex,
            },
        }))
    }

    /// Validates the whole board: every stone group must have at least one liberty.
    ///
    /// Returns the suicidal intersections, sorted; an empty list means the setup is legal.
    #[must_use]
    pub fn check_board_setup(&self) -> Vec<Vertex> {
        let partition = self.board.partition();
        let mut suicidal: Vec<Vertex> = Vec::new();
        for (id, region) in partition.regions() {
            if region.is_stone_group()
                && partition.liberties(id).map_or(false, |liberties| liberties == 0)
            {
                suicidal.extend_from_slice(region.points());
            }
        }
        suicidal.sort_unstable();
        suicidal
    }

    /// Changes one intersection of the board setup, before any move was played.
    ///
    /// Toggling an intersection back to its original occupation erases the setup entry, and a
    /// node whose setup becomes empty drops it.
    pub fn change_setup_point(&mut self, vertex: Vertex, target: State) -> Result<(), Error> {
        self.ensure_in_progress("change the board setup")?;
        self.ensure_no_moves("change the board setup")?;
        if let Some(illegal) = self.check_setup_stone(vertex, target)? {
            return Err(Error::SetupIllegal(illegal));
        }
        let current = self.board.state_at(vertex)?;
        if current == target {
            return Ok(());
        }
        let leaf = self.tree.leaf();
        let node = self.tree.node_mut(leaf)?;
        node.setup.get_or_insert_with(Setup::new).set_point(vertex, target, current);
        if node.setup.as_ref().map_or(false, Setup::is_empty) {
            node.setup = None;
        }
        self.board.set_state(vertex, target)?;
        self.rehash_node(leaf)?;
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    /// Overrides (or clears the override of) the color making the first move.
    pub fn change_setup_first_move_color(&mut self, color: Option<Player>) -> Result<(), Error> {
        self.ensure_no_moves("override the first-move color")?;
        let leaf = self.tree.leaf();
        let node = self.tree.node_mut(leaf)?;
        match (node.setup.as_mut(), color) {
            (Some(setup), _) => {
                setup.set_first_move_color(color);
                if setup.is_empty() {
                    node.setup = None;
                }
            }
            (None, Some(_)) => {
                let mut setup = Setup::new();
                setup.set_first_move_color(color);
                node.setup = Some(setup);
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Reverts and removes every setup change of the current node.
    pub fn discard_all_setup(&mut self) -> Result<(), Error> {
        self.ensure_no_moves("discard the board setup")?;
        let leaf = self.tree.leaf();
        let Some(setup) = self.tree.node_mut(leaf)?.setup.take() else {
            return Ok(());
        };
        setup.revert(&mut self.board)?;
        self.rehash_node(leaf)?;
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    // ------------------------------------------------------------------------------------------
    // Handicap
    // ------------------------------------------------------------------------------------------

    /// Replaces the handicap, clearing any previous handicap stones first.
    ///
    /// Fails with `StateInvalid` once a move was played. Every node hash is recomputed bottom-up
    /// afterwards, and setups are re-snapshotted over the new occupation.
    pub fn set_handicap_points(&mut self, points: Vec<Vertex>) -> Result<(), Error> {
        self.ensure_no_moves("set handicap points")?;
        for (index, &point) in points.iter().enumerate() {
            self.board.point(point)?;
            if points[..index].contains(&point) {
                return Err(Error::InvalidArgument(format!(
                    "handicap point {point} given twice"
                )));
            }
        }

        // Lift the setups off the board so the handicap change works on bare occupation.
        let setup_nodes = self.variation_setup_nodes();
        for &id in setup_nodes.iter().rev() {
            if let Some(setup) = self.tree.node(id)?.setup() {
                setup.clone().revert(&mut self.board)?;
            }
        }
        for &old in &self.handicap.clone() {
            self.board.set_state(old, State::Empty)?;
        }
        if let Some(&occupied) = points.iter().find(|&&new| !self.board.is_vacant(new)) {
            // Restore what this operation lifted before failing.
            for &old in &self.handicap.clone() {
                self.board.set_state(old, State::Black)?;
            }
            self.reapply_setups(&setup_nodes)?;
            return Err(Error::InvalidArgument(format!(
                "handicap point {occupied} is occupied"
            )));
        }
        for &new in &points {
            self.board.set_state(new, State::Black)?;
        }
        self.handicap = points;

        // Setups sit on top of the new handicap; their snapshots must follow.
        for &id in &setup_nodes {
            let board = &self.board;
            if let Some(setup) = self.tree.node_mut(id)?.setup_mut() {
                setup.rebase(board)?;
            }
            let node = self.tree.node_mut(id)?;
            if node.setup.as_ref().map_or(false, Setup::is_empty) {
                node.setup = None;
            }
        }
        self.reapply_setups(&setup_nodes)?;

        self.zobrist_after_handicap =
            self.board.zobrist().hash_for_handicap(&self.handicap)?;
        self.rehash_tree()?;
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    /// Adds `point` to the handicap, or removes it when it is already a handicap point.
    pub fn toggle_handicap_point(&mut self, point: Vertex) -> Result<(), Error> {
        let mut points = self.handicap.clone();
        match points.iter().position(|&handicap| handicap == point) {
            Some(index) => {
                points.remove(index);
            }
            None => points.push(point),
        }
        self.set_handicap_points(points)
    }

    // ------------------------------------------------------------------------------------------
    // Variations and board positions
    // ------------------------------------------------------------------------------------------

    /// Shows the board position at `index` of the current variation.
    pub fn change_board_position(&mut self, index: usize) -> Result<(), Error> {
        if index >= self.tree.current_variation().len() {
            return Err(Error::OutOfRange {
                index,
                len: self.tree.current_variation().len() - 1,
            });
        }
        if index == self.board_position {
            return Ok(());
        }
        self.board_position = index;
        self.sync_board()?;
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    /// Switches the current variation to the branch containing `node` and shows its leaf.
    pub fn change_to_variation_containing(&mut self, node: NodeId) -> Result<(), Error> {
        self.tree.change_to_variation_containing(node)?;
        self.board_position = self.tree.current_variation().len() - 1;
        self.sync_board()?;
        self.events.push(Event::NumberOfBoardPositionsDidChange);
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    /// Discards the variation node at `index` and its subtree, then re-syncs the board.
    pub fn discard_nodes_from_index(&mut self, index: usize) -> Result<(), Error> {
        self.tree.discard_nodes_from_index(index)?;
        self.board_position = self.tree.current_variation().len() - 1;
        self.sync_board()?;
        self.events.push(Event::NumberOfBoardPositionsDidChange);
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    /// Discards the last node of the current variation.
    pub fn discard_leaf_node(&mut self) -> Result<(), Error> {
        self.discard_nodes_from_index(self.tree.current_variation().len() - 1)
    }

    /// Discards every node but the root.
    pub fn discard_all_nodes(&mut self) -> Result<(), Error> {
        self.tree.discard_all_nodes()?;
        self.board_position = 0;
        self.sync_board()?;
        self.events.push(Event::NumberOfBoardPositionsDidChange);
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    // ------------------------------------------------------------------------------------------
    // Scoring collaboration
    // ------------------------------------------------------------------------------------------

    /// Enters scoring mode and seeds it with the oracle's initial dead stones.
    ///
    /// The partition is read-only until [`Game::leave_scoring_mode`]. An oracle failure is not
    /// fatal; scoring then starts with no dead stones.
    pub fn enter_scoring_mode(&mut self, oracle: &dyn DeadStoneOracle) -> Result<(), Error> {
        if self.board.partition().is_scoring_mode() {
            return Ok(());
        }
        self.board.partition_mut().enter_scoring_mode();
        self.events.push(Event::ScoringModeEnabled);
        self.events.push(Event::CalculationStarts);
        let dead = match oracle.dead_stones(&self.board) {
            Ok(dead) => dead,
            Err(message) => {
                log::warn!("dead-stone oracle failed, starting with none: {message}");
                Vec::new()
            }
        };
        self.apply_dead_stones(&dead)?;
        self.events.push(Event::CalculationEnds);
        Ok(())
    }

    /// Marks the stone groups at `dead` as dead.
    ///
    /// A result arriving after scoring mode was left is discarded.
    pub fn apply_dead_stones(&mut self, dead: &[Vertex]) -> Result<(), Error> {
        if !self.board.partition().is_scoring_mode() {
            log::warn!("discarding a dead-stone result that arrived outside scoring mode");
            return Ok(());
        }
        for &point in dead {
            self.board.point(point)?;
            let id = self.board.partition().region_id_at(point);
            if self.board.partition().region(id)?.is_stone_group() {
                self.board
                    .partition_mut()
                    .region_mut(id)?
                    .set_stone_group_state(StoneGroupState::Dead);
            }
        }
        Ok(())
    }

    /// Leaves scoring mode, invalidating all cached region values and annotations.
    pub fn leave_scoring_mode(&mut self) {
        if !self.board.partition().is_scoring_mode() {
            return;
        }
        self.board.partition_mut().leave_scoring_mode();
        self.events.push(Event::ScoringModeDisabled);
    }

    // ------------------------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------------------------

    fn position_node(&self) -> NodeId {
        self.tree.current_variation()[self.board_position]
    }

    fn most_recent_move_number(&self) -> u32 {
        self.tree
            .node_with_most_recent_move(self.position_node())
            .and_then(|id| self.tree.node(id).ok())
            .and_then(Node::mov)
            .map_or(0, |mov| mov.number)
    }

    fn next_move_number(&self) -> u32 {
        self.most_recent_move_number() + 1
    }

    fn setup_first_move_color(&self) -> Option<Player> {
        let variation = self.tree.current_variation();
        for &id in variation[..=self.board_position].iter().rev() {
            if let Some(color) = self
                .tree
                .node(id)
                .ok()
                .and_then(Node::setup)
                .and_then(Setup::first_move_color)
            {
                return Some(color);
            }
        }
        None
    }

    fn first_move_color_of_variation(&self) -> Option<Player> {
        for &id in self.tree.current_variation() {
            if let Some(mov) = self.tree.node(id).ok().and_then(Node::mov) {
                return Some(mov.player);
            }
        }
        None
    }

    fn variation_setup_nodes(&self) -> Vec<NodeId> {
        self.tree
            .current_variation()
            .iter()
            .copied()
            .filter(|&id| {
                self.tree
                    .node(id)
                    .map_or(false, |node| node.setup().is_some())
            })
            .collect()
    }

    fn reapply_setups(&mut self, nodes: &[NodeId]) -> Result<(), Error> {
        for &id in nodes {
            if let Some(setup) = self.tree.node(id)?.setup() {
                setup.clone().apply(&mut self.board)?;
            }
        }
        Ok(())
    }

    fn ensure_in_progress(&self, what: &str) -> Result<(), Error> {
        match self.game_state {
            GameState::HasStarted | GameState::IsPaused => Ok(()),
            GameState::HasEnded => Err(Error::StateInvalid(format!(
                "cannot {what}: the game has ended"
            ))),
        }
    }

    fn ensure_no_moves(&self, what: &str) -> Result<(), Error> {
        if self.tree.number_of_moves() == 0 {
            Ok(())
        } else {
            Err(Error::StateInvalid(format!(
                "cannot {what}: the game already has moves"
            )))
        }
    }

    /// Links `node` below the current board position, executes it, and hashes it.
    fn commit_node(&mut self, node: Node) -> Result<(), Error> {
        let parent = self.position_node();
        let parent_hash = self.tree.node(parent)?.zobrist();
        let id = if parent == self.tree.leaf() {
            self.tree.append_node(node)?
        } else {
            let id = self.tree.insert_child(parent, node)?;
            self.tree.change_to_variation_containing(id)?;
            id
        };
        if let Err(error) = self.execute_node(id, parent_hash) {
            let index = self.tree.index_of_node(id).expect("node was just linked");
            self.tree.discard_nodes_from_index(index)?;
            self.sync_board()?;
            return Err(error);
        }
        self.board_position = self.tree.current_variation().len() - 1;
        self.events.push(Event::NumberOfBoardPositionsDidChange);
        self.events.push(Event::CurrentBoardPositionDidChange);
        Ok(())
    }

    fn execute_node(&mut self, id: NodeId, parent_hash: u64) -> Result<(), Error> {
        let Game { board, tree, .. } = self;
        let node = tree.node_mut(id)?;
        if let Some(setup) = node.setup.as_ref() {
            setup.apply(board)?;
        }
        if let Some(mov) = node.mov.as_mut() {
            mov.execute(board)?;
        }
        let mut hash = parent_hash;
        if let Some(setup) = node.setup.as_ref() {
            hash = board.zobrist().hash_for_setup(hash, setup)?;
        }
        if let Some(mov) = node.mov.as_ref() {
            hash = board.zobrist().hash_for_move(hash, mov)?;
        }
        node.zobrist = hash;
        Ok(())
    }

    /// Recomputes one node's hash from its parent's.
    fn rehash_node(&mut self, id: NodeId) -> Result<(), Error> {
        let parent_hash = match self.tree.node(id)?.parent() {
            Some(parent) => self.tree.node(parent)?.zobrist(),
            None => self.zobrist_after_handicap,
        };
        let Game { board, tree, .. } = self;
        let node = tree.node_mut(id)?;
        let mut hash = parent_hash;
        if let Some(setup) = node.setup.as_ref() {
            hash = board.zobrist().hash_for_setup(hash, setup)?;
        }
        if let Some(mov) = node.mov.as_ref() {
            hash = board.zobrist().hash_for_move(hash, mov)?;
        }
        node.zobrist = hash;
        Ok(())
    }

    /// Recomputes every node hash bottom-up from the handicap hash.
    fn rehash_tree(&mut self) -> Result<(), Error> {
        let mut stack = vec![(self.tree.root(), self.zobrist_after_handicap)];
        while let Some((id, parent_hash)) = stack.pop() {
            let hash = {
                let Game { board, tree, .. } = self;
                let node = tree.node_mut(id)?;
                let mut hash = parent_hash;
                if let Some(setup) = node.setup.as_ref() {
                    hash = board.zobrist().hash_for_setup(hash, setup)?;
                }
                if let Some(mov) = node.mov.as_ref() {
                    hash = board.zobrist().hash_for_move(hash, mov)?;
                }
                node.zobrist = hash;
                hash
            };
            let mut child = self.tree.node(id)?.first_child();
            while let Some(next) = child {
                stack.push((next, hash));
                child = self.tree.node(next)?.next_sibling();
            }
        }
        Ok(())
    }

    /// Rebuilds the board from scratch up to the current board position.
    fn sync_board(&mut self) -> Result<(), Error> {
        self.board.clear();
        for &point in &self.handicap.clone() {
            self.board.set_state(point, State::Black)?;
        }
        let variation: Vec<NodeId> =
            self.tree.current_variation()[..=self.board_position].to_vec();
        for id in variation {
            let Game { board, tree, .. } = self;
            let node = tree.node_mut(id)?;
            if let Some(setup) = node.setup.as_ref() {
                setup.apply(board)?;
            }
            if let Some(mov) = node.mov.as_mut() {
                mov.execute(board)?;
            }
        }
        Ok(())
    }

    /// Ends the game when the trailing run of passes triggers a pass rule.
    fn apply_pass_termination(&mut self) {
        let mut trailing = 0;
        for &id in self.tree.current_variation().iter().rev() {
            let Some(mov) = self.tree.node(id).ok().and_then(Node::mov) else {
                continue;
            };
            if mov.vertex().is_none() {
                trailing += 1;
            } else {
                break;
            }
        }

        use crate::game::rules::{FourPassesRule, LifeAndDeathSettlingRule};
        if trailing == 4 && self.rules.four_passes_rule == FourPassesRule::FourPassesEndTheGame {
            self.end_game(GameHasEndedReason::FourPasses);
        } else if trailing == 3
            && self.rules.life_and_death_settling_rule == LifeAndDeathSettlingRule::ThreePasses
        {
            self.end_game(GameHasEndedReason::ThreePasses);
        } else if trailing >= 2
            && trailing % 2 == 0
            && self.rules.life_and_death_settling_rule == LifeAndDeathSettlingRule::TwoPasses
        {
            self.end_game(GameHasEndedReason::TwoPasses);
        }
    }

    fn end_game(&mut self, reason: GameHasEndedReason) {
        self.game_state = GameState::HasEnded;
        self.reason_ended = Some(reason);
        self.events.push(Event::GameStateDidChange);
    }

    // ------------------------------------------------------------------------------------------
    // Archive support
    // ------------------------------------------------------------------------------------------

    /// Rebuilds a game from archived parts, recomputing every node hash from a fresh Zobrist
    /// table and replaying the current variation onto the board.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn restored(
        board: Board,
        rules: Rules,
        game_type: GameType,
        komi: f64,
        handicap: Vec<Vertex>,
        tree: NodeModel,
        game_state: GameState,
        reason_ended: Option<GameHasEndedReason>,
    ) -> Result<Self, Error> {
        board.zobrist().matches_board(board.size())?;
        let zobrist_after_handicap = board.zobrist().hash_for_handicap(&handicap)?;
        let board_position = tree.current_variation().len() - 1;
        let mut game = Game {
            board,
            rules,
            game_type,
            komi,
            handicap,
            tree,
            board_position,
            game_state,
            reason_ended,
            zobrist_after_handicap,
            events: EventQueue::new(),
        };
        game.rehash_tree()?;
        game.sync_board()?;
        Ok(game)
    }
}

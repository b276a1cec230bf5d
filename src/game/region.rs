use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::error::Error;
use crate::game::matrix::Matrix;
use crate::game::player::Player;
use crate::game::state::State;
use crate::game::vertex::Vertex;

/// The life-and-death verdict a scoring pass attaches to a stone group.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum StoneGroupState {
    /// No verdict yet.
    #[default]
    Undefined,
    /// The group lives.
    Alive,
    /// The group is dead and counts as territory for the opponent.
    Dead,
    /// The group lives in seki.
    Seki,
}

/// A stable handle to a region in the board's partition registry.
///
/// Handles are minted when regions are created by splits and placements and retired when regions
/// are emptied or joined away; a retired handle fails resolution instead of aliasing.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RegionId(u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct RegionCache {
    size: usize,
    is_stone_group: bool,
    color: State,
    liberties: Option<usize>,
    adjacent: Vec<RegionId>,
}

/// A connected set of intersections sharing the same stone state.
///
/// A region with a stone state other than `Empty` is a stone group. Regions also carry the
/// annotations the external scoring collaborator attaches to them; those are meaningful only
/// while scoring mode is active.
#[derive(Clone, Debug)]
pub struct Region {
    state: State,
    points: Vec<Vertex>,
    territory_color: Option<Player>,
    territory_inconsistency_found: bool,
    stone_group_state: StoneGroupState,
    cache: Option<RegionCache>,
}

impl Region {
    fn new(state: State, points: Vec<Vertex>) -> Self {
        Region {
            state,
            points,
            territory_color: None,
            territory_inconsistency_found: false,
            stone_group_state: StoneGroupState::default(),
            cache: None,
        }
    }

    /// The stone state shared by every intersection of the region.
    #[must_use]
    pub fn state(&self) -> State {
        self.cache.as_ref().map_or(self.state, |cache| cache.color)
    }

    /// The intersections of the region, in insertion order.
    #[must_use]
    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    /// The number of intersections in the region.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cache.as_ref().map_or(self.points.len(), |cache| cache.size)
    }

    /// Returns true if the region holds stones rather than empty intersections.
    #[must_use]
    pub fn is_stone_group(&self) -> bool {
        self.cache
            .as_ref()
            .map_or(self.state.is_stone(), |cache| cache.is_stone_group)
    }

    /// The territory owner a scoring pass assigned to this region.
    #[must_use]
    pub fn territory_color(&self) -> Option<Player> {
        self.territory_color
    }

    /// Assigns the territory owner. Scoring collaborator use only.
    pub fn set_territory_color(&mut self, color: Option<Player>) {
        self.territory_color = color;
    }

    /// Returns true if a scoring pass found contradictory life-and-death verdicts around this
    /// region.
    #[must_use]
    pub fn territory_inconsistency_found(&self) -> bool {
        self.territory_inconsistency_found
    }

    /// Flags contradictory life-and-death verdicts. Scoring collaborator use only.
    pub fn set_territory_inconsistency_found(&mut self, found: bool) {
        self.territory_inconsistency_found = found;
    }

    /// The life-and-death verdict attached to this stone group.
    #[must_use]
    pub fn stone_group_state(&self) -> StoneGroupState {
        self.stone_group_state
    }

    /// Attaches a life-and-death verdict. Scoring collaborator use only.
    pub fn set_stone_group_state(&mut self, state: StoneGroupState) {
        self.stone_group_state = state;
    }
}

/// The partition of a board's intersections into regions.
///
/// Every intersection belongs to exactly one region at every observation, all intersections of a
/// region share one stone state, and each region is 4-connected. The registry owns the regions;
/// intersections refer to theirs through a [`RegionId`] resolved here.
#[derive(Clone, Debug)]
pub struct Partition {
    size: usize,
    states: Matrix<State>,
    region_of: Matrix<u32>,
    slab: Vec<Option<Region>>,
    free: Vec<u32>,
    scoring_mode: bool,
}

impl Partition {
    /// Returns the partition of an empty board: a single empty region covering everything.
    #[must_use]
    pub fn with_size(size: usize) -> Self {
        let states = Matrix::with_size(size);
        let region_of = Matrix::with_size(size);
        let points: Vec<Vertex> = states.vertices().collect();
        Partition {
            size,
            states,
            region_of,
            slab: vec![Some(Region::new(State::Empty, points))],
            free: Vec::new(),
            scoring_mode: false,
        }
    }

    /// The board size this partition covers.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// The stone state at `vertex`.
    #[must_use]
    pub fn state_at(&self, vertex: Vertex) -> State {
        self.states[vertex]
    }

    /// The region owning `vertex`.
    #[must_use]
    pub fn region_id_at(&self, vertex: Vertex) -> RegionId {
        RegionId(self.region_of[vertex])
    }

    /// Resolves a region handle, failing on a retired one.
    pub fn region(&self, id: RegionId) -> Result<&Region, Error> {
        self.slab
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::InvalidArgument(format!("{id} is retired")))
    }

    /// Resolves a region handle for annotation, failing on a retired one.
    pub fn region_mut(&mut self, id: RegionId) -> Result<&mut Region, Error> {
        self.slab
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::InvalidArgument(format!("{id} is retired")))
    }

    /// Iterates over all live regions.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.slab.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|region| (RegionId(u32::try_from(index).expect("slab fits u32")), region))
        })
    }

    /// The number of distinct empty intersections adjacent to the stone group `id`.
    ///
    /// Fails with `InternalInconsistency` when asked about an empty-type region.
    pub fn liberties(&self, id: RegionId) -> Result<usize, Error> {
        let region = self.region(id)?;
        if let Some(cache) = &region.cache {
            return cache.liberties.ok_or_else(|| {
                Error::InternalInconsistency(format!("liberties of non-stone-group {id}"))
            });
        }
        if !region.state.is_stone() {
            return Err(Error::InternalInconsistency(format!(
                "liberties of non-stone-group {id}"
            )));
        }
        Ok(self.compute_liberties(region))
    }

    fn compute_liberties(&self, region: &Region) -> usize {
        let mut seen: Vec<Vertex> = Vec::new();
        for &point in &region.points {
            for neighbor in self.states.neighbors(point) {
                if self.states[neighbor] == State::Empty && !seen.contains(&neighbor) {
                    seen.push(neighbor);
                }
            }
        }
        seen.len()
    }

    /// The distinct other regions reachable by one step from any member, in first-seen order.
    pub fn adjacent_regions(&self, id: RegionId) -> Result<Vec<RegionId>, Error> {
        let region = self.region(id)?;
        if let Some(cache) = &region.cache {
            return Ok(cache.adjacent.clone());
        }
        Ok(self.compute_adjacent_regions(id, region))
    }

    fn compute_adjacent_regions(&self, id: RegionId, region: &Region) -> Vec<RegionId> {
        let mut adjacent: Vec<RegionId> = Vec::new();
        for &point in &region.points {
            for neighbor in self.states.neighbors(point) {
                let other = self.region_id_at(neighbor);
                if other != id && !adjacent.contains(&other) {
                    adjacent.push(other);
                }
            }
        }
        adjacent
    }

    /// Moves `vertex` into the region `id`.
    ///
    /// Fails with `InvalidArgument` when the vertex already belongs to the region or when its
    /// stone state differs from the region's. The vertex's former region may be destroyed or
    /// split by the removal.
    pub fn add_point(&mut self, id: RegionId, vertex: Vertex) -> Result<(), Error> {
        self.check_vertex(vertex)?;
        let state = self.region(id)?.state;
        if self.region_id_at(vertex) == id {
            return Err(Error::InvalidArgument(format!("{vertex} is already in {id}")));
        }
        if self.states[vertex] != state {
            return Err(Error::InvalidArgument(format!(
                "state of {vertex} does not match {id}"
            )));
        }
        self.assert_mutable();
        self.detach(vertex);
        self.attach_to(id, vertex);
        Ok(())
    }

    /// Removes `vertex` from the region `id`, re-homing it in a fresh singleton region.
    ///
    /// Fails with `InvalidArgument` when the vertex is not a member. An emptied region is
    /// destroyed; a remaining region may split into several.
    pub fn remove_point(&mut self, id: RegionId, vertex: Vertex) -> Result<(), Error> {
        self.check_vertex(vertex)?;
        self.region(id)?;
        if self.region_id_at(vertex) != id {
            return Err(Error::InvalidArgument(format!("{vertex} is not in {id}")));
        }
        self.assert_mutable();
        self.detach(vertex);
        let state = self.states[vertex];
        let singleton = self.mint(Region::new(state, vec![vertex]));
        self.region_of[vertex] = singleton.0;
        Ok(())
    }

    /// Moves every intersection of `other` into `id` and destroys `other`.
    ///
    /// Fails with `InvalidArgument` when the regions are the same or their states differ.
    pub fn join(&mut self, id: RegionId, other: RegionId) -> Result<(), Error> {
        if id == other {
            return Err(Error::InvalidArgument(format!("cannot join {id} with itself")));
        }
        if self.region(id)?.state != self.region(other)?.state {
            return Err(Error::InvalidArgument(format!(
                "states of {id} and {other} do not match"
            )));
        }
        self.assert_mutable();
        let absorbed = self.slab[other.0 as usize]
            .take()
            .expect("region checked to be live");
        self.free.push(other.0);
        for &point in &absorbed.points {
            self.region_of[point] = id.0;
        }
        let region = self.slab[id.0 as usize]
            .as_mut()
            .expect("region checked to be live");
        region.points.extend(absorbed.points);
        Ok(())
    }

    /// Sets the stone state of `vertex`, detaching it from its current region and merging it
    /// with its new same-state neighborhood.
    ///
    /// This is the partition's single entry point for occupation changes: the former region may
    /// be destroyed or split, and the neighboring same-state regions are joined around the
    /// vertex, or a singleton region is created when there are none.
    pub fn set_state(&mut self, vertex: Vertex, state: State) -> Result<(), Error> {
        self.check_vertex(vertex)?;
        if self.states[vertex] == state {
            return Ok(());
        }
        self.assert_mutable();
        self.detach(vertex);
        self.states[vertex] = state;

        let mut chosen: Option<RegionId> = None;
        for neighbor in self.states.neighbors(vertex) {
            if self.states[neighbor] != state {
                continue;
            }
            let neighbor_region = self.region_id_at(neighbor);
            match chosen {
                None => {
                    chosen = Some(neighbor_region);
                    self.region_of[vertex] = neighbor_region.0;
                    self.slab[neighbor_region.0 as usize]
                        .as_mut()
                        .expect("neighbor region is live")
                        .points
                        .push(vertex);
                }
                Some(chosen) if chosen != neighbor_region => {
                    self.join(chosen, neighbor_region)?;
                }
                Some(_) => {}
            }
        }
        if chosen.is_none() {
            let singleton = self.mint(Region::new(state, vec![vertex]));
            self.region_of[vertex] = singleton.0;
        }
        Ok(())
    }

    /// Moves an already-detached `vertex` into the region `id`.
    fn attach_to(&mut self, id: RegionId, vertex: Vertex) {
        self.region_of[vertex] = id.0;
        self.slab[id.0 as usize]
            .as_mut()
            .expect("attach target is live")
            .points
            .push(vertex);
    }

    /// Detaches `vertex` from its region, destroying an emptied region and splitting a
    /// disconnected remainder. The vertex's own registry entry is left stale; callers re-home
    /// it before returning.
    fn detach(&mut self, vertex: Vertex) {
        let id = self.region_id_at(vertex);
        let remaining = {
            let region = self.slab[id.0 as usize]
                .as_mut()
                .expect("every vertex belongs to a live region");
            region.points.retain(|&point| point != vertex);
            region.points.len()
        };
        if remaining == 0 {
            self.slab[id.0 as usize] = None;
            self.free.push(id.0);
        } else if remaining > 1 {
            self.split_after_removal(id, vertex);
        }
    }

    /// Splits region `id` after `removed` was detached, leaving the component discovered first
    /// in place and minting a region per further component.
    fn split_after_removal(&mut self, id: RegionId, removed: Vertex) {
        let remaining = self.slab[id.0 as usize]
            .as_ref()
            .expect("split target is live")
            .points
            .len();
        let mut component_of: HashMap<Vertex, usize> = HashMap::new();
        let mut components = 0;

        for seed in self.states.neighbors(removed) {
            if self.region_of[seed] != id.0 || seed == removed || component_of.contains_key(&seed)
            {
                continue;
            }
            // Depth-first traversal bounded to points still registered to this region.
            let mut stack = vec![seed];
            component_of.insert(seed, components);
            let mut found = 1;
            while let Some(point) = stack.pop() {
                for neighbor in self.states.neighbors(point) {
                    if self.region_of[neighbor] == id.0
                        && neighbor != removed
                        && !component_of.contains_key(&neighbor)
                    {
                        component_of.insert(neighbor, components);
                        stack.push(neighbor);
                        found += 1;
                    }
                }
            }
            if components == 0 && found == remaining {
                return;
            }
            components += 1;
        }

        if components <= 1 {
            return;
        }
        log::trace!("{id} splits into {components} components");
        let state = self.slab[id.0 as usize].as_ref().expect("split target is live").state;
        let points = self.slab[id.0 as usize]
            .as_ref()
            .expect("split target is live")
            .points
            .clone();
        for component in 1..components {
            let members: Vec<Vertex> = points
                .iter()
                .copied()
                .filter(|point| component_of.get(point) == Some(&component))
                .collect();
            let new_id = self.mint(Region::new(state, members));
            let minted = self.slab[new_id.0 as usize].as_ref().expect("just minted");
            for &point in &minted.points {
                self.region_of[point] = new_id.0;
            }
        }
        self.slab[id.0 as usize]
            .as_mut()
            .expect("split target is live")
            .points
            .retain(|point| component_of.get(point) == Some(&0));
    }

    /// Determines whether recoloring `point` would strand a sub-group of its stone group.
    ///
    /// Walks each sub-component of the group reachable from a neighbor of `point` without
    /// passing through `point`; a sub-component with no empty neighbor of its own is returned
    /// as the stranded sub-group. When the first sub-component already spans the whole group
    /// minus `point`, the point connects nothing and the probe answers no.
    pub fn connecting_stone_suicidal_subgroup(
        &self,
        id: RegionId,
        point: Vertex,
    ) -> Result<Option<Vec<Vertex>>, Error> {
        let region = self.region(id)?;
        if !region.state.is_stone() {
            return Err(Error::InternalInconsistency(format!(
                "connecting-stone probe on non-stone-group {id}"
            )));
        }
        if self.region_id_at(point) != id {
            return Err(Error::InvalidArgument(format!("{point} is not in {id}")));
        }

        let mut assigned: Vec<Vertex> = Vec::new();
        for seed in self.states.neighbors(point) {
            if self.region_of[seed] != id.0 || assigned.contains(&seed) {
                continue;
            }
            let mut component = vec![seed];
            let mut stack = vec![seed];
            let mut has_liberty = false;
            while let Some(member) = stack.pop() {
                for neighbor in self.states.neighbors(member) {
                    if self.states[neighbor] == State::Empty {
                        has_liberty = true;
                    } else if self.region_of[neighbor] == id.0
                        && neighbor != point
                        && !component.contains(&neighbor)
                    {
                        component.push(neighbor);
                        stack.push(neighbor);
                    }
                }
            }
            if !has_liberty {
                return Ok(Some(component));
            }
            if assigned.is_empty() && component.len() == region.points.len() - 1 {
                return Ok(None);
            }
            assigned.extend(component);
        }
        Ok(None)
    }

    /// Returns true while a scoring pass holds the partition read-only.
    #[must_use]
    pub fn is_scoring_mode(&self) -> bool {
        self.scoring_mode
    }

    /// Enters scoring mode, snapshotting the derived values of every region.
    ///
    /// While scoring mode is active the partition must not be mutated, and the cached values
    /// stay valid until scoring mode is left.
    pub fn enter_scoring_mode(&mut self) {
        if self.scoring_mode {
            return;
        }
        let ids: Vec<RegionId> = self.regions().map(|(id, _)| id).collect();
        for id in ids {
            let region = self.region(id).expect("iterated id is live");
            let cache = RegionCache {
                size: region.points.len(),
                is_stone_group: region.state.is_stone(),
                color: region.state,
                liberties: region.state.is_stone().then(|| self.compute_liberties(region)),
                adjacent: self.compute_adjacent_regions(id, region),
            };
            self.slab[id.0 as usize]
                .as_mut()
                .expect("iterated id is live")
                .cache = Some(cache);
        }
        self.scoring_mode = true;
    }

    /// Leaves scoring mode, invalidating every cached value and scoring annotation.
    pub fn leave_scoring_mode(&mut self) {
        if !self.scoring_mode {
            return;
        }
        for slot in self.slab.iter_mut().flatten() {
            slot.cache = None;
            slot.territory_color = None;
            slot.territory_inconsistency_found = false;
            slot.stone_group_state = StoneGroupState::default();
        }
        self.scoring_mode = false;
    }

    /// Checks the partition invariants: total cover, state homogeneity, connectivity, and
    /// maximality (same-state regions are never adjacent).
    pub fn validate(&self) -> Result<(), Error> {
        for vertex in self.states.vertices() {
            let id = self.region_id_at(vertex);
            let region = self.region(id).map_err(|_| {
                Error::InternalInconsistency(format!("{vertex} registered to retired {id}"))
            })?;
            if !region.points.contains(&vertex) {
                return Err(Error::InternalInconsistency(format!(
                    "{vertex} registered to {id} but not among its points"
                )));
            }
            if region.state != self.states[vertex] {
                return Err(Error::InternalInconsistency(format!(
                    "state of {vertex} differs from its region {id}"
                )));
            }
        }
        for (id, region) in self.regions() {
            if region.points.is_empty() {
                return Err(Error::InternalInconsistency(format!("{id} is empty")));
            }
            let mut reached = vec![region.points[0]];
            let mut stack = vec![region.points[0]];
            while let Some(point) = stack.pop() {
                for neighbor in self.states.neighbors(point) {
                    if self.region_of[neighbor] == id.0 && !reached.contains(&neighbor) {
                        reached.push(neighbor);
                        stack.push(neighbor);
                    }
                }
            }
            if reached.len() != region.points.len() {
                return Err(Error::InternalInconsistency(format!("{id} is disconnected")));
            }
            for other in self.compute_adjacent_regions(id, region) {
                if self.region(other)?.state == region.state {
                    return Err(Error::InternalInconsistency(format!(
                        "{id} and {other} share a state but are distinct"
                    )));
                }
            }
        }
        Ok(())
    }

    fn mint(&mut self, region: Region) -> RegionId {
        if let Some(index) = self.free.pop() {
            self.slab[index as usize] = Some(region);
            RegionId(index)
        } else {
            self.slab.push(Some(region));
            RegionId(u32::try_from(self.slab.len() - 1).expect("slab fits u32"))
        }
    }

    fn check_vertex(&self, vertex: Vertex) -> Result<(), Error> {
        if vertex.is_valid(self.size) {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "vertex {vertex} not on a board of size {}",
                self.size
            )))
        }
    }

    fn assert_mutable(&self) {
        debug_assert!(
            !self.scoring_mode,
            "partition mutated while scoring mode holds it read-only"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(s: &str) -> Vertex {
        s.parse().unwrap()
    }

    fn place(partition: &mut Partition, stones: &[(&str, State)]) {
        for &(name, state) in stones {
            partition.set_state(vertex(name), state).unwrap();
        }
    }

    #[test]
    fn empty_board_is_one_region() {
        let partition = Partition::with_size(9);
        let regions: Vec<_> = partition.regions().collect();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].1.size(), 81);
        assert!(!regions[0].1.is_stone_group());
        partition.validate().unwrap();
    }

    #[test]
    fn placing_a_stone_splits_nothing_but_creates_a_group() {
        let mut partition = Partition::with_size(9);
        partition.set_state(vertex("E5"), State::Black).unwrap();
        let group = partition.region_id_at(vertex("E5"));
        assert!(partition.region(group).unwrap().is_stone_group());
        assert_eq!(partition.region(group).unwrap().size(), 1);
        assert_eq!(partition.liberties(group).unwrap(), 4);
        assert_eq!(partition.regions().count(), 2);
        partition.validate().unwrap();
    }

    #[test]
    fn adjacent_same_color_stones_merge() {
        let mut partition = Partition::with_size(9);
        place(
            &mut partition,
            &[("E5", State::Black), ("E6", State::Black), ("F5", State::Black)],
        );
        let group = partition.region_id_at(vertex("E5"));
        assert_eq!(partition.region_id_at(vertex("E6")), group);
        assert_eq!(partition.region_id_at(vertex("F5")), group);
        assert_eq!(partition.region(group).unwrap().size(), 3);
        assert_eq!(partition.liberties(group).unwrap(), 7);
        partition.validate().unwrap();
    }

    #[test]
    fn bridging_two_groups_joins_them() {
        let mut partition = Partition::with_size(9);
        place(&mut partition, &[("E4", State::Black), ("E6", State::Black)]);
        assert_ne!(
            partition.region_id_at(vertex("E4")),
            partition.region_id_at(vertex("E6"))
        );
        partition.set_state(vertex("E5"), State::Black).unwrap();
        assert_eq!(
            partition.region_id_at(vertex("E4")),
            partition.region_id_at(vertex("E6"))
        );
        partition.validate().unwrap();
    }

    #[test]
    fn removing_a_cut_stone_splits_the_empty_region_symmetrically() {
        // A lone stone on the 1-1 point cuts nothing; a full first-line wall does.
        let mut partition = Partition::with_size(7);
        for x in 1..=7 {
            partition
                .set_state(Vertex { x, y: 2 }, State::Black)
                .unwrap();
        }
        // The wall separates row 1 from the rest of the board.
        let below = partition.region_id_at(vertex("A1"));
        let above = partition.region_id_at(vertex("A3"));
        assert_ne!(below, above);
        assert_eq!(partition.region(below).unwrap().size(), 7);
        assert_eq!(partition.region(above).unwrap().size(), 7 * 7 - 7 - 7);
        partition.validate().unwrap();

        // Taking one wall stone away reconnects the halves.
        partition.set_state(vertex("D2"), State::Empty).unwrap();
        assert_eq!(
            partition.region_id_at(vertex("A1")),
            partition.region_id_at(vertex("A3"))
        );
        // And the wall itself is now two groups.
        assert_ne!(
            partition.region_id_at(vertex("A2")),
            partition.region_id_at(vertex("E2"))
        );
        partition.validate().unwrap();
    }

    #[test]
    fn liberties_of_empty_region_is_an_inconsistency() {
        let partition = Partition::with_size(9);
        let empty = partition.region_id_at(vertex("A1"));
        assert!(matches!(
            partition.liberties(empty),
            Err(Error::InternalInconsistency(_))
        ));
    }

    #[test]
    fn add_point_rejects_mismatches() {
        let mut partition = Partition::with_size(9);
        place(&mut partition, &[("E5", State::Black), ("A1", State::White)]);
        let group = partition.region_id_at(vertex("E5"));
        assert!(matches!(
            partition.add_point(group, vertex("E5")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            partition.add_point(group, vertex("A1")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn join_rejects_self_and_state_mismatch() {
        let mut partition = Partition::with_size(9);
        place(&mut partition, &[("E5", State::Black), ("A1", State::White)]);
        let black = partition.region_id_at(vertex("E5"));
        let white = partition.region_id_at(vertex("A1"));
        assert!(matches!(
            partition.join(black, black),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            partition.join(black, white),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn remove_point_rehomes_the_point() {
        let mut partition = Partition::with_size(9);
        place(&mut partition, &[("E5", State::Black), ("E6", State::Black)]);
        let group = partition.region_id_at(vertex("E5"));
        partition.remove_point(group, vertex("E6")).unwrap();
        let singleton = partition.region_id_at(vertex("E6"));
        assert_ne!(singleton, group);
        assert_eq!(partition.region(singleton).unwrap().size(), 1);
        assert!(matches!(
            partition.remove_point(group, vertex("E6")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn adjacent_regions_are_distinct_and_ordered() {
        let mut partition = Partition::with_size(9);
        place(
            &mut partition,
            &[("E5", State::Black), ("E4", State::White), ("E6", State::White)],
        );
        let group = partition.region_id_at(vertex("E5"));
        let adjacent = partition.adjacent_regions(group).unwrap();
        assert_eq!(adjacent.len(), 3);
        assert!(adjacent.contains(&partition.region_id_at(vertex("E4"))));
        assert!(adjacent.contains(&partition.region_id_at(vertex("E6"))));
        assert!(adjacent.contains(&partition.region_id_at(vertex("A1"))));
    }

    #[test]
    fn connecting_stone_probe_finds_stranded_subgroup() {
        // White A2-B2-C2 wall over black A1-B1-C1; the black corner group's only liberty is D1.
        // Within the white group, recoloring B2 strands nothing because A2 and C2 both keep
        // liberties of their own.
        let mut partition = Partition::with_size(9);
        place(
            &mut partition,
            &[
                ("A2", State::White),
                ("B2", State::White),
                ("C2", State::White),
                ("A1", State::Black),
                ("B1", State::Black),
            ],
        );
        let white = partition.region_id_at(vertex("B2"));
        assert_eq!(
            partition
                .connecting_stone_suicidal_subgroup(white, vertex("B2"))
                .unwrap(),
            None
        );

        // Now smother A2's liberties: black at A3 and B3 leaves the A2 sub-group with no
        // liberty of its own once B2 is recolored.
        place(&mut partition, &[("A3", State::Black), ("B3", State::Black)]);
        let white = partition.region_id_at(vertex("B2"));
        let stranded = partition
            .connecting_stone_suicidal_subgroup(white, vertex("B2"))
            .unwrap();
        assert_eq!(stranded, Some(vec![vertex("A2")]));
    }

    #[test]
    fn scoring_cache_matches_fresh_values() {
        let mut partition = Partition::with_size(9);
        place(
            &mut partition,
            &[("E5", State::Black), ("E6", State::Black), ("A1", State::White)],
        );
        let group = partition.region_id_at(vertex("E5"));
        let fresh_liberties = partition.liberties(group).unwrap();
        let fresh_adjacent = partition.adjacent_regions(group).unwrap();

        partition.enter_scoring_mode();
        assert!(partition.is_scoring_mode());
        assert_eq!(partition.liberties(group).unwrap(), fresh_liberties);
        assert_eq!(partition.adjacent_regions(group).unwrap(), fresh_adjacent);
        assert_eq!(partition.region(group).unwrap().size(), 2);

        partition.leave_scoring_mode();
        assert!(!partition.is_scoring_mode());
        assert_eq!(partition.liberties(group).unwrap(), fresh_liberties);
    }

    #[test]
    fn annotations_reset_when_scoring_mode_ends() {
        let mut partition = Partition::with_size(9);
        partition.set_state(vertex("E5"), State::Black).unwrap();
        let group = partition.region_id_at(vertex("E5"));
        partition.enter_scoring_mode();
        partition
            .region_mut(group)
            .unwrap()
            .set_stone_group_state(StoneGroupState::Dead);
        partition
            .region_mut(group)
            .unwrap()
            .set_territory_color(Some(Player::White));
        partition.leave_scoring_mode();
        assert_eq!(
            partition.region(group).unwrap().stone_group_state(),
            StoneGroupState::Undefined
        );
        assert_eq!(partition.region(group).unwrap().territory_color(), None);
    }
}

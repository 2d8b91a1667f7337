//! Todd-Coxeter coset enumeration of a one- or two-sided congruence.
//!
//! A [`Congruence`] is seeded either from a bare presentation
//! (generator count plus relations) or from an already-enumerated
//! [`crate::Semigroup`]'s Cayley tables, and constructs the coset table of
//! the quotient by repeatedly tracing relations and merging coincident
//! cosets.

mod parallel;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hypuz_util::ti::{Grid, TiVec, TypedIndex, SENTINEL};

use crate::element::Element;
use crate::error::CongruenceError;
use crate::semigroup::{Relation, Semigroup};

pub use parallel::{cong_pairs_enumerate, parallel_todd_coxeter};

hypuz_util::typed_index_struct! {
    /// Index of a coset, a row of [`Congruence`]'s tables.
    pub struct CosetId(u32);
}

/// Which side(s) of the semigroup the extra relations act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CongruenceKind {
    /// Congruence generated by left multiplication; relations are stored
    /// reversed so tracing always walks forward.
    Left,
    /// Congruence generated by right multiplication.
    Right,
    /// Congruence generated by both; `extra` is folded into `relations`.
    TwoSided,
}

type Word = Vec<usize>;
type RelationPair = (Word, Word);

/// Liveness state of a coset row, replacing the source's sign-tagged
/// backward-pointer trick with an explicit sum type.
#[derive(Debug, Clone, Copy)]
enum CosetLink {
    /// Coset is live; `prev` is its predecessor in the active doubly-linked
    /// list (`None` only for coset 0).
    Active { prev: Option<CosetId> },
    /// Coset was identified with (merged into) `target`.
    Dead { target: CosetId },
}

/// Todd-Coxeter coset table for a congruence on a finitely presented
/// semigroup or monoid.
///
/// Coset `0` is always active and is the identity class. `table[c][a]`
/// is the coset reached from `c` by generator `a`, `None` until defined.
/// Active cosets thread a doubly-linked list via `forwd`/[`CosetLink::Active`]'s
/// `prev`; once a coset is identified away it is moved onto a singly-linked
/// free list through the same `forwd` storage (the field's meaning depends
/// on the coset's [`CosetLink`]), kept for bookkeeping and for
/// [`Congruence::compress`] even though this implementation never reuses a
/// freed row for a new definition.
pub struct Congruence {
    kind: CongruenceKind,
    nr_gens: usize,
    relations: Vec<RelationPair>,
    extra: Vec<RelationPair>,

    table: Grid<Option<CosetId>>,
    preim_init: Grid<Option<CosetId>>,
    preim_next: Grid<Option<CosetId>>,

    links: TiVec<CosetId, CosetLink>,
    /// Dual meaning depending on `links[c]`: next active coset, or next free
    /// coset.
    forwd: TiVec<CosetId, Option<CosetId>>,
    last: Option<CosetId>,
    next_free: Option<CosetId>,

    /// Next row to process in the main `todd_coxeter` loop.
    current: Option<CosetId>,

    lhs_stack: Vec<CosetId>,
    rhs_stack: Vec<CosetId>,

    active: usize,
    defined: usize,
    killed: usize,
    pack: usize,
    tc_done: bool,
    is_compressed: bool,

    stop: Arc<AtomicBool>,
    stop_packing: bool,
}

impl Congruence {
    /// Builds a congruence from a bare presentation: `nr_gens` generator
    /// letters, `relations` defining the base semigroup, and `extra`
    /// relations defining the congruence on top of it.
    pub fn new(kind: CongruenceKind, nr_gens: usize, relations: Vec<RelationPair>, extra: Vec<RelationPair>) -> Self {
        let (relations, extra) = normalize(kind, relations, extra);
        let mut cong = Congruence {
            kind,
            nr_gens,
            relations,
            extra,
            table: Grid::new(nr_gens, 0, None),
            preim_init: Grid::new(nr_gens, 0, None),
            preim_next: Grid::new(nr_gens, 0, None),
            links: TiVec::new(),
            forwd: TiVec::new(),
            last: None,
            next_free: None,
            current: None,
            lhs_stack: Vec::new(),
            rhs_stack: Vec::new(),
            active: 0,
            defined: 0,
            killed: 0,
            pack: 4096,
            tc_done: false,
            is_compressed: false,
            stop: Arc::new(AtomicBool::new(false)),
            stop_packing: false,
        };
        cong.extend_active_rows(1);
        cong
    }

    /// Builds a congruence from an enumerated semigroup's generator count
    /// plus `extra` relations. When `prefill` is true, the coset table is
    /// seeded directly from the semigroup's Cayley graph (coset `c + 1`
    /// corresponds to `semigroup`'s element `c`, coset `0` is the identity
    /// class); otherwise `relations` is drained from
    /// [`Semigroup::relation_iterator`] and the table starts with just
    /// coset `0`. Requires `semigroup` to already be fully enumerated when
    /// `prefill` is true.
    pub fn with_semigroup<E: Element>(
        kind: CongruenceKind,
        semigroup: &Semigroup<E>,
        extra: Vec<RelationPair>,
        prefill: bool,
    ) -> Self {
        let nr_gens = semigroup.nr_gens();
        if !prefill {
            let mut relations = Vec::new();
            for rel in semigroup.relation_iterator() {
                match rel {
                    Relation::Product { i, a, k } => {
                        let mut lhs = semigroup.factorisation(i);
                        lhs.push(a);
                        relations.push((lhs, semigroup.factorisation(k)));
                    }
                    Relation::DuplicateGenerator { a, b } => relations.push((vec![a], vec![b])),
                }
            }
            return Congruence::new(kind, nr_gens, relations, extra);
        }

        let n = semigroup.current_size();
        let mut cong = Congruence::new(kind, nr_gens, Vec::new(), extra);
        cong.extend_active_rows(n);

        let graph = match kind {
            CongruenceKind::Left => semigroup.left_cayley_graph(),
            CongruenceKind::Right | CongruenceKind::TwoSided => semigroup.right_cayley_graph(),
        };
        for a in 0..nr_gens {
            let target = semigroup.gens_lookup(a) + 1;
            cong.table.set(0, a, Some(CosetId::try_from_index(target).expect("coset index overflow")));
        }
        for elem in 0..n {
            let row = elem + 1;
            for a in 0..nr_gens {
                let v = *graph.get(elem, a);
                if v != SENTINEL {
                    cong.table.set(row, a, Some(CosetId::try_from_index(v + 1).expect("coset index overflow")));
                }
            }
        }
        cong.rebuild_preimages();
        cong
    }

    /// Builds a congruence from an already-complete coset table; `relations`
    /// is empty under this path (the table is taken as-is).
    pub fn with_prefilled_table(
        kind: CongruenceKind,
        nr_gens: usize,
        extra: Vec<RelationPair>,
        prefilled_table: Grid<Option<CosetId>>,
    ) -> Self {
        assert_eq!(prefilled_table.cols(), nr_gens, "prefilled table width must match nr_gens");
        let (_, extra) = normalize(kind, Vec::new(), extra);
        let rows = prefilled_table.rows();
        let mut cong = Congruence {
            kind,
            nr_gens,
            relations: Vec::new(),
            extra,
            table: prefilled_table,
            preim_init: Grid::new(nr_gens, rows, None),
            preim_next: Grid::new(nr_gens, rows, None),
            links: TiVec::new(),
            forwd: TiVec::new(),
            last: None,
            next_free: None,
            current: None,
            lhs_stack: Vec::new(),
            rhs_stack: Vec::new(),
            active: 0,
            defined: 0,
            killed: 0,
            pack: 4096,
            tc_done: false,
            is_compressed: false,
            stop: Arc::new(AtomicBool::new(false)),
            stop_packing: false,
        };
        for i in 0..rows {
            let id = CosetId::try_from_index(i).expect("coset index overflow");
            let prev = cong.last;
            cong.links.push(CosetLink::Active { prev }).expect("coset index overflow");
            cong.forwd.push(None).expect("coset index overflow");
            if let Some(p) = prev {
                cong.forwd[p] = Some(id);
            }
            cong.last = Some(id);
        }
        cong.active = rows;
        cong.defined = rows;
        cong.rebuild_preimages();
        cong
    }

    fn extend_active_rows(&mut self, k: usize) {
        if k == 0 {
            return;
        }
        self.table.add_rows(k);
        self.preim_init.add_rows(k);
        self.preim_next.add_rows(k);
        let start = self.links.len();
        for i in 0..k {
            let id = CosetId::try_from_index(start + i).expect("coset index overflow");
            let prev = self.last;
            self.links.push(CosetLink::Active { prev }).expect("coset index overflow");
            self.forwd.push(None).expect("coset index overflow");
            if let Some(p) = prev {
                self.forwd[p] = Some(id);
            }
            self.last = Some(id);
        }
        self.active += k;
        self.defined += k;
    }

    fn rebuild_preimages(&mut self) {
        let rows = self.table.rows();
        for c in 0..rows {
            for a in 0..self.nr_gens {
                self.preim_init.set(c, a, None);
                self.preim_next.set(c, a, None);
            }
        }
        for c in 0..rows {
            for a in 0..self.nr_gens {
                if let Some(v) = *self.table.get(c, a) {
                    let cid = CosetId::try_from_index(c).expect("coset index overflow");
                    let old_head = *self.preim_init.get(v.to_index(), a);
                    self.preim_next.set(c, a, old_head);
                    self.preim_init.set(v.to_index(), a, Some(cid));
                }
            }
        }
    }

    fn link_preimage(&mut self, from: CosetId, a: usize, to: CosetId) {
        let old_head = *self.preim_init.get(to.to_index(), a);
        self.preim_next.set(from.to_index(), a, old_head);
        self.preim_init.set(to.to_index(), a, Some(from));
    }

    /// Single-step lookup of `table[c][a]`, without defining anything.
    fn walk(&self, c: CosetId, a: usize) -> Option<CosetId> {
        *self.table.get(c.to_index(), a)
    }

    /// Defines `table[c][a]` as a brand new coset if it isn't already
    /// defined, and returns it. Always allocates a fresh row rather than
    /// reusing one from the free list (see the type docs).
    fn new_coset(&mut self, c: CosetId, a: usize) -> Option<CosetId> {
        if self.stop.load(Ordering::Relaxed) {
            return None;
        }
        if let Some(v) = self.walk(c, a) {
            return Some(v);
        }
        let target = CosetId::try_from_index(self.table.rows()).expect("coset index overflow");
        self.extend_active_rows(1);
        self.table.set(c.to_index(), a, Some(target));
        self.link_preimage(c, a, target);
        Some(target)
    }

    fn walk_or_create(&mut self, mut c: CosetId, word: &[usize], allow_new: bool) -> Option<CosetId> {
        for &a in word {
            c = match self.walk(c, a) {
                Some(next) => next,
                None if allow_new => self.new_coset(c, a)?,
                None => return None,
            };
        }
        Some(c)
    }

    /// Traces both sides of a relation from `c`; if they land on different
    /// cosets, identifies them.
    fn trace_relation(&mut self, c: CosetId, lhs: &[usize], rhs: &[usize], allow_new: bool) {
        if self.stop.load(Ordering::Relaxed) {
            return;
        }
        let l = self.walk_or_create(c, lhs, allow_new);
        let r = self.walk_or_create(c, rhs, allow_new);
        if let (Some(l), Some(r)) = (l, r) {
            if l != r {
                self.identify_cosets(l, r);
            }
        }
    }

    fn root(&self, mut c: CosetId) -> CosetId {
        loop {
            match self.links[c] {
                CosetLink::Dead { target } => c = target,
                CosetLink::Active { .. } => return c,
            }
        }
    }

    /// Identifies (merges) cosets `x` and `y`, and transitively any further
    /// coincidences this merge implies.
    fn identify_cosets(&mut self, x: CosetId, y: CosetId) {
        if self.stop.load(Ordering::Relaxed) {
            return;
        }
        self.lhs_stack.push(x);
        self.rhs_stack.push(y);
        while let (Some(x), Some(y)) = (self.lhs_stack.pop(), self.rhs_stack.pop()) {
            if self.stop.load(Ordering::Relaxed) {
                self.lhs_stack.clear();
                self.rhs_stack.clear();
                return;
            }
            let xr = self.root(x);
            let yr = self.root(y);
            if xr == yr {
                continue;
            }
            let (keep, kill) = if xr.to_index() < yr.to_index() { (xr, yr) } else { (yr, xr) };
            self.merge(keep, kill);
        }
    }

    fn merge(&mut self, keep: CosetId, kill: CosetId) {
        let (prev, next) = match self.links[kill] {
            CosetLink::Active { prev } => (prev, self.forwd[kill]),
            CosetLink::Dead { .. } => unreachable!("merge target must be an active root"),
        };
        match prev {
            Some(p) => self.forwd[p] = next,
            None => {}
        }
        match next {
            Some(n) => {
                if let CosetLink::Active { prev: p } = &mut self.links[n] {
                    *p = prev;
                }
            }
            None => self.last = prev,
        }
        self.active -= 1;
        self.killed += 1;
        self.links[kill] = CosetLink::Dead { target: keep };
        self.forwd[kill] = self.next_free;
        self.next_free = Some(kill);

        for a in 0..self.nr_gens {
            let mut preimage = *self.preim_init.get(kill.to_index(), a);
            while let Some(v) = preimage {
                let next_preimage = *self.preim_next.get(v.to_index(), a);
                self.table.set(v.to_index(), a, Some(keep));
                self.link_preimage(v, a, keep);
                preimage = next_preimage;
            }

            let keep_out = self.walk(keep, a);
            let kill_out = self.walk(kill, a);
            match (keep_out, kill_out) {
                (Some(ko), Some(ki)) if ko != ki => {
                    self.lhs_stack.push(ko);
                    self.rhs_stack.push(ki);
                }
                (None, Some(ki)) => {
                    self.table.set(keep.to_index(), a, Some(ki));
                    self.link_preimage(keep, a, ki);
                }
                _ => {}
            }
        }
    }

    fn apply_extra(&mut self) {
        let extra = self.extra.clone();
        let coset0 = CosetId::try_from_index(0).unwrap();
        for (lhs, rhs) in &extra {
            self.trace_relation(coset0, lhs, rhs, true);
        }
    }

    /// Runs the main coset-enumeration loop: applies `extra` at coset `0`,
    /// then traces `relations` across every active coset (growing the table
    /// as needed), entering a lookahead packing pass whenever the number of
    /// active cosets crosses `pack`, until the active list is exhausted.
    /// Returns `Err(CongruenceError::Cancelled)` if the cancellation flag
    /// was set (typically by a sibling in [`parallel_todd_coxeter`]) before
    /// completion.
    pub fn todd_coxeter(&mut self) -> Result<(), CongruenceError> {
        self.apply_extra();
        let relations = self.relations.clone();
        self.current = Some(CosetId::try_from_index(0).unwrap());
        while let Some(c) = self.current {
            if self.stop.load(Ordering::Relaxed) {
                break;
            }
            if matches!(self.links[c], CosetLink::Active { .. }) {
                for (lhs, rhs) in &relations {
                    if self.stop.load(Ordering::Relaxed) {
                        break;
                    }
                    self.trace_relation(c, lhs, rhs, true);
                }
            }
            if self.active > self.pack {
                self.lookahead_pack(&relations);
            }
            self.current = self.forwd[c];
        }
        self.tc_done = !self.stop.load(Ordering::Relaxed);
        if self.tc_done {
            log::debug!("todd_coxeter finished: {} classes, {} defined, {} killed", self.active, self.defined, self.killed);
            Ok(())
        } else {
            log::debug!("todd_coxeter cancelled at {} active cosets", self.active);
            Err(CongruenceError::Cancelled)
        }
    }

    /// How many cosets of "no-new-coset" tracing must be attempted between
    /// checks of the kill rate; if fewer than [`Self::PACK_MIN_KILLS`] were
    /// reclaimed in a window this wide, packing is abandoned early.
    const PACK_WINDOW: usize = 2000;
    /// Minimum number of cosets a [`Self::PACK_WINDOW`]-sized window of
    /// packing must reclaim before it's still worth continuing.
    const PACK_MIN_KILLS: usize = 100;

    fn lookahead_pack(&mut self, relations: &[RelationPair]) {
        log::debug!("entering lookahead packing: {} active cosets (threshold {})", self.active, self.pack);
        self.stop_packing = false;
        let mut cur = Some(CosetId::try_from_index(0).unwrap());
        let mut window_start_killed = self.killed;
        let mut window_rows = 0;
        while let Some(c) = cur {
            if self.stop.load(Ordering::Relaxed) || self.stop_packing {
                break;
            }
            if matches!(self.links[c], CosetLink::Active { .. }) {
                for (lhs, rhs) in relations {
                    if self.stop.load(Ordering::Relaxed) {
                        break;
                    }
                    self.trace_relation(c, lhs, rhs, false);
                }
            }
            window_rows += 1;
            if window_rows >= Self::PACK_WINDOW {
                if self.killed - window_start_killed < Self::PACK_MIN_KILLS {
                    self.stop_packing = true;
                }
                window_start_killed = self.killed;
                window_rows = 0;
            }
            cur = self.forwd[c];
        }
        self.pack += self.pack / 10 + 1;
        log::debug!("left lookahead packing: {} active cosets (new threshold {})", self.active, self.pack);
    }

    /// Runs `todd_coxeter` to completion if it hasn't already, ignoring
    /// cancellation (callers that need to observe cancellation should call
    /// `todd_coxeter` directly instead of going through this).
    fn ensure_done(&mut self) {
        if !self.tc_done {
            let _ = self.todd_coxeter();
        }
    }

    /// Number of classes of the congruence, forcing completion first. Coset
    /// `0` is the identity class itself, not a class of the congruence, so
    /// this is `active - 1` live cosets, not `active`.
    pub fn nr_classes(&mut self) -> usize {
        self.ensure_done();
        self.active - 1
    }

    /// Looks up the coset reached from the identity class by `word`, forcing
    /// completion first and following through any cosets merged away since
    /// the edges were defined. `Left` congruences walk `word` back to front,
    /// since their relations were stored reversed at construction time;
    /// `Right`/`TwoSided` walk it front to back.
    pub fn word_to_coset(&mut self, word: &[usize]) -> Option<CosetId> {
        self.ensure_done();
        let mut c = CosetId::try_from_index(0).unwrap();
        if self.kind == CongruenceKind::Left {
            for &a in word.iter().rev() {
                let next = (*self.table.get(c.to_index(), a))?;
                c = self.root(next);
            }
        } else {
            for &a in word {
                let next = (*self.table.get(c.to_index(), a))?;
                c = self.root(next);
            }
        }
        Some(c)
    }

    /// Renumbers the active cosets (including coset 0) to a contiguous
    /// `0..active` range and discards dead rows. Idempotent.
    pub fn compress(&mut self) {
        if self.is_compressed {
            return;
        }
        let mut mapping: Vec<Option<CosetId>> = vec![None; self.table.rows()];
        let mut order = Vec::new();
        let mut cur = Some(CosetId::try_from_index(0).unwrap());
        while let Some(c) = cur {
            mapping[c.to_index()] = Some(CosetId::try_from_index(order.len()).expect("coset index overflow"));
            order.push(c);
            cur = self.forwd[c];
        }

        let mut new_table = Grid::new(self.nr_gens, 0, None);
        new_table.add_rows(order.len());
        for (new_idx, &old_c) in order.iter().enumerate() {
            for a in 0..self.nr_gens {
                let target = (*self.table.get(old_c.to_index(), a)).map(|t| {
                    mapping[self.root(t).to_index()].expect("root of a live coset must be in the compressed range")
                });
                new_table.set(new_idx, a, target);
            }
        }
        self.table = new_table;

        self.links = (0..order.len())
            .map(|i| CosetLink::Active { prev: i.checked_sub(1).map(|p| CosetId::try_from_index(p).unwrap()) })
            .collect::<Vec<_>>()
            .into();
        self.forwd = (0..order.len())
            .map(|i| (i + 1 < order.len()).then(|| CosetId::try_from_index(i + 1).unwrap()))
            .collect::<Vec<_>>()
            .into();
        self.last = order.len().checked_sub(1).map(|i| CosetId::try_from_index(i).unwrap());
        self.next_free = None;
        self.active = order.len();
        self.defined = order.len();
        self.killed = 0;
        self.preim_init = Grid::new(self.nr_gens, order.len(), None);
        self.preim_next = Grid::new(self.nr_gens, order.len(), None);
        self.rebuild_preimages();
        self.is_compressed = true;
    }

    /// Requests cancellation; in-flight and future calls to `todd_coxeter`
    /// on this instance will stop at the next poll.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Iterates the currently active coset ids, in active-list order.
    pub fn active_cosets(&self) -> impl Iterator<Item = CosetId> + '_ {
        let mut cur = Some(CosetId::try_from_index(0).unwrap()).filter(|_| self.active > 0);
        std::iter::from_fn(move || {
            let c = cur?;
            cur = self.forwd[c];
            Some(c)
        })
    }
}

fn normalize(kind: CongruenceKind, mut relations: Vec<RelationPair>, mut extra: Vec<RelationPair>) -> (Vec<RelationPair>, Vec<RelationPair>) {
    match kind {
        CongruenceKind::Left => {
            for (l, r) in relations.iter_mut().chain(extra.iter_mut()) {
                l.reverse();
                r.reverse();
            }
            (relations, extra)
        }
        CongruenceKind::Right => (relations, extra),
        CongruenceKind::TwoSided => {
            relations.extend(extra.drain(..));
            (relations, extra)
        }
    }
}

#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;

    use super::*;

    lazy_static! {
        /// `<a, b | a^2 = 1, b^3 = 1, (ab)^2 = 1>`, the symmetric group S3 as
        /// a two-sided congruence on the free monoid on `{a, b}`.
        static ref S3_RELATIONS: Vec<RelationPair> = vec![
            (vec![0, 0], vec![]),
            (vec![1, 1, 1], vec![]),
            (vec![0, 1, 0, 1], vec![]),
        ];
    }

    fn s3_relations() -> Vec<RelationPair> {
        S3_RELATIONS.clone()
    }

    #[test]
    fn two_generator_todd_coxeter_finds_s3() {
        let mut cong = Congruence::new(CongruenceKind::TwoSided, 2, s3_relations(), Vec::new());
        cong.todd_coxeter().unwrap();
        assert_eq!(cong.nr_classes(), 5);
    }

    #[test]
    fn word_to_coset_respects_relations() {
        let mut cong = Congruence::new(CongruenceKind::TwoSided, 2, s3_relations(), Vec::new());
        cong.todd_coxeter().unwrap();
        let id = cong.word_to_coset(&[]).unwrap();
        assert_eq!(cong.word_to_coset(&[0, 0]).unwrap(), id);
        assert_eq!(cong.word_to_coset(&[1, 1, 1]).unwrap(), id);
    }

    #[test]
    fn compress_preserves_class_count_and_is_idempotent() {
        let mut cong = Congruence::new(CongruenceKind::TwoSided, 2, s3_relations(), Vec::new());
        cong.todd_coxeter().unwrap();
        let n = cong.nr_classes();
        cong.compress();
        assert_eq!(cong.nr_classes(), n);
        cong.compress();
        assert_eq!(cong.nr_classes(), n);
    }

    #[test]
    fn three_generator_kbp_style_presentation() {
        // <a, b, c | a^2 = 1, b^2 = 1, c^2 = 1, (ab)^3 = 1, (bc)^3 = 1, (ac)^2 = 1>:
        // the Coxeter group of type A3, order 24.
        let relations = vec![
            (vec![0, 0], vec![]),
            (vec![1, 1], vec![]),
            (vec![2, 2], vec![]),
            (vec![0, 1, 0, 1, 0, 1], vec![]),
            (vec![1, 2, 1, 2, 1, 2], vec![]),
            (vec![0, 2, 0, 2], vec![]),
        ];
        let mut cong = Congruence::new(CongruenceKind::TwoSided, 3, relations, Vec::new());
        cong.todd_coxeter().unwrap();
        assert_eq!(cong.nr_classes(), 23);
    }

    #[test]
    fn kbp_benchmark_presentation_identifies_its_extra_relation() {
        // nr_gens = 3, relations/extra lifted from the `KBP_08_force_kbp`
        // benchmark fixture: generator 1 has order 7, generator 2 has order
        // 5, four length-5/6 relations tie them to generator 0, and the
        // extra relation folds `1221` and `11212` into one right-congruence
        // class.
        let relations = vec![
            (vec![1, 1, 1, 1, 1, 1, 1], vec![1]),
            (vec![2, 2, 2, 2, 2], vec![2]),
            (vec![1, 2, 2, 1, 0], vec![1, 2, 2, 1]),
            (vec![1, 2, 2, 1, 2], vec![1, 2, 2, 1]),
            (vec![1, 1, 2, 1, 2, 0], vec![1, 1, 2, 1, 2]),
            (vec![1, 1, 2, 1, 2, 1], vec![1, 1, 2, 1, 2]),
        ];
        let extra = vec![(vec![1, 2, 2, 1], vec![1, 1, 2, 1, 2])];
        let mut cong = Congruence::new(CongruenceKind::Right, 3, relations, extra);
        cong.todd_coxeter().unwrap();
        assert_eq!(cong.word_to_coset(&[1, 2, 2, 1]), cong.word_to_coset(&[1, 1, 2, 1, 2]));
    }

    #[test]
    fn left_kind_reverses_relation_sides() {
        let mut cong = Congruence::new(CongruenceKind::Left, 2, vec![(vec![0, 1], vec![1, 0])], Vec::new());
        cong.todd_coxeter().unwrap();
        // after reversal the relation is `(1, 0) = (0, 1)`; the two singleton
        // words should still land on distinct cosets.
        assert_ne!(cong.word_to_coset(&[0]), cong.word_to_coset(&[1]));
    }

    #[test]
    fn left_kind_word_to_coset_reverses_multi_letter_words() {
        // relation `aab = b`, read as ordinary (unreversed) words, defining a
        // left congruence: at construction this is stored reversed as
        // `baa = b`, so a query for `aab` must itself be walked back to front
        // to land on the same coset as the query for `b`.
        let extra = vec![(vec![0, 0, 1], vec![1])];
        let mut cong = Congruence::new(CongruenceKind::Left, 2, Vec::new(), extra);
        cong.todd_coxeter().unwrap();
        assert_eq!(cong.word_to_coset(&[0, 0, 1]), cong.word_to_coset(&[1]));
    }

    #[test]
    fn cancelled_enumeration_reports_cancelled() {
        let mut cong = Congruence::new(CongruenceKind::TwoSided, 2, s3_relations(), Vec::new());
        cong.cancel();
        assert_eq!(cong.todd_coxeter(), Err(CongruenceError::Cancelled));
    }

    #[test]
    fn two_generator_monoid_congruence_collapses_idempotent_powers() {
        // <a, b | a^3 = a> with the extra relation a = a^2: forces every
        // power a^n (n >= 1) into the same class as a, regardless of what
        // follows, since the congruence is compatible with right
        // multiplication.
        let relations = vec![(vec![0, 0, 0], vec![0])];
        let extra = vec![(vec![0], vec![0, 0])];
        let mut cong = Congruence::new(CongruenceKind::TwoSided, 2, relations, extra);
        cong.todd_coxeter().unwrap();

        let a_then_bs: Vec<usize> = std::iter::once(0).chain(std::iter::repeat(1).take(21)).collect();
        let a_squared_then_bs: Vec<usize> = [0, 0].into_iter().chain(std::iter::repeat(1).take(21)).collect();
        assert_eq!(cong.word_to_coset(&a_then_bs), cong.word_to_coset(&a_squared_then_bs));
    }
}

//! Closure-based enumeration of a finitely generated semigroup or monoid.
//!
//! [`Semigroup`] builds the set of distinct elements reachable from a
//! generating set by repeated multiplication, in short-lex order (shortest
//! words first, ties broken by [`Element::Ord`](crate::Element)), together
//! with left and right Cayley tables. Enumeration is incremental: only as
//! many elements as requested are ever computed, so `position`/`at`/`size`
//! can drive a lazily-growing search.

use std::collections::HashMap;

use hypuz_util::ti::{Grid, SENTINEL};

use crate::element::Element;
use crate::error::EnumerationError;

/// Default number of new elements discovered per call to [`Semigroup::enumerate`]
/// when growing the semigroup on demand (see [`Semigroup::set_batch_size`]).
const DEFAULT_BATCH_SIZE: usize = 8192;

/// A single edge of the presentation recoverable from an enumerated
/// semigroup, yielded by [`Semigroup::relation_iterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// `elements[i] * gens[a] == elements[k]`, discovered by a path other
    /// than the one that first produced `elements[k]` (i.e. a genuine
    /// relation rather than a spanning-tree edge).
    Product { i: usize, a: usize, k: usize },
    /// Generator letters `a` and `b` (`a > b`) denote the same element.
    DuplicateGenerator { a: usize, b: usize },
}

/// Closure-based enumeration of a finitely generated semigroup.
///
/// Elements are discovered in short-lex order: `elements[i]` always has word
/// length `length[i]`, and `length` is non-decreasing in `i`. Two structures
/// back every element: `first`/`suffix` let you recover the element's
/// canonical word by repeatedly peeling off the leading letter; `final_`/
/// `prefix` do the same from the trailing letter, and both are needed by the
/// closure algorithm itself (see [`Semigroup::enumerate`]).
pub struct Semigroup<E: Element> {
    /// One element per generator *letter* (length `nr_gens`); duplicate
    /// letters still get an entry here even though they don't get their own
    /// row in `elements`.
    gens: Vec<E>,
    /// `gens_lookup[a]` is the index into `elements` of the element that
    /// generator letter `a` denotes.
    gens_lookup: Vec<usize>,
    /// `(a, b)` with `a > b` and `gens[a] == gens[b]`, in discovery order.
    duplicate_gens: Vec<(usize, usize)>,

    elements: Vec<E>,
    map: HashMap<E, usize>,

    first: Vec<usize>,
    final_: Vec<usize>,
    prefix: Vec<Option<usize>>,
    suffix: Vec<Option<usize>>,
    length: Vec<usize>,

    /// Row `i`, column `a`: `elements[i] * gens[a]`, or [`SENTINEL`] if not
    /// yet known.
    right: Grid<usize>,
    /// Row `i`, column `a`: the "insert `gens[a]` in front" companion table,
    /// filled in once a whole length-block finishes (see
    /// [`Semigroup::fill_left_block`]).
    left: Grid<usize>,
    /// Row `i`, column `a`: whether `right[i][a]` was a brand-new discovery
    /// (`true`) or a repeat of an already-known element (`false`, i.e. a
    /// genuine relation).
    reduced: Grid<bool>,
    /// `multiplied[i]`: whether every column of row `i` has been filled in.
    multiplied: Vec<bool>,

    /// Block boundaries: `len_index[k]` is the first index (in `elements`)
    /// of a word of length `k + 1`.
    len_index: Vec<usize>,
    /// Cursor into `elements`: every row below `pos` is fully multiplied.
    pos: usize,
    /// Length of the words currently being discovered.
    word_len: usize,
    /// Number of relations seen so far (duplicate generators plus repeats).
    nr_rules: usize,
    /// Memoised idempotent count, invalidated by nothing (it's only ever
    /// computed once the semigroup is fully known).
    nr_idempotents: Option<usize>,

    found_one: bool,
    pos_one: Option<usize>,

    sorted: Option<Vec<usize>>,

    batch_size: usize,
}

impl<E: Element> Clone for Semigroup<E> {
    fn clone(&self) -> Self {
        Self {
            gens: self.gens.clone(),
            gens_lookup: self.gens_lookup.clone(),
            duplicate_gens: self.duplicate_gens.clone(),
            elements: self.elements.clone(),
            map: self.map.clone(),
            first: self.first.clone(),
            final_: self.final_.clone(),
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
            length: self.length.clone(),
            right: self.right.clone(),
            left: self.left.clone(),
            reduced: self.reduced.clone(),
            multiplied: self.multiplied.clone(),
            len_index: self.len_index.clone(),
            pos: self.pos,
            word_len: self.word_len,
            nr_rules: self.nr_rules,
            nr_idempotents: self.nr_idempotents,
            found_one: self.found_one,
            pos_one: self.pos_one,
            sorted: self.sorted.clone(),
            batch_size: self.batch_size,
        }
    }
}

impl<E: Element> Semigroup<E> {
    /// Seeds a new semigroup from a non-empty generating set, inferring the
    /// degree from the first generator. Generators of unequal degree are a
    /// programmer error (the degree is ambiguous) and panic rather than
    /// returning a recoverable error.
    pub fn new(gens: Vec<E>) -> Result<Self, EnumerationError> {
        if gens.is_empty() {
            return Err(EnumerationError::EmptyGenerators);
        }
        let degree = gens[0].degree();
        Self::new_with_degree(gens, degree)
    }

    /// Seeds a new semigroup from a non-empty generating set against an
    /// explicitly supplied degree, rather than inferring it from the first
    /// generator. Useful when the caller already knows the degree the
    /// generators must share and wants a single assertion point covering
    /// every generator, including the first.
    pub fn new_with_degree(gens: Vec<E>, degree: usize) -> Result<Self, EnumerationError> {
        if gens.is_empty() {
            return Err(EnumerationError::EmptyGenerators);
        }
        debug_assert!(
            gens.iter().all(|g| g.degree() == degree),
            "all generators passed to Semigroup::new_with_degree must match the given degree"
        );

        let mut sg = Semigroup {
            gens: Vec::new(),
            gens_lookup: Vec::new(),
            duplicate_gens: Vec::new(),
            elements: Vec::new(),
            map: HashMap::new(),
            first: Vec::new(),
            final_: Vec::new(),
            prefix: Vec::new(),
            suffix: Vec::new(),
            length: Vec::new(),
            right: Grid::new(0, 0, SENTINEL),
            left: Grid::new(0, 0, SENTINEL),
            reduced: Grid::new(0, 0, false),
            multiplied: Vec::new(),
            len_index: Vec::new(),
            pos: 0,
            word_len: 0,
            nr_rules: 0,
            nr_idempotents: None,
            found_one: false,
            pos_one: None,
            sorted: None,
            batch_size: DEFAULT_BATCH_SIZE,
        };
        let id = E::identity(degree);
        for g in gens {
            sg.seed_generator(g, &id);
        }
        sg.right.add_cols(sg.gens.len());
        sg.left.add_cols(sg.gens.len());
        sg.reduced.add_cols(sg.gens.len());
        sg.right.add_rows(sg.elements.len());
        sg.left.add_rows(sg.elements.len());
        sg.reduced.add_rows(sg.elements.len());
        sg.len_index.push(0);
        sg.len_index.push(sg.elements.len());
        sg.word_len = 1;
        Ok(sg)
    }

    fn seed_generator(&mut self, g: E, id: &E) {
        let letter = self.gens.len();
        if let Some(&idx) = self.map.get(&g) {
            self.duplicate_gens.push((letter, idx));
            self.nr_rules += 1;
            self.gens_lookup.push(idx);
        } else {
            let idx = self.elements.len();
            self.map.insert(g.clone(), idx);
            self.elements.push(g.clone());
            self.first.push(letter);
            self.final_.push(letter);
            self.prefix.push(None);
            self.suffix.push(None);
            self.length.push(1);
            self.multiplied.push(false);
            if &g == id {
                self.found_one = true;
                self.pos_one = Some(idx);
            }
            self.gens_lookup.push(idx);
        }
        self.gens.push(g);
    }

    /// Degree shared by every generator (and hence every element).
    pub fn degree(&self) -> usize {
        self.gens[0].degree()
    }

    /// Number of generator letters (including duplicates).
    pub fn nr_gens(&self) -> usize {
        self.gens.len()
    }

    fn right_get(&self, row: usize, col: usize) -> Option<usize> {
        let v = *self.right.get(row, col);
        (v != SENTINEL).then_some(v)
    }
    fn left_get(&self, row: usize, col: usize) -> Option<usize> {
        let v = *self.left.get(row, col);
        (v != SENTINEL).then_some(v)
    }

    /// Advances the closure until either the semigroup is fully known or it
    /// contains at least `limit` elements.
    pub fn enumerate(&mut self, limit: usize) {
        let nr_gens = self.gens.len();
        while self.pos < self.elements.len() && self.elements.len() < limit {
            let i = self.pos;
            let length_i = self.length[i];
            for a in 0..nr_gens {
                // The fast path (`reuse_product`) rederives a product already
                // implied by a shorter relation, so it never contributes a
                // new rule; only an explicit `multiply_and_lookup` that lands
                // on an already-known element is a genuine repeat.
                let (result, was_new, is_rule) = if length_i == 1 {
                    let (result, was_new) = self.multiply_and_lookup(i, a);
                    (result, was_new, !was_new)
                } else {
                    let s = self.suffix[i].expect("length > 1 implies a suffix");
                    if !*self.reduced.get(s, a) {
                        (self.reuse_product(i, a, s), false, false)
                    } else {
                        let (result, was_new) = self.multiply_and_lookup(i, a);
                        (result, was_new, !was_new)
                    }
                };
                self.right.set(i, a, result);
                self.reduced.set(i, a, was_new);
                if is_rule {
                    self.nr_rules += 1;
                }
            }
            self.multiplied[i] = true;
            self.pos += 1;

            if self.pos == *self.len_index.last().unwrap() {
                let block_start = if self.len_index.len() >= 2 {
                    self.len_index[self.len_index.len() - 2]
                } else {
                    0
                };
                self.fill_left_block(block_start, self.pos);
                self.len_index.push(self.elements.len());
                log::debug!(
                    "finished word-length block {}: {} elements, {} rules so far",
                    self.word_len,
                    self.elements.len(),
                    self.nr_rules
                );
                self.word_len += 1;
            }
        }
        if self.is_done() {
            log::debug!("enumeration complete: {} elements, {} rules", self.elements.len(), self.nr_rules);
        } else {
            log::debug!("enumeration batch boundary: {} elements known, still open", self.elements.len());
        }
    }

    fn multiply_and_lookup(&mut self, i: usize, a: usize) -> (usize, bool) {
        let mut tmp = E::identity(self.elements[i].degree());
        tmp.multiply_into(&self.elements[i], &self.gens[a]);
        if let Some(&idx) = self.map.get(&tmp) {
            (idx, false)
        } else {
            let new_idx = self.elements.len();
            let suffix_new = if self.length[i] == 1 {
                self.gens_lookup[a]
            } else {
                self.right_get(self.suffix[i].unwrap(), a)
                    .expect("suffix row already multiplied")
            };
            if &tmp == &E::identity(tmp.degree()) {
                self.found_one = true;
                self.pos_one = Some(new_idx);
            }
            self.map.insert(tmp.clone(), new_idx);
            self.elements.push(tmp);
            self.first.push(self.first[i]);
            self.final_.push(a);
            self.prefix.push(Some(i));
            self.suffix.push(Some(suffix_new));
            self.length.push(self.length[i] + 1);
            self.multiplied.push(false);
            self.right.add_rows(1);
            self.left.add_rows(1);
            self.reduced.add_rows(1);
            (new_idx, true)
        }
    }

    fn reuse_product(&self, i: usize, a: usize, s: usize) -> usize {
        let b = self.first[i];
        let r = self.right_get(s, a).expect("suffix row already multiplied");
        if self.found_one && Some(r) == self.pos_one {
            return self.gens_lookup[b];
        }
        match self.prefix[r] {
            Some(pr) => {
                let t = self.left_get(pr, b).expect("left table filled for shorter block");
                self.right_get(t, self.final_[r]).expect("right table filled for shorter block")
            }
            None => self
                .right_get(self.gens_lookup[b], self.final_[r])
                .expect("generator row already multiplied"),
        }
    }

    fn fill_left_block(&mut self, start: usize, end: usize) {
        for i in start..end {
            for j in 0..self.gens.len() {
                let value = if self.length[i] == 1 {
                    self.right_get(self.gens_lookup[j], self.final_[i])
                } else {
                    let pr = self.prefix[i].expect("length > 1 implies a prefix");
                    let t = self.left_get(pr, j).expect("left table filled for shorter block");
                    self.right_get(t, self.final_[i])
                };
                self.left.set(i, j, value.unwrap_or(SENTINEL));
            }
        }
    }

    fn ensure(&mut self, want: usize) {
        while !self.is_done() && self.elements.len() < want {
            let target = self.elements.len() + self.batch_size;
            self.enumerate(target.max(want));
        }
    }

    /// Whether enumeration has been started at all.
    pub fn is_begun(&self) -> bool {
        self.pos > 0
    }

    /// Whether every element's row has been fully multiplied; no further
    /// elements remain to be discovered.
    pub fn is_done(&self) -> bool {
        self.pos == self.elements.len()
    }

    /// Forces full enumeration and returns the final element count.
    pub fn size(&mut self) -> usize {
        self.enumerate(usize::MAX);
        self.elements.len()
    }

    /// Number of elements discovered so far, without forcing further
    /// enumeration.
    pub fn current_size(&self) -> usize {
        self.elements.len()
    }

    /// Length of the longest word among the currently discovered elements.
    pub fn current_max_word_length(&self) -> usize {
        self.word_len
    }

    /// Number of relations (duplicate generators plus repeated products)
    /// discovered so far.
    pub fn current_nr_rules(&self) -> usize {
        self.nr_rules
    }

    /// Element at short-lex position `index`, enumerating further if
    /// necessary.
    pub fn at(&mut self, index: usize) -> Result<&E, EnumerationError> {
        self.ensure(index + 1);
        if index < self.elements.len() {
            Ok(&self.elements[index])
        } else {
            Err(EnumerationError::OutOfRange { index, size: self.elements.len() })
        }
    }

    /// Element at position `index` of the `Ord`-sorted view, forcing full
    /// enumeration.
    pub fn sorted_at(&mut self, index: usize) -> Result<&E, EnumerationError> {
        self.size();
        self.ensure_sorted();
        let sorted = self.sorted.as_ref().unwrap();
        match sorted.get(index) {
            Some(&idx) => Ok(&self.elements[idx]),
            None => Err(EnumerationError::OutOfRange { index, size: sorted.len() }),
        }
    }

    fn ensure_sorted(&mut self) {
        if self.sorted.is_none() {
            use itertools::Itertools;
            let idx: Vec<usize> = (0..self.elements.len())
                .sorted_by(|&a, &b| self.elements[a].cmp(&self.elements[b]))
                .collect();
            self.sorted = Some(idx);
        }
    }

    /// Short-lex position of `e`, enumerating further if necessary.
    pub fn position(&mut self, e: &E) -> Result<usize, EnumerationError> {
        loop {
            if let Some(&idx) = self.map.get(e) {
                return Ok(idx);
            }
            if self.is_done() {
                return Err(EnumerationError::NotPresent);
            }
            let target = self.elements.len() + self.batch_size;
            self.enumerate(target);
        }
    }

    /// Position of `e` in the `Ord`-sorted view, forcing full enumeration.
    pub fn position_sorted(&mut self, e: &E) -> Result<usize, EnumerationError> {
        let idx = self.position(e)?;
        self.ensure_sorted();
        let sorted = self.sorted.as_ref().unwrap();
        sorted
            .binary_search_by(|&candidate| self.elements[candidate].cmp(e))
            .map_err(|_| EnumerationError::NotPresent)
    }

    /// Whether `e` belongs to the semigroup, enumerating further if
    /// necessary.
    pub fn test_membership(&mut self, e: &E) -> bool {
        self.position(e).is_ok()
    }

    /// Product of `elements[i]` and `elements[j]`, choosing between an
    /// outright multiplication and tracing through the Cayley graph
    /// depending on the two elements' word lengths relative to their
    /// complexity. Both operands must already be known rows.
    pub fn fast_product(&self, i: usize, j: usize) -> usize {
        let threshold = 2 * self.elements[i].complexity();
        if self.length[i] > threshold && self.length[j] > threshold {
            let tmp = self.elements[i].multiplied_by(&self.elements[j]);
            *self.map.get(&tmp).expect("semigroup is closed under multiplication")
        } else {
            self.product_by_reduction(i, j)
        }
    }

    /// Product of `elements[i]` and `elements[j]` computed purely by
    /// tracing `j`'s word through `i`'s right Cayley graph row.
    pub fn product_by_reduction(&self, i: usize, j: usize) -> usize {
        let mut cur = i;
        for a in self.factorisation(j) {
            cur = self.right_get(cur, a).expect("row already multiplied");
        }
        cur
    }

    /// Canonical word (sequence of generator letters) for `elements[i]`.
    pub fn factorisation(&self, i: usize) -> Vec<usize> {
        let mut word = Vec::with_capacity(self.length[i]);
        let mut cur = i;
        loop {
            word.push(self.first[cur]);
            match self.suffix[cur] {
                Some(s) => cur = s,
                None => break,
            }
        }
        word
    }

    /// Word length of `elements[i]`.
    pub fn length(&self, i: usize) -> usize {
        self.length[i]
    }
    /// Leading generator letter of `elements[i]`'s canonical word.
    pub fn first_letter(&self, i: usize) -> usize {
        self.first[i]
    }
    /// Trailing generator letter of `elements[i]`'s canonical word.
    pub fn final_letter(&self, i: usize) -> usize {
        self.final_[i]
    }
    /// `elements[i]` with its trailing letter removed, or `None` for a
    /// generator.
    pub fn prefix(&self, i: usize) -> Option<usize> {
        self.prefix[i]
    }
    /// `elements[i]` with its leading letter removed, or `None` for a
    /// generator.
    pub fn suffix(&self, i: usize) -> Option<usize> {
        self.suffix[i]
    }
    /// Element index denoted by generator letter `a`.
    pub fn gens_lookup(&self, a: usize) -> usize {
        self.gens_lookup[a]
    }

    /// Number of idempotents (`e` with `e * e == e`), forcing full
    /// enumeration. `threads > 1` splits the scan across a rayon pool, one
    /// disjoint index range per worker; `threads == 0` auto-detects the
    /// available parallelism via [`num_cpus::get`].
    pub fn nr_idempotents(&mut self, threads: usize) -> usize
    where
        E: Sync,
    {
        self.size();
        if let Some(n) = self.nr_idempotents {
            return n;
        }
        let threads = if threads == 0 { num_cpus::get() } else { threads };
        let n = self.elements.len();
        let count = if threads > 1 {
            use rayon::prelude::*;
            (0..n).into_par_iter().filter(|&i| self.fast_product(i, i) == i).count()
        } else {
            (0..n).filter(|&i| self.fast_product(i, i) == i).count()
        };
        self.nr_idempotents = Some(count);
        count
    }

    /// Right Cayley table: `right_cayley_graph().get(i, a)` is
    /// [`SENTINEL`](hypuz_util::ti::SENTINEL) until enumeration reaches
    /// element `i`, otherwise the index of `elements[i] * gens[a]`.
    pub fn right_cayley_graph(&self) -> &Grid<usize> {
        &self.right
    }

    /// Left-insertion table: `left_cayley_graph().get(i, a)` is the index of
    /// `gens[a]` inserted in front of `elements[i]`'s word, filled in a whole
    /// length-block at a time.
    pub fn left_cayley_graph(&self) -> &Grid<usize> {
        &self.left
    }

    /// Iterator over the relations discoverable so far (duplicate
    /// generators, then non-tree product edges).
    pub fn relation_iterator(&self) -> RelationIter<'_, E> {
        RelationIter { sg: self, i: 0, a: 0, dup_idx: 0 }
    }

    /// Sets the number of new elements discovered per internal enumeration
    /// step used by `at`/`position`/`test_membership` to grow the semigroup
    /// lazily. Must be at least 1.
    pub fn set_batch_size(&mut self, n: usize) {
        assert!(n >= 1, "batch size must be at least 1");
        self.batch_size = n;
    }

    /// Returns a new semigroup over `gens ++ extra`, re-closing from
    /// scratch. Elements of smaller degree than the current semigroup are a
    /// caller error; elements of larger degree promote every retained
    /// generator via [`Element::deep_clone_extend`].
    pub fn clone_and_add(&self, extra: Vec<E>) -> Result<Self, EnumerationError> {
        if extra.is_empty() {
            return Ok(self.clone());
        }
        let cur_degree = self.degree();
        for g in &extra {
            if g.degree() < cur_degree {
                return Err(EnumerationError::DegreeMismatch { existing: cur_degree, new: g.degree() });
            }
        }
        let new_degree = extra.iter().map(Element::degree).max().unwrap().max(cur_degree);

        let mut combined: Vec<E> = self
            .gens
            .iter()
            .map(|g| extend_to(g, new_degree))
            .collect();
        combined.extend(extra.into_iter().map(|g| {
            if new_degree > g.degree() {
                g.deep_clone_extend(new_degree - g.degree())
            } else {
                g
            }
        }));
        log::debug!(
            "add_generators: {} old generators + new generators, degree {} -> {}",
            self.gens.len(),
            cur_degree,
            new_degree
        );
        Semigroup::new(combined)
    }
}

fn extend_to<E: Element>(g: &E, degree: usize) -> E {
    if degree > g.degree() {
        g.deep_clone_extend(degree - g.degree())
    } else {
        g.clone()
    }
}

/// Iterator over the relations of a [`Semigroup`] discovered so far, yielded
/// by [`Semigroup::relation_iterator`]. Restartable via [`RelationIter::reset`].
pub struct RelationIter<'a, E: Element> {
    sg: &'a Semigroup<E>,
    i: usize,
    a: usize,
    dup_idx: usize,
}

impl<'a, E: Element> RelationIter<'a, E> {
    /// Rewinds the iterator back to the beginning.
    pub fn reset(&mut self) {
        self.i = 0;
        self.a = 0;
        self.dup_idx = 0;
    }
}

impl<'a, E: Element> Iterator for RelationIter<'a, E> {
    type Item = Relation;

    fn next(&mut self) -> Option<Relation> {
        if self.dup_idx < self.sg.duplicate_gens.len() {
            let (a, b) = self.sg.duplicate_gens[self.dup_idx];
            self.dup_idx += 1;
            return Some(Relation::DuplicateGenerator { a, b });
        }
        let nr_gens = self.sg.gens.len();
        let first_block_end = self.sg.len_index.get(1).copied().unwrap_or(0);
        while self.i < self.sg.pos {
            while self.a < nr_gens {
                let (i, a) = (self.i, self.a);
                self.a += 1;
                // Mirrors `enumerate`'s own distinction: a repeat only
                // counts as a relation if it was found by the explicit
                // lookup branch, not replayed through the fast `!reduced`
                // path (which never discovers anything new on its own).
                let took_explicit_branch =
                    i < first_block_end || *self.sg.reduced.get(self.sg.suffix[i].expect("length > 1 implies a suffix"), a);
                if !*self.sg.reduced.get(i, a) && took_explicit_branch {
                    let k = self.sg.right_get(i, a).expect("row already multiplied");
                    return Some(Relation::Product { i, a, k });
                }
            }
            self.i += 1;
            self.a = 0;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    /// Full transformations of `{0, ..., degree - 1}`, composed left-to-right
    /// (`(f * g)(x) = g(f(x))`), just enough to exercise the enumeration
    /// engine end to end.
    #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
    struct Transformation(Vec<u8>);

    impl Element for Transformation {
        fn degree(&self) -> usize {
            self.0.len()
        }
        fn complexity(&self) -> usize {
            self.0.len()
        }
        fn identity(degree: usize) -> Self {
            Transformation((0..degree as u8).collect())
        }
        fn multiply_into(&mut self, a: &Self, b: &Self) {
            self.0.clear();
            self.0.extend(a.0.iter().map(|&x| b.0[x as usize]));
        }
        fn deep_clone_extend(&self, extra_degree: usize) -> Self {
            let mut v = self.0.clone();
            let base = v.len() as u8;
            v.extend((0..extra_degree as u8).map(|k| base + k));
            Transformation(v)
        }
    }

    fn t(points: &[u8]) -> Transformation {
        Transformation(points.to_vec())
    }

    #[test]
    fn full_transformation_monoid_degree_3_has_27_elements() {
        // T_3: all 3^3 = 27 functions on {0,1,2}, generated by a 3-cycle and
        // a single non-injective map.
        let mut sg = Semigroup::new(vec![t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        assert_eq!(sg.size(), 27);
        assert!(sg.is_done());
        assert_eq!(sg.current_max_word_length(), sg.word_len);
    }

    #[test]
    fn position_and_at_round_trip() {
        let mut sg = Semigroup::new(vec![t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        sg.set_batch_size(2);
        let e = sg.at(5).unwrap().clone();
        let pos = sg.position(&e).unwrap();
        assert_eq!(sg.at(pos).unwrap(), &e);
    }

    #[test]
    fn fast_product_matches_direct_multiplication() {
        let mut sg = Semigroup::new(vec![t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        sg.size();
        for i in 0..sg.current_size() {
            for j in 0..sg.current_size() {
                let direct = sg.elements[i].multiplied_by(&sg.elements[j]);
                let via_table = sg.fast_product(i, j);
                assert_eq!(sg.elements[via_table], direct);
            }
        }
    }

    #[test]
    fn idempotent_count_auto_detects_thread_count() {
        let mut sg = Semigroup::new(vec![t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        let explicit = sg.nr_idempotents(1);
        sg.nr_idempotents = None;
        assert_eq!(sg.nr_idempotents(0), explicit);
    }

    #[test]
    fn idempotent_count_matches_brute_force() {
        let mut sg = Semigroup::new(vec![t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        let brute = {
            sg.size();
            (0..sg.current_size())
                .filter(|&i| {
                    let e = &sg.elements[i];
                    e.multiplied_by(e) == *e
                })
                .count()
        };
        assert_eq!(sg.nr_idempotents(1), brute);
        assert_eq!(sg.nr_idempotents(4), brute);
    }

    #[test]
    fn relation_iterator_pairs_are_consistent() {
        let mut sg = Semigroup::new(vec![t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        sg.size();
        for rel in sg.relation_iterator() {
            if let Relation::Product { i, a, k } = rel {
                assert_eq!(sg.elements[i].multiplied_by(&sg.gens[a]), sg.elements[k]);
            }
        }
    }

    #[test]
    fn relation_iterator_count_matches_nr_rules() {
        let t1 = t(&[0, 1, 0]);
        let t2 = t(&[0, 1, 2]);
        let mut sg = Semigroup::new(vec![t1, t2]).unwrap();
        sg.size();
        assert_eq!(sg.relation_iterator().count(), sg.current_nr_rules());
    }

    #[test]
    fn duplicate_generators_are_recorded() {
        let mut sg = Semigroup::new(vec![t(&[1, 2, 0]), t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        assert_eq!(sg.duplicate_gens.len(), 1);
        assert_eq!(sg.duplicate_gens[0], (1, 0));
        assert_eq!(sg.size(), 27);
    }

    #[test]
    fn clone_and_add_rejects_smaller_degree() {
        let sg = Semigroup::new(vec![t(&[1, 2, 0])]).unwrap();
        let err = sg.clone_and_add(vec![t(&[0])]).unwrap_err();
        assert_eq!(err, EnumerationError::DegreeMismatch { existing: 3, new: 1 });
    }

    #[test]
    fn clone_and_add_promotes_degree_and_grows() {
        let mut sg = Semigroup::new(vec![t(&[1, 0])]).unwrap();
        assert_eq!(sg.size(), 2);
        let mut bigger = sg.clone_and_add(vec![t(&[0, 1, 2, 0])]).unwrap();
        assert_eq!(bigger.degree(), 4);
        assert!(bigger.size() >= 2);
    }

    #[test]
    fn new_with_degree_matches_inferred_degree() {
        let mut a = Semigroup::new(vec![t(&[1, 2, 0]), t(&[0, 0, 1])]).unwrap();
        let mut b = Semigroup::new_with_degree(vec![t(&[1, 2, 0]), t(&[0, 0, 1])], 3).unwrap();
        assert_eq!(a.size(), b.size());
    }

    #[test]
    fn out_of_range_access_is_reported() {
        let mut sg = Semigroup::new(vec![t(&[1, 0])]).unwrap();
        let size = sg.size();
        assert_eq!(sg.at(size), Err(EnumerationError::OutOfRange { index: size, size }));
    }

    /// Builds a uniformly random transformation of the given degree.
    fn random_transformation(degree: usize, rng: &mut impl rand::Rng) -> Transformation {
        Transformation((0..degree).map(|_| rng.random_range(0..degree) as u8).collect())
    }

    #[test]
    fn randomised_small_semigroups_have_consistent_factorisations() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::seed_from_u64(0xC0FFEE);
        for _ in 0..20 {
            let degree = 2 + (rng.random_range(0..3));
            let nr_gens = 1 + rng.random_range(0..3);
            let gens: Vec<_> = (0..nr_gens).map(|_| random_transformation(degree, &mut rng)).collect();
            let mut sg = Semigroup::new(gens).unwrap();
            sg.size();
            for i in 0..sg.current_size() {
                let word = sg.factorisation(i);
                assert_eq!(word.len(), sg.length(i));
                let mut acc = sg.gens[word[0]].clone();
                for &a in &word[1..] {
                    acc = acc.multiplied_by(&sg.gens[a]);
                }
                assert_eq!(acc, sg.elements[i]);
            }
        }
    }

    /// 3x3 boolean matrices under the OR-AND (Boolean) semiring product, used
    /// only to pin the closure engine's bookkeeping against a second kind of
    /// element besides [`Transformation`].
    #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
    struct BooleanMatrix {
        degree: usize,
        entries: Vec<bool>,
    }

    impl BooleanMatrix {
        fn new(degree: usize, rows: &[&[u8]]) -> Self {
            let entries = rows.iter().flat_map(|row| row.iter().map(|&b| b != 0)).collect();
            BooleanMatrix { degree, entries }
        }
        fn get(&self, r: usize, c: usize) -> bool {
            self.entries[r * self.degree + c]
        }
    }

    impl Element for BooleanMatrix {
        fn degree(&self) -> usize {
            self.degree
        }
        fn complexity(&self) -> usize {
            self.degree * self.degree * self.degree
        }
        fn identity(degree: usize) -> Self {
            let mut entries = vec![false; degree * degree];
            for i in 0..degree {
                entries[i * degree + i] = true;
            }
            BooleanMatrix { degree, entries }
        }
        fn multiply_into(&mut self, a: &Self, b: &Self) {
            let n = a.degree;
            self.degree = n;
            self.entries.clear();
            self.entries.reserve(n * n);
            for i in 0..n {
                for k in 0..n {
                    let mut acc = false;
                    for j in 0..n {
                        acc |= a.get(i, j) && b.get(j, k);
                    }
                    self.entries.push(acc);
                }
            }
        }
        fn deep_clone_extend(&self, _extra_degree: usize) -> Self {
            unimplemented!("not exercised by these tests")
        }
    }

    #[test]
    fn small_transformation_monoid_matches_concrete_scenario() {
        let t1 = t(&[0, 1, 0]);
        let t2 = t(&[0, 1, 2]);
        let mut sg = Semigroup::new(vec![t1.clone(), t2]).unwrap();
        assert_eq!(sg.size(), 2);
        assert_eq!(sg.nr_idempotents(1), 2);
        assert_eq!(sg.current_nr_rules(), 4);
        assert_eq!(sg.position(&t1), Ok(0));
        assert_eq!(sg.position(&t(&[0, 0, 0])), Err(EnumerationError::NotPresent));
    }

    #[test]
    fn boolean_matrix_monoid_matches_concrete_scenario() {
        let e = BooleanMatrix::new(3, &[&[1, 0, 1], &[0, 1, 0], &[0, 1, 0]]);
        let z = BooleanMatrix::new(3, &[&[0, 0, 0], &[0, 0, 0], &[0, 0, 0]]);
        let mut sg = Semigroup::new(vec![e, z.clone(), z]).unwrap();
        assert_eq!(sg.duplicate_gens.len(), 1);
        assert_eq!(sg.size(), 3);
        assert_eq!(sg.nr_idempotents(1), 2);
        assert_eq!(sg.current_nr_rules(), 7);
    }

    /// 2x2 matrices over the min-plus (tropical) semiring: `+` is `min`, `*`
    /// is saturating `+` with [`MinPlusMatrix::INF`] absorbing.
    #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
    struct MinPlusMatrix {
        degree: usize,
        entries: Vec<u32>,
    }

    impl MinPlusMatrix {
        const INF: u32 = u32::MAX;

        fn new(degree: usize, rows: &[&[u32]]) -> Self {
            let entries = rows.iter().flat_map(|row| row.iter().copied()).collect();
            MinPlusMatrix { degree, entries }
        }
        fn get(&self, r: usize, c: usize) -> u32 {
            self.entries[r * self.degree + c]
        }
        fn plus(a: u32, b: u32) -> u32 {
            if a == Self::INF || b == Self::INF {
                Self::INF
            } else {
                a + b
            }
        }
    }

    impl Element for MinPlusMatrix {
        fn degree(&self) -> usize {
            self.degree
        }
        fn complexity(&self) -> usize {
            self.degree * self.degree * self.degree
        }
        fn identity(degree: usize) -> Self {
            let mut entries = vec![Self::INF; degree * degree];
            for i in 0..degree {
                entries[i * degree + i] = 0;
            }
            MinPlusMatrix { degree, entries }
        }
        fn multiply_into(&mut self, a: &Self, b: &Self) {
            let n = a.degree;
            self.degree = n;
            self.entries.clear();
            self.entries.reserve(n * n);
            for i in 0..n {
                for k in 0..n {
                    let mut acc = Self::INF;
                    for j in 0..n {
                        acc = acc.min(Self::plus(a.get(i, j), b.get(j, k)));
                    }
                    self.entries.push(acc);
                }
            }
        }
        fn deep_clone_extend(&self, _extra_degree: usize) -> Self {
            unimplemented!("not exercised by these tests")
        }
    }

    #[test]
    fn min_plus_matrix_monoid_matches_concrete_scenario() {
        const INF: u32 = MinPlusMatrix::INF;
        let a = MinPlusMatrix::new(2, &[&[1, 0], &[0, INF]]);
        let mut sg = Semigroup::new(vec![a]).unwrap();
        assert_eq!(sg.size(), 3);
        assert_eq!(sg.nr_idempotents(1), 1);
        assert_eq!(sg.current_nr_rules(), 1);
    }

    use proptest::prelude::*;

    proptest! {
        /// For every fully-multiplied row, `right[i][a]` really is the index
        /// of `elements[i] * gens[a]`.
        #[test]
        fn right_table_matches_direct_product(
            p1 in proptest::collection::vec(0u8..3, 3),
            p2 in proptest::collection::vec(0u8..3, 3),
        ) {
            let mut sg = Semigroup::new(vec![Transformation(p1), Transformation(p2)]).unwrap();
            sg.size();
            for i in 0..sg.current_size() {
                for a in 0..sg.nr_gens() {
                    let direct = sg.elements[i].multiplied_by(&sg.gens[a]);
                    let traced = sg.right_cayley_graph().get(i, a);
                    prop_assert_eq!(&sg.elements[*traced], &direct);
                }
            }
        }

        /// Walking `first[i]` then `factorisation(suffix[i])` reconstructs
        /// `elements[i]` and has the recorded length.
        #[test]
        fn factorisation_round_trips(
            p1 in proptest::collection::vec(0u8..3, 3),
            p2 in proptest::collection::vec(0u8..3, 3),
        ) {
            let mut sg = Semigroup::new(vec![Transformation(p1), Transformation(p2)]).unwrap();
            sg.size();
            for i in 0..sg.current_size() {
                let word = sg.factorisation(i);
                prop_assert_eq!(word.len(), sg.length(i));
                let mut acc = sg.gens[word[0]].clone();
                for &a in &word[1..] {
                    acc = acc.multiplied_by(&sg.gens[a]);
                }
                prop_assert_eq!(acc, sg.elements[i].clone());
            }
        }
    }
}

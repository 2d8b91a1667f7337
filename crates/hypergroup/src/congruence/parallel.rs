//! Parallel coset enumeration: race a Cayley-graph-prefilled instance
//! against a relation-only instance and keep whichever finishes first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::element::Element;
use crate::semigroup::Semigroup;

use super::{CongruenceKind, Congruence};

/// Runs `a` and `b`'s `todd_coxeter` concurrently on two scoped threads.
/// Whichever finishes first sets the other's cancellation flag; the
/// finisher is returned and the other instance is dropped.
pub fn parallel_todd_coxeter(mut a: Congruence, mut b: Congruence) -> Congruence {
    let stop_a = Arc::new(AtomicBool::new(false));
    let stop_b = Arc::new(AtomicBool::new(false));
    a.stop = stop_a.clone();
    b.stop = stop_b.clone();

    std::thread::scope(|scope| {
        let handle_a = scope.spawn(|| {
            let _ = a.todd_coxeter();
            stop_b.store(true, Ordering::Relaxed);
            a
        });
        let handle_b = scope.spawn(|| {
            let _ = b.todd_coxeter();
            stop_a.store(true, Ordering::Relaxed);
            b
        });
        let a_done = handle_a.join().expect("todd_coxeter worker panicked");
        let b_done = handle_b.join().expect("todd_coxeter worker panicked");
        if a_done.tc_done {
            a_done
        } else {
            b_done
        }
    })
}

/// Builds a prefilled instance and a relation-only instance from the same
/// semigroup and races them via [`parallel_todd_coxeter`].
pub fn cong_pairs_enumerate<E: Element>(
    kind: CongruenceKind,
    semigroup: &Semigroup<E>,
    extra: Vec<(Vec<usize>, Vec<usize>)>,
) -> Congruence {
    let a = Congruence::with_semigroup(kind, semigroup, extra.clone(), true);
    let b = Congruence::with_semigroup(kind, semigroup, extra, false);
    parallel_todd_coxeter(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn prefilled_and_relation_only_instances_agree() {
        let mut sg = Semigroup::new(vec![Transformation(vec![1, 2, 0]), Transformation(vec![0, 0, 1])]).unwrap();
        sg.size();
        let mut cong = cong_pairs_enumerate(CongruenceKind::Right, &sg, Vec::new());
        // With no extra relations the congruence is trivial: one class per
        // semigroup element.
        assert_eq!(cong.nr_classes(), sg.current_size());
    }

    #[test]
    fn parallel_driver_keeps_the_finisher() {
        let mut sg = Semigroup::new(vec![Transformation(vec![1, 2, 0]), Transformation(vec![0, 0, 1])]).unwrap();
        sg.size();
        let a = Congruence::with_semigroup(CongruenceKind::Right, &sg, Vec::new(), true);
        let b = Congruence::with_semigroup(CongruenceKind::Right, &sg, Vec::new(), false);
        let mut result = parallel_todd_coxeter(a, b);
        assert!(result.tc_done);
        assert_eq!(result.nr_classes(), sg.current_size());
    }
}

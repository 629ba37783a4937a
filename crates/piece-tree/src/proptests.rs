use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::{split_retain, Region};

#[derive(Clone, Debug)]
enum Op {
    Insert { at: usize, length: usize, data: u8 },
    Remove { at: usize, length: usize },
    Replace { at: usize, length: usize, data: u8 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        50 => (any::<usize>(), 1usize..24, 0u8..6)
            .prop_map(|(at, length, data)| Op::Insert { at, length, data }),
        35 => (any::<usize>(), 1usize..32).prop_map(|(at, length)| Op::Remove { at, length }),
        15 => (any::<usize>(), 1usize..16, 0u8..6)
            .prop_map(|(at, length, data)| Op::Replace { at, length, data }),
    ]
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..=600)
}

/// Replays one operation on the region and on a flat byte-per-position
/// model, clamping the raw coordinates into the current bounds.
fn apply(region: &mut Region<u8>, model: &mut Vec<u8>, op: &Op) {
    match *op {
        Op::Insert { at, length, data } => {
            let at = at % (model.len() + 1);
            region.insert(at, length, data);
            model.splice(at..at, std::iter::repeat(data).take(length));
        }
        Op::Remove { at, length } => {
            if model.is_empty() {
                return;
            }
            let at = at % model.len();
            let length = length.min(model.len() - at);
            region.remove(at, length);
            model.drain(at..at + length);
        }
        Op::Replace { at, length, data } => {
            if model.is_empty() {
                return;
            }
            let at = at % model.len();
            let length = length.min(model.len() - at);
            region.replace(at, length, data);
            model.splice(at..at + length, std::iter::repeat(data).take(length));
        }
    }
}

/// Expands the region back into one byte per position, checking that the
/// yielded runs are contiguous along the way.
fn flatten(region: &Region<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(region.len());
    for (offset, run) in region.iter() {
        assert_eq!(offset, out.len());
        assert!(run.length > 0);
        out.extend(std::iter::repeat(run.data).take(run.length));
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn region_matches_flat_model(ops in ops_strategy()) {
        let mut region: Region<u8> = Region::new();
        let mut model: Vec<u8> = Vec::new();

        for (step, op) in ops.iter().enumerate() {
            apply(&mut region, &mut model, op);
            prop_assert_eq!(region.len(), model.len());
            if step % 32 == 0 {
                region.validate();
            }
        }

        region.validate();
        prop_assert_eq!(flatten(&region), model);
    }

    #[test]
    fn joining_region_matches_flat_model(ops in ops_strategy()) {
        let mut region: Region<u8> =
            Region::with_policies(|_, l, r| l.data == r.data, split_retain);
        let mut model: Vec<u8> = Vec::new();

        for (step, op) in ops.iter().enumerate() {
            apply(&mut region, &mut model, op);
            prop_assert_eq!(region.len(), model.len());
            if step % 32 == 0 {
                region.validate();
            }
        }

        region.validate();
        prop_assert_eq!(flatten(&region), model);
    }

    #[test]
    fn range_agrees_with_full_iteration(ops in ops_strategy(), raw_begin in any::<usize>(), raw_end in any::<usize>()) {
        let mut region: Region<u8> = Region::new();
        let mut model: Vec<u8> = Vec::new();
        for op in ops.iter() {
            apply(&mut region, &mut model, op);
        }

        let begin = if model.is_empty() { 0 } else { raw_begin % (model.len() + 1) };
        let end = if model.is_empty() { 0 } else { begin + raw_end % (model.len() - begin + 1) };

        let narrowed: Vec<(usize, usize, u8)> = region
            .range(begin..end)
            .map(|(offset, run)| (offset, run.length, run.data))
            .collect();
        // An empty window overlaps nothing, even when it sits strictly
        // inside a run.
        let filtered: Vec<(usize, usize, u8)> = region
            .iter()
            .filter(|(offset, run)| begin < end && *offset < end && offset + run.length > begin)
            .map(|(offset, run)| (offset, run.length, run.data))
            .collect();
        prop_assert_eq!(narrowed, filtered);
    }
}

/// A long deterministic churn, heavier than the shrunk proptest cases.
#[test]
fn seeded_churn_against_flat_model() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(0x7265_6769_6f6e_7321);
    let mut region: Region<u8> = Region::new();
    let mut model: Vec<u8> = Vec::new();

    for step in 0..6000 {
        let choice = rng.gen_range(0..100u32);
        if choice < 55 || model.is_empty() {
            let at = rng.gen_range(0..=model.len());
            let length = rng.gen_range(1..=13);
            let data = rng.gen_range(0..4u8);
            region.insert(at, length, data);
            model.splice(at..at, std::iter::repeat(data).take(length));
        } else if choice < 85 {
            let at = rng.gen_range(0..model.len());
            let length = rng.gen_range(1..=(model.len() - at).min(17));
            region.remove(at, length);
            model.drain(at..at + length);
        } else {
            let at = rng.gen_range(0..model.len());
            let length = rng.gen_range(1..=(model.len() - at).min(9));
            let data = rng.gen_range(4..8u8);
            region.replace(at, length, data);
            model.splice(at..at + length, std::iter::repeat(data).take(length));
        }

        assert_eq!(region.len(), model.len());
        if step % 64 == 0 {
            region.validate();
            assert_eq!(flatten(&region), model);
        }
    }

    region.validate();
    assert_eq!(flatten(&region), model);
}

#[test]
fn seeded_churn_with_joining_runs() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(0x6a6f_696e);
    let mut region: Region<u8> = Region::with_policies(|_, l, r| l.data == r.data, split_retain);
    let mut model: Vec<u8> = Vec::new();

    for step in 0..4000 {
        let choice = rng.gen_range(0..100u32);
        // A tiny alphabet makes equal neighbors, and therefore joins,
        // common.
        let data = rng.gen_range(0..2u8);
        if choice < 60 || model.is_empty() {
            let at = rng.gen_range(0..=model.len());
            let length = rng.gen_range(1..=9);
            region.insert(at, length, data);
            model.splice(at..at, std::iter::repeat(data).take(length));
        } else {
            let at = rng.gen_range(0..model.len());
            let length = rng.gen_range(1..=(model.len() - at).min(11));
            region.remove(at, length);
            model.drain(at..at + length);
        }

        assert_eq!(region.len(), model.len());
        if step % 64 == 0 {
            region.validate();
            assert_eq!(flatten(&region), model);
        }
    }

    region.validate();
    assert_eq!(flatten(&region), model);
}

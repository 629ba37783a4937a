use piece_tree::{join_never, split_retain, Region, Run};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

fn runs_of<T: Clone + std::fmt::Debug + PartialEq>(region: &Region<T>) -> Vec<(usize, usize, T)> {
    region
        .iter()
        .map(|(offset, run)| (offset, run.length, run.data.clone()))
        .collect()
}

#[test]
fn tracks_state_through_an_editing_session() {
    // Shadow a text buffer: true marks positions that still need work.
    let mut dirty: Region<bool> =
        Region::with_policies(|_, l, r| l.data == r.data, split_retain);

    // The whole document starts dirty.
    dirty.insert(0, 100, true);

    // A worker cleans the first half.
    dirty.replace(0, 50, false);
    assert_eq!(runs_of(&dirty), vec![(0, 50, false), (50, 50, true)]);

    // Typing in the clean half dirties the new characters only.
    dirty.insert(20, 5, true);
    assert_eq!(
        runs_of(&dirty),
        vec![(0, 20, false), (20, 5, true), (25, 30, false), (55, 50, true)]
    );

    // Deleting across the seam trims the flanking runs and swallows the
    // dirty middle whole. Neither survivor was split in two, so no
    // rejoin is attempted and the clean runs stay adjacent but separate.
    dirty.remove(18, 9);
    assert_eq!(dirty.len(), 96);
    assert_eq!(
        runs_of(&dirty),
        vec![(0, 18, false), (18, 28, false), (46, 50, true)]
    );
}

#[test]
fn sequential_append_preserves_every_run() {
    let mut region: Region<u32> = Region::new();
    for i in 0..10_000u32 {
        region.insert(region.len(), 3, i);
    }
    assert_eq!(region.len(), 30_000);

    let mut expected_offset = 0;
    for (i, (offset, run)) in region.iter().enumerate() {
        assert_eq!(offset, expected_offset);
        assert_eq!(run, &Run { length: 3, data: i as u32 });
        expected_offset += 3;
    }
    assert_eq!(expected_offset, 30_000);
}

#[test]
fn interleaved_edits_match_a_flat_model() {
    let mut region: Region<u8> = Region::new();
    let mut model: Vec<u8> = Vec::new();

    // A fixed pseudo random walk touching front, middle and back.
    let mut rng = Xoshiro256StarStar::seed_from_u64(0x1234_5678);

    for round in 0..2000 {
        if round % 3 != 2 || model.is_empty() {
            let at = rng.gen_range(0..=model.len());
            let length = rng.gen_range(1..=8);
            let data = (round % 5) as u8;
            region.insert(at, length, data);
            model.splice(at..at, std::iter::repeat(data).take(length));
        } else {
            let at = rng.gen_range(0..model.len());
            let length = rng.gen_range(1..=(model.len() - at).min(12));
            region.remove(at, length);
            model.drain(at..at + length);
        }
        assert_eq!(region.len(), model.len());
    }

    let mut flattened = Vec::with_capacity(region.len());
    for (offset, run) in region.iter() {
        assert_eq!(offset, flattened.len());
        flattened.extend(std::iter::repeat(run.data).take(run.length));
    }
    assert_eq!(flattened, model);
}

#[test]
fn always_join_keeps_a_single_run() {
    let mut region: Region<u8> = Region::with_policies(|_, _, _| true, split_retain);
    for _ in 0..5000 {
        region.insert(region.len(), 1, 7);
    }
    assert_eq!(region.len(), 5000);
    assert_eq!(region.iter().count(), 1);
}

#[test]
fn join_takes_data_from_the_left_run() {
    let mut region: Region<char> = Region::with_policies(|_, _, _| true, split_retain);
    region.insert(0, 4, 'a');
    // The fresh run sits left of the old one, so its data survives.
    region.insert(0, 4, 'b');
    assert_eq!(runs_of(&region), vec![(0, 8, 'b')]);
}

#[test]
fn split_policy_can_tag_both_halves() {
    let mut region: Region<(u8, u8)> = Region::with_policies(join_never, |_, run, left, right| {
        left.data = (run.data.0, 1);
        right.data = (run.data.0, 2);
    });
    region.insert(0, 9, (5, 0));
    region.insert(3, 1, (9, 0));
    assert_eq!(
        runs_of(&region),
        vec![(0, 3, (5, 1)), (3, 1, (9, 0)), (4, 6, (5, 2))]
    );
}

#[test]
fn range_queries_return_overlapping_runs_unclipped() {
    let mut region: Region<u16> = Region::new();
    for i in 0..1000u16 {
        region.insert(region.len(), 4, i);
    }

    // A window cutting through two runs yields both of them whole.
    let hits: Vec<(usize, u16)> = region.range(6..11).map(|(o, r)| (o, r.data)).collect();
    assert_eq!(hits, vec![(4, 1), (8, 2)]);

    // Runs are never yielded twice across adjacent windows aligned on
    // run boundaries.
    let first: Vec<usize> = region.range(0..2000).map(|(o, _)| o).collect();
    let second: Vec<usize> = region.range(2000..4000).map(|(o, _)| o).collect();
    assert_eq!(first.last(), Some(&1996));
    assert_eq!(second.first(), Some(&2000));

    // Empty windows yield nothing, including at the very end.
    assert_eq!(region.range(500..500).count(), 0);
    assert_eq!(region.range(4000..4000).count(), 0);
}

#[test]
fn empty_windows_never_yield_runs() {
    let mut region: Region<u8> = Region::new();
    for (length, data) in [(11, 0), (4, 1), (10, 0), (7, 2), (8, 0)] {
        region.insert(region.len(), length, data);
    }
    // Run boundaries, points strictly inside a run, and the very end.
    for begin in [0, 11, 24, 25, 39, 40] {
        assert_eq!(region.range(begin..begin).count(), 0);
    }
    region.for_each_in_range(24, 24, |_, _| panic!("empty window visited a run"));
}

#[test]
fn range_is_stable_without_mutation() {
    let mut region: Region<u8> = Region::new();
    for i in 0..500 {
        region.insert(region.len(), 3, (i % 11) as u8);
    }
    let first: Vec<(usize, u8)> = region.range(100..391).map(|(o, r)| (o, r.data)).collect();
    let again: Vec<(usize, u8)> = region.range(100..391).map(|(o, r)| (o, r.data)).collect();
    assert!(!first.is_empty());
    assert_eq!(first, again);
}

#[test]
fn removing_everything_leaves_a_reusable_region() {
    let mut region: Region<u8> = Region::new();
    for i in 0..1000 {
        region.insert(region.len(), 2, (i % 9) as u8);
    }
    region.remove(0, region.len());
    assert_eq!(region.len(), 0);
    assert!(region.is_empty());
    assert_eq!(region.iter().count(), 0);

    region.insert(0, 11, 3);
    assert_eq!(runs_of(&region), vec![(0, 11, 3)]);
}

#[test]
fn replace_preserves_total_length() {
    let mut region: Region<u8> = Region::new();
    region.insert(0, 1000, 1);
    for at in (0..900).step_by(90) {
        region.replace(at, 45, 2);
        assert_eq!(region.len(), 1000);
    }
}

#[test]
#[should_panic]
fn insert_past_the_end_panics() {
    let mut region: Region<u8> = Region::new();
    region.insert(0, 10, 1);
    region.insert(11, 1, 2);
}

#[test]
fn zero_length_insert_changes_nothing() {
    let mut region: Region<u8> = Region::new();
    region.insert(0, 0, 1);
    assert!(region.is_empty());
    region.insert(0, 10, 1);
    region.insert(4, 0, 2);
    assert_eq!(runs_of(&region), vec![(0, 10, 1)]);
}

#[test]
#[should_panic]
fn remove_past_the_end_panics() {
    let mut region: Region<u8> = Region::new();
    region.insert(0, 10, 1);
    region.remove(5, 6);
}

#[test]
#[should_panic]
fn inverted_range_panics() {
    let mut region: Region<u8> = Region::new();
    region.insert(0, 10, 1);
    let _ = region.range(7..3).count();
}

use proptest::prelude::*;

use crate::gibbs::PersistentVec;

#[test]
fn persistent_vec_isolation_test() {
    let n = 37;
    let v1: PersistentVec<usize> = (0..n).collect();
    for i in 0..n {
        let x = 100 + i;
        let v2 = v1.update(i, x);
        assert_ne!(v1.get(i), Some(&x));
        assert_eq!(v2.get(i), Some(&x));
        for j in (0..n).filter(|j| *j != i) {
            assert_eq!(v1.get(j), v2.get(j));
        }
    }
    assert_eq!(v1.to_vec(), (0..n).collect::<Vec<_>>());
}

#[test]
fn persistent_vec_history_test() {
    // every version of a working vector stays as it was when recorded
    let mut working: PersistentVec<u32> = std::iter::repeat(0).take(10).collect();
    let mut history = vec![working.clone()];
    for step in 1..=50u32 {
        working = working.update((step as usize * 7) % 10, step);
        history.push(working.clone());
    }
    let mut expected = vec![0u32; 10];
    for (step, version) in history.iter().enumerate() {
        if step > 0 {
            expected[(step * 7) % 10] = step as u32;
        }
        assert_eq!(version.to_vec(), expected);
    }
}

#[test]
fn persistent_vec_basics_test() {
    let empty = PersistentVec::<i32>::new();
    assert!(empty.is_empty());
    assert_eq!(empty.get(0), None);
    assert_eq!(empty.iter().count(), 0);

    let single: PersistentVec<i32> = std::iter::once(5).collect();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0], 5);
    assert_eq!(single.update(0, 6).to_vec(), vec![6]);

    let v: PersistentVec<char> = "persistent".chars().collect();
    assert_eq!(v.len(), 10);
    assert_eq!(v.get(10), None);
    assert_eq!(v.iter().len(), 10);
    assert_eq!(v.iter().collect::<String>(), "persistent");
    let capitalized = v.update(0, 'P');
    let head: Vec<_> = capitalized.iter().take(3).collect();
    assert_eq!(format!("{head:?}"), "['P', 'e', 'r']");

    // an unchanged value returns the same tree
    assert!(v.update(3, 's').ptr_eq(&v));
    assert!(!v.update(3, 'x').ptr_eq(&v));
    assert_eq!(v.update(3, 'x').update(3, 's'), v);
}

#[test]
#[should_panic]
fn persistent_vec_out_of_range_update_test() {
    let v: PersistentVec<u8> = vec![1, 2, 3].into_iter().collect();
    let _ = v.update(3, 0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn persistent_vec_matches_vec(
        initial in prop::collection::vec(any::<u16>(), 1..64),
        updates in prop::collection::vec((any::<prop::sample::Index>(), any::<u16>()), 0..64),
    ) {
        let mut model = initial.clone();
        let first: PersistentVec<u16> = initial.iter().copied().collect();
        let mut versions = vec![(first, initial.clone())];
        for (index, value) in updates {
            let i = index.index(model.len());
            model[i] = value;
            let (last, _) = versions.last().unwrap();
            let next = last.update(i, value);
            versions.push((next, model.clone()));
        }
        for (version, snapshot) in &versions {
            prop_assert_eq!(version.len(), snapshot.len());
            prop_assert_eq!(&version.to_vec(), snapshot);
            for (i, value) in snapshot.iter().enumerate() {
                prop_assert_eq!(version.get(i), Some(value));
            }
        }
    }
}

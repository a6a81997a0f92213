use crate::bitmap::Bitmap32;

#[test]
fn empty_bitmap() {
    let map = Bitmap32::EMPTY;
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.first(), None);
    assert_eq!(map.into_iter().count(), 0);
}

#[test]
fn insert_and_contains() {
    let mut map = Bitmap32::EMPTY;
    map.insert(0);
    map.insert(17);
    map.insert(31);
    assert!(map.contains(0));
    assert!(map.contains(17));
    assert!(map.contains(31));
    assert!(!map.contains(16));
    assert_eq!(map.len(), 3);
}

#[test]
fn remove_clears_bit() {
    let mut map = Bitmap32::just(5).union(Bitmap32::just(9));
    map.remove(5);
    assert!(!map.contains(5));
    assert!(map.contains(9));
    assert_eq!(map.len(), 1);
}

#[test]
fn rank_counts_bits_below() {
    let map = Bitmap32::from_bits(0b1010_1010);
    assert_eq!(map.offset_of(1), 0);
    assert_eq!(map.offset_of(3), 1);
    assert_eq!(map.offset_of(5), 2);
    assert_eq!(map.offset_of(7), 3);
    // Rank of an absent bucket is still its would-be slot.
    assert_eq!(map.offset_of(4), 2);
    assert_eq!(map.offset_of(0), 0);
}

#[test]
fn select_inverts_rank() {
    let map = Bitmap32::from_bits(0b1001_0110_0000_0001);
    for offset in 0..map.len() {
        let bucket = map.bucket_at(offset);
        assert!(map.contains(bucket));
        assert_eq!(map.offset_of(bucket), offset);
    }
}

#[test]
fn set_algebra() {
    let a = Bitmap32::from_bits(0b1100);
    let b = Bitmap32::from_bits(0b0110);
    assert_eq!(a.union(b).bits(), 0b1110);
    assert_eq!(a.intersection(b).bits(), 0b0100);
    assert_eq!(a.difference(b).bits(), 0b1000);
    assert!(!a.is_disjoint(b));
    assert!(a.is_disjoint(Bitmap32::just(0)));
}

#[test]
fn iteration_is_ascending() {
    let map = Bitmap32::from_bits(0b1000_0000_0010_0101);
    let buckets: Vec<u32> = map.into_iter().collect();
    assert_eq!(buckets, vec![0, 2, 5, 15]);
    assert_eq!(map.first(), Some(0));
}

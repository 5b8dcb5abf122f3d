use battleships::{BitBoard, BitBoardError};

#[test]
fn test_try_new_sizes() {
    assert!(BitBoard::<u128, 10>::try_new().is_ok());
    let err = BitBoard::<u64, 10>::try_new();
    assert!(matches!(
        err,
        Err(BitBoardError::SizeTooLarge { n: 10, capacity: 64 })
    ));
}

#[test]
fn test_get_set_and_bounds() {
    let mut bb = BitBoard::<u128, 10>::new();
    assert!(bb.is_empty());
    bb.set(9, 9).unwrap();
    bb.set(0, 3).unwrap();
    assert!(bb.get(9, 9).unwrap());
    assert!(!bb.get(3, 0).unwrap());
    assert_eq!(bb.count_ones(), 2);
    assert_eq!(
        bb.set(10, 0),
        Err(BitBoardError::IndexOutOfBounds { row: 10, col: 0 })
    );
    assert!(bb.get(0, 10).is_err());
}

#[test]
fn test_set_bits_in_row_major_order() {
    let mut bb = BitBoard::<u128, 10>::new();
    bb.set(4, 2).unwrap();
    bb.set(0, 7).unwrap();
    bb.set(4, 1).unwrap();
    let bits: Vec<_> = bb.iter_set_bits().collect();
    assert_eq!(bits, vec![(0, 7), (4, 1), (4, 2)]);
}

#[test]
fn test_from_raw_masks_unused_bits() {
    let bb = BitBoard::<u16, 3>::from_raw(u16::MAX);
    assert_eq!(bb.count_ones(), 9);
    assert_eq!(bb.into_raw(), 0x01ff);
}

#[test]
fn test_set_operations() {
    let mut a = BitBoard::<u128, 10>::new();
    let mut b = BitBoard::<u128, 10>::new();
    a.set(1, 1).unwrap();
    a.set(2, 2).unwrap();
    b.set(2, 2).unwrap();
    b.set(3, 3).unwrap();
    assert_eq!((a & b).iter_set_bits().collect::<Vec<_>>(), vec![(2, 2)]);
    assert_eq!((a | b).count_ones(), 3);
    a |= b;
    assert_eq!(a.count_ones(), 3);
}

#[test]
fn test_intersects() {
    let mut a = BitBoard::<u128, 10>::new();
    let mut b = BitBoard::<u128, 10>::new();
    a.set(0, 0).unwrap();
    b.set(0, 1).unwrap();
    assert!(!a.intersects(&b));
    b.set(0, 0).unwrap();
    assert!(a.intersects(&b));
}

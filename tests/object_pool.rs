extern crate robogfx;

use robogfx::utils::{Handle, ObjectPool};

#[test]
fn basic() {
    let mut set = ObjectPool::<Handle, i32>::new();

    let e1 = set.create(3);
    assert_eq!(set.get(e1), Some(&3));
    assert_eq!(set.len(), 1);
    assert_eq!(set.free(e1), Some(3));
    assert_eq!(set.len(), 0);
    assert_eq!(set.get(e1), None);
    assert_eq!(set.free(e1), None);
    assert_eq!(set.len(), 0);
}

#[test]
fn iterator() {
    let mut set = ObjectPool::<Handle, i32>::new();
    for i in 0..10 {
        set.create(i);
    }

    assert_eq!(set.iter().count(), 10);

    for (i, v) in set.iter().enumerate() {
        assert_eq!(v, Handle::new(i as u32, 1));
        assert_eq!(set.get(v), Some(&(i as i32)));
    }

    for v in set.iter().collect::<Vec<_>>() {
        if let Some(value) = set.get_mut(v) {
            *value += 1;
        }
    }

    for (i, v) in set.iter().enumerate() {
        assert_eq!(set.get(v), Some(&(i as i32 + 1)));
    }
}

#[test]
fn drain() {
    let mut set = ObjectPool::<Handle, i32>::new();
    let handles: Vec<_> = (0..5).map(|i| set.create(i)).collect();

    let drained = set.drain();
    assert_eq!(drained.len(), 5);
    assert!(set.is_empty());

    for (i, (handle, value)) in drained.into_iter().enumerate() {
        assert_eq!(handle, handles[i]);
        assert_eq!(value, i as i32);
        assert!(!set.contains(handle));
    }
}

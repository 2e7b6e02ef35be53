extern crate robogfx;

use robogfx::utils::{Handle, HandlePool};

#[test]
fn handle_set() {
    let mut set: HandlePool<Handle> = HandlePool::new();
    assert_eq!(set.len(), 0);

    let e1 = set.create();
    assert!(e1.is_valid());
    assert!(set.contains(e1));
    assert_eq!(set.len(), 1);

    let mut e2 = e1;
    assert!(set.contains(e2));

    e2.invalidate();
    assert!(!e2.is_valid());
    assert!(!set.contains(e2));
    assert!(set.contains(e1));

    assert!(set.free(e1));
    assert!(!set.free(e1));
    assert!(!set.contains(e1));
    assert_eq!(set.len(), 0);
}

#[test]
fn index_reuse() {
    let mut set: HandlePool<Handle> = HandlePool::new();

    let mut v = vec![];
    for _ in 0..10 {
        v.push(set.create());
    }

    assert_eq!(set.len(), 10);
    for e in v.iter() {
        set.free(*e);
    }

    for _ in 0..10 {
        let e = set.create();
        assert!((e.index() as usize) < v.len());
        assert!(v[e.index() as usize].version() != e.version());
        assert!(!set.contains(v[e.index() as usize]));
    }
}

#[test]
fn index_compact_reuse() {
    let mut set: HandlePool<Handle> = HandlePool::new();

    let mut v = vec![];
    for _ in 0..5 {
        for _ in 0..50 {
            v.push(set.create());
        }

        let size = v.len() / 2;
        for _ in 0..size {
            let len = v.len();
            set.free(v.swap_remove(rand::random::<usize>() % len));
        }
    }

    for i in v {
        set.free(i);
    }

    for index in 0..50 {
        let handle = set.create();
        assert_eq!(handle.index(), index);
    }
}

#[test]
fn stale_handles_never_resolve() {
    let mut set: HandlePool<Handle> = HandlePool::new();
    let mut alive = vec![];
    let mut dead = vec![];

    for _ in 0..1000 {
        if alive.is_empty() || rand::random::<u8>() % 3 != 0 {
            alive.push(set.create());
        } else {
            let len = alive.len();
            let handle = alive.swap_remove(rand::random::<usize>() % len);
            assert!(set.free(handle));
            dead.push(handle);
        }
    }

    assert_eq!(set.len(), alive.len());
    for v in &alive {
        assert!(set.contains(*v));
    }

    for v in &dead {
        assert!(!set.contains(*v));
    }
}

#[test]
fn iter() {
    let mut set: HandlePool<Handle> = HandlePool::new();
    let mut v = vec![];

    for _ in 0..10 {
        v.push(set.create())
    }

    for i in (0..10).rev() {
        if i % 3 == 0 {
            set.free(v.remove(i));
        }
    }

    let handles: Vec<_> = set.iter().collect();
    assert_eq!(handles, v);
}

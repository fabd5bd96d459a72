//! Resolution properties, exercised against the in-memory mock store

use std::sync::Arc;

use libfedcast::store::mock::MockStore;
use libfedcast::{Account, FedcastError, ReachConfig, ReachResolver, Status};

fn resolver_with(store: &MockStore, config: ReachConfig) -> ReachResolver {
    ReachResolver::new(Arc::new(store.clone()), config)
}

fn resolver(store: &MockStore) -> ReachResolver {
    resolver_with(store, ReachConfig::default())
}

#[tokio::test]
async fn shared_inbox_collapses_same_server_followers() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));

    let f1 = store.add_account(Account::remote(
        "f1",
        "x.test",
        "https://x.test/inbox/f1",
        Some("https://x.test/inbox"),
    ));
    let f2 = store.add_account(Account::remote(
        "f2",
        "x.test",
        "https://x.test/inbox/f2",
        Some("https://x.test/inbox"),
    ));
    store.add_follow(&f1, &author);
    store.add_follow(&f2, &author);

    let set = resolver(&store).resolve_author(&author).await.unwrap();

    assert_eq!(set.len(), 1);
    assert!(set.contains("https://x.test/inbox"));
    assert!(!set.contains("https://x.test/inbox/f1"));
    assert!(!set.contains("https://x.test/inbox/f2"));
}

#[tokio::test]
async fn follower_without_shared_inbox_contributes_own_inbox() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let follower = store.add_account(Account::remote(
        "f",
        "y.test",
        "https://y.test/inbox/f",
        None,
    ));
    store.add_follow(&follower, &author);

    let set = resolver(&store).resolve_author(&author).await.unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains("https://y.test/inbox/f"));
}

#[tokio::test]
async fn local_followers_contribute_nothing() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let local = store.add_account(Account::local("neighbor"));
    store.add_follow(&local, &author);

    let set = resolver(&store).resolve_author(&author).await.unwrap();
    assert!(set.is_empty());
}

#[tokio::test]
async fn follower_who_is_also_mentioned_counts_once() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let both = store.add_account(Account::remote(
        "both",
        "x.test",
        "https://x.test/inbox/both",
        None,
    ));
    store.add_follow(&both, &author);
    store.add_status(Status::new(&author, 1), &[&both]);

    let set = resolver(&store).resolve_author(&author).await.unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains("https://x.test/inbox/both"));
}

#[tokio::test]
async fn mention_outside_window_is_excluded() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let outside = store.add_account(Account::remote(
        "old",
        "z.test",
        "https://z.test/inbox/old",
        None,
    ));

    // Six statuses; only the oldest mentions anyone, and the window is five
    store.add_status(Status::new(&author, 1), &[&outside]);
    for ts in 2..=6 {
        store.add_status(Status::new(&author, ts), &[]);
    }

    let set = resolver(&store).resolve_author(&author).await.unwrap();
    assert!(!set.contains("https://z.test/inbox/old"));
    assert!(set.is_empty());
}

#[tokio::test]
async fn mention_outside_window_still_reached_as_follower() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let outside = store.add_account(Account::remote(
        "old",
        "z.test",
        "https://z.test/inbox/old",
        None,
    ));
    store.add_follow(&outside, &author);

    store.add_status(Status::new(&author, 1), &[&outside]);
    for ts in 2..=6 {
        store.add_status(Status::new(&author, ts), &[]);
    }

    let set = resolver(&store).resolve_author(&author).await.unwrap();
    assert_eq!(set.len(), 1);
    assert!(set.contains("https://z.test/inbox/old"));
}

#[tokio::test]
async fn unrelated_authors_mentions_are_excluded() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let stranger = store.add_account(Account::local("stranger"));
    let unrelated = store.add_account(Account::remote(
        "u",
        "x.test",
        "https://x.test/unrelated-inbox",
        None,
    ));
    store.add_status(Status::new(&stranger, 1), &[&unrelated]);

    let set = resolver(&store).resolve_author(&author).await.unwrap();
    assert!(!set.contains("https://x.test/unrelated-inbox"));
}

#[tokio::test]
async fn author_with_no_statuses_still_reaches_followers() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let follower = store.add_account(Account::remote(
        "f",
        "x.test",
        "https://x.test/inbox/f",
        None,
    ));
    store.add_follow(&follower, &author);

    let set = resolver(&store).resolve_author(&author).await.unwrap();
    assert_eq!(set.len(), 1);
}

#[tokio::test]
async fn paged_followers_union_matches_unpaged() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    for i in 0..7 {
        let f = store.add_account(Account::remote(
            &format!("f{}", i),
            &format!("host{}.test", i),
            &format!("https://host{}.test/inbox", i),
            None,
        ));
        store.add_follow(&f, &author);
    }

    let paged = resolver_with(
        &store,
        ReachConfig {
            follower_page_size: 2,
            ..ReachConfig::default()
        },
    );
    let unpaged = resolver_with(
        &store,
        ReachConfig {
            follower_page_size: 1000,
            ..ReachConfig::default()
        },
    );

    let calls_before = store.followers_page_calls();
    let small_pages = paged.resolve_author(&author).await.unwrap();
    let paged_calls = store.followers_page_calls() - calls_before;
    let one_page = unpaged.resolve_author(&author).await.unwrap();

    let mut a: Vec<&str> = small_pages.iter().collect();
    let mut b: Vec<&str> = one_page.iter().collect();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
    assert_eq!(small_pages.len(), 7);
    // 7 followers at page size 2 needs four pages
    assert_eq!(paged_calls, 4);
}

#[tokio::test]
async fn failing_followers_source_fails_whole_resolution() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let mentioned = store.add_account(Account::remote(
        "m",
        "y.test",
        "https://y.test/inbox/m",
        None,
    ));
    store.add_status(Status::new(&author, 1), &[&mentioned]);
    store.fail_followers(true);

    // The mention-derived endpoint must not leak out as a partial result
    let err = resolver(&store).resolve_author(&author).await.unwrap_err();
    assert!(matches!(err, FedcastError::Store(_)));
}

#[tokio::test]
async fn failing_mentions_source_fails_whole_resolution() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let follower = store.add_account(Account::remote(
        "f",
        "x.test",
        "https://x.test/inbox/f",
        None,
    ));
    store.add_follow(&follower, &author);
    store.fail_statuses(true);

    let err = resolver(&store).resolve_author(&author).await.unwrap_err();
    assert!(matches!(err, FedcastError::Store(_)));
}

#[tokio::test]
async fn failing_mention_lookup_fails_whole_resolution() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    let mentioned = store.add_account(Account::remote(
        "m",
        "y.test",
        "https://y.test/inbox/m",
        None,
    ));
    store.add_status(Status::new(&author, 1), &[&mentioned]);
    store.fail_mentions(true);

    let err = resolver(&store).resolve_author(&author).await.unwrap_err();
    assert!(matches!(err, FedcastError::Store(_)));
}

#[tokio::test]
async fn resolve_chunked_concatenation_equals_full_resolution() {
    let store = MockStore::new();
    let author = store.add_account(Account::local("author"));
    for i in 0..5 {
        let f = store.add_account(Account::remote(
            &format!("f{}", i),
            &format!("host{}.test", i),
            &format!("https://host{}.test/inbox", i),
            None,
        ));
        store.add_follow(&f, &author);
    }
    let status = Status::new(&author, 1);
    store.add_status(status.clone(), &[]);

    let resolver = resolver(&store);
    let full: Vec<String> = resolver
        .resolve(&status)
        .await
        .unwrap()
        .into_urls();

    let chunks: Vec<Vec<String>> = resolver
        .resolve_chunked(&status, 2)
        .await
        .unwrap()
        .collect();

    let sizes: Vec<usize> = chunks.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let concatenated: Vec<String> = chunks.into_iter().flatten().collect();
    assert_eq!(concatenated, full);
}

#[tokio::test]
async fn concurrent_resolutions_are_independent() {
    let store = MockStore::new();
    let a = store.add_account(Account::local("a"));
    let b = store.add_account(Account::local("b"));
    let fa = store.add_account(Account::remote("fa", "x.test", "https://x.test/inbox/fa", None));
    let fb = store.add_account(Account::remote("fb", "y.test", "https://y.test/inbox/fb", None));
    store.add_follow(&fa, &a);
    store.add_follow(&fb, &b);

    let resolver = Arc::new(resolver(&store));
    let (left, right) = tokio::join!(
        {
            let r = Arc::clone(&resolver);
            let a = a.clone();
            async move { r.resolve_author(&a).await }
        },
        {
            let r = Arc::clone(&resolver);
            let b = b.clone();
            async move { r.resolve_author(&b).await }
        }
    );

    let left = left.unwrap();
    let right = right.unwrap();
    assert!(left.contains("https://x.test/inbox/fa"));
    assert!(!left.contains("https://y.test/inbox/fb"));
    assert!(right.contains("https://y.test/inbox/fb"));
    assert!(!right.contains("https://x.test/inbox/fa"));
}

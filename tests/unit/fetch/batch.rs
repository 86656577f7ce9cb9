use super::*;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Default)]
struct ScriptedFetcher {
    calls: AtomicUsize,
    slow_saw_cancel: AtomicBool,
}

impl ResourceFetcher for ScriptedFetcher {
    fn fetch(&self, locator: &ResourceLocator, cancel: &CancelToken) -> CardResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let ResourceLocator::Local(name) = locator else {
            return Ok(locator.to_string().into_bytes());
        };
        match name.as_str() {
            "bad.png" => Err(CardError::fetch("no such asset")),
            "slow.png" => {
                let start = Instant::now();
                while start.elapsed() < Duration::from_secs(5) {
                    if cancel.is_cancelled() {
                        self.slow_saw_cancel.store(true, Ordering::SeqCst);
                        return Err(CardError::cancelled("slow fetch"));
                    }
                    std::thread::sleep(Duration::from_millis(5));
                }
                Ok(b"slow".to_vec())
            }
            other => Ok(other.as_bytes().to_vec()),
        }
    }
}

fn locators(pairs: &[(&str, &str)]) -> BTreeMap<String, ResourceLocator> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), ResourceLocator::parse(v).unwrap()))
        .collect()
}

#[test]
fn every_key_lands_in_the_bundle() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let bundle = fetch_all(
        fetcher.clone(),
        &locators(&[("avatar", "ava.png"), ("logo", "logo.png"), ("background", "bg.jpg")]),
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(bundle.len(), 3);
    assert_eq!(bundle.get("avatar"), Some(&b"ava.png"[..]));
    assert_eq!(bundle.get("logo"), Some(&b"logo.png"[..]));
    assert_eq!(
        bundle.keys().collect::<Vec<_>>(),
        vec!["avatar", "background", "logo"]
    );
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn one_failure_fails_the_whole_batch() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let result = fetch_all(
        fetcher,
        &locators(&[("a", "ok.png"), ("b", "bad.png")]),
        &CancelToken::new(),
    );

    let err = result.unwrap_err();
    assert!(matches!(err, CardError::Fetch(_)));
    assert!(err.to_string().contains("b (asset:bad.png)"), "{err}");
}

#[test]
fn failure_cancels_slow_siblings_and_returns_early() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let start = Instant::now();
    let err = fetch_all(
        fetcher.clone(),
        &locators(&[("slow", "slow.png"), ("bad", "bad.png")]),
        &CancelToken::new(),
    )
    .unwrap_err();

    assert!(matches!(err, CardError::Fetch(_)));
    assert!(start.elapsed() < Duration::from_secs(3));

    let wait = Instant::now();
    while !fetcher.slow_saw_cancel.load(Ordering::SeqCst) && wait.elapsed() < Duration::from_secs(3)
    {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(fetcher.slow_saw_cancel.load(Ordering::SeqCst));
}

#[test]
fn caller_deadline_aborts_the_batch() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let start = Instant::now();
    let err = fetch_all(
        fetcher,
        &locators(&[("slow", "slow.png")]),
        &CancelToken::with_timeout(Duration::from_millis(50)),
    )
    .unwrap_err();

    assert!(err.is_cancelled(), "{err}");
    assert!(start.elapsed() < Duration::from_secs(3));
}

#[test]
fn already_cancelled_token_issues_no_fetches() {
    let fetcher = Arc::new(ScriptedFetcher::default());
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = fetch_all(fetcher.clone(), &locators(&[("a", "ok.png")]), &cancel).unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_batch_is_an_empty_bundle() {
    let bundle = fetch_all(
        Arc::new(ScriptedFetcher::default()),
        &BTreeMap::new(),
        &CancelToken::new(),
    )
    .unwrap();
    assert!(bundle.is_empty());
}

#[test]
fn bundle_take_moves_bytes_out() {
    let mut bundle = fetch_all(
        Arc::new(ScriptedFetcher::default()),
        &locators(&[("logo", "logo.png")]),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(bundle.take("logo"), Some(b"logo.png".to_vec()));
    assert!(bundle.take("logo").is_none());
}

//! Load lifecycle of a window

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use headless_browser::net::{FetchError, PolicyHooks, ResourceCache, ResourceFetcher};
use headless_browser::{BrowserConfig, BrowserError, LoadError, LoadState, Window};

/// Serves `/* <identity> */` for every identity except ones containing "missing"
#[derive(Default)]
struct StubFetcher {
    requested: RefCell<Vec<String>>,
}

impl ResourceFetcher for StubFetcher {
    fn fetch(
        &self,
        identity: &str,
        _headers: Vec<(String, String)>,
    ) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        self.requested.borrow_mut().push(identity.to_string());
        let identity = identity.to_string();
        async move {
            if identity.contains("missing") {
                Err(FetchError::Io(std::io::ErrorKind::NotFound.into()))
            } else {
                Ok(format!("/* {identity} */"))
            }
        }
        .boxed_local()
    }
}

fn stub_config() -> (BrowserConfig, Rc<StubFetcher>) {
    let fetcher = Rc::new(StubFetcher::default());
    let mut config = BrowserConfig::new();
    config.fetcher = fetcher.clone();
    (config, fetcher)
}

fn counter() -> (Rc<Cell<usize>>, impl FnOnce() + 'static) {
    let count = Rc::new(Cell::new(0));
    let handle = count.clone();
    (count, move || handle.set(handle.get() + 1))
}

const ONE_SHEET: &str = r#"<html><head><link rel="stylesheet" href="a.css"></head><body></body></html>"#;

#[test]
fn onload_fires_once_after_stylesheets_load() {
    let (config, fetcher) = stub_config();
    let window = headless_browser::sync(ONE_SHEET, config).unwrap();

    let (loaded, onload) = counter();
    window.set_onload(onload);
    assert_eq!(loaded.get(), 0, "onload must not run inside the assignment");
    assert!(matches!(window.state(), LoadState::Pending));

    window.run().unwrap();
    assert_eq!(loaded.get(), 1);
    assert!(matches!(window.state(), LoadState::Settled(Ok(()))));
    assert_eq!(*fetcher.requested.borrow(), vec!["a.css"]);

    let document = window.document();
    let sheets = document.style_sheets();
    assert_eq!(sheets.length(), 1);
    let sheet = sheets.item(0).unwrap();
    assert_eq!(document.element(sheet.owner_node()).unwrap().tag_name(), "LINK");
    assert!(sheet.css_rules().is_none());
}

#[test]
fn failed_stylesheet_fires_onerror_only() {
    let (config, _fetcher) = stub_config();
    let window = headless_browser::sync(
        r#"<link rel=stylesheet href="a.css"><link rel=stylesheet href="missing.css">"#,
        config,
    )
    .unwrap();

    let (loaded, onload) = counter();
    let errors: Rc<RefCell<Vec<String>>> = Rc::default();
    let seen = errors.clone();
    window.set_onload(onload);
    window.set_onerror(move |err: &LoadError| seen.borrow_mut().push(err.identity().to_string()));

    let err = window.run().unwrap_err();
    assert_eq!(err.identity(), "missing.css");
    assert_eq!(*errors.borrow(), vec!["missing.css"]);
    assert_eq!(loaded.get(), 0);
}

#[test]
fn assigning_onerror_alone_starts_nothing() {
    let (config, fetcher) = stub_config();
    let window = headless_browser::sync(ONE_SHEET, config).unwrap();

    window.set_onerror(|_| {});
    window.run().unwrap();
    assert!(matches!(window.state(), LoadState::Idle));
    assert!(fetcher.requested.borrow().is_empty());
}

#[test]
fn disabled_css_loading_fires_on_next_tick() {
    let (config, fetcher) = stub_config();
    let window = headless_browser::sync(ONE_SHEET, config.with_load_css_file(false)).unwrap();

    let (loaded, onload) = counter();
    window.set_onload(onload);
    assert_eq!(loaded.get(), 0);
    assert!(matches!(window.state(), LoadState::Idle));

    window.run().unwrap();
    assert_eq!(loaded.get(), 1);
    assert!(fetcher.requested.borrow().is_empty());
}

#[test]
fn page_without_external_sheets_still_loads() {
    let (config, _fetcher) = stub_config();
    let window = headless_browser::sync("<style>p { color: red }</style>", config).unwrap();

    let (loaded, onload) = counter();
    window.set_onload(onload);
    window.run().unwrap();
    assert_eq!(loaded.get(), 1);
}

#[test]
fn handlers_fire_at_most_once() {
    let (config, fetcher) = stub_config();
    let window = headless_browser::sync(ONE_SHEET, config).unwrap();

    let (loaded, onload) = counter();
    window.set_onload(onload);
    window.run().unwrap();
    window.run().unwrap();

    let (late, late_onload) = counter();
    window.set_onload(late_onload);
    window.run().unwrap();

    assert_eq!(loaded.get(), 1);
    assert_eq!(late.get(), 0);
    assert_eq!(fetcher.requested.borrow().len(), 1);
}

#[test]
fn reassigning_onload_replaces_the_pending_handler() {
    let (config, fetcher) = stub_config();
    let window = headless_browser::sync(ONE_SHEET, config).unwrap();

    let (first, first_onload) = counter();
    let (second, second_onload) = counter();
    window.set_onload(first_onload);
    window.set_onload(second_onload);
    window.run().unwrap();

    assert_eq!(first.get(), 0);
    assert_eq!(second.get(), 1);
    assert_eq!(fetcher.requested.borrow().len(), 1);
}

#[test]
fn unhandled_error_is_kept_as_the_outcome() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let (config, _fetcher) = stub_config();
    let window =
        headless_browser::sync(r#"<link rel=stylesheet href="missing.css">"#, config).unwrap();

    let (loaded, onload) = counter();
    window.set_onload(onload);
    let err = window.run().unwrap_err();

    assert_eq!(err.to_string(), "resource load failed: \"missing.css\"");
    assert!(matches!(window.state(), LoadState::Settled(Err(_))));
    assert_eq!(loaded.get(), 0);
}

#[test]
fn hrefs_resolve_against_the_base_uri() {
    let (config, fetcher) = stub_config();
    let config = config.with_base_uri("/srv/site/index.html");
    let window = headless_browser::sync(
        r#"<link rel=stylesheet href="css/a.css"><link rel=stylesheet href="http://cdn.example/b.css">"#,
        config,
    )
    .unwrap();

    window.set_onload(|| {});
    window.run().unwrap();
    assert_eq!(
        *fetcher.requested.borrow(),
        vec!["/srv/site/css/a.css", "http://cdn.example/b.css"]
    );
}

#[test]
fn base_element_overrides_configured_base() {
    let (config, fetcher) = stub_config();
    let window = headless_browser::sync(
        r#"<head><base href="http://example.com/app/"><link rel=stylesheet href="a.css"></head>"#,
        config.with_base_uri("/srv/index.html"),
    )
    .unwrap();

    window.set_onload(|| {});
    window.run().unwrap();
    assert_eq!(*fetcher.requested.borrow(), vec!["http://example.com/app/a.css"]);
}

#[test]
fn fetched_text_stays_in_the_loader_cache() {
    let (config, fetcher) = stub_config();
    let window = headless_browser::sync(ONE_SHEET, config).unwrap();
    window.set_onload(|| {});
    window.run().unwrap();

    let text = smol::block_on(window.loader().get("a.css")).unwrap();
    assert_eq!(text, "/* a.css */");
    assert_eq!(fetcher.requested.borrow().len(), 1);
}

#[test]
fn windows_sharing_a_cache_fetch_once() {
    let (config, fetcher) = stub_config();
    let config = config.with_cache(ResourceCache::new());

    for _ in 0..2 {
        let window = headless_browser::sync(ONE_SHEET, config.clone()).unwrap();
        window.set_onload(|| {});
        window.run().unwrap();
    }
    assert_eq!(fetcher.requested.borrow().len(), 1);
}

#[test]
fn ignored_stylesheets_do_not_block_onload() {
    let (config, fetcher) = stub_config();
    let config = config.with_policy(PolicyHooks::new().with_ignore(|id| id.contains("missing")));
    let window =
        headless_browser::sync(r#"<link rel=stylesheet href="missing.css">"#, config).unwrap();

    let (loaded, onload) = counter();
    window.set_onload(onload);
    window.run().unwrap();
    assert_eq!(loaded.get(), 1);
    assert!(fetcher.requested.borrow().is_empty());
}

#[test]
fn policy_hooks_may_read_the_window_during_onload_assignment() {
    let slot: Rc<RefCell<Weak<Window>>> = Rc::new(RefCell::new(Weak::new()));
    let observed: Rc<RefCell<Vec<bool>>> = Rc::default();

    let (window_slot, log) = (slot.clone(), observed.clone());
    let (config, _fetcher) = stub_config();
    let config = config.with_policy(PolicyHooks::new().with_before_load(move |_| {
        if let Some(window) = window_slot.borrow().upgrade() {
            log.borrow_mut().push(matches!(window.state(), LoadState::Idle));
        }
    }));

    let window = Rc::new(headless_browser::sync(ONE_SHEET, config).unwrap());
    *slot.borrow_mut() = Rc::downgrade(&window);

    window.set_onload(|| {});
    assert_eq!(*observed.borrow(), vec![true]);
    assert!(matches!(window.state(), LoadState::Pending));
    window.run().unwrap();
}

// Top-level operations

#[test]
fn browser_resolves_with_the_loaded_window() {
    let (config, _fetcher) = stub_config();
    let window: Window = smol::block_on(headless_browser::browser(ONE_SHEET, config)).unwrap();
    assert!(matches!(window.state(), LoadState::Settled(Ok(()))));
}

#[test]
fn browser_rejects_with_the_load_error() {
    let (config, _fetcher) = stub_config();
    let result = smol::block_on(headless_browser::browser(
        r#"<link rel=stylesheet href="missing.css">"#,
        config,
    ));
    match result {
        Err(BrowserError::Load(err)) => assert_eq!(err.identity(), "missing.css"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn open_reads_a_local_page_and_its_sheets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("css")).unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        r#"<title>Local</title><link rel="stylesheet" href="css/site.css">"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("css/site.css"), "body { margin: 0 }").unwrap();

    let page = dir.path().join("index.html").display().to_string();
    let window = smol::block_on(headless_browser::open(&page, BrowserConfig::new())).unwrap();

    assert_eq!(window.document().title().unwrap(), "Local");
    assert_eq!(window.document().base_uri(), page);

    let sheet = dir.path().join("css/site.css").display().to_string();
    assert_eq!(window.external_stylesheets(), vec![sheet.clone()]);
    let text = smol::block_on(window.loader().get(&sheet)).unwrap();
    assert_eq!(text, "body { margin: 0 }");
}

#[test]
fn open_fails_for_a_missing_page() {
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("absent.html").display().to_string();

    let result = smol::block_on(headless_browser::open(&page, BrowserConfig::new()));
    assert!(matches!(result, Err(BrowserError::Load(err)) if err.identity() == page));
}

#[test]
fn sync_returns_an_idle_window() {
    let window = headless_browser::sync("<p>x</p>", BrowserConfig::new()).unwrap();
    assert!(matches!(window.state(), LoadState::Idle));
    assert!(window.document().body().is_some());
}

//! Window and load lifecycle
//!
//! A [`Window`] owns one parsed document and coordinates its load:
//!
//! ```text
//! Idle --set_onload--> Pending --all sheets loaded--> Settled(Ok)
//!                              \--any sheet failed--> Settled(Err)
//! ```
//!
//! Assigning `onload` starts stylesheet loading. Handlers never run inside
//! the assignment; they run while the window's executor is driven by
//! [`Window::settle`], each at most once.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use futures_util::future::join_all;
use headless_dom::Document;
use headless_net::{LoadError, ResourceLoader};
use smol::{LocalExecutor, Task};

use crate::config::BrowserConfig;
use crate::resolve::resolve_href;

type LoadHandler = Box<dyn FnOnce()>;
type ErrorHandler = Box<dyn FnOnce(&LoadError)>;

/// Where a page load stands
#[derive(Debug, Clone)]
pub enum LoadState {
    /// No onload handler assigned yet
    Idle,
    /// External stylesheets are being fetched
    Pending,
    /// Terminal: every stylesheet loaded, or the first failure
    Settled(Result<(), LoadError>),
}

impl LoadState {
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadState::Settled(_))
    }
}

struct Lifecycle {
    state: LoadState,
    onload: Option<LoadHandler>,
    onerror: Option<ErrorHandler>,
    task: Option<Task<()>>,
}

impl Lifecycle {
    fn new() -> Self {
        Self {
            state: LoadState::Idle,
            onload: None,
            onerror: None,
            task: None,
        }
    }
}

/// Synthetic window around one document
pub struct Window {
    document: Rc<Document>,
    loader: ResourceLoader,
    load_css_file: bool,
    executor: LocalExecutor<'static>,
    lifecycle: Rc<RefCell<Lifecycle>>,
}

impl Window {
    pub fn new(document: Document, config: &BrowserConfig) -> Self {
        Self {
            document: Rc::new(document),
            loader: config.loader(),
            load_css_file: config.load_css_file,
            executor: LocalExecutor::new(),
            lifecycle: Rc::new(RefCell::new(Lifecycle::new())),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The loader stylesheets were fetched through; its cache keeps their text
    pub fn loader(&self) -> &ResourceLoader {
        &self.loader
    }

    pub fn state(&self) -> LoadState {
        self.lifecycle.borrow().state.clone()
    }

    /// Assign the completion handler and start loading.
    ///
    /// Reassigning before the load settles restarts the wait with the new
    /// handler. After settlement the handler is dropped unused.
    pub fn set_onload(&self, onload: impl FnOnce() + 'static) {
        if self.lifecycle.borrow().state.is_settled() {
            tracing::debug!("onload assigned after the load settled; ignored");
            return;
        }

        let hrefs = if self.load_css_file {
            self.external_stylesheets()
        } else {
            Vec::new()
        };

        // Policy hooks and fetchers run here and may read the window back.
        let loads: Vec<_> = hrefs.iter().map(|href| self.loader.get(href)).collect();

        let pending = !loads.is_empty();

        let task = if pending {
            tracing::info!(count = loads.len(), "loading external stylesheets");
            let weak = Rc::downgrade(&self.lifecycle);
            self.executor.spawn(async move {
                let outcome = join_all(loads)
                    .await
                    .into_iter()
                    .find_map(Result::err)
                    .map_or(Ok(()), Err);
                if let Some(lifecycle) = weak.upgrade() {
                    settle(&lifecycle, outcome);
                }
            })
        } else {
            let weak = Rc::downgrade(&self.lifecycle);
            self.executor.spawn(async move {
                smol::future::yield_now().await;
                if let Some(lifecycle) = weak.upgrade() {
                    settle(&lifecycle, Ok(()));
                }
            })
        };

        let previous = {
            let mut lifecycle = self.lifecycle.borrow_mut();
            lifecycle.onload = Some(Box::new(onload));
            if pending {
                lifecycle.state = LoadState::Pending;
            }
            lifecycle.task.replace(task)
        };
        // Dropping a previous task cancels its wait.
        drop(previous);
    }

    /// Assign the error handler. Only stores it; loading starts with onload.
    pub fn set_onerror(&self, onerror: impl FnOnce(&LoadError) + 'static) {
        self.lifecycle.borrow_mut().onerror = Some(Box::new(onerror));
    }

    /// Drive the load until it settles and return the outcome.
    ///
    /// Returns `Ok(())` straight away when no onload handler was assigned.
    pub async fn settle(&self) -> Result<(), LoadError> {
        loop {
            let task = self.lifecycle.borrow_mut().task.take();
            match task {
                Some(task) => self.executor.run(task).await,
                None => break,
            }
        }

        match &self.lifecycle.borrow().state {
            LoadState::Settled(outcome) => outcome.clone(),
            LoadState::Idle | LoadState::Pending => Ok(()),
        }
    }

    /// Blocking form of [`Window::settle`]
    pub fn run(&self) -> Result<(), LoadError> {
        smol::block_on(self.settle())
    }

    /// Resolved hrefs of the document's external stylesheets, in order
    pub fn external_stylesheets(&self) -> Vec<String> {
        let base = self.document.base_uri();
        self.document
            .style_sheets()
            .external()
            .filter_map(|sheet| sheet.href())
            .map(|href| resolve_href(base, href))
            .collect()
    }
}

fn settle(lifecycle: &RefCell<Lifecycle>, outcome: Result<(), LoadError>) {
    let (onload, onerror) = {
        let mut lifecycle = lifecycle.borrow_mut();
        if lifecycle.state.is_settled() {
            return;
        }
        lifecycle.state = LoadState::Settled(outcome.clone());
        match &outcome {
            Ok(()) => (lifecycle.onload.take(), None),
            Err(_) => {
                lifecycle.onload = None;
                (None, lifecycle.onerror.take())
            }
        }
    };

    match outcome {
        Ok(()) => {
            tracing::info!("page loaded");
            if let Some(onload) = onload {
                onload();
            }
        }
        Err(err) => match onerror {
            Some(onerror) => onerror(&err),
            None => tracing::error!(error = %err, "unhandled load error"),
        },
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("base_uri", &self.document.base_uri())
            .field("load_css_file", &self.load_css_file)
            .field("state", &self.lifecycle.borrow().state)
            .finish_non_exhaustive()
    }
}

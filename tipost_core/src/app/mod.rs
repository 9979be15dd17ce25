//! Application root: owns the store, the remote client and the persisted
//! shadow copy, and turns user intents into remote calls whose results are
//! committed to the store when they come back.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::ApiClient;
use crate::config::TiPostConfig;
use crate::models::{Post, PostDraft, PostId};
use crate::notice::{Notice, NoticeKind};
use crate::persistence::{FileStorage, Persistor};
use crate::routes::{Resolved, Route};
use crate::store::{PostStore, Snapshot};
use crate::utils::{next_local_id, now_utc_iso};
use crate::view::{filter_posts, total_pages, PageCursor, PageView};

mod messages;
mod tasks;

pub use messages::{
    AppMessage, CREATED_TEXT, CREATE_FAILED_TEXT, DELETED_TEXT, DELETE_FAILED_TEXT,
    FETCH_FAILED_TEXT, UPDATED_TEXT, UPDATE_FAILED_TEXT,
};

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub fetch_limit: usize,
    pub notice_lifetime: Duration,
}

impl AppOptions {
    pub fn from_config(config: &TiPostConfig) -> Self {
        Self {
            fetch_limit: config.fetch_limit,
            notice_lifetime: config.notice_lifetime,
        }
    }
}

pub struct TiPostApp {
    client: ApiClient,
    persistor: Persistor,
    store: PostStore,
    options: AppOptions,
    tx: UnboundedSender<AppMessage>,
    rx: UnboundedReceiver<AppMessage>,
    store_changed: Arc<AtomicBool>,
    in_flight: usize,
    draft: PostDraft,
    editing: Option<Post>,
    search: String,
    cursor: PageCursor,
    notice: Option<Notice>,
    route: Route,
}

impl TiPostApp {
    /// Restores the last persisted list and wires persistence to the store.
    pub fn new(client: ApiClient, persistor: Persistor, options: AppOptions) -> Self {
        let restored = persistor.restore();
        let mut store = PostStore::with_posts(restored);
        store.subscribe(persistor.listener());

        let store_changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&store_changed);
        store.subscribe(move |_| flag.store(true, Ordering::Release));

        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            persistor,
            store,
            options,
            tx,
            rx,
            store_changed,
            in_flight: 0,
            draft: PostDraft::default(),
            editing: None,
            search: String::new(),
            cursor: PageCursor::default(),
            notice: None,
            route: Route::default(),
        }
    }

    pub fn from_config(config: &TiPostConfig) -> Result<Self> {
        let client = ApiClient::new(config.api_base_url.clone())
            .with_context(|| format!("invalid API base URL {}", config.api_base_url))?;
        let storage = Arc::new(FileStorage::new(config.paths.data_dir.clone()));
        Ok(Self::new(
            client,
            Persistor::new(storage),
            AppOptions::from_config(config),
        ))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn persistor(&self) -> &Persistor {
        &self.persistor
    }

    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Waits for the next settled remote call.
    pub async fn next_message(&mut self) -> Option<AppMessage> {
        self.rx.recv().await
    }

    /// Applies every message that has already arrived. Returns how many.
    pub fn drain_messages(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            applied += 1;
        }
        applied
    }

    /// Loads the first page of the remote collection in the background.
    pub fn hydrate(&mut self) {
        self.in_flight += 1;
        tasks::fetch_posts(self.client.clone(), self.tx.clone(), self.options.fetch_limit);
    }

    /// Sends the current draft. Blank drafts are ignored and `false` is
    /// returned.
    pub fn submit_create(&mut self) -> bool {
        if self.editing.is_some() || !self.draft.is_submittable() {
            return false;
        }
        let payload = Post::from_draft(next_local_id(), &self.draft, now_utc_iso());
        tracing::debug!(post_id = payload.id, "sending new post");
        self.in_flight += 1;
        tasks::create_post(self.client.clone(), self.tx.clone(), payload);
        true
    }

    /// Sends the record being edited. Nothing happens outside edit mode or
    /// when the edit left the title or body blank.
    pub fn submit_update(&mut self) -> bool {
        let Some(editing) = self.editing.as_ref() else {
            return false;
        };
        if editing.title.trim().is_empty() || editing.body.trim().is_empty() {
            return false;
        }
        let mut post = editing.clone();
        if post.created_at.is_empty() {
            post.created_at = now_utc_iso();
        }
        self.in_flight += 1;
        tasks::update_post(self.client.clone(), self.tx.clone(), post);
        true
    }

    pub fn submit_delete(&mut self, id: PostId) {
        self.in_flight += 1;
        tasks::delete_post(self.client.clone(), self.tx.clone(), id);
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    pub fn editing(&self) -> Option<&Post> {
        self.editing.as_ref()
    }

    /// Copies a stored post into the edit slot. `false` if it is unknown.
    pub fn begin_edit(&mut self, id: PostId) -> bool {
        match self.store.get(id) {
            Some(post) => {
                self.editing = Some(post.clone());
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.draft.clear();
    }

    /// Edits the title of the record being edited, or of the draft.
    pub fn set_title(&mut self, title: impl Into<String>) {
        match self.editing.as_mut() {
            Some(post) => post.title = title.into(),
            None => self.draft.title = title.into(),
        }
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        match self.editing.as_mut() {
            Some(post) => post.body = body.into(),
            None => self.draft.body = body.into(),
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.cursor.reset();
        }
    }

    pub fn filtered(&self) -> Vec<Post> {
        filter_posts(&self.store.snapshot(), &self.search)
    }

    /// The page currently shown, derived from the live snapshot.
    pub fn page_view(&self) -> PageView {
        PageView::build(&self.filtered(), self.cursor)
    }

    pub fn next_page(&mut self) {
        let pages = total_pages(self.filtered().len());
        self.cursor.next(pages);
    }

    pub fn prev_page(&mut self) {
        self.cursor.prev();
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn navigate(&mut self, path: &str) -> Resolved {
        let resolved = Route::resolve(path);
        self.route = resolved.route();
        resolved
    }

    pub fn current_notice(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|notice| !notice.is_expired(now))
    }

    fn show_notice(&mut self, kind: NoticeKind, text: &str, now: Instant) {
        self.notice = Some(Notice::new(kind, text, now, self.options.notice_lifetime));
    }

    /// Resets the grid to its first page whenever the store has changed.
    fn sync_view(&mut self) {
        if self.store_changed.swap(false, Ordering::AcqRel) {
            self.cursor.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClientError, Operation};
    use crate::persistence::MemoryStorage;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;

    fn post(id: PostId, title: &str) -> Post {
        Post {
            id,
            title: title.into(),
            body: format!("{title} body"),
            created_at: "2024-02-02T02:02:02.000Z".into(),
        }
    }

    fn failure(operation: Operation) -> ClientError {
        ClientError::HttpStatus {
            operation,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn app_with(posts: Vec<Post>) -> TiPostApp {
        let persistor = Persistor::new(Arc::new(MemoryStorage::new()));
        persistor.snapshot(&posts).unwrap();
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        TiPostApp::new(
            client,
            persistor,
            AppOptions {
                fetch_limit: 10,
                notice_lifetime: Duration::from_secs(3),
            },
        )
    }

    #[test]
    fn restores_persisted_posts_on_start() {
        let app = app_with(vec![post(1, "a"), post(2, "b")]);
        assert_eq!(app.store().len(), 2);
    }

    #[test]
    fn failed_create_leaves_store_untouched() {
        let mut app = app_with(vec![post(1, "a"), post(2, "b")]);
        app.set_title("new");
        app.set_body("content");
        let before = app.snapshot();

        app.handle_message(AppMessage::PostCreated(Err(failure(Operation::Create))));

        assert_eq!(*app.snapshot(), *before);
        assert_eq!(app.draft(), &PostDraft::new("new", "content"));
        let notice = app.current_notice(Instant::now()).expect("notice shown");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, CREATE_FAILED_TEXT);
    }

    #[test]
    fn successful_create_prepends_and_clears_draft() {
        let mut app = app_with(vec![post(1, "a")]);
        app.set_title("new");
        app.set_body("content");

        app.handle_message(AppMessage::PostCreated(Ok(post(101, "new"))));

        let ids: Vec<_> = app.snapshot().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![101, 1]);
        assert_eq!(app.draft(), &PostDraft::default());
        assert_eq!(app.persistor().restore(), *app.snapshot());
    }

    #[test]
    fn update_success_replaces_and_leaves_edit_mode() {
        let mut app = app_with(vec![post(1, "a"), post(2, "b")]);
        assert!(app.begin_edit(2));
        app.set_title("b edited");
        let edited = app.editing().cloned().expect("editing");

        app.handle_message(AppMessage::PostUpdated {
            post: edited,
            result: Ok(()),
        });

        assert!(app.editing().is_none());
        assert_eq!(app.snapshot()[1].title, "b edited");
    }

    #[test]
    fn update_failure_keeps_editing_and_store() {
        let mut app = app_with(vec![post(1, "a")]);
        app.begin_edit(1);
        app.set_title("changed");
        let edited = app.editing().cloned().expect("editing");

        app.handle_message(AppMessage::PostUpdated {
            post: edited,
            result: Err(failure(Operation::Update)),
        });

        assert_eq!(app.snapshot()[0].title, "a");
        assert_eq!(app.editing().map(|p| p.title.as_str()), Some("changed"));
        assert_eq!(
            app.current_notice(Instant::now()).map(|n| n.text.as_str()),
            Some(UPDATE_FAILED_TEXT)
        );
    }

    #[test]
    fn delete_result_controls_removal() {
        let mut app = app_with(vec![post(1, "a"), post(2, "b")]);
        app.handle_message(AppMessage::PostDeleted {
            id: 1,
            result: Err(failure(Operation::Delete)),
        });
        assert_eq!(app.store().len(), 2);

        app.handle_message(AppMessage::PostDeleted { id: 1, result: Ok(()) });
        assert_eq!(app.store().len(), 1);
        assert_eq!(
            app.current_notice(Instant::now()).map(|n| n.text.as_str()),
            Some(DELETED_TEXT)
        );
    }

    #[test]
    fn failed_hydration_keeps_restored_posts_and_shows_notice() {
        let mut app = app_with(vec![post(1, "a")]);
        app.handle_message(AppMessage::PostsLoaded(Err(failure(Operation::Fetch))));
        assert_eq!(app.store().len(), 1);
        let notice = app.current_notice(Instant::now()).expect("notice shown");
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.text, FETCH_FAILED_TEXT);
    }

    #[test]
    fn notices_expire() {
        let mut app = app_with(Vec::new());
        let shown = Instant::now();
        app.handle_message_at(AppMessage::PostCreated(Ok(post(5, "x"))), shown);
        assert!(app.current_notice(shown + Duration::from_secs(1)).is_some());
        assert!(app.current_notice(shown + Duration::from_secs(4)).is_none());
    }

    #[test]
    fn blank_drafts_and_edits_are_not_sent() {
        let mut app = app_with(vec![post(1, "a")]);
        app.set_title("   ");
        app.set_body("body");
        assert!(!app.submit_create());
        assert!(!app.submit_update());

        app.begin_edit(1);
        app.set_body("");
        assert!(!app.submit_update());
        assert_eq!(app.in_flight(), 0);
    }

    #[test]
    fn cancel_edit_clears_draft_and_edit_slot() {
        let mut app = app_with(vec![post(1, "a")]);
        app.set_title("draft title");
        app.begin_edit(1);
        app.set_title("ignored");
        app.cancel_edit();
        assert!(app.editing().is_none());
        assert_eq!(app.draft(), &PostDraft::default());
        assert_eq!(app.snapshot()[0].title, "a");
    }

    #[test]
    fn search_and_store_changes_reset_paging() {
        let posts: Vec<Post> = (1..=12).map(|i| post(i, &format!("post {i}"))).collect();
        let mut app = app_with(posts);
        app.next_page();
        app.next_page();
        assert_eq!(app.page_view().page, 3);
        assert_eq!(app.page_view().posts.len(), 2);
        app.next_page();
        assert_eq!(app.page_view().page, 3);

        app.set_search("POST 1");
        let view = app.page_view();
        assert_eq!(view.page, 1);
        assert_eq!(view.total_matches, 4);

        app.set_search("");
        app.next_page();
        app.handle_message(AppMessage::PostDeleted { id: 12, result: Ok(()) });
        assert_eq!(app.page_view().page, 1);
    }

    #[test]
    fn navigation_redirects_unknown_paths() {
        let mut app = app_with(Vec::new());
        assert_eq!(app.navigate("/post"), Resolved::Render(Route::Posts));
        assert_eq!(app.route(), Route::Posts);
        assert_eq!(app.navigate("/missing"), Resolved::Redirect(Route::Home));
        assert_eq!(app.route(), Route::Home);
    }
}

//! Scripted in-memory page for unit tests.
//!
//! Selectors are plain keywords ("thread", "text", "reply-button", ...)
//! understood by [`test_locators`]. Threads become visible in batches as
//! the page is scrolled down, like a lazily loading comment list. The
//! keyword `!error` makes any query fail.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet};

use ytharvest_core::{Field, LocatorRule, LocatorTable};

use crate::error::PageError;
use crate::locator::LocatorSet;
use crate::page::Page;

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeThread {
    pub text: Option<String>,
    pub author: Option<String>,
    pub timestamp: Option<String>,
    pub likes: Option<String>,
    pub reply_authors: Vec<String>,
    pub reply_button: bool,
    pub input: bool,
    pub submit: bool,
    pub cancel: bool,
}

impl FakeThread {
    pub fn new(text: &str, author: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            author: Some(author.to_string()),
            timestamp: Some("1 day ago".to_string()),
            likes: Some("3".to_string()),
            ..Self::default()
        }
    }

    /// A thread with every reply control present.
    pub fn replyable(text: &str, author: &str) -> Self {
        Self {
            reply_button: true,
            input: true,
            submit: true,
            cancel: true,
            ..Self::new(text, author)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FakeNode {
    Thread(usize),
    Text(usize),
    Author(usize),
    Timestamp(usize),
    Likes(usize),
    ReplyAuthor(usize, usize),
    ReplyButton(usize),
    Input(usize),
    Submit(usize),
    Cancel(usize),
    Doc(usize),
}

#[derive(Debug, Default)]
struct DocElement {
    key: String,
    text: Option<String>,
    attrs: HashMap<String, String>,
}

pub(crate) struct FakePage {
    threads: Vec<FakeThread>,
    initial_visible: usize,
    per_scroll: usize,
    docs: Vec<DocElement>,
    pub scroll_y: Cell<i64>,
    pub down_scrolls: Cell<usize>,
    pub scroll_calls: RefCell<Vec<i64>>,
    pub restored_to: RefCell<Vec<(i64, bool)>>,
    pub pointer_moves: Cell<usize>,
    pub queries: Cell<usize>,
    pub open_editors: RefCell<HashSet<usize>>,
    pub drafts: RefCell<HashMap<usize, String>>,
    pub posted: RefCell<Vec<(usize, String)>>,
    pub cancelled: RefCell<Vec<usize>>,
    pub clicks: RefCell<Vec<FakeNode>>,
}

impl FakePage {
    /// Every thread visible up front.
    pub fn new(threads: Vec<FakeThread>) -> Self {
        let visible = threads.len();
        Self::lazy(threads, visible, 0)
    }

    /// `initial` threads visible, `per_scroll` more after each downward scroll.
    pub fn lazy(threads: Vec<FakeThread>, initial: usize, per_scroll: usize) -> Self {
        Self {
            threads,
            initial_visible: initial,
            per_scroll,
            docs: Vec::new(),
            scroll_y: Cell::new(0),
            down_scrolls: Cell::new(0),
            scroll_calls: RefCell::new(Vec::new()),
            restored_to: RefCell::new(Vec::new()),
            pointer_moves: Cell::new(0),
            queries: Cell::new(0),
            open_editors: RefCell::new(HashSet::new()),
            drafts: RefCell::new(HashMap::new()),
            posted: RefCell::new(Vec::new()),
            cancelled: RefCell::new(Vec::new()),
            clicks: RefCell::new(Vec::new()),
        }
    }

    fn doc_mut(&mut self, key: &str) -> &mut DocElement {
        if let Some(idx) = self.docs.iter().position(|d| d.key == key) {
            return &mut self.docs[idx];
        }
        self.docs.push(DocElement {
            key: key.to_string(),
            ..DocElement::default()
        });
        let last = self.docs.len() - 1;
        &mut self.docs[last]
    }

    pub fn with_doc_text(mut self, key: &str, text: &str) -> Self {
        self.doc_mut(key).text = Some(text.to_string());
        self
    }

    pub fn with_doc_attr(mut self, key: &str, attr: &str, value: &str) -> Self {
        self.doc_mut(key)
            .attrs
            .insert(attr.to_string(), value.to_string());
        self
    }

    pub fn visible(&self) -> usize {
        (self.initial_visible + self.per_scroll * self.down_scrolls.get()).min(self.threads.len())
    }

    fn scoped(&self, thread: usize, selector: &str) -> Vec<FakeNode> {
        let t = &self.threads[thread];
        let editor_open = self.open_editors.borrow().contains(&thread);
        match selector {
            "text" if t.text.is_some() => vec![FakeNode::Text(thread)],
            "author" if t.author.is_some() => vec![FakeNode::Author(thread)],
            "time" if t.timestamp.is_some() => vec![FakeNode::Timestamp(thread)],
            "likes" if t.likes.is_some() => vec![FakeNode::Likes(thread)],
            "reply-author" => (0..t.reply_authors.len())
                .map(|k| FakeNode::ReplyAuthor(thread, k))
                .collect(),
            "reply-button" if t.reply_button => vec![FakeNode::ReplyButton(thread)],
            "input" if t.input && editor_open => vec![FakeNode::Input(thread)],
            "submit" if t.submit && editor_open => vec![FakeNode::Submit(thread)],
            "cancel" if t.cancel && editor_open => vec![FakeNode::Cancel(thread)],
            _ => Vec::new(),
        }
    }
}

impl Page for FakePage {
    type Node = FakeNode;

    async fn query_all(
        &self,
        scope: Option<&FakeNode>,
        selector: &str,
    ) -> Result<Vec<FakeNode>, PageError> {
        self.queries.set(self.queries.get() + 1);
        if selector == "!error" {
            return Err(PageError::Backend("scripted failure".to_string()));
        }
        match scope {
            Some(FakeNode::Thread(i)) => Ok(self.scoped(*i, selector)),
            Some(_) => Ok(Vec::new()),
            None if selector == "thread" => Ok((0..self.visible()).map(FakeNode::Thread).collect()),
            None => Ok(self
                .docs
                .iter()
                .position(|d| d.key == selector)
                .map(FakeNode::Doc)
                .into_iter()
                .collect()),
        }
    }

    async fn text(&self, node: &FakeNode) -> Result<Option<String>, PageError> {
        let value = match *node {
            FakeNode::Thread(i) => self.threads[i].text.clone(),
            FakeNode::Text(i) => self.threads[i].text.clone(),
            FakeNode::Author(i) => self.threads[i].author.clone(),
            FakeNode::Timestamp(i) => self.threads[i].timestamp.clone(),
            FakeNode::Likes(i) => self.threads[i].likes.clone(),
            FakeNode::ReplyAuthor(i, k) => self.threads[i].reply_authors.get(k).cloned(),
            FakeNode::ReplyButton(_) | FakeNode::Submit(_) => Some("Reply".to_string()),
            FakeNode::Cancel(_) => Some("Cancel".to_string()),
            FakeNode::Input(i) => Some(self.drafts.borrow().get(&i).cloned().unwrap_or_default()),
            FakeNode::Doc(d) => self.docs[d].text.clone(),
        };
        Ok(value)
    }

    async fn attribute(&self, node: &FakeNode, name: &str) -> Result<Option<String>, PageError> {
        match *node {
            FakeNode::Doc(d) => Ok(self.docs[d].attrs.get(name).cloned()),
            _ => Ok(None),
        }
    }

    async fn click(&self, node: &FakeNode) -> Result<(), PageError> {
        self.clicks.borrow_mut().push(*node);
        match *node {
            FakeNode::ReplyButton(i) => {
                self.open_editors.borrow_mut().insert(i);
            }
            FakeNode::Submit(i) => {
                let draft = self.drafts.borrow_mut().remove(&i).unwrap_or_default();
                self.posted.borrow_mut().push((i, draft));
                self.open_editors.borrow_mut().remove(&i);
            }
            FakeNode::Cancel(i) => {
                self.drafts.borrow_mut().remove(&i);
                self.cancelled.borrow_mut().push(i);
                self.open_editors.borrow_mut().remove(&i);
            }
            _ => {}
        }
        Ok(())
    }

    async fn fill(&self, node: &FakeNode, text: &str) -> Result<(), PageError> {
        match *node {
            FakeNode::Input(i) => {
                self.drafts.borrow_mut().insert(i, text.to_string());
                Ok(())
            }
            _ => Err(PageError::Unsupported("fill on a non-editable node")),
        }
    }

    async fn scroll_into_view(&self, _node: &FakeNode) -> Result<(), PageError> {
        Ok(())
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), PageError> {
        self.scroll_calls.borrow_mut().push(dy);
        self.scroll_y.set(self.scroll_y.get() + dy);
        // jitter moves are smaller than a real scroll step and load nothing
        if dy > 600 {
            self.down_scrolls.set(self.down_scrolls.get() + 1);
        }
        Ok(())
    }

    async fn scroll_position(&self) -> Result<i64, PageError> {
        Ok(self.scroll_y.get())
    }

    async fn scroll_to(&self, y: i64, smooth: bool) -> Result<(), PageError> {
        self.restored_to.borrow_mut().push((y, smooth));
        self.scroll_y.set(y);
        Ok(())
    }

    async fn viewport(&self) -> Result<(u32, u32), PageError> {
        Ok((1280, 720))
    }

    async fn pointer_move(&self, _x: u32, _y: u32) -> Result<(), PageError> {
        self.pointer_moves.set(self.pointer_moves.get() + 1);
        Ok(())
    }
}

/// Rule table speaking [`FakePage`]'s selector keywords.
pub(crate) fn test_table() -> LocatorTable {
    let mut locators = BTreeMap::new();
    let mut add = |field: Field, rules: Vec<LocatorRule>| {
        locators.insert(field, rules);
    };
    add(Field::Thread, vec![LocatorRule::text("thread")]);
    add(
        Field::CommentText,
        vec![LocatorRule::text("missing"), LocatorRule::text("text")],
    );
    add(Field::CommentAuthor, vec![LocatorRule::text("author")]);
    add(Field::CommentTimestamp, vec![LocatorRule::text("time")]);
    add(Field::CommentLikes, vec![LocatorRule::text("likes")]);
    add(Field::CommentsSection, vec![LocatorRule::text("section")]);
    add(Field::ReplyAuthor, vec![LocatorRule::text("reply-author")]);
    add(Field::VideoTitle, vec![LocatorRule::text("title")]);
    add(Field::ViewCount, vec![LocatorRule::text("views")]);
    add(
        Field::VideoLikes,
        vec![
            LocatorRule::attr("like-button", "aria-label")
                .with_pattern(r"(?i)along with ([\d,]+)"),
            LocatorRule::text("like-text").rejecting("Like"),
        ],
    );
    add(
        Field::LikeButtonState,
        vec![LocatorRule::attr("flexy", "like-button-state")],
    );
    add(Field::UploadDate, vec![LocatorRule::text("date")]);
    add(Field::ChannelName, vec![LocatorRule::text("channel")]);
    add(Field::SubscriberCount, vec![LocatorRule::text("subs")]);
    add(Field::ChannelAvatar, vec![LocatorRule::attr("avatar", "src")]);
    add(Field::StructuredData, vec![LocatorRule::text("ld-json")]);
    add(Field::OwnChannelName, vec![LocatorRule::text("own-name")]);
    add(
        Field::OwnChannelLink,
        vec![LocatorRule::attr("own-link", "href")],
    );
    add(Field::ReplyButton, vec![LocatorRule::text("reply-button")]);
    add(Field::ReplyInput, vec![LocatorRule::text("input")]);
    add(Field::SubmitButton, vec![LocatorRule::text("submit")]);
    add(Field::CancelButton, vec![LocatorRule::text("cancel")]);
    LocatorTable { locators }
}

pub(crate) fn test_locators() -> LocatorSet {
    LocatorSet::new(&test_table()).unwrap()
}

pub mod cdp;
pub mod collector;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod html;
mod jsonld;
pub mod locator;
pub mod pacing;
pub mod page;
pub mod poll;
pub mod reply;

#[cfg(test)]
mod testing;

pub use cdp::CdpPage;
pub use collector::collect;
pub use dedup::DedupIndex;
pub use dispatch::{
    DispatchSettings, Dispatcher, ErrorKind, ErrorPayload, ExtractFormat, Notification, Request,
    Response,
};
pub use error::{EngineError, PageError, ReplyFailure};
pub use extract::{extract_comment, extract_comment_texts, extract_video_metadata};
pub use html::{HtmlNode, HtmlPage};
pub use locator::{LocatorSet, Resolved};
pub use pacing::Pacer;
pub use page::Page;
pub use poll::{poll_until, PollPolicy, PollReport, PollTarget};
pub use reply::reply_to_up_to_n;

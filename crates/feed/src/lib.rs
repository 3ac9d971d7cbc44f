// ABOUTME: Event feed core library: record model, value normalizers, filtering, dedup, and RSS assembly.
// ABOUTME: Pure and synchronous; the extract crate produces EventRecords, this crate merges and serializes them.

pub mod assemble;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod html_utils;
pub mod image_utils;
pub mod models;
pub mod record;
pub mod time_parse;

pub use assemble::{assemble_feed, FeedStyle};
pub use dedup::{dedup, dedup_key, merge_and_dedup, DEFAULT_FEED_CAP};
pub use error::FeedError;
pub use filter::{filter_blob, Filter, FilterMatcher};
pub use html_utils::{clean_text, decode_entities, normalize_key, strip_html};
pub use image_utils::{absolute_url, image_mime_type, resolve_image_url, resolve_url};
pub use models::{ChannelMeta, EventRecord};
pub use record::{EventDraft, RecordContext};
pub use time_parse::{format_pub_date, normalize_pub_date, parse_flexible_time};

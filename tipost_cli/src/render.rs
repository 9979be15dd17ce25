use std::time::Instant;

use chrono::{DateTime, Local};
use tipost_core::app::TiPostApp;
use tipost_core::notice::NoticeKind;
use tipost_core::Post;

const PREVIEW_CHARS: usize = 60;

pub fn page(app: &TiPostApp) {
    let view = app.page_view();
    if view.is_empty() {
        println!("No similar posts found");
        return;
    }
    if !app.search().is_empty() {
        println!("Search: {:?} ({} match(es))", app.search(), view.total_matches);
    }
    for post in &view.posts {
        println!(
            "  [{}] {}  {}\n      {}",
            post.id,
            display_date(&post.created_at),
            post.title,
            preview(&post.body)
        );
    }
    if view.shows_pagination() {
        println!("  -- page {} of {} --", view.page, view.total_pages);
    }
}

pub fn post_detail(post: &Post) {
    println!("[{}] {}", post.id, display_date(&post.created_at));
    println!("{}", post.title);
    println!();
    println!("{}", post.body);
}

pub fn form(app: &TiPostApp) {
    match app.editing() {
        Some(post) => {
            println!("Edit Post {}", post.id);
            println!("  title: {}", post.title);
            println!("  body:  {}", post.body);
        }
        None => {
            println!("Create a New Post");
            println!("  title: {}", app.draft().title);
            println!("  body:  {}", app.draft().body);
        }
    }
}

pub fn notice(app: &TiPostApp, now: Instant) {
    if let Some(notice) = app.current_notice(now) {
        let marker = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        println!("[{marker}] {}", notice.text);
    }
}

fn display_date(created_at: &str) -> String {
    DateTime::parse_from_rfc3339(created_at)
        .map(|stamp| stamp.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

fn preview(body: &str) -> String {
    let flat = body.replace('\n', " ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
    format!("{cut}...")
}

use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use tipost_core::app::TiPostApp;
use tipost_core::routes::{Resolved, Route};
use tipost_core::PostId;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

enum LoopAction {
    Continue,
    Exit,
}

/// Interactive loop. Input and settled remote calls are handled on the same
/// task, so the store is only ever touched from here.
pub async fn run_cli(mut app: TiPostApp) -> Result<()> {
    println!("TiPost ready. Type 'help' for a list of commands.");
    render::page(&app);
    prompt()?;

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    println!("Exiting");
                    break;
                };
                match handle_line(&mut app, line.trim()) {
                    Ok(LoopAction::Continue) => {}
                    Ok(LoopAction::Exit) => break,
                    Err(err) => println!("Error: {err:#}"),
                }
                prompt()?;
            }
            Some(message) = app.next_message() => {
                app.handle_message(message);
                println!();
                render::notice(&app, Instant::now());
                render::page(&app);
                prompt()?;
            }
        }
    }

    if app.in_flight() > 0 {
        tracing::debug!(pending = app.in_flight(), "exiting with remote calls outstanding");
    }
    Ok(())
}

fn prompt() -> Result<()> {
    print!("tipost> ");
    io::stdout().flush()?;
    Ok(())
}

fn handle_line(app: &mut TiPostApp, line: &str) -> Result<LoopAction> {
    if line.is_empty() {
        return Ok(LoopAction::Continue);
    }
    let tokens = match shell_words::split(line) {
        Ok(tokens) if !tokens.is_empty() => tokens,
        Ok(_) => return Ok(LoopAction::Continue),
        Err(err) => {
            println!("Unable to parse command: {err}");
            return Ok(LoopAction::Continue);
        }
    };
    handle_command(app, &tokens)
}

fn handle_command(app: &mut TiPostApp, tokens: &[String]) -> Result<LoopAction> {
    let rest = tokens[1..].join(" ");
    match tokens[0].as_str() {
        "help" => print_help(),
        "list" | "ls" => render::page(app),
        "next" => {
            app.next_page();
            render::page(app);
        }
        "prev" => {
            app.prev_page();
            render::page(app);
        }
        "search" => {
            app.set_search(rest);
            render::page(app);
        }
        "show" => match parse_id(tokens.get(1)) {
            Some(id) => match app.store().get(id) {
                Some(post) => render::post_detail(post),
                None => println!("No post with id {id}"),
            },
            None => println!("Usage: show <id>"),
        },
        "title" => {
            app.set_title(rest);
            render::form(app);
        }
        "body" => {
            app.set_body(rest);
            render::form(app);
        }
        "new" | "add" => {
            if app.editing().is_some() {
                println!("Finish or cancel the current edit first.");
                return Ok(LoopAction::Continue);
            }
            if tokens.len() >= 3 {
                app.set_title(tokens[1].clone());
                app.set_body(tokens[2..].join(" "));
            }
            if app.submit_create() {
                println!("Sending post...");
            } else {
                println!("A post needs both a title and a body.");
            }
        }
        "edit" => match parse_id(tokens.get(1)) {
            Some(id) if app.begin_edit(id) => render::form(app),
            Some(id) => println!("No post with id {id}"),
            None => println!("Usage: edit <id>"),
        },
        "update" => {
            if app.editing().is_none() {
                println!("Nothing is being edited. Use 'edit <id>' first.");
            } else if app.submit_update() {
                println!("Sending update...");
            } else {
                println!("A post needs both a title and a body.");
            }
        }
        "cancel" => {
            app.cancel_edit();
            render::form(app);
        }
        "delete" | "rm" => match parse_id(tokens.get(1)) {
            Some(id) => {
                app.submit_delete(id);
                println!("Deleting post {id}...");
            }
            None => println!("Usage: delete <id>"),
        },
        "goto" => {
            let path = tokens.get(1).map(String::as_str).unwrap_or("/");
            match app.navigate(path) {
                Resolved::Render(_) => {}
                Resolved::Redirect(route) => println!("Redirected to {}", route.path()),
            }
            render_route(app);
        }
        "refresh" => {
            app.hydrate();
            println!("Fetching posts...");
        }
        "status" => {
            println!(
                "{} posts stored, {} request(s) in flight, base URL {}",
                app.store().len(),
                app.in_flight(),
                app.client().base_url()
            );
            render::notice(app, Instant::now());
        }
        "clear" => print!("\x1B[2J\x1B[1;1H"),
        "quit" | "exit" => return Ok(LoopAction::Exit),
        other => println!("Unknown command '{other}'. Type 'help' for a list of commands."),
    }
    Ok(LoopAction::Continue)
}

fn render_route(app: &TiPostApp) {
    match app.route() {
        Route::Home => {
            render::form(app);
            render::page(app);
        }
        Route::Posts => render::page(app),
    }
}

fn parse_id(raw: Option<&String>) -> Option<PostId> {
    raw.and_then(|value| value.parse().ok())
}

fn print_help() {
    println!("Available commands:");
    println!("  help                 Show this help message");
    println!("  list                 Show the current page of posts");
    println!("  next / prev          Move between pages");
    println!("  search [TEXT]        Filter by title or body (empty clears)");
    println!("  show <id>            Print a single post in full");
    println!("  title TEXT           Set the title of the draft or edited post");
    println!("  body TEXT            Set the body of the draft or edited post");
    println!("  new [TITLE BODY]     Publish the draft (optionally setting it first)");
    println!("  edit <id>            Start editing a post");
    println!("  update               Publish the edited post");
    println!("  cancel               Leave edit mode and clear the draft");
    println!("  delete <id>          Delete a post");
    println!("  goto <path>          Switch view (/home or /post)");
    println!("  refresh              Reload posts from the remote collection");
    println!("  status               Show store and request status");
    println!("  clear                Clear the screen");
    println!("  quit                 Exit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tipost_core::app::AppOptions;
    use tipost_core::persistence::{MemoryStorage, Persistor};
    use tipost_core::{ApiClient, Post};

    fn app() -> TiPostApp {
        let persistor = Persistor::new(Arc::new(MemoryStorage::new()));
        persistor
            .snapshot(&[Post {
                id: 1,
                title: "First".into(),
                body: "Body".into(),
                created_at: "2024-01-01T00:00:00.000Z".into(),
            }])
            .unwrap();
        TiPostApp::new(
            ApiClient::new("http://127.0.0.1:9").unwrap(),
            persistor,
            AppOptions {
                fetch_limit: 10,
                notice_lifetime: Duration::from_secs(3),
            },
        )
    }

    fn run(app: &mut TiPostApp, line: &str) -> LoopAction {
        handle_line(app, line).expect("command")
    }

    #[test]
    fn quoted_arguments_set_the_draft() {
        let mut app = app();
        run(&mut app, "title \"Hello there\"");
        run(&mut app, "body 'two words'");
        assert_eq!(app.draft().title, "Hello there");
        assert_eq!(app.draft().body, "two words");
    }

    #[test]
    fn edit_targets_the_edit_slot() {
        let mut app = app();
        run(&mut app, "edit 1");
        run(&mut app, "title Renamed");
        assert_eq!(app.editing().map(|p| p.title.as_str()), Some("Renamed"));
        assert!(app.draft().title.is_empty());
        run(&mut app, "cancel");
        assert!(app.editing().is_none());
    }

    #[test]
    fn new_during_edit_leaves_edit_and_draft_alone() {
        let mut app = app();
        run(&mut app, "edit 1");
        run(&mut app, "new Brand fresh body");
        let editing = app.editing().expect("still editing");
        assert_eq!(editing.title, "First");
        assert_eq!(editing.body, "Body");
        assert!(app.draft().title.is_empty());
        assert_eq!(app.in_flight(), 0);
    }

    #[test]
    fn search_and_goto_update_state() {
        let mut app = app();
        run(&mut app, "search fir");
        assert_eq!(app.search(), "fir");
        run(&mut app, "goto /post");
        assert_eq!(app.route(), Route::Posts);
        run(&mut app, "goto /elsewhere");
        assert_eq!(app.route(), Route::Home);
    }

    #[test]
    fn quit_exits() {
        let mut app = app();
        assert!(matches!(run(&mut app, "quit"), LoopAction::Exit));
        assert!(matches!(run(&mut app, "bogus"), LoopAction::Continue));
        assert!(matches!(run(&mut app, "title \"unterminated"), LoopAction::Continue));
    }
}

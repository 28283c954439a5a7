//! # TickList CLI
//!
//! Interactive line-driven client over the state layer. Talks to a running
//! TickList API server.
//!
//! ## Usage
//!
//! ```bash
//! TICKLIST_API_URL=http://localhost:8080 cargo run -p ticklist-client
//! ```

use std::io::{self, BufRead, Write as _};
use std::sync::Arc;
use ticklist_client::api::Api;
use ticklist_client::http::HttpApi;
use ticklist_client::session::SessionStore;
use ticklist_client::state::{AuthState, TaskList};
use ticklist_shared::models::task::StatusFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
commands:
  signup <email> <password>   create an account and log in
  login <email> <password>    log in
  logout                      forget the local session
  ls                          list tasks under the current filter
  add <title>                 create a task
  toggle <n>                  flip task n between active and completed
  rename <n> <title>          retitle task n
  rm <n>                      delete task n
  mv <from> <to>              move task from one position to another
  clear                       delete all completed tasks
  filter all|active|completed change the listing filter
  help                        show this message
  quit                        exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticklist_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url =
        std::env::var("TICKLIST_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let api: Arc<dyn Api> = Arc::new(HttpApi::new(base_url));
    let store = SessionStore::new(SessionStore::default_path());

    let mut auth = AuthState::new(api.clone(), store);
    if let Err(e) = auth.hydrate().await {
        eprintln!("session restore failed: {}", e);
    }
    match auth.user() {
        Some(user) => println!("logged in as {}", user.email),
        None => println!("not logged in; try `signup` or `login` (`help` for commands)"),
    }

    let mut list = auth
        .token()
        .map(|token| TaskList::new(api.clone(), token));
    if let Some(list) = list.as_mut() {
        list.load().await;
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        match command {
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),

            "signup" | "login" => {
                let (Some(email), Some(password)) = (parts.next(), parts.next()) else {
                    println!("usage: {} <email> <password>", command);
                    continue;
                };
                let result = if command == "signup" {
                    auth.signup(email, password).await
                } else {
                    auth.login(email, password).await
                };
                match result {
                    Ok(()) => {
                        println!("logged in as {}", auth.user().unwrap().email);
                        let mut fresh =
                            TaskList::new(api.clone(), auth.token().unwrap());
                        fresh.load().await;
                        list = Some(fresh);
                    }
                    Err(e) => println!("error: {}", e),
                }
            }

            "logout" => {
                auth.logout()?;
                list = None;
                println!("logged out");
            }

            _ => {
                let Some(tasks) = list.as_mut() else {
                    println!("log in first");
                    continue;
                };
                run_task_command(tasks, command, parts).await;
            }
        }
    }

    Ok(())
}

async fn run_task_command(
    list: &mut TaskList,
    command: &str,
    mut args: std::str::SplitWhitespace<'_>,
) {
    match command {
        "ls" => {
            list.load().await;
            if let Some(e) = list.load_error() {
                println!("error: {}", e);
                return;
            }
            print_tasks(list);
        }

        "add" => {
            let title = args.collect::<Vec<_>>().join(" ");
            match list.create(&title).await {
                Some(_) => print_tasks(list),
                None => println!("error: {}", list.action_error().unwrap_or("failed")),
            }
        }

        "toggle" | "rm" | "rename" => {
            let Some(id) = args.next().and_then(|n| n.parse::<usize>().ok()).and_then(|n| {
                list.tasks().get(n).map(|t| t.id)
            }) else {
                println!("usage: {} <n>", command);
                return;
            };
            let done = match command {
                "toggle" => list.toggle(id).await,
                "rm" => list.remove(id).await,
                _ => {
                    let title = args.collect::<Vec<_>>().join(" ");
                    list.rename(id, &title).await
                }
            };
            if done {
                print_tasks(list);
            } else {
                println!("error: {}", list.action_error().unwrap_or("row is busy"));
            }
        }

        "mv" => {
            let (Some(from), Some(to)) = (
                args.next().and_then(|n| n.parse::<usize>().ok()),
                args.next().and_then(|n| n.parse::<usize>().ok()),
            ) else {
                println!("usage: mv <from> <to>");
                return;
            };
            if list.move_task(from, to).await {
                print_tasks(list);
            } else {
                println!("error: {}", list.action_error().unwrap_or("bad positions"));
            }
        }

        "clear" => match list.clear_completed().await {
            Some(deleted) => println!("deleted {} completed task(s)", deleted),
            None => println!("error: {}", list.action_error().unwrap_or("failed")),
        },

        "filter" => {
            let filter = StatusFilter::from_query(args.next());
            list.set_filter(filter).await;
            match list.load_error() {
                Some(e) => println!("error: {}", e),
                None => print_tasks(list),
            }
        }

        _ => println!("unknown command; `help` lists the commands"),
    }
}

fn print_tasks(list: &TaskList) {
    if list.tasks().is_empty() {
        println!("(no tasks)");
        return;
    }
    for (n, task) in list.tasks().iter().enumerate() {
        let mark = match task.status {
            ticklist_shared::models::task::TaskStatus::Completed => "x",
            ticklist_shared::models::task::TaskStatus::Active => " ",
        };
        println!("{:>3} [{}] {}", n, mark, task.title);
    }
}

use clap::{Parser, Subcommand};
use techtalk_client::{
    config::Config,
    error::{ClientError, ErrorDisplay},
    models::user::{ChangePasswordRequest, SignupRequest},
    services::ToggleOutcome,
    state::AppState,
    views::FollowListKind,
};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "techtalk", about = "Command-line client for TechTalk")]
struct Cli {
    /// 覆盖 TECHTALK_API_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with email or username
    Login { identifier: String, password: String },
    /// Create an account
    Signup {
        email: String,
        username: String,
        password: String,
    },
    /// Log out and clear the local session
    Logout,
    /// Show the home feed
    Feed {
        /// Also load comments for this post
        #[arg(long)]
        expand: Option<i64>,
    },
    /// Publish a post
    Post { title: String, content: String },
    /// Comment on a post
    Comment { post_id: i64, content: String },
    /// Toggle like on a post
    Like { post_id: i64 },
    /// Toggle dislike on a post
    Dislike { post_id: i64 },
    /// Toggle favorite on a post
    Favorite { post_id: i64 },
    /// List your followers
    Followers {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// List users you follow
    Following {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Follow a user
    Follow { user_id: i64 },
    /// Unfollow a user
    Unfollow { user_id: i64 },
    /// Show notifications
    Notifications {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Mark a notification as read
    Read { notification_id: i64 },
    /// Show the message inbox
    Inbox,
    /// Show a user profile
    Profile { user_id: i64 },
    /// Change your password
    Passwd {
        current: String,
        new_password: String,
    },
    /// Delete your account
    DeleteAccount { user_id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    // 初始化日志，生产环境输出 JSON
    let filter = tracing_subscriber::EnvFilter::new(&config.log_level);
    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    debug!("Using API at {}", config.api_base_url);

    let state = AppState::new(config)?;
    if let Err(display) = run(&state, cli.command).await {
        report(&display);
        std::process::exit(1);
    }
    Ok(())
}

fn report(display: &ErrorDisplay) {
    match display {
        ErrorDisplay::Reauthenticate(msg) => eprintln!("{} (run `techtalk login`)", msg),
        ErrorDisplay::Inline(msg) | ErrorDisplay::Validation(msg) => eprintln!("Error: {}", msg),
    }
}

fn toggle_result(outcome: ToggleOutcome, action: &str) -> Result<(), ErrorDisplay> {
    match outcome {
        ToggleOutcome::Applied => {
            println!("{} updated", action);
            Ok(())
        }
        ToggleOutcome::Reverted(display) => Err(display),
        ToggleOutcome::NotFound => Err(ErrorDisplay::Inline(format!(
            "{} target not found",
            action
        ))),
        ToggleOutcome::Ignored | ToggleOutcome::Discarded => Ok(()),
    }
}

async fn run(state: &AppState, command: Command) -> Result<(), ErrorDisplay> {
    let fail = |e: ClientError| state.api.handle_error(&e);

    match command {
        Command::Login {
            identifier,
            password,
        } => {
            state
                .auth_service
                .login(&identifier, &password)
                .await
                .map_err(fail)?;
            println!("Logged in");
        }
        Command::Signup {
            email,
            username,
            password,
        } => {
            let signed_in = state
                .auth_service
                .signup(SignupRequest {
                    email,
                    username,
                    password,
                })
                .await
                .map_err(fail)?;
            if signed_in {
                println!("Account created successfully!");
            } else {
                println!("Account created successfully! Log in to continue.");
            }
        }
        Command::Logout => {
            state.auth_service.logout().await.map_err(fail)?;
            println!("Logged out");
        }
        Command::Feed { expand } => {
            let feed = state.feed_view();
            feed.load().await?;
            if let Some(post_id) = expand {
                feed.toggle_expanded(post_id).await?;
            }
            let posts = feed.state().items();
            if posts.is_empty() {
                println!("No posts found, try following some users.");
            }
            for post in posts.iter() {
                println!(
                    "[{}] {} by {} ({})",
                    post.id,
                    post.title,
                    post.author,
                    post.created_at.format("%Y-%m-%d %H:%M")
                );
                println!("    {}", post.content);
                println!(
                    "    👍 {}{}  👎 {}{}  ⭐ {}{}  💬 {}",
                    post.likes_count,
                    if post.liked() { "*" } else { "" },
                    post.dislikes_count,
                    if post.disliked() { "*" } else { "" },
                    post.favorites_count,
                    if post.favorited { "*" } else { "" },
                    post.comments_count
                );
                if post.is_expanded {
                    for comment in &post.comments {
                        println!("      {}: {}", comment.user, comment.content);
                    }
                }
            }
        }
        Command::Post { title, content } => {
            state
                .post_service
                .create_post(&title, &content)
                .await
                .map_err(fail)?;
            println!("Post published");
        }
        Command::Comment { post_id, content } => {
            let feed = state.feed_view();
            feed.load().await?;
            feed.submit_comment(post_id, &content).await?;
            println!("Comment added");
        }
        Command::Like { post_id } => {
            let feed = state.feed_view();
            feed.load().await?;
            toggle_result(feed.like(post_id).await, "Like")?;
        }
        Command::Dislike { post_id } => {
            let feed = state.feed_view();
            feed.load().await?;
            toggle_result(feed.dislike(post_id).await, "Dislike")?;
        }
        Command::Favorite { post_id } => {
            let feed = state.feed_view();
            feed.load().await?;
            toggle_result(feed.favorite(post_id).await, "Favorite")?;
        }
        Command::Followers { pages } => {
            print_follow_list(state, FollowListKind::Followers, pages).await?;
        }
        Command::Following { pages } => {
            print_follow_list(state, FollowListKind::Following, pages).await?;
        }
        Command::Follow { user_id } => {
            state.follow_service.follow(user_id).await.map_err(fail)?;
            println!("Following user {}", user_id);
        }
        Command::Unfollow { user_id } => {
            state.follow_service.unfollow(user_id).await.map_err(fail)?;
            println!("Unfollowed user {}", user_id);
        }
        Command::Notifications { pages } => {
            let view = state.notifications_view();
            for _ in 0..pages {
                if !view.load_more().await? {
                    break;
                }
            }
            let notifications = view.state().items();
            if notifications.is_empty() {
                println!("No notifications yet.");
            }
            for n in notifications.iter() {
                println!(
                    "{} [{}] {:?} from {}{}",
                    if n.read { " " } else { "•" },
                    n.id,
                    n.kind,
                    n.user,
                    n.content
                        .as_deref()
                        .map(|c| format!(": {}", c))
                        .unwrap_or_default()
                );
            }
            if view.has_more() {
                println!("(more available, use --pages)");
            }
        }
        Command::Read { notification_id } => {
            state
                .notification_service
                .set_read(notification_id, true)
                .await
                .map_err(fail)?;
            println!("Marked as read");
        }
        Command::Inbox => {
            let inbox = state.inbox_view();
            inbox.load().await?;
            for message in inbox.state().items().iter() {
                println!(
                    "{} [{}] {} - {} ({})",
                    if message.read { " " } else { "•" },
                    message.id,
                    message.sender,
                    message.subject_or_default(),
                    message.timestamp.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Profile { user_id } => {
            let profile = state.user_service.get_profile(user_id).await.map_err(fail)?;
            println!("{} (#{})", profile.username, profile.id);
            if let Some(bio) = &profile.bio {
                println!("  {}", bio);
            }
            for (site, link) in &profile.social_links {
                println!("  {}: {}", site, link);
            }
        }
        Command::Passwd {
            current,
            new_password,
        } => {
            state
                .user_service
                .change_password(ChangePasswordRequest {
                    password: current,
                    new_password,
                })
                .await
                .map_err(fail)?;
            println!("Password updated");
        }
        Command::DeleteAccount { user_id } => {
            state
                .auth_service
                .delete_account(user_id)
                .await
                .map_err(fail)?;
            println!("Account deleted successfully");
        }
    }

    info!("Command finished");
    Ok(())
}

async fn print_follow_list(
    state: &AppState,
    kind: FollowListKind,
    pages: u32,
) -> Result<(), ErrorDisplay> {
    let view = state.follow_list_view(kind);
    for _ in 0..pages {
        if !view.load_more().await? {
            break;
        }
    }

    let entries = view.state().items();
    if entries.is_empty() {
        match kind {
            FollowListKind::Followers => println!("No followers found"),
            FollowListKind::Following => println!("Not following anyone yet"),
        }
    }
    for entry in entries.iter() {
        println!("[{}] {}", entry.user.id, entry.user.username);
    }
    if view.has_more() {
        println!("(more available, use --pages)");
    }
    Ok(())
}

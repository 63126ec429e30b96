use anyhow::{anyhow, Context};
use potluck_client::{
    api::{CommentId, InteractionKind, NewSession, Session, Target, Uuid},
    interaction::Settlement,
    reaction::ReactionOutcome,
    store::{AppStore, KeyValueStore, MemoryStore},
    thread, HttpRemote, Remote, TargetView,
};
use tracing_subscriber::EnvFilter;

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(short, long, env = "POTLUCK_HOST")]
    host: String,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Log in, and print the session to export as POTLUCK_SESSION
    Login {
        /// Username
        user: String,

        /// Password
        password: String,
    },

    /// Print the likes, reactions and discussion of a blog post or recipe
    Show {
        /// Either blog/<uuid> or recipe/<uuid>
        target: Target,
    },

    /// Like or unlike a blog post, recipe or comment
    Like {
        /// Page the comment is on
        target: Target,

        /// Like this comment instead of the page itself
        #[structopt(long)]
        comment: Option<Uuid>,
    },

    /// Bookmark or unbookmark a blog post or recipe
    Bookmark { target: Target },

    /// React to a blog post; reacting again with the same emoji removes the reaction
    React { target: Target, emoji: String },

    /// Comment on a blog post, or review a recipe
    Comment {
        target: Target,

        content: String,

        /// Reply to this comment instead of posting top-level
        #[structopt(long)]
        reply_to: Option<Uuid>,
    },
}

fn session_from_env() -> anyhow::Result<Option<Session>> {
    let raw = match std::env::var("POTLUCK_SESSION") {
        Ok(raw) => raw,
        Err(std::env::VarError::NotPresent) => return Ok(None),
        Err(e) => return Err(e).context("reading POTLUCK_SESSION environment variable"),
    };
    let session = serde_json::from_str(&raw).context("parsing POTLUCK_SESSION as a session")?;
    Ok(Some(session))
}

fn print_view(view: &TargetView) {
    let target = view.target();
    println!("{target}");
    if let Some(likes) = view.interactions().get(InteractionKind::Like, &target) {
        let mark = if likes.active { " (including you)" } else { "" };
        println!("  {} likes{mark}", likes.count);
    }
    if let Some(bookmarks) = view.interactions().get(InteractionKind::Bookmark, &target) {
        let mark = if bookmarks.active { " (including you)" } else { "" };
        println!("  {} bookmarks{mark}", bookmarks.count);
    }
    if let Some(reactions) = view.reactions().get(&target) {
        let counts = reactions
            .counts()
            .into_iter()
            .map(|(emoji, n)| format!("{emoji} {n}"))
            .collect::<Vec<_>>();
        if !counts.is_empty() {
            println!("  {}", counts.join("  "));
        }
    }
    println!();
    for (depth, node) in thread::depth_first(view.discussion().forest()) {
        let c = &node.record;
        let likes = view
            .interactions()
            .get(InteractionKind::Like, &Target::Comment(c.id))
            .map(|s| s.count)
            .unwrap_or(0);
        println!(
            "{:indent$}[{}] {} ({} likes, {})",
            "",
            c.id.0,
            c.content,
            likes,
            c.created_at.format("%Y-%m-%d %H:%M"),
            indent = depth * 4,
        );
        if let Some(media) = &c.media {
            println!("{:indent$}  media: {media}", "", indent = depth * 4);
        }
    }
}

fn print_settlement(s: Settlement) -> anyhow::Result<()> {
    match s {
        Settlement::Confirmed => println!("done"),
        Settlement::Reconciled(state) => println!(
            "done: {} in total, {}",
            state.count,
            if state.active { "including you" } else { "not including you" }
        ),
        Settlement::RolledBack(_) => return Err(anyhow!("the server did not accept the change")),
        Settlement::Superseded => (),
    }
    Ok(())
}

/// Runs `cmd` on the page of `target`. Notifications raised on the way are left in
/// `store`, whether the command succeeds or not.
async fn run<R: Remote>(
    remote: &R,
    store: &mut AppStore<MemoryStore>,
    cmd: Command,
    target: Target,
) -> anyhow::Result<()> {
    let mut view = TargetView::new(target);
    view.refresh(remote, store)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    match cmd {
        Command::Login { .. } | Command::Show { .. } => print_view(&view),
        Command::Like { comment, .. } => {
            let on = comment.map(|c| Target::Comment(CommentId(c))).unwrap_or(target);
            print_settlement(
                view.toggle(remote, store, InteractionKind::Like, on)
                    .await?,
            )?;
        }
        Command::Bookmark { .. } => {
            print_settlement(
                view.toggle(remote, store, InteractionKind::Bookmark, target)
                    .await?,
            )?;
        }
        Command::React { emoji, .. } => {
            match view.react(remote, store, &emoji).await? {
                ReactionOutcome::Replaced => print_view(&view),
                ReactionOutcome::Failed => {
                    return Err(anyhow!("the server did not accept the reaction"))
                }
                ReactionOutcome::Superseded => (),
            }
        }
        Command::Comment {
            content, reply_to, ..
        } => {
            match view
                .reply(remote, store, &content, reply_to.map(CommentId))
                .await?
            {
                Some(id) => println!("posted {}", id.0),
                None => return Err(anyhow!("the server did not accept the comment")),
            }
        }
    }

    Ok(())
}

fn notification_lines<S: KeyValueStore>(store: &AppStore<S>) -> Vec<String> {
    store
        .notifications()
        .map(|n| format!("{:?}: {}", n.level, n.message))
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opt = <Opt as structopt::StructOpt>::from_args();

    let mut store = AppStore::hydrate(MemoryStore::new());
    let mut remote = HttpRemote::new(opt.host.clone(), None);
    if let Some(session) = session_from_env()? {
        tracing::debug!(user = %session.name, "using session from environment");
        remote = remote.with_session(&session);
        store.login(opt.host.clone(), session);
    }

    let target = match &opt.cmd {
        Command::Login { user, password } => {
            let session = remote
                .auth(&NewSession {
                    user: user.clone(),
                    password: password.clone(),
                })
                .await
                .map_err(|e| anyhow!(e.user_message()))?;
            println!("{}", serde_json::to_string(&session)?);
            return Ok(());
        }
        Command::Show { target }
        | Command::Like { target, .. }
        | Command::Bookmark { target }
        | Command::React { target, .. }
        | Command::Comment { target, .. } => *target,
    };

    let res = run(&remote, &mut store, opt.cmd, target).await;
    // also on failure, as they usually say what went wrong
    for line in notification_lines(&store) {
        eprintln!("{line}");
    }
    res
}

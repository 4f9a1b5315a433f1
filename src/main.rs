use clap::Parser;
use swiftmatch_client::config::{ClientConfig, CliConfig, Command, FriendsCommand, LogFormat};
use swiftmatch_client::core::analytics::bubble_size;
use swiftmatch_client::core::reorder::Move;
use swiftmatch_client::core::session::LoginOutcome;
use swiftmatch_client::core::{AuthContext, MatchAccess, MatchingGate, RankingController};
use swiftmatch_client::domain::model::{CollectionId, RankableItem, RegistrationRequest};
use swiftmatch_client::domain::social::{FriendRequestOutcome, FriendshipAction};
use swiftmatch_client::utils::error::{ClientError, ErrorSeverity, Result};
use swiftmatch_client::utils::logger;
use swiftmatch_client::utils::validation::{validate_required_field, Validate};
use swiftmatch_client::{ApiClient, HttpRankingSource};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let config = match cli.validate().and_then(|_| cli.resolve()) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
            return;
        }
    };

    match config.log_format() {
        LogFormat::Json => logger::init_json_logger(config.verbose()),
        LogFormat::Compact => logger::init_cli_logger(config.verbose()),
    }

    tracing::info!("Starting swiftmatch CLI");
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }
}

fn exit_with(e: &ClientError) {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

async fn run(cli: &CliConfig, config: &ClientConfig) -> Result<()> {
    let api = ApiClient::from_config(config)?;

    match &cli.command {
        Command::Register { email, first_name, country } => {
            let (username, password) = cli.credentials.require()?;
            let request = RegistrationRequest {
                username: username.to_string(),
                email: email.clone(),
                password: password.to_string(),
                first_name: first_name.clone(),
                country: country.clone(),
            };
            request.validate()?;
            api.register(&request).await?;
            println!("✅ Account '{}' created, you can log in now", username);
            Ok(())
        }
        Command::Analytics { country } => {
            let session = match cli.credentials.require() {
                Ok((username, password)) => Some(api.login(username, password).await?),
                Err(_) => {
                    tracing::debug!("No credentials given, fetching analytics anonymously");
                    None
                }
            };
            let result = show_analytics(&api, session.as_ref().map(|s| &s.auth), country.as_deref()).await;
            if let Some(session) = &session {
                api.logout(&session.auth).await;
            }
            result
        }
        command => {
            let (username, password) = cli.credentials.require()?;
            let session = api.login(username, password).await?;
            let result = run_authenticated(command, &api, &session, config).await;
            api.logout(&session.auth).await;
            result
        }
    }
}

async fn run_authenticated(
    command: &Command,
    api: &ApiClient,
    session: &LoginOutcome,
    config: &ClientConfig,
) -> Result<()> {
    let auth = &session.auth;
    match command {
        Command::Login => {
            if session.first_login {
                println!("✅ Logged in for the first time, pick a theme next ({})", session.redirect);
            } else {
                println!("✅ Logged in, continuing to {}", session.redirect);
            }
            Ok(())
        }
        Command::Profile => show_profile(api, auth).await,
        Command::Tracks { .. } => {
            let mut controller = controller_for(api, auth, config)?;
            controller.load().await?;
            print_items(controller.items());
            Ok(())
        }
        Command::Rank { moves, dry_run, .. } => rank(api, auth, config, moves, *dry_run).await,
        Command::Friends { action } => friends(api, auth, action).await,
        Command::Match { user, album } => {
            let target = api.user(*user, auth).await?;
            tracing::info!(
                "Checking matching against {}",
                target.username.as_deref().unwrap_or("unknown user")
            );
            let gate = MatchingGate::new(api, auth);
            let access = match album {
                Some(title) => gate.check(*user, title).await?,
                None => gate.albums(*user),
            };
            match &access {
                MatchAccess::Granted(_) => {
                    if let Some(route) = access.route() {
                        println!("✅ Matching available: {}", route);
                    }
                }
                MatchAccess::RankingRequired { album_id, album_title } => {
                    println!(
                        "⚠️  Rank the tracks of '{}' first (swiftmatch rank --album {})",
                        album_title, album_id
                    );
                }
                MatchAccess::UnknownAlbum => {
                    println!("⚠️  No album matches '{}'", album.as_deref().unwrap_or_default());
                }
            }
            Ok(())
        }
        Command::Register { .. } | Command::Analytics { .. } => Ok(()),
    }
}

fn controller_for(
    api: &ApiClient,
    auth: &AuthContext,
    config: &ClientConfig,
) -> Result<RankingController<HttpRankingSource>> {
    let collection = *validate_required_field("ranking.collection_id", &config.ranking.collection_id)?;
    let source = HttpRankingSource::new(api.clone(), auth.clone());
    Ok(RankingController::new(source, CollectionId(collection)))
}

async fn rank(
    api: &ApiClient,
    auth: &AuthContext,
    config: &ClientConfig,
    moves: &[Move],
    dry_run: bool,
) -> Result<()> {
    let mut controller = controller_for(api, auth, config)?;
    controller.load().await?;

    let len = controller.items().len();
    for m in moves {
        if m.from >= len || m.to >= len {
            return Err(ClientError::InvalidRanking {
                reason: format!("move {}:{} is outside 1..={}", m.from + 1, m.to + 1, len),
            });
        }
        controller.begin_drag(m.from);
        controller.update_drag_target(m.to);
        controller.commit_drag();
    }
    print_items(controller.items());

    if dry_run {
        let submission = controller.begin_save()?;
        println!("{}", serde_json::to_string_pretty(&submission)?);
        return Ok(());
    }

    let route = controller.save().await?;
    println!("✅ Ranking saved for album {}, continuing to {}", controller.collection(), route);
    Ok(())
}

async fn show_profile(api: &ApiClient, auth: &AuthContext) -> Result<()> {
    let profile = api.me(auth).await?;
    let theme = api.current_theme(auth).await?;
    let ranked = api.ranked_titles(None, auth).await?;

    println!(
        "👤 {} ({})",
        profile.username.as_deref().unwrap_or("unknown"),
        profile.initials()
    );
    println!("   friends: {}  groups: {}", profile.friends_count, profile.groups_count);
    if let Some(theme) = theme.or_else(|| profile.theme()) {
        println!("   theme: {}", theme.album_title());
    }
    if let Some(avatar) = profile.avatar_url(api.base_url()) {
        println!("   avatar: {}", avatar);
    }
    if ranked.has_any() {
        println!("   ranked: {}", ranked.combined.join(", "));
    } else {
        println!("   nothing ranked yet");
    }
    Ok(())
}

async fn friends(api: &ApiClient, auth: &AuthContext, action: &FriendsCommand) -> Result<()> {
    match action {
        FriendsCommand::List => {
            let requests = api.friend_requests(auth).await?;
            if requests.is_empty() {
                println!("No friend requests");
            }
            for request in &requests {
                println!(
                    "#{} from {} [{}] ({})",
                    request.id,
                    request.from_username,
                    request.status,
                    request.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        FriendsCommand::Search { term } => {
            for user in api.search_users(term, auth).await? {
                println!("{}\t{}", user.id, user.username);
            }
        }
        FriendsCommand::Request { user_id } => match api.request_friendship(*user_id, auth).await? {
            FriendRequestOutcome::Sent { message } => {
                println!("✅ {}", message.unwrap_or_else(|| "Friend request sent".to_string()));
            }
            FriendRequestOutcome::Accepted { message } => {
                println!("🤝 {}", message.unwrap_or_else(|| "You are now friends".to_string()));
            }
        },
        FriendsCommand::Accept { request_id } => {
            api.respond_to_request(*request_id, FriendshipAction::Accept, auth).await?;
            println!("✅ Request #{} accepted", request_id);
        }
        FriendsCommand::Reject { request_id } => {
            api.respond_to_request(*request_id, FriendshipAction::Reject, auth).await?;
            println!("✅ Request #{} rejected", request_id);
        }
    }
    Ok(())
}

async fn show_analytics(api: &ApiClient, auth: Option<&AuthContext>, country: Option<&str>) -> Result<()> {
    let rankings = api.global_rankings(auth).await?;
    let wanted = country.map(|c| c.to_lowercase());

    for ranking in rankings.iter().filter(|r| {
        wanted
            .as_deref()
            .map_or(true, |w| r.country_name.to_lowercase().contains(w))
    }) {
        println!(
            "🌍 {} ({} users, bubble {:.0}px)",
            ranking.country_name,
            ranking.user_count,
            bubble_size(ranking.user_count)
        );
        match (ranking.consensus_stat(), &ranking.consensus_album_title) {
            (Some(stat), _) => println!(
                "   consensus: {} (avg {:.2})",
                stat.album_title,
                stat.avg_rank.unwrap_or_default()
            ),
            (None, Some(title)) => println!("   consensus: {}", title),
            (None, None) => {}
        }
        if let Some(title) = &ranking.polarization_album_title {
            println!("   polarizing: {}", title);
        }
        for stat in ranking.album_stats() {
            let avg = stat
                .avg_rank
                .map(|a| format!("{:.2}", a))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   {:<32} avg {:>6}  σ {:.2}  votes {}",
                stat.album_title, avg, stat.std_dev_rank, stat.votes
            );
        }
    }
    Ok(())
}

fn print_items(items: &[RankableItem]) {
    for (index, item) in items.iter().enumerate() {
        println!("{:>3}. {}", index + 1, item.title);
    }
}

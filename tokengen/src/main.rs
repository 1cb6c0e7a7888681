use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use identity::{Role, TokenCodec};

/// Mint an access token signed with the platform key.
///
/// The token is the same one `/auth/login` would issue, so it can be used
/// against the edge directly:
/// - Claims: sub (email), userId, role, iat, exp, iss
/// - Key: `--secret`, else `JWT_SECRET` from the environment or `.env`
/// - Output: the token, followed by its expiry unless `--quiet`
#[derive(Parser, Debug)]
#[command(name = "tokengen", version, about)]
struct Args {
    /// Integer subject the services key their data on
    #[arg(long)]
    user_id: i64,

    /// Account email, carried as `sub`
    #[arg(long)]
    email: String,

    /// CUSTOMER or ADMIN
    #[arg(long, default_value = "CUSTOMER")]
    role: Role,

    /// Signing key. Default: JWT_SECRET.
    #[arg(long)]
    secret: Option<String>,

    /// Override iat (unix seconds). Default: now.
    #[arg(long)]
    iat: Option<i64>,

    /// Print only the token
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

struct Minted {
    token: String,
    expires_at: DateTime<Utc>,
}

fn resolve_secret(flag: Option<String>, env: Option<String>) -> anyhow::Result<String> {
    match flag.or(env).filter(|s| !s.is_empty()) {
        Some(secret) => Ok(secret),
        None => bail!("no signing key: pass --secret or set JWT_SECRET"),
    }
}

fn mint(args: &Args, secret: &str) -> anyhow::Result<Minted> {
    let codec = TokenCodec::new(secret.as_bytes()).context("signing key")?;

    let issued_at = match args.iat {
        Some(ts) => DateTime::from_timestamp(ts, 0).context("--iat is out of range")?,
        None => Utc::now(),
    };

    let token = codec.issue_at(args.user_id, &args.email, args.role, issued_at)?;
    let expires_at = issued_at + chrono::Duration::seconds(identity::token::TOKEN_LIFETIME_SECONDS);

    Ok(Minted { token, expires_at })
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let secret = resolve_secret(args.secret.clone(), std::env::var("JWT_SECRET").ok())?;
    let minted = mint(&args, &secret)?;

    if args.quiet {
        println!("{}", minted.token);
        return Ok(());
    }

    println!("Access token:\n{}\n", minted.token);
    println!("Subject: {} (userId {}, {})", args.email, args.user_id, args.role);
    println!("Expires: {}", minted.expires_at.to_rfc3339());
    Ok(())
}
